//! Common CLI options shared across commands.
//!
//! Shared argument structures composed into command structs with
//! `#[command(flatten)]`.

use clap::{ArgAction, Args};

/// Scheduler queue options.
#[derive(Debug, Clone, Default, Args)]
pub struct SchedulerOptions {
    /// Queue to use for slave jobs
    #[arg(short = 'w', long = "slave-q")]
    pub slave_queue: Option<String>,

    /// Queue to use for the master job
    #[arg(short = 'm', long = "master-q")]
    pub master_queue: Option<String>,
}

/// Options controlling whether the prepared run is actually submitted.
#[derive(Debug, Clone, Default, Args)]
pub struct LaunchOptions {
    /// Create all run artifacts but skip the scheduler submission
    #[arg(short = 'n', long = "no-run")]
    pub no_run: bool,
}

/// Repeatable verbosity flags, applied once at process entry.
#[derive(Debug, Clone, Default, Args)]
pub struct VerbosityOptions {
    /// Increase verbosity (repeatable: -v INFO, -vv DEBUG, -vvv TRACE)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (repeatable: -q ERROR, -qq silent)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,
}
