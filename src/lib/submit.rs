//! Scheduler submission gateway.
//!
//! Submission means handing the materialized run script to the cluster
//! scheduler's submit command from inside the run's output directory, with
//! the scheduler's response appended to the submission log. The `cd`,
//! queue argument, and log redirection genuinely require a shell, so the
//! rendered line is isolated behind the one [`ShellCommand`] value type;
//! everything else in this crate stays away from shell strings.

use crate::config::SUBMISSION_LOG;
use crate::errors::{Result, SeqrunError};
use crate::runscript::RUN_SCRIPT;
use log::{info, warn};
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Output};

/// The cluster scheduler's submission executable.
pub const SCHEDULER_SUBMIT: &str = "qsub";

/// A fully rendered shell command line.
///
/// Runs synchronously via `sh -c`; the whole program waits on the
/// scheduler call, and there is no timeout or cancellation for a hung
/// scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand(String);

impl ShellCommand {
    #[must_use]
    pub fn new(line: impl Into<String>) -> Self {
        Self(line.into())
    }

    /// The rendered command line.
    #[must_use]
    pub fn line(&self) -> &str {
        &self.0
    }

    /// Runs the command and waits for completion.
    ///
    /// # Errors
    /// Returns [`SeqrunError::CommandFailed`] carrying the command line if
    /// the shell cannot be spawned or exits nonzero. Never retried.
    pub fn run(&self) -> Result<Output> {
        let output = Command::new("sh").arg("-c").arg(&self.0).output().map_err(|e| {
            SeqrunError::CommandFailed { command: self.0.clone(), reason: e.to_string() }
        })?;
        if !output.status.success() {
            return Err(SeqrunError::CommandFailed {
                command: self.0.clone(),
                reason: output.status.to_string(),
            });
        }
        Ok(output)
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured description of one scheduler submission.
#[derive(Debug, Clone)]
pub struct SubmitCommand {
    /// Run output directory; the scheduler is invoked from here
    pub workdir: PathBuf,
    /// Queue for the master job, if any
    pub master_queue: Option<String>,
    /// Run script, relative to `workdir`
    pub script: String,
    /// Append-only submission log, relative to `workdir`
    pub submission_log: String,
}

impl SubmitCommand {
    /// Builds the standard submission for a run output directory.
    #[must_use]
    pub fn for_outdir(workdir: PathBuf, master_queue: Option<String>) -> Self {
        Self {
            workdir,
            master_queue,
            script: RUN_SCRIPT.to_string(),
            submission_log: SUBMISSION_LOG.to_string(),
        }
    }

    /// Renders the submission as the one shell line this crate executes.
    #[must_use]
    pub fn shell_command(&self) -> ShellCommand {
        let queue_arg = match &self.master_queue {
            Some(queue) => format!("-q {queue} "),
            None => String::new(),
        };
        ShellCommand::new(format!(
            "cd {} && {SCHEDULER_SUBMIT} {queue_arg}{} >> {}",
            self.workdir.display(),
            self.script,
            self.submission_log,
        ))
    }
}

/// Submits the run script, or logs the command without executing it when
/// `dry_run` is set.
///
/// A dry run has no side effects beyond logging and leaves the submission
/// log untouched.
///
/// # Errors
/// Propagates [`SeqrunError::CommandFailed`] from the scheduler call.
pub fn submit(command: &SubmitCommand, dry_run: bool) -> Result<()> {
    let shell = command.shell_command();
    if dry_run {
        warn!("Skipping pipeline run on request. Once ready, submit with: {shell}");
        return Ok(());
    }
    info!("Starting pipeline: {shell}");
    shell.run()?;
    Ok(())
}
