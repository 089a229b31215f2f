//! Logging setup from repeatable verbosity flags.
//!
//! The default level is WARN; each `-v` raises verbosity and each `-q`
//! lowers it:
//!
//! ```text
//! -qq   -> off
//! -q    -> ERROR
//! (none)-> WARN
//! -v    -> INFO
//! -vv   -> DEBUG
//! -vvv  -> TRACE
//! ```
//!
//! `RUST_LOG` still takes precedence when set, so operators can use the
//! usual env-var filters for per-module debugging.

use env_logger::Env;
use log::LevelFilter;

/// Levels ordered from quietest to loudest; index 2 (WARN) is the default.
const LEVELS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

/// Maps `-v`/`-q` counts to a log level filter.
#[must_use]
pub fn level_filter(verbose: u8, quiet: u8) -> LevelFilter {
    let idx = (2 + i16::from(verbose) - i16::from(quiet)).clamp(0, 5);
    LEVELS[idx as usize]
}

/// Initializes the global logger once at process entry.
///
/// Must be called before any log output is produced; later calls would
/// panic inside `env_logger`, so this is only invoked from `main`.
pub fn init_logging(verbose: u8, quiet: u8) {
    let default = level_filter(verbose, quiet).to_string();
    env_logger::Builder::from_env(Env::default().default_filter_or(default)).init();
}
