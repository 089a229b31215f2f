//! Command trait definition for CLI commands.
//!
//! All seqrun CLI commands implement [`Command`]; `enum_dispatch` provides
//! the dispatch across the subcommand enum in `main`.

use anyhow::Result;
use enum_dispatch::enum_dispatch;

/// Trait implemented by all seqrun CLI commands.
///
/// `execute` runs the whole setup-and-submit flow for one pipeline; any
/// error is terminal for the process.
#[enum_dispatch]
pub trait Command {
    #[allow(clippy::missing_errors_doc)]
    fn execute(&self) -> Result<()>;
}
