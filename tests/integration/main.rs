//! Integration tests for the seqrun library.
//!
//! These tests validate end-to-end run setup flows that span multiple
//! modules: unit resolution feeding the config merge, persisted run
//! artifacts, and the submission gateway's dry-run behavior.

mod helpers;
mod test_error_paths;
mod test_run_setup;
mod test_unit_resolution;
