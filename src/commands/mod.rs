//! CLI command implementations for seqrun.
//!
//! One submodule per pipeline:
//!
//! - [`demux`] - set up and submit a base-calling/demultiplexing run
//! - [`vcall`] - set up and submit a variant-calling run
//!
//! Both share the same shape: resolve the run's processing units, merge
//! and persist the per-run configuration, materialize the run script, and
//! submit it to the scheduler (unless `--no-run` was given).

pub mod command;
pub mod common;
pub mod demux;
pub mod vcall;
