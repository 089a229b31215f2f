#![deny(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! # seqrun - sequencing pipeline run setup
//!
//! This library prepares everything a cluster scheduler needs to execute
//! one run of a sequencing batch pipeline: it resolves the run's
//! processing units, merges the per-run configuration, materializes the
//! run script, and hands the result to the scheduler.
//!
//! ## Overview
//!
//! - **[`units`]** - processing-unit resolution from manifests or
//!   positional FASTQ arguments, with key derivation and lane filtering
//! - **[`config`]** - default-config loading, the user-data/provenance
//!   merge, and write-once persistence of the run's config files
//! - **[`reference`][mod@reference]** - facts derived from reference-genome companion
//!   index files
//! - **[`runscript`]** - token substitution into the scheduler run script
//! - **[`submit`]** - the scheduler submission gateway
//! - **[`site`]** - deployment-site services (install dirs, site paths,
//!   notification addresses)
//! - **[`validation`]** / **[`errors`]** / **[`logging`]** - shared
//!   input validation, structured errors, and logger setup
//!
//! The pipelines themselves (workflow engine, demultiplexer, aligner,
//! variant caller) are external collaborators; nothing in here reads
//! sequence data.

pub mod config;
pub mod errors;
pub mod logging;
pub mod reference;
pub mod runscript;
pub mod site;
pub mod submit;
pub mod units;
pub mod validation;
