//! Custom error types for run setup and submission.
//!
//! Usage errors, input-validation errors, precondition failures, and external
//! tool failures each map to their own variant so callers (and tests) can
//! match on the exact failure instead of string contents.

use thiserror::Error;

/// Result type alias for seqrun operations
pub type Result<T> = std::result::Result<T, SeqrunError>;

/// Error type for seqrun operations
#[derive(Error, Debug)]
pub enum SeqrunError {
    /// Invalid or conflicting command-line parameter
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// A required input file or directory does not exist
    #[error("{description} '{path}' does not exist")]
    MissingInput {
        /// What kind of input (e.g. "Run directory", "Reference FASTA")
        description: String,
        /// Path that was checked
        path: String,
    },

    /// Several referenced input files are missing; each path has already
    /// been reported on the log before this is raised
    #[error("{count} referenced input file(s) do not exist")]
    MissingInputs {
        /// Number of missing paths
        count: usize,
    },

    /// Refusing to overwrite a pre-existing output path
    #[error("{description} '{path}' already exists")]
    AlreadyExists {
        /// What kind of output (e.g. "Output directory", "Run script")
        description: String,
        /// Path that was checked
        path: String,
    },

    /// A manifest could not be parsed or contains a malformed record
    #[error("Invalid manifest '{path}': {reason}")]
    InvalidManifest {
        /// Path to the manifest file
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// Two processing units resolved to the same key
    #[error("Duplicate unit key '{key}'")]
    DuplicateUnitKey {
        /// The colliding key
        key: String,
    },

    /// Reference FASTA is missing its companion index file(s)
    #[error("Reference '{path}' does not appear to be indexed")]
    ReferenceNotIndexed {
        /// Path to the reference FASTA
        path: String,
    },

    /// The provenance key is already present in the configuration template
    #[error("Provenance key '{key}' already present in configuration")]
    ProvenanceCollision {
        /// The reserved key
        key: String,
    },

    /// An external command returned a nonzero exit status or could not be run
    #[error("The following command failed: {command} ({reason})")]
    CommandFailed {
        /// The full command line
        command: String,
        /// Exit status or spawn error
        reason: String,
    },

    /// Site-specific path derivation requested for an unsupported site
    #[error("Unknown site '{site}'")]
    UnknownSite {
        /// The offending site name
        site: String,
    },

    /// File I/O error with the path that caused it
    #[error("Failed to access '{path}': {source}")]
    Io {
        /// Path being read or written
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
