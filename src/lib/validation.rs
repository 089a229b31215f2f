//! Input validation utilities
//!
//! Common validation functions for command-line parameters and file paths
//! with consistent error messages. All functions return structured error
//! types from [`crate::errors`].

use crate::errors::{Result, SeqrunError};
use std::fmt::Display;
use std::path::Path;

/// Validate that a path exists
///
/// # Arguments
/// * `path` - Path to validate
/// * `description` - Human-readable description (e.g. "Input manifest", "Reference FASTA")
///
/// # Errors
/// Returns [`SeqrunError::MissingInput`] if the path does not exist
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(SeqrunError::MissingInput {
            description: description.to_string(),
            path: path_ref.display().to_string(),
        });
    }
    Ok(())
}

/// Validate that a path exists and is a directory
///
/// # Errors
/// Returns [`SeqrunError::MissingInput`] if the path does not exist or is
/// not a directory
pub fn validate_dir_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.is_dir() {
        return Err(SeqrunError::MissingInput {
            description: description.to_string(),
            path: path_ref.display().to_string(),
        });
    }
    Ok(())
}

/// Validate that an output path does not exist yet
///
/// Existence checks happen immediately before each write; a race between
/// check and write is accepted for a single-operator batch tool.
///
/// # Errors
/// Returns [`SeqrunError::AlreadyExists`] if the path is already present
pub fn validate_absent<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        return Err(SeqrunError::AlreadyExists {
            description: description.to_string(),
            path: path_ref.display().to_string(),
        });
    }
    Ok(())
}

/// Validate that a numeric flag lies in `[min, max]`
///
/// # Errors
/// Returns [`SeqrunError::InvalidParameter`] naming the flag if the value
/// is out of range
pub fn validate_in_range<T: PartialOrd + Display + Copy>(
    value: T,
    min: T,
    max: T,
    name: &str,
) -> Result<()> {
    if value < min || value > max {
        return Err(SeqrunError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("must be between {min}-{max}, got: {value}"),
        });
    }
    Ok(())
}
