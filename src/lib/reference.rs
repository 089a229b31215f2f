//! Reference-genome companion-file inspection.
//!
//! Indexing itself is done by external tools; this module only derives
//! facts from the companion files they leave next to the FASTA.

use crate::errors::{Result, SeqrunError};
use std::path::{Path, PathBuf};

/// Companion files produced by `bwa index`.
const BWA_INDEX_EXTENSIONS: [&str; 5] = ["amb", "ann", "bwt", "pac", "sa"];

/// Path of the FASTA's `.fai` companion index (`<fasta>.fai`).
#[must_use]
pub fn fai_path(fasta: &Path) -> PathBuf {
    PathBuf::from(format!("{}.fai", fasta.display()))
}

/// Number of reference sequences, taken from the `.fai` companion index.
///
/// The index has one record per sequence, so the count is simply its line
/// count; index content is not validated beyond that. An empty index
/// yields 0.
///
/// # Errors
/// Returns [`SeqrunError::ReferenceNotIndexed`] if the `.fai` file is
/// missing (the reference is considered not indexed).
pub fn sequence_count(fasta: &Path) -> Result<usize> {
    let fai = fai_path(fasta);
    if !fai.exists() {
        return Err(SeqrunError::ReferenceNotIndexed { path: fasta.display().to_string() });
    }
    let text = std::fs::read_to_string(&fai).map_err(|e| SeqrunError::Io {
        path: fai.display().to_string(),
        source: e,
    })?;
    Ok(text.lines().count())
}

/// Whether all `bwa index` companion files exist next to the FASTA.
#[must_use]
pub fn has_bwa_index(fasta: &Path) -> bool {
    BWA_INDEX_EXTENSIONS
        .iter()
        .all(|ext| PathBuf::from(format!("{}.{ext}", fasta.display())).exists())
}
