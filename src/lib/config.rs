//! Pipeline configuration: template loading, merging, write-once outputs.
//!
//! The persisted config is a single YAML mapping built from three layers:
//! the pipeline's default template, the caller-derived `user_data`, and a
//! provenance block stored under the reserved `ELM` key. The merge itself
//! is a pure transform over already-loaded mappings; all I/O lives in the
//! `load_*`/`write_*` functions and happens exactly once per invocation.

use crate::errors::{Result, SeqrunError};
use crate::validation::{validate_absent, validate_file_exists};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-run pipeline configuration, relative to the output directory.
pub const PIPELINE_CONFIG: &str = "conf.yaml";
/// Default configuration template, relative to the pipeline install dir.
pub const DEFAULT_CONFIG: &str = "conf.default.yaml";
/// Scheduler resource config, same file name in install dir and output dir.
pub const CLUSTER_CONFIG: &str = "cluster.yaml";

/// Log directory relative to the output directory.
pub const LOG_DIR: &str = "logs";
/// Master (workflow-engine) log relative to the output directory.
pub const MASTER_LOG: &str = "logs/snakemake.log";
/// Scheduler submission log relative to the output directory.
pub const SUBMISSION_LOG: &str = "logs/submission.log";

/// Reserved top-level key for the provenance block.
pub const ELM_KEY: &str = "ELM";
/// Placeholder for fields the scheduler environment fills in at execution
/// time.
pub const SET_ON_EXEC: &str = "SET_ON_EXEC";

/// Provenance block describing who/what/where triggered a run.
///
/// Only consumed by external tracking, never by the processing logic. The
/// optional identifier lists are parallel (one entry per unit) and only
/// set for runs resolved from a run identifier.
#[derive(Debug, Clone, Serialize)]
pub struct ElmData {
    pub pipeline_name: String,
    pub pipeline_version: String,
    pub site: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane_id: Option<Vec<String>>,
    pub log_path: String,
    pub instance_id: String,
    pub submitter: String,
}

impl ElmData {
    /// Creates a provenance block with execution-time fields set to the
    /// [`SET_ON_EXEC`] placeholder.
    #[must_use]
    pub fn new(pipeline_name: &str, pipeline_version: &str, site: &str, log_path: &Path) -> Self {
        Self {
            pipeline_name: pipeline_name.to_string(),
            pipeline_version: pipeline_version.to_string(),
            site: site.to_string(),
            run_id: None,
            library_id: None,
            lane_id: None,
            log_path: log_path.display().to_string(),
            instance_id: SET_ON_EXEC.to_string(),
            submitter: SET_ON_EXEC.to_string(),
        }
    }
}

/// Loads the default configuration template from the pipeline install dir.
///
/// # Errors
/// Fails if the template is missing, unreadable, or not a YAML mapping.
pub fn load_default_config(basedir: &Path) -> Result<Mapping> {
    let path = basedir.join(DEFAULT_CONFIG);
    validate_file_exists(&path, "Default configuration")?;
    let text = read_file(&path)?;
    Ok(serde_yaml::from_str(&text)?)
}

/// Merges caller-supplied values and the provenance block onto the default
/// configuration.
///
/// The default layer is cloned, never mutated. `user_data` overlays the
/// top level only (no recursive merge); keys absent from the default are
/// added. The provenance block goes under [`ELM_KEY`], which must not be
/// present beforehand.
///
/// # Errors
/// Returns [`SeqrunError::ProvenanceCollision`] if the template already
/// carries the provenance key.
pub fn merge_config(default: &Mapping, user_data: Mapping, elm: &ElmData) -> Result<Mapping> {
    let mut config = default.clone();
    for (key, value) in user_data {
        config.insert(key, value);
    }
    let elm_key = Value::from(ELM_KEY);
    if config.contains_key(&elm_key) {
        return Err(SeqrunError::ProvenanceCollision { key: ELM_KEY.to_string() });
    }
    config.insert(elm_key, serde_yaml::to_value(elm)?);
    Ok(config)
}

/// Serializes the merged configuration to `<outdir>/conf.yaml`.
///
/// The file is written exactly once; a pre-existing config is fatal unless
/// `force_overwrite` is set. After this write the program never mutates
/// the file again.
///
/// # Errors
/// Fails if the output already exists (unless forced) or cannot be
/// written.
pub fn write_pipeline_config(
    outdir: &Path,
    config: &Mapping,
    force_overwrite: bool,
) -> Result<PathBuf> {
    let path = outdir.join(PIPELINE_CONFIG);
    if !force_overwrite {
        validate_absent(&path, "Pipeline configuration")?;
    }
    let text = serde_yaml::to_string(config)?;
    write_file(&path, &text)?;
    Ok(path)
}

/// Copies the per-site scheduler resource config next to the pipeline
/// configuration.
///
/// # Errors
/// Fails if the source is missing or the destination already exists.
pub fn write_cluster_config(outdir: &Path, basedir: &Path) -> Result<PathBuf> {
    let source = basedir.join(CLUSTER_CONFIG);
    validate_file_exists(&source, "Cluster configuration")?;
    let dest = outdir.join(CLUSTER_CONFIG);
    validate_absent(&dest, "Cluster configuration")?;
    fs::copy(&source, &dest).map_err(|e| SeqrunError::Io {
        path: dest.display().to_string(),
        source: e,
    })?;
    Ok(dest)
}

pub(crate) fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| SeqrunError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| SeqrunError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
