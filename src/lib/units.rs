//! Processing-unit resolution.
//!
//! A *unit* is one (sample, lane) or (sample, read-group) grouping of input
//! files that gets processed independently before aggregation. Demultiplexing
//! works on [`SampleUnit`]s, variant calling on [`ReadUnit`]s. Units come
//! either from a declarative YAML manifest (a sequence of fixed-arity
//! records, mapped positionally onto the unit fields) or, for read units,
//! from positional `--fq1`/`--fq2` argument lists.
//!
//! Every unit has a deterministic key derived from its identifying fields;
//! keys must be unique within a run and become the per-unit keys of the
//! pipeline configuration's unit mapping.

use crate::errors::{Result, SeqrunError};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Number of fields in a sample-unit manifest record.
const SAMPLE_UNIT_FIELDS: usize = 5;

/// One (sample, lane) grouping from a demultiplexing run.
///
/// All fields are opaque strings except `lane_id`, which must be
/// integer-convertible (validated at construction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleUnit {
    pub run_id: String,
    pub flowcell_id: String,
    pub library_id: String,
    pub lane_id: String,
    pub sample_dir: String,
}

impl SampleUnit {
    /// Builds a unit from one positional manifest record.
    ///
    /// # Errors
    /// Returns [`SeqrunError::InvalidManifest`] if the record does not have
    /// exactly 5 scalar fields or its lane is not a number.
    fn from_record(record: &[Value], manifest: &Path, index: usize) -> Result<Self> {
        if record.len() != SAMPLE_UNIT_FIELDS {
            return Err(record_error(
                manifest,
                index,
                &format!("has {} fields, expected {SAMPLE_UNIT_FIELDS}", record.len()),
            ));
        }
        let mut fields = Vec::with_capacity(SAMPLE_UNIT_FIELDS);
        for value in record {
            fields.push(
                scalar_string(value)
                    .ok_or_else(|| record_error(manifest, index, "contains a non-scalar field"))?,
            );
        }
        let unit = Self {
            run_id: fields[0].clone(),
            flowcell_id: fields[1].clone(),
            library_id: fields[2].clone(),
            lane_id: fields[3].clone(),
            sample_dir: fields[4].clone(),
        };
        if unit.lane().is_err() {
            return Err(record_error(
                manifest,
                index,
                &format!("lane '{}' is not a number", unit.lane_id),
            ));
        }
        Ok(unit)
    }

    /// The lane as a number.
    ///
    /// # Errors
    /// Returns [`SeqrunError::InvalidParameter`] if `lane_id` is not
    /// integer-convertible.
    pub fn lane(&self) -> Result<u32> {
        self.lane_id.parse::<u32>().map_err(|_| SeqrunError::InvalidParameter {
            parameter: "lane_id".to_string(),
            reason: format!("'{}' is not a number", self.lane_id),
        })
    }

    /// Deterministic unit key, unique within a run.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}.{}.{}", self.library_id, self.flowcell_id, self.lane_id)
    }
}

/// One read-group's worth of FASTQ input for variant calling.
///
/// Units built from positional arguments carry no run/flowcell/library
/// metadata; they get a synthesized read-group id instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadUnit {
    pub run_id: Option<String>,
    pub flowcell_id: Option<String>,
    pub library_id: Option<String>,
    pub lane_id: Option<String>,
    pub fq1: PathBuf,
    pub fq2: Option<PathBuf>,
    pub rg_id: Option<String>,
}

impl ReadUnit {
    /// Deterministic unit key: the explicit read-group id when present,
    /// otherwise derived from the identifying fields.
    #[must_use]
    pub fn key(&self) -> String {
        if let Some(rg_id) = &self.rg_id {
            return rg_id.clone();
        }
        format!(
            "{}.{}.{}",
            self.library_id.as_deref().unwrap_or("NA"),
            self.flowcell_id.as_deref().unwrap_or("NA"),
            self.lane_id.as_deref().unwrap_or("NA")
        )
    }
}

/// Resolves sample units from a manifest, optionally restricted to an
/// allow-list of lane numbers.
///
/// The manifest is a YAML sequence of 5-field records
/// `[run, flowcell, library, lane, sample_dir]`. An empty `lanes` slice
/// means "no filtering"; surviving units keep their source order.
///
/// # Errors
/// Fails on unreadable/unparseable manifests, any record with the wrong
/// arity (the whole manifest is rejected, no partial collection), a
/// non-numeric lane, or duplicate unit keys.
pub fn sample_units_from_manifest(manifest: &Path, lanes: &[u32]) -> Result<Vec<SampleUnit>> {
    let records = load_manifest(manifest)?;
    let mut units = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let unit = SampleUnit::from_record(record, manifest, index)?;
        let lane = unit.lane()?;
        if !lanes.is_empty() && !lanes.contains(&lane) {
            continue;
        }
        units.push(unit);
    }
    check_unique_keys(units.iter().map(SampleUnit::key))?;
    Ok(units)
}

/// Resolves read units from a manifest.
///
/// Records are YAML sequences of 6 fields
/// `[run, flowcell, library, lane, fq1, fq2]` or 7 fields with a trailing
/// explicit read-group id, which then overrides the derived key. `fq2` may
/// be null for single-end input.
///
/// # Errors
/// Fails on unreadable/unparseable manifests, wrong-arity records, or
/// duplicate unit keys.
pub fn read_units_from_manifest(manifest: &Path) -> Result<Vec<ReadUnit>> {
    let records = load_manifest(manifest)?;
    let mut units = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let rg_id = match record.len() {
            6 => None,
            7 => optional_scalar(&record[6]),
            n => {
                return Err(record_error(manifest, index, &format!("has {n} fields, expected 6 or 7")));
            }
        };
        let mut fields = Vec::with_capacity(4);
        for value in &record[..4] {
            fields.push(
                scalar_string(value)
                    .ok_or_else(|| record_error(manifest, index, "contains a non-scalar field"))?,
            );
        }
        let fq1 = scalar_string(&record[4])
            .map(PathBuf::from)
            .ok_or_else(|| record_error(manifest, index, "is missing the fq1 path"))?;
        let fq2 = optional_scalar(&record[5]).map(PathBuf::from);
        units.push(ReadUnit {
            run_id: Some(fields[0].clone()),
            flowcell_id: Some(fields[1].clone()),
            library_id: Some(fields[2].clone()),
            lane_id: Some(fields[3].clone()),
            fq1,
            fq2,
            rg_id,
        });
    }
    check_unique_keys(units.iter().map(ReadUnit::key))?;
    Ok(units)
}

/// Resolves read units from positional `--fq1`/`--fq2` argument lists.
///
/// Files are paired by position. `fq2` may be shorter than `fq1`
/// (single-end units) but never longer. Each unit gets a synthesized,
/// position-based read-group id; ids are never derived from file names.
///
/// # Errors
/// Fails if `fq2` has more entries than `fq1`.
pub fn read_units_from_args(fq1: &[PathBuf], fq2: &[PathBuf]) -> Result<Vec<ReadUnit>> {
    if fq2.len() > fq1.len() {
        return Err(SeqrunError::InvalidParameter {
            parameter: "fq2".to_string(),
            reason: format!("got {} files but only {} fq1 file(s)", fq2.len(), fq1.len()),
        });
    }
    let mut units = Vec::with_capacity(fq1.len());
    for (index, fq1_path) in fq1.iter().enumerate() {
        units.push(ReadUnit {
            run_id: None,
            flowcell_id: None,
            library_id: None,
            lane_id: None,
            fq1: fq1_path.clone(),
            fq2: fq2.get(index).cloned(),
            rg_id: Some(format!("unit-{}", index + 1)),
        });
    }
    check_unique_keys(units.iter().map(ReadUnit::key))?;
    Ok(units)
}

/// Verifies that no two units share a derived key.
///
/// # Errors
/// Returns [`SeqrunError::DuplicateUnitKey`] naming the first collision.
pub fn check_unique_keys(keys: impl IntoIterator<Item = String>) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key.clone()) {
            return Err(SeqrunError::DuplicateUnitKey { key });
        }
    }
    Ok(())
}

/// Collects every referenced FASTQ path that does not exist on disk, so
/// the caller can report all problems at once before aborting.
#[must_use]
pub fn missing_inputs(units: &[ReadUnit]) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    for unit in units {
        for path in std::iter::once(&unit.fq1).chain(unit.fq2.as_ref()) {
            if !path.exists() {
                missing.push(path.clone());
            }
        }
    }
    missing
}

/// Builds the `units` mapping (key -> fields) embedded in the pipeline
/// configuration.
///
/// # Errors
/// Fails only if a unit cannot be serialized.
pub fn sample_unit_mapping(units: &[SampleUnit]) -> Result<Mapping> {
    let mut mapping = Mapping::new();
    for unit in units {
        mapping.insert(Value::from(unit.key()), serde_yaml::to_value(unit)?);
    }
    Ok(mapping)
}

/// Builds the `readunits` mapping (key -> fields) embedded in the pipeline
/// configuration.
///
/// # Errors
/// Fails only if a unit cannot be serialized.
pub fn read_unit_mapping(units: &[ReadUnit]) -> Result<Mapping> {
    let mut mapping = Mapping::new();
    for unit in units {
        mapping.insert(Value::from(unit.key()), serde_yaml::to_value(unit)?);
    }
    Ok(mapping)
}

fn load_manifest(manifest: &Path) -> Result<Vec<Vec<Value>>> {
    let text = fs::read_to_string(manifest).map_err(|e| SeqrunError::Io {
        path: manifest.display().to_string(),
        source: e,
    })?;
    serde_yaml::from_str(&text).map_err(|e| SeqrunError::InvalidManifest {
        path: manifest.display().to_string(),
        reason: e.to_string(),
    })
}

fn record_error(manifest: &Path, index: usize, reason: &str) -> SeqrunError {
    SeqrunError::InvalidManifest {
        path: manifest.display().to_string(),
        reason: format!("record {index} {reason}"),
    }
}

/// Stringifies a YAML scalar; manifests may spell lanes as bare numbers.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn optional_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => scalar_string(other),
    }
}
