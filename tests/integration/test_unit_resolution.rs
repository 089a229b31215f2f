//! Unit-resolution scenarios across manifest parsing, lane filtering,
//! and key derivation.

use crate::helpers::write_manifest;
use seqrun_lib::errors::SeqrunError;
use seqrun_lib::units::{
    read_units_from_manifest, sample_units_from_manifest, sample_unit_mapping,
};
use tempfile::TempDir;

#[test]
fn lane_filter_keeps_matching_units_in_source_order() {
    let dir = TempDir::new().unwrap();
    // two records share lane 3
    let manifest = write_manifest(
        dir.path(),
        "samples.yaml",
        "- [run1, FC1, LIB1, 3, Project_A/Sample_1]\n\
         - [run1, FC1, LIB2, 1, Project_A/Sample_2]\n\
         - [run1, FC1, LIB3, 3, Project_B/Sample_3]\n",
    );

    let units = sample_units_from_manifest(&manifest, &[3]).unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].library_id, "LIB1");
    assert_eq!(units[1].library_id, "LIB3");

    // a lane nobody sequenced yields an empty collection
    let units = sample_units_from_manifest(&manifest, &[4]).unwrap();
    assert!(units.is_empty());

    // an empty allow-list means no filtering
    let units = sample_units_from_manifest(&manifest, &[]).unwrap();
    assert_eq!(units.len(), 3);
}

#[test]
fn resolution_yields_one_unit_per_record_with_unique_keys() {
    let dir = TempDir::new().unwrap();
    let records: String = (1..=6)
        .map(|i| format!("- [run1, FC1, LIB{i}, {}, Project/Sample_{i}]\n", (i % 8) + 1))
        .collect();
    let manifest = write_manifest(dir.path(), "samples.yaml", &records);

    let units = sample_units_from_manifest(&manifest, &[]).unwrap();
    assert_eq!(units.len(), 6);

    let mapping = sample_unit_mapping(&units).unwrap();
    assert_eq!(mapping.len(), 6, "every unit keeps its own key");
}

#[test]
fn one_malformed_record_fails_the_whole_manifest() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        dir.path(),
        "samples.yaml",
        "- [run1, FC1, LIB1, 1, Project_A/Sample_1]\n\
         - [run1, FC1, LIB2, 2]\n\
         - [run1, FC1, LIB3, 3, Project_B/Sample_3]\n",
    );
    let result = sample_units_from_manifest(&manifest, &[]);
    assert!(
        matches!(result, Err(SeqrunError::InvalidManifest { .. })),
        "no partial collection may survive a malformed record"
    );
}

#[test]
fn explicit_read_group_overrides_derived_key() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        dir.path(),
        "units.yaml",
        "- [run1, FC1, LIB1, 1, a_R1.fastq.gz, a_R2.fastq.gz]\n\
         - [run1, FC1, LIB1, 2, b_R1.fastq.gz, b_R2.fastq.gz, RG_CUSTOM]\n",
    );
    let units = read_units_from_manifest(&manifest).unwrap();
    assert_eq!(units[0].key(), "LIB1.FC1.1");
    assert_eq!(units[1].key(), "RG_CUSTOM");
}

#[test]
fn duplicate_keys_across_manifest_records_are_fatal() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        dir.path(),
        "units.yaml",
        "- [run1, FC1, LIB1, 1, a_R1.fastq.gz, a_R2.fastq.gz]\n\
         - [run1, FC1, LIB1, 1, b_R1.fastq.gz, b_R2.fastq.gz]\n",
    );
    let result = read_units_from_manifest(&manifest);
    assert!(matches!(result, Err(SeqrunError::DuplicateUnitKey { key }) if key == "LIB1.FC1.1"));
}
