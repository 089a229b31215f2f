//! Error-path integration tests: precondition failures and input
//! validation across modules.

use crate::helpers::{pipeline_home, write_manifest};
use seqrun_lib::errors::SeqrunError;
use seqrun_lib::reference::{fai_path, sequence_count};
use seqrun_lib::runscript::{
    materialize_run_script, RunScriptValues, RUN_SCRIPT, RUN_TEMPLATE, WORKFLOW_FILE,
};
use seqrun_lib::units::{missing_inputs, read_units_from_manifest};
use seqrun_lib::validation::validate_absent;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn preexisting_output_directory_is_fatal_before_any_write() {
    let scratch = TempDir::new().unwrap();
    let outdir = scratch.path().join("run-out");
    fs::create_dir(&outdir).unwrap();

    let result = validate_absent(&outdir, "Output directory");
    assert!(matches!(result, Err(SeqrunError::AlreadyExists { .. })));
    // nothing was created inside the pre-existing directory
    assert_eq!(fs::read_dir(&outdir).unwrap().count(), 0);
}

#[test]
fn preexisting_run_script_is_fatal() {
    let (_home, basedir) = pipeline_home("bcl2fastq");
    let outdir = TempDir::new().unwrap();
    let out = outdir.path().join(RUN_SCRIPT);
    fs::write(&out, "#!/bin/bash\n").unwrap();

    let values = RunScriptValues {
        workflow: basedir.join(WORKFLOW_FILE),
        pipeline_name: "bcl2fastq".to_string(),
        slave_queue: None,
        mailto: None,
    };
    let result = materialize_run_script(&basedir.join(RUN_TEMPLATE), &out, &values);
    assert!(matches!(result, Err(SeqrunError::AlreadyExists { .. })));
    // the pre-existing script was not clobbered
    assert_eq!(fs::read_to_string(&out).unwrap(), "#!/bin/bash\n");
}

#[test]
fn fai_line_count_is_the_sequence_count() {
    let dir = TempDir::new().unwrap();
    let fasta = dir.path().join("ref.fa");
    fs::write(&fasta, ">chr1\nACGT\n").unwrap();

    // not indexed yet: fatal precondition
    assert!(matches!(
        sequence_count(&fasta),
        Err(SeqrunError::ReferenceNotIndexed { .. })
    ));

    fs::write(
        fai_path(&fasta),
        "chr1\t1000\t10\t60\t61\nchr2\t2000\t1100\t60\t61\nchrM\t16569\t3200\t60\t61\n",
    )
    .unwrap();
    assert_eq!(sequence_count(&fasta).unwrap(), 3);
}

#[test]
fn every_missing_fastq_is_reported_not_just_the_first() {
    let dir = TempDir::new().unwrap();
    let present = dir.path().join("present_R1.fastq.gz");
    fs::write(&present, "").unwrap();

    let manifest = write_manifest(
        dir.path(),
        "units.yaml",
        &format!(
            "- [run1, FC1, LIB1, 1, {}, /nonexistent/a_R2.fastq.gz]\n\
             - [run1, FC1, LIB2, 2, /nonexistent/b_R1.fastq.gz, null]\n",
            present.display()
        ),
    );
    let units = read_units_from_manifest(&manifest).unwrap();
    let missing = missing_inputs(&units);
    assert_eq!(missing.len(), 2);
    assert!(missing.contains(&PathBuf::from("/nonexistent/a_R2.fastq.gz")));
    assert!(missing.contains(&PathBuf::from("/nonexistent/b_R1.fastq.gz")));
}
