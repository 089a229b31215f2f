//! End-to-end run setup: unit resolution feeding the merge, persisted
//! artifacts, run-script materialization, and dry-run submission.

use crate::helpers::{indexed_reference, pipeline_home, write_fastq_pair, write_manifest};
use seqrun_lib::config::{
    load_default_config, merge_config, write_cluster_config, write_pipeline_config, ElmData,
    CLUSTER_CONFIG, LOG_DIR, MASTER_LOG, PIPELINE_CONFIG, SUBMISSION_LOG,
};
use seqrun_lib::reference::sequence_count;
use seqrun_lib::runscript::{
    materialize_run_script, RunScriptValues, RUN_SCRIPT, RUN_TEMPLATE, WORKFLOW_FILE,
};
use seqrun_lib::submit::{submit, SubmitCommand};
use seqrun_lib::units::{missing_inputs, read_unit_mapping, read_units_from_manifest};
use serde_yaml::{Mapping, Value};
use std::fs;
use tempfile::TempDir;

#[test]
fn variant_calling_run_setup_produces_all_artifacts() {
    let (_home, basedir) = pipeline_home("variant-calling-lofreq");
    let inputs = TempDir::new().unwrap();
    let (fq1, fq2) = write_fastq_pair(inputs.path(), "sample_a");
    let reference = indexed_reference(inputs.path(), 3);

    let manifest = write_manifest(
        inputs.path(),
        "units.yaml",
        &format!(
            "- [run1, FC1, LIB1, 1, {}, {}]\n",
            fq1.display(),
            fq2.display()
        ),
    );
    let read_units = read_units_from_manifest(&manifest).unwrap();
    assert!(missing_inputs(&read_units).is_empty());

    let scratch = TempDir::new().unwrap();
    let outdir = scratch.path().join("run-out");
    fs::create_dir_all(outdir.join(LOG_DIR)).unwrap();

    // user data the way the vcall command assembles it
    let mut user_data = Mapping::new();
    user_data.insert(Value::from("mail_on_completion"), Value::from(true));
    user_data.insert(
        Value::from("readunits"),
        Value::Mapping(read_unit_mapping(&read_units).unwrap()),
    );
    let mut references = Mapping::new();
    references.insert(Value::from("genome"), Value::from(reference.display().to_string()));
    references.insert(
        Value::from("num_chroms"),
        Value::from(sequence_count(&reference).unwrap() as u64),
    );
    user_data.insert(Value::from("references"), Value::Mapping(references));
    let mut samples = Mapping::new();
    samples.insert(
        Value::from("NA12878"),
        Value::Sequence(read_units.iter().map(|unit| Value::from(unit.key())).collect()),
    );
    user_data.insert(Value::from("samples"), Value::Mapping(samples));

    let elm = ElmData::new(
        "variant-calling-lofreq",
        "0.3.1-test",
        "gis",
        &outdir.join(MASTER_LOG),
    );

    let default_config = load_default_config(&basedir).unwrap();
    write_cluster_config(&outdir, &basedir).unwrap();
    let config = merge_config(&default_config, user_data, &elm).unwrap();
    write_pipeline_config(&outdir, &config, false).unwrap();

    let values = RunScriptValues {
        workflow: basedir.join(WORKFLOW_FILE),
        pipeline_name: "variant-calling-lofreq".to_string(),
        slave_queue: Some("slaves.q".to_string()),
        mailto: Some("operator@example.org".to_string()),
    };
    materialize_run_script(&basedir.join(RUN_TEMPLATE), &outdir.join(RUN_SCRIPT), &values)
        .unwrap();

    // all per-run artifacts are in place
    assert!(outdir.join(PIPELINE_CONFIG).exists());
    assert!(outdir.join(CLUSTER_CONFIG).exists());
    assert!(outdir.join(RUN_SCRIPT).exists());
    assert!(outdir.join(LOG_DIR).is_dir());

    // persisted config carries the three merged layers
    let persisted: Mapping =
        serde_yaml::from_str(&fs::read_to_string(outdir.join(PIPELINE_CONFIG)).unwrap())
            .unwrap();
    assert_eq!(persisted.get("threads"), default_config.get("threads"));
    let readunits = persisted.get("readunits").unwrap().as_mapping().unwrap();
    assert_eq!(readunits.len(), 1);
    assert!(readunits.get("LIB1.FC1.1").is_some());
    let sample_keys = persisted.get("samples").unwrap().get("NA12878").unwrap();
    assert_eq!(sample_keys.as_sequence().unwrap().len(), 1);
    let elm_block = persisted.get("ELM").unwrap();
    assert_eq!(
        elm_block.get("pipeline_name").unwrap().as_str(),
        Some("variant-calling-lofreq")
    );

    // rendered run script has its tokens substituted
    let run_script = fs::read_to_string(outdir.join(RUN_SCRIPT)).unwrap();
    assert!(run_script.contains("-N variant-calling-lofreq.master"));
    assert!(run_script.contains("-M operator@example.org"));
    assert!(run_script.contains("-q slaves.q"));
    assert!(!run_script.contains("@SNAKEFILE@"));
}

#[test]
fn dry_run_materializes_but_does_not_submit() {
    let (_home, basedir) = pipeline_home("bcl2fastq");
    let scratch = TempDir::new().unwrap();
    let outdir = scratch.path().join("run-out");
    fs::create_dir_all(outdir.join(LOG_DIR)).unwrap();
    let submission_log = outdir.join(SUBMISSION_LOG);
    fs::write(&submission_log, "").unwrap();

    let values = RunScriptValues {
        workflow: basedir.join(WORKFLOW_FILE),
        pipeline_name: "bcl2fastq".to_string(),
        slave_queue: None,
        mailto: None,
    };
    materialize_run_script(&basedir.join(RUN_TEMPLATE), &outdir.join(RUN_SCRIPT), &values)
        .unwrap();

    let command = SubmitCommand::for_outdir(outdir.clone(), Some("master.q".to_string()));
    submit(&command, true).unwrap();

    // the run script exists, the submission log is untouched
    assert!(outdir.join(RUN_SCRIPT).exists());
    assert_eq!(fs::read_to_string(&submission_log).unwrap(), "");

    // the rendered command is what the operator would submit by hand
    let line = command.shell_command();
    assert!(line.line().contains("qsub -q master.q run.sh"));
    assert!(line.line().ends_with(&format!(">> {SUBMISSION_LOG}")));
}
