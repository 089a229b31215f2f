//! Helper utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Default configuration template used by the fixture pipelines.
pub const DEFAULT_CONFIG_YAML: &str = "\
threads: 8
scratch: /scratch
references:
  genome: /refs/genome.fa
";

/// Run-script template carrying every recognized token.
pub const RUN_TEMPLATE_TEXT: &str = "\
#!/bin/bash
#$ -N @PIPELINE_NAME@.master
#$ -o @MASTERLOG@
#$ -M @MAILTO@
mkdir -p @LOGDIR@
snakemake -s @SNAKEFILE@ --drmaa ' -q @DEFAULT_SLAVE_Q@'
";

/// Creates a pipeline install dir (default config, cluster config, run
/// template, workflow file) under a fresh temp home.
///
/// Returns the home guard and the pipeline's basedir.
pub fn pipeline_home(pipeline: &str) -> (TempDir, PathBuf) {
    let home = TempDir::new().unwrap();
    let basedir = home.path().join(pipeline);
    fs::create_dir_all(&basedir).unwrap();
    fs::write(basedir.join("conf.default.yaml"), DEFAULT_CONFIG_YAML).unwrap();
    fs::write(basedir.join("cluster.yaml"), "__default__:\n  queue: batch.q\n").unwrap();
    fs::write(basedir.join("run.template.sh"), RUN_TEMPLATE_TEXT).unwrap();
    fs::write(basedir.join("Snakefile"), "# workflow definition\n").unwrap();
    (home, basedir)
}

/// Creates a paired set of (empty) FASTQ files.
pub fn write_fastq_pair(dir: &Path, prefix: &str) -> (PathBuf, PathBuf) {
    let fq1 = dir.join(format!("{prefix}_R1.fastq.gz"));
    let fq2 = dir.join(format!("{prefix}_R2.fastq.gz"));
    fs::write(&fq1, "").unwrap();
    fs::write(&fq2, "").unwrap();
    (fq1, fq2)
}

/// Creates a reference FASTA with a `.fai` of `num_seqs` records and the
/// full set of BWA companion files.
pub fn indexed_reference(dir: &Path, num_seqs: usize) -> PathBuf {
    let fasta = dir.join("genome.fa");
    fs::write(&fasta, ">chr1\nACGT\n").unwrap();
    let fai: String =
        (0..num_seqs).map(|i| format!("chr{}\t1000\t10\t60\t61\n", i + 1)).collect();
    fs::write(dir.join("genome.fa.fai"), fai).unwrap();
    for ext in ["amb", "ann", "bwt", "pac", "sa"] {
        fs::write(dir.join(format!("genome.fa.{ext}")), "").unwrap();
    }
    fasta
}

/// Writes a manifest file with the given YAML content.
pub fn write_manifest(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
