//! Set up and submit a variant-calling run.
//!
//! Resolves the sample's read units from FASTQ arguments or a read-unit
//! manifest, checks the reference genome's companion indices, writes the
//! per-run pipeline configuration and run script into a fresh output
//! directory, and submits the run script to the cluster scheduler.

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::fs;
use std::path::PathBuf;

use seqrun_lib::config::{
    load_default_config, merge_config, write_cluster_config, write_pipeline_config, ElmData,
    LOG_DIR, MASTER_LOG, SUBMISSION_LOG,
};
use seqrun_lib::errors::SeqrunError;
use seqrun_lib::reference::{has_bwa_index, sequence_count};
use seqrun_lib::runscript::{
    materialize_run_script, RunScriptValues, RUN_SCRIPT, RUN_TEMPLATE, WORKFLOW_FILE,
};
use seqrun_lib::site;
use seqrun_lib::submit::{submit, SubmitCommand};
use seqrun_lib::units::{
    missing_inputs, read_unit_mapping, read_units_from_args, read_units_from_manifest, ReadUnit,
};
use seqrun_lib::validation::{validate_absent, validate_file_exists};
use serde_yaml::{Mapping, Value};

use crate::commands::command::Command;
use crate::commands::common::{LaunchOptions, SchedulerOptions};
use crate::version;

/// Pipeline name; same as the install folder name and used for cluster
/// job names.
const PIPELINE_NAME: &str = "variant-calling-lofreq";

/// Set up a variant-calling run.
///
/// Creates pipeline-specific config files in a fresh output directory and
/// runs the pipeline, unless otherwise requested.
#[derive(Debug, Parser)]
#[command(
    name = "vcall",
    about = "Set up and submit a variant-calling run",
    long_about = r"
Set up one variant-calling run for a single sample: resolve its read
units, record the reference genome and its sequence count, write the
merged pipeline config, cluster config, and run script into a fresh
output directory, and submit the run script to the scheduler.

Read units come either from --fq1/--fq2 (paired by position; --fq2 may be
shorter for single-end units) or from a read-unit manifest (-c). The
reference must already be indexed; indexing itself is left to the usual
external tools. With --no-run everything is materialized but nothing is
submitted.
"
)]
pub struct VariantCalling {
    /// FastQ file/s (gzip only). Multiple files supported; each gets a
    /// unique read-group id assigned. Clashes with -c.
    #[arg(short = '1', long = "fq1", num_args = 1..)]
    pub fq1: Vec<PathBuf>,

    /// FastQ file/s, second read of pair (if paired). See also --fq1
    #[arg(short = '2', long = "fq2", num_args = 1..)]
    pub fq2: Vec<PathBuf>,

    /// Sample name (required)
    #[arg(short = 's', long = "sample")]
    pub sample: Option<String>,

    /// Reference fasta file to use. Needs to be bwa and samtools indexed
    /// (default: the pipeline's configured genome)
    #[arg(short = 'r', long = "reffa")]
    pub reffa: Option<PathBuf>,

    /// Mark duplicate reads
    #[arg(short = 'd', long = "mark-dups")]
    pub mark_dups: bool,

    /// Read-unit manifest: YAML records of run, flowcell, library, lane,
    /// fq1, fq2 and optionally an explicit read-group id. Clashes with
    /// -1/-2.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Output directory (may not exist; required)
    #[arg(short = 'o', long = "outdir")]
    pub outdir: Option<PathBuf>,

    /// Don't send mail on completion
    #[arg(long = "no-mail")]
    pub no_mail: bool,

    #[command(flatten)]
    pub scheduler: SchedulerOptions,

    #[command(flatten)]
    pub launch: LaunchOptions,
}

/// The genome configured in the pipeline's default config, if any.
fn default_genome(default_config: &Mapping) -> Option<PathBuf> {
    default_config.get("references")?.get("genome")?.as_str().map(PathBuf::from)
}

impl VariantCalling {
    /// Resolves read units from the manifest or the positional FASTQ
    /// lists, whichever was given.
    fn resolve_read_units(&self) -> Result<Vec<ReadUnit>> {
        if let Some(manifest) = &self.config {
            if !self.fq1.is_empty() || !self.fq2.is_empty() {
                return Err(SeqrunError::InvalidParameter {
                    parameter: "config".to_string(),
                    reason: "a read-unit manifest overrides fastq input arguments; use one or the other"
                        .to_string(),
                }
                .into());
            }
            validate_file_exists(manifest, "Read-unit manifest")?;
            return Ok(read_units_from_manifest(manifest)?);
        }
        if self.fq1.is_empty() {
            return Err(SeqrunError::InvalidParameter {
                parameter: "fq1".to_string(),
                reason: "required unless a read-unit manifest is given".to_string(),
            }
            .into());
        }
        Ok(read_units_from_args(&self.fq1, &self.fq2)?)
    }
}

impl Command for VariantCalling {
    fn execute(&self) -> Result<()> {
        let sample = self.sample.as_ref().ok_or_else(|| SeqrunError::InvalidParameter {
            parameter: "sample".to_string(),
            reason: "a sample name is required".to_string(),
        })?;
        let outdir = self.outdir.as_ref().ok_or_else(|| SeqrunError::InvalidParameter {
            parameter: "outdir".to_string(),
            reason: "an output directory is required".to_string(),
        })?;

        let basedir = site::basedir(PIPELINE_NAME)?;
        let default_config = load_default_config(&basedir)?;

        let reffa = match &self.reffa {
            Some(reffa) => reffa.clone(),
            None => default_genome(&default_config).ok_or_else(|| SeqrunError::InvalidParameter {
                parameter: "reffa".to_string(),
                reason: "no genome configured in the default config".to_string(),
            })?,
        };
        validate_file_exists(&reffa, "Reference FASTA")?;
        if !has_bwa_index(&reffa) {
            return Err(SeqrunError::ReferenceNotIndexed {
                path: reffa.display().to_string(),
            }
            .into());
        }
        let num_chroms = sequence_count(&reffa)?;

        let read_units = self.resolve_read_units()?;
        info!("Resolved {} read unit(s)", read_units.len());
        let missing = missing_inputs(&read_units);
        if !missing.is_empty() {
            for path in &missing {
                error!("Non-existing input file {}", path.display());
            }
            return Err(SeqrunError::MissingInputs { count: missing.len() }.into());
        }

        validate_absent(outdir, "Output directory")?;
        info!("Creating output directory {}", outdir.display());
        // also creates the log dir immediately
        fs::create_dir_all(outdir.join(LOG_DIR))
            .with_context(|| format!("Failed to create output directory {}", outdir.display()))?;
        let outdir = outdir.canonicalize().unwrap_or_else(|_| outdir.clone());

        // turn arguments into user_data that gets merged into the config
        let mut user_data = Mapping::new();
        user_data.insert(Value::from("mail_on_completion"), Value::from(!self.no_mail));
        let readunits = read_unit_mapping(&read_units)?;
        user_data.insert(Value::from("readunits"), Value::Mapping(readunits));
        let mut references = Mapping::new();
        references.insert(Value::from("genome"), Value::from(reffa.display().to_string()));
        references.insert(Value::from("num_chroms"), Value::from(num_chroms as u64));
        user_data.insert(Value::from("references"), Value::Mapping(references));
        user_data.insert(Value::from("mark_dups"), Value::from(self.mark_dups));
        // samples associates each sample name (here just one) with the
        // keys of its read units
        let unit_keys: Vec<Value> =
            read_units.iter().map(|unit| Value::from(unit.key())).collect();
        let mut samples = Mapping::new();
        samples.insert(Value::from(sample.clone()), Value::Sequence(unit_keys));
        user_data.insert(Value::from("samples"), Value::Mapping(samples));

        let site = site::site();
        let elm = ElmData::new(
            PIPELINE_NAME,
            version::VERSION.as_str(),
            &site,
            &outdir.join(MASTER_LOG),
        );

        info!("Writing config files");
        write_cluster_config(&outdir, &basedir)?;
        let config = merge_config(&default_config, user_data, &elm)?;
        write_pipeline_config(&outdir, &config, false)?;

        info!("Writing the run file for site {site}");
        let values = RunScriptValues {
            workflow: basedir.join(WORKFLOW_FILE),
            pipeline_name: PIPELINE_NAME.to_string(),
            slave_queue: self.scheduler.slave_queue.clone(),
            mailto: Some(site::email_for_user()),
        };
        materialize_run_script(
            &basedir.join(RUN_TEMPLATE),
            &outdir.join(RUN_SCRIPT),
            &values,
        )?;

        let command =
            SubmitCommand::for_outdir(outdir.clone(), self.scheduler.master_queue.clone());
        submit(&command, self.launch.no_run)?;
        if !self.launch.no_run {
            info!("For submission details see {}", outdir.join(SUBMISSION_LOG).display());
            info!("The (master) logfile is {}", outdir.join(MASTER_LOG).display());
        }
        Ok(())
    }
}
