//! Set up and submit a base-calling/demultiplexing run.
//!
//! Resolves the run's sample units from a manifest, writes the per-run
//! pipeline configuration and run script into a fresh output directory,
//! and submits the run script to the cluster scheduler.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs;
use std::path::PathBuf;

use seqrun_lib::config::{
    load_default_config, merge_config, write_cluster_config, write_pipeline_config, ElmData,
    LOG_DIR, MASTER_LOG, SUBMISSION_LOG,
};
use seqrun_lib::errors::SeqrunError;
use seqrun_lib::runscript::{
    materialize_run_script, RunScriptValues, RUN_SCRIPT, RUN_TEMPLATE, WORKFLOW_FILE,
};
use seqrun_lib::site;
use seqrun_lib::submit::{submit, SubmitCommand};
use seqrun_lib::units::{sample_unit_mapping, sample_units_from_manifest};
use seqrun_lib::validation::{validate_absent, validate_dir_exists, validate_file_exists, validate_in_range};
use serde_yaml::{Mapping, Value};

use crate::commands::command::Command;
use crate::commands::common::{LaunchOptions, SchedulerOptions};
use crate::version;

/// Pipeline name; same as the install folder name and used for cluster
/// job names.
const PIPELINE_NAME: &str = "bcl2fastq";

/// Sample sheet consumed by the demultiplexer, relative to the output
/// directory.
const SAMPLESHEET_CSV: &str = "samplesheet.csv";

/// Set up a demultiplexing run.
///
/// Creates pipeline-specific config files in a fresh output directory and
/// runs the pipeline, unless otherwise requested.
#[derive(Debug, Parser)]
#[command(
    name = "demux",
    about = "Set up and submit a base-calling/demultiplexing run",
    long_about = r"
Set up one demultiplexing run: resolve the sample units listed in the
sample manifest, write the merged pipeline config, cluster config, and
run script into a fresh output directory, and submit the run script to
the scheduler.

The run is identified either by its run-plus-flowcell id (-r), from which
the sequencer output folder is derived, or by pointing -d at that folder
directly. With --no-run everything is materialized but nothing is
submitted.
"
)]
pub struct Demux {
    /// Run ID plus flowcell ID (clashes with -d)
    #[arg(short = 'r', long = "runid")]
    pub runid: Option<String>,

    /// BCL input directory (clashes with -r)
    #[arg(short = 'd', long = "rundir")]
    pub rundir: Option<PathBuf>,

    /// Output directory (may not exist; derived from -r when omitted)
    #[arg(short = 'o', long = "outdir")]
    pub outdir: Option<PathBuf>,

    /// Sample manifest: YAML records of run, flowcell, library, lane,
    /// sample dir (required)
    #[arg(short = 'c', long = "sample-cfg")]
    pub sample_cfg: Option<PathBuf>,

    /// Limit run to given lane/s (repeatable)
    #[arg(short = 'l', long = "lanes")]
    pub lanes: Vec<u32>,

    /// Max. number of allowed barcode mismatches (0<=x<=2)
    #[arg(short = 'i', long = "mismatches", default_value_t = 1)]
    pub mismatches: u8,

    #[command(flatten)]
    pub scheduler: SchedulerOptions,

    #[command(flatten)]
    pub launch: LaunchOptions,
}

impl Demux {
    /// Resolves the sequencer output folder from the given arguments.
    fn resolve_rundir(&self, site: &str) -> Result<PathBuf> {
        let rundir = match (&self.runid, &self.rundir) {
            (Some(_), Some(_)) => {
                return Err(SeqrunError::InvalidParameter {
                    parameter: "runid".to_string(),
                    reason: "cannot use run id and input directory simultaneously".to_string(),
                }
                .into());
            }
            (Some(runid), None) => site::run_folder_for_run_id(runid, site)?,
            (None, Some(rundir)) => rundir.clone(),
            (None, None) => {
                return Err(SeqrunError::InvalidParameter {
                    parameter: "runid".to_string(),
                    reason: "need either a run id or an input directory".to_string(),
                }
                .into());
            }
        };
        validate_dir_exists(&rundir, "Run directory")?;
        Ok(rundir)
    }

    /// Resolves the output directory, deriving a site-specific timestamped
    /// location when only a run id was given.
    fn resolve_outdir(&self, site: &str) -> Result<PathBuf> {
        match (&self.outdir, &self.runid) {
            (Some(outdir), _) => Ok(outdir.clone()),
            (None, Some(runid)) => Ok(site::demux_outdir_for_run_id(runid, site)?),
            (None, None) => Err(SeqrunError::InvalidParameter {
                parameter: "outdir".to_string(),
                reason: "required when no run id is given".to_string(),
            }
            .into()),
        }
    }

    /// The demultiplexer's `--tiles` restriction for the selected lanes,
    /// or an empty string when all lanes run.
    fn lanes_arg(&self) -> String {
        if self.lanes.is_empty() {
            return String::new();
        }
        let tiles: Vec<String> = self.lanes.iter().map(|lane| format!("s_{lane}")).collect();
        format!("--tiles {}", tiles.join(","))
    }
}

impl Command for Demux {
    fn execute(&self) -> Result<()> {
        validate_in_range(self.mismatches, 0, 2, "mismatches")?;
        for lane in &self.lanes {
            validate_in_range(*lane, 1, 8, "lanes")?;
        }

        let site = site::site();
        let rundir = self.resolve_rundir(&site)?;
        info!("Rundir is {}", rundir.display());

        let sample_cfg = self.sample_cfg.as_ref().ok_or_else(|| SeqrunError::InvalidParameter {
            parameter: "sample-cfg".to_string(),
            reason: "a sample manifest is required".to_string(),
        })?;
        validate_file_exists(sample_cfg, "Sample manifest")?;
        let sample_units = sample_units_from_manifest(sample_cfg, &self.lanes)?;
        info!("Resolved {} sample unit(s)", sample_units.len());

        let outdir = self.resolve_outdir(&site)?;
        validate_absent(&outdir, "Output directory")?;
        info!("Writing to {}", outdir.display());
        // create the log dir, and hence the output dir, immediately
        fs::create_dir_all(outdir.join(LOG_DIR))
            .with_context(|| format!("Failed to create output directory {}", outdir.display()))?;
        let outdir = outdir.canonicalize().unwrap_or(outdir);

        // turn arguments into user_data that gets merged into the config
        let mut user_data = Mapping::new();
        user_data.insert(Value::from("rundir"), Value::from(rundir.display().to_string()));
        user_data.insert(Value::from("samplesheet_csv"), Value::from(SAMPLESHEET_CSV));
        user_data.insert(Value::from("lanes_arg"), Value::from(self.lanes_arg()));
        user_data.insert(
            Value::from("barcode_mismatch_arg"),
            Value::from(format!("--barcode-mismatches {}", self.mismatches)),
        );
        user_data.insert(
            Value::from("units"),
            Value::Mapping(sample_unit_mapping(&sample_units)?),
        );

        let mut elm = ElmData::new(
            PIPELINE_NAME,
            version::VERSION.as_str(),
            &site,
            &outdir.join(MASTER_LOG),
        );
        if let Some(runid) = &self.runid {
            let (_, run_id, _) = site::split_run_identifier(runid)?;
            elm.run_id = Some(vec![run_id; sample_units.len()]);
            elm.library_id =
                Some(sample_units.iter().map(|unit| unit.library_id.clone()).collect());
            elm.lane_id = Some(sample_units.iter().map(|unit| unit.lane_id.clone()).collect());
        }

        info!("Writing config files");
        let basedir = site::basedir(PIPELINE_NAME)?;
        write_cluster_config(&outdir, &basedir)?;
        let default_config = load_default_config(&basedir)?;
        let config = merge_config(&default_config, user_data, &elm)?;
        write_pipeline_config(&outdir, &config, false)?;

        info!("Writing the run file for site {site}");
        let values = RunScriptValues {
            workflow: basedir.join(WORKFLOW_FILE),
            pipeline_name: PIPELINE_NAME.to_string(),
            slave_queue: self.scheduler.slave_queue.clone(),
            mailto: None,
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
