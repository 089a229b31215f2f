//! Deployment-site services: site detection, install-dir resolution,
//! site-specific path derivation, and operator notification addresses.
//!
//! These wrap the environment this tool is deployed into; everything here
//! is env-var driven so batch nodes and tests can control it without
//! touching the code. Path derivation functions take the site as an
//! explicit parameter and stay pure.

use crate::errors::{Result, SeqrunError};
use chrono::Local;
use log::warn;
use std::env;
use std::path::PathBuf;

/// Deployment site, e.g. `gis` or `nscc`.
pub const ENV_SITE: &str = "SEQRUN_SITE";
/// Root directory of the pipeline installations.
pub const ENV_PIPELINE_HOME: &str = "SEQRUN_PIPELINE_HOME";
/// Overrides the derived notification address.
pub const ENV_MAILTO: &str = "SEQRUN_MAILTO";
/// Mail domain appended to the current user name.
pub const ENV_MAIL_DOMAIN: &str = "SEQRUN_MAIL_DOMAIN";

/// Site reported when detection fails.
pub const UNKNOWN_SITE: &str = "NA";

/// Detects the deployment site, falling back to [`UNKNOWN_SITE`] with a
/// warning when unset.
#[must_use]
pub fn site() -> String {
    env::var(ENV_SITE).unwrap_or_else(|_| {
        warn!("Unknown site ({ENV_SITE} is not set)");
        UNKNOWN_SITE.to_string()
    })
}

/// Install directory of one pipeline (templates, workflow file, default
/// config).
///
/// Resolves to `$SEQRUN_PIPELINE_HOME/<pipeline>` when the variable is
/// set, otherwise to a directory next to the executable.
///
/// # Errors
/// Fails only if the executable path cannot be determined.
pub fn basedir(pipeline_name: &str) -> Result<PathBuf> {
    if let Ok(home) = env::var(ENV_PIPELINE_HOME) {
        return Ok(PathBuf::from(home).join(pipeline_name));
    }
    let exe = env::current_exe().map_err(|e| SeqrunError::Io {
        path: "current executable".to_string(),
        source: e,
    })?;
    let dir = exe.parent().map_or_else(|| PathBuf::from("."), PathBuf::from);
    Ok(dir.join(pipeline_name))
}

/// Splits a `<machine>-…_<flowcell>` run identifier into machine, run,
/// and flowcell ids.
///
/// ```
/// use seqrun_lib::site::split_run_identifier;
///
/// let (machine, run, flowcell) = split_run_identifier("HS004-PE-R00139_BC6A7HANXX").unwrap();
/// assert_eq!(machine, "HS004");
/// assert_eq!(run, "HS004-PE-R00139");
/// assert_eq!(flowcell, "BC6A7HANXX");
/// ```
///
/// # Errors
/// Fails when the identifier does not contain both parts.
pub fn split_run_identifier(runid_and_flowcellid: &str) -> Result<(String, String, String)> {
    let invalid = || SeqrunError::InvalidParameter {
        parameter: "runid".to_string(),
        reason: format!("'{runid_and_flowcellid}' is not of the form <machine>-<run>_<flowcell>"),
    };
    let (run, flowcell) = runid_and_flowcellid.split_once('_').ok_or_else(invalid)?;
    let machine = run.split('-').next().unwrap_or("");
    if machine.is_empty() || flowcell.is_empty() {
        return Err(invalid());
    }
    Ok((machine.to_string(), run.to_string(), flowcell.to_string()))
}

/// Derives the sequencer output folder (the raw run directory) for a run
/// identifier.
///
/// # Errors
/// Fails on a malformed identifier or a site without known storage
/// layout.
pub fn run_folder_for_run_id(runid_and_flowcellid: &str, site: &str) -> Result<PathBuf> {
    let (machine, run, flowcell) = split_run_identifier(runid_and_flowcellid)?;
    if site != "gis" {
        return Err(SeqrunError::UnknownSite { site: site.to_string() });
    }
    // MiSeqs drop their runs one level deeper
    let dir = if machine.starts_with("MS00") {
        format!("/mnt/seq/userrig/{machine}/MiSeqOutput/{run}_{flowcell}")
    } else {
        format!("/mnt/seq/userrig/{machine}/{run}_{flowcell}")
    };
    Ok(PathBuf::from(dir))
}

/// Derives a fresh, timestamped demultiplexing output directory for a run
/// identifier.
///
/// # Errors
/// Fails on a malformed identifier or a site without known storage
/// layout.
pub fn demux_outdir_for_run_id(runid_and_flowcellid: &str, site: &str) -> Result<PathBuf> {
    let (machine, run, flowcell) = split_run_identifier(runid_and_flowcellid)?;
    if site != "gis" {
        return Err(SeqrunError::UnknownSite { site: site.to_string() });
    }
    Ok(PathBuf::from(format!(
        "/mnt/projects/userrig/{machine}/{run}_{flowcell}/bcl2fastq_{}",
        generate_timestamp()
    )))
}

/// Notification address for the current user.
///
/// Whoever runs this command is almost certainly who the scheduler should
/// notify, so the address is derived from the invoking user unless
/// overridden.
#[must_use]
pub fn email_for_user() -> String {
    if let Ok(address) = env::var(ENV_MAILTO) {
        return address;
    }
    let user = env::var("USER").unwrap_or_else(|_| "nobody".to_string());
    let domain = env::var(ENV_MAIL_DOMAIN).unwrap_or_else(|_| "localhost".to_string());
    format!("{user}@{domain}")
}

/// Filesystem-safe timestamp for output-directory names.
#[must_use]
pub fn generate_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H-%M-%S").to_string()
}
