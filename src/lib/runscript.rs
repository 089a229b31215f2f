//! Run-script materialization.
//!
//! The run script wraps the workflow-engine invocation for the scheduler's
//! master job. It is produced by literal token substitution over a shell
//! template shipped with each pipeline; no templating language is
//! involved, and tokens without a substitution are left untouched.

use crate::config::{LOG_DIR, MASTER_LOG};
use crate::errors::Result;
use crate::validation::{validate_absent, validate_file_exists};
use std::path::{Path, PathBuf};

/// Workflow definition file, relative to the pipeline install dir.
pub const WORKFLOW_FILE: &str = "Snakefile";
/// Run-script template, relative to the pipeline install dir.
pub const RUN_TEMPLATE: &str = "run.template.sh";
/// Materialized run script, relative to the output directory.
pub const RUN_SCRIPT: &str = "run.sh";

/// Substitution values for the run-script template tokens.
#[derive(Debug, Clone)]
pub struct RunScriptValues {
    /// Workflow definition path (`@SNAKEFILE@`)
    pub workflow: PathBuf,
    /// Pipeline name, also used for cluster job names (`@PIPELINE_NAME@`)
    pub pipeline_name: String,
    /// Queue for per-job submissions (`@DEFAULT_SLAVE_Q@`); empty string
    /// when unset
    pub slave_queue: Option<String>,
    /// Notification address (`@MAILTO@`); left untouched when unset, for
    /// templates that don't carry the token
    pub mailto: Option<String>,
}

/// Replaces the recognized tokens in `text`.
///
/// Replacement is literal. Unknown tokens survive unchanged so that
/// template-local constructs never trip the materializer.
#[must_use]
pub fn substitute_tokens(text: &str, values: &RunScriptValues) -> String {
    let mut rendered = text
        .replace("@SNAKEFILE@", &values.workflow.display().to_string())
        .replace("@LOGDIR@", LOG_DIR)
        .replace("@MASTERLOG@", MASTER_LOG)
        .replace("@PIPELINE_NAME@", &values.pipeline_name)
        .replace("@DEFAULT_SLAVE_Q@", values.slave_queue.as_deref().unwrap_or(""));
    if let Some(mailto) = &values.mailto {
        rendered = rendered.replace("@MAILTO@", mailto);
    }
    rendered
}

/// Materializes the run script from `template` into `out`.
///
/// # Errors
/// Fails if the template is missing, the output already exists, or the
/// write fails.
pub fn materialize_run_script(
    template: &Path,
    out: &Path,
    values: &RunScriptValues,
) -> Result<PathBuf> {
    validate_file_exists(template, "Run-script template")?;
    validate_absent(out, "Run script")?;
    let text = crate::config::read_file(template)?;
    crate::config::write_file(out, &substitute_tokens(&text, values))?;
    Ok(out.to_path_buf())
}
