//! Invocation outputs for athena-step.
//!
//! Downstream pipeline steps correlate on the query execution id, so it is
//! exposed the moment submission returns, before any polling. The id goes to
//! the step-output file (`$GITHUB_OUTPUT` convention) via an `OutputSink`;
//! the final stdout result is rendered separately from the run summary.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{info, warn};

use crate::cli::OutputFormat;
use crate::orchestrator::RunOutcome;

/// Sink for values exposed to downstream pipeline steps.
pub trait OutputSink: Send + Sync {
    /// Records the query execution id as soon as submission returns.
    fn execution_id(&self, id: &str);
}

/// File-backed step outputs in `name=value` lines.
///
/// Appends `query-id=<id>` to the file named by `$GITHUB_OUTPUT` when that
/// variable is set. A write failure downgrades to a warning rather than
/// failing the invocation; the id is still logged and printed as the
/// stdout result.
#[derive(Debug, Default)]
pub struct StepOutputs {
    output_file: Option<PathBuf>,
}

impl StepOutputs {
    /// Creates outputs bound to the step-output file from the environment.
    pub fn from_env() -> Self {
        Self {
            output_file: std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from),
        }
    }

    /// Creates outputs bound to an explicit file path.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            output_file: Some(path.into()),
        }
    }
}

impl OutputSink for StepOutputs {
    fn execution_id(&self, id: &str) {
        info!(execution_id = %id, "query execution id");

        let Some(path) = &self.output_file else {
            return;
        };

        let file = OpenOptions::new().create(true).append(true).open(path);
        match file {
            Ok(mut f) => {
                if let Err(e) = writeln!(f, "query-id={id}") {
                    warn!(path = %path.display(), "could not write step output: {e}");
                }
            }
            Err(e) => {
                warn!(path = %path.display(), "could not open step output file: {e}");
            }
        }
    }
}

/// Output sink that records ids in memory, for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    ids: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ids recorded so far.
    pub fn ids(&self) -> Vec<String> {
        self.ids.lock().unwrap().clone()
    }
}

impl OutputSink for MemorySink {
    fn execution_id(&self, id: &str) {
        self.ids.lock().unwrap().push(id.to_string());
    }
}

/// The invocation result printed to stdout.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Execution id, absent when the run was skipped.
    pub query_execution_id: Option<String>,
    /// True when the stored fingerprint matched and nothing was submitted.
    pub skipped: bool,
    /// True when polling confirmed the query succeeded.
    pub completed: bool,
}

impl RunSummary {
    /// Builds the summary from an orchestrator outcome.
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        match outcome {
            RunOutcome::Skipped => Self {
                query_execution_id: None,
                skipped: true,
                completed: false,
            },
            RunOutcome::Submitted { execution_id } => Self {
                query_execution_id: Some(execution_id.clone()),
                skipped: false,
                completed: false,
            },
            RunOutcome::Completed { execution_id } => Self {
                query_execution_id: Some(execution_id.clone()),
                skipped: false,
                completed: true,
            },
        }
    }

    /// Renders the summary in the requested format.
    ///
    /// Text format is the bare execution id, or nothing for a skipped run;
    /// JSON always produces an object.
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.query_execution_id.clone().unwrap_or_default(),
            OutputFormat::Json => {
                serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
            }
        }
    }
}
