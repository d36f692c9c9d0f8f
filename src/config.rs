//! Run configuration for athena-step.
//!
//! Turns raw CLI/environment inputs into a validated `RunConfig`. All input
//! validation happens here, before any remote call; the orchestrator only
//! ever sees a well-formed configuration.

use std::path::Path;
use std::time::Duration;

use tracing::info;
use url::Url;

use crate::cli::Cli;
use crate::error::{Result, StepError};
use crate::exec::QueryRequest;
use crate::store::TrackingKey;

/// Validated configuration for one invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The query to execute.
    pub request: QueryRequest,
    /// Fingerprint-tracking identity, if tracking is enabled.
    pub tracking: Option<TrackingKey>,
    /// Whether to poll the query until it reaches a terminal state.
    pub wait: bool,
    /// Sleep between status checks while waiting.
    pub poll_interval: Duration,
    /// Optional bound on the total time spent waiting.
    pub poll_timeout: Option<Duration>,
}

impl RunConfig {
    /// Builds a validated configuration from parsed CLI inputs.
    ///
    /// Violations are reported in a fixed order, first one wins:
    /// query source, result sink, query text, tracking-key pairing.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let source = match (&cli.sql, &cli.sql_file) {
            (None, None) => {
                return Err(StepError::validation(
                    "Either --sql or --sql-file must be set",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(StepError::validation(
                    "Accepts input for either --sql or --sql-file, but not both",
                ))
            }
            (Some(sql), None) => SqlSource::Inline(sql),
            (None, Some(path)) => SqlSource::File(path.as_path()),
        };

        if cli.workgroup.is_none() && cli.output_location.is_none() {
            return Err(StepError::validation(
                "Either --output-location, --workgroup, or both must be set",
            ));
        }

        if let Some(location) = &cli.output_location {
            Url::parse(location).map_err(|e| {
                StepError::validation(format!("Invalid output location {location}: {e}"))
            })?;
        }

        let sql = source.resolve()?;
        if sql.is_empty() {
            return Err(StepError::validation("Empty query"));
        }

        let tracking = resolve_tracking(cli)?;

        Ok(Self {
            request: QueryRequest {
                sql,
                workgroup: cli.workgroup.clone(),
                output_location: cli.output_location.clone(),
            },
            tracking,
            wait: cli.wait_enabled(),
            poll_interval: Duration::from_secs(cli.poll_interval_secs),
            poll_timeout: cli.poll_timeout_secs.map(Duration::from_secs),
        })
    }
}

/// The single query source left after presence validation.
enum SqlSource<'a> {
    Inline(&'a str),
    File(&'a Path),
}

impl SqlSource<'_> {
    /// Resolves the source to query text, reading the file if needed.
    fn resolve(&self) -> Result<String> {
        match self {
            Self::Inline(sql) => {
                info!("query loaded from input");
                Ok((*sql).to_string())
            }
            Self::File(path) => {
                let sql = read_sql_file(path)?;
                info!(path = %path.display(), "query loaded from file");
                Ok(sql)
            }
        }
    }
}

fn read_sql_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(StepError::validation(format!(
            "Unable to locate {}",
            path.display()
        )));
    }
    std::fs::read_to_string(path)
        .map_err(|e| StepError::validation(format!("Unable to read {}: {e}", path.display())))
}

/// Both tracking inputs or neither; partial presence is an input error.
fn resolve_tracking(cli: &Cli) -> Result<Option<TrackingKey>> {
    match (&cli.state_table, &cli.state_id) {
        (Some(table), Some(record_id)) => Ok(Some(TrackingKey {
            table: table.clone(),
            record_id: record_id.clone(),
        })),
        (None, None) => Ok(None),
        _ => Err(StepError::validation(
            "If using state tracking, both --state-table and --state-id must be set",
        )),
    }
}
