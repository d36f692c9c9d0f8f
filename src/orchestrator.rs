//! Run orchestration: the skip/submit/poll/persist state machine.
//!
//! One invocation runs exactly one query. With tracking enabled, the query
//! text's fingerprint is compared against the stored record first and an
//! unchanged query is never re-executed; the new fingerprint is written back
//! only once the run counts as successful.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::error::{Result, StepError};
use crate::exec::{ExecutionState, QueryService};
use crate::fingerprint::fingerprint;
use crate::outputs::OutputSink;
use crate::store::{FingerprintRecord, StateStore};

/// How one invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Stored fingerprint matched the query text; nothing was submitted.
    Skipped,
    /// Query submitted without waiting. Success is declared at submission
    /// time; the query may still be running or may yet fail.
    Submitted { execution_id: String },
    /// Query submitted and polling confirmed it succeeded.
    Completed { execution_id: String },
}

impl RunOutcome {
    /// The execution id, if a query was submitted.
    pub fn execution_id(&self) -> Option<&str> {
        match self {
            Self::Skipped => None,
            Self::Submitted { execution_id } | Self::Completed { execution_id } => {
                Some(execution_id)
            }
        }
    }

    /// True when the invocation skipped submission entirely.
    pub fn was_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Drives one invocation through the query service and state store.
pub struct Orchestrator<'a> {
    query_service: &'a dyn QueryService,
    state_store: &'a dyn StateStore,
}

impl<'a> Orchestrator<'a> {
    /// Creates an orchestrator over the given adapters.
    ///
    /// The state store is only contacted when the run configuration carries
    /// a tracking key.
    pub fn new(query_service: &'a dyn QueryService, state_store: &'a dyn StateStore) -> Self {
        Self {
            query_service,
            state_store,
        }
    }

    /// Runs one invocation to completion.
    ///
    /// The execution id is pushed to `outputs` immediately after submission,
    /// so downstream consumers can correlate even if polling later fails.
    ///
    /// Known consistency risk, kept deliberately: when `config.wait` is
    /// false the fingerprint is persisted right after submission, before the
    /// query can have finished. A query that later fails will not be re-run
    /// until its text changes.
    ///
    /// Two invocations racing on the same tracking key resolve by
    /// last-write-wins in the store; there is no locking.
    pub async fn run(&self, config: &RunConfig, outputs: &dyn OutputSink) -> Result<RunOutcome> {
        let hash = fingerprint(&config.request.sql);

        if let Some(key) = &config.tracking {
            self.state_store.ensure_table(&key.table).await?;

            if let Some(record) = self.state_store.get(&key.table, &key.record_id).await? {
                if record.hash == hash {
                    info!(record_id = %key.record_id, "query has not changed, nothing to do");
                    return Ok(RunOutcome::Skipped);
                }
                debug!(record_id = %key.record_id, "stored fingerprint differs, re-running");
            }
        }

        info!(sql = %config.request.sql, "running query");
        let handle = self.query_service.submit(&config.request).await?;
        outputs.execution_id(&handle.id);

        let outcome = if config.wait {
            self.wait_for_completion(&handle.id, config).await?;
            info!(execution_id = %handle.id, "query succeeded");
            RunOutcome::Completed {
                execution_id: handle.id,
            }
        } else {
            RunOutcome::Submitted {
                execution_id: handle.id,
            }
        };

        if let Some(key) = &config.tracking {
            let record = FingerprintRecord {
                record_id: key.record_id.clone(),
                hash,
                timestamp: epoch_seconds(),
            };
            self.state_store.put(&key.table, &record).await?;
            info!(record_id = %key.record_id, "state store updated with latest query fingerprint");
        }

        Ok(outcome)
    }

    /// Polls until the query reaches a terminal state.
    ///
    /// Unbounded unless the configuration carries a poll timeout.
    async fn wait_for_completion(&self, execution_id: &str, config: &RunConfig) -> Result<()> {
        let deadline = config.poll_timeout.map(|t| Instant::now() + t);

        loop {
            let handle = self.query_service.poll(execution_id).await?;

            if handle.state.is_failure() {
                return Err(StepError::execution_failed(format!(
                    "query {execution_id} reached state {}",
                    handle.state
                )));
            }

            if handle.state == ExecutionState::Succeeded {
                return Ok(());
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(StepError::timeout(format!(
                        "query {execution_id} still {} after the poll deadline",
                        handle.state
                    )));
                }
            }

            info!(
                execution_id,
                state = %handle.state,
                "waiting for query execution to finish, sleeping for {}s",
                config.poll_interval.as_secs()
            );
            sleep(config.poll_interval).await;
        }
    }
}

fn epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
