//! Athena query service implementation.
//!
//! Implements the QueryService trait against the Athena API via
//! StartQueryExecution and GetQueryExecution.

use async_trait::async_trait;
use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{QueryExecutionState, ResultConfiguration};
use aws_sdk_athena::Client;
use tracing::debug;

use crate::error::{Result, StepError};
use crate::exec::{ExecutionHandle, ExecutionState, QueryRequest, QueryService};

/// Query service backed by Amazon Athena.
#[derive(Debug, Clone)]
pub struct AthenaQueryService {
    client: Client,
}

impl AthenaQueryService {
    /// Creates a service from a shared AWS configuration.
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Maps the SDK's execution state to ours.
    ///
    /// Athena's state set is wider than this tool cares about; anything
    /// unknown is treated as non-terminal and polled again.
    fn map_state(state: Option<&QueryExecutionState>) -> ExecutionState {
        match state {
            Some(QueryExecutionState::Queued) => ExecutionState::Queued,
            Some(QueryExecutionState::Running) => ExecutionState::Running,
            Some(QueryExecutionState::Succeeded) => ExecutionState::Succeeded,
            Some(QueryExecutionState::Failed) => ExecutionState::Failed,
            Some(QueryExecutionState::Cancelled) => ExecutionState::Cancelled,
            _ => ExecutionState::Queued,
        }
    }
}

#[async_trait]
impl QueryService for AthenaQueryService {
    async fn submit(&self, request: &QueryRequest) -> Result<ExecutionHandle> {
        let mut call = self
            .client
            .start_query_execution()
            .query_string(&request.sql);

        if let Some(workgroup) = &request.workgroup {
            call = call.work_group(workgroup);
        }

        if let Some(location) = &request.output_location {
            call = call.result_configuration(
                ResultConfiguration::builder()
                    .output_location(location)
                    .build(),
            );
        }

        let output = call
            .send()
            .await
            .map_err(|e| StepError::submission(format!("{}", DisplayErrorContext(&e))))?;

        let id = output
            .query_execution_id()
            .ok_or_else(|| StepError::submission("service returned no query execution id"))?
            .to_string();

        debug!(execution_id = %id, "query submitted");

        // StartQueryExecution does not report a state; a fresh execution
        // starts out queued.
        Ok(ExecutionHandle {
            id,
            state: ExecutionState::Queued,
        })
    }

    async fn poll(&self, execution_id: &str) -> Result<ExecutionHandle> {
        let output = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| StepError::submission(format!("{}", DisplayErrorContext(&e))))?;

        let state = Self::map_state(
            output
                .query_execution()
                .and_then(|q| q.status())
                .and_then(|s| s.state()),
        );

        debug!(execution_id, state = %state, "query status");

        Ok(ExecutionHandle {
            id: execution_id.to_string(),
            state,
        })
    }
}
