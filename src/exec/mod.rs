//! Query execution layer for athena-step.
//!
//! Provides a trait-based interface for submitting a query to a remote
//! execution service and checking its status, allowing the Athena client
//! to be swapped for a mock in tests.

mod athena;
mod mock;

pub use athena::AthenaQueryService;
pub use mock::MockQueryService;

use crate::error::Result;
use async_trait::async_trait;

/// The unit of work for one invocation.
///
/// Immutable once built; validation of the field combination happens at the
/// configuration boundary before a request exists.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// The SQL text to execute.
    pub sql: String,
    /// Athena workgroup to run under, if any.
    pub workgroup: Option<String>,
    /// Result output location (S3 URI), if any.
    pub output_location: Option<String>,
}

/// Status of one query execution as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl ExecutionState {
    /// Returns the state as the service's uppercase string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns true if the service will not produce further updates.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Returns true for terminal states other than success.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One in-flight or completed submission to the query service.
///
/// Never persisted; the state store only ever records the fingerprint.
#[derive(Debug, Clone)]
pub struct ExecutionHandle {
    /// Opaque execution id returned by the service.
    pub id: String,
    /// Last observed status.
    pub state: ExecutionState,
}

/// Trait defining the interface for query execution services.
///
/// `submit` returns immediately with a handle; it never waits for the query
/// to finish. `poll` refreshes the status for a handle id and the caller
/// decides whether to repeat.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Starts a query execution and returns its handle.
    async fn submit(&self, request: &QueryRequest) -> Result<ExecutionHandle>;

    /// Fetches the current status for a previously submitted execution.
    async fn poll(&self, execution_id: &str) -> Result<ExecutionHandle>;
}
