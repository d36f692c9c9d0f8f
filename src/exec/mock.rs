//! Mock query service for testing.
//!
//! Returns a fixed execution id and walks through a scripted status
//! sequence, recording every call so tests can assert on submission counts.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, StepError};
use crate::exec::{ExecutionHandle, ExecutionState, QueryRequest, QueryService};

/// A mock query service with scripted poll responses.
#[derive(Debug, Default)]
pub struct MockQueryService {
    execution_id: String,
    poll_states: Mutex<VecDeque<ExecutionState>>,
    submit_error: Option<String>,
    submits: AtomicUsize,
    polls: AtomicUsize,
    requests: Mutex<Vec<QueryRequest>>,
}

impl MockQueryService {
    /// Creates a mock that accepts any submission and reports immediate
    /// success on the first poll.
    pub fn new() -> Self {
        Self {
            execution_id: "mock-execution-id".to_string(),
            ..Default::default()
        }
    }

    /// Sets the execution id returned from submissions.
    pub fn with_execution_id(mut self, id: impl Into<String>) -> Self {
        self.execution_id = id.into();
        self
    }

    /// Scripts the status sequence returned by successive polls.
    ///
    /// Once the script is exhausted, further polls report `Succeeded`.
    pub fn with_poll_states(self, states: &[ExecutionState]) -> Self {
        *self.poll_states.lock().unwrap() = states.iter().copied().collect();
        self
    }

    /// Makes every submission fail with the given message.
    pub fn failing_submission(mut self, msg: impl Into<String>) -> Self {
        self.submit_error = Some(msg.into());
        self
    }

    /// Number of submissions received.
    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    /// Number of status polls received.
    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    /// Returns the requests submitted so far.
    pub fn submitted_requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryService for MockQueryService {
    async fn submit(&self, request: &QueryRequest) -> Result<ExecutionHandle> {
        self.submits.fetch_add(1, Ordering::SeqCst);

        if let Some(msg) = &self.submit_error {
            return Err(StepError::submission(msg.clone()));
        }

        self.requests.lock().unwrap().push(request.clone());

        Ok(ExecutionHandle {
            id: self.execution_id.clone(),
            state: ExecutionState::Queued,
        })
    }

    async fn poll(&self, execution_id: &str) -> Result<ExecutionHandle> {
        self.polls.fetch_add(1, Ordering::SeqCst);

        let state = self
            .poll_states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ExecutionState::Succeeded);

        Ok(ExecutionHandle {
            id: execution_id.to_string(),
            state,
        })
    }
}
