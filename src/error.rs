//! Error types for athena-step.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for athena-step operations.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation errors (missing SQL, contradictory flags, etc.)
    #[error("Validation error: {0}")]
    Validation(String),

    /// State store access errors other than "table not found"
    /// (permission denied, throttling, malformed records, etc.)
    #[error("State store error: {0}")]
    StoreAccess(String),

    /// Errors while creating or activating a missing state table.
    #[error("State table provisioning error: {0}")]
    StoreProvision(String),

    /// Query submission errors (malformed SQL, service rejection, etc.)
    #[error("Submission error: {0}")]
    Submission(String),

    /// The query service reported a terminal failure state.
    #[error("Query execution failed: {0}")]
    ExecutionFailed(String),

    /// The poll deadline elapsed before the query reached a terminal state.
    #[error("Timed out: {0}")]
    Timeout(String),
}

impl StepError {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a state store access error with the given message.
    pub fn store_access(msg: impl Into<String>) -> Self {
        Self::StoreAccess(msg.into())
    }

    /// Creates a store provisioning error with the given message.
    pub fn store_provision(msg: impl Into<String>) -> Self {
        Self::StoreProvision(msg.into())
    }

    /// Creates a submission error with the given message.
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    /// Creates an execution failure error with the given message.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Creates a timeout error with the given message.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::StoreAccess(_) => "State Store Error",
            Self::StoreProvision(_) => "Provisioning Error",
            Self::Submission(_) => "Submission Error",
            Self::ExecutionFailed(_) => "Execution Error",
            Self::Timeout(_) => "Timeout",
        }
    }
}

/// Result type alias using StepError.
pub type Result<T> = std::result::Result<T, StepError>;
