//! Poll-loop behavior when waiting for query completion.

use athena_step::exec::{ExecutionState, MockQueryService};
use athena_step::orchestrator::{Orchestrator, RunOutcome};
use athena_step::outputs::MemorySink;
use athena_step::store::MemoryStateStore;
use pretty_assertions::assert_eq;
use std::time::Duration;

use super::run_config;

fn waiting_args(sql: &str) -> Vec<&str> {
    vec!["--sql", sql, "--workgroup", "primary", "--wait", "true"]
}

#[tokio::test]
async fn running_twice_then_succeeded_completes_after_two_retries() {
    let service = MockQueryService::new()
        .with_execution_id("exec-1")
        .with_poll_states(&[
            ExecutionState::Running,
            ExecutionState::Running,
            ExecutionState::Succeeded,
        ]);
    let store = MemoryStateStore::new();
    let sink = MemorySink::new();

    let outcome = Orchestrator::new(&service, &store)
        .run(&run_config(&waiting_args("SELECT 1")), &sink)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            execution_id: "exec-1".to_string()
        }
    );
    assert_eq!(service.poll_count(), 3);
}

#[tokio::test]
async fn queued_counts_as_nonterminal() {
    let service = MockQueryService::new().with_poll_states(&[
        ExecutionState::Queued,
        ExecutionState::Running,
        ExecutionState::Succeeded,
    ]);
    let store = MemoryStateStore::new();
    let sink = MemorySink::new();

    let outcome = Orchestrator::new(&service, &store)
        .run(&run_config(&waiting_args("SELECT 1")), &sink)
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { .. }));
    assert_eq!(service.poll_count(), 3);
}

#[tokio::test]
async fn failed_query_yields_execution_error_and_no_fingerprint_write() {
    let service = MockQueryService::new()
        .with_poll_states(&[ExecutionState::Running, ExecutionState::Failed]);
    let store = MemoryStateStore::new();
    let sink = MemorySink::new();

    let config = run_config(&[
        "--sql",
        "SELECT 1",
        "--workgroup",
        "primary",
        "--wait",
        "true",
        "--state-table",
        "query-state",
        "--state-id",
        "nightly-report",
    ]);

    let err = Orchestrator::new(&service, &store)
        .run(&config, &sink)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Execution Error");
    assert!(err.to_string().contains("FAILED"));
    assert_eq!(store.put_count(), 0);
    // The execution id was exposed before polling began.
    assert_eq!(sink.ids().len(), 1);
}

#[tokio::test]
async fn poll_deadline_yields_timeout() {
    let service = MockQueryService::new().with_poll_states(&[
        ExecutionState::Running,
        ExecutionState::Running,
        ExecutionState::Running,
        ExecutionState::Running,
    ]);
    let store = MemoryStateStore::new();
    let sink = MemorySink::new();

    let mut config = run_config(&waiting_args("SELECT 1"));
    config.poll_timeout = Some(Duration::from_millis(0));

    let err = Orchestrator::new(&service, &store)
        .run(&config, &sink)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Timeout");
}

#[tokio::test]
async fn submission_rejection_is_fatal_and_never_polled() {
    let service = MockQueryService::new().failing_submission("SYNTAX_ERROR at line 1");
    let store = MemoryStateStore::new();
    let sink = MemorySink::new();

    let err = Orchestrator::new(&service, &store)
        .run(&run_config(&waiting_args("SELEC 1")), &sink)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Submission Error");
    assert_eq!(service.poll_count(), 0);
    assert!(sink.ids().is_empty());
}
