//! Idempotency and change-detection behavior across invocations.

use athena_step::exec::MockQueryService;
use athena_step::fingerprint::fingerprint;
use athena_step::orchestrator::{Orchestrator, RunOutcome};
use athena_step::outputs::MemorySink;
use athena_step::store::MemoryStateStore;
use pretty_assertions::assert_eq;

use super::run_config;

const TRACKED: &[&str] = &[
    "--workgroup",
    "primary",
    "--state-table",
    "query-state",
    "--state-id",
    "nightly-report",
];

fn tracked_args(sql: &str) -> Vec<&str> {
    let mut args = vec!["--sql", sql];
    args.extend_from_slice(TRACKED);
    args
}

#[tokio::test]
async fn untracked_invocation_submits_without_store_calls() {
    let service = MockQueryService::new().with_execution_id("exec-42");
    let store = MemoryStateStore::new();
    let sink = MemorySink::new();

    let config = run_config(&["--sql", "SELECT 1", "--workgroup", "wg1"]);
    let outcome = Orchestrator::new(&service, &store)
        .run(&config, &sink)
        .await
        .unwrap();

    assert_eq!(outcome.execution_id(), Some("exec-42"));
    assert_eq!(service.submit_count(), 1);
    assert_eq!(store.ensure_count(), 0);
    assert_eq!(store.get_count(), 0);
    assert_eq!(store.put_count(), 0);

    let requests = service.submitted_requests();
    assert_eq!(requests[0].sql, "SELECT 1");
    assert_eq!(requests[0].workgroup.as_deref(), Some("wg1"));
}

#[tokio::test]
async fn first_run_persists_then_identical_rerun_skips() {
    let service = MockQueryService::new();
    let store = MemoryStateStore::new();
    let sink = MemorySink::new();
    let orchestrator = Orchestrator::new(&service, &store);

    let config = run_config(&tracked_args("SELECT count(*) FROM events"));

    let first = orchestrator.run(&config, &sink).await.unwrap();
    assert!(!first.was_skipped());
    assert_eq!(
        store.record("query-state", "nightly-report").unwrap().hash,
        fingerprint("SELECT count(*) FROM events")
    );

    let second = orchestrator.run(&config, &sink).await.unwrap();
    assert_eq!(second, RunOutcome::Skipped);
    assert_eq!(second.execution_id(), None);
    assert_eq!(service.submit_count(), 1);
}

#[tokio::test]
async fn changed_text_reruns_and_overwrites_the_record() {
    let service = MockQueryService::new();
    let store = MemoryStateStore::new();
    let sink = MemorySink::new();
    let orchestrator = Orchestrator::new(&service, &store);

    orchestrator
        .run(&run_config(&tracked_args("SELECT 1")), &sink)
        .await
        .unwrap();
    orchestrator
        .run(&run_config(&tracked_args("SELECT 1 -- reviewed")), &sink)
        .await
        .unwrap();

    assert_eq!(service.submit_count(), 2);
    assert_eq!(
        store.record("query-state", "nightly-report").unwrap().hash,
        fingerprint("SELECT 1 -- reviewed")
    );
    assert_eq!(store.put_count(), 2);
}

#[tokio::test]
async fn tracked_identities_are_independent() {
    let service = MockQueryService::new();
    let store = MemoryStateStore::new();
    let sink = MemorySink::new();
    let orchestrator = Orchestrator::new(&service, &store);

    orchestrator
        .run(&run_config(&tracked_args("SELECT 1")), &sink)
        .await
        .unwrap();

    // Same SQL under a different record id is not a duplicate.
    let other = run_config(&[
        "--sql",
        "SELECT 1",
        "--workgroup",
        "primary",
        "--state-table",
        "query-state",
        "--state-id",
        "weekly-report",
    ]);
    let outcome = orchestrator.run(&other, &sink).await.unwrap();

    assert!(!outcome.was_skipped());
    assert_eq!(service.submit_count(), 2);
    assert!(store.record("query-state", "weekly-report").is_some());
}

#[tokio::test]
async fn wait_disabled_writes_fingerprint_without_status_checks() {
    // The documented race: with waiting disabled, success is presumed at
    // submission time and the fingerprint is written before the query can
    // have finished.
    let service = MockQueryService::new().with_execution_id("exec-7");
    let store = MemoryStateStore::new();
    let sink = MemorySink::new();

    let outcome = Orchestrator::new(&service, &store)
        .run(&run_config(&tracked_args("SELECT 1")), &sink)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Submitted {
            execution_id: "exec-7".to_string()
        }
    );
    assert_eq!(service.poll_count(), 0);
    assert_eq!(store.put_count(), 1);
    assert_eq!(sink.ids(), vec!["exec-7".to_string()]);
}
