//! The validation boundary: every violation is rejected before any
//! adapter could be called.

use athena_step::cli::Cli;
use athena_step::config::RunConfig;
use clap::Parser;

fn try_config(args: &[&str]) -> Result<RunConfig, athena_step::error::StepError> {
    let mut full = vec!["athena-step"];
    full.extend_from_slice(args);
    RunConfig::from_cli(&Cli::parse_from(full))
}

#[test]
fn neither_sql_source_is_rejected() {
    let err = try_config(&["--workgroup", "primary"]).unwrap_err();
    assert_eq!(err.category(), "Validation Error");
    assert!(err.to_string().contains("--sql or --sql-file"));
}

#[test]
fn both_sql_sources_are_rejected() {
    let err = try_config(&[
        "--sql",
        "SELECT 1",
        "--sql-file",
        "query.sql",
        "--workgroup",
        "primary",
    ])
    .unwrap_err();
    assert!(err.to_string().contains("but not both"));
}

#[test]
fn missing_result_sink_is_rejected() {
    let err = try_config(&["--sql", "SELECT 1"]).unwrap_err();
    assert!(err
        .to_string()
        .contains("--output-location, --workgroup, or both"));
}

#[test]
fn unreadable_sql_file_is_rejected() {
    let err = try_config(&[
        "--sql-file",
        "/nonexistent/query.sql",
        "--workgroup",
        "primary",
    ])
    .unwrap_err();
    assert!(err.to_string().contains("Unable to locate"));
}

#[test]
fn empty_query_is_rejected() {
    let err = try_config(&["--sql", "", "--workgroup", "primary"]).unwrap_err();
    assert!(err.to_string().contains("Empty query"));
}

#[test]
fn empty_sql_file_is_rejected() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let err = try_config(&["--sql-file", &path, "--workgroup", "primary"]).unwrap_err();
    assert!(err.to_string().contains("Empty query"));
}

#[test]
fn partial_tracking_key_is_rejected_either_way() {
    for partial in [
        ["--state-table", "query-state"],
        ["--state-id", "nightly-report"],
    ] {
        let mut args = vec!["--sql", "SELECT 1", "--workgroup", "primary"];
        args.extend_from_slice(&partial);
        let err = try_config(&args).unwrap_err();
        assert!(
            err.to_string().contains("both --state-table and --state-id"),
            "partial key {partial:?} should be rejected"
        );
    }
}

#[test]
fn output_location_alone_satisfies_the_sink_requirement() {
    let config = try_config(&[
        "--sql",
        "SELECT 1",
        "--output-location",
        "s3://bucket/results/",
    ])
    .unwrap();
    assert_eq!(config.request.workgroup, None);
    assert_eq!(
        config.request.output_location.as_deref(),
        Some("s3://bucket/results/")
    );
}

#[test]
fn malformed_output_location_is_rejected() {
    let err = try_config(&["--sql", "SELECT 1", "--output-location", "results dir"]).unwrap_err();
    assert!(err.to_string().contains("Invalid output location"));
}
