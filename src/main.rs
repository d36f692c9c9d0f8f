//! athena-step - idempotent Athena query step for CI/CD pipelines.

use athena_step::cli::Cli;
use athena_step::config::RunConfig;
use athena_step::error::{Result, StepError};
use athena_step::exec::AthenaQueryService;
use athena_step::orchestrator::Orchestrator;
use athena_step::outputs::{RunSummary, StepOutputs};
use athena_step::store::DynamoStateStore;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A .env file is optional; ignore a missing one.
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout is reserved for the invocation result.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let format = cli.parse_output_format().map_err(StepError::validation)?;
    let config = RunConfig::from_cli(&cli)?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let query_service = AthenaQueryService::new(&aws_config);
    let state_store = DynamoStateStore::new(&aws_config);
    let outputs = StepOutputs::from_env();

    let outcome = Orchestrator::new(&query_service, &state_store)
        .run(&config, &outputs)
        .await?;

    let rendered = RunSummary::from_outcome(&outcome).render(format);
    if !rendered.is_empty() {
        println!("{rendered}");
    }

    Ok(())
}
