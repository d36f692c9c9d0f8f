//! Command-line argument parsing for athena-step.
//!
//! Every input can also come from the environment, which is how CI/CD
//! pipelines usually provide them.

use clap::Parser;
use std::path::PathBuf;

/// Output format for the invocation result printed to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The execution id as a bare line (nothing for a skipped run).
    #[default]
    Text,
    /// A JSON object with the execution id and run disposition.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Idempotent Athena query step for CI/CD pipelines.
#[derive(Parser, Debug)]
#[command(name = "athena-step")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Inline SQL text to execute
    #[arg(long, value_name = "SQL", env = "ATHENA_STEP_SQL")]
    pub sql: Option<String>,

    /// Path to a file containing the SQL text
    #[arg(long, value_name = "PATH", env = "ATHENA_STEP_SQL_FILE")]
    pub sql_file: Option<PathBuf>,

    /// S3 URI where Athena writes query results
    #[arg(long, value_name = "URI", env = "ATHENA_STEP_OUTPUT_LOCATION")]
    pub output_location: Option<String>,

    /// Athena workgroup to run the query under
    #[arg(long, value_name = "NAME", env = "ATHENA_STEP_WORKGROUP")]
    pub workgroup: Option<String>,

    /// DynamoDB table tracking query fingerprints (enables idempotency)
    #[arg(long, value_name = "TABLE", env = "ATHENA_STEP_STATE_TABLE")]
    pub state_table: Option<String>,

    /// Record id for this query within the state table
    #[arg(long, value_name = "ID", env = "ATHENA_STEP_STATE_ID")]
    pub state_id: Option<String>,

    /// Wait for the query to finish; the literal "true" enables waiting,
    /// anything else disables it
    #[arg(long, value_name = "BOOL", env = "ATHENA_STEP_WAIT", default_value = "false")]
    pub wait: String,

    /// Seconds to sleep between status checks while waiting
    #[arg(
        long,
        value_name = "SECS",
        env = "ATHENA_STEP_POLL_INTERVAL",
        default_value = "5"
    )]
    pub poll_interval_secs: u64,

    /// Give up with a timeout if the query has not reached a terminal state
    /// after this many seconds (default: wait forever)
    #[arg(long, value_name = "SECS", env = "ATHENA_STEP_POLL_TIMEOUT")]
    pub poll_timeout_secs: Option<u64>,

    /// Output format for the result printed to stdout
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output_format: String,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns true if the wait input is the literal string "true".
    pub fn wait_enabled(&self) -> bool {
        self.wait == "true"
    }

    /// Parses the output format from the --output-format argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.output_format.parse()
    }
}
