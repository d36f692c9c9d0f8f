//! DynamoDB state store implementation.
//!
//! One item per tracked query identity, keyed by a string `id` attribute:
//! `{ id, hash, timestamp }`. Tables are provisioned on demand with
//! on-demand billing and waited on until ACTIVE before first use.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType, TableStatus, Tag,
};
use aws_sdk_dynamodb::Client;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::{Result, StepError};
use crate::store::{FingerprintRecord, StateStore};

/// Delay between DescribeTable calls while waiting for a fresh table to
/// become ACTIVE.
const ACTIVATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// DescribeTable attempts before giving up on activation. On-demand tables
/// normally activate within seconds; a minute of waiting means something is
/// wrong upstream.
const ACTIVATION_MAX_ATTEMPTS: u32 = 30;

/// State store backed by DynamoDB.
#[derive(Debug, Clone)]
pub struct DynamoStateStore {
    client: Client,
}

impl DynamoStateStore {
    /// Creates a store from a shared AWS configuration.
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Creates the fingerprint table: single string key `id`, on-demand
    /// capacity, provenance tags.
    async fn create_table(&self, table: &str) -> Result<()> {
        let key_attribute = AttributeDefinition::builder()
            .attribute_name("id")
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| StepError::store_provision(e.to_string()))?;

        let key_schema = KeySchemaElement::builder()
            .attribute_name("id")
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| StepError::store_provision(e.to_string()))?;

        let tags = [
            ("Product", "athena-step"),
            ("Description", "Tracks Athena query state between pipeline runs."),
            ("URL", "https://github.com/cebollia/athena-step"),
        ]
        .into_iter()
        .map(|(key, value)| Tag::builder().key(key).value(value).build())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| StepError::store_provision(e.to_string()))?;

        self.client
            .create_table()
            .table_name(table)
            .attribute_definitions(key_attribute)
            .key_schema(key_schema)
            .billing_mode(BillingMode::PayPerRequest)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| StepError::store_provision(format!("{}", DisplayErrorContext(&e))))?;

        info!(table, "state table created, waiting for activation");
        self.wait_until_active(table).await
    }

    /// Polls DescribeTable until the table reports ACTIVE.
    ///
    /// A caller proceeding against a not-yet-active table would fail its
    /// first read, so creation does not return until the table is usable.
    async fn wait_until_active(&self, table: &str) -> Result<()> {
        for attempt in 1..=ACTIVATION_MAX_ATTEMPTS {
            sleep(ACTIVATION_POLL_INTERVAL).await;

            let output = self
                .client
                .describe_table()
                .table_name(table)
                .send()
                .await
                .map_err(|e| StepError::store_provision(format!("{}", DisplayErrorContext(&e))))?;

            let status = output.table().and_then(|t| t.table_status());
            debug!(table, attempt, ?status, "waiting for state table");

            if status == Some(&TableStatus::Active) {
                return Ok(());
            }
        }

        Err(StepError::store_provision(format!(
            "table {table} did not become active within {ACTIVATION_MAX_ATTEMPTS} checks"
        )))
    }
}

#[async_trait]
impl StateStore for DynamoStateStore {
    async fn ensure_table(&self, table: &str) -> Result<()> {
        match self.client.describe_table().table_name(table).send().await {
            Ok(_) => {
                debug!(table, "state table found");
                Ok(())
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) =>
            {
                info!(table, "state table not found, creating");
                self.create_table(table).await
            }
            // Anything else is most likely a permissions problem and is
            // never retried.
            Err(e) => Err(StepError::store_access(format!(
                "{}",
                DisplayErrorContext(&e)
            ))),
        }
    }

    async fn get(&self, table: &str, record_id: &str) -> Result<Option<FingerprintRecord>> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key("id", AttributeValue::S(record_id.to_string()))
            .send()
            .await
            .map_err(|e| StepError::store_access(format!("{}", DisplayErrorContext(&e))))?;

        let Some(item) = output.item() else {
            return Ok(None);
        };

        let hash = item
            .get("hash")
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| {
                StepError::store_access(format!(
                    "record {record_id} in table {table} has no string hash attribute"
                ))
            })?
            .clone();

        let timestamp = item
            .get("timestamp")
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<i64>().ok())
            .unwrap_or(0);

        Ok(Some(FingerprintRecord {
            record_id: record_id.to_string(),
            hash,
            timestamp,
        }))
    }

    async fn put(&self, table: &str, record: &FingerprintRecord) -> Result<()> {
        self.client
            .put_item()
            .table_name(table)
            .item("id", AttributeValue::S(record.record_id.clone()))
            .item("hash", AttributeValue::S(record.hash.clone()))
            .item(
                "timestamp",
                AttributeValue::N(record.timestamp.to_string()),
            )
            .send()
            .await
            .map_err(|e| StepError::store_access(format!("{}", DisplayErrorContext(&e))))?;

        debug!(table, record_id = %record.record_id, "fingerprint stored");
        Ok(())
    }
}
