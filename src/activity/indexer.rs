use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::activity::parse::{parse_decimal, parse_status};
use crate::activity::{ActivitySource, FetchError, FetchOutcome};
use crate::logging::LogContext;
use crate::models::{most_recent, Address, TokenDelta, TransactionRecord, TransferDirection, DEFAULT_TX_TYPE};

pub const TIER_NAME: &str = "indexer";

#[derive(Debug, Deserialize)]
struct ActivitiesResponse {
    code: i64,
    #[serde(default)]
    message: String,
    result: Option<ActivitiesResult>,
}

#[derive(Debug, Deserialize)]
struct ActivitiesResult {
    data: Vec<Activity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Activity {
    hash: String,
    /// Milliseconds since the epoch
    timestamp: i64,
    transaction_fee: Value,
    status: Value,
    #[serde(default)]
    tx_name: Option<String>,
    #[serde(default)]
    add_tokens: Vec<TokenMovement>,
    #[serde(default)]
    sub_tokens: Vec<TokenMovement>,
}

#[derive(Debug, Deserialize)]
struct TokenMovement {
    symbol: String,
    amount: Value,
}

/// Highest-ranked tier: an indexed account-activities API.
///
/// Strict: any non-zero response code or any record that does not parse fails the whole fetch.
pub struct IndexerSource {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl IndexerSource {
    pub fn new(endpoint: String, api_key: Option<String>, timeout_seconds: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    fn convert(activity: Activity) -> Result<TransactionRecord, FetchError> {
        let timestamp = Utc
            .timestamp_millis_opt(activity.timestamp)
            .single()
            .ok_or_else(|| FetchError::Malformed(format!("timestamp {} out of range", activity.timestamp)))?;

        let fee = parse_decimal(&activity.transaction_fee)
            .ok_or_else(|| FetchError::Malformed(format!("unreadable fee for {}", activity.hash)))?;

        let mut transfers = Vec::with_capacity(activity.add_tokens.len() + activity.sub_tokens.len());
        for (movements, direction) in [
            (activity.add_tokens, TransferDirection::Incoming),
            (activity.sub_tokens, TransferDirection::Outgoing),
        ] {
            for movement in movements {
                let amount = parse_decimal(&movement.amount).ok_or_else(|| {
                    FetchError::Malformed(format!("unreadable {} amount for {}", movement.symbol, activity.hash))
                })?;
                transfers.push(TokenDelta {
                    symbol: movement.symbol,
                    amount,
                    direction,
                });
            }
        }

        Ok(TransactionRecord {
            tx_type: activity
                .tx_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TX_TYPE.to_string()),
            status: parse_status(Some(&activity.status)),
            hash: activity.hash,
            timestamp,
            transfers,
            fee,
        })
    }
}

#[async_trait]
impl ActivitySource for IndexerSource {
    fn name(&self) -> &str {
        TIER_NAME
    }

    async fn fetch(&self, address: &Address, limit: usize) -> Result<FetchOutcome, FetchError> {
        LogContext::new("indexer", "fetch")
            .with_address(address.as_str())
            .with_metadata("limit", json!(limit))
            .debug("Requesting account activities");

        let mut request = self.client.get(&self.endpoint).query(&[
            ("address", address.as_str().to_string()),
            ("limit", limit.to_string()),
            ("ascendingOrder", "false".to_string()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: ActivitiesResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        if parsed.code != 0 {
            return Err(FetchError::Api {
                code: parsed.code,
                message: parsed.message,
            });
        }

        let data = parsed
            .result
            .ok_or_else(|| FetchError::Malformed("missing result".to_string()))?
            .data;

        let records = data
            .into_iter()
            .map(Self::convert)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FetchOutcome::Records(most_recent(records, limit)))
    }
}
