use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::activity::parse::{
    as_text, field, native_transfer, parse_decimal, parse_integer, parse_status, parse_timestamp, parse_wei,
};
use crate::activity::{ActivitySource, FetchError, FetchOutcome};
use crate::logging::LogContext;
use crate::models::{most_recent, wei_to_decimal, Address, TransactionRecord, TxStatus};

pub const TIER_NAME: &str = "explorer";

/// Response layouts a block explorer may expose, tried in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointShape {
    /// `{base}/api/address/{addr}/transactions?limit=N` returning `{"transactions": [...]}`
    AddressTransactions,
    /// Blockscout v2 `{base}/api/v2/addresses/{addr}/transactions` returning `{"items": [...]}`
    BlockscoutV2,
    /// Etherscan-compatible `txlist` returning `{"status": .., "result": [...]}`
    EtherscanTxList,
}

impl EndpointShape {
    pub const ALL: [EndpointShape; 3] = [
        EndpointShape::AddressTransactions,
        EndpointShape::BlockscoutV2,
        EndpointShape::EtherscanTxList,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EndpointShape::AddressTransactions => "address_transactions",
            EndpointShape::BlockscoutV2 => "blockscout_v2",
            EndpointShape::EtherscanTxList => "etherscan_txlist",
        }
    }

    pub fn url(&self, base: &str, address: &Address, limit: usize) -> String {
        let base = base.trim_end_matches('/');
        match self {
            EndpointShape::AddressTransactions => {
                format!("{}/api/address/{}/transactions?limit={}", base, address, limit)
            }
            EndpointShape::BlockscoutV2 => format!("{}/api/v2/addresses/{}/transactions", base, address),
            EndpointShape::EtherscanTxList => format!(
                "{}/api?module=account&action=txlist&address={}&page=1&offset={}&sort=desc",
                base, address, limit
            ),
        }
    }

    fn items<'a>(&self, body: &'a Value) -> Option<&'a Vec<Value>> {
        let key = match self {
            EndpointShape::AddressTransactions => "transactions",
            EndpointShape::BlockscoutV2 => "items",
            EndpointShape::EtherscanTxList => "result",
        };
        body.get(key).and_then(Value::as_array)
    }

    /// A record needs at least a hash and a timestamp; everything else falls back to defaults
    fn parse_item(&self, item: &Value, watched: &Address, native_symbol: &str) -> Option<TransactionRecord> {
        let hash = field(item, &["hash", "txHash", "transactionHash"]).and_then(as_text)?;
        let timestamp = field(item, &["timestamp", "timeStamp", "blockTimestamp"]).and_then(parse_timestamp)?;
        let mut record = TransactionRecord::new(hash, timestamp);

        let (fee, tx_type, status, from) = match self {
            EndpointShape::AddressTransactions => (
                field(item, &["fee", "transactionFee"]).and_then(parse_decimal),
                field(item, &["type", "method", "txName"]).and_then(as_text),
                parse_status(field(item, &["status"])),
                field(item, &["from"]).and_then(as_text),
            ),
            EndpointShape::BlockscoutV2 => (
                item.get("fee").and_then(|fee| fee.get("value")).and_then(parse_wei),
                field(item, &["method"])
                    .and_then(as_text)
                    .or_else(|| item.get("tx_types").and_then(|types| types.get(0)).and_then(as_text)),
                parse_status(field(item, &["status", "result"])),
                item.get("from").and_then(|from| from.get("hash")).and_then(as_text),
            ),
            EndpointShape::EtherscanTxList => (
                etherscan_fee(item),
                field(item, &["functionName"])
                    .and_then(as_text)
                    .and_then(|name| name.split('(').next().map(str::to_string))
                    .filter(|name| !name.is_empty()),
                etherscan_status(item),
                field(item, &["from"]).and_then(as_text),
            ),
        };

        if let Some(fee) = fee {
            record.fee = fee;
        }
        if let Some(tx_type) = tx_type {
            record.tx_type = tx_type;
        }
        record.status = status;

        let value = match self {
            EndpointShape::AddressTransactions => {
                field(item, &["value"]).and_then(|v| parse_wei(v).or_else(|| parse_decimal(v)))
            }
            _ => field(item, &["value"]).and_then(parse_wei),
        };
        record
            .transfers
            .extend(native_transfer(watched, value, from.as_deref(), native_symbol));

        Some(record)
    }
}

fn etherscan_fee(item: &Value) -> Option<rust_decimal::Decimal> {
    let gas_used = field(item, &["gasUsed"]).and_then(parse_integer)?;
    let gas_price = field(item, &["gasPrice"]).and_then(parse_integer)?;
    gas_used.checked_mul(gas_price).and_then(wei_to_decimal)
}

fn etherscan_status(item: &Value) -> TxStatus {
    match field(item, &["isError"]).and_then(as_text).as_deref() {
        Some("1") => TxStatus::Failed,
        Some(_) => TxStatus::Succeeded,
        None => parse_status(field(item, &["txreceipt_status"])),
    }
}

/// Second tier: a public block explorer whose API layout is not fixed.
///
/// Each shape is tried once per fetch; the first one producing a parsable record wins.
pub struct ExplorerSource {
    client: Client,
    base_url: String,
    native_symbol: String,
    shapes: Vec<EndpointShape>,
}

impl ExplorerSource {
    pub fn new(base_url: String, native_symbol: String, timeout_seconds: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            native_symbol,
            shapes: EndpointShape::ALL.to_vec(),
        })
    }

    /// Restrict or reorder the shapes tried
    pub fn with_shapes(mut self, shapes: Vec<EndpointShape>) -> Self {
        self.shapes = shapes;
        self
    }

    async fn try_shape(
        &self,
        shape: EndpointShape,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>, FetchError> {
        let url = shape.url(&self.base_url, address, limit);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: Value = serde_json::from_str(&response.text().await?)
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        let items = shape
            .items(&body)
            .ok_or_else(|| FetchError::Malformed(format!("no transaction list in {} response", shape.label())))?;

        Ok(items
            .iter()
            .filter_map(|item| shape.parse_item(item, address, &self.native_symbol))
            .collect())
    }
}

#[async_trait]
impl ActivitySource for ExplorerSource {
    fn name(&self) -> &str {
        TIER_NAME
    }

    async fn fetch(&self, address: &Address, limit: usize) -> Result<FetchOutcome, FetchError> {
        for shape in &self.shapes {
            let context = LogContext::new("explorer", "fetch")
                .with_address(address.as_str())
                .with_metadata("shape", json!(shape.label()));

            match self.try_shape(*shape, address, limit).await {
                Ok(records) if !records.is_empty() => {
                    context
                        .with_metadata("record_count", json!(records.len()))
                        .debug("Explorer shape answered");
                    return Ok(FetchOutcome::Records(most_recent(records, limit)));
                }
                Ok(_) => context.debug("Explorer shape returned no parsable records"),
                Err(e) => context
                    .with_metadata("error", json!(e.to_string()))
                    .debug("Explorer shape failed"),
            }
        }

        Err(FetchError::AllShapesFailed(self.shapes.len()))
    }
}
