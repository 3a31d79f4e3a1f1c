use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction type used when a source does not report one
pub const DEFAULT_TX_TYPE: &str = "Transfer";

/// Number of leading hash characters surfaced externally
pub const HASH_PREFIX_LEN: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub tx_type: String,
    pub transfers: Vec<TokenDelta>,
    pub status: TxStatus,
    pub fee: Decimal,
}

/// One token movement inside a transaction, tagged with its direction relative to the watched address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenDelta {
    pub symbol: String,
    pub amount: Decimal,
    pub direction: TransferDirection,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferDirection {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxStatus {
    Succeeded,
    Failed,
}

impl TransactionRecord {
    /// Record with the defaults used when a source omits fee, type and status
    pub fn new(hash: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: hash.into(),
            timestamp,
            tx_type: DEFAULT_TX_TYPE.to_string(),
            transfers: Vec::new(),
            status: TxStatus::Succeeded,
            fee: Decimal::ZERO,
        }
    }

    /// Shortened hash for display, e.g. `0x12345678...`
    pub fn short_hash(&self) -> String {
        let prefix: String = self.hash.chars().take(HASH_PREFIX_LEN).collect();
        format!("{}...", prefix)
    }
}

/// Sort newest-first and keep at most `limit` records
pub fn most_recent(mut records: Vec<TransactionRecord>, limit: usize) -> Vec<TransactionRecord> {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records.truncate(limit);
    records
}
