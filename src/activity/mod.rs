//! Recent-activity retrieval.
//!
//! Each tier implements [`ActivitySource`]; [`FallbackResolver`] walks them in rank
//! order and keeps the first usable answer.

pub mod chain_scan;
pub mod explorer;
pub mod indexer;
pub mod parse;
pub mod resolver;

use async_trait::async_trait;
use thiserror::Error;

use crate::blockchain::RpcError;
use crate::models::{Address, TransactionRecord};

pub use chain_scan::ChainScanSource;
pub use explorer::{EndpointShape, ExplorerSource};
pub use indexer::IndexerSource;
pub use resolver::{AttemptOutcome, FallbackResolver, Resolution, TierAttempt};

/// Failure of a single activity tier. Never surfaced past the resolver.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("API reported failure: code={code}, message={message}")]
    Api { code: i64, message: String },

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("All {0} endpoint shapes failed")]
    AllShapesFailed(usize),
}

/// Successful tier answer
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Records found, newest first. May be empty when the source had nothing.
    Records(Vec<TransactionRecord>),
    /// The address has provably never sent a transaction
    ConfirmedEmpty,
}

#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Short tier name used in logs and resolution reports
    fn name(&self) -> &str;

    async fn fetch(&self, address: &Address, limit: usize) -> Result<FetchOutcome, FetchError>;
}
