use serde::Serialize;
use serde_json::json;

use crate::activity::{
    ActivitySource, ChainScanSource, ExplorerSource, FetchError, FetchOutcome, IndexerSource,
};
use crate::blockchain::RpcClient;
use crate::config::{ActivityConfig, TokenConfig};
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};
use crate::models::{most_recent, Address, TransactionRecord};

/// What a single tier produced during one resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Non-empty records, accepted
    Accepted(usize),
    /// The address provably has no activity, accepted
    ConfirmedEmpty,
    /// Success with no records; the chain moved on
    Empty,
    /// The tier failed; the chain moved on
    Failed(String),
}

impl AttemptOutcome {
    fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Accepted(_) => "accepted",
            AttemptOutcome::ConfirmedEmpty => "confirmed_empty",
            AttemptOutcome::Empty => "empty",
            AttemptOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierAttempt {
    pub tier: String,
    pub outcome: AttemptOutcome,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Newest first, at most `limit` long
    pub records: Vec<TransactionRecord>,
    /// Tier whose answer was accepted, if any
    pub source: Option<String>,
    pub attempts: Vec<TierAttempt>,
}

impl Resolution {
    /// Every tier was tried and none produced a usable answer
    pub fn exhausted(&self) -> bool {
        self.source.is_none()
    }
}

/// Chain of ranked activity sources. The first usable answer wins and
/// lower-ranked tiers are not contacted.
pub struct FallbackResolver {
    sources: Vec<Box<dyn ActivitySource>>,
}

impl FallbackResolver {
    pub fn new(sources: Vec<Box<dyn ActivitySource>>) -> Self {
        Self { sources }
    }

    /// Indexer, then explorer, then on-chain scan
    pub fn from_config(activity: &ActivityConfig, token: &TokenConfig, rpc: RpcClient) -> Result<Self, FetchError> {
        let indexer = IndexerSource::new(
            activity.indexer_url.clone(),
            activity.indexer_api_key.clone(),
            activity.timeout_seconds,
        )?;
        let explorer = ExplorerSource::new(
            activity.explorer_base_url.clone(),
            token.native_symbol.clone(),
            activity.timeout_seconds,
        )?;
        let scan = ChainScanSource::new(rpc, activity.scan_depth, token.native_symbol.clone());

        Ok(Self::new(vec![Box::new(indexer), Box::new(explorer), Box::new(scan)]))
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// Recent records for `address`. Never fails; "all tiers failed" and
    /// "no activity" both come back as an empty list.
    pub async fn resolve(&self, address: &Address, limit: usize) -> Vec<TransactionRecord> {
        self.resolve_detailed(address, limit).await.records
    }

    pub async fn resolve_detailed(&self, address: &Address, limit: usize) -> Resolution {
        let mut attempts = Vec::with_capacity(self.sources.len());

        if limit == 0 {
            return Resolution {
                records: Vec::new(),
                source: None,
                attempts,
            };
        }

        for source in &self.sources {
            let monitor = PerformanceMonitor::new("tier_fetch").with_metadata("tier", json!(source.name()));
            let result = source.fetch(address, limit).await;
            let duration_ms = monitor.finish();

            let (outcome, accepted) = match result {
                Ok(FetchOutcome::Records(records)) if !records.is_empty() => {
                    (AttemptOutcome::Accepted(records.len()), Some(records))
                }
                Ok(FetchOutcome::Records(_)) => (AttemptOutcome::Empty, None),
                Ok(FetchOutcome::ConfirmedEmpty) => (AttemptOutcome::ConfirmedEmpty, Some(Vec::new())),
                Err(e) => {
                    LogContext::new("resolver", "resolve")
                        .with_address(address.as_str())
                        .with_tier(source.name())
                        .with_metadata("error", json!(e.to_string()))
                        .warn("Activity tier failed, trying next");
                    (AttemptOutcome::Failed(e.to_string()), None)
                }
            };

            MetricsLogger::log_tier_attempt(
                source.name(),
                address.as_str(),
                outcome.label(),
                accepted.as_ref().map_or(0, Vec::len),
                duration_ms,
            );
            attempts.push(TierAttempt {
                tier: source.name().to_string(),
                outcome,
                duration_ms,
            });

            if let Some(records) = accepted {
                return Resolution {
                    records: most_recent(records, limit),
                    source: Some(source.name().to_string()),
                    attempts,
                };
            }
        }

        LogContext::new("resolver", "resolve")
            .with_address(address.as_str())
            .with_metadata("tiers", json!(self.tier_names()))
            .warn("No activity tier produced records");

        Resolution {
            records: Vec::new(),
            source: None,
            attempts,
        }
    }
}
