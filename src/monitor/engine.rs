use serde::Serialize;
use serde_json::json;

use crate::activity::FallbackResolver;
use crate::blockchain::{ChainClient, RpcClient};
use crate::config::AppConfig;
use crate::error::{MonitorError, Result};
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};
use crate::models::{Address, Amount, BalanceSnapshot, ChangeResult, TransactionRecord};
use crate::store::HistoryStore;

/// Everything learned about one address in one pass
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub snapshot: BalanceSnapshot,
    pub change: ChangeResult,
    /// Newest first
    pub recent: Vec<TransactionRecord>,
    /// Activity tier that answered, if any
    pub activity_source: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Token contract queried for `balanceOf`; token balances are unavailable without one
    pub token_contract: Option<Address>,
    /// Recent transactions kept per observation
    pub activity_limit: usize,
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            token_contract: config.token_contract()?,
            activity_limit: config.activity.limit,
        })
    }
}

/// Composes balance lookups, the activity fallback chain and the history store.
pub struct MonitorEngine {
    chain: ChainClient,
    resolver: FallbackResolver,
    history: HistoryStore,
    settings: EngineSettings,
}

impl MonitorEngine {
    pub fn new(chain: ChainClient, resolver: FallbackResolver, history: HistoryStore, settings: EngineSettings) -> Self {
        Self {
            chain,
            resolver,
            history,
            settings,
        }
    }

    /// Wire the engine from configuration, loading the history document from disk
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let rpc = RpcClient::new(config.rpc.endpoint.clone(), config.rpc.timeout_seconds)
            .map_err(MonitorError::Connectivity)?;
        let resolver = FallbackResolver::from_config(&config.activity, &config.token, rpc.clone())?;
        let history = HistoryStore::load(&config.storage.history_path)?;

        Ok(Self::new(
            ChainClient::new(rpc),
            resolver,
            history,
            EngineSettings::from_config(config)?,
        ))
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Fails with a connectivity error when the RPC endpoint cannot answer
    pub async fn ensure_connected(&self) -> Result<u64> {
        self.chain.check_connectivity().await.map_err(|e| {
            LogContext::new("engine", "ensure_connected")
                .with_metadata("endpoint", json!(self.chain.rpc().endpoint()))
                .with_metadata("error", json!(e.to_string()))
                .with_error_code("connectivity_error")
                .error("RPC endpoint unreachable");
            MonitorError::Connectivity(e)
        })
    }

    pub async fn observe(&mut self, address: &Address) -> Result<Observation> {
        self.ensure_connected().await?;
        self.observe_connected(address).await
    }

    /// Validate raw input, then observe it
    pub async fn check_address(&mut self, input: &str) -> Result<Observation> {
        let address = Address::parse(input)?;
        self.observe(&address).await
    }

    /// Probe once, then observe each address in order. The first error aborts the pass.
    pub async fn observe_all(&mut self, addresses: &[Address]) -> Result<Vec<Observation>> {
        let head = self.ensure_connected().await?;
        LogContext::new("engine", "observe_all")
            .with_metadata("address_count", json!(addresses.len()))
            .with_metadata("head_block", json!(head))
            .info("Starting observation pass");

        let mut observations = Vec::with_capacity(addresses.len());
        for address in addresses {
            observations.push(self.observe_connected(address).await?);
        }
        Ok(observations)
    }

    pub fn reset_history(&mut self) -> Result<()> {
        self.history.reset()?;
        LogContext::new("engine", "reset_history").info("Balance history cleared");
        Ok(())
    }

    async fn observe_connected(&mut self, address: &Address) -> Result<Observation> {
        let monitor = PerformanceMonitor::new("observe").with_metadata("address", json!(address.as_str()));

        let native_amount = self.chain.get_native_balance(address).await;
        let token_amount = match &self.settings.token_contract {
            Some(contract) => self.chain.get_token_balance(address, contract).await,
            None => Amount::Unavailable,
        };

        let resolution = self
            .resolver
            .resolve_detailed(address, self.settings.activity_limit)
            .await;

        let snapshot = BalanceSnapshot::new(address.clone(), native_amount, token_amount);
        let change = self.history.record_and_diff(&snapshot)?;

        let duration_ms = monitor.finish();
        MetricsLogger::log_observation(
            address.as_str(),
            resolution.source.as_deref(),
            resolution.records.len(),
            duration_ms,
        );

        Ok(Observation {
            snapshot,
            change,
            recent: resolution.records,
            activity_source: resolution.source,
        })
    }
}
