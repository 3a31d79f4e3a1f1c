pub mod activity;
pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod store;

pub use activity::{ActivitySource, FallbackResolver, FetchOutcome, Resolution};
pub use blockchain::{ChainClient, RpcClient};
pub use config::{ActivityConfig, ApiConfig, AppConfig, LoggingConfig, RpcConfig, StorageConfig, TokenConfig};
pub use error::{MonitorError, Result};
pub use logging::{ErrorLogger, LogContext, MetricsLogger, PerformanceMonitor};
pub use models::{Address, Amount, BalanceSnapshot, ChangeResult, TransactionRecord};
pub use monitor::{MonitorEngine, Observation};
pub use store::{HistoryStore, WatchlistStore};
