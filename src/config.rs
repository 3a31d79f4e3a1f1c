use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::models::Address;

/// Addresses watched for users who have not configured their own list
pub const DEFAULT_ADDRESSES: &[&str] = &[
    "0x2b0257e1302f2c3e0677956d0ea3f28d84919884",
    "0x438b28b1f4aec1a38acf577ad63921a21ab1bc4f",
    "0x5a015b23ed0851ee17720f11b788a6c0be918af6",
    "0xba511e574aa768245c26602a9fd82608daa840cc",
    "0x5dbb65de18295a3920c556893a11c11f1da9c721",
    "0xa2106b7daf74b7a649115e3c02cce1c6cdcf27c7",
    "0x4054d631d426b87eb9a1bf666832227f469e06af",
];

static DEFAULT_WATCHLIST: Lazy<Vec<Address>> = Lazy::new(|| {
    DEFAULT_ADDRESSES
        .iter()
        .filter_map(|address| Address::parse(address).ok())
        .collect()
});

/// Upper bound on the number of blocks the on-chain scan may inspect
pub const MAX_SCAN_DEPTH: u64 = 1000;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub rpc: RpcConfig,
    pub token: TokenConfig,
    pub activity: ActivityConfig,
    pub storage: StorageConfig,
    pub watchlist: WatchlistConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// RPC client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Monad testnet RPC endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Tracked token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Native currency symbol
    pub native_symbol: String,
    /// ERC20 token symbol
    pub symbol: String,
    /// ERC20 contract address; token balances are reported unavailable when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

/// Activity tier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Number of recent transactions reported per address
    pub limit: usize,
    /// Primary indexed-activity endpoint
    pub indexer_url: String,
    /// Optional API key sent as `x-api-key` to the indexer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexer_api_key: Option<String>,
    /// Block explorer base URL, also used for report links
    pub explorer_base_url: String,
    /// Per-request timeout for the activity APIs in seconds
    pub timeout_seconds: u64,
    /// Number of recent blocks scanned by the on-chain tier
    pub scan_depth: u64,
}

/// Persisted document locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub watchlist_path: String,
    pub history_path: String,
}

/// Watchlist defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistConfig {
    pub default_addresses: Vec<String>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server port
    pub port: u16,
    /// Server host/bind address
    pub host: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://testnet-rpc.monad.xyz".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            native_symbol: "MON".to_string(),
            symbol: "FT".to_string(),
            contract_address: None,
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            limit: 3,
            indexer_url: "https://api.blockvision.org/v2/monad/account/activities".to_string(),
            indexer_api_key: None,
            explorer_base_url: "https://testnet.monadexplorer.com".to_string(),
            timeout_seconds: 10,
            scan_depth: 100,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            watchlist_path: "./user_configs.json".to_string(),
            history_path: "./balance_history.json".to_string(),
        }
    }
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            default_addresses: DEFAULT_ADDRESSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables.
    /// Environment variables take precedence over file values.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the TOML file named by `CONFIG_FILE` (default `config.toml`)
    pub fn load_from_file() -> Result<Self, ConfigError> {
        let config_path = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if !Path::new(&config_path).exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ConfigError::FileNotFound(config_path.clone()))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parsing(e.to_string()))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(endpoint) = env::var("MONAD_RPC_URL") {
            self.rpc.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("RPC_TIMEOUT_SECONDS") {
            self.rpc.timeout_seconds = parse_env("RPC_TIMEOUT_SECONDS", timeout)?;
        }

        if let Ok(contract) = env::var("TOKEN_CONTRACT_ADDRESS") {
            self.token.contract_address = Some(contract);
        }

        if let Ok(url) = env::var("ACTIVITY_API_URL") {
            self.activity.indexer_url = url;
        }
        if let Ok(key) = env::var("ACTIVITY_API_KEY") {
            self.activity.indexer_api_key = Some(key);
        }
        if let Ok(url) = env::var("EXPLORER_BASE_URL") {
            self.activity.explorer_base_url = url;
        }
        if let Ok(limit) = env::var("ACTIVITY_LIMIT") {
            self.activity.limit = parse_env("ACTIVITY_LIMIT", limit)?;
        }
        if let Ok(depth) = env::var("SCAN_DEPTH") {
            self.activity.scan_depth = parse_env("SCAN_DEPTH", depth)?;
        }

        if let Ok(path) = env::var("WATCHLIST_PATH") {
            self.storage.watchlist_path = path;
        }
        if let Ok(path) = env::var("HISTORY_PATH") {
            self.storage.history_path = path;
        }

        if let Ok(port) = env::var("API_PORT") {
            self.api.port = parse_env("API_PORT", port)?;
        }
        if let Ok(host) = env::var("API_HOST") {
            self.api.host = host;
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.rpc.endpoint, &self.activity.indexer_url, &self.activity.explorer_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }

        if self.rpc.timeout_seconds == 0 || self.rpc.timeout_seconds > 300 {
            return Err(invalid("rpc.timeout_seconds", self.rpc.timeout_seconds));
        }
        if self.activity.timeout_seconds == 0 || self.activity.timeout_seconds > 300 {
            return Err(invalid("activity.timeout_seconds", self.activity.timeout_seconds));
        }
        if self.activity.limit == 0 || self.activity.limit > 100 {
            return Err(invalid("activity.limit", self.activity.limit));
        }
        if self.activity.scan_depth == 0 || self.activity.scan_depth > MAX_SCAN_DEPTH {
            return Err(invalid("activity.scan_depth", self.activity.scan_depth));
        }

        if let Some(contract) = &self.token.contract_address {
            Address::parse(contract).map_err(|_| invalid("token.contract_address", contract))?;
        }
        for address in &self.watchlist.default_addresses {
            Address::parse(address).map_err(|_| invalid("watchlist.default_addresses", address))?;
        }

        if self.storage.watchlist_path.trim().is_empty() {
            return Err(invalid("storage.watchlist_path", &self.storage.watchlist_path));
        }
        if self.storage.history_path.trim().is_empty() {
            return Err(invalid("storage.history_path", &self.storage.history_path));
        }

        if self.api.port == 0 {
            return Err(invalid("api.port", self.api.port));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(invalid("logging.level", &self.logging.level));
        }
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(invalid("logging.format", &self.logging.format));
        }

        Ok(())
    }

    /// Parsed token contract, if configured
    pub fn token_contract(&self) -> Result<Option<Address>, ConfigError> {
        self.token
            .contract_address
            .as_deref()
            .map(|contract| Address::parse(contract).map_err(|_| invalid("token.contract_address", contract)))
            .transpose()
    }

    /// Fallback watchlist; an empty configured list means the built-in defaults
    pub fn default_watchlist(&self) -> Result<Vec<Address>, ConfigError> {
        if self.watchlist.default_addresses.is_empty() {
            return Ok(DEFAULT_WATCHLIST.clone());
        }
        self.watchlist
            .default_addresses
            .iter()
            .map(|address| Address::parse(address).map_err(|_| invalid("watchlist.default_addresses", address)))
            .collect()
    }

    /// Generate a sample configuration file
    pub fn generate_sample_config() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Self::default()).map_err(|e| ConfigError::Parsing(e.to_string()))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.rpc.endpoint, "https://testnet-rpc.monad.xyz");
        assert_eq!(config.rpc.timeout_seconds, 10);
        assert_eq!(config.activity.limit, 3);
        assert_eq!(config.activity.scan_depth, 100);
        assert_eq!(config.token.native_symbol, "MON");
        assert_eq!(config.watchlist.default_addresses.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.rpc.endpoint = "invalid-url".to_string();
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.rpc.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.activity.scan_depth = MAX_SCAN_DEPTH + 1;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.token.contract_address = Some("invalid".to_string());
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.watchlist.default_addresses.push("0x123".to_string());
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_watchlist() {
        let mut config = AppConfig::default();
        assert_eq!(config.default_watchlist().unwrap().len(), DEFAULT_ADDRESSES.len());

        config.watchlist.default_addresses.clear();
        assert_eq!(config.default_watchlist().unwrap().len(), DEFAULT_ADDRESSES.len());

        config.watchlist.default_addresses = vec!["0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string()];
        let addresses = config.default_watchlist().unwrap();
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].as_str(), "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("MONAD_RPC_URL", "https://test-rpc.example/");
        env::set_var("HISTORY_PATH", "/tmp/history.json");
        env::set_var("ACTIVITY_LIMIT", "5");
        env::set_var("TOKEN_CONTRACT_ADDRESS", "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
        env::set_var("LOG_LEVEL", "debug");

        let mut config = AppConfig::default();
        config.apply_env_overrides().unwrap();

        assert_eq!(config.rpc.endpoint, "https://test-rpc.example/");
        assert_eq!(config.storage.history_path, "/tmp/history.json");
        assert_eq!(config.activity.limit, 5);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.token_contract().unwrap().map(|a| a.to_string()),
            Some("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string())
        );

        env::remove_var("MONAD_RPC_URL");
        env::remove_var("HISTORY_PATH");
        env::remove_var("ACTIVITY_LIMIT");
        env::remove_var("TOKEN_CONTRACT_ADDRESS");
        env::remove_var("LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn test_invalid_env_values() {
        env::set_var("RPC_TIMEOUT_SECONDS", "invalid");

        let mut config = AppConfig::default();
        let result = config.apply_env_overrides();

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        env::remove_var("RPC_TIMEOUT_SECONDS");
    }

    #[test]
    #[serial]
    fn test_config_file_loading() {
        let config_content = r#"
[rpc]
endpoint = "https://custom-rpc.example/"
timeout_seconds = 20

[token]
native_symbol = "MON"
symbol = "FT"
contract_address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"

[activity]
limit = 5
indexer_url = "https://indexer.example/activities"
explorer_base_url = "https://explorer.example"
timeout_seconds = 4
scan_depth = 50

[storage]
watchlist_path = "/tmp/watchlist.json"
history_path = "/tmp/history.json"

[watchlist]
default_addresses = ["0x2b0257e1302f2c3e0677956d0ea3f28d84919884"]

[api]
port = 3000
host = "0.0.0.0"

[logging]
level = "warn"
format = "json"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut temp_file, config_content.as_bytes()).unwrap();

        env::set_var("CONFIG_FILE", temp_file.path().to_str().unwrap());
        let config = AppConfig::load_from_file().unwrap();
        env::remove_var("CONFIG_FILE");

        assert_eq!(config.rpc.endpoint, "https://custom-rpc.example/");
        assert_eq!(config.rpc.timeout_seconds, 20);
        assert_eq!(config.activity.limit, 5);
        assert_eq!(config.activity.scan_depth, 50);
        assert!(config.activity.indexer_api_key.is_none());
        assert_eq!(config.storage.history_path, "/tmp/history.json");
        assert_eq!(config.watchlist.default_addresses.len(), 1);
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.logging.format, "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generate_sample_config() {
        let sample = AppConfig::generate_sample_config().unwrap();
        assert!(sample.contains("[rpc]"));
        assert!(sample.contains("[activity]"));
        assert!(sample.contains("[storage]"));
        assert!(sample.contains("[watchlist]"));
        assert!(sample.contains("[logging]"));

        let parsed: AppConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.rpc.endpoint, AppConfig::default().rpc.endpoint);
    }
}
