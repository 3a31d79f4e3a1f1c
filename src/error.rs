use thiserror::Error;

pub use crate::activity::FetchError;
pub use crate::blockchain::rpc_client::RpcError;

/// Main error type for the FortyTwo monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Connectivity error: {0}")]
    Connectivity(RpcError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Activity fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Input validation errors, raised before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Address checksum mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),
}

/// Persisted document errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("File system error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt document {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parsing failed: {0}")]
    Parsing(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical errors that stop the process
    Critical,
    /// Errors that fail the current command
    High,
    /// Degradations that were absorbed
    Medium,
    /// Caller mistakes
    Low,
}

impl MonitorError {
    /// Get the severity level of an error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MonitorError::Config(_) => ErrorSeverity::Critical,
            MonitorError::Store(StoreError::Corrupt { .. }) => ErrorSeverity::Critical,

            MonitorError::Connectivity(_) => ErrorSeverity::High,
            MonitorError::Store(_) => ErrorSeverity::High,

            MonitorError::Fetch(_) => ErrorSeverity::Medium,

            MonitorError::Validation(_) => ErrorSeverity::Low,
        }
    }

    /// Whether the error should be reported to the end caller rather than absorbed
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, MonitorError::Fetch(_))
    }

    /// Short machine-readable error code used by the HTTP surface and structured logs
    pub fn code(&self) -> &'static str {
        match self {
            MonitorError::Connectivity(_) => "connectivity_error",
            MonitorError::Validation(_) => "validation_error",
            MonitorError::Store(_) => "storage_error",
            MonitorError::Config(_) => "config_error",
            MonitorError::Fetch(_) => "fetch_failed",
        }
    }
}
