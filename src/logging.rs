use log::{info, warn, error, debug, trace};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::LoggingConfig;
use crate::error::{ErrorSeverity, MonitorError};

/// Structured logging context for the monitor
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub metadata: HashMap<String, Value>,
}

impl LogContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn with_address(self, address: &str) -> Self {
        self.with_metadata("address", json!(address))
    }

    pub fn with_tier(self, tier: &str) -> Self {
        self.with_metadata("tier", json!(tier))
    }

    pub fn with_duration_ms(self, duration_ms: u64) -> Self {
        self.with_metadata("duration_ms", json!(duration_ms))
    }

    pub fn with_error_code(self, error_code: &str) -> Self {
        self.with_metadata("error_code", json!(error_code))
    }

    fn format_message(&self, level: &str, message: &str) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut log_entry = json!({
            "timestamp": timestamp,
            "level": level,
            "component": self.component,
            "operation": self.operation,
            "message": message,
        });

        for (key, value) in &self.metadata {
            log_entry[key] = value.clone();
        }

        log_entry.to_string()
    }

    pub fn info(&self, message: &str) {
        info!("{}", self.format_message("INFO", message));
    }

    pub fn warn(&self, message: &str) {
        warn!("{}", self.format_message("WARN", message));
    }

    pub fn error(&self, message: &str) {
        error!("{}", self.format_message("ERROR", message));
    }

    pub fn debug(&self, message: &str) {
        debug!("{}", self.format_message("DEBUG", message));
    }

    pub fn trace(&self, message: &str) {
        trace!("{}", self.format_message("TRACE", message));
    }
}

/// Wall-clock timer for a single operation
pub struct PerformanceMonitor {
    pub start_time: SystemTime,
    operation: String,
    metadata: HashMap<String, Value>,
}

impl PerformanceMonitor {
    pub fn new(operation: &str) -> Self {
        Self {
            start_time: SystemTime::now(),
            operation: operation.to_string(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    fn elapsed_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or_default()
            .as_millis() as u64
    }

    pub fn finish(self) -> u64 {
        let duration = self.elapsed_ms();

        let mut context = LogContext::new("performance", &self.operation)
            .with_duration_ms(duration);
        for (key, value) in self.metadata {
            context = context.with_metadata(&key, value);
        }

        context.debug(&format!("Operation completed in {}ms", duration));
        duration
    }

    pub fn finish_with_result<T, E>(self, result: &Result<T, E>) -> u64
    where
        E: std::fmt::Display,
    {
        let duration = self.elapsed_ms();

        let mut context = LogContext::new("performance", &self.operation)
            .with_duration_ms(duration);
        for (key, value) in self.metadata {
            context = context.with_metadata(&key, value);
        }

        match result {
            Ok(_) => {
                context.debug(&format!("Operation completed successfully in {}ms", duration));
            }
            Err(e) => {
                context = context.with_metadata("error", json!(e.to_string()));
                context.warn(&format!("Operation failed after {}ms: {}", duration, e));
            }
        }

        duration
    }
}

/// Error logging utilities
pub struct ErrorLogger;

impl ErrorLogger {
    pub fn log_error(error: &MonitorError, context: Option<LogContext>) {
        let severity = error.severity();

        let log_context = context
            .unwrap_or_else(|| LogContext::new("error", "unknown"))
            .with_error_code(error.code())
            .with_metadata("severity", json!(format!("{:?}", severity)))
            .with_metadata("surfaced", json!(error.is_surfaced()));

        let message = format!("Error occurred: {}", error);

        match severity {
            ErrorSeverity::Critical | ErrorSeverity::High => log_context.error(&message),
            ErrorSeverity::Medium => log_context.warn(&message),
            ErrorSeverity::Low => log_context.info(&message),
        }
    }
}

/// Operational metrics emitted as structured log lines
pub struct MetricsLogger;

impl MetricsLogger {
    pub fn log_rpc_call(method: &str, duration_ms: u64, success: bool) {
        let context = LogContext::new("metrics", "rpc_call")
            .with_metadata("method", json!(method))
            .with_duration_ms(duration_ms)
            .with_metadata("success", json!(success));

        if success {
            context.debug(&format!("RPC call {} completed in {}ms", method, duration_ms));
        } else {
            context.warn(&format!("RPC call {} failed after {}ms", method, duration_ms));
        }
    }

    pub fn log_tier_attempt(tier: &str, address: &str, outcome: &str, record_count: usize, duration_ms: u64) {
        let context = LogContext::new("metrics", "tier_attempt")
            .with_tier(tier)
            .with_address(address)
            .with_metadata("outcome", json!(outcome))
            .with_metadata("record_count", json!(record_count))
            .with_duration_ms(duration_ms);

        context.debug(&format!("Tier {} for {}: {} ({} records)", tier, address, outcome, record_count));
    }

    pub fn log_observation(address: &str, source: Option<&str>, record_count: usize, duration_ms: u64) {
        let context = LogContext::new("metrics", "observation")
            .with_address(address)
            .with_metadata("activity_source", json!(source))
            .with_metadata("record_count", json!(record_count))
            .with_duration_ms(duration_ms);

        context.info(&format!("Observed {} in {}ms", address, duration_ms));
    }

    pub fn log_history_update(address: &str, first_observation: bool, entry_count: usize) {
        let context = LogContext::new("metrics", "history_update")
            .with_address(address)
            .with_metadata("first_observation", json!(first_observation))
            .with_metadata("entry_count", json!(entry_count));

        context.debug(&format!("History updated for {}", address));
    }
}

/// Initialize logging for the application
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let json_format = config.format == "json";

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.level.as_str()))
        .format(move |buf, record| {
            use std::io::Write;

            let line = record.args().to_string();
            if json_format {
                return writeln!(buf, "{}", line);
            }

            // Pretty-print structured lines, plain format for everything else
            if let Ok(json_value) = serde_json::from_str::<Value>(&line) {
                writeln!(buf, "{}", serde_json::to_string_pretty(&json_value).unwrap_or(line))
            } else {
                writeln!(
                    buf,
                    "{} [{}] {}: {}",
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    line
                )
            }
        })
        .try_init()?;

    info!("Logging initialized");
    Ok(())
}
