use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};
use crate::models::{parse_hex_quantity, Address};

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC method error: code={code}, message={message}")]
    Method { code: i32, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Connection failed: {0}")]
    Connection(String),
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
pub struct Block {
    pub number: String,
    pub hash: Option<String>,
    pub timestamp: String,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "blockNumber")]
    pub block_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    pub status: Option<String>,
    #[serde(rename = "gasUsed")]
    pub gas_used: String,
    #[serde(rename = "effectiveGasPrice")]
    pub effective_gas_price: Option<String>,
}

/// JSON-RPC 2.0 client for an EVM endpoint
#[derive(Clone)]
pub struct RpcClient {
    client: Client,
    endpoint: String,
    timeout_seconds: u64,
}

impl RpcClient {
    pub fn new(endpoint: String, timeout_seconds: u64) -> Result<Self, RpcError> {
        let context = LogContext::new("rpc_client", "initialization")
            .with_metadata("endpoint", json!(endpoint))
            .with_metadata("timeout_seconds", json!(timeout_seconds));
        context.info("Initializing RPC client");

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            timeout_seconds,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn make_request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let monitor = PerformanceMonitor::new("rpc_request").with_metadata("method", json!(method));
        let result = self.send(method, params).await;
        let duration = monitor.finish_with_result(&result);
        MetricsLogger::log_rpc_call(method, duration, result.is_ok());
        result
    }

    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        LogContext::new("rpc_client", "make_request")
            .with_metadata("method", json!(method))
            .trace(&format!("Sending RPC request: {}", method));

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Connection(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let rpc_response: JsonRpcResponse = serde_json::from_str(&body)?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Method {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| RpcError::InvalidResponse("No result in response".to_string()))
    }

    fn classify(&self, error: reqwest::Error) -> RpcError {
        if error.is_timeout() {
            RpcError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else if error.is_connect() {
            RpcError::Connection(error.to_string())
        } else {
            RpcError::Http(error)
        }
    }

    async fn request_quantity(&self, method: &str, params: Vec<Value>) -> Result<u128, RpcError> {
        let result = self.make_request(method, params).await?;
        let hex_string = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse(format!("{} result is not a string", method)))?;
        parse_hex_quantity(hex_string)
            .ok_or_else(|| RpcError::InvalidResponse(format!("{} returned invalid quantity {}", method, hex_string)))
    }

    pub async fn get_block_number(&self) -> Result<u64, RpcError> {
        let value = self.request_quantity("eth_blockNumber", vec![]).await?;
        u64::try_from(value).map_err(|_| RpcError::InvalidResponse(format!("Block number {} out of range", value)))
    }

    /// Native balance in raw 18-decimal units
    pub async fn get_balance(&self, address: &Address) -> Result<u128, RpcError> {
        self.request_quantity("eth_getBalance", vec![json!(address.as_str()), json!("latest")])
            .await
    }

    pub async fn get_transaction_count(&self, address: &Address) -> Result<u64, RpcError> {
        let value = self
            .request_quantity("eth_getTransactionCount", vec![json!(address.as_str()), json!("latest")])
            .await?;
        u64::try_from(value).map_err(|_| RpcError::InvalidResponse(format!("Nonce {} out of range", value)))
    }

    /// Read-only contract call against the latest block, returning the raw hex result
    pub async fn call(&self, to: &Address, data: &str) -> Result<String, RpcError> {
        let params = vec![json!({ "to": to.as_str(), "data": data }), json!("latest")];
        let result = self.make_request("eth_call", params).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::InvalidResponse("eth_call result is not a string".to_string()))
    }

    /// Block with full transaction objects
    pub async fn get_block_with_transactions(&self, block_number: u64) -> Result<Block, RpcError> {
        let params = vec![json!(format!("0x{:x}", block_number)), json!(true)];
        let result = self.make_request("eth_getBlockByNumber", params).await?;

        if result.is_null() {
            return Err(RpcError::InvalidResponse(format!("Block {} not found", block_number)));
        }

        Ok(serde_json::from_value(result)?)
    }

    pub async fn get_transaction_receipt(&self, hash: &str) -> Result<TransactionReceipt, RpcError> {
        let result = self
            .make_request("eth_getTransactionReceipt", vec![json!(hash)])
            .await?;

        if result.is_null() {
            return Err(RpcError::InvalidResponse(format!("Receipt for {} not found", hash)));
        }

        Ok(serde_json::from_value(result)?)
    }
}

/// Parse a hex-encoded block field such as a timestamp
pub fn parse_hex_to_u64(hex_str: &str) -> Result<u64, RpcError> {
    parse_hex_quantity(hex_str)
        .and_then(|value| u64::try_from(value).ok())
        .ok_or_else(|| RpcError::InvalidResponse(format!("Failed to parse hex '{}' to u64", hex_str)))
}
