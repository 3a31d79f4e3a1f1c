#![allow(dead_code)]

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fortytwo_monitor::config::AppConfig;

pub const WATCHED: &str = "0x2b0257e1302f2c3e0677956d0ea3f28d84919884";
pub const COUNTERPARTY: &str = "0x1111111111111111111111111111111111111111";
pub const TOKEN_CONTRACT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

/// 32-byte ABI word holding `value`
pub fn abi_word(value: u128) -> String {
    format!("0x{:064x}", value)
}

pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

pub fn rpc_method(name: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": name })))
}

pub async fn mount_rpc(server: &MockServer, name: &str, result: Value) {
    rpc_method(name).respond_with(rpc_result(result)).mount(server).await;
}

/// Indexer answer with a single incoming transfer
pub fn indexer_body(hash: &str, timestamp_ms: i64) -> Value {
    json!({
        "code": 0,
        "message": "OK",
        "result": {
            "data": [{
                "hash": hash,
                "timestamp": timestamp_ms,
                "transactionFee": "0.000021",
                "status": 1,
                "txName": "Transfer",
                "addTokens": [{ "symbol": "MON", "amount": "1.5" }],
                "subTokens": []
            }]
        }
    })
}

/// Configuration pointing every endpoint at mock servers and every document into `dir`
pub fn test_config(rpc: &MockServer, activity: &MockServer, dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.rpc.endpoint = rpc.uri();
    config.rpc.timeout_seconds = 2;
    config.token.contract_address = Some(TOKEN_CONTRACT.to_string());
    config.activity.indexer_url = format!("{}/activities", activity.uri());
    config.activity.explorer_base_url = activity.uri();
    config.activity.timeout_seconds = 2;
    config.activity.scan_depth = 3;
    config.storage.history_path = dir.path().join("balance_history.json").display().to_string();
    config.storage.watchlist_path = dir.path().join("user_configs.json").display().to_string();
    config.watchlist.default_addresses = vec![WATCHED.to_string()];
    config
}
