mod common;

use clap::Parser;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{abi_word, indexer_body, mount_rpc, rpc_result, test_config, WATCHED};
use fortytwo_monitor::api::{Cli, CliHandler, Commands};
use fortytwo_monitor::error::MonitorError;

fn command(args: &[&str]) -> Commands {
    let mut argv = vec!["fortytwo-monitor"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("valid command line").command
}

#[tokio::test]
async fn test_add_and_list_addresses() {
    let rpc = MockServer::start().await;
    let activity = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");

    let mut handler = CliHandler::from_config(&test_config(&rpc, &activity, &dir)).expect("handler");

    let output = handler
        .execute_command(&command(&["list-addresses", "--user", "bob"]))
        .await
        .expect("list");
    assert!(output.starts_with("No addresses configured for bob; using defaults:"));

    let output = handler
        .execute_command(&command(&[
            "add-address",
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "--user",
            "bob",
        ]))
        .await
        .expect("add");
    assert_eq!(output, "Added 0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed to the watchlist");

    let output = handler
        .execute_command(&command(&[
            "add-address",
            "0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED",
            "--user",
            "bob",
        ]))
        .await
        .expect("add duplicate");
    assert!(output.ends_with("is already in the watchlist"));

    let output = handler
        .execute_command(&command(&["list-addresses", "--user", "bob"]))
        .await
        .expect("list");
    assert!(output.starts_with("Watchlist for bob:"));
    assert!(output.contains("1. 0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
}

#[tokio::test]
async fn test_check_renders_report() {
    let rpc = MockServer::start().await;
    let activity = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");

    mount_rpc(&rpc, "eth_blockNumber", json!("0x2a")).await;
    mount_rpc(&rpc, "eth_getBalance", json!("0xde0b6b3a7640000")).await;
    mount_rpc(&rpc, "eth_call", json!(abi_word(0))).await;
    Mock::given(method("GET"))
        .and(path("/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "OK",
            "result": { "data": [] }
        })))
        .mount(&activity)
        .await;
    // Explorer and scan have nothing either
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&activity)
        .await;
    mount_rpc(&rpc, "eth_getTransactionCount", json!("0x0")).await;

    let mut handler = CliHandler::from_config(&test_config(&rpc, &activity, &dir)).expect("handler");
    let output = handler
        .execute_command(&command(&["check"]))
        .await
        .expect("check");

    assert!(output.starts_with("FortyTwo balance report ("));
    assert!(output.contains("MON: 1 (first observation)"));
    assert!(output.contains("FT: 0 (first observation)"));
    assert!(output.contains("No recent activity"));
    assert!(output.contains("?tab=Activity&portfolio=Token"));
}

#[tokio::test]
async fn test_check_address_with_activity_and_reset() {
    let rpc = MockServer::start().await;
    let activity = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");

    mount_rpc(&rpc, "eth_blockNumber", json!("0x2a")).await;
    mount_rpc(&rpc, "eth_getBalance", json!("0x0")).await;
    mount_rpc(&rpc, "eth_call", json!(abi_word(0))).await;
    Mock::given(method("GET"))
        .and(path("/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(indexer_body("0x0123456789abcdef", 1_709_287_200_000)))
        .mount(&activity)
        .await;

    let mut handler = CliHandler::from_config(&test_config(&rpc, &activity, &dir)).expect("handler");

    let output = handler
        .execute_command(&command(&["check-address", WATCHED]))
        .await
        .expect("check-address");
    assert!(output.contains("2024-03-01 10:00:00 Transfer 0x01234567... +1.5 MON fee 0.000021"));

    let output = handler
        .execute_command(&command(&["check-address", WATCHED]))
        .await
        .expect("check-address");
    assert!(output.contains("MON: 0 (no change)"));

    let output = handler
        .execute_command(&command(&["reset-history"]))
        .await
        .expect("reset");
    assert_eq!(output, "Balance history cleared");

    let output = handler
        .execute_command(&command(&["check-address", WATCHED]))
        .await
        .expect("check-address");
    assert!(output.contains("MON: 0 (first observation)"));
}

#[tokio::test]
async fn test_invalid_address_never_reaches_network() {
    let rpc = MockServer::start().await;
    let activity = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");

    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0x1")))
        .expect(0)
        .mount(&rpc)
        .await;

    let mut handler = CliHandler::from_config(&test_config(&rpc, &activity, &dir)).expect("handler");
    let result = handler
        .execute_command(&command(&["check-address", "0x12"]))
        .await;

    assert!(matches!(result, Err(MonitorError::Validation(_))));
}

#[tokio::test]
async fn test_generate_config_output_parses() {
    let rpc = MockServer::start().await;
    let activity = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");

    let mut handler = CliHandler::from_config(&test_config(&rpc, &activity, &dir)).expect("handler");
    let output = handler
        .execute_command(&Commands::GenerateConfig)
        .await
        .expect("generate-config");

    let parsed: fortytwo_monitor::config::AppConfig = toml::from_str(&output).expect("valid toml");
    assert!(parsed.validate().is_ok());
}
