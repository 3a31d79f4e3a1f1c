use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::activity::{ActivitySource, FetchError, FetchOutcome};
use crate::activity::parse::native_transfer;
use crate::blockchain::rpc_client::parse_hex_to_u64;
use crate::blockchain::{Block, RpcClient, Transaction};
use crate::config::MAX_SCAN_DEPTH;
use crate::logging::LogContext;
use crate::models::{parse_hex_quantity, wei_to_decimal, Address, TransactionRecord, TxStatus};

pub const TIER_NAME: &str = "chain_scan";

/// Last-resort tier: walks recent blocks over JSON-RPC looking for the newest
/// transaction touching the address.
pub struct ChainScanSource {
    rpc: RpcClient,
    scan_depth: u64,
    native_symbol: String,
}

impl ChainScanSource {
    /// `scan_depth` is clamped to `1..=MAX_SCAN_DEPTH`
    pub fn new(rpc: RpcClient, scan_depth: u64, native_symbol: String) -> Self {
        Self {
            rpc,
            scan_depth: scan_depth.clamp(1, MAX_SCAN_DEPTH),
            native_symbol,
        }
    }

    pub fn scan_depth(&self) -> u64 {
        self.scan_depth
    }

    async fn build_record(&self, address: &Address, block: &Block, tx: &Transaction) -> Option<TransactionRecord> {
        let seconds = parse_hex_to_u64(&block.timestamp).ok()?;
        let timestamp = Utc.timestamp_opt(i64::try_from(seconds).ok()?, 0).single()?;
        let mut record = TransactionRecord::new(tx.hash.clone(), timestamp);

        match self.rpc.get_transaction_receipt(&tx.hash).await {
            Ok(receipt) => {
                if receipt.status.as_deref().and_then(parse_hex_quantity) == Some(0) {
                    record.status = TxStatus::Failed;
                }
                let gas_used = parse_hex_quantity(&receipt.gas_used);
                let gas_price = receipt.effective_gas_price.as_deref().and_then(parse_hex_quantity);
                if let Some(fee) = gas_used
                    .zip(gas_price)
                    .and_then(|(used, price)| used.checked_mul(price))
                    .and_then(wei_to_decimal)
                {
                    record.fee = fee;
                }
            }
            Err(e) => {
                LogContext::new("chain_scan", "build_record")
                    .with_address(address.as_str())
                    .with_metadata("hash", json!(tx.hash))
                    .with_metadata("error", json!(e.to_string()))
                    .warn("Receipt unavailable, using default status and fee");
            }
        }

        let value = tx.value.as_deref().and_then(parse_hex_quantity).and_then(wei_to_decimal);
        record
            .transfers
            .extend(native_transfer(address, value, Some(&tx.from), &self.native_symbol));

        Some(record)
    }
}

fn touches(tx: &Transaction, address: &Address) -> bool {
    address.matches(&tx.from) || tx.to.as_deref().map_or(false, |to| address.matches(to))
}

#[async_trait]
impl ActivitySource for ChainScanSource {
    fn name(&self) -> &str {
        TIER_NAME
    }

    async fn fetch(&self, address: &Address, _limit: usize) -> Result<FetchOutcome, FetchError> {
        let nonce = self.rpc.get_transaction_count(address).await?;
        if nonce == 0 {
            return Ok(FetchOutcome::ConfirmedEmpty);
        }

        let head = self.rpc.get_block_number().await?;
        let lowest = head.saturating_sub(self.scan_depth - 1);

        let context = LogContext::new("chain_scan", "fetch")
            .with_address(address.as_str())
            .with_metadata("head", json!(head))
            .with_metadata("lowest", json!(lowest));
        context.debug("Scanning recent blocks");

        for number in (lowest..=head).rev() {
            let block = match self.rpc.get_block_with_transactions(number).await {
                Ok(block) => block,
                Err(e) => {
                    LogContext::new("chain_scan", "fetch")
                        .with_metadata("block", json!(number))
                        .with_metadata("error", json!(e.to_string()))
                        .warn("Skipping unreadable block");
                    continue;
                }
            };

            let Some(tx) = block.transactions.iter().find(|tx| touches(tx, address)) else {
                continue;
            };

            match self.build_record(address, &block, tx).await {
                Some(record) => return Ok(FetchOutcome::Records(vec![record])),
                None => {
                    LogContext::new("chain_scan", "fetch")
                        .with_metadata("block", json!(number))
                        .with_metadata("timestamp", json!(block.timestamp))
                        .warn("Skipping block with unreadable timestamp");
                }
            }
        }

        context.debug("No matching transaction in scanned range");
        Ok(FetchOutcome::Records(Vec::new()))
    }
}
