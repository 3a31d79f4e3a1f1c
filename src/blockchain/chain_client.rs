use serde_json::json;

use crate::blockchain::erc20::{decode_uint256, encode_balance_of};
use crate::blockchain::rpc_client::{RpcClient, RpcError};
use crate::logging::LogContext;
use crate::models::{Address, Amount};

/// Balance lookups against the configured RPC endpoint.
///
/// Per-call failures are folded into `Amount::Unavailable`; only the connectivity
/// probe reports an error. Nothing is cached.
#[derive(Clone)]
pub struct ChainClient {
    rpc: RpcClient,
}

impl ChainClient {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Fails when the endpoint cannot answer a trivial request
    pub async fn check_connectivity(&self) -> Result<u64, RpcError> {
        self.rpc.get_block_number().await
    }

    pub async fn get_native_balance(&self, address: &Address) -> Amount {
        match self.rpc.get_balance(address).await {
            Ok(raw) => Amount::from_wei(raw),
            Err(e) => {
                LogContext::new("chain_client", "get_native_balance")
                    .with_address(address.as_str())
                    .with_metadata("error", json!(e.to_string()))
                    .warn("Native balance unavailable");
                Amount::Unavailable
            }
        }
    }

    pub async fn get_token_balance(&self, address: &Address, token_contract: &Address) -> Amount {
        let context = LogContext::new("chain_client", "get_token_balance")
            .with_address(address.as_str())
            .with_metadata("token_contract", json!(token_contract.as_str()));

        let result = match self.rpc.call(token_contract, &encode_balance_of(address)).await {
            Ok(result) => result,
            Err(e) => {
                context
                    .with_metadata("error", json!(e.to_string()))
                    .warn("Token balance unavailable");
                return Amount::Unavailable;
            }
        };

        match decode_uint256(&result) {
            Some(raw) => Amount::from_wei(raw),
            None => {
                context
                    .with_metadata("result", json!(result))
                    .warn("Undecodable balanceOf result");
                Amount::Unavailable
            }
        }
    }
}
