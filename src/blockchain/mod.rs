pub mod chain_client;
pub mod erc20;
pub mod rpc_client;

pub use chain_client::ChainClient;
pub use rpc_client::{Block, RpcClient, RpcError, Transaction, TransactionReceipt};
