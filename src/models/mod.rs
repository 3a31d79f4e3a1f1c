pub mod address;
pub mod amount;
pub mod snapshot;
pub mod transaction;

pub use address::Address;
pub use amount::{Amount, TOKEN_DECIMALS, parse_hex_quantity, parse_wei_decimal_str, wei_to_decimal};
pub use snapshot::{BalanceSnapshot, ChangeResult};
pub use transaction::{most_recent, TokenDelta, TransactionRecord, TransferDirection, TxStatus, DEFAULT_TX_TYPE, HASH_PREFIX_LEN};
