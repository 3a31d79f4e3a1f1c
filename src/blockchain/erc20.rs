use crate::models::{parse_hex_quantity, Address};

/// `balanceOf(address)` function selector
pub const BALANCE_OF_SELECTOR: &str = "0x70a08231";

/// ABI-encode a `balanceOf(owner)` call
pub fn encode_balance_of(owner: &Address) -> String {
    format!("{}{:0>64}", BALANCE_OF_SELECTOR, owner.hex_body())
}

/// Decode a single `uint256` return word.
///
/// Returns `None` for an empty result (no contract at the address) or a value wider than 128 bits.
pub fn decode_uint256(result: &str) -> Option<u128> {
    let body = result.trim().strip_prefix("0x").unwrap_or(result.trim());
    if body.is_empty() || body.len() > 64 {
        return None;
    }
    parse_hex_quantity(body)
}
