use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fractional digits used for both the native currency and the tracked token
pub const TOKEN_DECIMALS: u32 = 18;

/// A balance value, or the explicit marker that it could not be retrieved.
///
/// `Unavailable` persists as `null` and never takes part in arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Decimal>", into = "Option<Decimal>")]
pub enum Amount {
    Value(Decimal),
    Unavailable,
}

impl Amount {
    /// Normalize a raw integer amount by 18 decimals.
    /// Values too large for a fixed-point decimal become `Unavailable`.
    pub fn from_wei(raw: u128) -> Self {
        wei_to_decimal(raw).map(Amount::Value).unwrap_or(Amount::Unavailable)
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            Amount::Value(value) => Some(*value),
            Amount::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Amount::Value(_))
    }

    /// `self - previous`, or `None` when either side is unavailable
    pub fn delta_since(&self, previous: &Amount) -> Option<Decimal> {
        match (self, previous) {
            (Amount::Value(current), Amount::Value(prev)) => current.checked_sub(*prev),
            _ => None,
        }
    }
}

impl From<Option<Decimal>> for Amount {
    fn from(value: Option<Decimal>) -> Self {
        match value {
            Some(value) => Amount::Value(value),
            None => Amount::Unavailable,
        }
    }
}

impl From<Amount> for Option<Decimal> {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Value(value) => write!(f, "{}", value.normalize()),
            Amount::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// Scale a raw 18-decimal integer into a decimal
pub fn wei_to_decimal(raw: u128) -> Option<Decimal> {
    let raw = i128::try_from(raw).ok()?;
    Decimal::try_from_i128_with_scale(raw, TOKEN_DECIMALS).ok()
}

/// Parse a `0x`-prefixed hex quantity (as returned by JSON-RPC) into a raw integer.
/// `0x` alone is zero; values wider than 128 bits are rejected.
pub fn parse_hex_quantity(hex_str: &str) -> Option<u128> {
    let digits = hex_str.trim().strip_prefix("0x").unwrap_or(hex_str.trim());
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return if digits.chars().all(|c| c == '0') { Some(0) } else { None };
    }
    if significant.len() > 32 {
        return None;
    }
    u128::from_str_radix(significant, 16).ok()
}

/// Parse a base-10 integer string of wei into a decimal amount
pub fn parse_wei_decimal_str(value: &str) -> Option<Decimal> {
    value.trim().parse::<u128>().ok().and_then(wei_to_decimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_from_wei() {
        assert_eq!(Amount::from_wei(1_000_000_000_000_000_000), Amount::Value(dec("1")));
        assert_eq!(Amount::from_wei(2_500_000_000_000_000_000), Amount::Value(dec("2.5")));
        assert_eq!(Amount::from_wei(1), Amount::Value(dec("0.000000000000000001")));
        assert_eq!(Amount::from_wei(0), Amount::Value(Decimal::ZERO));
    }

    #[test]
    fn test_from_wei_overflow_is_unavailable() {
        assert_eq!(Amount::from_wei(u128::MAX), Amount::Unavailable);
    }

    #[test]
    fn test_delta_since() {
        let previous = Amount::Value(dec("10.0"));
        let current = Amount::Value(dec("12.5"));
        assert_eq!(current.delta_since(&previous), Some(dec("2.5")));
        assert_eq!(previous.delta_since(&current), Some(dec("-2.5")));

        assert_eq!(current.delta_since(&Amount::Unavailable), None);
        assert_eq!(Amount::Unavailable.delta_since(&previous), None);
    }

    #[test]
    fn test_delta_is_exact() {
        let previous = Amount::from_wei(100_000_000_000_000_001);
        let current = Amount::from_wei(300_000_000_000_000_003);
        assert_eq!(current.delta_since(&previous), Some(dec("0.200000000000000002")));
    }

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(parse_hex_quantity("0x0"), Some(0));
        assert_eq!(parse_hex_quantity("0x"), Some(0));
        assert_eq!(parse_hex_quantity("0xde0b6b3a7640000"), Some(1_000_000_000_000_000_000));
        assert_eq!(
            parse_hex_quantity("0x0000000000000000000000000000000000000000000000000de0b6b3a7640000"),
            Some(1_000_000_000_000_000_000)
        );
        assert_eq!(parse_hex_quantity("0xzz"), None);
        assert_eq!(parse_hex_quantity(&format!("0x1{}", "0".repeat(32))), None);
    }

    #[test]
    fn test_parse_wei_decimal_str() {
        assert_eq!(parse_wei_decimal_str("1500000000000000000"), Some(dec("1.5")));
        assert_eq!(parse_wei_decimal_str("not a number"), None);
    }

    #[test]
    fn test_serde_null_for_unavailable() {
        let json = serde_json::to_string(&Amount::Unavailable).unwrap();
        assert_eq!(json, "null");

        let json = serde_json::to_string(&Amount::Value(dec("12.5"))).unwrap();
        assert_eq!(json, "\"12.5\"");

        let parsed: Amount = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, Amount::Unavailable);
        let parsed: Amount = serde_json::from_str("\"5.0\"").unwrap();
        assert_eq!(parsed, Amount::Value(dec("5")));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::Value(dec("12.500")).to_string(), "12.5");
        assert_eq!(Amount::Unavailable.to_string(), "Unavailable");
    }
}
