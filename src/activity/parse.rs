//! Lenient field extraction for third-party activity payloads.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::models::{
    parse_hex_quantity, parse_wei_decimal_str, wei_to_decimal, Address, TokenDelta, TransferDirection, TxStatus,
};

/// Epoch values above this are treated as milliseconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// First non-null value among `keys`
pub fn field<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| item.get(*key)).find(|value| !value.is_null())
}

/// String or number rendered as a trimmed, non-empty string
pub fn as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Epoch seconds, epoch milliseconds, their string forms, or RFC 3339
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = as_text(value)?;
    if let Ok(epoch) = text.parse::<i64>() {
        return from_epoch(epoch);
    }
    if let Ok(epoch) = text.parse::<f64>() {
        return from_epoch(epoch as i64);
    }
    DateTime::parse_from_rfc3339(&text).ok().map(|dt| dt.with_timezone(&Utc))
}

fn from_epoch(epoch: i64) -> Option<DateTime<Utc>> {
    if epoch.unsigned_abs() >= MILLIS_THRESHOLD.unsigned_abs() {
        Utc.timestamp_millis_opt(epoch).single()
    } else {
        Utc.timestamp_opt(epoch, 0).single()
    }
}

/// Decimal amount already expressed in whole units
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = as_text(value)?;
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Raw 18-decimal integer amount, in base 10 or `0x` hex
pub fn parse_wei(value: &Value) -> Option<Decimal> {
    let text = as_text(value)?;
    if text.starts_with("0x") {
        parse_hex_quantity(&text).and_then(wei_to_decimal)
    } else {
        parse_wei_decimal_str(&text)
    }
}

/// Raw integer field, in base 10 or `0x` hex
pub fn parse_integer(value: &Value) -> Option<u128> {
    let text = as_text(value)?;
    if text.starts_with("0x") {
        parse_hex_quantity(&text)
    } else {
        text.parse::<u128>().ok()
    }
}

/// Status flags reported as booleans, numbers or words. Anything unrecognized counts as success.
pub fn parse_status(value: Option<&Value>) -> TxStatus {
    let failed = match value {
        Some(Value::Bool(ok)) => !ok,
        Some(Value::Number(n)) => n.as_i64() == Some(0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "0" | "0x0" | "fail" | "failed" | "failure" | "error" | "reverted"
        ),
        _ => false,
    };
    if failed {
        TxStatus::Failed
    } else {
        TxStatus::Succeeded
    }
}

/// Native-currency movement of a plain value transfer, relative to the watched address.
/// Zero-value transfers produce no entry.
pub fn native_transfer(
    watched: &Address,
    value: Option<Decimal>,
    from: Option<&str>,
    symbol: &str,
) -> Option<TokenDelta> {
    let amount = value.filter(|amount| !amount.is_zero())?;
    let direction = match from {
        Some(from) if watched.matches(from) => TransferDirection::Outgoing,
        _ => TransferDirection::Incoming,
    };
    Some(TokenDelta {
        symbol: symbol.to_string(),
        amount,
        direction,
    })
}
