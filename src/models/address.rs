use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

use crate::error::ValidationError;

/// A validated EVM account address, held in lowercase canonical form (`0x` + 40 hex digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate an address.
    ///
    /// All-lowercase and all-uppercase hex is accepted as is. Mixed case must match the
    /// EIP-55 checksum, so a mistyped checksummed address is rejected rather than
    /// silently watched.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ValidationError::InvalidAddress(format!("{} is missing the 0x prefix", trimmed)))?;

        if body.len() != 40 {
            return Err(ValidationError::InvalidAddress(format!(
                "{} must have 40 hex digits, got {}",
                trimmed,
                body.len()
            )));
        }

        if !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidAddress(format!(
                "{} contains non-hexadecimal characters",
                trimmed
            )));
        }

        let lower = body.to_ascii_lowercase();
        let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = body.chars().any(|c| c.is_ascii_lowercase());

        if has_upper && has_lower && checksum_body(&lower) != body {
            return Err(ValidationError::ChecksumMismatch(trimmed.to_string()));
        }

        Ok(Address(format!("0x{}", lower)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 40 lowercase hex digits without the `0x` prefix
    pub fn hex_body(&self) -> &str {
        &self.0[2..]
    }

    /// EIP-55 mixed-case rendering
    pub fn to_checksum(&self) -> String {
        format!("0x{}", checksum_body(self.hex_body()))
    }

    /// Case-insensitive comparison against a raw address string from an RPC or API payload
    pub fn matches(&self, raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(&self.0)
    }
}

fn checksum_body(lower: &str) -> String {
    let mut hasher = Keccak::v256();
    hasher.update(lower.as_bytes());
    let mut digest = [0u8; 32];
    hasher.finalize(&mut digest);

    lower
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if c.is_ascii_digit() {
                return c;
            }
            let byte = digest[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if nibble >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
