use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Address, Amount};

/// A point-in-time balance observation for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub address: Address,
    pub native_amount: Amount,
    pub token_amount: Amount,
    pub observed_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    pub fn new(address: Address, native_amount: Amount, token_amount: Amount) -> Self {
        Self {
            address,
            native_amount,
            token_amount,
            observed_at: Utc::now(),
        }
    }

    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = observed_at;
        self
    }
}

/// Signed balance changes since the previous snapshot of the same address.
///
/// A delta is `None` when there is no prior snapshot or either side was unavailable.
/// `Some(0)` means the balance was observed twice and did not move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeResult {
    pub native_delta: Option<Decimal>,
    pub token_delta: Option<Decimal>,
    pub previous_observed_at: Option<DateTime<Utc>>,
}

impl ChangeResult {
    /// Result for an address with no prior data
    pub fn first_observation() -> Self {
        Self {
            native_delta: None,
            token_delta: None,
            previous_observed_at: None,
        }
    }

    pub fn between(previous: &BalanceSnapshot, current: &BalanceSnapshot) -> Self {
        Self {
            native_delta: current.native_amount.delta_since(&previous.native_amount),
            token_delta: current.token_amount.delta_since(&previous.token_amount),
            previous_observed_at: Some(previous.observed_at),
        }
    }

    pub fn has_prior_data(&self) -> bool {
        self.previous_observed_at.is_some()
    }
}
