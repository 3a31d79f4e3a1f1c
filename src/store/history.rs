use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::StoreError;
use crate::logging::MetricsLogger;
use crate::models::{Address, Amount, BalanceSnapshot, ChangeResult};
use crate::store::JsonDocument;

/// Last-known balances of one address, as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub native_amount: Amount,
    pub token_amount: Amount,
    pub observed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn to_snapshot(&self, address: Address) -> BalanceSnapshot {
        BalanceSnapshot {
            address,
            native_amount: self.native_amount,
            token_amount: self.token_amount,
            observed_at: self.observed_at,
        }
    }
}

impl From<&BalanceSnapshot> for HistoryEntry {
    fn from(snapshot: &BalanceSnapshot) -> Self {
        Self {
            native_amount: snapshot.native_amount,
            token_amount: snapshot.token_amount,
            observed_at: snapshot.observed_at,
        }
    }
}

pub type HistoryMap = BTreeMap<Address, HistoryEntry>;

/// Per-address balance history holding exactly one entry per observed address
pub struct HistoryStore {
    document: JsonDocument<HistoryMap>,
}

impl HistoryStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            document: JsonDocument::load(path)?,
        })
    }

    pub fn new_in_memory() -> Self {
        Self {
            document: JsonDocument::new_in_memory(),
        }
    }

    /// Diff `current` against the stored entry for its address, then replace the entry.
    ///
    /// The first observation of an address reports no prior data.
    pub fn record_and_diff(&mut self, current: &BalanceSnapshot) -> Result<ChangeResult, StoreError> {
        let change = match self.document.data().get(&current.address) {
            Some(previous) => ChangeResult::between(&previous.to_snapshot(current.address.clone()), current),
            None => ChangeResult::first_observation(),
        };

        let entry_count = self.document.update(|entries| {
            entries.insert(current.address.clone(), HistoryEntry::from(current));
            entries.len()
        })?;

        MetricsLogger::log_history_update(current.address.as_str(), !change.has_prior_data(), entry_count);
        Ok(change)
    }

    /// Drop every entry
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.document.update(|entries| entries.clear())
    }

    pub fn get(&self, address: &Address) -> Option<BalanceSnapshot> {
        self.document
            .data()
            .get(address)
            .map(|entry| entry.to_snapshot(address.clone()))
    }

    pub fn len(&self) -> usize {
        self.document.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.data().is_empty()
    }
}
