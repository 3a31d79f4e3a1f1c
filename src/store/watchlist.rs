use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, StoreError, ValidationError};
use crate::logging::LogContext;
use crate::models::Address;
use crate::store::JsonDocument;

/// Longest accepted user id
pub const MAX_USER_ID_LEN: usize = 128;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserWatchlist {
    pub addresses: Vec<Address>,
}

pub type WatchlistMap = BTreeMap<String, UserWatchlist>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Per-user ordered address lists, falling back to a default list for users
/// without one.
pub struct WatchlistStore {
    document: JsonDocument<WatchlistMap>,
    defaults: Vec<Address>,
}

impl WatchlistStore {
    pub fn load(path: impl AsRef<Path>, defaults: Vec<Address>) -> std::result::Result<Self, StoreError> {
        Ok(Self {
            document: JsonDocument::load(path)?,
            defaults,
        })
    }

    pub fn new_in_memory(defaults: Vec<Address>) -> Self {
        Self {
            document: JsonDocument::new_in_memory(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &[Address] {
        &self.defaults
    }

    /// Append `address` to the user's list unless already present (compared in canonical form)
    pub fn add_address(&mut self, user_id: &str, address: Address) -> Result<AddOutcome> {
        let user_id = validate_user_id(user_id)?;

        if self.list(user_id).map_or(false, |addresses| addresses.contains(&address)) {
            return Ok(AddOutcome::AlreadyPresent);
        }

        let count = self.document.update(|users| {
            let watchlist = users.entry(user_id.to_string()).or_default();
            watchlist.addresses.push(address.clone());
            watchlist.addresses.len()
        })?;

        LogContext::new("watchlist", "add_address")
            .with_address(address.as_str())
            .with_metadata("user_id", serde_json::json!(user_id))
            .with_metadata("address_count", serde_json::json!(count))
            .info("Address added to watchlist");

        Ok(AddOutcome::Added)
    }

    /// The user's configured list, or `None` when the user has not added any address
    pub fn list(&self, user_id: &str) -> Option<&[Address]> {
        self.document
            .data()
            .get(user_id.trim())
            .map(|watchlist| watchlist.addresses.as_slice())
            .filter(|addresses| !addresses.is_empty())
    }

    /// Addresses to observe for the user: their own list, else the defaults
    pub fn addresses_for(&self, user_id: &str) -> Vec<Address> {
        self.list(user_id)
            .map(<[Address]>::to_vec)
            .unwrap_or_else(|| self.defaults.clone())
    }

    pub fn user_count(&self) -> usize {
        self.document.data().len()
    }
}

fn validate_user_id(user_id: &str) -> std::result::Result<&str, ValidationError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_USER_ID_LEN || trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidUserId(user_id.to_string()));
    }
    Ok(trimmed)
}
