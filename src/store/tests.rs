#[cfg(test)]
mod tests {
    use crate::error::{MonitorError, ValidationError};
    use crate::models::{Address, Amount, BalanceSnapshot};
    use crate::store::{AddOutcome, HistoryStore, WatchlistStore};
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    const ADDRESS: &str = "0x2b0257e1302f2c3e0677956d0ea3f28d84919884";
    const OTHER: &str = "0x438b28b1f4aec1a38acf577ad63921a21ab1bc4f";

    fn address(raw: &str) -> Address {
        Address::parse(raw).expect("valid test address")
    }

    fn amount(value: &str) -> Amount {
        Amount::Value(Decimal::from_str(value).expect("valid decimal"))
    }

    fn snapshot(native: Amount, token: Amount) -> BalanceSnapshot {
        BalanceSnapshot::new(address(ADDRESS), native, token)
    }

    #[test]
    fn test_first_observation_reports_no_prior_data() {
        let mut store = HistoryStore::new_in_memory();
        assert!(store.is_empty());

        let change = store
            .record_and_diff(&snapshot(amount("10.0"), amount("5.0")))
            .expect("Failed to record snapshot");

        assert!(change.native_delta.is_none());
        assert!(change.token_delta.is_none());
        assert!(change.previous_observed_at.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delta_between_observations() {
        let mut store = HistoryStore::new_in_memory();
        let first_at = Utc::now() - Duration::minutes(5);

        store
            .record_and_diff(&snapshot(amount("10.0"), amount("5.0")).with_observed_at(first_at))
            .expect("Failed to record first snapshot");
        let change = store
            .record_and_diff(&snapshot(amount("12.5"), amount("5.0")))
            .expect("Failed to record second snapshot");

        assert_eq!(change.native_delta, Some(Decimal::from_str("2.5").unwrap()));
        // Observed twice without moving: zero, not absent
        assert_eq!(change.token_delta, Some(Decimal::ZERO));
        assert_eq!(change.previous_observed_at, Some(first_at));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unavailable_side_yields_absent_delta() {
        let mut store = HistoryStore::new_in_memory();

        store
            .record_and_diff(&snapshot(amount("1"), Amount::Unavailable))
            .expect("Failed to record snapshot");
        let change = store
            .record_and_diff(&snapshot(Amount::Unavailable, amount("3")))
            .expect("Failed to record snapshot");

        assert!(change.native_delta.is_none());
        assert!(change.token_delta.is_none());
        assert!(change.has_prior_data());

        // The entry is replaced whole, so the unavailable native amount is what is stored now
        let stored = store.get(&address(ADDRESS)).expect("entry present");
        assert_eq!(stored.native_amount, Amount::Unavailable);
        assert_eq!(stored.token_amount, amount("3"));
    }

    #[test]
    fn test_reset_then_observe_is_first_observation() {
        let mut store = HistoryStore::new_in_memory();
        store
            .record_and_diff(&snapshot(amount("1"), amount("1")))
            .expect("Failed to record snapshot");

        store.reset().expect("Failed to reset");
        store.reset().expect("Reset is idempotent");
        assert!(store.is_empty());

        let change = store
            .record_and_diff(&snapshot(amount("2"), amount("2")))
            .expect("Failed to record snapshot");
        assert!(!change.has_prior_data());
    }

    #[test]
    fn test_history_survives_reload() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("balance_history.json");

        {
            let mut store = HistoryStore::load(&path).expect("Failed to load store");
            store
                .record_and_diff(&snapshot(amount("10"), Amount::Unavailable))
                .expect("Failed to record snapshot");
        }

        let raw = std::fs::read_to_string(&path).expect("history file written");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("history is JSON");
        assert_eq!(json[ADDRESS]["native_amount"], "10");
        assert!(json[ADDRESS]["token_amount"].is_null());

        let mut store = HistoryStore::load(&path).expect("Failed to reload store");
        let change = store
            .record_and_diff(&snapshot(amount("7.5"), amount("1")))
            .expect("Failed to record snapshot");
        assert_eq!(change.native_delta, Some(Decimal::from_str("-2.5").unwrap()));
        assert!(change.token_delta.is_none());
    }

    #[test]
    fn test_failed_write_does_not_record_snapshot() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let parent = dir.path().join("data");
        let path = parent.join("balance_history.json");

        let mut store = HistoryStore::load(&path).expect("Failed to load store");

        std::fs::write(&parent, "not a directory").expect("Failed to block directory");

        let result = store.record_and_diff(&snapshot(amount("10"), amount("5")));
        assert!(result.is_err());
        assert_eq!(store.len(), 0);

        std::fs::remove_file(&parent).expect("Failed to unblock directory");
        let change = store
            .record_and_diff(&snapshot(amount("12"), amount("5")))
            .expect("Failed to record snapshot");
        assert!(!change.has_prior_data());
    }

    #[test]
    fn test_watchlist_trims_user_id_on_every_access() {
        let defaults = vec![address(ADDRESS)];
        let mut store = WatchlistStore::new_in_memory(defaults.clone());

        store
            .add_address(" bob", address(OTHER))
            .expect("Failed to add address");

        assert_eq!(store.list("bob"), Some(&[address(OTHER)][..]));
        assert_eq!(store.list(" bob "), Some(&[address(OTHER)][..]));
        assert_eq!(store.addresses_for("bob\t"), vec![address(OTHER)]);
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_watchlist_defaults_and_add() {
        let defaults = vec![address(ADDRESS)];
        let mut store = WatchlistStore::new_in_memory(defaults.clone());

        assert!(store.list("alice").is_none());
        assert_eq!(store.addresses_for("alice"), defaults);

        let outcome = store
            .add_address("alice", address(OTHER))
            .expect("Failed to add address");
        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(store.addresses_for("alice"), vec![address(OTHER)]);
        assert_eq!(store.addresses_for("bob"), defaults);
    }

    #[test]
    fn test_watchlist_rejects_case_insensitive_duplicates() {
        let mut store = WatchlistStore::new_in_memory(Vec::new());
        store
            .add_address("alice", address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"))
            .expect("Failed to add address");

        let outcome = store
            .add_address("alice", address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"))
            .expect("Failed to add address");
        assert_eq!(outcome, AddOutcome::AlreadyPresent);
        assert_eq!(store.list("alice").map(<[Address]>::len), Some(1));
    }

    #[test]
    fn test_watchlist_rejects_blank_user() {
        let mut store = WatchlistStore::new_in_memory(Vec::new());
        let result = store.add_address("   ", address(ADDRESS));
        assert!(matches!(
            result,
            Err(MonitorError::Validation(ValidationError::InvalidUserId(_)))
        ));
        assert_eq!(store.user_count(), 0);
    }

    #[test]
    fn test_watchlist_document_format() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("user_configs.json");

        let mut store = WatchlistStore::load(&path, Vec::new()).expect("Failed to load store");
        store
            .add_address("12345", address(ADDRESS))
            .expect("Failed to add address");
        store
            .add_address("12345", address(OTHER))
            .expect("Failed to add address");

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("file written")).expect("valid JSON");
        assert_eq!(json["12345"]["addresses"][0], ADDRESS);
        assert_eq!(json["12345"]["addresses"][1], OTHER);

        let reloaded = WatchlistStore::load(&path, Vec::new()).expect("Failed to reload store");
        assert_eq!(reloaded.addresses_for("12345"), vec![address(ADDRESS), address(OTHER)]);
    }
}
