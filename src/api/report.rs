//! Plain-text rendering of observations and watchlists.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::models::{Address, TransactionRecord, TransferDirection, TxStatus};
use crate::monitor::Observation;
use crate::store::AddOutcome;

/// Display settings for rendered reports
#[derive(Debug, Clone)]
pub struct ReportStyle {
    pub native_symbol: String,
    pub token_symbol: String,
    pub explorer_base_url: String,
}

impl ReportStyle {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            native_symbol: config.token.native_symbol.clone(),
            token_symbol: config.token.symbol.clone(),
            explorer_base_url: config.activity.explorer_base_url.clone(),
        }
    }

    pub fn explorer_link(&self, address: &Address) -> String {
        format!(
            "{}/address/{}?tab=Activity&portfolio=Token",
            self.explorer_base_url.trim_end_matches('/'),
            address.to_checksum()
        )
    }

    pub fn header(&self, at: DateTime<Utc>) -> String {
        format!("FortyTwo balance report ({} UTC)", at.format("%Y-%m-%d %H:%M:%S"))
    }

    pub fn observations(&self, observations: &[Observation], at: DateTime<Utc>) -> String {
        let mut out = self.header(at);
        out.push('\n');
        for (index, observation) in observations.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{}. ", index + 1));
            out.push_str(&self.observation(observation));
        }
        out
    }

    pub fn observation(&self, observation: &Observation) -> String {
        let snapshot = &observation.snapshot;
        let mut out = String::new();

        out.push_str(&format!("{}\n", snapshot.address.to_checksum()));
        out.push_str(&format!(
            "   {}: {}{}\n",
            self.native_symbol,
            snapshot.native_amount,
            delta_suffix(observation.change.native_delta, observation.change.has_prior_data())
        ));
        out.push_str(&format!(
            "   {}: {}{}\n",
            self.token_symbol,
            snapshot.token_amount,
            delta_suffix(observation.change.token_delta, observation.change.has_prior_data())
        ));

        if observation.recent.is_empty() {
            out.push_str("   No recent activity\n");
        } else {
            out.push_str("   Recent activity:\n");
            for record in &observation.recent {
                out.push_str(&format!("   - {}\n", transaction_line(record)));
            }
        }

        out.push_str(&format!("   Explorer: {}\n", self.explorer_link(&snapshot.address)));
        out
    }

    pub fn watchlist(&self, user_id: &str, configured: Option<&[Address]>, defaults: &[Address]) -> String {
        let mut out = String::new();
        let (label, addresses) = match configured {
            Some(addresses) => (format!("Watchlist for {}", user_id), addresses),
            None => (format!("No addresses configured for {}; using defaults", user_id), defaults),
        };
        out.push_str(&format!("{}:\n", label));
        for (index, address) in addresses.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", index + 1, address.to_checksum()));
        }
        out
    }

    pub fn add_outcome(&self, address: &Address, outcome: AddOutcome) -> String {
        match outcome {
            AddOutcome::Added => format!("Added {} to the watchlist", address.to_checksum()),
            AddOutcome::AlreadyPresent => format!("{} is already in the watchlist", address.to_checksum()),
        }
    }
}

fn delta_suffix(delta: Option<Decimal>, has_prior_data: bool) -> String {
    match delta {
        Some(delta) if delta.is_zero() => " (no change)".to_string(),
        Some(delta) if delta.is_sign_positive() => format!(" (+{})", delta.normalize()),
        Some(delta) => format!(" ({})", delta.normalize()),
        None if has_prior_data => " (change unknown)".to_string(),
        None => " (first observation)".to_string(),
    }
}

fn transaction_line(record: &TransactionRecord) -> String {
    let mut line = format!(
        "{} {} {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.tx_type,
        record.short_hash()
    );
    for transfer in &record.transfers {
        let sign = match transfer.direction {
            TransferDirection::Incoming => '+',
            TransferDirection::Outgoing => '-',
        };
        line.push_str(&format!(" {}{} {}", sign, transfer.amount.normalize(), transfer.symbol));
    }
    if !record.fee.is_zero() {
        line.push_str(&format!(" fee {}", record.fee.normalize()));
    }
    if record.status == TxStatus::Failed {
        line.push_str(" [failed]");
    }
    line
}
