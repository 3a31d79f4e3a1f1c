pub mod document;
pub mod history;
pub mod watchlist;

#[cfg(test)]
mod tests;

pub use document::JsonDocument;
pub use history::{HistoryEntry, HistoryMap, HistoryStore};
pub use watchlist::{AddOutcome, UserWatchlist, WatchlistMap, WatchlistStore, MAX_USER_ID_LEN};
