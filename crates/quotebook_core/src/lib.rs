//! Core domain logic for Quotebook.
//! This crate is the single source of truth for quote invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod presenter;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::{load_config, ConfigError, QuotebookConfig, RemoteConfig, SyncConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::quote::{
    default_quotes, CategorySelection, Quote, QuoteCollection, QuoteValidationError,
    ALL_CATEGORIES,
};
pub use presenter::{QuotePresenter, SilentPresenter, NO_QUOTES_MESSAGE};
pub use repo::slot_repo::{MemorySlotStore, RepoError, RepoResult, SlotStore, SqliteSlotStore};
pub use service::quote_store::{QuoteStore, StoreError, StoreResult};
pub use service::reconcile::{
    reconcile, MergePolicy, Reconciliation, ReconciliationService, SyncError, SyncReport,
};
pub use service::selection::{
    categories, filter, pick_random, IndexSource, OsIndexSource, PickError,
};
pub use service::transfer::{FormatError, ImportPolicy, ImportResult};
pub use sync::http_source::HttpQuoteSource;
pub use sync::scheduler::{spawn_ticker, spawn_ticker_into, Tick, TickerHandle};
pub use sync::source::{QuoteSource, RemoteError, RemoteResult};
pub use sync::worker::{spawn_fetch_into, spawn_push};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
