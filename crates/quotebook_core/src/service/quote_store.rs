//! Quote collection owner.
//!
//! # Responsibility
//! - Hold the in-memory collection and keep it mirrored to durable slots.
//! - Answer category-filtered random selection queries.
//! - Apply local additions, bulk imports and reconciled collections.
//!
//! # Invariants
//! - Every successful mutation is persisted before the call returns.
//! - A failed mutation leaves the in-memory collection unchanged.
//! - Corrupt persisted data degrades to defaults and is never fatal.

use crate::model::quote::{
    default_quotes, CategorySelection, Quote, QuoteCollection, QuoteValidationError,
};
use crate::presenter::QuotePresenter;
use crate::repo::slot_repo::{
    RepoError, SlotStore, LAST_QUOTE_SLOT, LEGACY_CATEGORY_SLOT, QUOTES_SLOT,
    SELECTED_CATEGORY_SLOT,
};
use crate::service::selection::{self, IndexSource, OsIndexSource, PickError};
use crate::service::transfer::{
    export_json, merge_import, parse_import, FormatError, ImportPolicy, ImportResult,
};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    Validation(QuoteValidationError),
    Format(FormatError),
    Storage(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Format(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Format(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<QuoteValidationError> for StoreError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<FormatError> for StoreError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// Owner of the quote collection.
///
/// `D` holds durable slots, `S` holds session slots.
pub struct QuoteStore<D: SlotStore, S: SlotStore> {
    durable: D,
    session: S,
    quotes: QuoteCollection,
    import_policy: ImportPolicy,
}

impl<D: SlotStore, S: SlotStore> QuoteStore<D, S> {
    /// Creates a store and loads the collection from durable slots.
    pub fn open(durable: D, session: S) -> Self {
        let quotes = load_collection(&durable);
        Self {
            durable,
            session,
            quotes,
            import_policy: ImportPolicy::default(),
        }
    }

    /// Sets the duplicate policy used by `import_bulk`.
    pub fn with_import_policy(mut self, policy: ImportPolicy) -> Self {
        self.import_policy = policy;
        self
    }

    pub fn import_policy(&self) -> ImportPolicy {
        self.import_policy
    }

    /// Returns the current collection in insertion order.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Re-reads the persisted collection, falling back to defaults.
    pub fn load(&self) -> QuoteCollection {
        load_collection(&self.durable)
    }

    /// Persists the full collection.
    pub fn save(&self) -> StoreResult<()> {
        save_collection(&self.durable, &self.quotes)
    }

    /// Validates, appends and persists one quote.
    ///
    /// Exact duplicates are accepted on this path.
    ///
    /// # Errors
    /// - `Validation` when a field is blank; nothing changes.
    /// - `Storage` when persistence fails; the append is rolled back.
    pub fn add(&mut self, text: &str, category: &str) -> StoreResult<Quote> {
        let quote = match Quote::new(text, category) {
            Ok(quote) => quote,
            Err(err) => {
                warn!("event=quote_add module=store status=rejected reason={err}");
                return Err(err.into());
            }
        };

        self.quotes.push(quote.clone());
        if let Err(err) = self.save() {
            self.quotes.pop();
            error!("event=quote_add module=store status=error error={err}");
            return Err(err);
        }

        info!(
            "event=quote_add module=store status=ok total={}",
            self.quotes.len()
        );
        Ok(quote)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        selection::categories(&self.quotes)
    }

    /// Selector options, starting with the `all` wildcard.
    pub fn category_options(&self) -> Vec<String> {
        selection::category_options(&self.quotes)
    }

    /// Returns the persisted category selection.
    ///
    /// Falls back to the legacy slot, then to `All`.
    pub fn selected_category(&self) -> CategorySelection {
        for key in [SELECTED_CATEGORY_SLOT, LEGACY_CATEGORY_SLOT] {
            match self.durable.get(key) {
                Ok(Some(value)) => return CategorySelection::parse(&value),
                Ok(None) => {}
                Err(err) => {
                    warn!("event=category_load module=store status=error slot={key} error={err}");
                }
            }
        }
        CategorySelection::All
    }

    /// Persists a new category selection.
    pub fn set_selected_category(&self, value: &str) -> StoreResult<CategorySelection> {
        let selection = CategorySelection::parse(value);
        self.durable.set(SELECTED_CATEGORY_SLOT, selection.as_str())?;
        info!("event=category_select module=store status=ok");
        Ok(selection)
    }

    /// Selection actually applied to the view.
    ///
    /// A persisted category that no longer exists widens to `All`.
    pub fn effective_selection(&self) -> CategorySelection {
        match self.selected_category() {
            CategorySelection::Exact(value)
                if !self.quotes.iter().any(|quote| quote.category == value) =>
            {
                CategorySelection::All
            }
            other => other,
        }
    }

    /// Filters the collection.
    pub fn filter(&self, selection: &CategorySelection) -> QuoteCollection {
        selection::filter(&self.quotes, selection)
    }

    /// Picks, remembers and renders a random quote for `selection`.
    ///
    /// An empty filter renders the empty state; a randomness failure renders
    /// an error. Neither touches `lastQuote`.
    pub fn show_random(
        &self,
        selection: &CategorySelection,
        presenter: &dyn QuotePresenter,
    ) -> Result<Quote, PickError> {
        self.show_random_with(selection, presenter, &mut OsIndexSource)
    }

    /// Same as `show_random` with a caller-provided index source.
    pub fn show_random_with(
        &self,
        selection: &CategorySelection,
        presenter: &dyn QuotePresenter,
        source: &mut dyn IndexSource,
    ) -> Result<Quote, PickError> {
        let filtered = self.filter(selection);
        let quote = match selection::pick_random_with(&filtered, source) {
            Ok(quote) => quote.clone(),
            Err(PickError::Empty) => {
                presenter.render_empty(selection);
                return Err(PickError::Empty);
            }
            Err(err) => {
                presenter.render_error(&format!("Could not pick a quote: {err}"));
                return Err(err);
            }
        };

        self.remember_shown(&quote);
        presenter.render(&quote);
        Ok(quote)
    }

    /// Returns the last quote shown in this session.
    pub fn last_shown(&self) -> Option<Quote> {
        let raw = match self.session.get(LAST_QUOTE_SLOT) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("event=last_quote_load module=store status=error error={err}");
                return None;
            }
        };

        match serde_json::from_str::<Quote>(&raw) {
            Ok(quote) if quote.validate().is_ok() => Some(quote),
            _ => {
                warn!("event=last_quote_load module=store status=corrupt");
                None
            }
        }
    }

    /// Imports a JSON array using the configured policy.
    pub fn import_bulk(&mut self, raw: &str) -> StoreResult<ImportResult> {
        self.import_bulk_with(raw, self.import_policy)
    }

    /// Imports a JSON array using an explicit policy.
    ///
    /// # Errors
    /// - `Format` for non-array payloads or elements missing both fields.
    /// - `Storage` when persistence fails; the import is rolled back.
    pub fn import_bulk_with(
        &mut self,
        raw: &str,
        policy: ImportPolicy,
    ) -> StoreResult<ImportResult> {
        let parsed = match parse_import(raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("event=quote_import module=store status=rejected reason={err}");
                return Err(err.into());
            }
        };

        let previous_len = self.quotes.len();
        let (added, duplicates) = merge_import(&mut self.quotes, parsed.quotes, policy);
        if added > 0 {
            if let Err(err) = self.save() {
                self.quotes.truncate(previous_len);
                error!("event=quote_import module=store status=error error={err}");
                return Err(err);
            }
        }

        let result = ImportResult {
            added,
            skipped: duplicates + parsed.invalid,
        };
        info!(
            "event=quote_import module=store status=ok policy={:?} added={} skipped={}",
            policy, result.added, result.skipped
        );
        Ok(result)
    }

    /// Serializes the full collection as a pretty-printed JSON array.
    pub fn export_all(&self) -> StoreResult<Vec<u8>> {
        Ok(export_json(&self.quotes)?)
    }

    /// Replaces the collection wholesale and persists it.
    ///
    /// On storage failure the previous collection is restored.
    pub fn replace_all(&mut self, quotes: QuoteCollection) -> StoreResult<()> {
        let previous = std::mem::replace(&mut self.quotes, quotes);
        if let Err(err) = self.save() {
            self.quotes = previous;
            return Err(err);
        }
        Ok(())
    }

    fn remember_shown(&self, quote: &Quote) {
        let stored = serde_json::to_string(quote)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                self.session
                    .set(LAST_QUOTE_SLOT, &raw)
                    .map_err(|err| err.to_string())
            });
        if let Err(err) = stored {
            warn!("event=last_quote_save module=store status=error error={err}");
        }
    }
}

fn load_collection(durable: &impl SlotStore) -> QuoteCollection {
    let raw = match durable.get(QUOTES_SLOT) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("event=quotes_load module=store status=defaults reason=absent");
            return default_quotes();
        }
        Err(err) => {
            warn!("event=quotes_load module=store status=defaults reason=read_failed error={err}");
            return default_quotes();
        }
    };

    match serde_json::from_str::<QuoteCollection>(&raw) {
        Ok(quotes) if quotes.iter().all(|quote| quote.validate().is_ok()) => {
            info!(
                "event=quotes_load module=store status=ok total={}",
                quotes.len()
            );
            quotes
        }
        Ok(_) => {
            warn!("event=quotes_load module=store status=defaults reason=invalid_quote");
            default_quotes()
        }
        Err(err) => {
            warn!("event=quotes_load module=store status=defaults reason=corrupt error={err}");
            default_quotes()
        }
    }
}

fn save_collection(durable: &impl SlotStore, quotes: &[Quote]) -> StoreResult<()> {
    let raw = serde_json::to_string(quotes).map_err(FormatError::Serialize)?;
    durable.set(QUOTES_SLOT, &raw)?;
    Ok(())
}
