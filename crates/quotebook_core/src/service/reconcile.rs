//! Local/remote reconciliation.
//!
//! # Responsibility
//! - Merge a fetched remote collection into the local one under one policy.
//! - Run one fetch → merge → persist → notify cycle on demand.
//! - Apply a fetch that ran elsewhere, so the store owner never blocks on I/O.
//!
//! # Invariants
//! - `Additive` never removes or rewrites a local entry and is idempotent.
//! - `RemoteReplacesAll` discards the local collection wholesale.
//! - Policies are never blended within one cycle.
//! - A remote failure skips the cycle without touching local state.

use crate::model::quote::{Quote, QuoteCollection};
use crate::presenter::QuotePresenter;
use crate::repo::slot_repo::SlotStore;
use crate::service::quote_store::{QuoteStore, StoreError};
use crate::sync::source::{QuoteSource, RemoteError, RemoteResult};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// How fetched remote quotes combine with local ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Append remote quotes whose identity pair is not already local.
    #[default]
    Additive,
    /// Replace the local collection with the remote one.
    RemoteReplacesAll,
}

/// Result of merging two collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub merged: QuoteCollection,
    /// Remote quotes whose identity pair was absent locally.
    pub added: usize,
}

/// Merges `remote` into `local` under `policy`.
pub fn reconcile(local: &[Quote], remote: &[Quote], policy: MergePolicy) -> Reconciliation {
    match policy {
        MergePolicy::Additive => {
            let mut merged = local.to_vec();
            let mut added = 0;
            for quote in remote {
                if !merged.iter().any(|known| known.same_identity(quote)) {
                    merged.push(quote.clone());
                    added += 1;
                }
            }
            Reconciliation { merged, added }
        }
        MergePolicy::RemoteReplacesAll => {
            let added = remote
                .iter()
                .filter(|quote| !local.iter().any(|known| known.same_identity(quote)))
                .count();
            Reconciliation {
                merged: remote.to_vec(),
                added,
            }
        }
    }
}

/// Summary of one sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub policy: MergePolicy,
    pub fetched: usize,
    pub added: usize,
    /// Whether the local collection changed and was persisted.
    pub changed: bool,
}

/// Sync cycle failure.
#[derive(Debug)]
pub enum SyncError {
    Remote(RemoteError),
    Store(StoreError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<RemoteError> for SyncError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Runs reconciliation cycles against one remote source.
pub struct ReconciliationService<Q: QuoteSource> {
    source: Q,
    policy: MergePolicy,
}

impl<Q: QuoteSource> ReconciliationService<Q> {
    pub fn new(source: Q, policy: MergePolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn source(&self) -> &Q {
        &self.source
    }

    /// Fetches the remote collection, logging failures.
    pub fn fetch_remote(&self) -> Result<QuoteCollection, RemoteError> {
        self.source.fetch().map_err(|err| {
            warn!(
                "event=remote_fetch module=sync status=error source={} error={}",
                self.source.source_id(),
                err
            );
            err
        })
    }

    /// Runs one fetch → merge → persist → notify cycle on the calling thread.
    ///
    /// # Errors
    /// See [`ReconciliationService::apply`].
    pub fn sync_once<D: SlotStore, S: SlotStore>(
        &self,
        store: &mut QuoteStore<D, S>,
        presenter: &dyn QuotePresenter,
    ) -> Result<SyncReport, SyncError> {
        self.apply(store, self.fetch_remote(), presenter)
    }

    /// Merges an already fetched result into `store`, persists and notifies.
    ///
    /// # Errors
    /// - `Remote` when the fetch failed; local state is untouched.
    /// - `Store` when persisting the merged collection fails; local state is
    ///   restored.
    pub fn apply<D: SlotStore, S: SlotStore>(
        &self,
        store: &mut QuoteStore<D, S>,
        fetched: RemoteResult<QuoteCollection>,
        presenter: &dyn QuotePresenter,
    ) -> Result<SyncReport, SyncError> {
        let started_at = Instant::now();
        let remote = match fetched {
            Ok(remote) => remote,
            Err(err) => {
                presenter.render_error(&format!("Sync skipped: {err}"));
                return Err(err.into());
            }
        };

        let outcome = reconcile(store.quotes(), &remote, self.policy);
        let changed = outcome.merged.as_slice() != store.quotes();
        if changed {
            if let Err(err) = store.replace_all(outcome.merged) {
                error!("event=sync_cycle module=sync status=error error={err}");
                presenter.render_error(&format!("Sync failed: {err}"));
                return Err(err.into());
            }
        }

        let report = SyncReport {
            policy: self.policy,
            fetched: remote.len(),
            added: outcome.added,
            changed,
        };
        presenter.notify(&sync_message(&report));
        info!(
            "event=sync_cycle module=sync status=ok policy={:?} fetched={} added={} changed={} apply_ms={}",
            report.policy,
            report.fetched,
            report.added,
            report.changed,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Posts one quote to the remote; failures are logged and swallowed.
    pub fn push(&self, quote: &Quote) {
        if let Err(err) = self.source.push(quote) {
            warn!(
                "event=remote_push module=sync status=error source={} error={}",
                self.source.source_id(),
                err
            );
        }
    }
}

fn sync_message(report: &SyncReport) -> String {
    match report.policy {
        MergePolicy::Additive if report.added > 0 => format!(
            "Quotes synced with server. {} new quote(s) added.",
            report.added
        ),
        MergePolicy::Additive => "Quotes are up to date with server.".to_string(),
        MergePolicy::RemoteReplacesAll => format!(
            "Quotes replaced with server data. {} quote(s) loaded.",
            report.fetched
        ),
    }
}
