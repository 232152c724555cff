//! One-shot worker threads for blocking remote calls.
//!
//! # Invariants
//! - Workers never see the `QuoteStore`; a fetch result travels back to the
//!   owner as a message and is applied there.
//! - A dropped receiver is not an error; the result is discarded.

use crate::model::quote::{Quote, QuoteCollection};
use crate::service::reconcile::ReconciliationService;
use crate::sync::source::{QuoteSource, RemoteResult};
use log::debug;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Fetches on a worker thread and delivers `wrap(result)` into `events`.
///
/// Returns once the thread is started; the fetch itself may take up to the
/// source's request timeout.
pub fn spawn_fetch_into<Q, T>(
    service: Arc<ReconciliationService<Q>>,
    events: Sender<T>,
    wrap: fn(RemoteResult<QuoteCollection>) -> T,
) -> std::io::Result<()>
where
    Q: QuoteSource + Send + Sync + 'static,
    T: Send + 'static,
{
    std::thread::Builder::new()
        .name("quotebook-fetch".to_string())
        .spawn(move || {
            let fetched = service.fetch_remote();
            if events.send(wrap(fetched)).is_err() {
                debug!("event=remote_fetch module=sync status=discarded reason=receiver_gone");
            }
        })?;
    Ok(())
}

/// Posts `quote` on a worker thread; failures are logged by the service.
pub fn spawn_push<Q>(service: Arc<ReconciliationService<Q>>, quote: Quote) -> std::io::Result<()>
where
    Q: QuoteSource + Send + Sync + 'static,
{
    std::thread::Builder::new()
        .name("quotebook-push".to_string())
        .spawn(move || service.push(&quote))?;
    Ok(())
}
