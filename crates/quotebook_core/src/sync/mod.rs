//! Remote quote sources and sync scheduling.
//!
//! # Responsibility
//! - Define the source contract reconciliation pulls from and pushes to.
//! - Provide the HTTP source and the cancellable periodic ticker.
//! - Run blocking fetch/push calls on worker threads.
//!
//! # Invariants
//! - Sources never touch the local collection.
//! - The ticker and workers only send messages; merging runs on the store
//!   owner's thread.

pub mod http_source;
pub mod scheduler;
pub mod source;
pub mod worker;
