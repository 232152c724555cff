//! Persistence adapter abstractions and implementations.
//!
//! # Responsibility
//! - Define the string-keyed slot contract the store consumes.
//! - Isolate SQLite details from store/sync orchestration.
//!
//! # Invariants
//! - Slot values are opaque strings; parsing belongs to callers.
//! - Durable and session slots share one contract and differ only in lifetime.

pub mod slot_repo;
