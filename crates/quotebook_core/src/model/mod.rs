//! Domain model for the quote collection.
//!
//! # Responsibility
//! - Define canonical data structures used by store and sync logic.
//! - Own the identity rule used for deduplication.
//!
//! # Invariants
//! - A stored quote always has non-empty trimmed `text` and `category`.
//! - Two quotes are "the same" iff their `(text, category)` pairs match exactly.

pub mod quote;
