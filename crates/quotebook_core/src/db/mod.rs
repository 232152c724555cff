//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open connections backing durable slots.
//! - Bring the schema up to date before any slot is touched.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Bootstrap failures are reported as `RepoError`, the same type slot
//!   reads and writes use.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
