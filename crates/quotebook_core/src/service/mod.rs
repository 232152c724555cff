//! Core use-case services.
//!
//! # Responsibility
//! - Own the quote collection and its persistence contract.
//! - Provide selection, import/export and reconciliation use-cases.
//! - Keep front ends decoupled from storage and transport details.

pub mod quote_store;
pub mod reconcile;
pub mod selection;
pub mod transfer;
