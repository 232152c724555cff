//! Presentation seam between core logic and a concrete front end.
//!
//! Store and sync code report user-visible outcomes only through this trait,
//! so they never depend on a terminal, window or browser.

use crate::model::quote::{CategorySelection, Quote};

/// Message shown when a filter matches nothing.
pub const NO_QUOTES_MESSAGE: &str = "No quotes available for this category.";

/// Front-end adapter for user-visible output.
pub trait QuotePresenter {
    /// Displays one quote.
    fn render(&self, quote: &Quote);
    /// Displays the "no quotes" state for a filter.
    fn render_empty(&self, selection: &CategorySelection);
    /// Displays a recoverable failure.
    fn render_error(&self, message: &str);
    /// Displays a transient informational notice.
    fn notify(&self, message: &str);
}

/// Presenter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPresenter;

impl QuotePresenter for SilentPresenter {
    fn render(&self, _quote: &Quote) {}
    fn render_empty(&self, _selection: &CategorySelection) {}
    fn render_error(&self, _message: &str) {}
    fn notify(&self, _message: &str) {}
}
