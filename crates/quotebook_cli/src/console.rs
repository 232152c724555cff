//! Terminal presenter.

use quotebook_core::{CategorySelection, Quote, QuotePresenter, NO_QUOTES_MESSAGE};

/// Writes quotes and notices to stdout, failures to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePresenter;

impl QuotePresenter for ConsolePresenter {
    fn render(&self, quote: &Quote) {
        println!("{quote}");
    }

    fn render_empty(&self, selection: &CategorySelection) {
        println!("{NO_QUOTES_MESSAGE} [{selection}]");
    }

    fn render_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn notify(&self, message: &str) {
        println!("{message}");
    }
}
