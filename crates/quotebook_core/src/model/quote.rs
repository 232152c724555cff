//! Quote domain model.
//!
//! # Responsibility
//! - Define the `Quote` record shared by storage, import/export and sync.
//! - Provide validation and the identity pair used for deduplication.
//! - Provide the built-in default collection.
//!
//! # Invariants
//! - `validate()` rejects quotes whose trimmed `text` or `category` is empty.
//! - `all` is reserved for the wildcard filter and is never a stored category.
//! - Identity comparison is case-sensitive and exact.
//! - `id` is opaque and never participates in identity.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Synthetic wildcard category matching every quote.
pub const ALL_CATEGORIES: &str = "all";

/// Ordered quote sequence; insertion order is significant.
pub type QuoteCollection = Vec<Quote>;

/// One quote, the atomic unit of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub category: String,
    /// Opaque identifier carried by remotely sourced quotes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Validation failure for user-supplied quote fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteValidationError {
    EmptyText,
    EmptyCategory,
    ReservedCategory,
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "quote text cannot be empty"),
            Self::EmptyCategory => write!(f, "quote category cannot be empty"),
            Self::ReservedCategory => write!(
                f,
                "quote category `{ALL_CATEGORIES}` is reserved for the all-quotes filter"
            ),
        }
    }
}

impl Error for QuoteValidationError {}

impl Quote {
    /// Creates a local quote with trimmed fields.
    ///
    /// # Errors
    /// - `EmptyText` / `EmptyCategory` when a field is blank after trimming.
    /// - `ReservedCategory` when the category is the `all` wildcard.
    pub fn new(
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> Result<Self, QuoteValidationError> {
        let quote = Self {
            text: text.as_ref().trim().to_string(),
            category: category.as_ref().trim().to_string(),
            id: None,
        };
        quote.validate()?;
        Ok(quote)
    }

    /// Creates a remotely sourced quote carrying an opaque id.
    pub fn with_id(
        id: impl Into<String>,
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> Result<Self, QuoteValidationError> {
        let mut quote = Self::new(text, category)?;
        quote.id = Some(id.into());
        Ok(quote)
    }

    /// Checks the non-empty field invariant.
    pub fn validate(&self) -> Result<(), QuoteValidationError> {
        if self.text.trim().is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(QuoteValidationError::EmptyCategory);
        }
        if category == ALL_CATEGORIES {
            return Err(QuoteValidationError::ReservedCategory);
        }
        Ok(())
    }

    /// Returns the `(text, category)` pair used for deduplication.
    pub fn identity(&self) -> (&str, &str) {
        (self.text.as_str(), self.category.as_str())
    }

    /// Returns whether both quotes share the same identity pair.
    pub fn same_identity(&self, other: &Quote) -> bool {
        self.identity() == other.identity()
    }
}

impl Display for Quote {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" - ({})", self.text, self.category)
    }
}

/// Returns the fixed collection used when nothing usable is persisted.
pub fn default_quotes() -> QuoteCollection {
    [
        (
            "The only limit to our realization of tomorrow is our doubts of today.",
            "Motivation",
        ),
        (
            "In the middle of every difficulty lies opportunity.",
            "Inspiration",
        ),
        (
            "Life is what happens when you're busy making other plans.",
            "Life",
        ),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        text: text.to_string(),
        category: category.to_string(),
        id: None,
    })
    .collect()
}

/// Category filter driving the "show a quote" view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelection {
    /// Wildcard; every quote matches.
    #[default]
    All,
    /// Exact, case-sensitive category value.
    Exact(String),
}

impl CategorySelection {
    /// Parses a persisted or user-supplied selection.
    ///
    /// Blank input and the literal `all` map to `All`.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Exact(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Exact(value) => value.as_str(),
        }
    }

    /// Returns whether `quote` passes this filter.
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Exact(value) => quote.category == *value,
        }
    }
}

impl Display for CategorySelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{default_quotes, CategorySelection, Quote, QuoteValidationError};

    #[test]
    fn new_trims_fields() {
        let quote = Quote::new("  Carpe diem ", " Motivation\t").unwrap();
        assert_eq!(quote.text, "Carpe diem");
        assert_eq!(quote.category, "Motivation");
        assert!(quote.id.is_none());
    }

    #[test]
    fn new_rejects_blank_fields() {
        assert_eq!(
            Quote::new("   ", "Life").unwrap_err(),
            QuoteValidationError::EmptyText
        );
        assert_eq!(
            Quote::new("Carpe diem", "\n").unwrap_err(),
            QuoteValidationError::EmptyCategory
        );
    }

    #[test]
    fn new_rejects_wildcard_category() {
        assert_eq!(
            Quote::new("Carpe diem", " all ").unwrap_err(),
            QuoteValidationError::ReservedCategory
        );
        Quote::new("Carpe diem", "All").expect("wildcard match is case-sensitive");
    }

    #[test]
    fn identity_ignores_id_and_is_case_sensitive() {
        let local = Quote::new("Carpe diem", "Motivation").unwrap();
        let remote = Quote::with_id("7", "Carpe diem", "Motivation").unwrap();
        let shouting = Quote::new("Carpe diem", "MOTIVATION").unwrap();

        assert!(local.same_identity(&remote));
        assert!(!local.same_identity(&shouting));
    }

    #[test]
    fn json_omits_absent_id() {
        let quote = Quote::new("Carpe diem", "Motivation").unwrap();
        let json = serde_json::to_string(&quote).unwrap();
        assert_eq!(json, r#"{"text":"Carpe diem","category":"Motivation"}"#);
    }

    #[test]
    fn defaults_are_valid_and_distinct() {
        let quotes = default_quotes();
        assert_eq!(quotes.len(), 3);
        for quote in &quotes {
            quote.validate().unwrap();
        }
        assert!(!quotes[0].same_identity(&quotes[1]));
    }

    #[test]
    fn selection_parses_wildcard_and_exact_values() {
        assert_eq!(CategorySelection::parse("all"), CategorySelection::All);
        assert_eq!(CategorySelection::parse("  "), CategorySelection::All);
        assert_eq!(
            CategorySelection::parse(" Life "),
            CategorySelection::Exact("Life".to_string())
        );

        let life = Quote::new("x", "Life").unwrap();
        assert!(CategorySelection::parse("Life").matches(&life));
        assert!(!CategorySelection::parse("life").matches(&life));
        assert!(CategorySelection::All.matches(&life));
    }
}
