//! Category listing, filtering and uniform random selection.
//!
//! # Invariants
//! - `filter` with `CategorySelection::All` returns the input unchanged.
//! - `pick_random` never returns an element outside its input.

use crate::model::quote::{CategorySelection, Quote, QuoteCollection, ALL_CATEGORIES};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why no quote could be picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    /// The filtered collection is empty.
    Empty,
    /// The randomness source failed; no index was produced.
    RandomUnavailable(String),
}

impl Display for PickError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "no quotes available"),
            Self::RandomUnavailable(reason) => write!(f, "randomness unavailable: {reason}"),
        }
    }
}

impl Error for PickError {}

/// Source of uniformly distributed indexes.
pub trait IndexSource {
    /// Returns a value in `0..upper`; `upper` is always non-zero.
    fn next_index(&mut self, upper: usize) -> Result<usize, PickError>;
}

/// OS-backed randomness.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsIndexSource;

impl IndexSource for OsIndexSource {
    fn next_index(&mut self, upper: usize) -> Result<usize, PickError> {
        let upper = upper as u64;
        // Largest multiple of `upper` representable; values above it are rejected
        // so every residue is equally likely.
        let zone = u64::MAX - (u64::MAX % upper);
        loop {
            let mut bytes = [0u8; 8];
            if let Err(err) = getrandom::getrandom(&mut bytes) {
                log::error!("event=random_pick module=selection status=error error={err}");
                return Err(PickError::RandomUnavailable(err.to_string()));
            }
            let value = u64::from_le_bytes(bytes);
            if value < zone {
                return Ok((value % upper) as usize);
            }
        }
    }
}

/// Returns distinct categories in first-seen order.
pub fn categories(quotes: &[Quote]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for quote in quotes {
        if !seen.iter().any(|category| *category == quote.category) {
            seen.push(quote.category.clone());
        }
    }
    seen
}

/// Returns selector options: the `all` wildcard followed by every category.
pub fn category_options(quotes: &[Quote]) -> Vec<String> {
    let mut options = vec![ALL_CATEGORIES.to_string()];
    options.extend(categories(quotes));
    options
}

/// Returns quotes passing `selection`, preserving order.
pub fn filter(quotes: &[Quote], selection: &CategorySelection) -> QuoteCollection {
    quotes
        .iter()
        .filter(|quote| selection.matches(quote))
        .cloned()
        .collect()
}

/// Picks one quote uniformly using OS randomness.
pub fn pick_random(quotes: &[Quote]) -> Result<&Quote, PickError> {
    pick_random_with(quotes, &mut OsIndexSource)
}

/// Picks one quote using the provided index source.
pub fn pick_random_with<'a>(
    quotes: &'a [Quote],
    source: &mut dyn IndexSource,
) -> Result<&'a Quote, PickError> {
    if quotes.is_empty() {
        return Err(PickError::Empty);
    }
    let index = source.next_index(quotes.len())?.min(quotes.len() - 1);
    Ok(&quotes[index])
}

#[cfg(test)]
mod tests {
    use super::{
        categories, category_options, filter, pick_random, pick_random_with, IndexSource,
        PickError,
    };
    use crate::model::quote::{default_quotes, CategorySelection, Quote};

    struct FixedIndex(usize);

    impl IndexSource for FixedIndex {
        fn next_index(&mut self, _upper: usize) -> Result<usize, PickError> {
            Ok(self.0)
        }
    }

    struct BrokenIndex;

    impl IndexSource for BrokenIndex {
        fn next_index(&mut self, _upper: usize) -> Result<usize, PickError> {
            Err(PickError::RandomUnavailable("entropy source closed".to_string()))
        }
    }

    fn sample() -> Vec<Quote> {
        vec![
            Quote::new("a", "Life").unwrap(),
            Quote::new("b", "Motivation").unwrap(),
            Quote::new("c", "Life").unwrap(),
        ]
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        assert_eq!(categories(&sample()), vec!["Life", "Motivation"]);
        assert_eq!(
            category_options(&sample()),
            vec!["all", "Life", "Motivation"]
        );
    }

    #[test]
    fn filter_all_is_identity() {
        let quotes = sample();
        assert_eq!(filter(&quotes, &CategorySelection::All), quotes);
    }

    #[test]
    fn filter_exact_keeps_only_matching_category() {
        let filtered = filter(&sample(), &CategorySelection::parse("Life"));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|quote| quote.category == "Life"));

        let none = filter(&sample(), &CategorySelection::parse("life"));
        assert!(none.is_empty());
    }

    #[test]
    fn pick_random_on_empty_signals_empty() {
        assert_eq!(pick_random(&[]).unwrap_err(), PickError::Empty);
    }

    #[test]
    fn pick_random_with_surfaces_randomness_failure() {
        let err = pick_random_with(&sample(), &mut BrokenIndex).unwrap_err();
        assert_eq!(
            err,
            PickError::RandomUnavailable("entropy source closed".to_string())
        );
    }

    #[test]
    fn pick_random_returns_member_of_input() {
        let quotes = default_quotes();
        for _ in 0..64 {
            let picked = pick_random(&quotes).unwrap();
            assert!(quotes.contains(picked));
        }
    }

    #[test]
    fn pick_random_with_uses_index_source() {
        let quotes = sample();
        let picked = pick_random_with(&quotes, &mut FixedIndex(2)).unwrap();
        assert_eq!(picked.text, "c");
    }
}
