//! JSON import/export of quote collections.
//!
//! # Responsibility
//! - Parse user-supplied import payloads into validated quotes.
//! - Serialize collections as pretty-printed JSON arrays.
//!
//! # Invariants
//! - A payload that is not a JSON array is rejected as a whole.
//! - An element carrying neither `text` nor `category` rejects the whole payload.
//! - Elements with only one usable field are skipped, never partially stored.

use crate::model::quote::Quote;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Duplicate handling for bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Skip elements whose identity pair is already present.
    #[default]
    SkipDuplicates,
    /// Append every valid element unconditionally.
    AppendAll,
}

/// Outcome of one bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportResult {
    /// Quotes appended to the collection.
    pub added: usize,
    /// Elements ignored as duplicates or for a blank field.
    pub skipped: usize,
}

/// Malformed import or persisted payload.
#[derive(Debug)]
pub enum FormatError {
    NotJson(serde_json::Error),
    NotAnArray,
    MissingFields { index: usize },
    Serialize(serde_json::Error),
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotJson(err) => write!(f, "payload is not valid JSON: {err}"),
            Self::NotAnArray => write!(f, "payload must be a JSON array of quotes"),
            Self::MissingFields { index } => write!(
                f,
                "element {index} has neither `text` nor `category`"
            ),
            Self::Serialize(err) => write!(f, "failed to serialize quotes: {err}"),
        }
    }
}

impl Error for FormatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotJson(err) | Self::Serialize(err) => Some(err),
            Self::NotAnArray | Self::MissingFields { .. } => None,
        }
    }
}

/// Validated import payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedImport {
    pub quotes: Vec<Quote>,
    /// Elements dropped for a blank or missing single field.
    pub invalid: usize,
}

/// Parses an import payload.
///
/// # Errors
/// - `NotJson` when `raw` is not JSON.
/// - `NotAnArray` when the top-level value is not an array.
/// - `MissingFields` when an element has neither `text` nor `category`.
pub fn parse_import(raw: &str) -> Result<ParsedImport, FormatError> {
    let value: Value = serde_json::from_str(raw).map_err(FormatError::NotJson)?;
    let Value::Array(items) = value else {
        return Err(FormatError::NotAnArray);
    };

    let mut parsed = ParsedImport::default();
    for (index, item) in items.iter().enumerate() {
        let text = string_field(item, "text");
        let category = string_field(item, "category");
        let (text, category) = match (text, category) {
            (None, None) => return Err(FormatError::MissingFields { index }),
            (Some(text), Some(category)) => (text, category),
            _ => {
                parsed.invalid += 1;
                continue;
            }
        };

        match Quote::new(text, category) {
            Ok(mut quote) => {
                quote.id = opaque_id(item);
                parsed.quotes.push(quote);
            }
            Err(_) => parsed.invalid += 1,
        }
    }

    Ok(parsed)
}

/// Appends `incoming` to `existing` according to `policy`.
///
/// Returns how many quotes were appended and how many were skipped.
pub fn merge_import(
    existing: &mut Vec<Quote>,
    incoming: Vec<Quote>,
    policy: ImportPolicy,
) -> (usize, usize) {
    let mut added = 0;
    let mut skipped = 0;
    for quote in incoming {
        let duplicate = policy == ImportPolicy::SkipDuplicates
            && existing.iter().any(|known| known.same_identity(&quote));
        if duplicate {
            skipped += 1;
            continue;
        }
        existing.push(quote);
        added += 1;
    }
    (added, skipped)
}

/// Serializes quotes as a pretty-printed JSON array.
pub fn export_json(quotes: &[Quote]) -> Result<Vec<u8>, FormatError> {
    serde_json::to_vec_pretty(quotes).map_err(FormatError::Serialize)
}

fn string_field<'a>(item: &'a Value, field: &str) -> Option<&'a str> {
    item.get(field).and_then(Value::as_str)
}

pub(crate) fn opaque_id(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(value) if !value.trim().is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{export_json, merge_import, parse_import, FormatError, ImportPolicy};
    use crate::model::quote::Quote;

    #[test]
    fn rejects_non_json_and_non_array_payloads() {
        assert!(matches!(
            parse_import("not json"),
            Err(FormatError::NotJson(_))
        ));
        assert!(matches!(
            parse_import(r#"{"text":"a","category":"b"}"#),
            Err(FormatError::NotAnArray)
        ));
    }

    #[test]
    fn rejects_element_missing_both_fields() {
        let err = parse_import(r#"[{"text":"a","category":"b"},{"author":"x"}]"#)
            .expect_err("element without fields should fail");
        assert!(matches!(err, FormatError::MissingFields { index: 1 }));
    }

    #[test]
    fn skips_elements_with_one_or_blank_field() {
        let parsed = parse_import(
            r#"[
                {"text":"kept","category":"Life"},
                {"text":"no category"},
                {"text":"  ","category":"Life"},
                {"text":"remote","category":"Server","id":3}
            ]"#,
        )
        .unwrap();
        assert_eq!(parsed.quotes.len(), 2);
        assert_eq!(parsed.invalid, 2);
        assert_eq!(parsed.quotes[1].id.as_deref(), Some("3"));
    }

    #[test]
    fn merge_policies_differ_on_duplicates() {
        let base = vec![Quote::new("a", "Life").unwrap()];
        let incoming = vec![
            Quote::new("a", "Life").unwrap(),
            Quote::new("b", "Life").unwrap(),
            Quote::new("b", "Life").unwrap(),
        ];

        let mut skipping = base.clone();
        let (added, skipped) =
            merge_import(&mut skipping, incoming.clone(), ImportPolicy::SkipDuplicates);
        assert_eq!((added, skipped), (1, 2));
        assert_eq!(skipping.len(), 2);

        let mut appending = base;
        let (added, skipped) = merge_import(&mut appending, incoming, ImportPolicy::AppendAll);
        assert_eq!((added, skipped), (3, 0));
        assert_eq!(appending.len(), 4);
    }

    #[test]
    fn export_is_pretty_printed_array() {
        let bytes = export_json(&[Quote::new("a", "Life").unwrap()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("[\n"));
        assert!(text.contains("\"category\": \"Life\""));
    }
}
