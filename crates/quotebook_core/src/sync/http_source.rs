//! HTTP-backed quote source.
//!
//! # Responsibility
//! - GET the configured endpoint and map arbitrary records into quotes.
//! - POST single quotes as JSON.
//!
//! # Invariants
//! - Record text is whitespace-collapsed and trimmed before validation.
//! - Records without usable text are dropped, not reported as errors.
//! - At most `limit` records are mapped per fetch.

use crate::config::RemoteConfig;
use crate::model::quote::{Quote, QuoteCollection};
use crate::service::transfer::opaque_id;
use crate::sync::source::{QuoteSource, RemoteError, RemoteResult};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::time::{Duration, Instant};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const TEXT_FIELDS: &[&str] = &["title", "text", "body"];

/// Quote source talking to a JSON REST endpoint.
pub struct HttpQuoteSource {
    endpoint: String,
    category_label: String,
    limit: usize,
    client: reqwest::blocking::Client,
}

impl HttpQuoteSource {
    /// Builds a blocking HTTP client for `config`.
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("quotebook/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| RemoteError::Transport {
                endpoint: config.endpoint.clone(),
                reason: format!("failed to build http client: {err}"),
            })?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            category_label: config.category_label.clone(),
            limit: config.limit,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> RemoteError {
        match err.status() {
            Some(status) => RemoteError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            },
            None => RemoteError::Transport {
                endpoint: self.endpoint.clone(),
                reason: err.to_string(),
            },
        }
    }
}

impl QuoteSource for HttpQuoteSource {
    fn source_id(&self) -> &str {
        "http"
    }

    fn fetch(&self) -> RemoteResult<QuoteCollection> {
        let started_at = Instant::now();
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|err| self.transport_error(err))?;

        let body: Value = response.json().map_err(|err| RemoteError::Payload {
            endpoint: self.endpoint.clone(),
            reason: err.to_string(),
        })?;

        let quotes = map_remote_records(&body, &self.category_label, self.limit).map_err(
            |reason| RemoteError::Payload {
                endpoint: self.endpoint.clone(),
                reason,
            },
        )?;

        info!(
            "event=remote_fetch module=sync status=ok source=http mapped={} duration_ms={}",
            quotes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(quotes)
    }

    fn push(&self, quote: &Quote) -> RemoteResult<()> {
        self.client
            .post(&self.endpoint)
            .json(quote)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|err| self.transport_error(err))?;
        debug!("event=remote_push module=sync status=ok source=http");
        Ok(())
    }
}

/// Maps a remote JSON body into quotes.
///
/// Text comes from the first non-blank of `title`, `text`, `body`. Category is
/// the record's own non-blank `category`, else `category_label`.
///
/// # Errors
/// - Returns a reason string when `body` is not an array.
pub fn map_remote_records(
    body: &Value,
    category_label: &str,
    limit: usize,
) -> Result<QuoteCollection, String> {
    let Value::Array(records) = body else {
        return Err("expected a JSON array of records".to_string());
    };

    let mut dropped = 0usize;
    let quotes: QuoteCollection = records
        .iter()
        .take(limit)
        .filter_map(|record| {
            let mapped = map_record(record, category_label);
            if mapped.is_none() {
                dropped += 1;
            }
            mapped
        })
        .collect();

    if dropped > 0 {
        warn!("event=remote_map module=sync status=partial dropped={dropped}");
    }
    Ok(quotes)
}

fn map_record(record: &Value, category_label: &str) -> Option<Quote> {
    let text = TEXT_FIELDS
        .iter()
        .filter_map(|field| record.get(*field).and_then(Value::as_str))
        .map(collapse_whitespace)
        .find(|text| !text.is_empty())?;

    let category = record
        .get("category")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(category_label);

    let mut quote = Quote::new(text, category).ok()?;
    quote.id = opaque_id(record);
    Some(quote)
}

fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}
