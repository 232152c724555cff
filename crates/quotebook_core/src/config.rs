//! Runtime configuration.
//!
//! # Responsibility
//! - Load `quotebook.json` with per-field defaults.
//! - Validate ranges before any component is built from it.
//!
//! # Invariants
//! - A missing config file yields `QuotebookConfig::default()`.
//! - `sync.interval_secs` stays within 30..=60.

use crate::service::reconcile::MergePolicy;
use crate::service::transfer::ImportPolicy;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "quotebook.json";
pub const DEFAULT_DB_FILE: &str = "quotebook.sqlite3";
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
pub const MIN_SYNC_INTERVAL_SECS: u64 = 30;
pub const MAX_SYNC_INTERVAL_SECS: u64 = 60;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotebookConfig {
    /// SQLite file holding durable slots.
    pub db_path: PathBuf,
    /// `trace|debug|info|warn|error`; build-mode default when unset.
    pub log_level: Option<String>,
    /// Absolute directory for rolling logs; file logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub import_policy: ImportPolicy,
    pub merge_policy: MergePolicy,
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
}

impl Default for QuotebookConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            log_level: None,
            log_dir: None,
            import_policy: ImportPolicy::default(),
            merge_policy: MergePolicy::default(),
            sync: SyncConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between reconciliation cycles.
    pub interval_secs: u64,
    /// Run one cycle before the first tick.
    pub on_startup: bool,
    /// POST locally added quotes to the remote.
    pub post_new_quotes: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: MAX_SYNC_INTERVAL_SECS,
            on_startup: true,
            post_new_quotes: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint: String,
    /// Category given to remote records that carry none.
    pub category_label: String,
    /// Maximum records mapped per fetch.
    pub limit: usize,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            category_label: "Server".to_string(),
            limit: 10,
            timeout_secs: 10,
        }
    }
}

impl QuotebookConfig {
    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let interval = self.sync.interval_secs;
        if !(MIN_SYNC_INTERVAL_SECS..=MAX_SYNC_INTERVAL_SECS).contains(&interval) {
            return Err(ConfigError::Invalid(format!(
                "sync.interval_secs must be within {MIN_SYNC_INTERVAL_SECS}..={MAX_SYNC_INTERVAL_SECS}, got {interval}"
            )));
        }
        let endpoint = self.remote.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "remote.endpoint must be an http(s) URL, got `{endpoint}`"
            )));
        }
        if self.remote.category_label.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "remote.category_label cannot be empty".to_string(),
            ));
        }
        if self.remote.limit == 0 {
            return Err(ConfigError::Invalid(
                "remote.limit must be at least 1".to_string(),
            ));
        }
        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "remote.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Parses and validates config JSON.
pub fn parse_config(raw: &str, path: &Path) -> Result<QuotebookConfig, ConfigError> {
    let config: QuotebookConfig =
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

/// Loads config from `path`; a missing file yields defaults.
pub fn load_config(path: &Path) -> Result<QuotebookConfig, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(
                "event=config_load module=config status=defaults path={}",
                path.display()
            );
            return Ok(QuotebookConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_config(&raw, path)?;
    info!(
        "event=config_load module=config status=ok path={}",
        path.display()
    );
    Ok(config)
}
