//! Ordered schema steps for the slot database.
//!
//! # Invariants
//! - Step versions are strictly increasing, starting at 1.
//! - All pending steps commit together or not at all.
//! - `PRAGMA user_version` equals the last committed step.

use crate::repo::slot_repo::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;

/// `(version, sql)` pairs applied in order.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_slots.sql"))];

/// Returns the schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Applies every step newer than the database's recorded version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is newer than this build.
/// - `Sqlite` when a step fails; nothing from the batch is kept.
pub fn apply_migrations(conn: &mut Connection) -> RepoResult<()> {
    let current = schema_version(conn)?;
    let latest = latest_version();
    if current > latest {
        return Err(RepoError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    let pending: Vec<&(u32, &str)> = STEPS
        .iter()
        .filter(|(version, _)| *version > current)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={} to={} steps={}",
        current,
        latest,
        pending.len()
    );
    Ok(())
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> RepoResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
