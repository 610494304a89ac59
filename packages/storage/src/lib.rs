// ABOUTME: Data layer and persistence for Testdesk
// ABOUTME: Shared storage errors, batch-write warnings, and SQLite pool bootstrap

use std::fmt;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use testdesk_core::ValidationError;

pub mod lookup;
pub mod pool;

pub use lookup::{ensure_project, project_exists};
pub use pool::{init_memory_pool, init_pool, PoolConfig};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Duplicate name: {0}")]
    DuplicateName(String),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn project_not_found(project_id: &str) -> Self {
        StorageError::NotFound(format!("project {}", project_id))
    }

    pub fn tab_not_found(tab_id: &str) -> Self {
        StorageError::NotFound(format!("tab {}", tab_id))
    }
}

/// A single item of a best-effort batch write that did not commit.
///
/// Batch operations collect these instead of failing; siblings of the failed
/// item are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialWriteWarning {
    /// Identity (or description) of the item that was skipped
    pub item: String,
    pub reason: String,
}

impl PartialWriteWarning {
    pub fn new(item: impl Into<String>, reason: impl Into<String>) -> Self {
        let warning = Self {
            item: item.into(),
            reason: reason.into(),
        };
        warn!(item = %warning.item, reason = %warning.reason, "Batch write item skipped");
        warning
    }
}

impl fmt::Display for PartialWriteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item, self.reason)
    }
}

/// Comma-separated `?` placeholders for an `IN (...)` clause of `count` values
pub fn sql_placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Decode a JSON text column. `NULL` reads as the empty value; unparsable
/// text is an error so callers never write back a silently emptied value.
pub fn decode_json_column<T>(raw: Option<String>) -> StorageResult<T>
where
    T: DeserializeOwned + Default,
{
    match raw {
        Some(text) => Ok(serde_json::from_str(&text)?),
        None => Ok(T::default()),
    }
}
