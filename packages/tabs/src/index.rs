// ABOUTME: Project tab index persistence
// ABOUTME: Reads and writes the ordered customTabs list held on the project row

use sqlx::Row;
use tracing::debug;

use testdesk_core::TabRef;
use testdesk_storage::{decode_json_column, StorageError, StorageResult};

use crate::storage::TabStorage;

/// The index as read, together with the stored text it was decoded from
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    pub entries: Vec<TabRef>,
    raw: Option<String>,
}

impl TabStorage {
    /// Load the project's index snapshot, `None` when the project does not exist
    pub async fn load_index_snapshot_optional(
        &self,
        project_id: &str,
    ) -> StorageResult<Option<IndexSnapshot>> {
        let row = sqlx::query("SELECT custom_tabs FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: Option<String> = row.try_get("custom_tabs")?;
        let entries = decode_json_column(raw.clone())?;
        Ok(Some(IndexSnapshot { entries, raw }))
    }

    /// Load the project's index snapshot, `NotFound` when the project does not exist
    pub async fn load_index_snapshot(&self, project_id: &str) -> StorageResult<IndexSnapshot> {
        self.load_index_snapshot_optional(project_id)
            .await?
            .ok_or_else(|| StorageError::project_not_found(project_id))
    }

    /// Load the project's tab index, `None` when the project does not exist
    pub async fn load_index_optional(&self, project_id: &str) -> StorageResult<Option<Vec<TabRef>>> {
        Ok(self
            .load_index_snapshot_optional(project_id)
            .await?
            .map(|snapshot| snapshot.entries))
    }

    /// Load the project's tab index, `NotFound` when the project does not exist
    pub async fn load_index(&self, project_id: &str) -> StorageResult<Vec<TabRef>> {
        Ok(self.load_index_snapshot(project_id).await?.entries)
    }

    /// Overwrite the whole index, but only while it still holds what
    /// `snapshot` read. Returns `false` when another writer changed it first.
    pub async fn store_index_if_unchanged(
        &self,
        project_id: &str,
        snapshot: &IndexSnapshot,
        index: &[TabRef],
    ) -> StorageResult<bool> {
        debug!(
            "Writing tab index of project {} ({} tab(s))",
            project_id,
            index.len()
        );

        let result =
            sqlx::query("UPDATE projects SET custom_tabs = ? WHERE id = ? AND custom_tabs IS ?")
                .bind(serde_json::to_string(index)?)
                .bind(project_id)
                .bind(&snapshot.raw)
                .execute(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Either the project vanished or the index moved under us
        self.load_index_snapshot(project_id).await?;
        Ok(false)
    }

    /// Append one entry in a single statement, so concurrent appends never
    /// drop each other's entries
    pub async fn append_index(&self, project_id: &str, entry: &TabRef) -> StorageResult<()> {
        let result = sqlx::query(
            "UPDATE projects SET custom_tabs = json_insert(custom_tabs, '$[#]', json(?)) WHERE id = ?",
        )
        .bind(serde_json::to_string(entry)?)
        .bind(project_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::project_not_found(project_id));
        }
        Ok(())
    }
}
