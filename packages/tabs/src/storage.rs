// ABOUTME: Tab document storage layer using SQLite
// ABOUTME: Tab CRUD with wholesale row replacement and batched renames

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, info};

use testdesk_core::{generate_id, generate_tab_key, TabRef, TAB_DOCUMENT_ID_PREFIX};
use testdesk_storage::{
    decode_json_column, ensure_project, sql_placeholders, PartialWriteWarning, StorageError,
    StorageResult,
};

use crate::types::{Tab, TestRow};

#[derive(Clone)]
pub struct TabStorage {
    pub(crate) pool: SqlitePool,
}

impl TabStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fail with `NotFound` unless the project exists
    pub async fn ensure_project(&self, project_id: &str) -> StorageResult<()> {
        ensure_project(&self.pool, project_id).await
    }

    /// Persist a new tab with fresh storage identity and external key
    pub async fn insert_tab(
        &self,
        project_id: &str,
        name: &str,
        rows: &[TestRow],
    ) -> StorageResult<Tab> {
        let id = generate_id(TAB_DOCUMENT_ID_PREFIX);
        let tab_id = generate_tab_key();
        let now = Utc::now();

        debug!(
            "Creating tab: {} '{}' with {} row(s) (project: {})",
            tab_id,
            name,
            rows.len(),
            project_id
        );

        sqlx::query(
            r#"
            INSERT INTO testcase_tabs (id, project_id, tab_id, name, row_data, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(project_id)
        .bind(&tab_id)
        .bind(name)
        .bind(serde_json::to_string(rows)?)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(Tab {
            id,
            project_id: project_id.to_string(),
            tab_id,
            name: name.to_string(),
            rows: rows.to_vec(),
            created_at: now,
        })
    }

    pub async fn get_tab(&self, project_id: &str, tab_id: &str) -> StorageResult<Option<Tab>> {
        debug!("Fetching tab: {} (project: {})", tab_id, project_id);

        let row = sqlx::query("SELECT * FROM testcase_tabs WHERE project_id = ? AND tab_id = ?")
            .bind(project_id)
            .bind(tab_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_tab).transpose()
    }

    /// List all tab documents of a project in creation order
    pub async fn list_tabs(&self, project_id: &str) -> StorageResult<Vec<Tab>> {
        let rows = sqlx::query(
            "SELECT * FROM testcase_tabs WHERE project_id = ? ORDER BY created_at, rowid",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_tab).collect()
    }

    /// Replace the full row array of a tab. Returns `false` when the tab does not exist.
    pub async fn replace_rows(
        &self,
        project_id: &str,
        tab_id: &str,
        rows: &[TestRow],
    ) -> StorageResult<bool> {
        debug!(
            "Saving {} row(s) to tab: {} (project: {})",
            rows.len(),
            tab_id,
            project_id
        );

        let result =
            sqlx::query("UPDATE testcase_tabs SET row_data = ? WHERE project_id = ? AND tab_id = ?")
                .bind(serde_json::to_string(rows)?)
                .bind(project_id)
                .bind(tab_id)
                .execute(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    /// Apply a batch of renames (`TabRef` = tab key and new name) in one transaction.
    ///
    /// A rename whose tab document is missing or whose statement fails is
    /// reported as a warning; the rest of the batch still commits.
    pub async fn set_names(
        &self,
        project_id: &str,
        renames: &[TabRef],
    ) -> StorageResult<Vec<PartialWriteWarning>> {
        let mut warnings = Vec::new();
        if renames.is_empty() {
            return Ok(warnings);
        }

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        for rename in renames {
            let result =
                sqlx::query("UPDATE testcase_tabs SET name = ? WHERE project_id = ? AND tab_id = ?")
                    .bind(&rename.name)
                    .bind(project_id)
                    .bind(&rename.id)
                    .execute(&mut *tx)
                    .await;

            match result {
                Ok(done) if done.rows_affected() > 0 => {
                    info!("Renamed tab {} to '{}'", rename.id, rename.name);
                }
                Ok(_) => warnings.push(PartialWriteWarning::new(
                    rename.id.clone(),
                    "tab document missing",
                )),
                Err(e) => warnings.push(PartialWriteWarning::new(rename.id.clone(), e.to_string())),
            }
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(warnings)
    }

    /// Delete one tab document. Returns `false` when nothing was deleted.
    pub async fn delete_tab(&self, project_id: &str, tab_id: &str) -> StorageResult<bool> {
        debug!("Deleting tab: {} (project: {})", tab_id, project_id);

        let result = sqlx::query("DELETE FROM testcase_tabs WHERE project_id = ? AND tab_id = ?")
            .bind(project_id)
            .bind(tab_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every tab document of a project whose key is not in `keep`
    pub async fn delete_tabs_except(&self, project_id: &str, keep: &[String]) -> StorageResult<u64> {
        let query_str = if keep.is_empty() {
            "DELETE FROM testcase_tabs WHERE project_id = ?".to_string()
        } else {
            format!(
                "DELETE FROM testcase_tabs WHERE project_id = ? AND tab_id NOT IN ({})",
                sql_placeholders(keep.len())
            )
        };

        let mut query = sqlx::query(&query_str).bind(project_id);
        for tab_id in keep {
            query = query.bind(tab_id);
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;
        Ok(result.rows_affected())
    }
}

fn row_to_tab(row: &SqliteRow) -> StorageResult<Tab> {
    let rows = decode_json_column(row.try_get("row_data")?)?;

    Ok(Tab {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        tab_id: row.try_get("tab_id")?,
        name: row.try_get::<Option<String>, _>("name")?.unwrap_or_default(),
        rows,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
