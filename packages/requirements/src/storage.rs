// ABOUTME: Requirement storage layer using SQLite
// ABOUTME: Project-scoped reads plus the single-item and batch writes used by reconciliation

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use testdesk_core::{generate_id, REQUIREMENT_ID_PREFIX};
use testdesk_storage::{
    decode_json_column, ensure_project, sql_placeholders, StorageError, StorageResult,
};

use crate::types::{Requirement, TestCase};

#[derive(Clone)]
pub struct RequirementStorage {
    pool: SqlitePool,
}

impl RequirementStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fail with `NotFound` unless the project exists
    pub async fn ensure_project(&self, project_id: &str) -> StorageResult<()> {
        ensure_project(&self.pool, project_id).await
    }

    /// List all requirements of a project in creation order
    pub async fn list_requirements(&self, project_id: &str) -> StorageResult<Vec<Requirement>> {
        debug!("Fetching requirements for project: {}", project_id);

        let rows = sqlx::query(
            "SELECT * FROM requirements WHERE project_id = ? ORDER BY created_at, rowid",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_requirement).collect()
    }

    /// Get a single requirement by ID
    pub async fn get_requirement(&self, requirement_id: &str) -> StorageResult<Requirement> {
        debug!("Fetching requirement: {}", requirement_id);

        let row = sqlx::query("SELECT * FROM requirements WHERE id = ?")
            .bind(requirement_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => row_to_requirement(&r),
            None => Err(StorageError::NotFound(format!(
                "requirement {}",
                requirement_id
            ))),
        }
    }

    /// Load the project's requirements among `ids`, in the order the ids were given.
    ///
    /// Unknown ids and ids of other projects are skipped.
    pub async fn find_in_project(
        &self,
        project_id: &str,
        ids: &[String],
    ) -> StorageResult<Vec<Requirement>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query_str = format!(
            "SELECT * FROM requirements WHERE project_id = ? AND id IN ({})",
            sql_placeholders(ids.len())
        );
        let mut query = sqlx::query(&query_str).bind(project_id);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;
        let mut found = rows
            .iter()
            .map(row_to_requirement)
            .collect::<StorageResult<Vec<_>>>()?;

        let mut ordered = Vec::with_capacity(found.len());
        for id in ids {
            if let Some(pos) = found.iter().position(|r| &r.id == id) {
                ordered.push(found.swap_remove(pos));
            }
        }
        Ok(ordered)
    }

    /// Insert a new requirement with a fresh identity
    pub async fn insert_requirement(
        &self,
        project_id: &str,
        text: &str,
        test_cases: &[TestCase],
    ) -> StorageResult<Requirement> {
        let requirement_id = generate_id(REQUIREMENT_ID_PREFIX);
        let now = Utc::now();

        debug!(
            "Creating requirement: {} (project: {})",
            requirement_id, project_id
        );

        sqlx::query(
            r#"
            INSERT INTO requirements (id, project_id, text, test_cases, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&requirement_id)
        .bind(project_id)
        .bind(text)
        .bind(serde_json::to_string(test_cases)?)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(Requirement {
            id: requirement_id,
            project_id: project_id.to_string(),
            text: text.to_string(),
            test_cases: test_cases.to_vec(),
            created_at: now,
        })
    }

    /// Update text and cases of `requirement_id`, inserting it when missing.
    ///
    /// Returns `false` without writing when the identity already belongs to
    /// another project.
    pub async fn upsert_requirement(
        &self,
        requirement_id: &str,
        project_id: &str,
        text: &str,
        test_cases: &[TestCase],
    ) -> StorageResult<bool> {
        debug!(
            "Upserting requirement: {} (project: {})",
            requirement_id, project_id
        );

        let result = sqlx::query(
            r#"
            INSERT INTO requirements (id, project_id, text, test_cases, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                text = excluded.text,
                test_cases = excluded.test_cases
            WHERE requirements.project_id = excluded.project_id
            "#,
        )
        .bind(requirement_id)
        .bind(project_id)
        .bind(text)
        .bind(serde_json::to_string(test_cases)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the given requirements of a project in one statement
    pub async fn delete_requirements(
        &self,
        project_id: &str,
        ids: &[String],
    ) -> StorageResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        debug!(
            "Deleting {} requirement(s) from project: {}",
            ids.len(),
            project_id
        );

        let query_str = format!(
            "DELETE FROM requirements WHERE project_id = ? AND id IN ({})",
            sql_placeholders(ids.len())
        );
        let mut query = sqlx::query(&query_str).bind(project_id);
        for id in ids {
            query = query.bind(id);
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;
        Ok(result.rows_affected())
    }
}

fn row_to_requirement(row: &SqliteRow) -> StorageResult<Requirement> {
    let test_cases = decode_json_column(row.try_get("test_cases")?)?;

    Ok(Requirement {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        text: row.try_get("text")?,
        test_cases,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
