// ABOUTME: Cross-collection existence checks
// ABOUTME: Lets domain packages verify the owning project before writing dependents

use sqlx::SqlitePool;

use crate::{StorageError, StorageResult};

/// Whether a project with this identity exists
pub async fn project_exists(pool: &SqlitePool, project_id: &str) -> StorageResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM projects WHERE id = ?")
        .bind(project_id)
        .fetch_optional(pool)
        .await
        .map_err(StorageError::Sqlx)?;

    Ok(found.is_some())
}

/// Fail with `NotFound` unless the project exists
pub async fn ensure_project(pool: &SqlitePool, project_id: &str) -> StorageResult<()> {
    if project_exists(pool, project_id).await? {
        Ok(())
    } else {
        Err(StorageError::project_not_found(project_id))
    }
}
