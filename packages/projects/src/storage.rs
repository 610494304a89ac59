// ABOUTME: Project storage layer using SQLite
// ABOUTME: Owner-scoped listing, CRUD, and cascading deletion of requirements and tabs

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, info};

use testdesk_core::{
    generate_id, require_text, Project, ProjectCreateInput, ProjectUpdateInput, ValidationError,
    DEFAULT_PROJECT_COLOR, DEFAULT_PROJECT_ICON, PROJECT_ID_PREFIX,
};
use testdesk_storage::{decode_json_column, StorageError, StorageResult};

#[derive(Clone)]
pub struct ProjectStorage {
    pool: SqlitePool,
}

impl ProjectStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the projects of an owner, newest first
    pub async fn list_projects(&self, user_id: &str) -> StorageResult<Vec<Project>> {
        debug!("Fetching projects for user: {}", user_id);

        let rows = sqlx::query(
            "SELECT * FROM projects WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_project).collect()
    }

    pub async fn get_project(&self, project_id: &str) -> StorageResult<Project> {
        debug!("Fetching project: {}", project_id);

        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => row_to_project(&r),
            None => Err(StorageError::project_not_found(project_id)),
        }
    }

    /// Create a project with an empty tab index
    pub async fn create_project(
        &self,
        user_id: &str,
        input: ProjectCreateInput,
    ) -> StorageResult<Project> {
        let name = require_text("name", Some(input.name.as_str()))?;
        let icon = non_blank(input.icon).unwrap_or_else(|| DEFAULT_PROJECT_ICON.to_string());
        let color = non_blank(input.color).unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string());

        let project_id = generate_id(PROJECT_ID_PREFIX);
        let now = Utc::now();

        debug!("Creating project: {} ({})", name, project_id);

        sqlx::query(
            r#"
            INSERT INTO projects (id, user_id, name, icon, color, custom_tabs, created_at)
            VALUES (?, ?, ?, ?, ?, '[]', ?)
            "#,
        )
        .bind(&project_id)
        .bind(user_id)
        .bind(name)
        .bind(&icon)
        .bind(&color)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        info!("Created project {} for user {}", project_id, user_id);

        Ok(Project {
            id: project_id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            icon,
            color,
            custom_tabs: Vec::new(),
            created_at: now,
        })
    }

    /// Update name, icon and color; absent fields are left unchanged
    pub async fn update_project(
        &self,
        project_id: &str,
        input: ProjectUpdateInput,
    ) -> StorageResult<Project> {
        let mut project = self.get_project(project_id).await?;

        if let Some(name) = input.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::Missing("name").into());
            }
            project.name = name.to_string();
        }
        if let Some(icon) = non_blank(input.icon) {
            project.icon = icon;
        }
        if let Some(color) = non_blank(input.color) {
            project.color = color;
        }

        debug!("Updating project: {}", project_id);

        sqlx::query("UPDATE projects SET name = ?, icon = ?, color = ? WHERE id = ?")
            .bind(&project.name)
            .bind(&project.icon)
            .bind(&project.color)
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(project)
    }

    /// Delete a project together with its requirements and tabs
    pub async fn delete_project(&self, project_id: &str) -> StorageResult<()> {
        debug!("Deleting project: {}", project_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let tabs = sqlx::query("DELETE FROM testcase_tabs WHERE project_id = ?")
            .bind(project_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        let requirements = sqlx::query("DELETE FROM requirements WHERE project_id = ?")
            .bind(project_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        let project = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(project_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        if project.rows_affected() == 0 {
            tx.rollback().await.map_err(StorageError::Sqlx)?;
            return Err(StorageError::project_not_found(project_id));
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;

        info!(
            "Deleted project {} with {} requirement(s) and {} tab(s)",
            project_id,
            requirements.rows_affected(),
            tabs.rows_affected()
        );
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn row_to_project(row: &SqliteRow) -> StorageResult<Project> {
    let custom_tabs = decode_json_column(row.try_get("custom_tabs")?)?;

    Ok(Project {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        icon: row.try_get("icon")?,
        color: row.try_get("color")?,
        custom_tabs,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
