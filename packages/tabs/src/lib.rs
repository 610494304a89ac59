// ABOUTME: Test case tab management for Testdesk
// ABOUTME: Snapshot creation, row editing, default naming repair, and status summaries

pub mod index;
pub mod naming;
pub mod snapshot;
pub mod storage;
pub mod summary;
pub mod types;

use sqlx::SqlitePool;
use tracing::{debug, info};

use testdesk_core::{generate_id, require_text, ValidationError, ROW_ID_PREFIX};
use testdesk_requirements::RequirementStorage;
use testdesk_storage::{StorageError, StorageResult};

// Re-export main types
pub use index::IndexSnapshot;
pub use naming::{RepairPlan, TabNaming};
pub use snapshot::build_rows;
pub use storage::TabStorage;
pub use summary::{summarize_tabs, tab_detail};
pub use types::{
    CreatedTab, ProjectSummary, RowStatus, RowsSaveInput, StatusCounts, Tab, TabCreateInput,
    TabDetail, TabKeyInput, TabRenameInput, TestRow,
};

/// Entry point for every tab operation of a project
#[derive(Clone)]
pub struct TabManager {
    storage: TabStorage,
    requirements: RequirementStorage,
    naming: TabNaming,
}

impl TabManager {
    pub fn new(pool: SqlitePool, naming: TabNaming) -> Self {
        Self {
            storage: TabStorage::new(pool.clone()),
            requirements: RequirementStorage::new(pool),
            naming,
        }
    }

    pub fn storage(&self) -> &TabStorage {
        &self.storage
    }

    /// Rows of a tab, empty when the tab does not exist
    pub async fn get_rows(
        &self,
        project_id: Option<&str>,
        tab_id: Option<&str>,
    ) -> StorageResult<Vec<TestRow>> {
        let project_id = require_text("projectId", project_id)?;
        let tab_id = require_text("tabId", tab_id)?;

        Ok(self
            .storage
            .get_tab(project_id, tab_id)
            .await?
            .map(|tab| tab.rows)
            .unwrap_or_default())
    }

    /// Replace the full row array of an existing tab.
    ///
    /// Rows without identity get one; statuses are canonicalized and a status
    /// outside the known set rejects the whole save.
    pub async fn save_rows(
        &self,
        project_id: Option<&str>,
        tab_id: Option<&str>,
        rows: Option<Vec<TestRow>>,
    ) -> StorageResult<Vec<TestRow>> {
        let project_id = require_text("projectId", project_id)?;
        let tab_id = require_text("tabId", tab_id)?;
        let rows = rows.ok_or(ValidationError::Missing("rows"))?;

        let rows = canonicalize_rows(rows)?;

        if !self.storage.replace_rows(project_id, tab_id, &rows).await? {
            return Err(StorageError::tab_not_found(tab_id));
        }

        debug!("Saved {} row(s) to tab {}", rows.len(), tab_id);
        Ok(rows)
    }

    /// Delete tab documents of a project that its index no longer lists
    pub async fn sweep_orphan_tabs(&self, project_id: Option<&str>) -> StorageResult<u64> {
        let project_id = require_text("projectId", project_id)?;
        let index = self.storage.load_index(project_id).await?;

        let keep: Vec<String> = index.into_iter().map(|t| t.id).collect();
        let removed = self.storage.delete_tabs_except(project_id, &keep).await?;

        if removed > 0 {
            info!("Swept {} orphan tab(s) of project {}", removed, project_id);
        }
        Ok(removed)
    }
}

fn canonicalize_rows(rows: Vec<TestRow>) -> StorageResult<Vec<TestRow>> {
    rows.into_iter()
        .enumerate()
        .map(|(position, mut row)| -> StorageResult<TestRow> {
            let status = if row.status.trim().is_empty() {
                RowStatus::Untested
            } else {
                row.status
                    .parse::<RowStatus>()
                    .map_err(|_| ValidationError::Invalid {
                        field: "status",
                        reason: format!(
                            "row {} ({}) has unknown status '{}'",
                            position,
                            row.id.as_deref().unwrap_or("new"),
                            row.status
                        ),
                    })?
            };
            row.status = status.as_str().to_string();

            if row.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
                row.id = Some(generate_id(ROW_ID_PREFIX));
            }
            Ok(row)
        })
        .collect()
}
