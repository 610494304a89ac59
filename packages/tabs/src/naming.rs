// ABOUTME: Default tab naming invariant
// ABOUTME: Plans and applies the renumbering of default-named tabs after renames, deletes and reorders

use std::collections::HashSet;

use tracing::{debug, info, warn};

use testdesk_core::{require_text, TabRef, ValidationError, DEFAULT_TAB_BASE_NAME};
use testdesk_storage::{StorageError, StorageResult};

use crate::TabManager;

/// The auto-generated tab name pattern: `<base>` or `<base> <digits>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabNaming {
    base: String,
}

impl Default for TabNaming {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_BASE_NAME)
    }
}

impl TabNaming {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Whether `name` follows the default pattern
    pub fn matches(&self, name: &str) -> bool {
        match name.strip_prefix(self.base.as_str()) {
            Some("") => true,
            Some(rest) => rest
                .strip_prefix(' ')
                .is_some_and(|digits| {
                    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
                }),
            None => false,
        }
    }

    /// Name the `position`-th default-named tab should carry
    pub fn expected_name(&self, position: usize) -> String {
        if position == 0 {
            self.base.clone()
        } else {
            format!("{} {}", self.base, position)
        }
    }

    /// Renumber the default-named entries of `index` in order.
    ///
    /// Entries whose names do not match the pattern keep their names and do
    /// not consume a number.
    pub fn plan_repair(&self, mut index: Vec<TabRef>) -> RepairPlan {
        let mut renames = Vec::new();
        let mut counter = 0;

        for entry in index.iter_mut() {
            if !self.matches(&entry.name) {
                continue;
            }

            let expected = self.expected_name(counter);
            if entry.name != expected {
                debug!("Renumbering tab {}: '{}' -> '{}'", entry.id, entry.name, expected);
                entry.name = expected;
                renames.push(entry.clone());
            }
            counter += 1;
        }

        RepairPlan { index, renames }
    }
}

/// Outcome of planning a repair pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairPlan {
    /// Corrected index, in the original order
    pub index: Vec<TabRef>,
    /// Entries whose names changed, with their new names
    pub renames: Vec<TabRef>,
}

impl RepairPlan {
    pub fn is_noop(&self) -> bool {
        self.renames.is_empty()
    }
}

/// Attempts at rewriting the index before giving up on a contended project
const INDEX_WRITE_ATTEMPTS: usize = 8;

impl TabManager {
    pub fn naming(&self) -> &TabNaming {
        &self.naming
    }

    /// Apply `edit` to the current index and write the resulting plan back.
    ///
    /// The write only lands if no other writer touched the index since it was
    /// read; otherwise the edit is replayed against the fresh index. Tab
    /// documents are renamed after the index write succeeded.
    async fn update_index<F>(&self, project_id: &str, mut edit: F) -> StorageResult<Vec<TabRef>>
    where
        F: FnMut(Vec<TabRef>) -> StorageResult<RepairPlan>,
    {
        for attempt in 1..=INDEX_WRITE_ATTEMPTS {
            let snapshot = self.storage.load_index_snapshot(project_id).await?;
            let plan = edit(snapshot.entries.clone())?;

            if plan.is_noop() && plan.index == snapshot.entries {
                return Ok(plan.index);
            }

            if self
                .storage
                .store_index_if_unchanged(project_id, &snapshot, &plan.index)
                .await?
            {
                self.storage.set_names(project_id, &plan.renames).await?;
                return Ok(plan.index);
            }

            warn!(
                "Tab index of project {} changed concurrently (attempt {}/{})",
                project_id, attempt, INDEX_WRITE_ATTEMPTS
            );
        }

        Err(StorageError::Database(format!(
            "tab index of project {} kept changing during update",
            project_id
        )))
    }

    /// Re-establish the default naming sequence of a project.
    ///
    /// Writes nothing when the sequence already holds.
    pub async fn repair_naming(&self, project_id: Option<&str>) -> StorageResult<Vec<TabRef>> {
        let project_id = require_text("projectId", project_id)?;

        let mut renamed = 0;
        let index = self
            .update_index(project_id, |index| {
                let plan = self.naming.plan_repair(index);
                renamed = plan.renames.len();
                Ok(plan)
            })
            .await?;

        if renamed == 0 {
            debug!("Tab naming of project {} already consistent", project_id);
        } else {
            info!("Repaired naming of {} tab(s) in project {}", renamed, project_id);
        }
        Ok(index)
    }

    /// Rename one tab, then renumber the default-named tabs.
    ///
    /// Names are compared case-insensitively against the other tabs of the
    /// index before anything is written.
    pub async fn rename_tab(
        &self,
        project_id: Option<&str>,
        tab_id: Option<&str>,
        new_name: Option<&str>,
    ) -> StorageResult<Vec<TabRef>> {
        let project_id = require_text("projectId", project_id)?;
        let tab_id = require_text("tabId", tab_id)?;
        let new_name = require_text("newName", new_name)?;
        let lowered = new_name.to_lowercase();

        let index = self
            .update_index(project_id, |mut index| {
                if index
                    .iter()
                    .any(|t| t.id != tab_id && t.name.to_lowercase() == lowered)
                {
                    return Err(StorageError::DuplicateName(new_name.to_string()));
                }

                let entry = index
                    .iter_mut()
                    .find(|t| t.id == tab_id)
                    .ok_or_else(|| StorageError::tab_not_found(tab_id))?;
                entry.name = new_name.to_string();

                // The renamed tab goes first; a renumbering of it later in the batch wins
                let mut plan = self.naming.plan_repair(index);
                plan.renames.insert(0, TabRef::new(tab_id, new_name));
                Ok(plan)
            })
            .await?;

        info!("Renamed tab {} to '{}' (project: {})", tab_id, new_name, project_id);
        Ok(index)
    }

    /// Delete a tab document and its index entry, then renumber.
    pub async fn delete_tab(
        &self,
        project_id: Option<&str>,
        tab_id: Option<&str>,
    ) -> StorageResult<Vec<TabRef>> {
        let project_id = require_text("projectId", project_id)?;
        let tab_id = require_text("tabId", tab_id)?;

        // Fails on a missing project or an unreadable index before anything is deleted
        self.storage.load_index_snapshot(project_id).await?;
        let removed_document = self.storage.delete_tab(project_id, tab_id).await?;

        let index = self
            .update_index(project_id, |mut index| {
                let before = index.len();
                index.retain(|t| t.id != tab_id);
                if !removed_document && index.len() == before {
                    return Err(StorageError::tab_not_found(tab_id));
                }
                Ok(self.naming.plan_repair(index))
            })
            .await?;

        info!("Deleted tab {} (project: {})", tab_id, project_id);
        Ok(index)
    }

    /// Rewrite the index in the given order, then renumber along it.
    ///
    /// `tab_ids` must name every indexed tab exactly once.
    pub async fn reorder_tabs(
        &self,
        project_id: Option<&str>,
        tab_ids: &[String],
    ) -> StorageResult<Vec<TabRef>> {
        let project_id = require_text("projectId", project_id)?;
        let requested: HashSet<&str> = tab_ids.iter().map(String::as_str).collect();

        let index = self
            .update_index(project_id, |index| {
                let is_permutation = tab_ids.len() == index.len()
                    && requested.len() == tab_ids.len()
                    && index.iter().all(|t| requested.contains(t.id.as_str()));
                if !is_permutation {
                    return Err(ValidationError::Invalid {
                        field: "tabIds",
                        reason: "must list every tab of the project exactly once".to_string(),
                    }
                    .into());
                }

                let mut remaining = index;
                let mut reordered = Vec::with_capacity(remaining.len());
                for tab_id in tab_ids {
                    if let Some(pos) = remaining.iter().position(|t| &t.id == tab_id) {
                        reordered.push(remaining.swap_remove(pos));
                    }
                }
                Ok(self.naming.plan_repair(reordered))
            })
            .await?;

        debug!("Reordered {} tab(s) of project {}", index.len(), project_id);
        Ok(index)
    }
}
