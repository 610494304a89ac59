// ABOUTME: Tab creation from a snapshot of requirement test cases
// ABOUTME: Clones cases into independent rows, persists the tab, then appends it to the index

use tracing::info;

use testdesk_core::{generate_id, require_non_empty, require_text, TabRef, ROW_ID_PREFIX};
use testdesk_requirements::Requirement;
use testdesk_storage::StorageResult;

use crate::types::{CreatedTab, RowStatus, TestRow};
use crate::TabManager;

/// Flatten requirements into fresh rows, in requirement order then case order.
///
/// Rows are copies; later edits to either side never reach the other.
pub fn build_rows(requirements: &[Requirement]) -> Vec<TestRow> {
    requirements
        .iter()
        .flat_map(|requirement| {
            requirement.test_cases.iter().map(move |case| TestRow {
                id: Some(generate_id(ROW_ID_PREFIX)),
                original_req_id: Some(requirement.id.clone()),
                req_text: requirement.text.clone(),
                case_id: case.case_id.clone(),
                func: case.func.clone(),
                description: case.description.clone(),
                steps: case.steps.clone(),
                expected_result: case.expected_result.clone(),
                test_type: case.test_type.clone(),
                actual_result: String::new(),
                status: RowStatus::Untested.as_str().to_string(),
            })
        })
        .collect()
}

impl TabManager {
    /// Create a tab holding a snapshot of the selected requirements' cases.
    ///
    /// Unknown requirement ids are skipped. Name collisions are allowed here.
    pub async fn create_tab(
        &self,
        project_id: Option<&str>,
        name: Option<&str>,
        requirement_ids: Option<&[String]>,
    ) -> StorageResult<CreatedTab> {
        let project_id = require_text("projectId", project_id)?;
        let name = require_text("tabName", name)?;
        let requirement_ids = require_non_empty("selectedReqIds", requirement_ids)?;

        self.storage.ensure_project(project_id).await?;

        let sources = self
            .requirements
            .find_in_project(project_id, requirement_ids)
            .await?;
        let rows = build_rows(&sources);

        let tab = self.storage.insert_tab(project_id, name, &rows).await?;
        // A failure here leaves the tab orphaned until the next sweep.
        self.storage
            .append_index(project_id, &TabRef::new(&tab.tab_id, &tab.name))
            .await?;

        info!(
            "Created tab {} '{}' with {} row(s) from {} requirement(s) (project: {})",
            tab.tab_id,
            tab.name,
            rows.len(),
            sources.len(),
            project_id
        );

        Ok(CreatedTab {
            tab_id: tab.tab_id,
            name: tab.name,
        })
    }
}
