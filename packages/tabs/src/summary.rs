// ABOUTME: Cross-tab status aggregation
// ABOUTME: Folds row statuses of every tab of a project into per-tab and project totals

use std::collections::HashMap;

use tracing::debug;

use testdesk_core::{require_text, TabRef, UNNAMED_TAB};
use testdesk_storage::StorageResult;

use crate::types::{ProjectSummary, RowStatus, StatusCounts, Tab, TabDetail};
use crate::TabManager;

/// Count the rows of one tab by status
pub fn tab_detail(tab: &Tab) -> TabDetail {
    let mut counts = StatusCounts::default();
    for row in &tab.rows {
        counts.add(RowStatus::coerce(&row.status));
    }

    let tab_name = if tab.name.trim().is_empty() {
        UNNAMED_TAB.to_string()
    } else {
        tab.name.clone()
    };

    TabDetail {
        tab_id: tab.tab_id.clone(),
        tab_name,
        total: tab.rows.len() as u64,
        counts,
    }
}

/// Aggregate `tabs`, listing indexed tabs in index order and the rest after
/// them in their given order
pub fn summarize_tabs(index: &[TabRef], mut tabs: Vec<Tab>) -> ProjectSummary {
    let position: HashMap<&str, usize> = index
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();
    tabs.sort_by_key(|tab| position.get(tab.tab_id.as_str()).copied().unwrap_or(usize::MAX));

    let mut summary = ProjectSummary::default();
    for tab in &tabs {
        let detail = tab_detail(tab);
        summary.total_cases += detail.total;
        summary.status_counts.merge(&detail.counts);
        summary.tabs_details.push(detail);
    }
    summary
}

impl TabManager {
    /// Status summary over all tabs of a project.
    ///
    /// An unknown project has no tabs and yields an all-zero summary.
    pub async fn summarize(&self, project_id: Option<&str>) -> StorageResult<ProjectSummary> {
        let project_id = require_text("projectId", project_id)?;

        let index = self
            .storage
            .load_index_optional(project_id)
            .await?
            .unwrap_or_default();
        let tabs = self.storage.list_tabs(project_id).await?;

        debug!("Summarizing {} tab(s) of project {}", tabs.len(), project_id);
        Ok(summarize_tabs(&index, tabs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TestRow;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn row(status: &str) -> TestRow {
        serde_json::from_value(serde_json::json!({ "status": status })).unwrap()
    }

    fn tab(tab_id: &str, name: &str, statuses: &[&str]) -> Tab {
        Tab {
            id: format!("tabdoc-{}", tab_id),
            project_id: "proj-1".to_string(),
            tab_id: tab_id.to_string(),
            name: name.to_string(),
            rows: statuses.iter().map(|s| row(s)).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn folds_statuses_with_coercion() {
        let detail = tab_detail(&tab("tab_1", "Smoke", &["passed", "PASSED", " failed", "", "weird"]));

        assert_eq!(detail.total, 5);
        assert_eq!(detail.counts.passed, 2);
        assert_eq!(detail.counts.failed, 1);
        assert_eq!(detail.counts.skipped, 2);
        assert_eq!(detail.counts.total(), detail.total);
    }

    #[test]
    fn blank_name_is_reported_as_unnamed() {
        assert_eq!(tab_detail(&tab("tab_1", "", &[])).tab_name, "Unnamed Tab");
    }

    #[test]
    fn totals_add_up_across_tabs() {
        let summary = summarize_tabs(
            &[],
            vec![
                tab("tab_1", "A", &["passed", "untested"]),
                tab("tab_2", "B", &["blocked", "failed", "skipped"]),
            ],
        );

        assert_eq!(summary.total_cases, 5);
        assert_eq!(summary.status_counts.total(), summary.total_cases);
        assert_eq!(
            summary.status_counts,
            StatusCounts {
                passed: 1,
                failed: 1,
                blocked: 1,
                skipped: 1,
                untested: 1,
            }
        );
    }

    #[test]
    fn details_follow_index_then_creation_order() {
        let index = vec![TabRef::new("tab_3", "C"), TabRef::new("tab_1", "A")];
        let summary = summarize_tabs(
            &index,
            vec![tab("tab_1", "A", &[]), tab("tab_2", "B", &[]), tab("tab_3", "C", &[])],
        );

        let order: Vec<&str> = summary.tabs_details.iter().map(|d| d.tab_id.as_str()).collect();
        assert_eq!(order, vec!["tab_3", "tab_1", "tab_2"]);
    }

    #[test]
    fn no_tabs_means_zeros() {
        assert_eq!(summarize_tabs(&[], Vec::new()), ProjectSummary::default());
    }
}
