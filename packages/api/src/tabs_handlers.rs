// ABOUTME: HTTP request handlers for test case tab operations
// ABOUTME: Tab creation, row saves, rename/delete with naming repair, sweeps, and summaries

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use testdesk_projects::DbState;
use testdesk_tabs::{RowsSaveInput, TabCreateInput, TabKeyInput, TabRenameInput};

use crate::response::{created, ok, ApiJson, ApiResult};

/// Request body addressing a whole project
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectKeyRequest {
    pub project_id: Option<String>,
}

/// Create a tab from a snapshot of the selected requirements
pub async fn create_tab(
    State(db): State<DbState>,
    ApiJson(input): ApiJson<TabCreateInput>,
) -> ApiResult {
    info!("Creating tab for project: {:?}", input.project_id);

    let tab = db
        .tab_manager
        .create_tab(
            input.project_id.as_deref(),
            input.tab_name.as_deref(),
            input.selected_req_ids.as_deref(),
        )
        .await?;
    Ok(created(tab))
}

/// Replace the rows of a tab
pub async fn save_rows(
    State(db): State<DbState>,
    ApiJson(input): ApiJson<RowsSaveInput>,
) -> ApiResult {
    info!("Saving rows of tab: {:?}", input.tab_id);

    let rows = db
        .tab_manager
        .save_rows(input.project_id.as_deref(), input.tab_id.as_deref(), input.rows)
        .await?;
    Ok(ok(rows))
}

pub async fn rename_tab(
    State(db): State<DbState>,
    ApiJson(input): ApiJson<TabRenameInput>,
) -> ApiResult {
    info!("Renaming tab: {:?}", input.tab_id);

    let tabs = db
        .tab_manager
        .rename_tab(
            input.project_id.as_deref(),
            input.tab_id.as_deref(),
            input.new_name.as_deref(),
        )
        .await?;
    Ok(ok(tabs))
}

pub async fn delete_tab(
    State(db): State<DbState>,
    ApiJson(input): ApiJson<TabKeyInput>,
) -> ApiResult {
    info!("Deleting tab: {:?}", input.tab_id);

    let tabs = db
        .tab_manager
        .delete_tab(input.project_id.as_deref(), input.tab_id.as_deref())
        .await?;
    Ok(ok(tabs))
}

/// Re-run the default naming repair for a project
pub async fn repair_naming(
    State(db): State<DbState>,
    ApiJson(request): ApiJson<ProjectKeyRequest>,
) -> ApiResult {
    info!("Repairing tab naming of project: {:?}", request.project_id);

    let tabs = db
        .tab_manager
        .repair_naming(request.project_id.as_deref())
        .await?;
    Ok(ok(tabs))
}

/// Remove tab documents missing from the project's index
pub async fn sweep_orphans(
    State(db): State<DbState>,
    ApiJson(request): ApiJson<ProjectKeyRequest>,
) -> ApiResult {
    info!("Sweeping orphan tabs of project: {:?}", request.project_id);

    let removed = db
        .tab_manager
        .sweep_orphan_tabs(request.project_id.as_deref())
        .await?;
    Ok(ok(json!({ "removed": removed })))
}

pub async fn project_summary(
    State(db): State<DbState>,
    Path(project_id): Path<String>,
) -> ApiResult {
    info!("Getting summary for project: {}", project_id);

    let summary = db.tab_manager.summarize(Some(project_id.as_str())).await?;
    Ok(ok(summary))
}

/// Rows of one tab; an unknown tab yields an empty list
pub async fn get_rows(
    State(db): State<DbState>,
    Path((project_id, tab_id)): Path<(String, String)>,
) -> ApiResult {
    info!("Getting rows of tab: {} (project: {})", tab_id, project_id);

    let rows = db
        .tab_manager
        .get_rows(Some(project_id.as_str()), Some(tab_id.as_str()))
        .await?;
    Ok(ok(rows))
}
