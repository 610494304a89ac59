// ABOUTME: HTTP request handlers for health and project operations
// ABOUTME: Owner-scoped project CRUD and tab index reordering

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use testdesk_core::{ProjectCreateInput, ProjectUpdateInput, ValidationError};
use testdesk_projects::DbState;

use crate::auth::CurrentUser;
use crate::response::{created, ok, ApiJson, ApiResult};

/// Liveness probe
pub async fn health() -> ApiResult {
    Ok(ok(json!({
        "status": "ok",
        "service": "testdesk",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// List the caller's projects, newest first
pub async fn list_projects(State(db): State<DbState>, user: CurrentUser) -> ApiResult {
    info!("Listing projects for user: {}", user.id);

    let projects = db.project_storage.list_projects(&user.id).await?;
    Ok(ok(projects))
}

/// Request body for creating a project
#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

pub async fn create_project(
    State(db): State<DbState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CreateProjectRequest>,
) -> ApiResult {
    info!("Creating project for user: {}", user.id);

    let input = ProjectCreateInput {
        name: request.name.unwrap_or_default(),
        icon: request.icon,
        color: request.color,
    };

    let project = db.project_storage.create_project(&user.id, input).await?;
    Ok(created(project))
}

pub async fn get_project(State(db): State<DbState>, Path(id): Path<String>) -> ApiResult {
    info!("Getting project: {}", id);

    let project = db.project_storage.get_project(&id).await?;
    Ok(ok(project))
}

pub async fn update_project(
    State(db): State<DbState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ProjectUpdateInput>,
) -> ApiResult {
    info!("Updating project: {}", id);

    let project = db.project_storage.update_project(&id, input).await?;
    Ok(ok(project))
}

/// Delete a project with its requirements and tabs
pub async fn delete_project(State(db): State<DbState>, Path(id): Path<String>) -> ApiResult {
    info!("Deleting project: {}", id);

    db.project_storage.delete_project(&id).await?;
    Ok(ok(json!({ "id": id })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTabsRequest {
    pub tab_ids: Option<Vec<String>>,
}

/// Rewrite the project's tab order; returns the renumbered index
pub async fn reorder_tabs(
    State(db): State<DbState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ReorderTabsRequest>,
) -> ApiResult {
    info!("Reordering tabs of project: {}", id);

    let tab_ids = request.tab_ids.ok_or(ValidationError::Missing("tabIds"))?;
    let tabs = db.tab_manager.reorder_tabs(Some(id.as_str()), &tab_ids).await?;
    Ok(ok(tabs))
}
