// ABOUTME: HTTP request handlers for requirement operations
// ABOUTME: Listing, full-list reconciliation, and generate-and-save of one requirement

use axum::extract::{Path, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use testdesk_core::{require_text, serde_util::lenient_id, ValidationError};
use testdesk_projects::DbState;
use testdesk_requirements::{
    normalize_generated_cases, reconcile, save_generated, RequirementInput,
};

use crate::response::{ok, ApiJson, ApiResult};

/// List the requirements of a project in creation order
pub async fn list_requirements(
    State(db): State<DbState>,
    Path(project_id): Path<String>,
) -> ApiResult {
    info!("Listing requirements of project: {}", project_id);

    let requirements = db.requirement_storage.list_requirements(&project_id).await?;
    Ok(ok(requirements))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequirementsRequest {
    pub project_id: Option<String>,
    pub requirements: Option<Vec<RequirementInput>>,
}

/// Replace the project's requirement set with the client's full list
pub async fn save_requirements(
    State(db): State<DbState>,
    ApiJson(request): ApiJson<SaveRequirementsRequest>,
) -> ApiResult {
    let desired = request
        .requirements
        .ok_or(ValidationError::Missing("requirements"))?;

    info!(
        "Saving {} requirement(s) for project: {:?}",
        desired.len(),
        request.project_id
    );

    let outcome = reconcile(
        &db.requirement_storage,
        request.project_id.as_deref(),
        desired,
    )
    .await?;

    info!(
        "Requirements saved: {} deleted, {} updated, {} inserted, {} skipped",
        outcome.deleted,
        outcome.updated,
        outcome.inserted,
        outcome.warnings.len()
    );
    Ok(ok(outcome.requirements))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub requirement_id: Option<String>,
    pub text: Option<String>,
}

/// Generate test cases for one requirement text and persist them
pub async fn generate_requirement(
    State(db): State<DbState>,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> ApiResult {
    let text = require_text("text", request.text.as_deref())?;
    let project_id = require_text("projectId", request.project_id.as_deref())?;
    db.requirement_storage.ensure_project(project_id).await?;

    info!("Generating test cases for project: {}", project_id);

    let raw = db.generator.generate(text).await?;
    let cases = normalize_generated_cases(&raw, Utc::now().timestamp_millis());

    let requirement = save_generated(
        &db.requirement_storage,
        project_id,
        request.requirement_id.as_deref(),
        text,
        &cases,
    )
    .await?;

    info!(
        "Saved requirement {} with {} generated case(s)",
        requirement.id,
        requirement.test_cases.len()
    );
    Ok(ok(requirement))
}
