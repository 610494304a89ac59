// ABOUTME: Requirement list reconciliation
// ABOUTME: Applies the insert/update/delete diff between a client's full list and the stored set

use std::collections::HashSet;

use tracing::{debug, info, warn};

use testdesk_core::{is_well_formed_id, require_text, REQUIREMENT_ID_PREFIX};
use testdesk_storage::{PartialWriteWarning, StorageResult};

use crate::normalize::normalize_test_cases;
use crate::storage::RequirementStorage;
use crate::types::{Requirement, RequirementInput, TestCase};

/// Result of a reconciled save
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// Fresh read of the project's full requirement set after the save
    pub requirements: Vec<Requirement>,
    pub deleted: u64,
    pub updated: usize,
    pub inserted: usize,
    /// Items that did not commit; their siblings did
    pub warnings: Vec<PartialWriteWarning>,
}

struct DesiredRequirement {
    id: Option<String>,
    text: String,
    test_cases: Vec<TestCase>,
}

impl From<RequirementInput> for DesiredRequirement {
    fn from(input: RequirementInput) -> Self {
        // Malformed identities (client temporaries, other document types) mean "new".
        let id = input
            .id
            .filter(|id| is_well_formed_id(REQUIREMENT_ID_PREFIX, id));

        Self {
            id,
            test_cases: normalize_test_cases(&input.test_cases),
            text: input.text,
        }
    }
}

/// Replace the stored requirement set of `project_id` with `desired`.
///
/// Stored requirements missing from `desired` are deleted in one batch; the
/// remaining writes are applied unordered and best-effort.
pub async fn reconcile(
    storage: &RequirementStorage,
    project_id: Option<&str>,
    desired: Vec<RequirementInput>,
) -> StorageResult<ReconcileOutcome> {
    let project_id = require_text("projectId", project_id)?;
    storage.ensure_project(project_id).await?;

    let desired: Vec<DesiredRequirement> = desired.into_iter().map(Into::into).collect();

    let existing = storage.list_requirements(project_id).await?;
    let keep: HashSet<&str> = desired.iter().filter_map(|r| r.id.as_deref()).collect();
    let to_delete: Vec<String> = existing
        .iter()
        .filter(|r| !keep.contains(r.id.as_str()))
        .map(|r| r.id.clone())
        .collect();

    let deleted = storage.delete_requirements(project_id, &to_delete).await?;

    let mut updated = 0;
    let mut inserted = 0;
    let mut warnings = Vec::new();

    for item in &desired {
        if let Some(id) = &item.id {
            match storage
                .upsert_requirement(id, project_id, &item.text, &item.test_cases)
                .await
            {
                Ok(true) => {
                    updated += 1;
                    continue;
                }
                // Never move another project's requirement; keep the text as a new one
                Ok(false) => warn!(
                    "Requirement {} belongs to another project, inserting a new one instead",
                    id
                ),
                Err(e) => {
                    warnings.push(PartialWriteWarning::new(id.clone(), e.to_string()));
                    continue;
                }
            }
        }

        match storage
            .insert_requirement(project_id, &item.text, &item.test_cases)
            .await
        {
            Ok(_) => inserted += 1,
            Err(e) => warnings.push(PartialWriteWarning::new(
                format!("new requirement '{}'", item.text),
                e.to_string(),
            )),
        }
    }

    info!(
        "Reconciled requirements for project {}: {} deleted, {} updated, {} inserted, {} skipped",
        project_id,
        deleted,
        updated,
        inserted,
        warnings.len()
    );

    let requirements = storage.list_requirements(project_id).await?;
    debug!("Project {} now has {} requirement(s)", project_id, requirements.len());

    Ok(ReconcileOutcome {
        requirements,
        deleted,
        updated,
        inserted,
        warnings,
    })
}

/// Persist freshly generated cases for one requirement.
///
/// A well-formed `requirement_id` of this project is updated (or recreated if
/// it vanished); anything else produces a new requirement.
pub async fn save_generated(
    storage: &RequirementStorage,
    project_id: &str,
    requirement_id: Option<&str>,
    text: &str,
    test_cases: &[TestCase],
) -> StorageResult<Requirement> {
    let requirement_id =
        requirement_id.filter(|id| is_well_formed_id(REQUIREMENT_ID_PREFIX, id));

    if let Some(id) = requirement_id {
        if storage
            .upsert_requirement(id, project_id, text, test_cases)
            .await?
        {
            return storage.get_requirement(id).await;
        }
        warn!(
            "Requirement {} belongs to another project, inserting a new one instead",
            id
        );
    }

    storage.insert_requirement(project_id, text, test_cases).await
}
