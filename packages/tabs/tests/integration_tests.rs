// ABOUTME: Integration tests for tab creation, editing, naming repair, and summaries
// ABOUTME: Runs against a migrated in-memory SQLite database

use chrono::Utc;
use pretty_assertions::assert_eq;
use sqlx::SqlitePool;
use testdesk_core::TabRef;
use testdesk_requirements::{RequirementStorage, TestCase};
use testdesk_storage::{init_memory_pool, StorageError};
use testdesk_tabs::{TabManager, TabNaming, TestRow};

const BASE: &str = "Bảng test case";

/// Helper to create a migrated in-memory database with one project
async fn create_test_db() -> SqlitePool {
    let pool = init_memory_pool().await.unwrap();
    insert_project(&pool, "proj-1").await;
    pool
}

async fn insert_project(pool: &SqlitePool, id: &str) {
    sqlx::query("INSERT INTO projects (id, user_id, name, created_at) VALUES (?, 'user-1', ?, ?)")
        .bind(id)
        .bind(format!("Project {}", id))
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
}

fn cases(funcs: &[&str]) -> Vec<TestCase> {
    funcs
        .iter()
        .map(|func| TestCase {
            case_id: format!("TC_{}", func),
            func: func.to_string(),
            test_type: "functional".to_string(),
            ..TestCase::default()
        })
        .collect()
}

/// Create a tab over one fresh requirement with the given cases
async fn create_tab(manager: &TabManager, pool: &SqlitePool, name: &str, funcs: &[&str]) -> String {
    let requirement = RequirementStorage::new(pool.clone())
        .insert_requirement("proj-1", &format!("Req for {}", name), &cases(funcs))
        .await
        .unwrap();

    manager
        .create_tab(Some("proj-1"), Some(name), Some(&[requirement.id][..]))
        .await
        .unwrap()
        .tab_id
}

async fn index_names(manager: &TabManager) -> Vec<String> {
    manager
        .storage()
        .load_index("proj-1")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect()
}

async fn document_name(manager: &TabManager, tab_id: &str) -> String {
    manager
        .storage()
        .get_tab("proj-1", tab_id)
        .await
        .unwrap()
        .unwrap()
        .name
}

fn names(index: &[TabRef]) -> Vec<&str> {
    index.iter().map(|t| t.name.as_str()).collect()
}

#[tokio::test]
async fn test_create_tab_snapshots_selected_requirements() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());
    let requirements = RequirementStorage::new(pool.clone());

    let a = requirements
        .insert_requirement("proj-1", "A", &cases(&["a1", "a2"]))
        .await
        .unwrap();
    let b = requirements
        .insert_requirement("proj-1", "B", &cases(&["b1"]))
        .await
        .unwrap();

    let created = manager
        .create_tab(
            Some("proj-1"),
            Some("  Smoke  "),
            Some(&[b.id.clone(), "req-unknown".to_string(), a.id.clone()][..]),
        )
        .await
        .unwrap();

    assert_eq!(created.name, "Smoke");
    assert!(created.tab_id.starts_with("tab_"));

    let rows = manager
        .get_rows(Some("proj-1"), Some(&created.tab_id))
        .await
        .unwrap();
    let funcs: Vec<&str> = rows.iter().map(|r| r.func.as_str()).collect();
    assert_eq!(funcs, vec!["b1", "a1", "a2"]);
    assert!(rows.iter().all(|r| r.status == "untested"));

    let index = manager.storage().load_index("proj-1").await.unwrap();
    assert_eq!(index, vec![TabRef::new(&created.tab_id, "Smoke")]);
}

#[tokio::test]
async fn test_create_tab_validates_input() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool, TabNaming::default());
    let ids = vec!["req-x".to_string()];

    let no_project = manager.create_tab(None, Some("T"), Some(ids.as_slice())).await;
    assert!(matches!(no_project, Err(StorageError::Validation(_))));

    let blank_name = manager.create_tab(Some("proj-1"), Some("  "), Some(ids.as_slice())).await;
    assert!(matches!(blank_name, Err(StorageError::Validation(_))));

    let no_ids = manager.create_tab(Some("proj-1"), Some("T"), Some(&[][..])).await;
    assert!(matches!(no_ids, Err(StorageError::Validation(_))));

    let unknown = manager.create_tab(Some("proj-404"), Some("T"), Some(ids.as_slice())).await;
    assert!(matches!(unknown, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_snapshot_is_isolated_from_requirement_edits() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());
    let requirements = RequirementStorage::new(pool.clone());

    let requirement = requirements
        .insert_requirement("proj-1", "Login", &cases(&["login"]))
        .await
        .unwrap();
    let tab = manager
        .create_tab(Some("proj-1"), Some("Snapshot"), Some(&[requirement.id.clone()][..]))
        .await
        .unwrap();

    requirements
        .upsert_requirement(&requirement.id, "proj-1", "Changed", &cases(&["other"]))
        .await
        .unwrap();

    let rows = manager
        .get_rows(Some("proj-1"), Some(&tab.tab_id))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].req_text, "Login");
    assert_eq!(rows[0].func, "login");

    // And row edits never reach the requirement
    let mut edited = rows.clone();
    edited[0].description = "edited in tab".to_string();
    manager
        .save_rows(Some("proj-1"), Some(&tab.tab_id), Some(edited))
        .await
        .unwrap();

    let stored = requirements.get_requirement(&requirement.id).await.unwrap();
    assert_eq!(stored.test_cases[0].description, "");
}

#[tokio::test]
async fn test_save_rows_replaces_and_canonicalizes() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());
    let tab_id = create_tab(&manager, &pool, "Rows", &["one", "two"]).await;

    let mut rows = manager.get_rows(Some("proj-1"), Some(&tab_id)).await.unwrap();
    rows[0].status = "Passed".to_string();
    rows[0].actual_result = "works".to_string();
    rows.remove(1);
    let mut added: TestRow = serde_json::from_value(serde_json::json!({"func": "three"})).unwrap();
    added.status = String::new();
    rows.push(added);

    manager
        .save_rows(Some("proj-1"), Some(&tab_id), Some(rows))
        .await
        .unwrap();

    let stored = manager.get_rows(Some("proj-1"), Some(&tab_id)).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].status, "passed");
    assert_eq!(stored[0].actual_result, "works");
    assert_eq!(stored[1].func, "three");
    assert_eq!(stored[1].status, "untested");
    assert!(stored[1].id.as_deref().unwrap().starts_with("row-"));
}

#[tokio::test]
async fn test_save_rows_rejects_unknown_status_without_writing() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());
    let tab_id = create_tab(&manager, &pool, "Rows", &["one"]).await;

    let mut rows = manager.get_rows(Some("proj-1"), Some(&tab_id)).await.unwrap();
    rows[0].status = "finished".to_string();

    let result = manager.save_rows(Some("proj-1"), Some(&tab_id), Some(rows)).await;
    assert!(matches!(result, Err(StorageError::Validation(_))));

    let stored = manager.get_rows(Some("proj-1"), Some(&tab_id)).await.unwrap();
    assert_eq!(stored[0].status, "untested");
}

#[tokio::test]
async fn test_missing_tab_reads_empty_but_rejects_saves() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool, TabNaming::default());

    let rows = manager.get_rows(Some("proj-1"), Some("tab_missing")).await.unwrap();
    assert!(rows.is_empty());

    let saved = manager
        .save_rows(Some("proj-1"), Some("tab_missing"), Some(Vec::new()))
        .await;
    assert!(matches!(saved, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_middle_default_tab_renumbers() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());

    let first = create_tab(&manager, &pool, BASE, &["a"]).await;
    let middle = create_tab(&manager, &pool, &format!("{} 1", BASE), &["b"]).await;
    let last = create_tab(&manager, &pool, &format!("{} 2", BASE), &["c"]).await;

    let updated = manager
        .delete_tab(Some("proj-1"), Some(&middle))
        .await
        .unwrap();

    assert_eq!(names(&updated), vec![BASE.to_string(), format!("{} 1", BASE)]);
    assert_eq!(index_names(&manager).await, names(&updated));
    assert_eq!(document_name(&manager, &first).await, BASE);
    assert_eq!(document_name(&manager, &last).await, format!("{} 1", BASE));
    assert!(manager.storage().get_tab("proj-1", &middle).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_unknown_tab_is_not_found() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool, TabNaming::default());

    let result = manager.delete_tab(Some("proj-1"), Some("tab_nope")).await;
    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_rename_to_existing_name_is_rejected_without_changes() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());

    create_tab(&manager, &pool, "Smoke", &["a"]).await;
    let other = create_tab(&manager, &pool, "Regression", &["b"]).await;

    let result = manager
        .rename_tab(Some("proj-1"), Some(&other), Some("  SMOKE "))
        .await;

    match result {
        Err(StorageError::DuplicateName(name)) => assert_eq!(name, "SMOKE"),
        other => panic!("expected DuplicateName, got {:?}", other),
    }
    assert_eq!(index_names(&manager).await, vec!["Smoke", "Regression"]);
    assert_eq!(document_name(&manager, &other).await, "Regression");
}

#[tokio::test]
async fn test_rename_keeps_own_name_case_change() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());
    let tab_id = create_tab(&manager, &pool, "smoke", &["a"]).await;

    let updated = manager
        .rename_tab(Some("proj-1"), Some(&tab_id), Some("Smoke"))
        .await
        .unwrap();

    assert_eq!(names(&updated), vec!["Smoke"]);
    assert_eq!(document_name(&manager, &tab_id).await, "Smoke");
}

#[tokio::test]
async fn test_rename_out_of_default_sequence_renumbers_the_rest() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());

    let first = create_tab(&manager, &pool, BASE, &["a"]).await;
    let second = create_tab(&manager, &pool, &format!("{} 1", BASE), &["b"]).await;
    let third = create_tab(&manager, &pool, &format!("{} 2", BASE), &["c"]).await;

    let updated = manager
        .rename_tab(Some("proj-1"), Some(&first), Some("Login flows"))
        .await
        .unwrap();

    assert_eq!(
        names(&updated),
        vec!["Login flows".to_string(), BASE.to_string(), format!("{} 1", BASE)]
    );
    assert_eq!(document_name(&manager, &first).await, "Login flows");
    assert_eq!(document_name(&manager, &second).await, BASE);
    assert_eq!(document_name(&manager, &third).await, format!("{} 1", BASE));
}

#[tokio::test]
async fn test_rename_unknown_tab_is_not_found() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool, TabNaming::default());

    let result = manager
        .rename_tab(Some("proj-1"), Some("tab_nope"), Some("X"))
        .await;
    assert!(matches!(result, Err(StorageError::NotFound(_))));

    let blank = manager
        .rename_tab(Some("proj-1"), Some("tab_nope"), Some("   "))
        .await;
    assert!(matches!(blank, Err(StorageError::Validation(_))));
}

#[tokio::test]
async fn test_repair_is_idempotent() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());

    create_tab(&manager, &pool, &format!("{} 4", BASE), &["a"]).await;
    create_tab(&manager, &pool, "Custom", &["b"]).await;
    create_tab(&manager, &pool, &format!("{} 9", BASE), &["c"]).await;

    let repaired = manager.repair_naming(Some("proj-1")).await.unwrap();
    assert_eq!(
        names(&repaired),
        vec![BASE.to_string(), "Custom".to_string(), format!("{} 1", BASE)]
    );

    let index = manager.storage().load_index("proj-1").await.unwrap();
    assert!(manager.naming().plan_repair(index.clone()).is_noop());

    let again = manager.repair_naming(Some("proj-1")).await.unwrap();
    assert_eq!(again, index);
}

#[tokio::test]
async fn test_reorder_renumbers_along_new_order() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());

    let first = create_tab(&manager, &pool, BASE, &["a"]).await;
    let second = create_tab(&manager, &pool, &format!("{} 1", BASE), &["b"]).await;

    let invalid = manager
        .reorder_tabs(Some("proj-1"), &[second.clone()])
        .await;
    assert!(matches!(invalid, Err(StorageError::Validation(_))));

    let updated = manager
        .reorder_tabs(Some("proj-1"), &[second.clone(), first.clone()])
        .await
        .unwrap();

    assert_eq!(updated[0].id, second);
    assert_eq!(names(&updated), vec![BASE.to_string(), format!("{} 1", BASE)]);
    assert_eq!(document_name(&manager, &second).await, BASE);
    assert_eq!(document_name(&manager, &first).await, format!("{} 1", BASE));
}

#[tokio::test]
async fn test_summary_totals() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());

    let first = create_tab(&manager, &pool, "First", &["a", "b", "c"]).await;
    create_tab(&manager, &pool, "Second", &["d"]).await;

    let mut rows = manager.get_rows(Some("proj-1"), Some(&first)).await.unwrap();
    rows[0].status = "passed".to_string();
    rows[1].status = "failed".to_string();
    manager
        .save_rows(Some("proj-1"), Some(&first), Some(rows))
        .await
        .unwrap();

    let summary = manager.summarize(Some("proj-1")).await.unwrap();

    assert_eq!(summary.total_cases, 4);
    assert_eq!(summary.status_counts.total(), summary.total_cases);
    assert_eq!(summary.status_counts.passed, 1);
    assert_eq!(summary.status_counts.failed, 1);
    assert_eq!(summary.status_counts.untested, 2);
    assert_eq!(summary.tabs_details.len(), 2);
    assert_eq!(summary.tabs_details[0].tab_name, "First");
    assert_eq!(summary.tabs_details[0].total, 3);
}

#[tokio::test]
async fn test_summary_of_project_without_tabs_is_zero() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool, TabNaming::default());

    let summary = manager.summarize(Some("proj-1")).await.unwrap();
    assert_eq!(summary.total_cases, 0);
    assert_eq!(summary.status_counts.total(), 0);
    assert!(summary.tabs_details.is_empty());

    let unknown = manager.summarize(Some("proj-404")).await.unwrap();
    assert_eq!(unknown.total_cases, 0);
}

#[tokio::test]
async fn test_sweep_removes_unindexed_tabs() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());

    let kept = create_tab(&manager, &pool, "Kept", &["a"]).await;
    let orphan = manager
        .storage()
        .insert_tab("proj-1", "Orphan", &[])
        .await
        .unwrap();

    let removed = manager.sweep_orphan_tabs(Some("proj-1")).await.unwrap();

    assert_eq!(removed, 1);
    assert!(manager.storage().get_tab("proj-1", &kept).await.unwrap().is_some());
    assert!(manager
        .storage()
        .get_tab("proj-1", &orphan.tab_id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(manager.sweep_orphan_tabs(Some("proj-1")).await.unwrap(), 0);
}

#[tokio::test]
async fn test_custom_base_name() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::new("Sheet"));

    create_tab(&manager, &pool, "Sheet", &["a"]).await;
    let middle = create_tab(&manager, &pool, "Sheet 1", &["b"]).await;
    create_tab(&manager, &pool, "Sheet 2", &["c"]).await;

    let updated = manager.delete_tab(Some("proj-1"), Some(&middle)).await.unwrap();
    assert_eq!(names(&updated), vec!["Sheet", "Sheet 1"]);
}

#[tokio::test]
async fn test_index_write_refuses_stale_snapshot() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());
    let first = create_tab(&manager, &pool, BASE, &["a"]).await;

    let stale = manager.storage().load_index_snapshot("proj-1").await.unwrap();

    // A create lands between the read and the write
    let late = create_tab(&manager, &pool, "Late", &["b"]).await;

    let written = manager
        .storage()
        .store_index_if_unchanged("proj-1", &stale, &[])
        .await
        .unwrap();
    assert!(!written);

    let index = manager.storage().load_index("proj-1").await.unwrap();
    let ids: Vec<&str> = index.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec![first.as_str(), late.as_str()]);

    let fresh = manager.storage().load_index_snapshot("proj-1").await.unwrap();
    assert!(manager
        .storage()
        .store_index_if_unchanged("proj-1", &fresh, &index)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_stale_index_write_on_missing_project_is_not_found() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());
    let stale = manager.storage().load_index_snapshot("proj-1").await.unwrap();

    sqlx::query("DELETE FROM projects WHERE id = 'proj-1'")
        .execute(&pool)
        .await
        .unwrap();

    let result = manager
        .storage()
        .store_index_if_unchanged("proj-1", &stale, &[])
        .await;
    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_concurrent_creates_survive_index_rewrites() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());
    let first = create_tab(&manager, &pool, BASE, &["a"]).await;
    create_tab(&manager, &pool, &format!("{} 1", BASE), &["b"]).await;

    let requirement = RequirementStorage::new(pool.clone())
        .insert_requirement("proj-1", "Shared", &cases(&["s"]))
        .await
        .unwrap();
    let selected = vec![requirement.id];

    let creates = async {
        for n in 0..5 {
            manager
                .create_tab(Some("proj-1"), Some(&format!("Extra {}", n)), Some(&selected[..]))
                .await
                .unwrap();
        }
    };
    let rewrites = async {
        for n in 0..5 {
            manager
                .rename_tab(Some("proj-1"), Some(&first), Some(&format!("Renamed {}", n)))
                .await
                .unwrap();
            manager.repair_naming(Some("proj-1")).await.unwrap();
        }
    };
    tokio::join!(creates, rewrites);

    let index = manager.storage().load_index("proj-1").await.unwrap();
    let tabs = manager.storage().list_tabs("proj-1").await.unwrap();
    assert_eq!(index.len(), 7);
    assert_eq!(tabs.len(), 7);
    assert_eq!(manager.sweep_orphan_tabs(Some("proj-1")).await.unwrap(), 0);
    assert_eq!(document_name(&manager, &first).await, "Renamed 4");
}

#[tokio::test]
async fn test_corrupt_index_is_reported_not_overwritten() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());
    let tab_id = create_tab(&manager, &pool, BASE, &["a"]).await;

    sqlx::query("UPDATE projects SET custom_tabs = '[{\"id\": broken' WHERE id = 'proj-1'")
        .execute(&pool)
        .await
        .unwrap();

    let rename = manager
        .rename_tab(Some("proj-1"), Some(&tab_id), Some("Smoke"))
        .await;
    assert!(matches!(rename, Err(StorageError::Json(_))));

    let delete = manager.delete_tab(Some("proj-1"), Some(&tab_id)).await;
    assert!(matches!(delete, Err(StorageError::Json(_))));

    let raw: String = sqlx::query_scalar("SELECT custom_tabs FROM projects WHERE id = 'proj-1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(raw, "[{\"id\": broken");
}

#[tokio::test]
async fn test_corrupt_rows_are_reported() {
    let pool = create_test_db().await;
    let manager = TabManager::new(pool.clone(), TabNaming::default());
    let tab_id = create_tab(&manager, &pool, BASE, &["a"]).await;

    sqlx::query("UPDATE testcase_tabs SET row_data = 'not json' WHERE tab_id = ?")
        .bind(&tab_id)
        .execute(&pool)
        .await
        .unwrap();

    let result = manager.get_rows(Some("proj-1"), Some(&tab_id)).await;
    assert!(matches!(result, Err(StorageError::Json(_))));
}
