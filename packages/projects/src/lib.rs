// ABOUTME: Project management library for Testdesk
// ABOUTME: Project storage and the shared state wiring every domain storage together

pub mod db;
pub mod storage;

pub use db::DbState;
pub use storage::ProjectStorage;

// Re-export project types from core
pub use testdesk_core::{Project, ProjectCreateInput, ProjectUpdateInput, TabRef};
