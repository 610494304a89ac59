// ABOUTME: Core types, constants, and utilities for Testdesk
// ABOUTME: Foundational package shared by every other Testdesk package

pub mod constants;
pub mod serde_util;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{Project, ProjectCreateInput, ProjectUpdateInput, TabRef};

// Re-export constants
pub use constants::{
    default_database_path, testdesk_dir, DEFAULT_PROJECT_COLOR, DEFAULT_PROJECT_ICON,
    DEFAULT_TAB_BASE_NAME, DEFAULT_TEST_TYPE, PROJECT_ID_PREFIX, REQUIREMENT_ID_PREFIX,
    ROW_ID_PREFIX, TAB_DOCUMENT_ID_PREFIX, UNNAMED_TAB,
};

// Re-export utilities
pub use utils::{generate_id, generate_tab_key, is_well_formed_id};

// Re-export validation
pub use validation::{require_non_empty, require_text, ValidationError};
