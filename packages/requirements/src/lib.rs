// ABOUTME: Requirement management for Testdesk
// ABOUTME: Types, payload normalization, storage, and list reconciliation for requirements

pub mod normalize;
pub mod reconcile;
pub mod storage;
pub mod types;

// Re-export main types
pub use normalize::{
    normalize_generated_cases, normalize_test_case, normalize_test_cases, normalize_test_type,
};
pub use reconcile::{reconcile, save_generated, ReconcileOutcome};
pub use storage::RequirementStorage;
pub use types::{Requirement, RequirementInput, TestCase};
