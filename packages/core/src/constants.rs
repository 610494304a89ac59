// ABOUTME: Shared constants for Testdesk
// ABOUTME: Default names, identity prefixes and data directory locations

use std::env;
use std::path::PathBuf;

/// Base name used for auto-named test case tabs
pub const DEFAULT_TAB_BASE_NAME: &str = "Bảng test case";

/// Display name used in summaries for tabs stored without a name
pub const UNNAMED_TAB: &str = "Unnamed Tab";

/// Test type assigned when a case carries none
pub const DEFAULT_TEST_TYPE: &str = "functional";

pub const DEFAULT_PROJECT_ICON: &str = "folder";
pub const DEFAULT_PROJECT_COLOR: &str = "blue";

/// Identity prefixes for stored documents
pub const PROJECT_ID_PREFIX: &str = "proj";
pub const REQUIREMENT_ID_PREFIX: &str = "req";
pub const TAB_DOCUMENT_ID_PREFIX: &str = "tabdoc";
pub const ROW_ID_PREFIX: &str = "row";

/// Get the path to the Testdesk directory (~/.testdesk)
pub fn testdesk_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".testdesk")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".testdesk")
    }
}

/// Get the path to the default database file (~/.testdesk/testdesk.db)
pub fn default_database_path() -> PathBuf {
    testdesk_dir().join("testdesk.db")
}
