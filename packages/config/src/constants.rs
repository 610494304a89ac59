// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Testdesk

// Server
pub const TESTDESK_HOST: &str = "TESTDESK_HOST";
pub const TESTDESK_PORT: &str = "TESTDESK_PORT";
pub const PORT: &str = "PORT"; // Legacy
pub const TESTDESK_CORS_ORIGIN: &str = "TESTDESK_CORS_ORIGIN";
pub const TESTDESK_MAX_BODY_BYTES: &str = "TESTDESK_MAX_BODY_BYTES";

// Database
pub const TESTDESK_DATABASE_PATH: &str = "TESTDESK_DATABASE_PATH";
pub const TESTDESK_DB_MAX_CONNECTIONS: &str = "TESTDESK_DB_MAX_CONNECTIONS";
pub const TESTDESK_DB_ACQUIRE_TIMEOUT_SECS: &str = "TESTDESK_DB_ACQUIRE_TIMEOUT_SECS";
pub const TESTDESK_DB_BUSY_TIMEOUT_SECS: &str = "TESTDESK_DB_BUSY_TIMEOUT_SECS";

// Test case generation backend
pub const TESTDESK_GENERATION_URL: &str = "TESTDESK_GENERATION_URL";
pub const TESTDESK_GENERATION_TIMEOUT_SECS: &str = "TESTDESK_GENERATION_TIMEOUT_SECS";
pub const TESTDESK_GENERATION_CONNECT_TIMEOUT_SECS: &str =
    "TESTDESK_GENERATION_CONNECT_TIMEOUT_SECS";

// Tabs
pub const TESTDESK_TAB_BASE_NAME: &str = "TESTDESK_TAB_BASE_NAME";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";
