// ABOUTME: Test case tab type definitions
// ABOUTME: Tabs, their editable rows, row status, request inputs, and summary shapes

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use testdesk_core::serde_util::{lenient_id, lenient_text};
use testdesk_core::ValidationError;

/// Execution status of a test row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Passed,
    Failed,
    Blocked,
    Skipped,
    #[default]
    Untested,
}

impl RowStatus {
    pub const ALL: [RowStatus; 5] = [
        RowStatus::Passed,
        RowStatus::Failed,
        RowStatus::Blocked,
        RowStatus::Skipped,
        RowStatus::Untested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Passed => "passed",
            RowStatus::Failed => "failed",
            RowStatus::Blocked => "blocked",
            RowStatus::Skipped => "skipped",
            RowStatus::Untested => "untested",
        }
    }

    /// Read-time coercion: empty or unrecognized statuses count as skipped.
    pub fn coerce(raw: &str) -> RowStatus {
        raw.parse().unwrap_or(RowStatus::Skipped)
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "passed" => Ok(RowStatus::Passed),
            "failed" => Ok(RowStatus::Failed),
            "blocked" => Ok(RowStatus::Blocked),
            "skipped" => Ok(RowStatus::Skipped),
            "untested" => Ok(RowStatus::Untested),
            other => Err(ValidationError::Invalid {
                field: "status",
                reason: format!("unknown status '{}'", other),
            }),
        }
    }
}

fn default_status() -> String {
    RowStatus::Untested.as_str().to_string()
}

/// A tab-owned copy of a test case, decorated with execution results.
///
/// `status` stays a string on the wire and in storage so rows written by
/// older clients still load; it is coerced when aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRow {
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Requirement the row was cloned from; traceability only
    #[serde(default, deserialize_with = "lenient_id")]
    pub original_req_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub req_text: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub case_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub func: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub steps: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub expected_result: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub test_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub actual_result: String,
    #[serde(default = "default_status", deserialize_with = "lenient_text")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub project_id: String,
    /// Project-unique external key
    pub tab_id: String,
    pub name: String,
    pub rows: Vec<TestRow>,
    pub created_at: DateTime<Utc>,
}

/// Returned by tab creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTab {
    pub tab_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabCreateInput {
    pub project_id: Option<String>,
    pub tab_name: Option<String>,
    pub selected_req_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRenameInput {
    pub project_id: Option<String>,
    pub tab_id: Option<String>,
    pub new_name: Option<String>,
}

/// Addresses one tab of one project
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabKeyInput {
    pub project_id: Option<String>,
    pub tab_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowsSaveInput {
    pub project_id: Option<String>,
    pub tab_id: Option<String>,
    pub rows: Option<Vec<TestRow>>,
}

/// Per-status row counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub passed: u64,
    pub failed: u64,
    pub blocked: u64,
    pub skipped: u64,
    pub untested: u64,
}

impl StatusCounts {
    pub fn add(&mut self, status: RowStatus) {
        match status {
            RowStatus::Passed => self.passed += 1,
            RowStatus::Failed => self.failed += 1,
            RowStatus::Blocked => self.blocked += 1,
            RowStatus::Skipped => self.skipped += 1,
            RowStatus::Untested => self.untested += 1,
        }
    }

    pub fn merge(&mut self, other: &StatusCounts) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.blocked += other.blocked;
        self.skipped += other.skipped;
        self.untested += other.untested;
    }

    pub fn total(&self) -> u64 {
        self.passed + self.failed + self.blocked + self.skipped + self.untested
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDetail {
    pub tab_id: String,
    pub tab_name: String,
    pub total: u64,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub total_cases: u64,
    pub status_counts: StatusCounts,
    pub tabs_details: Vec<TabDetail>,
}
