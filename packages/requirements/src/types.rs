// ABOUTME: Requirement type definitions
// ABOUTME: Requirements with their embedded test cases, and the client-side input shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use testdesk_core::serde_util::{lenient_id, lenient_text};

/// A generated test case, embedded in its requirement.
///
/// `case_id` is only expected to be unique within one requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestCase {
    pub case_id: String,
    pub func: String,
    pub description: String,
    pub steps: String,
    pub expected_result: String,
    pub test_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub project_id: String,
    pub text: String,
    pub test_cases: Vec<TestCase>,
    pub created_at: DateTime<Utc>,
}

/// One element of the requirement list as the client currently has it.
///
/// The identity may be a server-assigned id, a client-side temporary id, or
/// missing entirely; test cases arrive in whatever shape the client holds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementInput {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,
    #[serde(default)]
    pub test_cases: Value,
}

impl RequirementInput {
    pub fn new(id: Option<&str>, text: &str, test_cases: Value) -> Self {
        Self {
            id: id.map(str::to_string),
            text: text.to_string(),
            test_cases,
        }
    }
}
