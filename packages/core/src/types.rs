// ABOUTME: Project type definitions
// ABOUTME: Projects and the denormalized tab index they carry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entry of a project's tab index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRef {
    /// External tab key (`tabId` of the tab document)
    pub id: String,
    pub name: String,
}

impl TabRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    /// Ordered tab index, duplicated from the tab documents for fast listing
    pub custom_tabs: Vec<TabRef>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCreateInput {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdateInput {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}
