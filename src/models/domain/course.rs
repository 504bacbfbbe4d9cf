use serde::{Deserialize, Serialize};

/// Read-only view of the course catalog.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Course {
    pub fn new(id: &str, title: &str) -> Self {
        Course {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
        }
    }
}
