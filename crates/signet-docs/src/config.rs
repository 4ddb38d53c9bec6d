//! Documentation settings.

use serde::{Deserialize, Serialize};

/// Where and how the OpenAPI document is served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Whether the document is served at all.
    pub enabled: bool,
    /// Path the JSON document is served at.
    pub path: String,
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    pub description: Option<String>,
    /// Server URLs.
    pub servers: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/openapi.json".to_string(),
            title: "Signet API".to_string(),
            version: "0.1.0".to_string(),
            description: None,
            servers: Vec::new(),
        }
    }
}
