//! Tabular entity records fetched per repository
//!
//! These are read-only snapshots; a tab reload replaces the whole list. They
//! are distinct from graph nodes, though the backend derives both from the
//! same analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A registered repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub last_analyzed_at: Option<DateTime<Utc>>,
}

/// Request body for registering a repository
#[derive(Debug, Clone, Serialize)]
pub struct NewRepository {
    pub name: String,
    pub url: String,
    pub branch: String,
}

/// A declared package dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub package_manager: String,
    #[serde(default)]
    pub is_dev: bool,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub file_path: String,
}

/// A detected external service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub service_type: String,
    /// Detection confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,
    /// Object or JSON-encoded string; decoded defensively at display time
    #[serde(default)]
    pub configuration: Value,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub line_number: Option<u32>,
}

/// A parsed code element (function, class, module...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeElement {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub element_type: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub line_number: u32,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub parameters: Option<Vec<String>>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub doc_comment: Option<String>,
}

/// Counts returned by `POST /api/repositories/{id}/analyze`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub total_dependencies: u64,
    #[serde(default)]
    pub services_found: u64,
    #[serde(default)]
    pub code_elements_found: u64,
    #[serde(default)]
    pub security_entities_found: u64,
}
