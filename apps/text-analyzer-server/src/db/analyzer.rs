//! Analyzer documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::repository::Repository;
use crate::analysis::TextMetrics;

/// Collection holding analyzer documents
pub const ANALYZERS_COLLECTION: &str = "analyzers";

/// Analyzer record: stored content plus metrics derived at creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Analyzer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    #[serde(flatten)]
    pub metrics: TextMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create analyzer request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnalyzer {
    pub content: String,
    pub created_by: Option<i64>,
}

/// Partial update of an analyzer
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnalyzer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<i64>,
}

/// Repository over [`ANALYZERS_COLLECTION`]
pub type AnalyzerRepository = Repository<Analyzer>;
