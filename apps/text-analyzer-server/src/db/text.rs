//! Plain text documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::repository::Repository;

/// Collection holding text documents
pub const TEXTS_COLLECTION: &str = "texts";

/// Text record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create text request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateText {
    pub content: String,
}

/// Repository over [`TEXTS_COLLECTION`]
pub type TextRepository = Repository<Text>;
