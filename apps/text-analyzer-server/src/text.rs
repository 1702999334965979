//! Raw text storage, without analysis

use chrono::Utc;

use crate::db::{CreateText, Text, TextRepository};
use crate::error::Result;

pub struct TextService {
    repo: TextRepository,
}

impl TextService {
    pub fn new(repo: TextRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &TextRepository {
        &self.repo
    }

    /// Store a text document as-is
    pub async fn create(&self, data: CreateText) -> Result<Text> {
        let now = Utc::now();
        let text = self
            .repo
            .create(&Text {
                id: None,
                content: data.content,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(id = ?text.id, "Text created");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{Filter, SqliteDocumentStore, TEXTS_COLLECTION};

    #[tokio::test]
    async fn test_create_text() {
        let store = SqliteDocumentStore::new(crate::db::memory_pool().await);
        let service = TextService::new(TextRepository::new(Arc::new(store), TEXTS_COLLECTION));

        let text = service
            .create(CreateText {
                content: "Just some words.".to_string(),
            })
            .await
            .unwrap();

        let id = text.id.clone().unwrap();
        let stored = service.repository().get(&id).await.unwrap().unwrap();
        assert_eq!(stored, text);
        assert_eq!(service.repository().count(&Filter::all()).await.unwrap(), 1);
    }
}
