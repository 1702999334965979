//! Typed repository over one collection

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::store::{DeleteResult, DocumentStore, Filter, FindOptions, UpdateResult};
use crate::error::{AppError, Result};

/// Convert an entity identifier into the store's native identifier
pub fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|e| AppError::InvalidIdentifier(format!("{}: {}", id, e)))
}

/// Repository bound to one collection and one entity shape
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    collection: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collection: self.collection,
            _entity: PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>, collection: &'static str) -> Self {
        Self {
            store,
            collection,
            _entity: PhantomData,
        }
    }

    /// Collection this repository is bound to
    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// Store an entity; the returned copy carries the assigned id
    pub async fn create(&self, entity: &T) -> Result<T> {
        let doc = serde_json::to_value(entity)?;
        let stored = self.store.create(self.collection, doc).await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Look up an entity; `Ok(None)` when absent
    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        let filter = Filter::by_id(parse_id(id)?);
        match self.store.find_one(self.collection, &filter).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Apply a partial patch and refresh `updatedAt`
    ///
    /// Derived fields are left as they are.
    pub async fn update<P: Serialize>(&self, id: &str, patch: &P) -> Result<UpdateResult> {
        let filter = Filter::by_id(parse_id(id)?);

        let mut patch = match serde_json::to_value(patch)? {
            Value::Object(map) => map,
            other => {
                return Err(AppError::Internal(format!(
                    "update patch must be an object, got {}",
                    other
                )))
            }
        };
        patch.insert(
            "updatedAt".to_string(),
            serde_json::to_value(Utc::now())?,
        );

        self.store
            .update(self.collection, &filter, Value::Object(patch))
            .await
    }

    /// Remove an entity
    pub async fn delete(&self, id: &str) -> Result<DeleteResult> {
        let filter = Filter::by_id(parse_id(id)?);
        self.store.delete(self.collection, &filter).await
    }

    /// Number of entities matching `filter`
    pub async fn count(&self, filter: &Filter) -> Result<u64> {
        self.store.count(self.collection, filter).await
    }

    /// Entities in insertion order
    pub async fn list(&self, options: &FindOptions) -> Result<Vec<T>> {
        self.store
            .find(self.collection, &Filter::all(), options)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteDocumentStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Note {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        updated_at: Option<String>,
    }

    async fn setup_repo() -> Repository<Note> {
        let store = SqliteDocumentStore::new(crate::db::memory_pool().await);
        Repository::new(Arc::new(store), "notes")
    }

    fn note(body: &str) -> Note {
        Note {
            id: None,
            body: body.to_string(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup_repo().await;

        let created = repo.create(&note("first")).await.unwrap();
        let id = created.id.clone().unwrap();

        let loaded = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let repo = setup_repo().await;
        let missing = Uuid::new_v4().to_string();

        assert!(repo.get(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_id_is_an_error() {
        let repo = setup_repo().await;

        let err = repo.get("64adf93310b25c3878d7be5z").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidIdentifier(_)));

        let err = repo.delete("nope").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_update_stamps_updated_at() {
        let repo = setup_repo().await;
        let created = repo.create(&note("before")).await.unwrap();
        let id = created.id.clone().unwrap();

        let result = repo
            .update(&id, &serde_json::json!({ "body": "after" }))
            .await
            .unwrap();
        assert_eq!(result.modified_count, 1);

        let loaded = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.body, "after");
        assert!(loaded.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let repo = setup_repo().await;
        let created = repo.create(&note("doomed")).await.unwrap();
        let id = created.id.unwrap();

        let result = repo.delete(&id).await.unwrap();
        assert_eq!(result.deleted_count, 1);
        assert!(repo.get(&id).await.unwrap().is_none());

        let again = repo.delete(&id).await.unwrap();
        assert_eq!(again.deleted_count, 0);
    }

    #[tokio::test]
    async fn test_count_and_list() {
        let repo = setup_repo().await;
        for body in ["a", "b", "c"] {
            repo.create(&note(body)).await.unwrap();
        }

        assert_eq!(repo.count(&Filter::all()).await.unwrap(), 3);
        assert_eq!(repo.count(&Filter::all().eq("body", "b")).await.unwrap(), 1);

        let listed = repo.list(&FindOptions::default()).await.unwrap();
        let bodies: Vec<_> = listed.iter().map(|n| n.body.as_str()).collect();
        assert_eq!(bodies, vec!["a", "b", "c"]);
    }
}
