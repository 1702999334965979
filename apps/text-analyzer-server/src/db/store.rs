//! Generic document store
//!
//! Collections of JSON documents addressed by a store-assigned identifier.
//! Returned documents always carry that identifier in their `id` field.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Field holding the store identifier in returned documents
pub const ID_FIELD: &str = "id";

/// Document predicate: optional identifier plus top-level field equality
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub id: Option<Uuid>,
    pub fields: Vec<(String, Value)>,
}

impl Filter {
    /// Match every document in the collection
    pub fn all() -> Self {
        Self::default()
    }

    /// Match the document with this identifier
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Additionally require `field == value`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }
}

/// Options for [`DocumentStore::find`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FindOptions {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    /// Newest first instead of insertion order
    pub descending: bool,
}

/// Outcome of a single-document update
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Outcome of a single-document delete
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Collection-oriented document storage
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `doc` and return it with its assigned `id`
    async fn create(&self, collection: &str, doc: Value) -> Result<Value>;

    /// All documents matching `filter`
    async fn find(&self, collection: &str, filter: &Filter, options: &FindOptions)
        -> Result<Vec<Value>>;

    /// First document matching `filter`
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>>;

    /// Merge `patch` into the first document matching `filter`
    async fn update(&self, collection: &str, filter: &Filter, patch: Value) -> Result<UpdateResult>;

    /// Remove the first document matching `filter`
    async fn delete(&self, collection: &str, filter: &Filter) -> Result<DeleteResult>;

    /// Number of documents matching `filter`
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64>;
}

/// [`DocumentStore`] over the `documents` table
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Value bound to a placeholder
enum Bind {
    Text(String),
    Integer(i64),
    Real(f64),
}

/// Build `WHERE` conditions for `filter`
fn where_clause(collection: &str, filter: &Filter) -> (String, Vec<Bind>) {
    let mut clauses = vec!["collection = ?".to_string()];
    let mut binds = vec![Bind::Text(collection.to_string())];

    if let Some(id) = filter.id {
        clauses.push("id = ?".to_string());
        binds.push(Bind::Text(id.to_string()));
    }

    for (field, value) in &filter.fields {
        let path = Bind::Text(format!("$.\"{}\"", field.replace('"', "")));
        match value {
            Value::Null => {
                clauses.push("json_extract(body, ?) IS NULL".to_string());
                binds.push(path);
            }
            Value::Bool(b) => {
                clauses.push("json_extract(body, ?) = ?".to_string());
                binds.push(path);
                binds.push(Bind::Integer(i64::from(*b)));
            }
            Value::Number(n) => {
                clauses.push("json_extract(body, ?) = ?".to_string());
                binds.push(path);
                binds.push(match n.as_i64() {
                    Some(i) => Bind::Integer(i),
                    None => Bind::Real(n.as_f64().unwrap_or(f64::NAN)),
                });
            }
            Value::String(s) => {
                clauses.push("json_extract(body, ?) = ?".to_string());
                binds.push(path);
                binds.push(Bind::Text(s.clone()));
            }
            Value::Array(_) | Value::Object(_) => {
                clauses.push("json_extract(body, ?) = json(?)".to_string());
                binds.push(path);
                binds.push(Bind::Text(value.to_string()));
            }
        }
    }

    (clauses.join(" AND "), binds)
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    binds: Vec<Bind>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for bind in binds {
        query = match bind {
            Bind::Text(s) => query.bind(s),
            Bind::Integer(i) => query.bind(i),
            Bind::Real(f) => query.bind(f),
        };
    }
    query
}

/// Strip the identifier from an incoming document body
fn into_body(doc: Value) -> Result<Map<String, Value>> {
    match doc {
        Value::Object(mut map) => {
            map.remove(ID_FIELD);
            map.remove("_id");
            Ok(map)
        }
        other => Err(AppError::Internal(format!(
            "document must be a JSON object, got {}",
            other
        ))),
    }
}

/// Rebuild a stored row into a document carrying its `id`
fn from_row(row: &SqliteRow) -> Result<Value> {
    let id: String = row.try_get("id")?;
    let body: String = row.try_get("body")?;

    let mut map = match serde_json::from_str::<Value>(&body)? {
        Value::Object(map) => map,
        _ => {
            return Err(AppError::Internal(format!(
                "stored document {} is not an object",
                id
            )))
        }
    };
    map.insert(ID_FIELD.to_string(), Value::String(id));

    Ok(Value::Object(map))
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create(&self, collection: &str, doc: Value) -> Result<Value> {
        let mut body = into_body(doc)?;
        let id = Uuid::new_v4().to_string();
        let serialized = serde_json::to_string(&body)?;

        let result = sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(collection)
            .bind(&id)
            .bind(&serialized)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::Internal("Failed to insert".to_string()));
        }

        tracing::debug!(collection, %id, "Document created");
        body.insert(ID_FIELD.to_string(), Value::String(id));
        Ok(Value::Object(body))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Value>> {
        let (conditions, mut binds) = where_clause(collection, filter);
        let sql = format!(
            "SELECT id, body FROM documents WHERE {} ORDER BY seq {} LIMIT ? OFFSET ?",
            conditions,
            if options.descending { "DESC" } else { "ASC" }
        );

        // SQLite treats a negative LIMIT as unbounded
        let limit = options
            .limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        let skip = options
            .skip
            .map(|s| i64::try_from(s).unwrap_or(i64::MAX))
            .unwrap_or(0);
        binds.push(Bind::Integer(limit));
        binds.push(Bind::Integer(skip));

        let rows = bind_all(sqlx::query(&sql), binds)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(from_row).collect()
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
        let (conditions, binds) = where_clause(collection, filter);
        let sql = format!(
            "SELECT id, body FROM documents WHERE {} ORDER BY seq ASC LIMIT 1",
            conditions
        );

        let row = bind_all(sqlx::query(&sql), binds)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(from_row).transpose()
    }

    async fn update(&self, collection: &str, filter: &Filter, patch: Value) -> Result<UpdateResult> {
        let patch = serde_json::to_string(&into_body(patch)?)?;
        let (conditions, where_binds) = where_clause(collection, filter);
        let sql = format!(
            "UPDATE documents SET body = json_patch(body, ?) \
             WHERE seq = (SELECT seq FROM documents WHERE {} ORDER BY seq ASC LIMIT 1)",
            conditions
        );

        let mut binds = vec![Bind::Text(patch)];
        binds.extend(where_binds);

        let result = bind_all(sqlx::query(&sql), binds)
            .execute(&self.pool)
            .await?;

        let affected = result.rows_affected();
        Ok(UpdateResult {
            acknowledged: true,
            matched_count: affected,
            modified_count: affected,
        })
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<DeleteResult> {
        let (conditions, binds) = where_clause(collection, filter);
        let sql = format!(
            "DELETE FROM documents \
             WHERE seq = (SELECT seq FROM documents WHERE {} ORDER BY seq ASC LIMIT 1)",
            conditions
        );

        let result = bind_all(sqlx::query(&sql), binds)
            .execute(&self.pool)
            .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let (conditions, binds) = where_clause(collection, filter);
        let sql = format!("SELECT COUNT(*) AS total FROM documents WHERE {}", conditions);

        let row = bind_all(sqlx::query(&sql), binds)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;

        Ok(u64::try_from(total).unwrap_or(0))
    }
}
