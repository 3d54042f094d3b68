//! The remote store contract and an in-memory implementation.
//!
//! The remote store is an external collaborator exposing four operations
//! over named row collections. Anything implementing [`RemoteStore`] is
//! substitutable: the in-memory store below backs tests, and
//! `folio-remote` provides the `PostgREST`-backed implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::record::RecordId;

/// Errors surfaced by remote store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or answered with a transport-level
    /// failure.
    #[error("remote store unreachable: {0}")]
    RemoteUnavailable(String),
    /// The target collection does not exist in the remote store.
    #[error("collection '{collection}' does not exist in the remote store; create it before loading")]
    SchemaMissing {
        /// The collection the store does not know about.
        collection: String,
    },
    /// The store's access policy rejected the operation.
    #[error("access to '{collection}' was denied by the store's row policy; grant the editor role write access")]
    PermissionDenied {
        /// The collection the policy rejected.
        collection: String,
    },
    /// A row payload did not match the expected shape.
    #[error("malformed remote row: {0}")]
    RowDecode(String),
    /// A delete was attempted on a record that was never persisted.
    #[error("this record only exists locally and cannot be deleted from the store")]
    StaleDeleteTarget,
}

/// Asynchronous row store over named collections.
///
/// Rows travel as JSON objects. `insert` and `upsert` return the stored
/// row, including the identifier the store assigned.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch every row of a collection.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] describing why the collection could not
    /// be read.
    async fn select_all(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Insert a new row; the store assigns the identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] describing why the row was not stored.
    async fn insert(&self, collection: &str, row: Value) -> Result<Value, StoreError>;

    /// Insert or update a row. Rows carrying a known `id` update that row
    /// in place; rows without one insert.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] describing why the row was not stored.
    async fn upsert(&self, collection: &str, row: Value) -> Result<Value, StoreError>;

    /// Delete a row by identifier. Deleting an identifier the store does
    /// not know is a no-op, matching upstream row-store semantics.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] describing why the delete was refused.
    async fn delete(&self, collection: &str, id: RecordId) -> Result<(), StoreError>;
}

/// In-memory [`RemoteStore`] used by tests and local development.
///
/// Collections must be registered before use; touching an unregistered
/// collection fails with [`StoreError::SchemaMissing`], mirroring a real
/// store whose tables have not been created yet.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl MemoryStore {
    /// Create an empty store with no registered collections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given collections registered.
    #[must_use]
    pub fn with_collections<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let store = Self::new();
        for name in names {
            store.register(name);
        }
        store
    }

    /// Register a collection, creating it empty if absent.
    pub fn register(&self, collection: &str) {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        collections.entry(collection.to_string()).or_default();
    }

    /// Number of rows currently held by a collection (0 if unregistered).
    #[must_use]
    pub fn row_count(&self, collection: &str) -> usize {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        collections.get(collection).map_or(0, Vec::len)
    }

    fn with_rows<R>(
        &self,
        collection: &str,
        f: impl FnOnce(&mut Vec<Value>) -> R,
    ) -> Result<R, StoreError> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let rows = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::SchemaMissing {
                collection: collection.to_string(),
            })?;
        Ok(f(rows))
    }
}

fn value_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn with_assigned_id(mut row: Value, id: RecordId) -> Value {
    if let Some(object) = row.as_object_mut() {
        object.insert("id".to_string(), Value::String(id.to_string()));
    }
    row
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.with_rows(collection, |rows| rows.clone())
    }

    async fn insert(&self, collection: &str, row: Value) -> Result<Value, StoreError> {
        let stored = with_assigned_id(row, RecordId::new());
        self.with_rows(collection, |rows| {
            rows.push(stored.clone());
            stored
        })
    }

    async fn upsert(&self, collection: &str, row: Value) -> Result<Value, StoreError> {
        let incoming_id = value_id(&row).map(ToString::to_string);
        self.with_rows(collection, move |rows| match incoming_id {
            Some(id) => {
                if let Some(existing) = rows.iter_mut().find(|r| value_id(r) == Some(id.as_str())) {
                    *existing = row.clone();
                    row
                } else {
                    rows.push(row.clone());
                    row
                }
            }
            None => {
                let stored = with_assigned_id(row, RecordId::new());
                rows.push(stored.clone());
                stored
            }
        })
    }

    async fn delete(&self, collection: &str, id: RecordId) -> Result<(), StoreError> {
        let id = id.to_string();
        self.with_rows(collection, |rows| {
            rows.retain(|r| value_id(r) != Some(id.as_str()));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unregistered_collection_is_schema_missing() {
        let store = MemoryStore::new();
        let result = store.select_all("profiles").await;
        assert!(matches!(
            result,
            Err(StoreError::SchemaMissing { collection }) if collection == "profiles"
        ));
    }

    #[tokio::test]
    async fn test_insert_assigns_an_id() {
        let store = MemoryStore::with_collections(["projects"]);
        let stored = store
            .insert("projects", json!({ "title": "One" }))
            .await
            .expect("insert");
        let id = stored.get("id").and_then(Value::as_str).expect("id string");
        assert!(RecordId::parse(id).is_ok());
        assert_eq!(store.row_count("projects"), 1);
    }

    #[tokio::test]
    async fn test_upsert_without_id_inserts() {
        let store = MemoryStore::with_collections(["projects"]);
        store
            .upsert("projects", json!({ "title": "One" }))
            .await
            .expect("upsert");
        assert_eq!(store.row_count("projects"), 1);
    }

    #[tokio::test]
    async fn test_upsert_with_known_id_updates_in_place() {
        let store = MemoryStore::with_collections(["projects"]);
        let stored = store
            .insert("projects", json!({ "title": "One" }))
            .await
            .expect("insert");
        let id = stored.get("id").cloned().expect("id");

        let updated = store
            .upsert("projects", json!({ "id": id, "title": "Two" }))
            .await
            .expect("upsert");
        assert_eq!(updated.get("title").and_then(Value::as_str), Some("Two"));
        assert_eq!(store.row_count("projects"), 1);

        let rows = store.select_all("projects").await.expect("select");
        assert_eq!(rows[0].get("title").and_then(Value::as_str), Some("Two"));
    }

    #[tokio::test]
    async fn test_delete_removes_matching_row_only() {
        let store = MemoryStore::with_collections(["projects"]);
        let first = store
            .insert("projects", json!({ "title": "One" }))
            .await
            .expect("insert");
        store
            .insert("projects", json!({ "title": "Two" }))
            .await
            .expect("insert");

        let id = RecordId::parse(first.get("id").and_then(Value::as_str).expect("id"))
            .expect("parse");
        store.delete("projects", id).await.expect("delete");
        assert_eq!(store.row_count("projects"), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_a_noop() {
        let store = MemoryStore::with_collections(["projects"]);
        store
            .insert("projects", json!({ "title": "One" }))
            .await
            .expect("insert");
        store
            .delete("projects", RecordId::new())
            .await
            .expect("delete");
        assert_eq!(store.row_count("projects"), 1);
    }
}
