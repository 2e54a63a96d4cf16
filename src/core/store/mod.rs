//! Document store abstraction
//!
//! Example datasets are written through the `DocumentStore` trait so the same
//! create/remove procedures run against a live ArangoDB server
//! ([`ArangoStore`]) or a local SQLite file ([`SqliteStore`]).

mod arango;
mod sqlite;
mod types;

pub use arango::ArangoStore;
pub use sqlite::SqliteStore;
pub use types::*;

use serde_json::Value;

/// Minimal collection/document/graph API used by the dataset catalog
pub trait DocumentStore {
    /// Create an empty collection
    fn create_collection(&self, name: &str, kind: CollectionKind) -> Result<(), StoreError>;

    /// Drop a collection and all of its documents
    fn drop_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Check whether a collection exists
    fn has_collection(&self, name: &str) -> Result<bool, StoreError>;

    /// List user collections with their document counts
    fn collections(&self) -> Result<Vec<CollectionInfo>, StoreError>;

    /// Insert a single document, generating `_key` when it is absent
    fn insert(&self, collection: &str, document: Value) -> Result<DocumentMeta, StoreError>;

    /// Insert documents in order, stopping at the first failure
    fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<Vec<DocumentMeta>, StoreError> {
        documents
            .into_iter()
            .map(|doc| self.insert(collection, doc))
            .collect()
    }

    /// Number of documents in a collection
    fn count(&self, collection: &str) -> Result<u64, StoreError>;

    /// All documents of a collection, including `_key` and `_id`
    fn documents(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Register a named graph, creating any collections it needs
    fn create_graph(&self, graph: &GraphDefinition) -> Result<(), StoreError>;

    /// Remove a named graph, optionally dropping the collections it uses
    fn drop_graph(&self, name: &str, drop_collections: bool) -> Result<(), StoreError>;
}

/// Check the edge attributes of a document bound for an edge collection
pub(crate) fn check_edge(collection: &str, document: &Value) -> Result<(), StoreError> {
    for attr in ["_from", "_to"] {
        match document.get(attr) {
            Some(Value::String(handle)) if handle.contains('/') => {}
            Some(_) => {
                return Err(StoreError::InvalidEdge {
                    collection: collection.to_string(),
                    reason: format!("'{}' is not a document handle", attr),
                })
            }
            None => {
                return Err(StoreError::InvalidEdge {
                    collection: collection.to_string(),
                    reason: format!("missing '{}'", attr),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_edge_accepts_handles() {
        let doc = json!({"_from": "persons/alice", "_to": "persons/bob"});
        assert!(check_edge("knows", &doc).is_ok());
    }

    #[test]
    fn test_check_edge_rejects_missing_and_bare_keys() {
        let missing = json!({"_from": "persons/alice"});
        assert!(matches!(
            check_edge("knows", &missing),
            Err(StoreError::InvalidEdge { .. })
        ));

        let bare = json!({"_from": "alice", "_to": "persons/bob"});
        assert!(check_edge("knows", &bare).is_err());
    }
}
