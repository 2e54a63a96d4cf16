//! ArangoDB-backed document store
//!
//! Talks to a live server through the collection, document, cursor and
//! gharial (named graph) endpoints of the current database.

use serde_json::{json, Value};
use tracing::debug;

use super::{
    CollectionInfo, CollectionKind, DocumentMeta, DocumentStore, GraphDefinition,
    StoreError,
};
use crate::core::client::{ApiError, ArangoClient};

// Server error numbers the store maps to typed errors
const ERROR_ARANGO_DATA_SOURCE_NOT_FOUND: i64 = 1203;
const ERROR_ARANGO_DUPLICATE_NAME: i64 = 1207;
const ERROR_ARANGO_UNIQUE_CONSTRAINT_VIOLATED: i64 = 1210;
const ERROR_GRAPH_NOT_FOUND: i64 = 1924;
const ERROR_GRAPH_DUPLICATE: i64 = 1925;

/// Documents fetched per cursor round trip
const CURSOR_BATCH_SIZE: u64 = 1000;

/// Document store backed by an ArangoDB server
pub struct ArangoStore {
    client: ArangoClient,
}

impl ArangoStore {
    pub fn new(client: ArangoClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ArangoClient {
        &self.client
    }
}

/// Map a collection-level API error to a store error
fn collection_error(name: &str, err: ApiError) -> StoreError {
    match err.code {
        ERROR_ARANGO_DATA_SOURCE_NOT_FOUND => StoreError::CollectionNotFound(name.to_string()),
        ERROR_ARANGO_DUPLICATE_NAME => StoreError::DuplicateName(name.to_string()),
        _ if err.status == 404 => StoreError::CollectionNotFound(name.to_string()),
        _ if err.status == 409 => StoreError::DuplicateName(name.to_string()),
        _ => err.into(),
    }
}

/// Map a document insert error; unique violations carry the offending key
fn document_error(collection: &str, key: Option<&str>, err: ApiError) -> StoreError {
    if err.code == ERROR_ARANGO_UNIQUE_CONSTRAINT_VIOLATED || err.status == 409 {
        return StoreError::UniqueConstraint {
            collection: collection.to_string(),
            key: key.unwrap_or_default().to_string(),
        };
    }
    collection_error(collection, err)
}

fn graph_error(name: &str, err: ApiError) -> StoreError {
    match err.code {
        ERROR_GRAPH_NOT_FOUND => StoreError::GraphNotFound(name.to_string()),
        ERROR_GRAPH_DUPLICATE | ERROR_ARANGO_DUPLICATE_NAME => {
            StoreError::DuplicateName(name.to_string())
        }
        _ if err.status == 404 => StoreError::GraphNotFound(name.to_string()),
        _ if err.status == 409 => StoreError::DuplicateName(name.to_string()),
        _ => err.into(),
    }
}

/// Decode a `{_id, _key, _rev}` insert result
fn document_meta(value: Value) -> Result<DocumentMeta, StoreError> {
    Ok(serde_json::from_value(value)?)
}

impl DocumentStore for ArangoStore {
    fn create_collection(&self, name: &str, kind: CollectionKind) -> Result<(), StoreError> {
        let body = json!({ "name": name, "type": kind.type_code() });
        self.client
            .post(&["collection"], &body)?
            .map_err(|e| collection_error(name, e))?;
        debug!(collection = name, %kind, "created collection");
        Ok(())
    }

    fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        self.client
            .delete(&["collection", name])?
            .map_err(|e| collection_error(name, e))?;
        debug!(collection = name, "dropped collection");
        Ok(())
    }

    fn has_collection(&self, name: &str) -> Result<bool, StoreError> {
        match self.client.get(&["collection", name])? {
            Ok(_) => Ok(true),
            Err(err) => match collection_error(name, err) {
                StoreError::CollectionNotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    fn collections(&self) -> Result<Vec<CollectionInfo>, StoreError> {
        let mut url = self.client.api_url(&["collection"])?;
        url.query_pairs_mut().append_pair("excludeSystem", "true");
        let body = self.client.send(reqwest::Method::GET, url, None)??;

        let mut out = Vec::new();
        for entry in body["result"].as_array().cloned().unwrap_or_default() {
            let Some(name) = entry["name"].as_str() else {
                continue;
            };
            let kind = entry["type"]
                .as_u64()
                .and_then(CollectionKind::from_type_code)
                .unwrap_or(CollectionKind::Document);
            out.push(CollectionInfo {
                name: name.to_string(),
                kind,
                count: self.count(name)?,
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn insert(&self, collection: &str, document: Value) -> Result<DocumentMeta, StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(format!(
                "expected an object, got {}",
                document
            )));
        }
        let key = document.get("_key").and_then(Value::as_str).map(str::to_string);
        let body = self
            .client
            .post(&["document", collection], &document)?
            .map_err(|e| document_error(collection, key.as_deref(), e))?;
        document_meta(body)
    }

    fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<Vec<DocumentMeta>, StoreError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(bad) = documents.iter().find(|d| !d.is_object()) {
            return Err(StoreError::InvalidDocument(format!(
                "expected an object, got {}",
                bad
            )));
        }

        let keys: Vec<Option<String>> = documents
            .iter()
            .map(|d| d.get("_key").and_then(Value::as_str).map(str::to_string))
            .collect();
        let body = self
            .client
            .post(&["document", collection], &Value::Array(documents))?
            .map_err(|e| document_error(collection, None, e))?;

        let results = match body {
            Value::Array(results) => results,
            other => {
                return Err(StoreError::InvalidDocument(format!(
                    "unexpected batch insert response: {}",
                    other
                )))
            }
        };

        // The server reports per-document failures inline
        let mut out = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            if result.get("error").and_then(Value::as_bool) == Some(true) {
                let err = ApiError {
                    status: 0,
                    code: result["errorNum"].as_i64().unwrap_or(0),
                    message: result["errorMessage"]
                        .as_str()
                        .unwrap_or("insert failed")
                        .to_string(),
                };
                let key = keys.get(index).cloned().flatten();
                return Err(document_error(collection, key.as_deref(), err));
            }
            out.push(document_meta(result)?);
        }
        Ok(out)
    }

    fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let body = self
            .client
            .get(&["collection", collection, "count"])?
            .map_err(|e| collection_error(collection, e))?;
        Ok(body["count"].as_u64().unwrap_or(0))
    }

    fn documents(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let query = json!({
            "query": "FOR doc IN @@collection RETURN doc",
            "bindVars": { "@collection": collection },
            "batchSize": CURSOR_BATCH_SIZE,
        });
        let mut batch = self
            .client
            .post(&["cursor"], &query)?
            .map_err(|e| collection_error(collection, e))?;

        let mut out = Vec::new();
        loop {
            if let Some(Value::Array(docs)) = batch.get_mut("result").map(Value::take) {
                out.extend(docs);
            }
            if batch["hasMore"].as_bool() != Some(true) {
                break;
            }
            let Some(id) = batch["id"].as_str().map(str::to_string) else {
                break;
            };
            let url = self.client.api_url(&["cursor", &id])?;
            batch = self.client.send(reqwest::Method::PUT, url, None)??;
        }
        Ok(out)
    }

    fn create_graph(&self, graph: &GraphDefinition) -> Result<(), StoreError> {
        let body = serde_json::to_value(graph)?;
        self.client
            .post(&["gharial"], &body)?
            .map_err(|e| graph_error(&graph.name, e))?;
        debug!(graph = %graph.name, "created graph");
        Ok(())
    }

    fn drop_graph(&self, name: &str, drop_collections: bool) -> Result<(), StoreError> {
        let mut url = self.client.api_url(&["gharial", name])?;
        url.query_pairs_mut()
            .append_pair("dropCollections", if drop_collections { "true" } else { "false" });
        self.client
            .send(reqwest::Method::DELETE, url, None)?
            .map_err(|e| graph_error(name, e))?;
        debug!(graph = name, drop_collections, "dropped graph");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, code: i64) -> ApiError {
        ApiError {
            status,
            code,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_collection_error_mapping() {
        assert!(matches!(
            collection_error("users", api_error(404, 1203)),
            StoreError::CollectionNotFound(name) if name == "users"
        ));
        assert!(matches!(
            collection_error("users", api_error(409, 1207)),
            StoreError::DuplicateName(_)
        ));
        assert!(matches!(
            collection_error("users", api_error(500, 4)),
            StoreError::Server { status: 500, code: 4, .. }
        ));
    }

    #[test]
    fn test_document_error_mapping() {
        let err = document_error("users", Some("John"), api_error(409, 1210));
        assert!(
            matches!(err, StoreError::UniqueConstraint { ref collection, ref key } if collection == "users" && key == "John")
        );
        assert!(document_error("users", None, api_error(404, 1203)).is_not_found());
    }

    #[test]
    fn test_graph_error_mapping() {
        assert!(graph_error("g", api_error(404, 1924)).is_not_found());
        assert!(graph_error("g", api_error(409, 1925)).is_duplicate());
        assert!(matches!(
            graph_error("g", api_error(403, 11)),
            StoreError::Server { .. }
        ));
    }
}
