//! Types shared by all document store backends

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Collection flavour, numbered the way the ArangoDB REST API numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Document,
    Edge,
}

impl CollectionKind {
    /// Numeric collection type used on the wire (2 = document, 3 = edge)
    pub fn type_code(self) -> u8 {
        match self {
            CollectionKind::Document => 2,
            CollectionKind::Edge => 3,
        }
    }

    pub fn from_type_code(code: u64) -> Option<Self> {
        match code {
            2 => Some(CollectionKind::Document),
            3 => Some(CollectionKind::Edge),
            _ => None,
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionKind::Document => write!(f, "document"),
            CollectionKind::Edge => write!(f, "edge"),
        }
    }
}

/// Summary of one collection as reported by `DocumentStore::collections`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    pub kind: CollectionKind,
    pub count: u64,
}

/// Handle returned for every stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
}

impl DocumentMeta {
    pub fn new(collection: &str, key: &str) -> Self {
        Self {
            id: format!("{}/{}", collection, key),
            key: key.to_string(),
            rev: None,
        }
    }
}

/// One edge collection of a named graph and the vertex collections it connects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub collection: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
}

impl EdgeDefinition {
    pub fn new(collection: &str, from: &[&str], to: &[&str]) -> Self {
        Self {
            collection: collection.to_string(),
            from: from.iter().map(|s| s.to_string()).collect(),
            to: to.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A named graph: its edge definitions plus vertex collections without edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDefinition {
    pub name: String,
    pub edge_definitions: Vec<EdgeDefinition>,
    #[serde(default)]
    pub orphan_collections: Vec<String>,
}

impl GraphDefinition {
    /// Every collection the graph touches with its kind, edge collections last.
    /// Collections are listed once, in first-seen order.
    pub fn collections(&self) -> Vec<(String, CollectionKind)> {
        let mut out: Vec<(String, CollectionKind)> = Vec::new();
        let mut push = |name: &str, kind: CollectionKind| {
            if !out.iter().any(|(n, _)| n == name) {
                out.push((name.to_string(), kind));
            }
        };

        for def in &self.edge_definitions {
            for name in def.from.iter().chain(def.to.iter()) {
                push(name, CollectionKind::Document);
            }
        }
        for name in &self.orphan_collections {
            push(name, CollectionKind::Document);
        }
        for def in &self.edge_definitions {
            push(&def.collection, CollectionKind::Edge);
        }
        out
    }
}

/// Errors reported by a document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection or view not found: {0}")]
    CollectionNotFound(String),

    #[error("graph not found: {0}")]
    GraphNotFound(String),

    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("unique constraint violated in collection '{collection}' for key '{key}'")]
    UniqueConstraint { collection: String, key: String },

    #[error("invalid edge document in collection '{collection}': {reason}")]
    InvalidEdge { collection: String, reason: String },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("server error {code} (HTTP {status}): {message}")]
    Server {
        status: u16,
        code: i64,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True for the "does not exist" family of errors that teardown code tolerates
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::CollectionNotFound(_) | StoreError::GraphNotFound(_)
        )
    }

    /// True when the target of a create already exists
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateName(_) | StoreError::UniqueConstraint { .. }
        )
    }
}
