//! SQLite-backed document store
//!
//! A local stand-in for a database server:
//! - Collections are rows in `collections` (name + kind)
//! - Documents are stored as JSON text keyed by (collection, key)
//! - Named graphs keep their definition as JSON
//!
//! Insertion order is preserved so `documents()` returns what was written,
//! in the order it was written.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use super::{
    check_edge, CollectionInfo, CollectionKind, DocumentMeta, DocumentStore, GraphDefinition,
    StoreError,
};

/// Current schema version, recorded on first open
const SCHEMA_VERSION: i32 = 1;

/// Document store backed by a SQLite database
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store file
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::InvalidDocument(format!(
                        "cannot create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        debug!(path = %path.display(), "opened sqlite store");

        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create a throwaway store that lives only as long as the value
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS collections (
                name TEXT PRIMARY KEY,
                kind TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                doc_key TEXT NOT NULL,
                body TEXT NOT NULL,
                UNIQUE (collection, doc_key)
            );
            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);

            CREATE TABLE IF NOT EXISTS graphs (
                name TEXT PRIMARY KEY,
                definition TEXT NOT NULL
            );
            "#,
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    fn collection_kind(&self, name: &str) -> Result<Option<CollectionKind>, StoreError> {
        let kind: Option<String> = self
            .conn
            .query_row(
                "SELECT kind FROM collections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(kind.map(|k| parse_kind(&k)))
    }

    fn require_collection(&self, name: &str) -> Result<CollectionKind, StoreError> {
        self.collection_kind(name)?
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }
}

fn parse_kind(kind: &str) -> CollectionKind {
    if kind == "edge" {
        CollectionKind::Edge
    } else {
        CollectionKind::Document
    }
}

/// Pull the document key out of `_key`, or generate one
fn document_key(document: &Value) -> Result<String, StoreError> {
    match document.get("_key") {
        None => Ok(ulid::Ulid::new().to_string()),
        Some(Value::String(key)) if !key.is_empty() && !key.contains('/') => Ok(key.clone()),
        Some(other) => Err(StoreError::InvalidDocument(format!(
            "illegal document key: {}",
            other
        ))),
    }
}

impl DocumentStore for SqliteStore {
    fn create_collection(&self, name: &str, kind: CollectionKind) -> Result<(), StoreError> {
        if self.collection_kind(name)?.is_some() {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        self.conn.execute(
            "INSERT INTO collections (name, kind) VALUES (?1, ?2)",
            params![name, kind.to_string()],
        )?;
        debug!(collection = name, %kind, "created collection");
        Ok(())
    }

    fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        self.require_collection(name)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM documents WHERE collection = ?1", params![name])?;
        tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        tx.commit()?;
        debug!(collection = name, "dropped collection");
        Ok(())
    }

    fn has_collection(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.collection_kind(name)?.is_some())
    }

    fn collections(&self) -> Result<Vec<CollectionInfo>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.name, c.kind, COUNT(d.seq) FROM collections c
             LEFT JOIN documents d ON d.collection = c.name
             GROUP BY c.name, c.kind ORDER BY c.name",
        )?;
        let rows = stmt.query_map([], |row| {
            let name: String = row.get(0)?;
            let kind: String = row.get(1)?;
            let count: i64 = row.get(2)?;
            Ok(CollectionInfo {
                name,
                kind: parse_kind(&kind),
                count: count as u64,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn insert(&self, collection: &str, document: Value) -> Result<DocumentMeta, StoreError> {
        let kind = self.require_collection(collection)?;

        let mut document = match document {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidDocument(format!(
                    "expected an object, got {}",
                    other
                )))
            }
        };
        let value = Value::Object(document.clone());
        if kind == CollectionKind::Edge {
            check_edge(collection, &value)?;
        }

        let key = document_key(&value)?;
        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT seq FROM documents WHERE collection = ?1 AND doc_key = ?2",
                params![collection, key],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(StoreError::UniqueConstraint {
                collection: collection.to_string(),
                key,
            });
        }

        let meta = DocumentMeta::new(collection, &key);
        document.insert("_key".to_string(), Value::String(meta.key.clone()));
        document.insert("_id".to_string(), Value::String(meta.id.clone()));
        let body = serde_json::to_string(&Value::Object(document))?;

        self.conn.execute(
            "INSERT INTO documents (collection, doc_key, body) VALUES (?1, ?2, ?3)",
            params![collection, key, body],
        )?;
        Ok(meta)
    }

    fn count(&self, collection: &str) -> Result<u64, StoreError> {
        self.require_collection(collection)?;
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn documents(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.require_collection(collection)?;
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY seq")?;
        let bodies = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for body in bodies {
            out.push(serde_json::from_str(&body?)?);
        }
        Ok(out)
    }

    fn create_graph(&self, graph: &GraphDefinition) -> Result<(), StoreError> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM graphs WHERE name = ?1",
                params![graph.name],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(StoreError::DuplicateName(graph.name.clone()));
        }

        for (name, kind) in graph.collections() {
            match self.collection_kind(&name)? {
                None => self.create_collection(&name, kind)?,
                Some(found) if found != kind => {
                    return Err(StoreError::InvalidDocument(format!(
                        "collection '{}' is a {} collection, graph '{}' needs {}",
                        name, found, graph.name, kind
                    )))
                }
                Some(_) => {}
            }
        }

        let definition = serde_json::to_string(graph)?;
        self.conn.execute(
            "INSERT INTO graphs (name, definition) VALUES (?1, ?2)",
            params![graph.name, definition],
        )?;
        debug!(graph = %graph.name, "created graph");
        Ok(())
    }

    fn drop_graph(&self, name: &str, drop_collections: bool) -> Result<(), StoreError> {
        let definition: Option<String> = self
            .conn
            .query_row(
                "SELECT definition FROM graphs WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        let definition: GraphDefinition = match definition {
            Some(text) => serde_json::from_str(&text)?,
            None => return Err(StoreError::GraphNotFound(name.to_string())),
        };

        self.conn
            .execute("DELETE FROM graphs WHERE name = ?1", params![name])?;

        if drop_collections {
            let shared = self.graph_collections()?;
            for (collection, _) in definition.collections() {
                if shared.contains(&collection) {
                    debug!(graph = name, %collection, "collection kept, used by another graph");
                    continue;
                }
                if self.has_collection(&collection)? {
                    self.drop_collection(&collection)?;
                }
            }
        }
        debug!(graph = name, drop_collections, "dropped graph");
        Ok(())
    }
}

impl SqliteStore {
    /// Collections referenced by any registered graph
    fn graph_collections(&self) -> Result<HashSet<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT definition FROM graphs")?;
        let definitions = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut names = HashSet::new();
        for text in definitions {
            let graph: GraphDefinition = serde_json::from_str(&text)?;
            names.extend(graph.collections().into_iter().map(|(name, _)| name));
        }
        Ok(names)
    }
}
