//! Catalog of example datasets
//!
//! Every dataset is a pair of procedures: `create` writes a fixed set of
//! collections and documents and lets any failure propagate, `remove` drops
//! what `create` made and swallows every failure, so removing a dataset that
//! was never created is a no-op.

pub mod graphs;
pub mod samples;
pub mod users;

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::store::{DocumentStore, StoreError};

pub use graphs::{drop_graph, example_graph, load_graph, ExampleGraph, GRAPH_NAMES};

/// What a dataset is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    /// A named graph loaded through the graph helper
    Graph,
    /// Plain document collections
    Collections,
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetKind::Graph => write!(f, "graph"),
            DatasetKind::Collections => write!(f, "collections"),
        }
    }
}

/// A named pair of setup/teardown procedures
#[derive(Clone, Copy)]
pub struct Dataset {
    pub name: &'static str,
    pub kind: DatasetKind,
    pub description: &'static str,
    /// Collections written by `create` (and dropped by `remove`)
    pub collections: &'static [&'static str],
    create: fn(&dyn DocumentStore) -> Result<(), StoreError>,
    remove: fn(&dyn DocumentStore),
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("collections", &self.collections)
            .finish()
    }
}

impl Dataset {
    /// Populate the store; failures propagate unchanged
    pub fn create(&self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        debug!(dataset = self.name, "creating dataset");
        (self.create)(store)?;
        info!(dataset = self.name, "dataset created");
        Ok(())
    }

    /// Remove everything `create` wrote, ignoring failures
    pub fn remove(&self, store: &dyn DocumentStore) {
        debug!(dataset = self.name, "removing dataset");
        (self.remove)(store);
    }
}

/// Errors from catalog lookups and dataset creation
#[derive(Debug, Error, Diagnostic)]
pub enum DatasetError {
    #[error("Unknown dataset: {name}")]
    #[diagnostic(
        code(arex::datasets::unknown),
        help("Available datasets: {available}")
    )]
    UnknownDataset { name: String, available: String },

    #[error("Failed to create dataset {name}: {source}")]
    #[diagnostic(code(arex::datasets::create_failed))]
    CreateFailed {
        name: String,
        #[source]
        source: StoreError,
    },
}

/// Drop a collection, discarding any error
pub(crate) fn drop_quietly(store: &dyn DocumentStore, collection: &str) {
    if let Err(e) = store.drop_collection(collection) {
        debug!(collection, error = %e, "collection drop ignored");
    }
}

macro_rules! graph_dataset {
    ($name:literal, $description:literal, [$($collection:literal),* $(,)?]) => {
        Dataset {
            name: $name,
            kind: DatasetKind::Graph,
            description: $description,
            collections: &[$($collection),*],
            create: |store| load_graph(store, $name).map(|_| ()),
            remove: |store| drop_graph(store, $name),
        }
    };
}

static CATALOG: [Dataset; 9] = [
    graph_dataset!(
        "traversalGraph",
        "Binary tree of circles for traversal examples",
        ["circles", "edges"]
    ),
    graph_dataset!(
        "kShortestPathsGraph",
        "European and Canadian train connections with travel times",
        ["places", "connections"]
    ),
    graph_dataset!(
        "mps_graph",
        "Small DAG for multiple-path searches",
        ["mps_verts", "mps_edges"]
    ),
    graph_dataset!(
        "knows_graph",
        "Five people and who knows whom",
        ["persons", "knows"]
    ),
    graph_dataset!(
        "routeplanner",
        "German and French cities connected by highways",
        [
            "germanCity",
            "frenchCity",
            "germanHighway",
            "frenchHighway",
            "internationalHighway"
        ]
    ),
    graph_dataset!(
        "connectedComponentsGraph",
        "Three weakly connected components",
        ["components", "componentEdges"]
    ),
    Dataset {
        name: "joinSampleDataset",
        kind: DatasetKind::Collections,
        description: "Users and friendship relations for join queries",
        collections: &["users", "relations"],
        create: samples::create_join_sample,
        remove: |store| {
            drop_quietly(store, "users");
            drop_quietly(store, "relations");
        },
    },
    Dataset {
        name: "observationsSampleDataset",
        kind: DatasetKind::Collections,
        description: "Sensor readings for window aggregation",
        collections: &["observations"],
        create: samples::create_observations_sample,
        remove: |store| drop_quietly(store, "observations"),
    },
    Dataset {
        name: "usersDataset",
        kind: DatasetKind::Collections,
        description: "Generated user profiles with regions and locations",
        collections: &["users", "regions", "locations"],
        create: users::create_users_dataset,
        remove: |store| {
            drop_quietly(store, "users");
            drop_quietly(store, "regions");
            drop_quietly(store, "locations");
        },
    },
];

/// All datasets, in catalog order
pub fn catalog() -> &'static [Dataset] {
    &CATALOG
}

/// Names of all datasets, in catalog order
pub fn names() -> Vec<&'static str> {
    CATALOG.iter().map(|d| d.name).collect()
}

/// Look up a dataset by exact name
pub fn find(name: &str) -> Result<&'static Dataset, DatasetError> {
    CATALOG
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| DatasetError::UnknownDataset {
            name: name.to_string(),
            available: names().join(", "),
        })
}

/// Create the named dataset
pub fn create(name: &str, store: &dyn DocumentStore) -> Result<(), DatasetError> {
    let dataset = find(name)?;
    dataset
        .create(store)
        .map_err(|source| DatasetError::CreateFailed {
            name: name.to_string(),
            source,
        })
}

/// Remove the named dataset; only an unknown name is an error
pub fn remove(name: &str, store: &dyn DocumentStore) -> Result<(), DatasetError> {
    find(name)?.remove(store);
    Ok(())
}
