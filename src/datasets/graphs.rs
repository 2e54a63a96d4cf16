//! Example graphs used by the graph tutorials
//!
//! Each graph is a named graph definition plus fixed vertex and edge
//! documents. [`load_graph`] registers the graph (which creates its
//! collections) and inserts the documents; [`drop_graph`] removes the graph
//! together with its collections and tolerates anything already gone.

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::core::store::{DocumentStore, EdgeDefinition, GraphDefinition, StoreError};

/// Names of all example graphs, in catalog order
pub const GRAPH_NAMES: &[&str] = &[
    "traversalGraph",
    "kShortestPathsGraph",
    "mps_graph",
    "knows_graph",
    "routeplanner",
    "connectedComponentsGraph",
];

/// A graph definition with the documents that populate it
#[derive(Debug, Clone)]
pub struct ExampleGraph {
    pub definition: GraphDefinition,
    /// Vertex documents per vertex collection
    pub vertices: Vec<(String, Vec<Value>)>,
    /// Edge documents per edge collection
    pub edges: Vec<(String, Vec<Value>)>,
}

impl ExampleGraph {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Total vertices across all vertex collections
    pub fn vertex_count(&self) -> usize {
        self.vertices.iter().map(|(_, docs)| docs.len()).sum()
    }

    /// Total edges across all edge collections
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(|(_, docs)| docs.len()).sum()
    }
}

/// Look up an example graph by name
pub fn example_graph(name: &str) -> Option<ExampleGraph> {
    match name {
        "traversalGraph" => Some(traversal_graph()),
        "kShortestPathsGraph" => Some(k_shortest_paths_graph()),
        "mps_graph" => Some(mps_graph()),
        "knows_graph" => Some(knows_graph()),
        "routeplanner" => Some(routeplanner()),
        "connectedComponentsGraph" => Some(connected_components_graph()),
        _ => None,
    }
}

/// Create the named example graph and insert its documents
pub fn load_graph(store: &dyn DocumentStore, name: &str) -> Result<ExampleGraph, StoreError> {
    let graph = example_graph(name).ok_or_else(|| StoreError::GraphNotFound(name.to_string()))?;

    store.create_graph(&graph.definition)?;
    for (collection, docs) in &graph.vertices {
        store.insert_many(collection, docs.clone())?;
    }
    for (collection, docs) in &graph.edges {
        store.insert_many(collection, docs.clone())?;
    }

    info!(
        graph = name,
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "loaded example graph"
    );
    Ok(graph)
}

/// Drop the named example graph and its collections, ignoring failures
pub fn drop_graph(store: &dyn DocumentStore, name: &str) {
    if let Err(e) = store.drop_graph(name, true) {
        debug!(graph = name, error = %e, "graph drop ignored");
    }

    // Collections may outlive the graph after a partial load
    if let Some(graph) = example_graph(name) {
        for (collection, _) in graph.definition.collections() {
            if let Err(e) = store.drop_collection(&collection) {
                debug!(collection = %collection, error = %e, "collection drop ignored");
            }
        }
    }
}

fn definition(name: &str, edges: Vec<EdgeDefinition>) -> GraphDefinition {
    GraphDefinition {
        name: name.to_string(),
        edge_definitions: edges,
        orphan_collections: Vec::new(),
    }
}

/// Edge document between two vertices, plus extra attributes
fn edge(from: (&str, &str), to: (&str, &str), attributes: Value) -> Value {
    let mut doc = json!({
        "_from": format!("{}/{}", from.0, from.1),
        "_to": format!("{}/{}", to.0, to.1),
    });
    if let (Some(doc), Value::Object(extra)) = (doc.as_object_mut(), attributes) {
        doc.extend(extra);
    }
    doc
}

fn knows_graph() -> ExampleGraph {
    let persons: Vec<Value> = [
        ("alice", "Alice"),
        ("bob", "Bob"),
        ("charlie", "Charlie"),
        ("dave", "Dave"),
        ("eve", "Eve"),
    ]
    .into_iter()
    .map(|(key, name)| json!({"_key": key, "name": name}))
    .collect();

    let knows: Vec<Value> = [
        ("alice", "bob"),
        ("bob", "charlie"),
        ("bob", "dave"),
        ("eve", "alice"),
        ("eve", "bob"),
    ]
    .into_iter()
    .map(|(from, to)| edge(("persons", from), ("persons", to), json!({})))
    .collect();

    ExampleGraph {
        definition: definition(
            "knows_graph",
            vec![EdgeDefinition::new("knows", &["persons"], &["persons"])],
        ),
        vertices: vec![("persons".into(), persons)],
        edges: vec![("knows".into(), knows)],
    }
}

fn traversal_graph() -> ExampleGraph {
    let circles: Vec<Value> = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K"]
        .into_iter()
        .enumerate()
        .map(|(i, key)| json!({"_key": key, "label": (i + 1).to_string()}))
        .collect();

    let edges: Vec<Value> = [
        ("A", "B", "left_bar"),
        ("B", "C", "left_blarg"),
        ("C", "D", "left_blorg"),
        ("B", "E", "left_blub"),
        ("E", "F", "left_schubi"),
        ("A", "G", "right_foo"),
        ("G", "H", "right_blob"),
        ("H", "I", "right_blub"),
        ("G", "J", "right_zip"),
        ("J", "K", "right_zup"),
    ]
    .into_iter()
    .map(|(from, to, label)| {
        edge(
            ("circles", from),
            ("circles", to),
            json!({"theFalse": false, "theTruth": true, "label": label}),
        )
    })
    .collect();

    ExampleGraph {
        definition: definition(
            "traversalGraph",
            vec![EdgeDefinition::new("edges", &["circles"], &["circles"])],
        ),
        vertices: vec![("circles".into(), circles)],
        edges: vec![("edges".into(), edges)],
    }
}

fn k_shortest_paths_graph() -> ExampleGraph {
    let places: Vec<Value> = [
        ("Inverness", "Inverness"),
        ("Aberdeen", "Aberdeen"),
        ("Leuchars", "Leuchars"),
        ("StAndrews", "St Andrews"),
        ("Edinburgh", "Edinburgh"),
        ("Glasgow", "Glasgow"),
        ("York", "York"),
        ("Carlisle", "Carlisle"),
        ("Birmingham", "Birmingham"),
        ("London", "London"),
        ("Brussels", "Brussels"),
        ("Cologne", "Cologne"),
        ("Toronto", "Toronto"),
        ("Winnipeg", "Winnipeg"),
        ("Saskatoon", "Saskatoon"),
        ("Edmonton", "Edmonton"),
        ("Jasper", "Jasper"),
        ("Vancouver", "Vancouver"),
    ]
    .into_iter()
    .map(|(key, label)| json!({"_key": key, "label": label}))
    .collect();

    // Every connection runs both ways
    let connections: Vec<Value> = [
        ("Inverness", "Aberdeen", 3.0),
        ("Aberdeen", "Leuchars", 1.5),
        ("Leuchars", "Edinburgh", 1.5),
        ("Edinburgh", "Glasgow", 1.0),
        ("Edinburgh", "York", 3.5),
        ("Glasgow", "Carlisle", 1.0),
        ("Carlisle", "York", 2.5),
        ("Carlisle", "Birmingham", 2.0),
        ("Birmingham", "London", 1.5),
        ("Leuchars", "StAndrews", 0.2),
        ("York", "London", 1.8),
        ("London", "Brussels", 2.5),
        ("Brussels", "Cologne", 2.0),
        ("Toronto", "Winnipeg", 36.0),
        ("Winnipeg", "Saskatoon", 12.0),
        ("Saskatoon", "Edmonton", 12.0),
        ("Edmonton", "Jasper", 6.0),
        ("Jasper", "Vancouver", 12.0),
    ]
    .into_iter()
    .flat_map(|(a, b, hours)| {
        [
            edge(("places", a), ("places", b), json!({"travelTime": hours})),
            edge(("places", b), ("places", a), json!({"travelTime": hours})),
        ]
    })
    .collect();

    ExampleGraph {
        definition: definition(
            "kShortestPathsGraph",
            vec![EdgeDefinition::new("connections", &["places"], &["places"])],
        ),
        vertices: vec![("places".into(), places)],
        edges: vec![("connections".into(), connections)],
    }
}

fn mps_graph() -> ExampleGraph {
    let verts: Vec<Value> = ["A", "B", "C", "D", "E", "F"]
        .into_iter()
        .map(|key| json!({"_key": key}))
        .collect();

    let edges = [
        ("A", "B"),
        ("A", "E"),
        ("A", "D"),
        ("B", "C"),
        ("D", "C"),
        ("C", "F"),
        ("E", "F"),
    ]
    .into_iter()
    .map(|(from, to)| {
        edge(
            ("mps_verts", from),
            ("mps_verts", to),
            json!({"vertex": from}),
        )
    })
    .collect();

    ExampleGraph {
        definition: definition(
            "mps_graph",
            vec![EdgeDefinition::new("mps_edges", &["mps_verts"], &["mps_verts"])],
        ),
        vertices: vec![("mps_verts".into(), verts)],
        edges: vec![("mps_edges".into(), edges)],
    }
}

fn routeplanner() -> ExampleGraph {
    fn city(key: &str, population: u64, is_capital: bool, lat: f64, lon: f64) -> Value {
        json!({
            "_key": key,
            "population": population,
            "isCapital": is_capital,
            "geometry": {"type": "Point", "coordinates": [lon, lat]},
        })
    }

    let german = vec![
        city("Berlin", 3_000_000, true, 52.5167, 13.3833),
        city("Cologne", 1_000_000, false, 50.9364, 6.9528),
        city("Hamburg", 1_000_000, false, 53.5653, 10.0014),
    ];
    let french = vec![
        city("Paris", 4_000_000, true, 48.8567, 2.3508),
        city("Lyon", 80_000, false, 45.75, 4.85),
    ];

    let german_highway: Vec<Value> = [
        ("Berlin", "Cologne", 850),
        ("Berlin", "Hamburg", 400),
        ("Hamburg", "Cologne", 500),
    ]
    .into_iter()
    .map(|(a, b, km)| edge(("germanCity", a), ("germanCity", b), json!({"distance": km})))
    .collect();

    let french_highway = vec![edge(
        ("frenchCity", "Paris"),
        ("frenchCity", "Lyon"),
        json!({"distance": 550}),
    )];

    let international_highway: Vec<Value> = [
        ("Berlin", "Lyon", 1100),
        ("Berlin", "Paris", 1200),
        ("Hamburg", "Paris", 900),
        ("Hamburg", "Lyon", 1300),
        ("Cologne", "Lyon", 700),
        ("Cologne", "Paris", 550),
    ]
    .into_iter()
    .map(|(a, b, km)| edge(("germanCity", a), ("frenchCity", b), json!({"distance": km})))
    .collect();

    ExampleGraph {
        definition: definition(
            "routeplanner",
            vec![
                EdgeDefinition::new("frenchHighway", &["frenchCity"], &["frenchCity"]),
                EdgeDefinition::new("germanHighway", &["germanCity"], &["germanCity"]),
                EdgeDefinition::new(
                    "internationalHighway",
                    &["frenchCity", "germanCity"],
                    &["frenchCity", "germanCity"],
                ),
            ],
        ),
        vertices: vec![
            ("germanCity".into(), german),
            ("frenchCity".into(), french),
        ],
        edges: vec![
            ("germanHighway".into(), german_highway),
            ("frenchHighway".into(), french_highway),
            ("internationalHighway".into(), international_highway),
        ],
    }
}

fn connected_components_graph() -> ExampleGraph {
    // Three weakly connected components: A1..A4, B1..B9 and C1..C5
    let keys: Vec<String> = (1..=4)
        .map(|i| format!("A{}", i))
        .chain((1..=9).map(|i| format!("B{}", i)))
        .chain((1..=5).map(|i| format!("C{}", i)))
        .collect();
    let components: Vec<Value> = keys.iter().map(|key| json!({"_key": key})).collect();

    let links: Vec<Value> = [
        ("A1", "A2"),
        ("A2", "A3"),
        ("A3", "A4"),
        ("A4", "A1"),
        ("B1", "B3"),
        ("B2", "B4"),
        ("B3", "B6"),
        ("B4", "B3"),
        ("B4", "B5"),
        ("B6", "B7"),
        ("B7", "B8"),
        ("B7", "B9"),
        ("B8", "B9"),
        ("B9", "B1"),
        ("C1", "C2"),
        ("C2", "C3"),
        ("C3", "C1"),
        ("C4", "C5"),
        ("C5", "C3"),
    ]
    .into_iter()
    .map(|(from, to)| edge(("components", from), ("components", to), json!({})))
    .collect();

    ExampleGraph {
        definition: definition(
            "connectedComponentsGraph",
            vec![EdgeDefinition::new(
                "componentEdges",
                &["components"],
                &["components"],
            )],
        ),
        vertices: vec![("components".into(), components)],
        edges: vec![("componentEdges".into(), links)],
    }
}
