//! In-process graph backend.
//!
//! Implements [`GraphBackend`] over a petgraph `DiGraph` with id lookup
//! tables, one graph state per created graph id. Traversals are
//! interpreted structurally by walkers that accumulate their paths, so
//! tests and local development exercise the exact queries the HTTP
//! backend renders to Gremlin.
//!
//! Ordering ties are resolved by insertion order (a stable sort over the
//! walker set) — callers must treat tie order as backend-defined, matching
//! the remote service.

use crate::backend::{GraphBackend, TraversalResult};
use crate::schema::Schema;
use crate::traversal::{Predicate, Start, Step, Traversal};
use async_trait::async_trait;
use larder_core::{
    Edge, EdgeId, EdgeLabel, Error, Path, PathElement, PropertyMap, Result, Vertex, VertexId,
    VertexLabel,
};
use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

// ============================================================================
// Stats
// ============================================================================

/// Operation counters, exposed so tests can assert idempotence (e.g. a
/// second bootstrap performing zero additional create/save calls).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// Number of `create_graph` calls.
    pub create_graph_calls: usize,
    /// Number of `save_schema` calls.
    pub save_schema_calls: usize,
    /// Number of `add_vertex` calls.
    pub add_vertex_calls: usize,
    /// Number of `add_edge` calls.
    pub add_edge_calls: usize,
    /// Number of `update_edge` calls.
    pub update_edge_calls: usize,
    /// Number of executed traversals.
    pub executed_traversals: usize,
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Clone, Debug)]
struct StoredVertex {
    id: String,
    label: VertexLabel,
    properties: PropertyMap,
}

#[derive(Clone, Debug)]
struct StoredEdge {
    id: String,
    label: EdgeLabel,
    out_v: String,
    in_v: String,
    properties: PropertyMap,
}

#[derive(Default)]
struct GraphState {
    schema: Option<Schema>,
    graph: DiGraph<StoredVertex, StoredEdge>,
    vertex_ids: HashMap<String, NodeIndex>,
    edge_ids: HashMap<String, EdgeIndex>,
}

impl GraphState {
    fn vertex_at(&self, idx: NodeIndex) -> Vertex {
        let stored = &self.graph[idx];
        Vertex {
            id: VertexId::new(stored.id.clone()),
            label: stored.label,
            properties: stored.properties.clone(),
        }
    }

    fn edge_at(&self, idx: EdgeIndex) -> Edge {
        let stored = &self.graph[idx];
        Edge {
            id: EdgeId::new(stored.id.clone()),
            label: stored.label,
            out_v: VertexId::new(stored.out_v.clone()),
            in_v: VertexId::new(stored.in_v.clone()),
            properties: stored.properties.clone(),
        }
    }
}

struct MemoryState {
    graphs: HashMap<String, GraphState>,
    selected: Option<String>,
    next_id: u64,
    stats: BackendStats,
}

impl MemoryState {
    fn active(&mut self) -> Result<&mut GraphState> {
        let id = self
            .selected
            .clone()
            .ok_or_else(|| Error::query("no graph selected"))?;
        self.graphs
            .get_mut(&id)
            .ok_or_else(|| Error::query(format!("selected graph {id:?} does not exist")))
    }

    fn assign_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// [`GraphBackend`] implementation held entirely in process memory.
pub struct MemoryGraphBackend {
    state: RwLock<MemoryState>,
}

impl MemoryGraphBackend {
    /// Creates an empty backend with no graphs.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                graphs: HashMap::new(),
                selected: None,
                next_id: 0,
                stats: BackendStats::default(),
            }),
        }
    }

    /// Snapshot of the operation counters.
    pub async fn stats(&self) -> BackendStats {
        self.state.read().await.stats.clone()
    }
}

impl Default for MemoryGraphBackend {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Traversal interpreter
// ============================================================================

#[derive(Clone, Copy)]
enum Cursor {
    Vertex(NodeIndex),
    Edge(EdgeIndex),
}

struct Walker {
    cursor: Cursor,
    path: Vec<PathElement>,
}

impl Walker {
    fn at_vertex(state: &GraphState, idx: NodeIndex, mut path: Vec<PathElement>) -> Self {
        path.push(PathElement::Vertex(state.vertex_at(idx)));
        Self {
            cursor: Cursor::Vertex(idx),
            path,
        }
    }

    fn at_edge(state: &GraphState, idx: EdgeIndex, mut path: Vec<PathElement>) -> Self {
        path.push(PathElement::Edge(state.edge_at(idx)));
        Self {
            cursor: Cursor::Edge(idx),
            path,
        }
    }
}

fn cursor_properties<'a>(state: &'a GraphState, cursor: &Cursor) -> &'a PropertyMap {
    match cursor {
        Cursor::Vertex(idx) => &state.graph[*idx].properties,
        Cursor::Edge(idx) => &state.graph[*idx].properties,
    }
}

fn cursor_id<'a>(state: &'a GraphState, cursor: &Cursor) -> &'a str {
    match cursor {
        Cursor::Vertex(idx) => &state.graph[*idx].id,
        Cursor::Edge(idx) => &state.graph[*idx].id,
    }
}

fn matches_predicate(value: Option<&Value>, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Eq(expected) => match value {
            Some(Value::String(s)) => s == expected,
            Some(Value::Number(n)) => n.to_string() == *expected,
            _ => false,
        },
        Predicate::Gt(threshold) => value.and_then(Value::as_i64).is_some_and(|n| n > *threshold),
        Predicate::Neq(expected) => match value {
            Some(Value::String(s)) => s != expected,
            Some(Value::Number(n)) => n.to_string() != *expected,
            _ => false,
        },
    }
}

fn apply_step(state: &GraphState, walkers: Vec<Walker>, step: &Step) -> Vec<Walker> {
    match step {
        Step::HasLabel(label) => walkers
            .into_iter()
            .filter(|w| match w.cursor {
                Cursor::Vertex(idx) => state.graph[idx].label.name() == label,
                Cursor::Edge(_) => false,
            })
            .collect(),

        Step::Has { key, predicate } => walkers
            .into_iter()
            .filter(|w| {
                matches_predicate(cursor_properties(state, &w.cursor).get(key), predicate)
            })
            .collect(),

        Step::OutE => fan_out_edges(state, walkers, Direction::Outgoing),
        Step::InE => fan_out_edges(state, walkers, Direction::Incoming),

        Step::InV => walkers
            .into_iter()
            .filter_map(|w| match w.cursor {
                Cursor::Edge(idx) => state
                    .graph
                    .edge_endpoints(idx)
                    .map(|(_, target)| Walker::at_vertex(state, target, w.path)),
                Cursor::Vertex(_) => None,
            })
            .collect(),

        Step::OutV => walkers
            .into_iter()
            .filter_map(|w| match w.cursor {
                Cursor::Edge(idx) => state
                    .graph
                    .edge_endpoints(idx)
                    .map(|(source, _)| Walker::at_vertex(state, source, w.path)),
                Cursor::Vertex(_) => None,
            })
            .collect(),

        Step::In(label) => walkers
            .into_iter()
            .flat_map(|w| {
                let sources: Vec<NodeIndex> = match w.cursor {
                    Cursor::Vertex(idx) => state
                        .graph
                        .edges_directed(idx, Direction::Incoming)
                        .filter(|e| e.weight().label.name() == label)
                        .map(|e| e.source())
                        .collect(),
                    Cursor::Edge(_) => Vec::new(),
                };
                sources
                    .into_iter()
                    .map(move |source| Walker::at_vertex(state, source, w.path.clone()))
            })
            .collect(),

        Step::OrderByDesc(key) => {
            let mut walkers = walkers;
            walkers.sort_by_key(|w| {
                let weight = cursor_properties(state, &w.cursor)
                    .get(key)
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                std::cmp::Reverse(weight)
            });
            walkers
        }

        Step::HasId(id) => walkers
            .into_iter()
            .filter(|w| cursor_id(state, &w.cursor) == id.as_str())
            .collect(),

        Step::Limit(n) => {
            let mut walkers = walkers;
            walkers.truncate(*n);
            walkers
        }
    }
}

fn fan_out_edges(state: &GraphState, walkers: Vec<Walker>, direction: Direction) -> Vec<Walker> {
    walkers
        .into_iter()
        .flat_map(|w| {
            let edges: Vec<EdgeIndex> = match w.cursor {
                Cursor::Vertex(idx) => state
                    .graph
                    .edges_directed(idx, direction)
                    .map(|e| e.id())
                    .collect(),
                Cursor::Edge(_) => Vec::new(),
            };
            edges
                .into_iter()
                .map(move |edge| Walker::at_edge(state, edge, w.path.clone()))
        })
        .collect()
}

fn run_traversal(state: &GraphState, traversal: &Traversal) -> Vec<TraversalResult> {
    let mut walkers: Vec<Walker> = match &traversal.start {
        Start::AllVertices => state
            .graph
            .node_indices()
            .map(|idx| Walker::at_vertex(state, idx, Vec::new()))
            .collect(),
        Start::Vertex(id) => state
            .vertex_ids
            .get(id.as_str())
            .map(|idx| Walker::at_vertex(state, *idx, Vec::new()))
            .into_iter()
            .collect(),
    };

    for step in &traversal.steps {
        walkers = apply_step(state, walkers, step);
        if walkers.is_empty() {
            break;
        }
    }

    walkers
        .into_iter()
        .map(|w| {
            if traversal.returns_paths {
                TraversalResult::Path(Path { elements: w.path })
            } else {
                match w.cursor {
                    Cursor::Vertex(idx) => TraversalResult::Vertex(state.vertex_at(idx)),
                    Cursor::Edge(idx) => TraversalResult::Edge(state.edge_at(idx)),
                }
            }
        })
        .collect()
}

// ============================================================================
// GraphBackend implementation
// ============================================================================

#[async_trait]
impl GraphBackend for MemoryGraphBackend {
    async fn list_graphs(&self) -> Result<Vec<String>> {
        let state = self.state.read().await;
        let mut graphs: Vec<String> = state.graphs.keys().cloned().collect();
        graphs.sort();
        Ok(graphs)
    }

    async fn create_graph(&self, graph_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.stats.create_graph_calls += 1;
        if state.graphs.contains_key(graph_id) {
            return Err(Error::query(format!("graph {graph_id:?} already exists")));
        }
        state.graphs.insert(graph_id.to_string(), GraphState::default());
        Ok(())
    }

    async fn select_graph(&self, graph_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.graphs.contains_key(graph_id) {
            return Err(Error::query(format!("graph {graph_id:?} does not exist")));
        }
        state.selected = Some(graph_id.to_string());
        Ok(())
    }

    async fn get_schema(&self) -> Result<Option<Schema>> {
        let mut state = self.state.write().await;
        Ok(state.active()?.schema.clone())
    }

    async fn save_schema(&self, schema: &Schema) -> Result<()> {
        let mut state = self.state.write().await;
        state.stats.save_schema_calls += 1;
        state.active()?.schema = Some(schema.clone());
        Ok(())
    }

    async fn execute(&self, traversal: &Traversal) -> Result<Vec<TraversalResult>> {
        let mut state = self.state.write().await;
        state.stats.executed_traversals += 1;
        let graph = state.active()?;
        Ok(run_traversal(graph, traversal))
    }

    async fn add_vertex(&self, label: VertexLabel, properties: PropertyMap) -> Result<Vertex> {
        let mut state = self.state.write().await;
        state.stats.add_vertex_calls += 1;
        let id = state.assign_id();
        let graph = state.active()?;
        let idx = graph.graph.add_node(StoredVertex {
            id: id.clone(),
            label,
            properties,
        });
        graph.vertex_ids.insert(id, idx);
        Ok(graph.vertex_at(idx))
    }

    async fn add_edge(
        &self,
        label: EdgeLabel,
        out_v: &VertexId,
        in_v: &VertexId,
        properties: PropertyMap,
    ) -> Result<Edge> {
        let mut state = self.state.write().await;
        state.stats.add_edge_calls += 1;
        let id = state.assign_id();
        let graph = state.active()?;
        let from = *graph
            .vertex_ids
            .get(out_v.as_str())
            .ok_or_else(|| Error::query(format!("unknown source vertex: {out_v}")))?;
        let to = *graph
            .vertex_ids
            .get(in_v.as_str())
            .ok_or_else(|| Error::query(format!("unknown destination vertex: {in_v}")))?;
        let idx = graph.graph.add_edge(
            from,
            to,
            StoredEdge {
                id: id.clone(),
                label,
                out_v: out_v.as_str().to_string(),
                in_v: in_v.as_str().to_string(),
                properties,
            },
        );
        graph.edge_ids.insert(id, idx);
        Ok(graph.edge_at(idx))
    }

    async fn update_edge(&self, edge: &Edge) -> Result<Edge> {
        let mut state = self.state.write().await;
        state.stats.update_edge_calls += 1;
        let graph = state.active()?;
        let idx = *graph
            .edge_ids
            .get(edge.id.as_str())
            .ok_or_else(|| Error::query(format!("unknown edge: {}", edge.id)))?;
        graph.graph[idx].properties = edge.properties.clone();
        Ok(graph.edge_at(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(pairs: &[(&str, Value)]) -> PropertyMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    async fn backend_with_graph() -> MemoryGraphBackend {
        let backend = MemoryGraphBackend::new();
        backend.create_graph("test").await.unwrap();
        backend.select_graph("test").await.unwrap();
        backend
    }

    #[tokio::test]
    async fn test_operations_require_selected_graph() {
        let backend = MemoryGraphBackend::new();
        assert!(backend.get_schema().await.is_err());
        assert!(
            backend
                .add_vertex(VertexLabel::Person, PropertyMap::new())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_graph_fails() {
        let backend = backend_with_graph().await;
        assert!(backend.create_graph("test").await.is_err());
    }

    #[tokio::test]
    async fn test_schema_round_trip() {
        let backend = backend_with_graph().await;
        assert_eq!(backend.get_schema().await.unwrap(), None);

        let schema = Schema::interaction_graph();
        backend.save_schema(&schema).await.unwrap();
        assert_eq!(backend.get_schema().await.unwrap(), Some(schema));
    }

    #[tokio::test]
    async fn test_vertex_lookup_by_label_and_name() {
        let backend = backend_with_graph().await;
        backend
            .add_vertex(VertexLabel::Cuisine, props(&[("name", json!("thai"))]))
            .await
            .unwrap();
        backend
            .add_vertex(VertexLabel::Person, props(&[("name", json!("thai"))]))
            .await
            .unwrap();

        let results = backend
            .execute(&Traversal::vertices().has_label("cuisine").has_eq("name", "thai"))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].as_vertex().unwrap().label,
            VertexLabel::Cuisine
        );
    }

    #[tokio::test]
    async fn test_edge_between_returns_path() {
        let backend = backend_with_graph().await;
        let a = backend
            .add_vertex(VertexLabel::Person, props(&[("name", json!("u1"))]))
            .await
            .unwrap();
        let b = backend
            .add_vertex(VertexLabel::Recipe, props(&[("name", json!("r1"))]))
            .await
            .unwrap();
        backend
            .add_edge(
                EdgeLabel::Selects,
                &a.id,
                &b.id,
                props(&[("count", json!(1))]),
            )
            .await
            .unwrap();

        let results = backend
            .execute(&Traversal::vertex(&a.id).out_e().in_v().has_id(&b.id).path())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        let path = results[0].as_path().unwrap();
        assert_eq!(path.len(), 3);
        assert!(path.get(0).unwrap().as_vertex().is_some());
        let edge = path.get(1).unwrap().as_edge().unwrap();
        assert_eq!(edge.count(), Some(1));
        assert!(path.get(2).unwrap().as_vertex().is_some());
    }

    #[tokio::test]
    async fn test_order_by_desc_and_limit() {
        let backend = backend_with_graph().await;
        let user = backend
            .add_vertex(VertexLabel::Person, props(&[("name", json!("u1"))]))
            .await
            .unwrap();
        for (name, count) in [("r1", 2), ("r2", 7), ("r3", 5)] {
            let recipe = backend
                .add_vertex(VertexLabel::Recipe, props(&[("name", json!(name))]))
                .await
                .unwrap();
            backend
                .add_edge(
                    EdgeLabel::Selects,
                    &user.id,
                    &recipe.id,
                    props(&[("count", json!(count))]),
                )
                .await
                .unwrap();
        }

        let results = backend
            .execute(
                &Traversal::vertices()
                    .has_label("person")
                    .has_eq("name", "u1")
                    .out_e()
                    .order_by_desc("count")
                    .in_v()
                    .has_label("recipe")
                    .limit(2),
            )
            .await
            .unwrap();
        let names: Vec<&str> = results
            .iter()
            .map(|r| r.as_vertex().unwrap().name().unwrap())
            .collect();
        assert_eq!(names, ["r2", "r3"]);
    }

    #[tokio::test]
    async fn test_gt_predicate_filters_baseline_counts() {
        let backend = backend_with_graph().await;
        let user = backend
            .add_vertex(VertexLabel::Person, props(&[("name", json!("u1"))]))
            .await
            .unwrap();
        let recipe = backend
            .add_vertex(VertexLabel::Recipe, props(&[("name", json!("r1"))]))
            .await
            .unwrap();
        backend
            .add_edge(
                EdgeLabel::Selects,
                &user.id,
                &recipe.id,
                props(&[("count", json!(1))]),
            )
            .await
            .unwrap();

        let results = backend
            .execute(&Traversal::vertex(&recipe.id).in_e().has_gt("count", 1))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_in_via_skips_edge_in_path() {
        let backend = backend_with_graph().await;
        let recipe = backend
            .add_vertex(VertexLabel::Recipe, props(&[("name", json!("r1"))]))
            .await
            .unwrap();
        let cuisine = backend
            .add_vertex(VertexLabel::Cuisine, props(&[("name", json!("thai"))]))
            .await
            .unwrap();
        backend
            .add_edge(EdgeLabel::Has, &recipe.id, &cuisine.id, PropertyMap::new())
            .await
            .unwrap();

        let results = backend
            .execute(
                &Traversal::vertices()
                    .has_label("cuisine")
                    .has_eq("name", "thai")
                    .in_via("has")
                    .path(),
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        let path = results[0].as_path().unwrap();
        // Anchor vertex then recipe vertex; the has edge is not visited.
        assert_eq!(path.len(), 2);
        assert_eq!(
            path.get(1).unwrap().as_vertex().unwrap().name(),
            Some("r1")
        );
    }

    #[tokio::test]
    async fn test_neq_requires_property() {
        let backend = backend_with_graph().await;
        backend
            .add_vertex(VertexLabel::Person, props(&[("name", json!("u1"))]))
            .await
            .unwrap();
        backend
            .add_vertex(VertexLabel::Person, PropertyMap::new())
            .await
            .unwrap();

        let results = backend
            .execute(&Traversal::vertices().has_label("person").has_neq("name", "u2"))
            .await
            .unwrap();
        // The nameless vertex does not satisfy neq.
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_update_edge_overwrites_properties() {
        let backend = backend_with_graph().await;
        let a = backend
            .add_vertex(VertexLabel::Person, props(&[("name", json!("u1"))]))
            .await
            .unwrap();
        let b = backend
            .add_vertex(VertexLabel::Recipe, props(&[("name", json!("r1"))]))
            .await
            .unwrap();
        let mut edge = backend
            .add_edge(
                EdgeLabel::Selects,
                &a.id,
                &b.id,
                props(&[("count", json!(1))]),
            )
            .await
            .unwrap();

        edge.properties.insert("count".to_string(), json!(2));
        let updated = backend.update_edge(&edge).await.unwrap();
        assert_eq!(updated.count(), Some(2));

        let results = backend
            .execute(&Traversal::vertex(&a.id).out_e())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        match &results[0] {
            TraversalResult::Edge(e) => assert_eq!(e.count(), Some(2)),
            other => panic!("expected edge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stats_counters() {
        let backend = backend_with_graph().await;
        backend
            .add_vertex(VertexLabel::Person, PropertyMap::new())
            .await
            .unwrap();
        backend.save_schema(&Schema::interaction_graph()).await.unwrap();

        let stats = backend.stats().await;
        assert_eq!(stats.create_graph_calls, 1);
        assert_eq!(stats.add_vertex_calls, 1);
        assert_eq!(stats.save_schema_calls, 1);
    }
}
