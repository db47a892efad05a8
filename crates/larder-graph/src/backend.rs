//! The graph backend trait.

use crate::schema::Schema;
use crate::traversal::Traversal;
use async_trait::async_trait;
use larder_core::{Edge, EdgeLabel, Path, PropertyMap, Result, Vertex, VertexId, VertexLabel};

/// One element of a traversal result set.
#[derive(Clone, Debug, PartialEq)]
pub enum TraversalResult {
    /// A vertex.
    Vertex(Vertex),
    /// An edge.
    Edge(Edge),
    /// A full walk path.
    Path(Path),
}

impl TraversalResult {
    /// Returns the vertex, if this result is one.
    pub fn as_vertex(&self) -> Option<&Vertex> {
        match self {
            Self::Vertex(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the path, if this result is one.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Consumes the result, returning the vertex if it is one.
    pub fn into_vertex(self) -> Option<Vertex> {
        match self {
            Self::Vertex(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes the result, returning the path if it is one.
    pub fn into_path(self) -> Option<Path> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }
}

/// A property-graph query service.
///
/// Operations are blocking request/response calls; implementations perform
/// no retries. Every read-then-write the store composes on top of this
/// trait is non-atomic — callers serialize writers per key (see the store's
/// lock registry) because the service offers no compare-and-swap.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Lists the identifiers of all existing graphs.
    async fn list_graphs(&self) -> Result<Vec<String>>;

    /// Creates a new empty graph.
    async fn create_graph(&self, graph_id: &str) -> Result<()>;

    /// Selects the graph subsequent operations address.
    async fn select_graph(&self, graph_id: &str) -> Result<()>;

    /// Fetches the selected graph's schema, if it has one.
    async fn get_schema(&self) -> Result<Option<Schema>>;

    /// Saves the selected graph's schema.
    async fn save_schema(&self, schema: &Schema) -> Result<()>;

    /// Executes a declarative traversal, returning vertices, edges, or
    /// paths depending on the traversal's result shape.
    async fn execute(&self, traversal: &Traversal) -> Result<Vec<TraversalResult>>;

    /// Adds a vertex and returns it with its backend-assigned identifier.
    async fn add_vertex(&self, label: VertexLabel, properties: PropertyMap) -> Result<Vertex>;

    /// Adds a directed edge and returns it with its backend-assigned
    /// identifier.
    async fn add_edge(
        &self,
        label: EdgeLabel,
        out_v: &VertexId,
        in_v: &VertexId,
        properties: PropertyMap,
    ) -> Result<Edge>;

    /// Overwrites an existing edge's properties by identifier.
    async fn update_edge(&self, edge: &Edge) -> Result<Edge>;
}
