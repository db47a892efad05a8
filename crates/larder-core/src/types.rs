//! Property-graph element types.
//!
//! These mirror what the graph backend stores: labeled vertices and
//! directed labeled edges, both carrying JSON property maps, plus the
//! paths a traversal can return. Label string forms are fixed — they must
//! match an existing populated graph exactly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A vertex or edge property map.
pub type PropertyMap = HashMap<String, Value>;

// ============================================================================
// Labels
// ============================================================================

/// Label of a vertex in the interaction graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexLabel {
    /// A user of the assistant.
    Person,
    /// A normalized ingredient set (single ingredient or sorted list).
    Ingredient,
    /// A cuisine.
    Cuisine,
    /// A concrete recipe.
    Recipe,
}

impl VertexLabel {
    /// Returns the backend string form of this label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Ingredient => "ingredient",
            Self::Cuisine => "cuisine",
            Self::Recipe => "recipe",
        }
    }

    /// Parses a backend label string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "person" => Some(Self::Person),
            "ingredient" => Some(Self::Ingredient),
            "cuisine" => Some(Self::Cuisine),
            "recipe" => Some(Self::Recipe),
            _ => None,
        }
    }
}

impl fmt::Display for VertexLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Label of an edge in the interaction graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeLabel {
    /// Weighted interaction edge; carries a `count` property.
    Selects,
    /// Unweighted membership edge (recipe → the ingredient/cuisine it was
    /// discovered through); written at most once and never mutated.
    Has,
}

impl EdgeLabel {
    /// Returns the backend string form of this label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Selects => "selects",
            Self::Has => "has",
        }
    }

    /// Parses a backend label string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "selects" => Some(Self::Selects),
            "has" => Some(Self::Has),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Identifiers
// ============================================================================

/// Backend-assigned vertex identifier.
///
/// Opaque: the backend chooses the representation, and this is the sole
/// reference other entities use to point at a vertex.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexId(String);

impl VertexId {
    /// Wraps a raw backend identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for VertexId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for VertexId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Backend-assigned edge identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(String);

impl EdgeId {
    /// Wraps a raw backend identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EdgeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ============================================================================
// Elements
// ============================================================================

/// A labeled vertex with its property map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Backend-assigned identifier.
    pub id: VertexId,
    /// Vertex label.
    pub label: VertexLabel,
    /// Property map. `name` holds the normalized unique key; recipes also
    /// carry `title`, and ingredient/cuisine/recipe vertices may carry an
    /// opaque `detail` payload.
    pub properties: PropertyMap,
}

impl Vertex {
    /// Looks up a property value.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Looks up a string property value.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// The normalized unique key of this vertex within its label.
    pub fn name(&self) -> Option<&str> {
        self.property_str("name")
    }

    /// The display title, if one was stored (recipes).
    pub fn title(&self) -> Option<&str> {
        self.property_str("title")
    }
}

/// A directed labeled edge with its property map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Backend-assigned identifier.
    pub id: EdgeId,
    /// Edge label.
    pub label: EdgeLabel,
    /// Source vertex.
    pub out_v: VertexId,
    /// Destination vertex.
    pub in_v: VertexId,
    /// Property map. `selects` edges carry an integer `count`.
    pub properties: PropertyMap,
}

impl Edge {
    /// Looks up a property value.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// The interaction weight of a `selects` edge, if present.
    pub fn count(&self) -> Option<i64> {
        self.properties.get("count").and_then(Value::as_i64)
    }
}

/// One element of a traversal path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// A vertex visited by the walk.
    Vertex(Vertex),
    /// An edge traversed by the walk.
    Edge(Edge),
}

impl PathElement {
    /// Returns the vertex, if this element is one.
    pub fn as_vertex(&self) -> Option<&Vertex> {
        match self {
            Self::Vertex(v) => Some(v),
            Self::Edge(_) => None,
        }
    }

    /// Returns the edge, if this element is one.
    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Self::Edge(e) => Some(e),
            Self::Vertex(_) => None,
        }
    }
}

/// An ordered walk through the graph: alternating vertices and edges as
/// returned by a path-terminated traversal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Visited elements, in walk order.
    pub elements: Vec<PathElement>,
}

impl Path {
    /// The element at `index`, if the path is that long.
    pub fn get(&self, index: usize) -> Option<&PathElement> {
        self.elements.get(index)
    }

    /// Number of elements in the walk.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the walk is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
