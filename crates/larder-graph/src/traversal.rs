//! Typed declarative traversals.
//!
//! A [`Traversal`] is a start point plus an ordered step sequence,
//! optionally terminated by `path()`. The store builds four shapes: vertex
//! lookup by label and key, edge lookup between two endpoints, a user's
//! weight-ordered favorites, and the recommendation walk from an
//! ingredient/cuisine anchor. Backends consume the typed form; only the
//! HTTP backend renders it to a Gremlin string via [`Traversal::to_gremlin`].

use larder_core::VertexId;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

// ============================================================================
// Step model
// ============================================================================

/// Predicate applied to a property value by a `has` step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Property equals the given string.
    Eq(String),
    /// Property is an integer strictly greater than the given value.
    Gt(i64),
    /// Property exists and does not equal the given string.
    Neq(String),
}

/// One step of a traversal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Keep vertices with the given label.
    HasLabel(String),
    /// Keep elements whose property satisfies the predicate.
    Has {
        /// Property name.
        key: String,
        /// Predicate on the property value.
        predicate: Predicate,
    },
    /// Move from vertices to their outgoing edges.
    OutE,
    /// Move from vertices to their incoming edges.
    InE,
    /// Move from edges to their destination vertices.
    InV,
    /// Move from edges to their source vertices.
    OutV,
    /// Move from vertices to the sources of incoming edges with the given
    /// label, without visiting the edge itself.
    In(String),
    /// Order elements by an integer property, descending. Elements missing
    /// the property sort as zero. Tie order is backend-defined.
    OrderByDesc(String),
    /// Keep vertices with the given identifier.
    HasId(VertexId),
    /// Keep at most the first `n` elements.
    Limit(usize),
}

/// Where a traversal starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Start {
    /// All vertices in the graph.
    AllVertices,
    /// The single vertex with the given identifier.
    Vertex(VertexId),
}

/// A declarative traversal: start, steps, and result shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Traversal {
    /// Start point.
    pub start: Start,
    /// Ordered steps.
    pub steps: Vec<Step>,
    /// When true the traversal returns full walk paths instead of the
    /// elements at the final step.
    pub returns_paths: bool,
}

impl Traversal {
    /// Starts a traversal over all vertices.
    pub fn vertices() -> Self {
        Self {
            start: Start::AllVertices,
            steps: Vec::new(),
            returns_paths: false,
        }
    }

    /// Starts a traversal at a single vertex.
    pub fn vertex(id: &VertexId) -> Self {
        Self {
            start: Start::Vertex(id.clone()),
            steps: Vec::new(),
            returns_paths: false,
        }
    }

    fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Keep vertices with the given label.
    pub fn has_label(self, label: impl Into<String>) -> Self {
        self.step(Step::HasLabel(label.into()))
    }

    /// Keep elements whose property equals `value`.
    pub fn has_eq(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.step(Step::Has {
            key: key.into(),
            predicate: Predicate::Eq(value.into()),
        })
    }

    /// Keep elements whose integer property is strictly greater than `value`.
    pub fn has_gt(self, key: impl Into<String>, value: i64) -> Self {
        self.step(Step::Has {
            key: key.into(),
            predicate: Predicate::Gt(value),
        })
    }

    /// Keep elements whose property exists and differs from `value`.
    pub fn has_neq(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.step(Step::Has {
            key: key.into(),
            predicate: Predicate::Neq(value.into()),
        })
    }

    /// Move to outgoing edges.
    pub fn out_e(self) -> Self {
        self.step(Step::OutE)
    }

    /// Move to incoming edges.
    pub fn in_e(self) -> Self {
        self.step(Step::InE)
    }

    /// Move from edges to destination vertices.
    pub fn in_v(self) -> Self {
        self.step(Step::InV)
    }

    /// Move from edges to source vertices.
    pub fn out_v(self) -> Self {
        self.step(Step::OutV)
    }

    /// Move to the sources of incoming edges with the given label.
    pub fn in_via(self, label: impl Into<String>) -> Self {
        self.step(Step::In(label.into()))
    }

    /// Order by an integer property, descending.
    pub fn order_by_desc(self, key: impl Into<String>) -> Self {
        self.step(Step::OrderByDesc(key.into()))
    }

    /// Keep vertices with the given identifier.
    pub fn has_id(self, id: &VertexId) -> Self {
        self.step(Step::HasId(id.clone()))
    }

    /// Keep at most the first `n` elements.
    pub fn limit(self, n: usize) -> Self {
        self.step(Step::Limit(n))
    }

    /// Return full walk paths instead of final elements.
    pub fn path(mut self) -> Self {
        self.returns_paths = true;
        self
    }

    /// Renders this traversal as a Gremlin query string.
    ///
    /// The rendered shapes match the queries the deployed graph service
    /// already answers, so an existing populated graph stays compatible.
    pub fn to_gremlin(&self) -> String {
        let mut q = String::from("g.V(");
        if let Start::Vertex(id) = &self.start {
            q.push_str(&render_id(id.as_str()));
        }
        q.push(')');

        for step in &self.steps {
            match step {
                Step::HasLabel(label) => {
                    let _ = write!(q, ".hasLabel(\"{}\")", escape(label));
                }
                Step::Has { key, predicate } => match predicate {
                    Predicate::Eq(value) => {
                        let _ = write!(q, ".has(\"{}\", \"{}\")", escape(key), escape(value));
                    }
                    Predicate::Gt(value) => {
                        let _ = write!(q, ".has(\"{}\", gt({value}))", escape(key));
                    }
                    Predicate::Neq(value) => {
                        let _ = write!(q, ".has(\"{}\", neq(\"{}\"))", escape(key), escape(value));
                    }
                },
                Step::OutE => q.push_str(".outE()"),
                Step::InE => q.push_str(".inE()"),
                Step::InV => q.push_str(".inV()"),
                Step::OutV => q.push_str(".outV()"),
                Step::In(label) => {
                    let _ = write!(q, ".in(\"{}\")", escape(label));
                }
                Step::OrderByDesc(key) => {
                    let _ = write!(q, ".order().by(\"{}\", decr)", escape(key));
                }
                Step::HasId(id) => {
                    let _ = write!(q, ".hasId({})", render_id(id.as_str()));
                }
                Step::Limit(n) => {
                    let _ = write!(q, ".limit({n})");
                }
            }
        }

        if self.returns_paths {
            q.push_str(".path()");
        }
        q
    }
}

/// Escape a string for embedding in a double-quoted Gremlin literal.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Numeric backend identifiers render bare; anything else renders quoted.
fn render_id(id: &str) -> String {
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        id.to_string()
    } else {
        format!("\"{}\"", escape(id))
    }
}
