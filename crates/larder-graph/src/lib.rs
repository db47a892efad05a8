//! Graph backend abstraction for Larder.
//!
//! The store talks to a property-graph service through the [`GraphBackend`]
//! trait: graph lifecycle, schema, declarative traversals, and element
//! writes. Two implementations are provided:
//!
//! - [`HttpGraphBackend`]: the remote graph query service (REST + Gremlin),
//!   with basic auth and a bounded per-request timeout
//! - [`MemoryGraphBackend`]: an in-process petgraph-backed backend that
//!   interprets the same traversals structurally; used by tests and local
//!   development
//!
//! Traversals are built as typed step sequences ([`Traversal`]) so both
//! backends execute the same query: the HTTP backend renders it to a
//! Gremlin string, the in-memory backend walks it directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod http;
pub mod memory;
pub mod schema;
pub mod traversal;
pub mod wire;

// Re-export key types at crate root for convenience
pub use backend::{GraphBackend, TraversalResult};
pub use config::BackendConfig;
pub use http::HttpGraphBackend;
pub use memory::{BackendStats, MemoryGraphBackend};
pub use schema::{Cardinality, DataType, LabelDecl, PropertyKey, Schema, VertexIndex};
pub use traversal::{Predicate, Step, Traversal};
