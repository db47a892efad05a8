//! Larder Core — shared types, keys, and errors.
//!
//! This crate provides the foundational types used across all Larder crates.
//! It has no internal Larder dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`keys`]: Canonical lookup-key normalization
//! - [`types`]: Property-graph element types (vertices, edges, paths)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod keys;
pub mod types;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use types::{
    Edge, EdgeId, EdgeLabel, Path, PathElement, PropertyMap, Vertex, VertexId, VertexLabel,
};
