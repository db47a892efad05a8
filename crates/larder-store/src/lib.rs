//! Larder Store — the interaction graph recommendation store.
//!
//! Persists people, ingredients, cuisines, and recipes as property-graph
//! vertices, records weighted `selects` and unweighted `has` edges between
//! them, and answers favorite/recommendation queries by traversing the
//! graph through a [`larder_graph::GraphBackend`].
//!
//! # Modules
//!
//! - [`store`]: the [`RecipeStore`] — upserts, the relationship ledger,
//!   recommendation queries, and schema bootstrapping
//! - [`locks`]: per-key write serialization for the non-atomic
//!   read-then-write sequences the backend forces on us
//! - [`recommend`]: recommendation result types and the streaming-cap
//!   reduction

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod locks;
pub mod recommend;
pub mod store;

// Re-export key types at crate root for convenience
pub use locks::KeyLocks;
pub use recommend::{Recipe, RecipeRecommendation};
pub use store::RecipeStore;
