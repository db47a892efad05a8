//! The interaction graph store.
//!
//! [`RecipeStore`] is a pass-through data-access layer over a
//! [`GraphBackend`]: it upserts vertices by normalized key, maintains the
//! weighted `selects` / unweighted `has` edge ledger, runs the
//! recommendation traversals, and bootstraps the graph schema once per
//! deployment. It performs no retries and no local recovery — backend
//! failures propagate to the caller.

use crate::locks::KeyLocks;
use crate::recommend::{Recipe, RecipeRecommendation, reduce_recommendations};
use larder_core::keys;
use larder_core::{
    Edge, EdgeLabel, Error, PathElement, PropertyMap, Result, Vertex, VertexId, VertexLabel,
};
use larder_graph::backend::TraversalResult;
use larder_graph::{BackendConfig, GraphBackend, HttpGraphBackend, Schema, Traversal};
use serde_json::{Value, json};
use std::fmt::Display;

/// The interaction graph recommendation store.
///
/// Writes are serialized per key inside this process (see [`KeyLocks`]):
/// the backend exposes no compare-and-swap, so every upsert here is a
/// read-then-write sequence and would otherwise lose creates or
/// increments under concurrent callers. Separate processes writing the
/// same graph still race — deploy one writer per graph, or put a
/// single-writer service in front.
pub struct RecipeStore<B> {
    backend: B,
    graph_id: String,
    locks: KeyLocks,
}

impl<B: GraphBackend> RecipeStore<B> {
    /// Creates a store over `backend`, addressing `graph_id`.
    pub fn new(backend: B, graph_id: impl Into<String>) -> Self {
        Self {
            backend,
            graph_id: graph_id.into(),
            locks: KeyLocks::new(),
        }
    }

    /// The backend this store talks to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The graph this store addresses.
    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    // ========================================================================
    // Schema bootstrap
    // ========================================================================

    /// Creates and initializes the graph and its schema.
    ///
    /// Runs once at process start, before any other operation. Idempotent:
    /// against an already-initialized graph this performs only the
    /// existence checks.
    pub async fn ensure_graph_and_schema(&self) -> Result<()> {
        log::info!("Listing graphs...");
        let graphs = self.backend.list_graphs().await?;
        if !graphs.iter().any(|g| g == &self.graph_id) {
            log::info!("Creating graph {}...", self.graph_id);
            self.backend.create_graph(&self.graph_id).await?;
        }
        self.backend.select_graph(&self.graph_id).await?;

        log::info!("Fetching graph schema...");
        let schema = self.backend.get_schema().await?;
        if schema.is_some_and(|s| s.is_initialized()) {
            log::debug!("Graph schema exists.");
        } else {
            log::info!("Saving graph schema...");
            self.backend
                .save_schema(&Schema::interaction_graph())
                .await?;
        }
        Ok(())
    }

    // ========================================================================
    // Entity repository
    // ========================================================================

    /// Looks up a vertex by label and normalized name.
    pub async fn find_vertex(&self, label: VertexLabel, name: &str) -> Result<Option<Vertex>> {
        let traversal = Traversal::vertices()
            .has_label(label.name())
            .has_eq("name", name);
        let results = self.backend.execute(&traversal).await?;
        Ok(results.into_iter().find_map(TraversalResult::into_vertex))
    }

    /// Looks up a vertex by `(label, name)`; creates it with `properties`
    /// if absent.
    ///
    /// First-writer-wins: an existing vertex is returned unchanged, so
    /// previously stored `title`/`detail` are never overwritten.
    async fn get_or_create_vertex(
        &self,
        label: VertexLabel,
        name: &str,
        properties: PropertyMap,
    ) -> Result<Vertex> {
        let _guard = self.locks.acquire(&format!("v:{label}:{name}")).await;
        if let Some(existing) = self.find_vertex(label, name).await? {
            log::debug!("Returning {label} vertex where name={name}");
            return Ok(existing);
        }
        log::info!("Creating {label} vertex where name={name}");
        self.backend.add_vertex(label, properties).await
    }

    /// Gets or creates the person vertex for `user_id`.
    ///
    /// Person vertices are created lazily, at most once per user id, on
    /// first interaction. The id is stored as given — chat platforms
    /// already hand out stable identifiers.
    pub async fn add_user(&self, user_id: &str) -> Result<Vertex> {
        require_key("user", user_id)?;
        let mut properties = PropertyMap::new();
        properties.insert("name".to_string(), json!(user_id));
        self.get_or_create_vertex(VertexLabel::Person, user_id, properties)
            .await
    }

    /// Finds the ingredient vertex for a raw ingredient string, if any.
    pub async fn find_ingredient(&self, ingredients_raw: &str) -> Result<Option<Vertex>> {
        let key = keys::normalize_ingredients(ingredients_raw);
        require_key("ingredient", &key)?;
        self.find_vertex(VertexLabel::Ingredient, &key).await
    }

    /// Gets or creates the ingredient vertex for a raw ingredient string,
    /// storing the matched-recipes payload as its `detail`.
    pub async fn add_ingredient(
        &self,
        ingredients_raw: &str,
        matching_recipes: &Value,
    ) -> Result<Vertex> {
        let key = keys::normalize_ingredients(ingredients_raw);
        require_key("ingredient", &key)?;
        let mut properties = PropertyMap::new();
        properties.insert("name".to_string(), json!(key));
        properties.insert(
            "detail".to_string(),
            json!(serde_json::to_string(matching_recipes)?),
        );
        self.get_or_create_vertex(VertexLabel::Ingredient, &key, properties)
            .await
    }

    /// Finds the cuisine vertex for a raw cuisine string, if any.
    pub async fn find_cuisine(&self, cuisine_raw: &str) -> Result<Option<Vertex>> {
        let key = keys::normalize_cuisine(cuisine_raw);
        require_key("cuisine", &key)?;
        self.find_vertex(VertexLabel::Cuisine, &key).await
    }

    /// Gets or creates the cuisine vertex for a raw cuisine string,
    /// storing the matched-recipes payload as its `detail`.
    pub async fn add_cuisine(&self, cuisine_raw: &str, matching_recipes: &Value) -> Result<Vertex> {
        let key = keys::normalize_cuisine(cuisine_raw);
        require_key("cuisine", &key)?;
        let mut properties = PropertyMap::new();
        properties.insert("name".to_string(), json!(key));
        properties.insert(
            "detail".to_string(),
            json!(serde_json::to_string(matching_recipes)?),
        );
        self.get_or_create_vertex(VertexLabel::Cuisine, &key, properties)
            .await
    }

    /// Finds the recipe vertex for an upstream recipe id, if any.
    pub async fn find_recipe(&self, recipe_id: impl Display) -> Result<Option<Vertex>> {
        let key = keys::normalize_recipe_id(recipe_id);
        require_key("recipe", &key)?;
        self.find_vertex(VertexLabel::Recipe, &key).await
    }

    /// Gets or creates the recipe vertex for an upstream recipe id, with
    /// its display title and instruction detail.
    pub async fn add_recipe(
        &self,
        recipe_id: impl Display,
        title: &str,
        detail: &str,
    ) -> Result<Vertex> {
        let key = keys::normalize_recipe_id(recipe_id);
        require_key("recipe", &key)?;
        let mut properties = PropertyMap::new();
        properties.insert("name".to_string(), json!(key));
        properties.insert("title".to_string(), json!(title.trim()));
        properties.insert("detail".to_string(), json!(detail));
        self.get_or_create_vertex(VertexLabel::Recipe, &key, properties)
            .await
    }

    // ========================================================================
    // Relationship ledger
    // ========================================================================

    /// Records one weighted interaction from `from` to `to`.
    ///
    /// Creates the `selects` edge with `count = 1` if absent; otherwise
    /// increments the existing count by one (a missing count reads as 0).
    pub async fn record_interaction(&self, from: &VertexId, to: &VertexId) -> Result<()> {
        let _guard = self.locks.acquire(&format!("e:{from}:{to}")).await;
        match self.edge_between(from, to).await? {
            Some(mut edge) => {
                let count = edge.count().unwrap_or(0) + 1;
                edge.properties.insert("count".to_string(), json!(count));
                log::debug!("Edge from {from} to {to} exists; count={count}");
                self.backend.update_edge(&edge).await?;
            }
            None => {
                log::debug!("Creating selects edge from {from} to {to}");
                let mut properties = PropertyMap::new();
                properties.insert("count".to_string(), json!(1));
                self.backend
                    .add_edge(EdgeLabel::Selects, from, to, properties)
                    .await?;
            }
        }
        Ok(())
    }

    /// Records a membership link from `from` to `to`.
    ///
    /// Creates the `has` edge with no properties if absent; a no-op
    /// otherwise. Membership edges are never weighted and never mutated.
    pub async fn record_membership(&self, from: &VertexId, to: &VertexId) -> Result<()> {
        let _guard = self.locks.acquire(&format!("e:{from}:{to}")).await;
        if self.edge_between(from, to).await?.is_some() {
            log::debug!("Edge from {from} to {to} exists");
            return Ok(());
        }
        log::debug!("Creating has edge from {from} to {to}");
        self.backend
            .add_edge(EdgeLabel::Has, from, to, PropertyMap::new())
            .await?;
        Ok(())
    }

    /// Records a user selecting a concrete recipe.
    ///
    /// Always records the user→recipe interaction. When the recipe was
    /// reached by browsing an ingredient or cuisine, also records the
    /// entry-point→recipe interaction and the recipe→entry-point
    /// membership link — the bipartite structure the recommendation
    /// traversal later walks.
    pub async fn record_recipe_request(
        &self,
        recipe: &Vertex,
        entry_point: Option<&Vertex>,
        user: &Vertex,
    ) -> Result<()> {
        self.record_interaction(&user.id, &recipe.id).await?;
        if let Some(entry) = entry_point {
            self.record_interaction(&entry.id, &recipe.id).await?;
            self.record_membership(&recipe.id, &entry.id).await?;
        }
        Ok(())
    }

    /// Looks up any edge between the two endpoints.
    ///
    /// Matches on endpoints only, not label — the shape the backend
    /// answers. The domain's write paths never give two edge kinds the
    /// same ordered endpoint pair.
    async fn edge_between(&self, from: &VertexId, to: &VertexId) -> Result<Option<Edge>> {
        let traversal = Traversal::vertex(from).out_e().in_v().has_id(to).path();
        let results = self.backend.execute(&traversal).await?;
        for result in results {
            if let Some(edge) = result
                .as_path()
                .and_then(|p| p.get(1))
                .and_then(PathElement::as_edge)
            {
                return Ok(Some(edge.clone()));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Recommendation engine
    // ========================================================================

    /// The user's favorite recipes: destinations of their outgoing edges,
    /// ordered by interaction count descending, capped at `limit`.
    ///
    /// Ties in count are returned in backend-defined order. A user with no
    /// edges yields an empty sequence, not an error.
    pub async fn favorite_recipes(&self, user: &Vertex, limit: usize) -> Result<Vec<Recipe>> {
        let user_name = vertex_name(user)?;
        let traversal = Traversal::vertices()
            .has_label(VertexLabel::Person.name())
            .has_eq("name", user_name)
            .out_e()
            .order_by_desc("count")
            .in_v()
            .has_label(VertexLabel::Recipe.name())
            .limit(limit);
        let results = self.backend.execute(&traversal).await?;
        Ok(results
            .into_iter()
            .filter_map(TraversalResult::into_vertex)
            .map(|v| Recipe {
                id: v.name().unwrap_or_default().to_string(),
                title: v.title().unwrap_or_default().to_string(),
            })
            .collect())
    }

    /// Recipes recommended for an ingredient or cuisine anchor, excluding
    /// the requesting user's own interactions.
    ///
    /// Walks recipes discovered through the anchor, keeps incoming
    /// interactions reinforced past the first touch (`count > 1`) in
    /// descending count order, follows them back to other people, and
    /// reduces the arrivals with the first-seen streaming cap (see
    /// [`reduce_recommendations`]).
    pub async fn recommended_recipes(
        &self,
        anchor: &Vertex,
        user: &Vertex,
        limit: usize,
    ) -> Result<Vec<RecipeRecommendation>> {
        if !matches!(
            anchor.label,
            VertexLabel::Ingredient | VertexLabel::Cuisine
        ) {
            return Err(Error::validation(format!(
                "recommendation anchor must be an ingredient or cuisine, got {}",
                anchor.label
            )));
        }
        let anchor_name = vertex_name(anchor)?;
        let user_name = vertex_name(user)?;

        let traversal = Traversal::vertices()
            .has_label(anchor.label.name())
            .has_eq("name", anchor_name)
            .in_via(EdgeLabel::Has.name())
            .in_e()
            .has_gt("count", 1)
            .order_by_desc("count")
            .out_v()
            .has_label(VertexLabel::Person.name())
            .has_neq("name", user_name)
            .path();
        let results = self.backend.execute(&traversal).await?;

        let mut arrivals = Vec::with_capacity(results.len());
        for result in results {
            let path = result
                .into_path()
                .ok_or_else(|| Error::query("recommendation traversal returned a non-path"))?;
            let recipe = path
                .get(1)
                .and_then(PathElement::as_vertex)
                .ok_or_else(|| Error::query("recommendation path is missing its recipe vertex"))?;
            arrivals.push((
                recipe.name().unwrap_or_default().to_string(),
                recipe.title().unwrap_or_default().to_string(),
            ));
        }
        Ok(reduce_recommendations(arrivals, limit))
    }
}

impl RecipeStore<HttpGraphBackend> {
    /// Creates a store over the remote graph service described by `config`.
    pub fn from_config(config: BackendConfig) -> Result<Self> {
        let graph_id = config.graph_id.clone();
        Ok(Self::new(HttpGraphBackend::new(config)?, graph_id))
    }
}

fn require_key(kind: &str, key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::validation(format!("empty {kind} key")));
    }
    Ok(())
}

fn vertex_name(vertex: &Vertex) -> Result<&str> {
    vertex.name().ok_or_else(|| {
        Error::validation(format!(
            "{} vertex {} has no name property",
            vertex.label, vertex.id
        ))
    })
}
