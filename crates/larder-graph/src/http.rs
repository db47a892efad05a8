//! Remote graph service backend.
//!
//! REST client for the hosted graph query service: graph lifecycle under
//! `/_graphs`, and per-graph schema, Gremlin, and element endpoints under
//! `/{graph_id}/...`. Requests authenticate with HTTP basic auth and are
//! bounded by the configured timeout; a timeout or transport failure
//! surfaces as `StoreUnavailable`, never as an indefinite block.

use crate::backend::{GraphBackend, TraversalResult};
use crate::config::BackendConfig;
use crate::schema::Schema;
use crate::traversal::Traversal;
use crate::wire;
use async_trait::async_trait;
use larder_core::{Edge, EdgeLabel, Error, PropertyMap, Result, Vertex, VertexId, VertexLabel};
use serde_json::{Value, json};
use tokio::sync::RwLock;

/// [`GraphBackend`] implementation over the remote graph service.
pub struct HttpGraphBackend {
    client: reqwest::Client,
    config: BackendConfig,
    selected: RwLock<Option<String>>,
}

impl HttpGraphBackend {
    /// Creates a backend from connection settings.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::unavailable_with_source("failed to build HTTP client", e))?;
        Ok(Self {
            client,
            config,
            selected: RwLock::new(None),
        })
    }

    fn base_url(&self) -> &str {
        self.config.api_url.trim_end_matches('/')
    }

    /// URL of an endpoint under the selected graph.
    async fn graph_url(&self, suffix: &str) -> Result<String> {
        let selected = self.selected.read().await;
        let graph_id = selected
            .as_deref()
            .ok_or_else(|| Error::query("no graph selected"))?;
        Ok(format!("{}/{graph_id}{suffix}", self.base_url()))
    }

    /// Sends a request and returns the parsed JSON body.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "request timed out"
                } else {
                    "request failed"
                };
                Error::unavailable_with_source(reason, e)
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(Error::unavailable(format!("backend returned {status}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::query(format!("backend returned {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| Error::unavailable_with_source("failed to read response body", e))
    }

    /// Extracts the `result.data` array of a response body.
    fn data_array(body: &Value) -> Result<&Vec<Value>> {
        body.get("result")
            .and_then(|r| r.get("data"))
            .and_then(Value::as_array)
            .ok_or_else(|| Error::query("response missing result.data"))
    }
}

#[async_trait]
impl GraphBackend for HttpGraphBackend {
    async fn list_graphs(&self) -> Result<Vec<String>> {
        let url = format!("{}/_graphs", self.base_url());
        let body = self.send(self.client.get(&url)).await?;
        let graphs = body
            .get("graphs")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::query("response missing graphs array"))?;
        graphs
            .iter()
            .map(|g| {
                g.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Error::query("graph id is not a string"))
            })
            .collect()
    }

    async fn create_graph(&self, graph_id: &str) -> Result<()> {
        let url = format!("{}/_graphs/{graph_id}", self.base_url());
        self.send(self.client.post(&url)).await?;
        Ok(())
    }

    async fn select_graph(&self, graph_id: &str) -> Result<()> {
        log::debug!("Selecting graph {graph_id}");
        *self.selected.write().await = Some(graph_id.to_string());
        Ok(())
    }

    async fn get_schema(&self) -> Result<Option<Schema>> {
        let url = self.graph_url("/schema").await?;
        let body = self.send(self.client.get(&url)).await?;
        let data = Self::data_array(&body)?;
        match data.first() {
            Some(raw) => Ok(Some(serde_json::from_value(raw.clone())?)),
            None => Ok(None),
        }
    }

    async fn save_schema(&self, schema: &Schema) -> Result<()> {
        let url = self.graph_url("/schema").await?;
        self.send(self.client.post(&url).json(schema)).await?;
        Ok(())
    }

    async fn execute(&self, traversal: &Traversal) -> Result<Vec<TraversalResult>> {
        let gremlin = traversal.to_gremlin();
        log::debug!("Executing traversal: {gremlin}");
        let url = self.graph_url("/gremlin").await?;
        let body = self
            .send(self.client.post(&url).json(&json!({ "gremlin": gremlin })))
            .await?;
        wire::decode_results(Self::data_array(&body)?)
    }

    async fn add_vertex(&self, label: VertexLabel, properties: PropertyMap) -> Result<Vertex> {
        let url = self.graph_url("/vertices").await?;
        let request = self
            .client
            .post(&url)
            .json(&wire::encode_vertex(label, &properties));
        let body = self.send(request).await?;
        let data = Self::data_array(&body)?;
        let raw = data
            .first()
            .ok_or_else(|| Error::query("vertex creation returned no element"))?;
        wire::decode_vertex(raw)
    }

    async fn add_edge(
        &self,
        label: EdgeLabel,
        out_v: &VertexId,
        in_v: &VertexId,
        properties: PropertyMap,
    ) -> Result<Edge> {
        let url = self.graph_url("/edges").await?;
        let request = self
            .client
            .post(&url)
            .json(&wire::encode_edge(label, out_v, in_v, &properties));
        let body = self.send(request).await?;
        let data = Self::data_array(&body)?;
        let raw = data
            .first()
            .ok_or_else(|| Error::query("edge creation returned no element"))?;
        wire::decode_edge(raw)
    }

    async fn update_edge(&self, edge: &Edge) -> Result<Edge> {
        let url = self.graph_url(&format!("/edges/{}", edge.id)).await?;
        let request = self.client.put(&url).json(&wire::encode_edge_update(edge));
        let body = self.send(request).await?;
        let data = Self::data_array(&body)?;
        match data.first() {
            Some(raw) => wire::decode_edge(raw),
            None => Ok(edge.clone()),
        }
    }
}
