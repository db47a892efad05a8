//! Wire format of the remote graph service.
//!
//! Query responses arrive as `{"result": {"data": [...]}}` where each
//! element is a GraphSON-style vertex, edge, or path. Vertex property
//! values are wrapped in `[{"id": _, "value": v}]` arrays; edge properties
//! are plain values. These helpers decode that shape into core types and
//! encode element-creation request bodies.

use crate::backend::TraversalResult;
use larder_core::{
    Edge, EdgeId, EdgeLabel, Error, Path, PathElement, PropertyMap, Result, Vertex, VertexId,
    VertexLabel,
};
use serde_json::{Map, Value, json};

// ============================================================================
// Decoding
// ============================================================================

/// Decodes a response `data` array into traversal results.
pub fn decode_results(data: &[Value]) -> Result<Vec<TraversalResult>> {
    data.iter().map(decode_element).collect()
}

/// Decodes a single response element.
pub fn decode_element(value: &Value) -> Result<TraversalResult> {
    if value.get("objects").is_some() {
        return Ok(TraversalResult::Path(decode_path(value)?));
    }
    match value.get("type").and_then(Value::as_str) {
        Some("vertex") => Ok(TraversalResult::Vertex(decode_vertex(value)?)),
        Some("edge") => Ok(TraversalResult::Edge(decode_edge(value)?)),
        // Some service versions omit "type" on edges; the endpoint fields
        // are the discriminator then.
        None if value.get("outV").is_some() => Ok(TraversalResult::Edge(decode_edge(value)?)),
        None if value.get("label").is_some() => Ok(TraversalResult::Vertex(decode_vertex(value)?)),
        other => Err(Error::query(format!(
            "unrecognized response element type: {other:?}"
        ))),
    }
}

/// Decodes a GraphSON vertex.
pub fn decode_vertex(value: &Value) -> Result<Vertex> {
    let id = id_string(require(value, "id")?)?;
    let label_raw = require(value, "label")?
        .as_str()
        .ok_or_else(|| Error::query("vertex label is not a string"))?;
    let label = VertexLabel::parse(label_raw)
        .ok_or_else(|| Error::query(format!("unknown vertex label: {label_raw:?}")))?;

    Ok(Vertex {
        id: VertexId::new(id),
        label,
        properties: vertex_properties(value.get("properties")),
    })
}

/// Decodes a GraphSON edge.
pub fn decode_edge(value: &Value) -> Result<Edge> {
    let id = id_string(require(value, "id")?)?;
    let label_raw = require(value, "label")?
        .as_str()
        .ok_or_else(|| Error::query("edge label is not a string"))?;
    let label = EdgeLabel::parse(label_raw)
        .ok_or_else(|| Error::query(format!("unknown edge label: {label_raw:?}")))?;
    let out_v = id_string(require(value, "outV")?)?;
    let in_v = id_string(require(value, "inV")?)?;

    Ok(Edge {
        id: EdgeId::new(id),
        label,
        out_v: VertexId::new(out_v),
        in_v: VertexId::new(in_v),
        properties: edge_properties(value.get("properties")),
    })
}

fn decode_path(value: &Value) -> Result<Path> {
    let objects = require(value, "objects")?
        .as_array()
        .ok_or_else(|| Error::query("path objects is not an array"))?;

    let mut elements = Vec::with_capacity(objects.len());
    for object in objects {
        match decode_element(object)? {
            TraversalResult::Vertex(v) => elements.push(PathElement::Vertex(v)),
            TraversalResult::Edge(e) => elements.push(PathElement::Edge(e)),
            TraversalResult::Path(_) => {
                return Err(Error::query("nested path in path objects"));
            }
        }
    }
    Ok(Path { elements })
}

fn require<'a>(value: &'a Value, key: &str) -> Result<&'a Value> {
    value
        .get(key)
        .ok_or_else(|| Error::query(format!("response element missing {key:?} field")))
}

/// Backend identifiers arrive as numbers or strings.
fn id_string(value: &Value) -> Result<String> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::query(format!("unsupported identifier: {other}"))),
    }
}

/// Vertex properties: `{"name": [{"id": _, "value": v}]}`. Single-valued
/// keys take the first entry. A plain value is accepted as a fallback.
fn vertex_properties(value: Option<&Value>) -> PropertyMap {
    let mut map = PropertyMap::new();
    let Some(Value::Object(obj)) = value else {
        return map;
    };
    for (key, entry) in obj {
        let resolved = match entry {
            Value::Array(items) => items
                .first()
                .and_then(|item| item.get("value"))
                .cloned()
                .unwrap_or(Value::Null),
            plain => plain.clone(),
        };
        if !resolved.is_null() {
            map.insert(key.clone(), resolved);
        }
    }
    map
}

/// Edge properties are plain key/value pairs.
fn edge_properties(value: Option<&Value>) -> PropertyMap {
    match value {
        Some(Value::Object(obj)) => obj
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        _ => PropertyMap::new(),
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes a vertex-creation request body.
pub fn encode_vertex(label: VertexLabel, properties: &PropertyMap) -> Value {
    json!({
        "label": label.name(),
        "properties": Value::Object(to_object(properties)),
    })
}

/// Encodes an edge-creation request body.
pub fn encode_edge(
    label: EdgeLabel,
    out_v: &VertexId,
    in_v: &VertexId,
    properties: &PropertyMap,
) -> Value {
    json!({
        "label": label.name(),
        "outV": out_v.as_str(),
        "inV": in_v.as_str(),
        "properties": Value::Object(to_object(properties)),
    })
}

/// Encodes an edge-update request body (properties are overwritten).
pub fn encode_edge_update(edge: &Edge) -> Value {
    encode_edge(edge.label, &edge.out_v, &edge.in_v, &edge.properties)
}

fn to_object(properties: &PropertyMap) -> Map<String, Value> {
    properties
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
