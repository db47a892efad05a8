//! Graph schema model.
//!
//! The remote service requires property keys, labels, and indexes to be
//! declared before use. [`Schema::interaction_graph`] is the schema the
//! store bootstraps once per graph; its wire form uses the camelCase field
//! names the service expects.

use serde::{Deserialize, Serialize};

/// Data type of a property key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// UTF-8 string.
    String,
    /// 64-bit integer.
    Integer,
    /// Boolean.
    Boolean,
    /// Floating point.
    Float,
}

/// Cardinality of a property key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cardinality {
    /// At most one value per element.
    Single,
}

/// A declared property key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyKey {
    /// Property name.
    pub name: String,
    /// Value data type.
    pub data_type: DataType,
    /// Value cardinality.
    pub cardinality: Cardinality,
}

impl PropertyKey {
    /// Declares a single-valued string property key.
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::String,
            cardinality: Cardinality::Single,
        }
    }
}

/// A declared vertex or edge label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelDecl {
    /// Label name.
    pub name: String,
}

impl LabelDecl {
    /// Declares a label.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A declared vertex index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexIndex {
    /// Index name.
    pub name: String,
    /// Indexed property keys.
    pub property_keys: Vec<String>,
    /// Whether this is a composite index.
    pub composite: bool,
    /// Whether indexed values are unique.
    pub unique: bool,
}

/// A graph schema: property keys, labels, and indexes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Declared property keys.
    #[serde(default)]
    pub property_keys: Vec<PropertyKey>,
    /// Declared vertex labels.
    #[serde(default)]
    pub vertex_labels: Vec<LabelDecl>,
    /// Declared edge labels.
    #[serde(default)]
    pub edge_labels: Vec<LabelDecl>,
    /// Declared vertex indexes.
    #[serde(default)]
    pub vertex_indexes: Vec<VertexIndex>,
    /// Declared edge indexes.
    #[serde(default)]
    pub edge_indexes: Vec<VertexIndex>,
}

impl Schema {
    /// Whether this schema has been populated.
    ///
    /// The bootstrapper treats a schema with no property keys as absent.
    pub fn is_initialized(&self) -> bool {
        !self.property_keys.is_empty()
    }

    /// The interaction-graph schema the store bootstraps.
    ///
    /// The `has` edge label is written by the membership ledger but is not
    /// declared here; the deployed service tolerates undeclared edge
    /// labels, and declaring it now would diverge from the schema of
    /// existing populated graphs.
    pub fn interaction_graph() -> Self {
        Self {
            property_keys: vec![
                PropertyKey::string("name"),
                PropertyKey::string("title"),
                PropertyKey::string("detail"),
            ],
            vertex_labels: vec![
                LabelDecl::new("person"),
                LabelDecl::new("ingredient"),
                LabelDecl::new("cuisine"),
                LabelDecl::new("recipe"),
            ],
            edge_labels: vec![LabelDecl::new("selects")],
            vertex_indexes: vec![VertexIndex {
                name: "vertexByName".to_string(),
                property_keys: vec!["name".to_string()],
                composite: true,
                unique: true,
            }],
            edge_indexes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_schema_is_uninitialized() {
        assert!(!Schema::default().is_initialized());
    }

    #[test]
    fn test_interaction_graph_contents() {
        let schema = Schema::interaction_graph();
        assert!(schema.is_initialized());

        let keys: Vec<&str> = schema.property_keys.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(keys, ["name", "title", "detail"]);

        let vertices: Vec<&str> = schema.vertex_labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(vertices, ["person", "ingredient", "cuisine", "recipe"]);

        // "has" is intentionally absent.
        let edges: Vec<&str> = schema.edge_labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(edges, ["selects"]);

        assert_eq!(schema.vertex_indexes.len(), 1);
        let index = &schema.vertex_indexes[0];
        assert_eq!(index.name, "vertexByName");
        assert_eq!(index.property_keys, ["name"]);
        assert!(index.composite);
        assert!(index.unique);
    }

    #[test]
    fn test_wire_form_is_camel_case() {
        let json = serde_json::to_value(Schema::interaction_graph()).unwrap();
        assert!(json.get("propertyKeys").is_some());
        assert!(json.get("vertexLabels").is_some());
        assert!(json.get("edgeLabels").is_some());
        assert!(json.get("vertexIndexes").is_some());
        assert_eq!(json["propertyKeys"][0]["dataType"], "String");
        assert_eq!(json["propertyKeys"][0]["cardinality"], "SINGLE");
    }

    #[test]
    fn test_schema_round_trip() {
        let schema = Schema::interaction_graph();
        let json = serde_json::to_string(&schema).unwrap();
        let parsed: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);
    }
}
