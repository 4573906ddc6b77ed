//! Graph node wire record

use super::property::{decode_properties, PropertyMap};
use super::types::NodeType;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node as delivered by the graph endpoint.
///
/// `id` is opaque and unique within one payload; it must survive the render
/// model unchanged so interaction events can be correlated back. The raw type
/// label is canonicalized during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", alias = "node_type", default = "unknown_type")]
    pub node_type: NodeType,
    #[serde(default, deserialize_with = "lenient_properties")]
    pub properties: PropertyMap,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        GraphNode {
            id: id.into(),
            name: name.into(),
            node_type,
            properties: PropertyMap::new(),
        }
    }
}

impl PartialEq for GraphNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GraphNode {}

impl std::hash::Hash for GraphNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

fn unknown_type() -> NodeType {
    NodeType::Unknown
}

pub(crate) fn lenient_properties<'de, D>(deserializer: D) -> Result<PropertyMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(decode_properties(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::NodeType;

    #[test]
    fn deserialize_with_object_properties() {
        let node: GraphNode = serde_json::from_str(
            r#"{"id": "n1", "name": "tokio", "type": "dependency",
                "properties": {"version": "1.35", "is_dev": false}}"#,
        )
        .unwrap();
        assert_eq!(node.node_type, NodeType::Dependency);
        assert_eq!(node.properties["version"].as_str(), Some("1.35"));
    }

    #[test]
    fn deserialize_with_string_encoded_properties() {
        let node: GraphNode = serde_json::from_str(
            r#"{"id": "n2", "name": "s3", "type": "Service",
                "properties": "{\"provider\": \"aws\"}"}"#,
        )
        .unwrap();
        assert_eq!(node.properties["provider"].as_str(), Some("aws"));
    }

    #[test]
    fn deserialize_with_broken_properties_keeps_node() {
        let node: GraphNode = serde_json::from_str(
            r#"{"id": "n3", "name": "x", "type": "repository", "properties": "{oops"}"#,
        )
        .unwrap();
        assert_eq!(node.node_type, NodeType::Repository);
        assert!(node.properties.is_empty());
    }

    #[test]
    fn missing_type_defaults_to_unknown() {
        let node: GraphNode = serde_json::from_str(r#"{"id": "n4", "name": "?"}"#).unwrap();
        assert_eq!(node.node_type, NodeType::Unknown);
    }

    #[test]
    fn identity_is_the_id() {
        let a = GraphNode::new("same", "one", NodeType::Service);
        let b = GraphNode::new("same", "two", NodeType::Dependency);
        assert_eq!(a, b);
    }
}
