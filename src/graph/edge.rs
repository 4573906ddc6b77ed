//! Graph edge wire record

use super::node::lenient_properties;
use super::property::PropertyMap;
use super::types::EdgeKind;
use serde::{Deserialize, Serialize};

/// A directed edge as delivered by the graph endpoint.
///
/// `source` and `target` reference node ids from the same payload. Payloads
/// occasionally contain edges pointing at nodes that were filtered out
/// upstream; those are dropped while building the render model, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(alias = "source_node_id")]
    pub source: String,
    #[serde(alias = "target_node_id")]
    pub target: String,
    #[serde(rename = "type", alias = "edge_type", default = "related_to")]
    pub kind: EdgeKind,
    #[serde(default, deserialize_with = "lenient_properties")]
    pub properties: PropertyMap,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        GraphEdge {
            source: source.into(),
            target: target.into(),
            kind,
            properties: PropertyMap::new(),
        }
    }

    /// Whether the edge touches the given node, in either direction
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    pub fn starts_from(&self, node_id: &str) -> bool {
        self.source == node_id
    }

    pub fn ends_at(&self, node_id: &str) -> bool {
        self.target == node_id
    }
}

fn related_to() -> EdgeKind {
    EdgeKind::RelatedTo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_snake_case_aliases() {
        let edge: GraphEdge = serde_json::from_str(
            r#"{"source_node_id": "a", "target_node_id": "b", "edge_type": "has_dependency"}"#,
        )
        .unwrap();
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
        assert_eq!(edge.kind, EdgeKind::HasDependency);
    }

    #[test]
    fn direction_helpers() {
        let edge = GraphEdge::new("a", "b", EdgeKind::UsesService);
        assert!(edge.touches("a"));
        assert!(edge.touches("b"));
        assert!(!edge.touches("c"));
        assert!(edge.starts_from("a"));
        assert!(edge.ends_at("b"));
        assert!(!edge.starts_from("b"));
    }

    #[test]
    fn missing_kind_defaults_to_related_to() {
        let edge: GraphEdge =
            serde_json::from_str(r#"{"source": "a", "target": "b"}"#).unwrap();
        assert_eq!(edge.kind, EdgeKind::RelatedTo);
    }
}
