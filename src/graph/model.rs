//! Render-ready graph model
//!
//! Turns the raw node/edge payload into the structure the layout engine
//! consumes: canonical types, visual attributes, caption and tooltip text.
//! Node and edge ids pass through unchanged so selection events can be
//! correlated with the source records.

use super::edge::GraphEdge;
use super::node::GraphNode;
use super::types::{EdgeKind, NodeType, Shape};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Raw graph payload from `GET /api/repositories/{id}/graph`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

/// A node annotated for rendering
#[derive(Debug, Clone, Serialize)]
pub struct RenderNode {
    pub id: String,
    pub name: String,
    pub node_type: NodeType,
    /// Two-line caption: name, then the parenthesized type label
    pub label: String,
    /// Hover tooltip: name, type, one `key: value` line per property
    pub title: String,
    /// Decoded properties as display pairs, in payload order
    pub properties: Vec<(String, String)>,
    pub color: &'static str,
    pub shape: Shape,
}

/// An edge annotated for rendering; always drawn with an arrowhead toward
/// `target`
#[derive(Debug, Clone, Serialize)]
pub struct RenderEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub label: String,
    pub title: String,
}

/// Aggregate counts over a render model
#[derive(Debug, Clone, Serialize)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub nodes_by_type: BTreeMap<String, usize>,
    pub edges_by_kind: BTreeMap<String, usize>,
    /// Up to ten (node name, connection count) pairs, most connected first
    pub most_connected: Vec<(String, usize)>,
}

/// The structure handed to the layout engine
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderModel {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    /// Edges excluded because an endpoint id was absent from the node set
    pub dropped_edges: usize,
}

impl RenderModel {
    /// Build the render model from a raw payload.
    ///
    /// Edges whose source or target id is not in the node set are dropped and
    /// counted; the node set itself is never affected by a bad edge.
    pub fn build(graph: &KnowledgeGraph) -> RenderModel {
        let node_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

        let nodes = graph.nodes.iter().map(render_node).collect();

        let mut edges = Vec::with_capacity(graph.edges.len());
        let mut dropped = 0usize;
        for edge in &graph.edges {
            if !node_ids.contains(edge.source.as_str()) || !node_ids.contains(edge.target.as_str())
            {
                tracing::warn!(
                    source = %edge.source,
                    target = %edge.target,
                    kind = %edge.kind.as_str(),
                    "dropping edge with missing endpoint"
                );
                dropped += 1;
                continue;
            }
            edges.push(render_edge(edge));
        }

        RenderModel {
            nodes,
            edges,
            dropped_edges: dropped,
        }
    }

    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All edges touching the given node, in payload order
    pub fn edges_for(&self, node_id: &str) -> Vec<&RenderEdge> {
        self.edges
            .iter()
            .filter(|e| e.source == node_id || e.target == node_id)
            .collect()
    }

    /// Nodes one hop away from the given node
    pub fn neighbors(&self, node_id: &str) -> Vec<&RenderNode> {
        let ids: HashSet<&str> = self
            .edges
            .iter()
            .filter_map(|e| {
                if e.source == node_id {
                    Some(e.target.as_str())
                } else if e.target == node_id {
                    Some(e.source.as_str())
                } else {
                    None
                }
            })
            .collect();
        self.nodes.iter().filter(|n| ids.contains(n.id.as_str())).collect()
    }

    pub fn statistics(&self) -> GraphStatistics {
        let mut nodes_by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut edges_by_kind: BTreeMap<String, usize> = BTreeMap::new();
        let mut connections: HashMap<&str, usize> = HashMap::new();

        for node in &self.nodes {
            *nodes_by_type
                .entry(node.node_type.as_str().to_string())
                .or_insert(0) += 1;
            connections.entry(node.id.as_str()).or_insert(0);
        }
        for edge in &self.edges {
            *edges_by_kind
                .entry(edge.kind.as_str().to_string())
                .or_insert(0) += 1;
            *connections.entry(edge.source.as_str()).or_insert(0) += 1;
            *connections.entry(edge.target.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = connections.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let most_connected = ranked
            .into_iter()
            .take(10)
            .map(|(id, count)| {
                let name = self
                    .node(id)
                    .map(|n| n.name.clone())
                    .unwrap_or_else(|| id.to_string());
                (name, count)
            })
            .collect();

        GraphStatistics {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            nodes_by_type,
            edges_by_kind,
            most_connected,
        }
    }
}

fn render_node(node: &GraphNode) -> RenderNode {
    let type_label = node.node_type.display_label();

    let properties: Vec<(String, String)> = node
        .properties
        .iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect();

    let mut title = format!("{}\n{}", node.name, type_label);
    for (key, value) in &properties {
        title.push('\n');
        title.push_str(key);
        title.push_str(": ");
        title.push_str(value);
    }

    RenderNode {
        id: node.id.clone(),
        name: node.name.clone(),
        node_type: node.node_type,
        label: format!("{}\n({})", node.name, type_label),
        title,
        properties,
        color: node.node_type.color(),
        shape: node.node_type.shape(),
    }
}

fn render_edge(edge: &GraphEdge) -> RenderEdge {
    let label = edge.kind.display_label();
    let mut title = label.clone();
    for (key, value) in &edge.properties {
        title.push('\n');
        title.push_str(key);
        title.push_str(": ");
        title.push_str(&value.to_string());
    }

    RenderEdge {
        source: edge.source.clone(),
        target: edge.target.clone(),
        kind: edge.kind.clone(),
        label,
        title,
    }
}
