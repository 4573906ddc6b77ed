//! Force-directed layout over the `force_graph` crate

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use std::collections::HashMap;
use std::f32::consts::PI;

use super::{Cursor, GraphEvent, LayoutSurface, PlacedEdge, PlacedNode, Viewport};
use crate::graph::{RenderModel, Shape};

/// Per-node payload carried through the simulation
#[derive(Clone, Debug)]
struct NodeVisual {
    id: String,
    label: String,
    color: String,
    shape: Shape,
    /// Connectivity-based size multiplier, 1.0 for an isolated node
    base_size: f32,
}

const BASE_RADIUS: f32 = 12.0;
const HOVER_WEIGHT: f32 = 1.3;
const SELECT_WEIGHT: f32 = 1.6;
/// Total movement per tick below which the layout counts as settled
const STABLE_EPSILON: f32 = 0.5;

/// Bundled [`LayoutSurface`] implementation
pub struct ForceLayout {
    graph: ForceGraph<NodeVisual, ()>,
    index: HashMap<String, DefaultNodeIdx>,
    edges: Vec<(DefaultNodeIdx, DefaultNodeIdx, String)>,
    hovered: Option<String>,
    selected: Option<String>,
    viewport: Viewport,
    width: f32,
    height: f32,
    last_movement: f32,
    ticked: bool,
}

impl ForceLayout {
    pub fn new(width: f32, height: f32) -> Self {
        ForceLayout {
            graph: Self::empty_graph(),
            index: HashMap::new(),
            edges: Vec::new(),
            hovered: None,
            selected: None,
            viewport: Viewport::default(),
            width,
            height,
            last_movement: f32::MAX,
            ticked: false,
        }
    }

    fn empty_graph() -> ForceGraph<NodeVisual, ()> {
        ForceGraph::new(SimulationParameters {
            force_charge: 160.0,
            force_spring: 0.04,
            force_max: 100.0,
            node_speed: 2000.0,
            damping_factor: 0.92,
        })
    }

    /// Screen coordinates to graph coordinates through the viewport
    fn to_graph(&self, sx: f32, sy: f32) -> (f32, f32) {
        (
            (sx - self.viewport.x) / self.viewport.k,
            (sy - self.viewport.y) / self.viewport.k,
        )
    }

    fn node_at(&self, sx: f32, sy: f32) -> Option<String> {
        let (gx, gy) = self.to_graph(sx, sy);
        let mut found = None;
        self.graph.visit_nodes(|node| {
            let dx = node.x() - gx;
            let dy = node.y() - gy;
            let radius = BASE_RADIUS * node.data.user_data.base_size;
            if (dx * dx + dy * dy).sqrt() < radius {
                found = Some(node.data.user_data.id.clone());
            }
        });
        found
    }

    fn weight_for(&self, id: &str) -> f32 {
        if self.selected.as_deref() == Some(id) {
            SELECT_WEIGHT
        } else if self.hovered.as_deref() == Some(id) {
            HOVER_WEIGHT
        } else {
            1.0
        }
    }
}

impl LayoutSurface for ForceLayout {
    fn load(&mut self, model: &RenderModel) {
        self.graph = Self::empty_graph();
        self.index.clear();
        self.edges.clear();
        self.hovered = None;
        self.selected = None;
        self.last_movement = f32::MAX;
        self.ticked = false;

        // Connection counts drive the base size, like the caption side does
        let mut degree: HashMap<&str, usize> = HashMap::new();
        for edge in &model.edges {
            *degree.entry(edge.source.as_str()).or_insert(0) += 1;
            *degree.entry(edge.target.as_str()).or_insert(0) += 1;
        }
        let max_degree = degree.values().copied().max().unwrap_or(1).max(1);

        let count = model.nodes.len().max(1);
        for (i, node) in model.nodes.iter().enumerate() {
            // Initial ring placement around the center; the simulation takes
            // it from there
            let angle = (i as f32) * 2.0 * PI / count as f32;
            let x = self.width / 2.0 + 100.0 * angle.cos();
            let y = self.height / 2.0 + 100.0 * angle.sin();

            let node_degree = degree.get(node.id.as_str()).copied().unwrap_or(0);
            let base_size = 1.0 + 0.6 * (node_degree as f32 / max_degree as f32).sqrt();

            let idx = self.graph.add_node(NodeData {
                x,
                y,
                mass: 10.0,
                is_anchor: false,
                user_data: NodeVisual {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    color: node.color.to_string(),
                    shape: node.shape,
                    base_size,
                },
            });
            self.index.insert(node.id.clone(), idx);
        }

        for edge in &model.edges {
            if let (Some(&src), Some(&tgt)) =
                (self.index.get(&edge.source), self.index.get(&edge.target))
            {
                self.graph.add_edge(src, tgt, EdgeData::default());
                self.edges.push((src, tgt, edge.label.clone()));
            }
        }
    }

    fn tick(&mut self, dt: f32) {
        let before: Vec<(f32, f32)> = {
            let mut positions = Vec::new();
            self.graph.visit_nodes(|node| positions.push((node.x(), node.y())));
            positions
        };

        self.graph.update(dt);

        let mut movement = 0.0;
        let mut i = 0;
        self.graph.visit_nodes(|node| {
            if let Some((px, py)) = before.get(i) {
                movement += (node.x() - px).abs() + (node.y() - py).abs();
            }
            i += 1;
        });
        self.last_movement = movement;
        self.ticked = true;
    }

    fn is_stable(&self) -> bool {
        self.ticked && self.last_movement < STABLE_EPSILON
    }

    fn placed_nodes(&self) -> Vec<PlacedNode> {
        let mut placed = Vec::with_capacity(self.index.len());
        self.graph.visit_nodes(|node| {
            let visual = &node.data.user_data;
            let weight = self.weight_for(&visual.id);
            placed.push(PlacedNode {
                id: visual.id.clone(),
                label: visual.label.clone(),
                x: node.x(),
                y: node.y(),
                size: BASE_RADIUS * visual.base_size * weight,
                color: visual.color.clone(),
                shape: visual.shape,
                selected: self.selected.as_deref() == Some(visual.id.as_str()),
                hovered: self.hovered.as_deref() == Some(visual.id.as_str()),
            });
        });
        placed
    }

    fn placed_edges(&self) -> Vec<PlacedEdge> {
        let mut positions: HashMap<DefaultNodeIdx, (f32, f32)> = HashMap::new();
        self.graph
            .visit_nodes(|node| {
                positions.insert(node.index(), (node.x(), node.y()));
            });

        self.edges
            .iter()
            .filter_map(|(src, tgt, label)| {
                let &(fx, fy) = positions.get(src)?;
                let &(tx, ty) = positions.get(tgt)?;
                Some(PlacedEdge {
                    from_x: fx,
                    from_y: fy,
                    to_x: tx,
                    to_y: ty,
                    label: label.clone(),
                })
            })
            .collect()
    }

    fn click(&mut self, x: f32, y: f32) -> Option<GraphEvent> {
        let hit = self.node_at(x, y)?;
        self.selected = Some(hit.clone());
        Some(GraphEvent::NodeSelected(hit))
    }

    fn hover(&mut self, x: f32, y: f32) -> Cursor {
        match self.node_at(x, y) {
            Some(id) => {
                self.hovered = Some(id);
                Cursor::Pointer
            }
            None => {
                self.hovered = None;
                Cursor::Default
            }
        }
    }

    fn drag(&mut self, node_id: &str, x: f32, y: f32) {
        let Some(&idx) = self.index.get(node_id) else {
            return;
        };
        let (gx, gy) = self.to_graph(x, y);
        self.graph.visit_nodes_mut(|node| {
            if node.index() == idx {
                node.data.x = gx;
                node.data.y = gy;
                node.data.is_anchor = true;
            }
        });
    }

    fn pan(&mut self, dx: f32, dy: f32) {
        self.viewport.x += dx;
        self.viewport.y += dy;
    }

    fn zoom(&mut self, factor: f32) {
        self.viewport.k = (self.viewport.k * factor).clamp(0.1, 10.0);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
