//! Node selection and cross-navigation
//!
//! One controller per graph-view instance. Selecting a node produces a
//! summary (properties plus directional connections) and a target tab;
//! navigation activates that tab, waits for its list to load, and highlights
//! the matching entry. The highlight step depends on the load completing,
//! not on a timer.

use std::time::Instant;

use crate::api::{ApiResult, ArchlensApi};
use crate::graph::{NodeType, RenderModel};
use crate::view::context::{Tab, ViewContext};
use crate::view::filter::FilterEngine;

/// Direction of a connection relative to the selected node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    pub fn symbol(&self) -> &'static str {
        match self {
            Direction::Outgoing => "\u{2192}", // →
            Direction::Incoming => "\u{2190}", // ←
        }
    }
}

/// One edge of the selected node, seen from its side
#[derive(Debug, Clone)]
pub struct Connection {
    pub direction: Direction,
    /// Display name of the other endpoint
    pub other: String,
    /// Edge display label
    pub label: String,
}

/// Detail summary for a selected node
#[derive(Debug, Clone)]
pub struct NodeSummary {
    pub id: String,
    pub name: String,
    pub node_type: NodeType,
    pub type_label: String,
    pub properties: Vec<(String, String)>,
    pub connections: Vec<Connection>,
    pub target_tab: Tab,
}

/// Controller state: Idle, a node selected, or the detail modal on top
#[derive(Debug, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    NodeSelected(NodeSummary),
    ModalOpen(NodeSummary),
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        InteractionController::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selection(&self) -> Option<&NodeSummary> {
        match &self.state {
            InteractionState::Idle => None,
            InteractionState::NodeSelected(summary) | InteractionState::ModalOpen(summary) => {
                Some(summary)
            }
        }
    }

    /// Handle a node-selection event from the graph surface.
    ///
    /// Unknown ids leave the controller idle; the graph and the model can
    /// briefly disagree while a reload is in flight.
    pub fn select(&mut self, model: &RenderModel, node_id: &str) -> Option<&NodeSummary> {
        let Some(node) = model.node(node_id) else {
            tracing::debug!(node_id, "selection for unknown node ignored");
            self.state = InteractionState::Idle;
            return None;
        };

        let connections = model
            .edges_for(node_id)
            .into_iter()
            .map(|edge| {
                let (direction, other_id) = if edge.source == node_id {
                    (Direction::Outgoing, edge.target.as_str())
                } else {
                    (Direction::Incoming, edge.source.as_str())
                };
                let other = model
                    .node(other_id)
                    .map(|n| n.name.clone())
                    .unwrap_or_else(|| other_id.to_string());
                Connection {
                    direction,
                    other,
                    label: edge.label.clone(),
                }
            })
            .collect();

        self.state = InteractionState::NodeSelected(NodeSummary {
            id: node.id.clone(),
            name: node.name.clone(),
            node_type: node.node_type,
            type_label: node.node_type.display_label().to_string(),
            properties: node.properties.clone(),
            connections,
            target_tab: Tab::for_node_type(node.node_type),
        });
        self.selection()
    }

    pub fn deselect(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn modal_opened(&mut self) {
        if let InteractionState::NodeSelected(summary) = std::mem::take(&mut self.state) {
            self.state = InteractionState::ModalOpen(summary);
        }
    }

    pub fn modal_closed(&mut self) {
        if let InteractionState::ModalOpen(summary) = std::mem::take(&mut self.state) {
            self.state = InteractionState::NodeSelected(summary);
        }
    }

    /// Deep-navigate from the current selection into its tab.
    ///
    /// Switches to the repository-detail view, activates the mapped tab,
    /// awaits that tab's list load, then highlights the first entry whose
    /// name contains the node's name (case-insensitively). Returns the
    /// highlighted name; `None` when nothing matched (which is silent) or
    /// when there is no selection or repository context.
    pub async fn navigate(
        &mut self,
        client: &dyn ArchlensApi,
        ctx: &mut ViewContext,
        engine: &mut FilterEngine,
        now: Instant,
    ) -> ApiResult<Option<String>> {
        let Some(summary) = self.selection() else {
            return Ok(None);
        };
        let Some(repo_id) = ctx.current_repository.clone() else {
            return Ok(None);
        };
        let tab = summary.target_tab;
        let needle = summary.name.to_lowercase();

        // activate_tab also switches to the repository-detail view if the
        // graph was opened from the list view
        ctx.activate_tab(tab);
        // A highlight from a previous navigation must not linger on the new tab
        ctx.clear_highlight();
        engine.activate_tab(client, &repo_id, tab).await?;

        let matched = engine
            .names_on_tab(tab)
            .into_iter()
            .find(|name| name.to_lowercase().contains(&needle))
            .map(str::to_string);

        if let Some(name) = &matched {
            ctx.set_highlight(name.clone(), now);
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::KnowledgeGraph;
    use serde_json::json;

    fn model() -> RenderModel {
        let graph: KnowledgeGraph = serde_json::from_value(json!({
            "nodes": [
                {"id": "r", "name": "billing-api", "type": "Repository"},
                {"id": "d", "name": "stripe", "type": "dependency",
                 "properties": {"version": "5.1.0"}},
                {"id": "s", "name": "S3", "type": "service"}
            ],
            "edges": [
                {"source": "r", "target": "d", "type": "has_dependency"},
                {"source": "r", "target": "s", "type": "uses_service"},
                {"source": "d", "target": "s", "type": "related_to"}
            ]
        }))
        .unwrap();
        RenderModel::build(&graph)
    }

    #[test]
    fn select_builds_directional_connections() {
        let model = model();
        let mut controller = InteractionController::new();
        let summary = controller.select(&model, "d").unwrap();

        assert_eq!(summary.name, "stripe");
        assert_eq!(summary.target_tab, Tab::Dependencies);
        assert_eq!(summary.properties, vec![("version".to_string(), "5.1.0".to_string())]);

        assert_eq!(summary.connections.len(), 2);
        let incoming = &summary.connections[0];
        assert_eq!(incoming.direction, Direction::Incoming);
        assert_eq!(incoming.other, "billing-api");
        assert_eq!(incoming.label, "has dependency");

        let outgoing = &summary.connections[1];
        assert_eq!(outgoing.direction, Direction::Outgoing);
        assert_eq!(outgoing.other, "S3");
        assert_eq!(outgoing.label, "related to");
    }

    #[test]
    fn unknown_node_leaves_controller_idle() {
        let model = model();
        let mut controller = InteractionController::new();
        assert!(controller.select(&model, "nope").is_none());
        assert!(matches!(controller.state(), InteractionState::Idle));
    }

    #[test]
    fn state_machine_walks_idle_selected_modal_idle() {
        let model = model();
        let mut controller = InteractionController::new();
        assert!(matches!(controller.state(), InteractionState::Idle));

        controller.select(&model, "s");
        assert!(matches!(controller.state(), InteractionState::NodeSelected(_)));

        controller.modal_opened();
        assert!(matches!(controller.state(), InteractionState::ModalOpen(_)));

        controller.modal_closed();
        assert!(matches!(controller.state(), InteractionState::NodeSelected(_)));

        controller.deselect();
        assert!(matches!(controller.state(), InteractionState::Idle));
    }

    #[test]
    fn direction_symbols() {
        assert_eq!(Direction::Outgoing.symbol(), "→");
        assert_eq!(Direction::Incoming.symbol(), "←");
    }
}
