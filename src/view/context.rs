//! Shared view context
//!
//! One explicit object holds the cross-component view state: which repository
//! is open, which view and tab are active, and the transient entity highlight.
//! The interaction layer is the only writer; everything else reads.

use crate::graph::NodeType;
use std::fmt;
use std::time::{Duration, Instant};

/// How long a navigation highlight stays visible
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(3);

/// Top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    RepositoryList,
    RepositoryDetail,
}

/// Tabs inside the repository-detail view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Overview,
    Dependencies,
    Services,
    Code,
    Security,
}

impl Tab {
    /// Target tab for a selected graph node.
    ///
    /// Package managers live on the dependencies tab and providers on the
    /// services tab — each lands on the tab that owns its grouping. Unknown
    /// falls back to the overview.
    pub fn for_node_type(node_type: NodeType) -> Tab {
        match node_type {
            NodeType::Repository => Tab::Overview,
            NodeType::Dependency | NodeType::PackageManager => Tab::Dependencies,
            NodeType::Service | NodeType::ServiceProvider => Tab::Services,
            NodeType::CodeElement => Tab::Code,
            NodeType::SecurityEntity => Tab::Security,
            NodeType::Unknown => Tab::Overview,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Dependencies => "dependencies",
            Tab::Services => "services",
            Tab::Code => "code",
            Tab::Security => "security",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transient visual highlight on one tab entry
#[derive(Debug, Clone)]
pub struct Highlight {
    pub entity_name: String,
    pub expires_at: Instant,
}

impl Highlight {
    pub fn is_active(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// The shared view state
#[derive(Debug, Default)]
pub struct ViewContext {
    pub current_repository: Option<String>,
    pub view: View,
    pub active_tab: Tab,
    highlight: Option<Highlight>,
}

impl ViewContext {
    pub fn new() -> Self {
        ViewContext::default()
    }

    pub fn open_repository(&mut self, repo_id: impl Into<String>) {
        self.current_repository = Some(repo_id.into());
        self.view = View::RepositoryDetail;
        self.active_tab = Tab::Overview;
        self.highlight = None;
    }

    pub fn activate_tab(&mut self, tab: Tab) {
        self.view = View::RepositoryDetail;
        self.active_tab = tab;
    }

    /// Apply a highlight that expires [`HIGHLIGHT_DURATION`] after `now`
    pub fn set_highlight(&mut self, entity_name: impl Into<String>, now: Instant) {
        self.highlight = Some(Highlight {
            entity_name: entity_name.into(),
            expires_at: now + HIGHLIGHT_DURATION,
        });
    }

    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    /// The highlighted entity name, if the highlight has not expired
    pub fn active_highlight(&self, now: Instant) -> Option<&str> {
        self.highlight
            .as_ref()
            .filter(|h| h.is_active(now))
            .map(|h| h.entity_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_to_tab_mapping() {
        assert_eq!(Tab::for_node_type(NodeType::Dependency), Tab::Dependencies);
        assert_eq!(Tab::for_node_type(NodeType::PackageManager), Tab::Dependencies);
        assert_eq!(Tab::for_node_type(NodeType::Service), Tab::Services);
        assert_eq!(Tab::for_node_type(NodeType::ServiceProvider), Tab::Services);
        assert_eq!(Tab::for_node_type(NodeType::CodeElement), Tab::Code);
        assert_eq!(Tab::for_node_type(NodeType::SecurityEntity), Tab::Security);
        assert_eq!(Tab::for_node_type(NodeType::Repository), Tab::Overview);
        assert_eq!(Tab::for_node_type(NodeType::Unknown), Tab::Overview);
    }

    #[test]
    fn highlight_expires_after_three_seconds() {
        let mut ctx = ViewContext::new();
        let now = Instant::now();
        ctx.set_highlight("tokio", now);

        assert_eq!(ctx.active_highlight(now), Some("tokio"));
        assert_eq!(
            ctx.active_highlight(now + Duration::from_millis(2999)),
            Some("tokio")
        );
        assert_eq!(ctx.active_highlight(now + Duration::from_secs(3)), None);
    }

    #[test]
    fn opening_a_repository_resets_tab_and_highlight() {
        let mut ctx = ViewContext::new();
        ctx.open_repository("r1");
        ctx.activate_tab(Tab::Security);
        ctx.set_highlight("role", Instant::now());

        ctx.open_repository("r2");
        assert_eq!(ctx.active_tab, Tab::Overview);
        assert_eq!(ctx.view, View::RepositoryDetail);
        assert!(ctx.active_highlight(Instant::now()).is_none());
    }
}
