//! ArchLens Explorer
//!
//! Client-side subsystem for exploring an architecture knowledge graph
//! produced by an external analysis backend. The backend does the heavy
//! lifting (cloning, parsing, detection); this crate turns its payloads into
//! something a person can navigate:
//!
//! - [`graph`] — tolerant type canonicalization and the render model handed
//!   to the layout engine
//! - [`render`] — the narrow contract over the force-directed layout, with a
//!   bundled `force_graph` implementation
//! - [`api`] — the async HTTP client for the backend's REST surface
//! - [`entity`] — tabular entity records and detail bundles
//! - [`view`] — selection, cross-navigation, filtering/grouping, and the
//!   detail modal
//!
//! # Example
//!
//! ```no_run
//! use archlens::api::{ArchlensApi, RemoteClient};
//! use archlens::graph::RenderModel;
//!
//! # async fn run() -> archlens::api::ApiResult<()> {
//! let client = RemoteClient::new("http://localhost:8080");
//! let payload = client.graph("repo-id").await?;
//! let model = RenderModel::build(&payload);
//! println!("{} nodes, {} edges", model.nodes.len(), model.edges.len());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod entity;
pub mod graph;
pub mod render;
pub mod view;

// Re-export main types for convenience
pub use api::{ApiError, ApiResult, ArchlensApi, RemoteClient};
pub use config::ExplorerConfig;
pub use entity::{
    AnalysisSummary, CodeElement, Dependency, DetailBundle, EntityKind, Repository,
    SecurityEntity, Service, Severity, Vulnerability,
};
pub use graph::{
    EdgeKind, GraphEdge, GraphNode, KnowledgeGraph, NodeType, RenderModel, Shape,
};
pub use view::{
    FilterCriteria, FilterEngine, GroupKey, InteractionController, OverviewCounts, Tab,
    ViewContext,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
