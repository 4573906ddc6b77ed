//! Knowledge-graph data model
//!
//! Wire records for nodes and edges, tolerant type canonicalization, and the
//! render model handed to the layout engine.

pub mod edge;
pub mod model;
pub mod node;
pub mod property;
pub mod types;

pub use edge::GraphEdge;
pub use model::{GraphStatistics, KnowledgeGraph, RenderEdge, RenderModel, RenderNode};
pub use node::GraphNode;
pub use property::{decode_properties, PropertyMap, PropertyValue};
pub use types::{EdgeKind, NodeType, Shape};
