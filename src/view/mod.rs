//! View layer: context, interaction, filtering, detail resolution
//!
//! Everything here runs on the single event-processing thread; backend calls
//! are async but state is mutated only by the owning controller.

pub mod context;
pub mod detail;
pub mod filter;
pub mod interaction;
pub mod overview;

pub use context::{Highlight, Tab, View, ViewContext, HIGHLIGHT_DURATION};
pub use detail::{bundle_sections, EntityDetailResolver, ModalSlot, ModalState, Section};
pub use filter::{FilterCriteria, FilterEngine, GroupKey, ListView, TabRecord, DISPLAY_THRESHOLD};
pub use interaction::{
    Connection, Direction, InteractionController, InteractionState, NodeSummary,
};
pub use overview::OverviewCounts;
