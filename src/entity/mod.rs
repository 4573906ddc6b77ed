//! Domain entity records
//!
//! Entities are the tabular counterparts of graph nodes: fetched per
//! repository, cached per tab, replaced wholesale on reload.

pub mod detail;
pub mod records;
pub mod security;

pub use detail::{
    CallLink, CodeElementDetail, DependencyDetail, DependencyLink, DetailBundle, EntityKind,
    SecurityEntityDetail, SecurityRelationship, ServiceDetail, ServiceLink,
};
pub use records::{
    AnalysisSummary, CodeElement, Dependency, NewRepository, Repository, Service,
};
pub use security::{configuration_lines, SecurityEntity, Severity, Vulnerability};
