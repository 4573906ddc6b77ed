//! Canonical node and edge types for the knowledge graph
//!
//! The backend serializes type labels inconsistently across versions:
//! PascalCase enum names ("PackageManager"), snake_case column values
//! ("package_manager"), and plain lowercase ("dependency") all occur in the
//! wild. Normalization folds every spelling onto one canonical enum and never
//! fails; unknown labels degrade to [`NodeType::Unknown`] / [`EdgeKind::Other`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Canonical node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Repository,
    Dependency,
    Service,
    PackageManager,
    ServiceProvider,
    CodeElement,
    SecurityEntity,
    Unknown,
}

/// Node shape handed to the layout/drawing side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Dot,
    Box,
    Diamond,
    Star,
    Ellipse,
    Triangle,
    Hexagon,
}

impl NodeType {
    /// Normalize a raw type label to its canonical type.
    ///
    /// Lookup order: exact canonical spelling, then a case/underscore-folded
    /// match, then [`NodeType::Unknown`]. Pure and idempotent: feeding any
    /// output spelling back in yields the same canonical type.
    pub fn normalize(raw: &str) -> NodeType {
        match raw {
            "Repository" => return NodeType::Repository,
            "Dependency" => return NodeType::Dependency,
            "Service" => return NodeType::Service,
            "PackageManager" => return NodeType::PackageManager,
            "ServiceProvider" => return NodeType::ServiceProvider,
            "CodeElement" => return NodeType::CodeElement,
            "SecurityEntity" => return NodeType::SecurityEntity,
            _ => {}
        }
        match fold(raw).as_str() {
            "repository" => NodeType::Repository,
            "dependency" => NodeType::Dependency,
            "service" => NodeType::Service,
            "packagemanager" => NodeType::PackageManager,
            "serviceprovider" => NodeType::ServiceProvider,
            "codeelement" => NodeType::CodeElement,
            "securityentity" => NodeType::SecurityEntity,
            _ => NodeType::Unknown,
        }
    }

    /// Canonical spelling, as the backend's enum serialization emits it
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Repository => "Repository",
            NodeType::Dependency => "Dependency",
            NodeType::Service => "Service",
            NodeType::PackageManager => "PackageManager",
            NodeType::ServiceProvider => "ServiceProvider",
            NodeType::CodeElement => "CodeElement",
            NodeType::SecurityEntity => "SecurityEntity",
            NodeType::Unknown => "Unknown",
        }
    }

    /// Human-readable label shown in tooltips and node captions
    pub fn display_label(&self) -> &'static str {
        match self {
            NodeType::Repository => "Repository",
            NodeType::Dependency => "Dependency",
            NodeType::Service => "Service",
            NodeType::PackageManager => "Package Manager",
            NodeType::ServiceProvider => "Service Provider",
            NodeType::CodeElement => "Code Element",
            NodeType::SecurityEntity => "Security Entity",
            NodeType::Unknown => "Unknown",
        }
    }

    /// Fill color for the rendered node
    pub fn color(&self) -> &'static str {
        match self {
            NodeType::Repository => "#3f51b5",      // Indigo
            NodeType::Dependency => "#4caf50",      // Green
            NodeType::Service => "#ff9800",         // Orange
            NodeType::PackageManager => "#9c27b0",  // Purple
            NodeType::ServiceProvider => "#00bcd4", // Cyan
            NodeType::CodeElement => "#2196f3",     // Blue
            NodeType::SecurityEntity => "#f44336",  // Red
            NodeType::Unknown => "#9e9e9e",         // Gray
        }
    }

    /// Shape for the rendered node
    pub fn shape(&self) -> Shape {
        match self {
            NodeType::Repository => Shape::Star,
            NodeType::Dependency => Shape::Dot,
            NodeType::Service => Shape::Diamond,
            NodeType::PackageManager => Shape::Box,
            NodeType::ServiceProvider => Shape::Hexagon,
            NodeType::CodeElement => Shape::Ellipse,
            NodeType::SecurityEntity => Shape::Triangle,
            NodeType::Unknown => Shape::Dot,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_label())
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(NodeType::normalize(&raw))
    }
}

/// Canonical edge (relationship) type
///
/// Unlike nodes, edge types the table does not know keep their raw spelling in
/// [`EdgeKind::Other`] so a readable label can still be derived for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    DependsOn,
    UsesService,
    HasDependency,
    UsesPackageManager,
    ProvidedBy,
    RelatedTo,
    Other(String),
}

impl EdgeKind {
    /// Normalize a raw edge type label. Same lookup order as
    /// [`NodeType::normalize`]; unknown labels are retained verbatim.
    pub fn normalize(raw: &str) -> EdgeKind {
        match raw {
            "DependsOn" => return EdgeKind::DependsOn,
            "UsesService" => return EdgeKind::UsesService,
            "HasDependency" => return EdgeKind::HasDependency,
            "UsesPackageManager" => return EdgeKind::UsesPackageManager,
            "ProvidedBy" => return EdgeKind::ProvidedBy,
            "RelatedTo" => return EdgeKind::RelatedTo,
            _ => {}
        }
        match fold(raw).as_str() {
            "dependson" => EdgeKind::DependsOn,
            "usesservice" => EdgeKind::UsesService,
            "hasdependency" => EdgeKind::HasDependency,
            "usespackagemanager" => EdgeKind::UsesPackageManager,
            "providedby" => EdgeKind::ProvidedBy,
            "relatedto" => EdgeKind::RelatedTo,
            _ => EdgeKind::Other(raw.to_string()),
        }
    }

    /// Canonical spelling; [`EdgeKind::Other`] echoes its raw label
    pub fn as_str(&self) -> &str {
        match self {
            EdgeKind::DependsOn => "DependsOn",
            EdgeKind::UsesService => "UsesService",
            EdgeKind::HasDependency => "HasDependency",
            EdgeKind::UsesPackageManager => "UsesPackageManager",
            EdgeKind::ProvidedBy => "ProvidedBy",
            EdgeKind::RelatedTo => "RelatedTo",
            EdgeKind::Other(raw) => raw,
        }
    }

    /// Human-readable label.
    ///
    /// Table entries have fixed labels; anything else is approximated by
    /// splitting camelCase/snake_case into lowercase words, so a type the
    /// table has never seen still reads as words rather than raw identifiers.
    pub fn display_label(&self) -> String {
        match self {
            EdgeKind::DependsOn => "depends on".to_string(),
            EdgeKind::UsesService => "uses service".to_string(),
            EdgeKind::HasDependency => "has dependency".to_string(),
            EdgeKind::UsesPackageManager => "uses package manager".to_string(),
            EdgeKind::ProvidedBy => "provided by".to_string(),
            EdgeKind::RelatedTo => "related to".to_string(),
            EdgeKind::Other(raw) => split_words(raw),
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_label())
    }
}

impl Serialize for EdgeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EdgeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(EdgeKind::normalize(&raw))
    }
}

/// Fold a label for table lookup: lowercase, separators stripped
fn fold(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '_' && *c != '-' && *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split camelCase and snake_case into lowercase space-separated words
fn split_words(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for c in raw.chars() {
        if c == '_' || c == '-' {
            if !out.ends_with(' ') {
                out.push(' ');
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !out.ends_with(' ') {
            out.push(' ');
        }
        out.extend(c.to_lowercase());
        prev_lower = c.is_lowercase() || c.is_numeric();
    }
    out.trim().to_string()
}
