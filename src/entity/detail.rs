//! Entity detail bundles
//!
//! The detail endpoint returns the primary record plus a kind-dependent set
//! of relationship lists. Every list is optional on the wire; absent lists
//! deserialize as empty and are omitted from rendering.

use super::records::{CodeElement, Dependency, Service};
use super::security::{SecurityEntity, Vulnerability};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity kind as it appears in the detail-endpoint path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Dependency,
    Service,
    CodeElement,
    SecurityEntity,
}

impl EntityKind {
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            EntityKind::Dependency => "dependency",
            EntityKind::Service => "service",
            EntityKind::CodeElement => "code_element",
            EntityKind::SecurityEntity => "security_entity",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_path_segment())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "dependency" | "dependencies" => Ok(EntityKind::Dependency),
            "service" | "services" => Ok(EntityKind::Service),
            "code_element" | "code" => Ok(EntityKind::CodeElement),
            "security_entity" | "security" => Ok(EntityKind::SecurityEntity),
            other => Err(format!("unknown entity kind: {}", other)),
        }
    }
}

/// A service referenced from another entity's detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLink {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub relationship_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub evidence: Option<String>,
}

/// A dependency referenced from another entity's detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyLink {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub package_manager: String,
    #[serde(default)]
    pub relationship_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub evidence: Option<String>,
}

/// A caller or callee of a code element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLink {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub line_number: Option<u32>,
    #[serde(default)]
    pub call_type: Option<String>,
}

/// A relationship between two security entities, with granted permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityRelationship {
    pub entity: SecurityEntity,
    #[serde(default)]
    pub relationship_type: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependencyDetail {
    pub entity: Dependency,
    #[serde(default)]
    pub related_services: Vec<ServiceLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDetail {
    pub entity: Service,
    #[serde(default)]
    pub related_dependencies: Vec<DependencyLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeElementDetail {
    pub entity: CodeElement,
    #[serde(default)]
    pub callers: Vec<CallLink>,
    #[serde(default)]
    pub callees: Vec<CallLink>,
    /// Elements in the same source file
    #[serde(default)]
    pub related_elements: Vec<CodeElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityEntityDetail {
    pub entity: SecurityEntity,
    #[serde(default)]
    pub relationships: Vec<SecurityRelationship>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    /// Entities from the same provider
    #[serde(default)]
    pub related_entities: Vec<SecurityEntity>,
    #[serde(default)]
    pub related_security_entities: Vec<SecurityEntity>,
}

/// Full detail payload for one entity
#[derive(Debug, Clone)]
pub enum DetailBundle {
    Dependency(DependencyDetail),
    Service(ServiceDetail),
    CodeElement(CodeElementDetail),
    SecurityEntity(SecurityEntityDetail),
}

impl DetailBundle {
    pub fn kind(&self) -> EntityKind {
        match self {
            DetailBundle::Dependency(_) => EntityKind::Dependency,
            DetailBundle::Service(_) => EntityKind::Service,
            DetailBundle::CodeElement(_) => EntityKind::CodeElement,
            DetailBundle::SecurityEntity(_) => EntityKind::SecurityEntity,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DetailBundle::Dependency(d) => &d.entity.name,
            DetailBundle::Service(d) => &d.entity.name,
            DetailBundle::CodeElement(d) => &d.entity.name,
            DetailBundle::SecurityEntity(d) => &d.entity.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_path_segments() {
        assert_eq!(EntityKind::CodeElement.as_path_segment(), "code_element");
        assert_eq!("security".parse::<EntityKind>().unwrap(), EntityKind::SecurityEntity);
        assert!("widget".parse::<EntityKind>().is_err());
    }

    #[test]
    fn absent_lists_deserialize_empty() {
        let detail: CodeElementDetail = serde_json::from_str(
            r#"{"entity": {"id": "c1", "name": "handler", "element_type": "function",
                "language": "python", "file_path": "src/app.py", "line_number": 10}}"#,
        )
        .unwrap();
        assert!(detail.callers.is_empty());
        assert!(detail.callees.is_empty());
        assert!(detail.related_elements.is_empty());
    }

    #[test]
    fn security_relationship_carries_permissions() {
        let detail: SecurityEntityDetail = serde_json::from_str(
            r#"{"entity": {"id": "e1", "name": "app-role", "entity_type": "IamRole",
                           "file_path": "infra/iam.tf"},
                "relationships": [{
                    "entity": {"id": "e2", "name": "assets", "entity_type": "S3Bucket",
                               "file_path": "infra/s3.tf"},
                    "relationship_type": "allows_access",
                    "permissions": ["s3:GetObject", "s3:PutObject"]
                }]}"#,
        )
        .unwrap();
        assert_eq!(detail.relationships.len(), 1);
        assert_eq!(detail.relationships[0].permissions.len(), 2);
    }
}
