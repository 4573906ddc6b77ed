//! Entity detail resolution and the detail modal
//!
//! One modal exists at a time. Opens are tagged with a monotonic token so a
//! slow response for a previous entity can never overwrite a newer one.

use crate::api::{ApiError, ApiResult, ArchlensApi};
use crate::entity::{
    configuration_lines, CodeElementDetail, DependencyDetail, DetailBundle, EntityKind,
    SecurityEntityDetail, ServiceDetail,
};

/// A titled block of display lines; empty sections are never produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
}

impl Section {
    fn new(title: &str, lines: Vec<String>) -> Option<Section> {
        if lines.is_empty() {
            None
        } else {
            Some(Section {
                title: title.to_string(),
                lines,
            })
        }
    }
}

/// What the modal currently shows
#[derive(Debug)]
pub enum ModalState {
    Loading,
    Ready(DetailBundle),
    NotFound(String),
    Failed(String),
}

/// The single detail-modal slot.
///
/// `begin` hands out a token and puts the slot into `Loading`; `complete`
/// applies a result only when its token is still the latest.
#[derive(Debug, Default)]
pub struct ModalSlot {
    next_token: u64,
    latest: u64,
    state: Option<ModalState>,
}

impl ModalSlot {
    pub fn new() -> Self {
        ModalSlot::default()
    }

    /// Open (or replace) the modal; returns the token the eventual result
    /// must present
    pub fn begin(&mut self) -> u64 {
        self.next_token += 1;
        self.latest = self.next_token;
        self.state = Some(ModalState::Loading);
        self.latest
    }

    /// Apply a fetch result. Returns false (and changes nothing) when the
    /// token is stale.
    pub fn complete(&mut self, token: u64, result: ApiResult<DetailBundle>) -> bool {
        if token != self.latest {
            tracing::debug!(token, latest = self.latest, "discarding stale detail response");
            return false;
        }
        self.state = Some(match result {
            Ok(bundle) => ModalState::Ready(bundle),
            Err(err) if err.is_not_found() => ModalState::NotFound(err.to_string()),
            Err(err) => ModalState::Failed(err.to_string()),
        });
        true
    }

    pub fn state(&self) -> Option<&ModalState> {
        self.state.as_ref()
    }

    pub fn close(&mut self) {
        // A fetch still in flight for the closed modal must not reopen it
        self.latest = self.next_token + 1;
        self.state = None;
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }
}

/// Fetches one entity's detail bundle and manages the modal slot
pub struct EntityDetailResolver {
    modal: ModalSlot,
}

impl EntityDetailResolver {
    pub fn new() -> Self {
        EntityDetailResolver {
            modal: ModalSlot::new(),
        }
    }

    pub fn modal(&self) -> &ModalSlot {
        &self.modal
    }

    pub fn close(&mut self) {
        self.modal.close();
    }

    /// Resolve and open the detail modal for one entity.
    ///
    /// A concurrent older open is not cancelled; its response is discarded
    /// by the token check when it lands.
    pub async fn open(
        &mut self,
        client: &dyn ArchlensApi,
        repo_id: &str,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<(), ApiError> {
        if entity_id.trim().is_empty() {
            return Err(ApiError::Validation("entity id is required".to_string()));
        }
        let token = self.modal.begin();
        let result = client.entity_detail(repo_id, kind, entity_id).await;
        // NotFound and transport failures render inside the modal; they are
        // not propagated past it
        self.modal.complete(token, result);
        Ok(())
    }
}

impl Default for EntityDetailResolver {
    fn default() -> Self {
        EntityDetailResolver::new()
    }
}

/// Assemble the display sections for a bundle, omitting every empty list
pub fn bundle_sections(bundle: &DetailBundle) -> Vec<Section> {
    match bundle {
        DetailBundle::Dependency(d) => dependency_sections(d),
        DetailBundle::Service(d) => service_sections(d),
        DetailBundle::CodeElement(d) => code_element_sections(d),
        DetailBundle::SecurityEntity(d) => security_sections(d),
    }
}

fn dependency_sections(detail: &DependencyDetail) -> Vec<Section> {
    let e = &detail.entity;
    let mut head = vec![
        format!("name: {}", e.name),
        format!("version: {}", e.version),
        format!("package manager: {}", e.package_manager),
    ];
    if e.is_dev {
        head.push("scope: dev".to_string());
    }
    if e.is_optional {
        head.push("optional: yes".to_string());
    }
    if !e.file_path.is_empty() {
        head.push(format!("declared in: {}", e.file_path));
    }

    let related = detail
        .related_services
        .iter()
        .map(|s| {
            let mut line = format!("{} ({} / {})", s.name, s.provider, s.service_type);
            if let Some(rel) = &s.relationship_type {
                line.push_str(&format!(", {}", rel));
            }
            line
        })
        .collect();

    [
        Section::new("Dependency", head),
        Section::new("Related services", related),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn service_sections(detail: &ServiceDetail) -> Vec<Section> {
    let e = &detail.entity;
    let mut head = vec![
        format!("name: {}", e.name),
        format!("provider: {}", e.provider),
        format!("type: {}", e.service_type),
        format!("confidence: {:.0}%", e.confidence * 100.0),
    ];
    if !e.file_path.is_empty() {
        head.push(location_line(&e.file_path, e.line_number));
    }

    let related = detail
        .related_dependencies
        .iter()
        .map(|d| format!("{} {} ({})", d.name, d.version, d.package_manager))
        .collect();

    [
        Section::new("Service", head),
        Section::new("Configuration", configuration_lines(&e.configuration)),
        Section::new("Related dependencies", related),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn code_element_sections(detail: &CodeElementDetail) -> Vec<Section> {
    let e = &detail.entity;
    let mut head = vec![
        format!("name: {}", e.name),
        format!("type: {}", e.element_type),
        format!("language: {}", e.language),
        format!("{}:{}", e.file_path, e.line_number),
    ];
    if let Some(sig) = &e.signature {
        head.push(format!("signature: {}", sig));
    }
    if let Some(vis) = &e.visibility {
        head.push(format!("visibility: {}", vis));
    }
    if let Some(ret) = &e.return_type {
        head.push(format!("returns: {}", ret));
    }
    if let Some(doc) = &e.doc_comment {
        head.push(doc.clone());
    }

    let call_line = |c: &crate::entity::CallLink| {
        let mut line = c.name.clone();
        if !c.file_path.is_empty() {
            match c.line_number {
                Some(n) => line.push_str(&format!(" ({}:{})", c.file_path, n)),
                None => line.push_str(&format!(" ({})", c.file_path)),
            }
        }
        line
    };

    [
        Section::new("Code element", head),
        Section::new("Callers", detail.callers.iter().map(call_line).collect()),
        Section::new("Callees", detail.callees.iter().map(call_line).collect()),
        Section::new(
            "In the same file",
            detail
                .related_elements
                .iter()
                .map(|r| format!("{} ({})", r.name, r.element_type))
                .collect(),
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn security_sections(detail: &SecurityEntityDetail) -> Vec<Section> {
    let e = &detail.entity;
    let mut head = vec![format!("name: {}", e.name), format!("type: {}", e.entity_type)];
    if let Some(provider) = &e.provider {
        head.push(format!("provider: {}", provider));
    }
    if let Some(arn) = &e.arn {
        head.push(format!("arn: {}", arn));
    }
    if let Some(region) = &e.region {
        head.push(format!("region: {}", region));
    }
    if !e.file_path.is_empty() {
        head.push(location_line(&e.file_path, e.line_number));
    }

    let relationships = detail
        .relationships
        .iter()
        .map(|r| {
            let mut line = format!("{}: {}", r.relationship_type, r.entity.name);
            if !r.permissions.is_empty() {
                line.push_str(&format!(" [{}]", r.permissions.join(", ")));
            }
            if let Some(cond) = &r.condition {
                line.push_str(&format!(" when {}", cond));
            }
            line
        })
        .collect();

    let vulnerabilities = detail
        .vulnerabilities
        .iter()
        .map(|v| format!("[{}] {}: {}", v.severity, v.vulnerability_type, v.description))
        .collect();

    [
        Section::new("Security entity", head),
        Section::new("Configuration", configuration_lines(&e.configuration)),
        Section::new("Relationships", relationships),
        Section::new("Vulnerabilities", vulnerabilities),
        Section::new(
            "Same provider",
            detail
                .related_entities
                .iter()
                .map(|r| format!("{} ({})", r.name, r.entity_type))
                .collect(),
        ),
        Section::new(
            "Related security entities",
            detail
                .related_security_entities
                .iter()
                .map(|r| format!("{} ({})", r.name, r.entity_type))
                .collect(),
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn location_line(file_path: &str, line_number: Option<u32>) -> String {
    match line_number {
        Some(n) => format!("{}:{}", file_path, n),
        None => file_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn security_bundle(configuration: serde_json::Value) -> DetailBundle {
        let detail: SecurityEntityDetail = serde_json::from_value(json!({
            "entity": {
                "id": "e1", "name": "open-sg", "entity_type": "SecurityGroup",
                "provider": "aws", "file_path": "sg.tf", "configuration": configuration
            }
        }))
        .unwrap();
        DetailBundle::SecurityEntity(detail)
    }

    #[test]
    fn empty_lists_produce_no_sections() {
        let sections = bundle_sections(&security_bundle(json!({})));
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Security entity"]);
    }

    #[test]
    fn malformed_configuration_renders_as_literal_string() {
        let sections = bundle_sections(&security_bundle(json!("{invalid json")));
        let config = sections.iter().find(|s| s.title == "Configuration").unwrap();
        assert_eq!(config.lines, vec!["{invalid json"]);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut slot = ModalSlot::new();

        let first = slot.begin();
        let second = slot.begin();

        let newer = security_bundle(json!({}));
        assert!(slot.complete(second, Ok(newer)));

        // The older request resolves afterwards and must not win the slot
        let older = security_bundle(json!({"stale": true}));
        assert!(!slot.complete(first, Ok(older)));

        match slot.state() {
            Some(ModalState::Ready(DetailBundle::SecurityEntity(d))) => {
                assert!(d.entity.configuration.as_object().unwrap().is_empty());
            }
            other => panic!("unexpected modal state: {:?}", other),
        }
    }

    #[test]
    fn response_after_close_does_not_reopen() {
        let mut slot = ModalSlot::new();
        let token = slot.begin();
        slot.close();
        assert!(!slot.complete(token, Ok(security_bundle(json!({})))));
        assert!(!slot.is_open());
    }

    #[test]
    fn not_found_renders_as_its_own_state() {
        let mut slot = ModalSlot::new();
        let token = slot.begin();
        slot.complete(
            token,
            Err(crate::api::ApiError::NotFound("entity e9".to_string())),
        );
        assert!(matches!(slot.state(), Some(ModalState::NotFound(_))));
    }

    #[test]
    fn relationship_lines_carry_permissions() {
        let detail: SecurityEntityDetail = serde_json::from_value(json!({
            "entity": {"id": "e1", "name": "role", "entity_type": "IamRole", "file_path": "iam.tf"},
            "relationships": [{
                "entity": {"id": "e2", "name": "assets", "entity_type": "S3Bucket", "file_path": "s3.tf"},
                "relationship_type": "allows_access",
                "permissions": ["s3:GetObject"]
            }]
        }))
        .unwrap();
        let sections = bundle_sections(&DetailBundle::SecurityEntity(detail));
        let rel = sections.iter().find(|s| s.title == "Relationships").unwrap();
        assert_eq!(rel.lines, vec!["allows_access: assets [s3:GetObject]"]);
    }
}
