//! End-to-end exploration flow against a canned backend
//!
//! Exercises the same path the UI takes: graph payload, render model,
//! surface click, node selection, tab navigation with highlight, detail
//! modal, and the overview fan-out with a failing branch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::json;

use archlens::api::{ApiError, ApiResult, ArchlensApi};
use archlens::entity::{
    AnalysisSummary, CodeElement, Dependency, DetailBundle, EntityKind, NewRepository,
    Repository, SecurityEntity, SecurityEntityDetail, Service, Vulnerability,
};
use archlens::graph::{KnowledgeGraph, RenderModel};
use archlens::render::{ForceLayout, GraphEvent, LayoutSurface};
use archlens::view::{
    EntityDetailResolver, FilterEngine, InteractionController, ModalState, OverviewCounts, Tab,
    ViewContext,
};

/// Canned backend with per-endpoint failure switches
#[derive(Default)]
struct StubBackend {
    fail_services: AtomicBool,
}

fn canned_graph() -> KnowledgeGraph {
    serde_json::from_value(json!({
        "nodes": [
            {"id": "n-repo", "name": "billing-api", "type": "Repository",
             "properties": {"url": "https://example.com/billing-api.git", "branch": "main"}},
            {"id": "n-dep", "name": "stripe", "type": "dependency",
             "properties": {"version": "5.1.0", "package_manager": "pip"}},
            {"id": "n-svc", "name": "S3", "type": "service",
             "properties": "{\"provider\": \"aws\"}"},
            {"id": "n-sec", "name": "billing-role", "type": "security_entity"}
        ],
        "edges": [
            {"source": "n-repo", "target": "n-dep", "type": "has_dependency"},
            {"source": "n-repo", "target": "n-svc", "type": "uses_service"},
            {"source": "n-sec", "target": "n-svc", "type": "related_to"},
            {"source": "n-repo", "target": "n-gone", "type": "related_to"}
        ]
    }))
    .unwrap()
}

#[async_trait]
impl ArchlensApi for StubBackend {
    async fn repositories(&self) -> ApiResult<Vec<Repository>> {
        Ok(vec![serde_json::from_value(json!({
            "id": "r1", "name": "billing-api",
            "url": "https://example.com/billing-api.git", "branch": "main"
        }))
        .unwrap()])
    }

    async fn repository(&self, repo_id: &str) -> ApiResult<Repository> {
        if repo_id != "r1" {
            return Err(ApiError::NotFound(format!("repository {}", repo_id)));
        }
        Ok(self.repositories().await?.remove(0))
    }

    async fn graph(&self, _repo_id: &str) -> ApiResult<KnowledgeGraph> {
        Ok(canned_graph())
    }

    async fn dependencies(&self, _repo_id: &str) -> ApiResult<Vec<Dependency>> {
        Ok(serde_json::from_value(json!([
            {"id": "d1", "name": "stripe", "version": "5.1.0",
             "package_manager": "pip", "file_path": "requirements.txt"},
            {"id": "d2", "name": "flask", "version": "3.0",
             "package_manager": "pip", "file_path": "requirements.txt"}
        ]))
        .unwrap())
    }

    async fn services(&self, _repo_id: &str) -> ApiResult<Vec<Service>> {
        if self.fail_services.load(Ordering::Relaxed) {
            return Err(ApiError::Api {
                status: 503,
                message: "service detector offline".to_string(),
            });
        }
        Ok(serde_json::from_value(json!([
            {"id": "s1", "name": "S3", "provider": "aws", "service_type": "storage",
             "confidence": 0.95, "file_path": "app/storage.py"}
        ]))
        .unwrap())
    }

    async fn code_elements(&self, _repo_id: &str) -> ApiResult<Vec<CodeElement>> {
        Ok(serde_json::from_value(json!([
            {"id": "c1", "name": "charge_customer", "element_type": "function",
             "language": "python", "file_path": "app/billing.py", "line_number": 42}
        ]))
        .unwrap())
    }

    async fn security_entities(&self, _repo_id: &str) -> ApiResult<Vec<SecurityEntity>> {
        Ok(serde_json::from_value(json!([
            {"id": "e1", "name": "billing-role", "entity_type": "IamRole",
             "provider": "aws", "file_path": "infra/iam.tf"}
        ]))
        .unwrap())
    }

    async fn vulnerabilities(&self, _repo_id: &str) -> ApiResult<Vec<Vulnerability>> {
        Ok(serde_json::from_value(json!([
            {"entity_id": "e1", "severity": "high", "vulnerability_type": "wildcard_policy",
             "description": "role allows *", "recommendation": "scope it down"}
        ]))
        .unwrap())
    }

    async fn entity_detail(
        &self,
        _repo_id: &str,
        kind: EntityKind,
        entity_id: &str,
    ) -> ApiResult<DetailBundle> {
        if kind == EntityKind::SecurityEntity && entity_id == "e1" {
            let detail: SecurityEntityDetail = serde_json::from_value(json!({
                "entity": {"id": "e1", "name": "billing-role", "entity_type": "IamRole",
                           "provider": "aws", "file_path": "infra/iam.tf",
                           "configuration": "{invalid json"},
                "vulnerabilities": [
                    {"entity_id": "e1", "severity": "high",
                     "vulnerability_type": "wildcard_policy",
                     "description": "role allows *", "recommendation": "scope it down"}
                ]
            }))
            .unwrap();
            return Ok(DetailBundle::SecurityEntity(detail));
        }
        Err(ApiError::NotFound(format!("{} {}", kind, entity_id)))
    }

    async fn create_repository(&self, new: &NewRepository) -> ApiResult<Repository> {
        Ok(serde_json::from_value(json!({
            "id": "r2", "name": new.name, "url": new.url, "branch": new.branch
        }))
        .unwrap())
    }

    async fn analyze(&self, _repo_id: &str) -> ApiResult<AnalysisSummary> {
        Ok(AnalysisSummary {
            total_dependencies: 2,
            services_found: 1,
            code_elements_found: 1,
            security_entities_found: 1,
        })
    }
}

#[tokio::test]
async fn select_navigate_highlight_flow() {
    let backend = StubBackend::default();

    // Graph payload to render model: the dangling edge is dropped
    let payload = backend.graph("r1").await.unwrap();
    let model = RenderModel::build(&payload);
    assert_eq!(model.nodes.len(), 4);
    assert_eq!(model.edges.len(), 3);
    assert_eq!(model.dropped_edges, 1);

    // Click the dependency node on the layout surface
    let mut surface = ForceLayout::new(800.0, 600.0);
    surface.load(&model);
    let placed = surface
        .placed_nodes()
        .into_iter()
        .find(|n| n.id == "n-dep")
        .unwrap();
    let event = surface.click(placed.x, placed.y).unwrap();
    let GraphEvent::NodeSelected(node_id) = event;
    assert_eq!(node_id, "n-dep");

    // Selection summary carries properties and directional connections
    let mut controller = InteractionController::new();
    let summary = controller.select(&model, &node_id).unwrap();
    assert_eq!(summary.name, "stripe");
    assert_eq!(summary.target_tab, Tab::Dependencies);
    assert!(summary
        .properties
        .iter()
        .any(|(k, v)| k == "version" && v == "5.1.0"));
    assert_eq!(summary.connections.len(), 1);
    assert_eq!(summary.connections[0].other, "billing-api");

    // Navigation awaits the tab load, then highlights the matching entry
    let mut ctx = ViewContext::new();
    ctx.open_repository("r1");
    let mut engine = FilterEngine::new();
    let now = Instant::now();
    let matched = controller
        .navigate(&backend, &mut ctx, &mut engine, now)
        .await
        .unwrap();

    assert_eq!(matched.as_deref(), Some("stripe"));
    assert_eq!(ctx.active_tab, Tab::Dependencies);
    assert_eq!(engine.dependencies.len(), 2);
    assert_eq!(ctx.active_highlight(now), Some("stripe"));
    assert_eq!(ctx.active_highlight(now + Duration::from_secs(4)), None);
}

#[tokio::test]
async fn navigation_without_a_match_is_silent() {
    let backend = StubBackend::default();
    let payload = backend.graph("r1").await.unwrap();
    let model = RenderModel::build(&payload);

    // The service node's entity list is loaded, but rename the needle by
    // selecting the security node and pointing it at a tab with no match
    let mut controller = InteractionController::new();
    controller.select(&model, "n-sec").unwrap();

    let mut ctx = ViewContext::new();
    ctx.open_repository("r1");
    let mut engine = FilterEngine::new();

    // billing-role exists on the security tab, so first check a real match
    let now = Instant::now();
    let matched = controller
        .navigate(&backend, &mut ctx, &mut engine, now)
        .await
        .unwrap();
    assert_eq!(matched.as_deref(), Some("billing-role"));

    // Now select the repository node: overview tab carries no list, so the
    // navigation activates the tab and highlights nothing
    controller.select(&model, "n-repo").unwrap();
    let matched = controller
        .navigate(&backend, &mut ctx, &mut engine, now)
        .await
        .unwrap();
    assert_eq!(matched, None);
    assert_eq!(ctx.active_tab, Tab::Overview);
    assert_eq!(ctx.active_highlight(now), None);
}

#[tokio::test]
async fn overview_counts_isolate_a_failing_branch() {
    let backend = StubBackend::default();
    backend.fail_services.store(true, Ordering::Relaxed);

    let counts = OverviewCounts::load(&backend, "r1").await;
    assert_eq!(counts.dependencies, 2);
    assert_eq!(counts.services, 0);
    assert_eq!(counts.code_elements, 1);
    assert_eq!(counts.security_entities, 1);
}

#[tokio::test]
async fn detail_modal_renders_and_survives_bad_configuration() {
    let backend = StubBackend::default();
    let mut resolver = EntityDetailResolver::new();
    resolver
        .open(&backend, "r1", EntityKind::SecurityEntity, "e1")
        .await
        .unwrap();

    let Some(ModalState::Ready(bundle)) = resolver.modal().state() else {
        panic!("modal should be ready");
    };
    let sections = archlens::view::bundle_sections(bundle);

    // The malformed configuration renders as a literal string
    let config = sections
        .iter()
        .find(|s| s.title == "Configuration")
        .unwrap();
    assert_eq!(config.lines, vec!["{invalid json"]);

    // Absent relationship lists produce no headings
    assert!(sections.iter().all(|s| s.title != "Relationships"));
    assert!(sections
        .iter()
        .any(|s| s.title == "Vulnerabilities" && s.lines.len() == 1));
}

#[tokio::test]
async fn detail_modal_not_found_state() {
    let backend = StubBackend::default();
    let mut resolver = EntityDetailResolver::new();
    resolver
        .open(&backend, "r1", EntityKind::Dependency, "missing")
        .await
        .unwrap();
    assert!(matches!(
        resolver.modal().state(),
        Some(ModalState::NotFound(_))
    ));
}

#[tokio::test]
async fn security_tab_load_builds_the_severity_index() {
    let backend = StubBackend::default();
    let mut engine = FilterEngine::new();
    engine
        .activate_tab(&backend, "r1", Tab::Security)
        .await
        .unwrap();

    let criteria = archlens::view::FilterCriteria {
        severity: Some("HIGH".to_string()),
        ..Default::default()
    };
    let hits = engine.filter(&engine.security_entities, &criteria);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "billing-role");
}
