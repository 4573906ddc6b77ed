//! Overview tab counts
//!
//! The four counts are independent: they are fetched concurrently and each
//! branch swallows its own failure, so one broken endpoint never empties the
//! whole overview.

use crate::api::ArchlensApi;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverviewCounts {
    pub dependencies: usize,
    pub services: usize,
    pub code_elements: usize,
    pub security_entities: usize,
}

impl OverviewCounts {
    pub async fn load(client: &dyn ArchlensApi, repo_id: &str) -> OverviewCounts {
        let (deps, services, code, security) = futures::join!(
            client.dependencies(repo_id),
            client.services(repo_id),
            client.code_elements(repo_id),
            client.security_entities(repo_id),
        );

        OverviewCounts {
            dependencies: deps.map(|v| v.len()).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "dependency count unavailable");
                0
            }),
            services: services.map(|v| v.len()).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "service count unavailable");
                0
            }),
            code_elements: code.map(|v| v.len()).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "code element count unavailable");
                0
            }),
            security_entities: security.map(|v| v.len()).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "security entity count unavailable");
                0
            }),
        }
    }
}
