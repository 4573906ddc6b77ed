//! Backend API client
//!
//! [`ArchlensApi`] is the seam the view layer talks through; [`RemoteClient`]
//! is the HTTP implementation. Tests substitute their own impls with canned
//! data.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::error::{ApiError, ApiResult};
use crate::entity::{
    AnalysisSummary, CodeElement, CodeElementDetail, Dependency, DependencyDetail, DetailBundle,
    EntityKind, NewRepository, Repository, SecurityEntity, SecurityEntityDetail, Service,
    ServiceDetail, Vulnerability,
};
use crate::graph::KnowledgeGraph;

/// Everything the explorer needs from the analysis backend
#[async_trait]
pub trait ArchlensApi: Send + Sync {
    async fn repositories(&self) -> ApiResult<Vec<Repository>>;
    async fn repository(&self, repo_id: &str) -> ApiResult<Repository>;
    async fn graph(&self, repo_id: &str) -> ApiResult<KnowledgeGraph>;
    async fn dependencies(&self, repo_id: &str) -> ApiResult<Vec<Dependency>>;
    async fn services(&self, repo_id: &str) -> ApiResult<Vec<Service>>;
    async fn code_elements(&self, repo_id: &str) -> ApiResult<Vec<CodeElement>>;
    async fn security_entities(&self, repo_id: &str) -> ApiResult<Vec<SecurityEntity>>;
    async fn vulnerabilities(&self, repo_id: &str) -> ApiResult<Vec<Vulnerability>>;
    async fn entity_detail(
        &self,
        repo_id: &str,
        kind: EntityKind,
        entity_id: &str,
    ) -> ApiResult<DetailBundle>;
    async fn create_repository(&self, new: &NewRepository) -> ApiResult<Repository>;
    async fn analyze(&self, repo_id: &str) -> ApiResult<AnalysisSummary>;
}

/// HTTP client for a running analysis backend
pub struct RemoteClient {
    base_url: String,
    http: Client,
}

impl RemoteClient {
    /// Connect to the given HTTP base URL.
    ///
    /// # Example
    /// ```no_run
    /// # use archlens::api::RemoteClient;
    /// let client = RemoteClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, 30)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        RemoteClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    /// Map error statuses to the taxonomy, preferring the server's own
    /// `error` message when the body carries one
    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {}", status));

        if status == StatusCode::NOT_FOUND {
            Err(ApiError::NotFound(message))
        } else {
            Err(ApiError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ArchlensApi for RemoteClient {
    async fn repositories(&self) -> ApiResult<Vec<Repository>> {
        self.get_json("/api/repositories").await
    }

    async fn repository(&self, repo_id: &str) -> ApiResult<Repository> {
        self.get_json(&format!("/api/repositories/{}", repo_id)).await
    }

    async fn graph(&self, repo_id: &str) -> ApiResult<KnowledgeGraph> {
        self.get_json(&format!("/api/repositories/{}/graph", repo_id))
            .await
    }

    async fn dependencies(&self, repo_id: &str) -> ApiResult<Vec<Dependency>> {
        self.get_json(&format!("/api/repositories/{}/dependencies", repo_id))
            .await
    }

    async fn services(&self, repo_id: &str) -> ApiResult<Vec<Service>> {
        self.get_json(&format!("/api/repositories/{}/services", repo_id))
            .await
    }

    async fn code_elements(&self, repo_id: &str) -> ApiResult<Vec<CodeElement>> {
        self.get_json(&format!("/api/repositories/{}/code/elements", repo_id))
            .await
    }

    async fn security_entities(&self, repo_id: &str) -> ApiResult<Vec<SecurityEntity>> {
        self.get_json(&format!("/api/repositories/{}/security/entities", repo_id))
            .await
    }

    async fn vulnerabilities(&self, repo_id: &str) -> ApiResult<Vec<Vulnerability>> {
        self.get_json(&format!(
            "/api/repositories/{}/security/vulnerabilities",
            repo_id
        ))
        .await
    }

    async fn entity_detail(
        &self,
        repo_id: &str,
        kind: EntityKind,
        entity_id: &str,
    ) -> ApiResult<DetailBundle> {
        let path = format!(
            "/api/repositories/{}/entities/{}/{}",
            repo_id,
            kind.as_path_segment(),
            entity_id
        );
        match kind {
            EntityKind::Dependency => {
                let detail: DependencyDetail = self.get_json(&path).await?;
                Ok(DetailBundle::Dependency(detail))
            }
            EntityKind::Service => {
                let detail: ServiceDetail = self.get_json(&path).await?;
                Ok(DetailBundle::Service(detail))
            }
            EntityKind::CodeElement => {
                let detail: CodeElementDetail = self.get_json(&path).await?;
                Ok(DetailBundle::CodeElement(detail))
            }
            EntityKind::SecurityEntity => {
                let detail: SecurityEntityDetail = self.get_json(&path).await?;
                Ok(DetailBundle::SecurityEntity(detail))
            }
        }
    }

    async fn create_repository(&self, new: &NewRepository) -> ApiResult<Repository> {
        if new.url.trim().is_empty() {
            return Err(ApiError::Validation("repository url is required".to_string()));
        }
        if new.name.trim().is_empty() {
            return Err(ApiError::Validation("repository name is required".to_string()));
        }
        self.post_json("/api/repositories", new).await
    }

    async fn analyze(&self, repo_id: &str) -> ApiResult<AnalysisSummary> {
        self.post_json(&format!("/api/repositories/{}/analyze", repo_id), &Value::Null)
            .await
    }
}
