//! HTTP client for the hosted Latitude prompt backend.
//!
//! Implements [`PromptStore`] over the v3 gateway API. Every call is a
//! single request except [`LatitudeClient::deploy_to_live`], which creates a
//! draft version, pushes the change list into it and publishes it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store_traits::{
    Document, DocumentChange, DocumentSummary, PromptStore, RunOutcome, StoreResult, Target,
    Version,
};

/// Default gateway base URL.
pub const DEFAULT_BASE_URL: &str = "https://gateway.latitude.so/api/v3";

/// Latitude client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatitudeConfig {
    /// Bearer token
    pub api_key: String,
    /// Project to address
    pub project_id: String,
    /// Gateway base URL (no trailing slash required)
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for LatitudeConfig {
    fn default() -> Self {
        LatitudeConfig {
            api_key: std::env::var("LATITUDE_API_KEY").unwrap_or_default(),
            project_id: std::env::var("LATITUDE_PROJECT_ID").unwrap_or_default(),
            base_url: std::env::var("LATITUDE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout_secs: 60,
        }
    }
}

impl LatitudeConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific project
    pub fn new(api_key: &str, project_id: &str) -> Self {
        LatitudeConfig {
            api_key: api_key.to_string(),
            project_id: project_id.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }

    /// Point the client at a different gateway
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Reject configs that cannot address a project.
    pub fn validate(&self) -> StoreResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(StoreError::Config(
                "LATITUDE_API_KEY is not set".to_string(),
            ));
        }
        if self.project_id.trim().is_empty() {
            return Err(StoreError::Config(
                "LATITUDE_PROJECT_ID is not set".to_string(),
            ));
        }
        Url::parse(&self.base_url)
            .map_err(|e| StoreError::Config(format!("invalid base URL {}: {}", self.base_url, e)))?;
        Ok(())
    }
}

/// Latitude client for prompt store operations
pub struct LatitudeClient {
    config: LatitudeConfig,
    http_client: reqwest::Client,
}

impl LatitudeClient {
    /// Create a new client after validating the config
    pub fn new(config: LatitudeConfig) -> StoreResult<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("promptsync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(LatitudeClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> StoreResult<Self> {
        Self::new(LatitudeConfig::from_env())
    }

    /// Build `{base}/projects/{project}/{segments...}`, percent-encoding
    /// each segment. Document paths are split on `/` so nested names map to
    /// nested URL segments.
    fn url(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = Url::parse(self.config.base_url.trim_end_matches('/'))
            .map_err(|e| StoreError::Config(e.to_string()))?;
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| StoreError::Config("base URL cannot carry a path".to_string()))?;
            parts.pop_if_empty();
            parts.push("projects").push(&self.config.project_id);
            for segment in segments {
                parts.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> StoreResult<T> {
        debug!(%method, %url, "latitude request");
        let mut request = self
            .http_client
            .request(method, url)
            .bearer_auth(&self.config.api_key);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Decode a non-success response into `StoreError::Api`, keeping the raw body
/// when it is not the backend's JSON error shape.
fn api_error(status: StatusCode, body: &str) -> StoreError {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ErrorBody {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        error_code: Option<String>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        details: Option<Value>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => StoreError::Api {
            status: status.as_u16(),
            code: parsed.error_code.or(parsed.name),
            message: parsed
                .message
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            details: parsed.details.filter(|d| !d.is_null()),
        },
        Err(_) => StoreError::Api {
            status: status.as_u16(),
            code: None,
            message: if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("error").to_string()
            } else {
                body.trim().to_string()
            },
            details: None,
        },
    }
}

#[async_trait]
impl PromptStore for LatitudeClient {
    fn project_id(&self) -> &str {
        &self.config.project_id
    }

    async fn list_documents(&self, target: &Target) -> StoreResult<Vec<DocumentSummary>> {
        let url = self.url(&["versions", target.as_segment(), "documents"])?;
        self.send(Method::GET, url, None).await
    }

    async fn get_document(&self, path: &str, target: &Target) -> StoreResult<Document> {
        let url = self.url(&["versions", target.as_segment(), "documents", path])?;
        match self.send(Method::GET, url, None).await {
            Err(StoreError::Api { status: 404, .. }) => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            other => other,
        }
    }

    async fn run_document(&self, path: &str, parameters: &Value) -> StoreResult<RunOutcome> {
        let url = self.url(&["versions", Target::Live.as_segment(), "documents", "run"])?;
        let body = json!({
            "path": path,
            "parameters": parameters,
            "stream": false,
        });
        self.send(Method::POST, url, Some(body)).await
    }

    async fn deploy_to_live(
        &self,
        changes: &[DocumentChange],
        description: &str,
    ) -> StoreResult<Version> {
        // 1. Draft version
        let draft: Version = self
            .send(
                Method::POST,
                self.url(&["versions"])?,
                Some(json!({ "name": description })),
            )
            .await?;
        debug!(version = %draft.uuid, "draft version created");

        // 2. Push the change list into the draft
        let _: Value = self
            .send(
                Method::POST,
                self.url(&["versions", &draft.uuid, "push"])?,
                Some(json!({ "changes": changes })),
            )
            .await?;

        // 3. Publish
        let published: Version = self
            .send(
                Method::POST,
                self.url(&["versions", &draft.uuid, "publish"])?,
                Some(json!({ "title": description })),
            )
            .await?;

        info!(
            version = %published.uuid,
            changes = changes.len(),
            "version published to live"
        );
        Ok(published)
    }
}
