//! Storage trait definitions for promptsync
//!
//! `PromptStore` is the single seam between the synchronization engine and
//! the hosted prompt backend. It is async and backend-agnostic; the HTTP
//! client lives in `latitude`, in-memory fakes in `fakes`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Targets and documents
// ---------------------------------------------------------------------------

/// Which version of the project a read addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Target {
    /// The single published version
    #[default]
    Live,
    /// A specific version by uuid
    Version(String),
}

impl Target {
    /// Path segment used when addressing the backend.
    pub fn as_segment(&self) -> &str {
        match self {
            Target::Live => "live",
            Target::Version(uuid) => uuid,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_segment())
    }
}

/// One entry of a document listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub path: String,
}

/// A fully fetched prompt document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique name and storage key; slashes carry no nesting semantics
    pub path: String,
    /// Full prompt body
    #[serde(default)]
    pub content: String,
    /// Version currently holding this content; absent before first deploy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_uuid: Option<String>,
}

// ---------------------------------------------------------------------------
// Changes and versions
// ---------------------------------------------------------------------------

/// Per-path change kind. Closed on purpose so every consumer matches it
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole-document change for one path.
///
/// `content` is the full new body for `Added`/`Modified` and empty for
/// `Deleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChange {
    pub path: String,
    pub content: String,
    pub status: ChangeStatus,
}

impl DocumentChange {
    pub fn added(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            status: ChangeStatus::Added,
        }
    }

    pub fn modified(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            status: ChangeStatus::Modified,
        }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: String::new(),
            status: ChangeStatus::Deleted,
        }
    }
}

/// One atomic commit published to LIVE. Assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Token accounting for an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunUsage {
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// Model response for an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub usage: Option<RunUsage>,
}

/// Result of running a document. Opaque beyond the fields relayed to callers;
/// everything else is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Conversation id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<RunResponse>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// PromptStore
// ---------------------------------------------------------------------------

/// Remote prompt store.
///
/// Guarantees expected from implementations:
/// - `list_documents(Target::Live)` reflects the last published version.
/// - `deploy_to_live` publishes all changes as one version or fails; the
///   caller performs no compensation on failure.
/// - No retries are performed at this layer.
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Active project identifier.
    fn project_id(&self) -> &str;

    /// List every document path in `target`.
    async fn list_documents(&self, target: &Target) -> StoreResult<Vec<DocumentSummary>>;

    /// Fetch one document with its full content.
    async fn get_document(&self, path: &str, target: &Target) -> StoreResult<Document>;

    /// Execute a LIVE document with the given parameters.
    async fn run_document(&self, path: &str, parameters: &Value) -> StoreResult<RunOutcome>;

    /// Commit `changes` as a single new version and publish it to LIVE.
    async fn deploy_to_live(
        &self,
        changes: &[DocumentChange],
        description: &str,
    ) -> StoreResult<Version>;
}
