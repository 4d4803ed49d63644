//! The four caller-facing synchronization workflows.
//!
//! Each workflow lists LIVE, builds a change set, deploys it (or mirrors
//! LIVE locally for `pull`) and returns a report. Remote calls happen in a
//! fixed order with no retries; any failure ends the workflow with an error
//! and leaves the store in whatever state the failed call left it.
//!
//! Concurrent invocations are not coordinated: the listing a change set is
//! built from can be stale by the time it deploys. The hosted backend offers
//! no concurrency token, so this race is accepted; the store rejects changes
//! it cannot apply (e.g. deleting an already-deleted path).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use prompt_store::{ChangeStatus, PromptStore, Target, Version};
use tracing::Instrument;

use crate::changeset::{ChangeSetBuilder, ReplaceAction, RemoteListing};
use crate::deploy::DeploymentCoordinator;
use crate::domain::{validate_desired, DesiredPrompt, Result, ValidationError};
use crate::metrics::METRICS;
use crate::mirror::{check_collisions, restore_names, LocalMirror};
use crate::name_cache::NameCache;
use crate::obs::{emit_mirror_cleared, emit_mirror_written, workflow_span};

/// Outcome of `push`.
#[derive(Debug, Clone)]
pub struct PushReport {
    /// Remote paths removed because they were not in the desired set
    pub deleted: Vec<String>,
    /// Every desired prompt, in request order
    pub deployed: Vec<String>,
    pub version: Version,
}

/// Outcome of `append`. `version` is `None` when every prompt was skipped
/// and nothing was deployed.
#[derive(Debug, Clone)]
pub struct AppendReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
    pub version: Option<Version>,
}

impl AppendReport {
    pub fn deployed(&self) -> bool {
        self.version.is_some()
    }
}

/// Outcome of `replace_single`.
#[derive(Debug, Clone)]
pub struct ReplaceReport {
    pub path: String,
    pub action: ReplaceAction,
    pub version: Version,
}

/// Outcome of `pull`.
#[derive(Debug, Clone)]
pub struct PullReport {
    pub dir: PathBuf,
    /// Stale mirror files removed before fetching
    pub deleted_stale: usize,
    /// Filenames written, in listing order; empty when LIVE is empty
    pub written: Vec<String>,
}

/// Push / append / replace / pull over one store.
pub struct SyncOperations {
    store: Arc<dyn PromptStore>,
    coordinator: DeploymentCoordinator,
}

impl SyncOperations {
    pub fn new(store: Arc<dyn PromptStore>, cache: Arc<NameCache>) -> Self {
        let coordinator = DeploymentCoordinator::new(store.clone(), cache);
        Self { store, coordinator }
    }

    async fn listing(&self) -> Result<RemoteListing> {
        let docs = self.store.list_documents(&Target::Live).await?;
        Ok(RemoteListing::from_summaries(docs))
    }

    /// Make LIVE contain exactly `desired`.
    ///
    /// Validation (non-empty, no duplicate names) happens before any remote
    /// call.
    pub async fn push(&self, desired: &[DesiredPrompt]) -> Result<PushReport> {
        self.run_push(desired)
            .instrument(workflow_span("push"))
            .await
    }

    /// Add `desired` to LIVE without removing anything. Existing names are
    /// skipped unless `overwrite` is set.
    pub async fn append(&self, desired: &[DesiredPrompt], overwrite: bool) -> Result<AppendReport> {
        self.run_append(desired, overwrite)
            .instrument(workflow_span("append"))
            .await
    }

    /// Create or replace one prompt.
    pub async fn replace_single(&self, path: &str, content: &str) -> Result<ReplaceReport> {
        self.run_replace(path, content)
            .instrument(workflow_span("replace"))
            .await
    }

    /// Mirror LIVE into `output_dir` (default `./prompts`).
    ///
    /// Stale mirror files are deleted before anything is fetched, so a pull
    /// that fails midway leaves the directory cleared or partially written,
    /// never rolled back.
    pub async fn pull(&self, output_dir: Option<&Path>) -> Result<PullReport> {
        self.run_pull(output_dir)
            .instrument(workflow_span("pull"))
            .await
    }

    /// Read the `*.promptl` files in `dir` as desired prompts, naming each
    /// after the LIVE path it was pulled from.
    ///
    /// Lists LIVE once. Use before `push` or `append` so a pulled mirror
    /// pushes back without renaming nested prompts.
    pub async fn load_mirror(&self, dir: &Path) -> Result<Vec<DesiredPrompt>> {
        let loaded = LocalMirror::new(dir).load_prompts().await?;
        if loaded.is_empty() {
            return Ok(loaded);
        }
        let listing = self.listing().await?;
        restore_names(loaded, listing.paths().iter().map(String::as_str))
    }

    async fn run_push(&self, desired: &[DesiredPrompt]) -> Result<PushReport> {
        validate_desired(desired)?;

        let listing = self.listing().await?;
        let change_set = ChangeSetBuilder::new(&listing).replace_all(desired)?;
        let version = self.coordinator.deploy(&change_set, "push-prompts").await?;

        Ok(PushReport {
            deleted: change_set.paths_with(ChangeStatus::Deleted),
            deployed: desired.iter().map(|p| p.name.clone()).collect(),
            version,
        })
    }

    async fn run_append(&self, desired: &[DesiredPrompt], overwrite: bool) -> Result<AppendReport> {
        validate_desired(desired)?;

        let listing = self.listing().await?;
        let plan = ChangeSetBuilder::new(&listing).additive_merge(desired, overwrite)?;

        let version = if plan.change_set.is_empty() {
            tracing::info!(skipped = plan.skipped.len(), "all prompts already exist");
            None
        } else {
            Some(
                self.coordinator
                    .deploy(&plan.change_set, "append-prompts")
                    .await?,
            )
        };

        Ok(AppendReport {
            added: plan.added,
            updated: plan.updated,
            skipped: plan.skipped,
            version,
        })
    }

    async fn run_replace(&self, path: &str, content: &str) -> Result<ReplaceReport> {
        if path.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let listing = self.listing().await?;
        let (change_set, action) = ChangeSetBuilder::new(&listing).single(path, content)?;
        let version = self
            .coordinator
            .deploy(&change_set, &format!("replace-{}", path))
            .await?;

        Ok(ReplaceReport {
            path: path.to_string(),
            action,
            version,
        })
    }

    async fn run_pull(&self, output_dir: Option<&Path>) -> Result<PullReport> {
        let mirror = LocalMirror::resolve(output_dir)?;
        mirror.ensure_dir().await?;

        let deleted_stale = mirror.clear().await?;
        emit_mirror_cleared(mirror.dir(), deleted_stale);

        let listing = self.listing().await?;
        if listing.is_empty() {
            return Ok(PullReport {
                dir: mirror.dir().to_path_buf(),
                deleted_stale,
                written: Vec::new(),
            });
        }
        check_collisions(listing.paths().iter().map(String::as_str))?;

        let mut written = Vec::with_capacity(listing.len());
        for path in listing.paths() {
            let doc = self.store.get_document(path, &Target::Live).await?;
            written.push(mirror.write(&doc.path, &doc.content).await?);
        }
        emit_mirror_written(mirror.dir(), written.len());
        METRICS.add_mirror_files(written.len() as u64);

        Ok(PullReport {
            dir: mirror.dir().to_path_buf(),
            deleted_stale,
            written,
        })
    }
}
