//! Commit a change set to LIVE as one version.
//!
//! The store owns atomicity of version creation and publication. This layer
//! performs no retries and no compensation: a failed call is reported as-is
//! and LIVE is left in whatever state the store left it.

use std::sync::Arc;

use prompt_store::{ChangeStatus, PromptStore, Version};

use crate::changeset::ChangeSet;
use crate::domain::{Result, SyncError};
use crate::metrics::METRICS;
use crate::name_cache::NameCache;
use crate::obs::{emit_deploy_committed, emit_deploy_failed, emit_deploy_started};

/// Deploys change sets and keeps the name cache in step with LIVE.
pub struct DeploymentCoordinator {
    store: Arc<dyn PromptStore>,
    cache: Arc<NameCache>,
}

impl DeploymentCoordinator {
    pub fn new(store: Arc<dyn PromptStore>, cache: Arc<NameCache>) -> Self {
        Self { store, cache }
    }

    /// Submit `change_set` as a single version described by `description`.
    ///
    /// Empty change sets are rejected before reaching the store. On success
    /// the name cache is refreshed before returning.
    pub async fn deploy(&self, change_set: &ChangeSet, description: &str) -> Result<Version> {
        if change_set.is_empty() {
            return Err(SyncError::EmptyChangeSet);
        }

        let (mut added, mut modified, mut deleted) = (0, 0, 0);
        for change in change_set.changes() {
            match change.status {
                ChangeStatus::Added => added += 1,
                ChangeStatus::Modified => modified += 1,
                ChangeStatus::Deleted => deleted += 1,
            }
        }
        emit_deploy_started(description, added, modified, deleted);

        let version = match self
            .store
            .deploy_to_live(change_set.changes(), description)
            .await
        {
            Ok(version) => version,
            Err(e) => {
                emit_deploy_failed(description, &e);
                return Err(e.into());
            }
        };

        emit_deploy_committed(description, &version.uuid, change_set.len());
        METRICS.inc_deploys();

        self.cache.invalidate().await;
        Ok(version)
    }
}
