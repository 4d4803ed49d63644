//! Structured observability hooks for promptsync workflows.
//!
//! This module provides:
//! - Workflow-scoped tracing spans via [`workflow_span`]
//! - Emission functions for deploy, cache and mirror lifecycle events
//!
//! Events are emitted at `info!` level (failures at `warn!`), filtered by
//! `RUST_LOG`. For JSON output pass `--json` to the CLI.

use tracing::{info, warn, Span};

/// Span tagging every event of one workflow invocation.
///
/// Attach with `tracing::Instrument::instrument` so it survives awaits.
///
/// ```ignore
/// async { ... }.instrument(workflow_span("push")).await
/// ```
pub fn workflow_span(workflow: &str) -> Span {
    tracing::info_span!("promptsync.workflow", workflow = %workflow)
}

/// Emit event: a change set is about to be committed.
pub fn emit_deploy_started(description: &str, added: usize, modified: usize, deleted: usize) {
    info!(
        event = "deploy.started",
        description = %description,
        added = added,
        modified = modified,
        deleted = deleted,
    );
}

/// Emit event: the store published a new LIVE version.
pub fn emit_deploy_committed(description: &str, version: &str, changes: usize) {
    info!(
        event = "deploy.committed",
        description = %description,
        version = %version,
        changes = changes,
    );
}

/// Emit event: the store rejected or failed a deployment (warning level).
pub fn emit_deploy_failed(description: &str, error: &dyn std::fmt::Display) {
    warn!(event = "deploy.failed", description = %description, error = %error);
}

/// Emit event: the name cache was replaced with a fresh listing.
pub fn emit_cache_refreshed(names: usize) {
    info!(event = "cache.refreshed", names = names);
}

/// Emit event: a cache refresh failed; the previous names stay in place.
pub fn emit_cache_refresh_failed(error: &dyn std::fmt::Display) {
    warn!(event = "cache.refresh_failed", error = %error, "Cache refresh failed");
}

/// Emit event: stale mirror files were removed.
pub fn emit_mirror_cleared(dir: &std::path::Path, removed: usize) {
    info!(event = "mirror.cleared", dir = %dir.display(), removed = removed);
}

/// Emit event: LIVE content was written to the mirror.
pub fn emit_mirror_written(dir: &std::path::Path, written: usize) {
    info!(event = "mirror.written", dir = %dir.display(), written = written);
}
