//! Change-set construction.
//!
//! Compares a desired prompt collection against a snapshot of the remote
//! LIVE listing and produces the per-path operations needed to move LIVE
//! toward it. Pure: no I/O happens here.
//!
//! ## Policies
//!
//! - **Replace-all** (`push`): remote paths absent from the desired set are
//!   deleted, every desired prompt is written as `added`. Post-state equals
//!   the desired set exactly.
//! - **Additive-merge** (`append`): existing paths are skipped unless
//!   `overwrite` is set, in which case they become `modified`. Never deletes.

use std::collections::HashSet;

use prompt_store::{ChangeStatus, DocumentChange, DocumentSummary};

use crate::domain::{validate_desired, DesiredPrompt, ValidationError};

// ---------------------------------------------------------------------------
// RemoteListing
// ---------------------------------------------------------------------------

/// Snapshot of the LIVE paths a change set is built against.
///
/// The snapshot can be stale by the time the change set is deployed; the
/// store is responsible for rejecting conflicting versions.
#[derive(Debug, Clone, Default)]
pub struct RemoteListing {
    paths: Vec<String>,
    index: HashSet<String>,
}

impl RemoteListing {
    pub fn from_summaries(summaries: Vec<DocumentSummary>) -> Self {
        summaries.into_iter().map(|s| s.path).collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains(path)
    }

    /// Paths in the order the store listed them.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<String> for RemoteListing {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut listing = RemoteListing::default();
        for path in iter {
            if listing.index.insert(path.clone()) {
                listing.paths.push(path);
            }
        }
        listing
    }
}

// ---------------------------------------------------------------------------
// ChangeSet
// ---------------------------------------------------------------------------

/// Ordered list of changes, unique by path.
///
/// Only the builder constructs these, so uniqueness holds by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<DocumentChange>,
}

impl ChangeSet {
    fn push(&mut self, change: DocumentChange) {
        debug_assert!(
            !self.changes.iter().any(|c| c.path == change.path),
            "change set already targets {}",
            change.path
        );
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[DocumentChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Paths carrying `status`, in change-set order.
    pub fn paths_with(&self, status: ChangeStatus) -> Vec<String> {
        self.changes
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.path.clone())
            .collect()
    }

    /// Number of changes carrying `status`.
    pub fn count(&self, status: ChangeStatus) -> usize {
        self.changes.iter().filter(|c| c.status == status).count()
    }
}

/// Outcome of an additive merge: the change set plus how each desired
/// prompt was classified.
#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    pub change_set: ChangeSet,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
}

/// What a single-prompt replacement will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceAction {
    Created,
    Replaced,
}

impl ReplaceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplaceAction::Created => "Created",
            ReplaceAction::Replaced => "Replaced",
        }
    }
}

impl std::fmt::Display for ReplaceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChangeSetBuilder
// ---------------------------------------------------------------------------

/// Builds change sets against one listing snapshot.
pub struct ChangeSetBuilder<'a> {
    listing: &'a RemoteListing,
}

impl<'a> ChangeSetBuilder<'a> {
    pub fn new(listing: &'a RemoteListing) -> Self {
        Self { listing }
    }

    /// Replace-all policy.
    ///
    /// Deletions come first (listing order), then one `added` per desired
    /// prompt (request order). A desired path that already exists is only
    /// written as `added`, never also deleted.
    pub fn replace_all(&self, desired: &[DesiredPrompt]) -> Result<ChangeSet, ValidationError> {
        validate_desired(desired)?;

        let wanted: HashSet<&str> = desired.iter().map(|p| p.name.as_str()).collect();
        let mut set = ChangeSet::default();

        for path in self.listing.paths() {
            if !wanted.contains(path.as_str()) {
                set.push(DocumentChange::deleted(path.clone()));
            }
        }
        for prompt in desired {
            set.push(DocumentChange::added(&prompt.name, &prompt.content));
        }
        Ok(set)
    }

    /// Additive-merge policy.
    ///
    /// An empty resulting change set means nothing needs deploying; it is
    /// not an error.
    pub fn additive_merge(
        &self,
        desired: &[DesiredPrompt],
        overwrite: bool,
    ) -> Result<MergePlan, ValidationError> {
        validate_desired(desired)?;

        let mut plan = MergePlan::default();
        for prompt in desired {
            let exists = self.listing.contains(&prompt.name);
            match (exists, overwrite) {
                (true, false) => plan.skipped.push(prompt.name.clone()),
                (true, true) => {
                    plan.change_set
                        .push(DocumentChange::modified(&prompt.name, &prompt.content));
                    plan.updated.push(prompt.name.clone());
                }
                (false, _) => {
                    plan.change_set
                        .push(DocumentChange::added(&prompt.name, &prompt.content));
                    plan.added.push(prompt.name.clone());
                }
            }
        }
        Ok(plan)
    }

    /// One-element change set for a single prompt.
    pub fn single(
        &self,
        path: &str,
        content: &str,
    ) -> Result<(ChangeSet, ReplaceAction), ValidationError> {
        if path.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let mut set = ChangeSet::default();
        let action = if self.listing.contains(path) {
            set.push(DocumentChange::modified(path, content));
            ReplaceAction::Replaced
        } else {
            set.push(DocumentChange::added(path, content));
            ReplaceAction::Created
        };
        Ok((set, action))
    }
}
