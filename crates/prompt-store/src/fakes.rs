//! In-memory fakes for the store trait (testing only)
//!
//! `MemoryPromptStore` behaves like a single-project backend: an ordered LIVE
//! document set, an append-only version history with a full snapshot per
//! published version, call counters and failure injection for exercising
//! partial-failure paths.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::store_traits::*;

#[derive(Debug, Default)]
struct LiveState {
    /// path -> (content, version uuid)
    documents: BTreeMap<String, (String, String)>,
    versions: Vec<Version>,
    /// version uuid -> full document set as published by that version
    snapshots: HashMap<String, BTreeMap<String, String>>,
}

impl LiveState {
    fn snapshot_live(&mut self, uuid: &str) {
        let snapshot = self
            .documents
            .iter()
            .map(|(path, (content, _))| (path.clone(), content.clone()))
            .collect();
        self.snapshots.insert(uuid.to_string(), snapshot);
    }

    fn snapshot(&self, uuid: &str) -> StoreResult<&BTreeMap<String, String>> {
        self.snapshots.get(uuid).ok_or_else(|| StoreError::Api {
            status: 404,
            code: Some("not_found".to_string()),
            message: format!("version {} not found", uuid),
            details: None,
        })
    }
}

/// In-memory prompt store backed by a `BTreeMap<path, content>`.
#[derive(Debug)]
pub struct MemoryPromptStore {
    project_id: String,
    state: Mutex<LiveState>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    run_calls: AtomicUsize,
    deploy_calls: AtomicUsize,
    fail_lists: AtomicUsize,
    fail_deploys: AtomicUsize,
    fail_get_for: Mutex<HashSet<String>>,
}

impl Default for MemoryPromptStore {
    fn default() -> Self {
        Self {
            project_id: "memory".to_string(),
            state: Mutex::new(LiveState::default()),
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            run_calls: AtomicUsize::new(0),
            deploy_calls: AtomicUsize::new(0),
            fail_lists: AtomicUsize::new(0),
            fail_deploys: AtomicUsize::new(0),
            fail_get_for: Mutex::new(HashSet::new()),
        }
    }
}

impl MemoryPromptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with LIVE documents under a seed version.
    pub fn with_documents<I, P, C>(documents: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let store = Self::new();
        {
            let mut state = store.state.lock().unwrap();
            let seed = "seed".to_string();
            for (path, content) in documents {
                state
                    .documents
                    .insert(path.into(), (content.into(), seed.clone()));
            }
            state.snapshot_live(&seed);
        }
        store
    }

    /// Current LIVE paths in listing order.
    pub fn live_paths(&self) -> Vec<String> {
        self.state.lock().unwrap().documents.keys().cloned().collect()
    }

    /// Current LIVE content of `path`, if present.
    pub fn live_content(&self, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(path)
            .map(|(content, _)| content.clone())
    }

    /// Published versions, oldest first.
    pub fn versions(&self) -> Vec<Version> {
        self.state.lock().unwrap().versions.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    pub fn deploy_calls(&self) -> usize {
        self.deploy_calls.load(Ordering::SeqCst)
    }

    /// Make the next `n` listings fail with a 503.
    pub fn fail_lists(&self, n: usize) {
        self.fail_lists.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` deployments fail with a 500.
    pub fn fail_deploys(&self, n: usize) {
        self.fail_deploys.store(n, Ordering::SeqCst);
    }

    /// Make every fetch of `path` fail with a 500.
    pub fn fail_get_for(&self, path: &str) {
        self.fail_get_for.lock().unwrap().insert(path.to_string());
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn injected(status: u16, message: &str) -> StoreError {
        StoreError::Api {
            status,
            code: Some("injected".to_string()),
            message: message.to_string(),
            details: None,
        }
    }
}

#[async_trait]
impl PromptStore for MemoryPromptStore {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn list_documents(&self, target: &Target) -> StoreResult<Vec<DocumentSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.fail_lists) {
            return Err(Self::injected(503, "listing unavailable"));
        }
        let state = self.state.lock().unwrap();
        let paths: Vec<String> = match target {
            Target::Live => state.documents.keys().cloned().collect(),
            Target::Version(uuid) => state.snapshot(uuid)?.keys().cloned().collect(),
        };
        Ok(paths
            .into_iter()
            .map(|path| DocumentSummary { path })
            .collect())
    }

    async fn get_document(&self, path: &str, target: &Target) -> StoreResult<Document> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get_for.lock().unwrap().contains(path) {
            return Err(Self::injected(500, "document fetch failed"));
        }
        let state = self.state.lock().unwrap();
        let found = match target {
            Target::Live => state
                .documents
                .get(path)
                .map(|(content, version)| (content.clone(), version.clone())),
            Target::Version(uuid) => state
                .snapshot(uuid)?
                .get(path)
                .map(|content| (content.clone(), uuid.clone())),
        };
        found
            .map(|(content, version)| Document {
                path: path.to_string(),
                content,
                version_uuid: Some(version),
            })
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }

    async fn run_document(&self, path: &str, parameters: &Value) -> StoreResult<RunOutcome> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        let content = self
            .live_content(path)
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })?;
        let mut extra = Map::new();
        extra.insert("parameters".to_string(), parameters.clone());
        Ok(RunOutcome {
            uuid: Some(uuid::Uuid::new_v4().to_string()),
            response: Some(RunResponse {
                text: Some(content),
                usage: Some(RunUsage {
                    total_tokens: Some(0),
                }),
            }),
            extra,
        })
    }

    async fn deploy_to_live(
        &self,
        changes: &[DocumentChange],
        description: &str,
    ) -> StoreResult<Version> {
        self.deploy_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.fail_deploys) {
            return Err(Self::injected(500, "version publish failed"));
        }

        let mut state = self.state.lock().unwrap();

        // Validate everything first so a rejected change list leaves LIVE as-is.
        for change in changes {
            if change.status == ChangeStatus::Deleted
                && !state.documents.contains_key(&change.path)
            {
                return Err(StoreError::Conflict {
                    path: change.path.clone(),
                    reason: "cannot delete a document that is not in live".to_string(),
                });
            }
        }

        let version = Version {
            uuid: uuid::Uuid::new_v4().to_string(),
            title: Some(description.to_string()),
            description: None,
            created_at: Some(Utc::now()),
        };
        for change in changes {
            match change.status {
                ChangeStatus::Added | ChangeStatus::Modified => {
                    state.documents.insert(
                        change.path.clone(),
                        (change.content.clone(), version.uuid.clone()),
                    );
                }
                ChangeStatus::Deleted => {
                    state.documents.remove(&change.path);
                }
            }
        }
        state.snapshot_live(&version.uuid);
        state.versions.push(version.clone());
        Ok(version)
    }
}
