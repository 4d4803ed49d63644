//! Promptsync Core Library
//!
//! Synchronization engine between a caller-supplied prompt collection and
//! the LIVE version of a hosted prompt project.
//!
//! ## Components
//!
//! - `ChangeSetBuilder`: replace-all / additive-merge / single change sets
//! - `DeploymentCoordinator`: commits a change set as one published version
//! - `NameCache`: TTL-bound list of LIVE prompt names
//! - `LocalMirror`: `<name>.promptl` files on disk
//! - `SyncOperations`: the push / append / replace / pull workflows
//! - `PromptTools`: JSON tool-call surface over all of the above

pub mod changeset;
pub mod deploy;
pub mod domain;
pub mod metrics;
pub mod mirror;
pub mod name_cache;
pub mod obs;
pub mod sync;
pub mod tools;

pub use changeset::{ChangeSet, ChangeSetBuilder, MergePlan, RemoteListing, ReplaceAction};
pub use deploy::DeploymentCoordinator;
pub use domain::{validate_desired, DesiredPrompt, Result, SyncError, ValidationError};
pub use mirror::{file_name_for, restore_names, LocalMirror, DEFAULT_MIRROR_DIR, MIRROR_EXTENSION};
pub use name_cache::{NameCache, DEFAULT_TTL};
pub use sync::{AppendReport, PullReport, PushReport, ReplaceReport, SyncOperations};
pub use tools::{PromptTools, TextContent, ToolDescriptor, ToolResult};

pub use prompt_store::{
    ChangeStatus, DocumentChange, LatitudeClient, LatitudeConfig, PromptStore, StoreError, Target,
    Version,
};

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
