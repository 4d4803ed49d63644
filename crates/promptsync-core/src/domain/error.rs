//! Domain-level error taxonomy for promptsync.

use std::path::PathBuf;

use prompt_store::StoreError;

/// Errors raised before any remote call is made.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no prompts provided")]
    EmptyPromptSet,

    #[error("prompt name must not be empty")]
    EmptyName,

    #[error("duplicate prompt name in request: {path} (deduplicate before sending)")]
    DuplicatePath { path: String },
}

/// Synchronization engine errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("refusing to deploy an empty change set")]
    EmptyChangeSet,

    /// Remote failure, surfaced verbatim.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("mirror io error at {}: {}", .path.display(), .source)]
    Mirror {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mirror filename {file} is shared by {first} and {second}")]
    MirrorCollision {
        file: String,
        first: String,
        second: String,
    },

    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// Attach a path to an io error raised by the local mirror.
pub(crate) fn mirror_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Mirror {
        path: path.into(),
        source,
    }
}

/// Result type for promptsync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
