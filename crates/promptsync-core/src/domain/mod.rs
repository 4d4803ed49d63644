//! Domain models for promptsync.
//!
//! Canonical definitions for the core entities:
//! - `DesiredPrompt`: one caller-supplied prompt (name + full body)
//! - `SyncError` / `ValidationError`: the engine's error taxonomy

pub mod error;
pub mod prompt;

// Re-export main types and errors
pub use error::{Result, SyncError, ValidationError};
pub use prompt::{validate_desired, DesiredPrompt};
