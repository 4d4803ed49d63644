//! Prompt-Store: remote prompt backend boundary for promptsync
//!
//! This crate owns all I/O with the hosted prompt store. The synchronization
//! engine only ever talks to the [`PromptStore`] trait.
//!
//! ## Layer 0 - Remote store
//!
//! Focus: faithful wire types and verbatim error detail.
//!
//! ## Key Components
//!
//! - `PromptStore`: list/get/run/deploy against a project
//! - `LatitudeClient`: HTTPS implementation over the v3 gateway
//! - `MemoryPromptStore`: in-memory fake with call counters and failure injection

mod error;
pub mod fakes;
pub mod latitude;
pub mod store_traits;

pub use error::StoreError;
pub use latitude::{LatitudeClient, LatitudeConfig, DEFAULT_BASE_URL};
pub use store_traits::{
    ChangeStatus, Document, DocumentChange, DocumentSummary, PromptStore, RunOutcome,
    RunResponse, RunUsage, StoreResult, Target, Version,
};
