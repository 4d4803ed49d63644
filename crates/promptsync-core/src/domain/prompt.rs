//! Caller-supplied prompt definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;

/// One prompt the caller wants in LIVE. `name` doubles as the store path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredPrompt {
    pub name: String,
    pub content: String,
}

impl DesiredPrompt {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Reject desired collections whose intent is ambiguous.
///
/// Checks (in order):
/// 1. The collection is non-empty.
/// 2. No name is blank.
/// 3. No name appears twice.
pub fn validate_desired(desired: &[DesiredPrompt]) -> Result<(), ValidationError> {
    if desired.is_empty() {
        return Err(ValidationError::EmptyPromptSet);
    }
    let mut seen = HashSet::with_capacity(desired.len());
    for prompt in desired {
        if prompt.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !seen.insert(prompt.name.as_str()) {
            return Err(ValidationError::DuplicatePath {
                path: prompt.name.clone(),
            });
        }
    }
    Ok(())
}
