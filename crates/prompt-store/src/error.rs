//! Error types for prompt-store

use serde_json::Value;
use thiserror::Error;

/// Errors raised at the remote store boundary.
///
/// `Api` keeps whatever structured detail the backend returned so callers
/// can surface it verbatim.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<Value>,
    },

    /// Document does not exist in the requested target
    #[error("document not found: {path}")]
    NotFound { path: String },

    /// A change refers to a path in a state the store rejects
    #[error("conflicting change for {path}: {reason}")]
    Conflict { path: String, reason: String },

    /// Transport-level failure (DNS, TLS, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Client is misconfigured
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Render the error as a markdown block for tool payloads.
    pub fn to_markdown(&self) -> String {
        match self {
            StoreError::Api {
                status,
                code,
                message,
                details,
            } => {
                let mut out = format!("## API Error\n\n**Status:** {}\n", status);
                if let Some(code) = code {
                    out.push_str(&format!("**Code:** `{}`\n", code));
                }
                out.push_str(&format!("\n{}", message));
                if let Some(details) = details {
                    let rendered = serde_json::to_string_pretty(details)
                        .unwrap_or_else(|_| details.to_string());
                    out.push_str(&format!("\n\n### Details\n\n```json\n{}\n```", rendered));
                }
                out
            }
            StoreError::NotFound { path } => {
                format!("## Not Found\n\nNo prompt named `{}` exists in LIVE.", path)
            }
            StoreError::Conflict { path, reason } => {
                format!("## Conflict\n\n`{}`: {}", path, reason)
            }
            other => format!("## Error\n\n{}", other),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}
