//! Typed error hierarchy for qcdesk.
//!
//! Three top-level enums follow the three failure classes of the client:
//! - `ValidationError` — rejected locally, before any request is sent
//! - `ApiError` — transport and HTTP failures from the QC service
//! - `SessionError` — missing, unreadable or under-privileged sessions

use thiserror::Error;

use crate::model::Role;

/// Input rejected on the client. Never reaches the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Quantities must not be negative ({field} = {value})")]
    NegativeQuantity { field: &'static str, value: i64 },

    #[error("After OQC + Hold/Return ({allocated}) must not exceed the source quantity ({source_qty})")]
    ExceedsSource { allocated: i64, source_qty: i64 },

    #[error("Select a product first")]
    MissingProduct,

    #[error("No login session found. Log in again.")]
    MissingSession,

    #[error("Please fill in all fields")]
    MissingCredentials,

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// Errors returned by the REST client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unauthorized: session expired or token invalid. Log in again.")]
    Unauthorized,

    #[error("Forbidden: your role is not allowed to do this")]
    Forbidden,

    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Expected JSON but got '{content_type}'. URL: {url}")]
    UnexpectedContentType { content_type: String, url: String },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// True when the server rejected the bearer token.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Errors from the on-disk session and role guard.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not logged in. Run 'qcdesk login' first.")]
    NotLoggedIn,

    #[error("Role {role} may not use this command (allowed: {allowed})")]
    Forbidden { role: Role, allowed: String },

    #[error("Failed to access session file at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file at {path} is corrupt: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
