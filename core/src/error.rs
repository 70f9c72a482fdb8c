//! Error types for the books client and synchronizer.
//!
//! # Design
//! `ApiError` describes what went wrong talking to the remote collection.
//! Its `Display` text is the generic user-facing message (matching what a
//! browser HTTP client would say), while `user_message` prefers the first
//! structured validation message from the response body.
//!
//! `SyncError` adds the local reasons an operation can be refused before any
//! request is sent.

use thiserror::Error;

use crate::types::ErrorBody;
use crate::validation::FieldErrors;

/// Errors produced while building requests or interpreting responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404 for the addressed book.
    #[error("request failed with status code 404")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("request failed with status code {status}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// No response was received at all.
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// First `errors[].msg` from an error response body, if any.
    pub fn first_validation_message(&self) -> Option<String> {
        let ApiError::Http { body, .. } = self else {
            return None;
        };
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed.errors.into_iter().next().map(|issue| issue.msg)
    }

    pub fn user_message(&self) -> String {
        self.first_validation_message()
            .unwrap_or_else(|| self.to_string())
    }
}

/// Reasons a synchronizer operation did not complete.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("another request is already in flight")]
    Busy,

    #[error("no request is in flight")]
    NothingInFlight,

    #[error("book has no identifier")]
    MissingIdentifier,

    #[error("no book with identifier {0}")]
    UnknownBook(String),

    #[error("a book is being edited")]
    EditInProgress,

    #[error("no deletion is awaiting confirmation")]
    NoPendingDeletion,

    #[error("invalid form: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Remote(#[from] ApiError),
}
