//! Unified error type for every repository, store and auth operation.
//!
//! Collaborator failures are mapped into [`Error`] at the repository boundary so
//! callers only ever match on `Ok`/`Err` of [`Result`].

use std::time::Duration;
use thiserror::Error;

/// Coarse classification used by the screens to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad credentials, duplicate account, no signed-in user
    Auth,
    /// Network/database failure, permission denied, missing document, timeout
    Store,
    /// Input rejected before reaching the store
    Validation,
    /// Configuration or local I/O problems
    Config,
}

/// All failures surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Config file missing a value, unreadable or malformed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Local filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A record could not be encoded or decoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No document with this id exists in the collection
    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: String },

    /// The signed-in user may not perform the operation
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// A spawned task panicked or was aborted
    #[error("Background task failed: {message}")]
    Task { message: String },

    /// An operation exceeded the configured timeout
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Unknown email or wrong password
    #[error("Invalid email or password for {email}")]
    InvalidCredentials { email: String },

    /// Sign-up for an email that already has an account
    #[error("An account already exists for {email}")]
    AccountExists { email: String },

    /// The operation needs a signed-in user
    #[error("No user is signed in")]
    NotSignedIn,

    /// argon2 failed to hash the password
    #[error("Password hashing failed: {message}")]
    PasswordHash { message: String },

    /// The sign-in screen settled on an error, carrying the message it showed
    #[error("Sign-in failed: {message}")]
    SignInFailed { message: String },

    /// Input rejected before any store call
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Feedback status change that would move backwards
    #[error("Cannot move feedback status from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for building a [`Error::DocumentNotFound`].
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::DocumentNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// Coarse category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } | Self::Io(_) => ErrorKind::Config,
            Self::Database(_)
            | Self::Serialization(_)
            | Self::DocumentNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::Task { .. }
            | Self::Timeout { .. } => ErrorKind::Store,
            Self::InvalidCredentials { .. }
            | Self::AccountExists { .. }
            | Self::NotSignedIn
            | Self::PasswordHash { .. }
            | Self::SignInFailed { .. } => ErrorKind::Auth,
            Self::Validation { .. } | Self::InvalidStatusTransition { .. } => {
                ErrorKind::Validation
            }
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
