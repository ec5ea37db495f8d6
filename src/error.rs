//! Error types for Tinted Notes
//!
//! This module defines all custom error types used throughout the application.
//! Error types are organized by category so every failure can be surfaced as a
//! transient, user-visible notification without terminating the session.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// Remote document store errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Authentication errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Theme catalog errors
    #[error(transparent)]
    Theme(#[from] ThemeError),

    /// Image upload errors
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Durable local storage errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Generic unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Remote document store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The signed-in user may not touch this document
    #[error("Permission denied for document {id}")]
    PermissionDenied { id: String },

    /// Document does not exist
    #[error("Document not found: {id}")]
    NotFound { id: String },

    /// The store refused the write
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// The live subscription ended
    #[error("Subscription closed")]
    SubscriptionClosed,
}

/// Authentication errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The user dismissed the sign-in flow
    #[error("Sign-in was cancelled")]
    Cancelled,

    /// The provider refused the credentials
    #[error("Sign-in failed: {0}")]
    Failed(String),

    /// An operation needed a signed-in user
    #[error("Not signed in")]
    NotSignedIn,
}

/// Theme catalog errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// A required field was left empty
    #[error("Theme field is empty: {field}")]
    EmptyField { field: &'static str },

    /// A color could not be parsed as an HSL triple
    #[error("Invalid color for {field}: {value}")]
    InvalidColor { field: &'static str, value: String },

    /// Another theme already uses this name
    #[error("A theme named {name} already exists")]
    DuplicateName { name: String },

    /// No theme with this name in the catalog
    #[error("Unknown theme: {name}")]
    UnknownTheme { name: String },

    /// Remote write of a custom theme failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Image upload errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Declared content type is not an accepted image type
    #[error("Unsupported file type: {content_type}")]
    UnsupportedType { content_type: String },

    /// Payload does not look like the declared image type
    #[error("File contents do not match {content_type}")]
    ContentMismatch { content_type: String },

    /// Payload is larger than allowed
    #[error("File too large ({size} bytes, max {max_size} bytes)")]
    TooLarge { size: usize, max_size: usize },

    /// Payload is empty
    #[error("File is empty")]
    Empty,

    /// Upload needs a signed-in user and a selected note
    #[error("No note selected")]
    NoTarget,

    /// Object storage refused the upload
    #[error("Upload failed: {0}")]
    Storage(String),
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error saving configuration
    #[error("Could not save configuration: {0}")]
    SaveError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Durable local storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error reading the backing file
    #[error("Could not read storage file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing the backing file
    #[error("Could not write storage file: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file is not valid JSON
    #[error("Storage file is corrupt: {0}")]
    ParseError(String),

    /// No data directory available
    #[error("Could not determine data directory")]
    DirectoryError,
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for remote store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for theme operations
pub type ThemeResult<T> = Result<T, ThemeError>;

/// Result type alias for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for local storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StoreError {
    /// Create a user-friendly error message suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Network(_) => {
                "Could not reach the server. Your changes are kept locally.".to_string()
            }
            StoreError::PermissionDenied { .. } => {
                "You don't have permission to change this note.".to_string()
            }
            StoreError::NotFound { .. } => {
                "This note no longer exists. It may have been deleted elsewhere.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl UploadError {
    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            UploadError::UnsupportedType { .. } | UploadError::ContentMismatch { .. } => {
                "Only PNG, JPEG, GIF and WebP images can be inserted.".to_string()
            }
            UploadError::TooLarge { max_size, .. } => {
                format!(
                    "This image is too large. Maximum size is {} MB.",
                    max_size / (1024 * 1024)
                )
            }
            _ => self.to_string(),
        }
    }
}

impl AppError {
    /// Message suitable for the notification area
    pub fn user_message(&self) -> String {
        match self {
            AppError::Store(e) => e.user_message(),
            AppError::Upload(e) => e.user_message(),
            AppError::Theme(ThemeError::Store(e)) => e.user_message(),
            _ => self.to_string(),
        }
    }
}
