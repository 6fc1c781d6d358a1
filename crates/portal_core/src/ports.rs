//! crates/portal_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on. Storage, file
//! transfer, password hashing and user notifications all live behind these
//! ports so the stores stay independent of any concrete backend.

use async_trait::async_trait;

use crate::domain::{FileBlob, FileDescriptor, Notice, SubmissionStatus, UploadedFile};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type shared by every core operation and port.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// Bad credentials or an already-registered email.
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),
    /// Missing or malformed input, rejected before it reaches a store.
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Cannot move a submission from '{from}' to '{to}'")]
    InvalidTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable string-keyed storage for JSON blobs.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn put(&self, key: &str, value: &str) -> PortResult<()>;

    async fn remove(&self, key: &str) -> PortResult<()>;
}

/// Moves file contents in and out of the portal. Size and type limits are the
/// caller's concern, not the transfer layer's.
#[async_trait]
pub trait FileTransferService: Send + Sync {
    async fn upload(&self, file: UploadedFile) -> PortResult<FileDescriptor>;

    async fn download(&self, file_url: &str, file_name: &str) -> PortResult<FileBlob>;

    /// Drops an uploaded file that no submission will reference. Unknown
    /// URLs are ignored.
    async fn discard(&self, file_url: &str) -> PortResult<()>;
}

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> PortResult<String>;

    /// Returns `Ok(false)` for a wrong password; errors are reserved for
    /// unreadable hashes.
    fn verify(&self, password: &str, hash: &str) -> PortResult<bool>;
}

/// Receives the short messages raised after each successful mutation.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
