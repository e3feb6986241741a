//! # Synchronization Errors

use thiserror::Error;

use crate::codec::EncodeError;
use crate::store::StoreError;

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the storage facade and subscription bindings.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The logical value could not be serialized for storage.
    ///
    /// Not retried; the mutation never reached the store.
    #[error("serialization failed: {0}")]
    Serialization(#[from] EncodeError),

    /// The store rejected the mutation; propagated unchanged, not retried.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Keys must be non-empty strings.
    #[error("storage keys must be non-empty")]
    EmptyKey,
}
