//! # Store Errors
//!
//! Error types for store backends. These are opaque to the synchronization
//! layer: they propagate to the caller unchanged and are never retried.

use std::io;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure
    #[error("store I/O failure: {message}")]
    Io {
        /// What the store was doing when the failure occurred
        message: String,
        /// The originating I/O error
        #[source]
        source: io::Error,
    },

    /// The store refused a write that would exceed its capacity
    #[error("store quota exceeded (limit: {limit} bytes)")]
    QuotaExceeded {
        /// Configured capacity in bytes
        limit: usize,
    },

    /// Persisted data failed integrity verification
    #[error("store data corruption at byte offset {offset}: {reason}")]
    Corruption {
        /// Byte offset of the first bad record
        offset: u64,
        /// What the verification found
        reason: String,
    },

    /// Internal error (poisoned lock)
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Create an I/O error with operation context.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a corruption error anchored at a byte offset.
    pub fn corruption(offset: u64, reason: impl Into<String>) -> Self {
        Self::Corruption {
            offset,
            reason: reason.into(),
        }
    }

    fn poisoned() -> Self {
        Self::Internal("lock poisoned".to_string())
    }

    /// Internal error for a poisoned guard.
    pub(crate) fn from_poison<T>(_: std::sync::PoisonError<T>) -> Self {
        Self::poisoned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = StoreError::io(
            "failed to append entry",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert!(err.to_string().contains("failed to append entry"));
    }

    #[test]
    fn test_quota_error_names_the_limit() {
        let err = StoreError::QuotaExceeded { limit: 4096 };
        assert!(err.to_string().contains("4096"));
    }

    #[test]
    fn test_corruption_error_carries_offset() {
        let err = StoreError::corruption(1024, "checksum mismatch");
        let display = err.to_string();
        assert!(display.contains("1024"));
        assert!(display.contains("checksum mismatch"));
    }
}
