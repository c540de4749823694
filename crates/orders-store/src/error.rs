//! Error types for order storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
///
/// `NotFound` and `NotExist` are expected outcomes, not faults. Everything
/// else is returned to the caller as-is; the store never retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record could not be serialized. Nothing was written.
    #[error("failed to encode order: {0}")]
    Encoding(String),

    /// Stored bytes could not be decoded into an order.
    #[error("failed to decode order at {key}: {message}")]
    Decoding {
        /// The key whose value failed to decode.
        key: String,
        /// Decoder error message.
        message: String,
    },

    /// Insert addressed a key that already holds a record.
    #[error("duplicate key: {key}")]
    DuplicateKey {
        /// The primary key that already exists.
        key: String,
    },

    /// Lookup addressed a key with no live record.
    #[error("not found: {key}")]
    NotFound {
        /// The primary key that was looked up.
        key: String,
    },

    /// Update or delete addressed a key with no live record.
    #[error("order does not exist: {key}")]
    NotExist {
        /// The primary key that was addressed.
        key: String,
    },

    /// The backing store failed to execute or commit a command.
    #[error("backend error: {0}")]
    Backend(String),

    /// The caller's deadline expired before the operation could commit.
    #[error("deadline exceeded")]
    Timeout,
}

impl StoreError {
    /// Returns `true` for "no live record" outcomes (`NotFound` and `NotExist`).
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NotExist { .. })
    }
}
