use thiserror::Error;

/// Store operation error.
///
/// These are **infrastructure errors** (storage, uniqueness, connectivity) as opposed to
/// domain errors (validation, invariants).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A row the operation depends on does not exist (anymore).
    #[error("record not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint or concurrent write got in the way.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything else the backend reported (connection, lock poisoning, decoding).
    #[error("storage failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
