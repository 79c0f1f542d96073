use thiserror::Error;

/// Result type alias for local cleanup operations
pub type LocalResult<T> = std::result::Result<T, LocalError>;

/// Result type alias for secure storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors from local cleanup collaborators
#[derive(Error, Debug)]
pub enum LocalError {
    /// Filesystem I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// External helper could not be run or exited non-zero
    #[error("`{program}` failed: {reason}")]
    Command {
        /// Program that was invoked
        program: String,
        /// Exit status or stderr summary
        reason: String,
    },

    /// No clipboard helper is available on this system
    #[error("no clipboard helper available: {0}")]
    NoClipboard(String),

    /// Random source failed while preparing an overwrite pass
    #[error("random source unavailable")]
    Random,
}

/// Errors from the secure credential store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No matching entry exists
    #[error("item not found")]
    NotFound,

    /// Store is locked or access was refused
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Any other backend failure
    #[error("secure storage error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true for the "nothing there" case, which callers treat as success
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
