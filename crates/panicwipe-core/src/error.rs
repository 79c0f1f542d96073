use thiserror::Error;

use crate::types::TriggerRejection;

/// Result type alias for wipe operations
pub type Result<T> = std::result::Result<T, WipeError>;

/// Errors that can occur around an emergency wipe.
///
/// Only `AlreadyInProgress` and `DisabledInDebugBuild` ever escape
/// `Orchestrator::begin_wipe`. Everything a stage hits is folded into the
/// report's error list instead.
#[derive(Error, Debug)]
pub enum WipeError {
    /// A wipe is already running in this process
    #[error("an emergency wipe is already in progress")]
    AlreadyInProgress,

    /// Destructive actions are disabled and the orchestrator is configured to refuse
    #[error("destructive actions are disabled in this build")]
    DisabledInDebugBuild,

    /// The trigger layer rejected the confirmation payload
    #[error("trigger rejected: {0}")]
    TriggerRejected(#[from] TriggerRejection),

    /// Authentication with the wipe backend failed
    #[error("authentication failed: backend rejected the token")]
    Unauthorized,

    /// Backend returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the backend
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request or stage timed out
    #[error("timed out after {0} seconds")]
    Timeout(u64),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl WipeError {
    /// Returns true if the call was refused before any stage ran
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::AlreadyInProgress | Self::DisabledInDebugBuild | Self::TriggerRejected(_)
        )
    }

    /// Returns true if the error is due to authentication
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns the HTTP status code if this is a backend error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
