use serde::{Deserialize, Serialize};

use super::StageOutcome;

/// Synthetic error used when the backend gives no better explanation
pub const REMOTE_WIPE_FAILED: &str = "Backend emergency wipe failed";

/// Outcome of the server-side wipe, as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteWipeOutcome {
    /// Whether the backend reports full success
    pub success: bool,

    /// Items destroyed server-side
    #[serde(default)]
    pub items_destroyed: u64,

    /// Overwrite passes used server-side
    #[serde(default)]
    pub passes: u32,

    /// Server-side duration
    #[serde(default)]
    pub duration_seconds: f64,

    /// Server-side failures
    #[serde(default)]
    pub errors: Vec<String>,
}

impl RemoteWipeOutcome {
    /// A failed outcome carrying a single error
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            errors: vec![if message.trim().is_empty() {
                REMOTE_WIPE_FAILED.to_string()
            } else {
                message
            }],
            ..Self::default()
        }
    }
}

impl From<RemoteWipeOutcome> for StageOutcome {
    fn from(outcome: RemoteWipeOutcome) -> Self {
        let mut errors: Vec<String> = outcome
            .errors
            .into_iter()
            .filter(|e| !e.trim().is_empty())
            .collect();

        // success=false with no explanation must still fail the local report
        if !outcome.success && errors.is_empty() {
            errors.push(REMOTE_WIPE_FAILED.to_string());
        }

        Self {
            units: outcome.items_destroyed,
            errors,
            ..Self::default()
        }
    }
}
