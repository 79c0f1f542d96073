use serde::{Deserialize, Serialize};

/// Lifecycle of the process-wide orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    /// No wipe has run yet, or the orchestrator was reset
    #[default]
    Idle,
    /// A wipe is in flight
    Running,
    /// The last wipe finished, with or without errors
    Completed,
    /// The last call was refused before any stage ran
    FailedToStart,
}

impl OrchestratorState {
    /// Encode for atomic storage
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Completed => 2,
            Self::FailedToStart => 3,
        }
    }

    /// Decode from atomic storage; unknown values read as idle
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::FailedToStart,
            _ => Self::Idle,
        }
    }
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::FailedToStart => write!(f, "failed_to_start"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_encoding_roundtrips() {
        for state in [
            OrchestratorState::Idle,
            OrchestratorState::Running,
            OrchestratorState::Completed,
            OrchestratorState::FailedToStart,
        ] {
            assert_eq!(OrchestratorState::from_u8(state.as_u8()), state);
        }
        assert_eq!(OrchestratorState::from_u8(200), OrchestratorState::Idle);
    }
}
