use async_trait::async_trait;

/// What a single stage did, as reported to the stage runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutcome {
    /// Logical actions completed (not bytes)
    pub units: u64,
    /// Failures, one entry per failed action
    pub errors: Vec<String>,
    /// Inconclusive confirmations; never affect success
    pub warnings: Vec<String>,
    /// Items discovered, for audit listings
    pub identified: Vec<String>,
}

impl StageOutcome {
    /// A stage that completed `units` actions without error
    #[must_use]
    pub const fn done(units: u64) -> Self {
        Self {
            units,
            errors: Vec::new(),
            warnings: Vec::new(),
            identified: Vec::new(),
        }
    }

    /// A stage that failed outright
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }

    /// A survey listing
    #[must_use]
    pub fn surveyed(identified: Vec<String>) -> Self {
        Self {
            identified,
            ..Self::default()
        }
    }

    /// Add one error entry
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }

    /// Add one advisory warning
    #[must_use]
    pub fn with_warning(mut self, message: impl Into<String>) -> Self {
        self.warnings.push(message.into());
        self
    }

    /// Returns true if the stage recorded no errors
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One independently fallible unit of destructive work.
///
/// `destroy` runs in a live wipe, `survey` in a simulated one. Neither may
/// fail as a whole: every problem becomes an entry in the returned outcome.
/// Both must be idempotent; clearing something already gone is a success.
#[async_trait]
pub trait WipeStage: Send + Sync {
    /// Stable, human-readable stage name used to prefix report entries
    fn name(&self) -> &'static str;

    /// Destroy the state this stage owns
    async fn destroy(&self) -> StageOutcome;

    /// List what `destroy` would remove, without removing anything
    async fn survey(&self) -> StageOutcome;
}
