use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::time::Instant;

use super::{StageOutcome, TriggerMethod};

/// Finalized, immutable outcome of one wipe run.
///
/// There is no success field: [`WipeReport::success`] is derived from the
/// error list every time it is read, and serialization emits the derived
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct WipeReport {
    trigger: TriggerMethod,
    simulated: bool,
    items_destroyed: u64,
    passes: u32,
    duration_seconds: f64,
    errors: Vec<String>,
    warnings: Vec<String>,
    identified_items: Vec<String>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl WipeReport {
    /// True exactly when no error was recorded
    #[must_use]
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// How the wipe was initiated
    #[must_use]
    pub const fn trigger(&self) -> TriggerMethod {
        self.trigger
    }

    /// True for audit-only runs that deleted nothing
    #[must_use]
    pub const fn simulated(&self) -> bool {
        self.simulated
    }

    /// Cumulative logical items destroyed across all stages
    #[must_use]
    pub const fn items_destroyed(&self) -> u64 {
        self.items_destroyed
    }

    /// Overwrite passes used for secure-erase steps
    #[must_use]
    pub const fn passes(&self) -> u32 {
        self.passes
    }

    /// Wall-clock duration of the run
    #[must_use]
    pub const fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Stage-level failures, in stage order
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Advisory warnings that did not fail the run
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Items discovered during the run
    #[must_use]
    pub fn identified_items(&self) -> &[String] {
        &self.identified_items
    }

    /// When the run started
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the run finished
    #[must_use]
    pub const fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }
}

impl Serialize for WipeReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("WipeReport", 11)?;
        s.serialize_field("success", &self.success())?;
        s.serialize_field("trigger", &self.trigger)?;
        s.serialize_field("simulated", &self.simulated)?;
        s.serialize_field("items_destroyed", &self.items_destroyed)?;
        s.serialize_field("passes", &self.passes)?;
        s.serialize_field("duration_seconds", &self.duration_seconds)?;
        s.serialize_field("errors", &self.errors)?;
        s.serialize_field("warnings", &self.warnings)?;
        s.serialize_field("identified_items", &self.identified_items)?;
        s.serialize_field("started_at", &self.started_at)?;
        s.serialize_field("finished_at", &self.finished_at)?;
        s.end()
    }
}

/// The in-flight, mutable form of a report.
///
/// Owned by exactly one run; [`ReportDraft::finish`] consumes it.
#[derive(Debug)]
pub struct ReportDraft {
    trigger: TriggerMethod,
    simulated: bool,
    items_destroyed: u64,
    passes: u32,
    errors: Vec<String>,
    warnings: Vec<String>,
    identified_items: Vec<String>,
    started_at: DateTime<Utc>,
    clock: Instant,
}

impl ReportDraft {
    /// Start a draft and its wall-clock timer
    #[must_use]
    pub fn start(trigger: TriggerMethod, simulated: bool, passes: u32) -> Self {
        Self {
            trigger,
            simulated,
            items_destroyed: 0,
            passes,
            errors: Vec::new(),
            warnings: Vec::new(),
            identified_items: Vec::new(),
            started_at: Utc::now(),
            clock: Instant::now(),
        }
    }

    /// Fold one stage's outcome into the draft.
    ///
    /// Entries are prefixed with the stage name. Simulated drafts never
    /// count destroyed units.
    pub fn record(&mut self, stage: &str, outcome: StageOutcome) {
        if !self.simulated {
            self.items_destroyed = self.items_destroyed.saturating_add(outcome.units);
        }
        for error in outcome.errors {
            self.push_error(stage, &error);
        }
        for warning in outcome.warnings {
            self.warnings.push(format!("{stage}: {warning}"));
        }
        self.identified_items.extend(outcome.identified);
    }

    /// Record one stage-level failure
    pub fn push_error(&mut self, stage: &str, message: &str) {
        let message = message.trim();
        if message.is_empty() {
            self.errors.push(format!("{stage}: failed"));
        } else {
            self.errors.push(format!("{stage}: {message}"));
        }
    }

    /// Stop the timer and freeze the report
    #[must_use]
    pub fn finish(self) -> WipeReport {
        WipeReport {
            trigger: self.trigger,
            simulated: self.simulated,
            items_destroyed: self.items_destroyed,
            passes: self.passes,
            duration_seconds: self.clock.elapsed().as_secs_f64(),
            errors: self.errors,
            warnings: self.warnings,
            identified_items: self.identified_items,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
