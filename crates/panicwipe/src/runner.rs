//! Runs one stage under a deadline and folds its outcome into the draft.

use futures_util::FutureExt;
use panicwipe_core::{ReportDraft, WipeStage};
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Shared by every stage of a run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StageRunner {
    deadline: Duration,
    simulated: bool,
}

impl StageRunner {
    pub(crate) const fn new(deadline: Duration, simulated: bool) -> Self {
        Self {
            deadline,
            simulated,
        }
    }

    /// Run `stage` once. Never retries and never fails: a breached
    /// deadline or a panic becomes a single error entry.
    pub(crate) async fn run(&self, stage: &dyn WipeStage, draft: &mut ReportDraft) {
        let name = stage.name();
        debug!(stage = name, simulated = self.simulated, "stage starting");

        let work = if self.simulated {
            stage.survey()
        } else {
            stage.destroy()
        };

        match timeout(self.deadline, AssertUnwindSafe(work).catch_unwind()).await {
            Ok(Ok(outcome)) => {
                if outcome.is_clean() {
                    info!(
                        stage = name,
                        units = outcome.units,
                        identified = outcome.identified.len(),
                        "stage finished"
                    );
                } else {
                    warn!(
                        stage = name,
                        units = outcome.units,
                        errors = outcome.errors.len(),
                        "stage finished with errors"
                    );
                }
                draft.record(name, outcome);
            }
            Ok(Err(_)) => {
                error!(stage = name, "stage panicked");
                draft.push_error(name, "panicked");
            }
            Err(_) => {
                warn!(stage = name, deadline = ?self.deadline, "stage deadline exceeded");
                draft.push_error(name, &format!("timed out after {}", describe(self.deadline)));
            }
        }
    }
}

fn describe(deadline: Duration) -> String {
    if deadline.subsec_millis() == 0 && deadline.as_secs() > 0 {
        format!("{}s", deadline.as_secs())
    } else {
        format!("{}ms", deadline.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use panicwipe_core::{StageOutcome, TriggerMethod};

    struct Sleepy;

    #[async_trait]
    impl WipeStage for Sleepy {
        fn name(&self) -> &'static str {
            "sleepy"
        }

        async fn destroy(&self) -> StageOutcome {
            tokio::time::sleep(Duration::from_secs(10)).await;
            StageOutcome::done(1)
        }

        async fn survey(&self) -> StageOutcome {
            StageOutcome::surveyed(vec!["sleepy: something".into()])
        }
    }

    #[tokio::test]
    async fn deadline_becomes_one_error() {
        let runner = StageRunner::new(Duration::from_millis(20), false);
        let mut draft = ReportDraft::start(TriggerMethod::PanicButton, false, 1);
        runner.run(&Sleepy, &mut draft).await;

        let report = draft.finish();
        assert_eq!(report.errors(), ["sleepy: timed out after 20ms"]);
        assert_eq!(report.items_destroyed(), 0);
    }

    struct Exploding;

    #[async_trait]
    impl WipeStage for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        async fn destroy(&self) -> StageOutcome {
            panic!("stage bug");
        }

        async fn survey(&self) -> StageOutcome {
            StageOutcome::default()
        }
    }

    #[tokio::test]
    async fn panic_becomes_one_error() {
        let runner = StageRunner::new(Duration::from_secs(1), false);
        let mut draft = ReportDraft::start(TriggerMethod::PanicButton, false, 1);
        runner.run(&Exploding, &mut draft).await;

        let report = draft.finish();
        assert_eq!(report.errors(), ["exploding: panicked"]);
    }

    #[tokio::test]
    async fn simulated_runner_only_surveys() {
        let runner = StageRunner::new(Duration::from_millis(20), true);
        let mut draft = ReportDraft::start(TriggerMethod::PanicButton, true, 1);
        runner.run(&Sleepy, &mut draft).await;

        let report = draft.finish();
        assert!(report.success());
        assert_eq!(report.identified_items(), ["sleepy: something"]);
    }

    #[test]
    fn deadline_formatting() {
        assert_eq!(describe(Duration::from_secs(120)), "120s");
        assert_eq!(describe(Duration::from_millis(1500)), "1500ms");
    }
}
