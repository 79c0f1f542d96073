//! The emergency wipe orchestrator.
//!
//! One [`Orchestrator`] exists per process. It is a cheap [`Clone`] handle,
//! so every trigger source can hold one while sharing the same in-flight
//! guard and state.

use panicwipe_core::{
    OrchestratorState, ReportDraft, Result, StageOutcome, ValidatedTrigger, WipeError,
    WipeReport, WipeStage,
};
use panicwipe_local::VolatileStateCleaner;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::runner::StageRunner;

/// Stage name used for remote wipe entries when no client is configured
const REMOTE_STAGE: &str = "remote wipe";

/// Default overwrite passes
pub const DEFAULT_PASSES: u32 = 3;

/// Default per-stage deadline
pub const DEFAULT_STAGE_DEADLINE: Duration = Duration::from_secs(120);

/// Run-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WipeSettings {
    /// Perform destructive actions; otherwise runs are audit-only
    pub destructive: bool,
    /// With destructive actions off, refuse instead of simulating
    pub refuse_when_disabled: bool,
    /// Overwrite passes reported in the wipe report
    pub passes: u32,
    /// Upper bound on any single stage
    pub stage_deadline: Duration,
}

impl Default for WipeSettings {
    fn default() -> Self {
        Self {
            destructive: !cfg!(debug_assertions),
            refuse_when_disabled: false,
            passes: DEFAULT_PASSES,
            stage_deadline: DEFAULT_STAGE_DEADLINE,
        }
    }
}

/// Sequencing authority for an emergency wipe.
///
/// Stages always run in this order, skipping any that were not configured:
/// memory zeroing, clipboard clear, network cache clear, model cache
/// removal, secure storage purge, then the remote wipe when the trigger
/// asks for one.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    in_flight: AtomicBool,
    state: AtomicU8,
    settings: WipeSettings,
    local: Vec<Arc<dyn WipeStage>>,
    remote: Option<Arc<dyn WipeStage>>,
}

impl Orchestrator {
    /// Create a builder
    #[must_use]
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> OrchestratorState {
        OrchestratorState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    /// Settings this orchestrator was built with
    #[must_use]
    pub fn settings(&self) -> WipeSettings {
        self.inner.settings
    }

    /// Names of the configured stages, in execution order
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.inner
            .local
            .iter()
            .chain(self.inner.remote.iter())
            .map(|s| s.name())
            .collect()
    }

    /// Return to `Idle` after a finished or refused run.
    ///
    /// Does nothing while a wipe holds the in-flight guard. A run that was
    /// cancelled mid-way has already released it, so its stale `Running`
    /// state can be reset too.
    pub fn reset(&self) {
        if !self.inner.in_flight.load(Ordering::Acquire) {
            self.set_state(OrchestratorState::Idle);
        }
    }

    /// Run every configured stage and return the report.
    ///
    /// Only two errors escape: [`WipeError::AlreadyInProgress`] when another
    /// run holds the guard, and [`WipeError::DisabledInDebugBuild`] when
    /// destructive actions are off and the orchestrator is set to refuse.
    /// Every stage failure is recorded in the report instead, and the run
    /// always continues to the next stage.
    pub async fn begin_wipe(&self, trigger: &ValidatedTrigger) -> Result<WipeReport> {
        let _guard = InFlightGuard::acquire(&self.inner.in_flight).ok_or_else(|| {
            warn!(method = %trigger.method(), "wipe already in progress");
            WipeError::AlreadyInProgress
        })?;

        let settings = self.inner.settings;
        if !settings.destructive && settings.refuse_when_disabled {
            warn!(method = %trigger.method(), "destructive actions disabled, refusing");
            self.set_state(OrchestratorState::FailedToStart);
            return Err(WipeError::DisabledInDebugBuild);
        }

        let simulated = !settings.destructive;
        self.set_state(OrchestratorState::Running);
        info!(
            method = %trigger.method(),
            simulated,
            remote = trigger.remote_wipe(),
            "emergency wipe started"
        );

        let runner = StageRunner::new(settings.stage_deadline, simulated);
        let mut draft = ReportDraft::start(trigger.method(), simulated, settings.passes);

        for stage in &self.inner.local {
            runner.run(stage.as_ref(), &mut draft).await;
        }

        if trigger.remote_wipe() {
            match &self.inner.remote {
                Some(stage) => runner.run(stage.as_ref(), &mut draft).await,
                None if simulated => draft.record(
                    REMOTE_STAGE,
                    StageOutcome::default().with_warning("requested but no client is configured"),
                ),
                None => {
                    warn!("remote wipe requested but no client is configured");
                    draft.push_error(REMOTE_STAGE, "requested but no client is configured");
                }
            }
        }

        let report = draft.finish();
        self.set_state(OrchestratorState::Completed);

        if report.success() {
            info!(
                items = report.items_destroyed(),
                duration_seconds = report.duration_seconds(),
                simulated,
                "emergency wipe completed"
            );
        } else {
            warn!(
                items = report.items_destroyed(),
                errors = report.errors().len(),
                duration_seconds = report.duration_seconds(),
                "emergency wipe completed with errors"
            );
        }

        Ok(report)
    }

    fn set_state(&self, state: OrchestratorState) {
        self.inner.state.store(state.as_u8(), Ordering::Release);
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state())
            .field("settings", &self.inner.settings)
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Holds the in-flight flag for the length of one run.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Builder for an [`Orchestrator`].
///
/// Each slot is optional. Execution order comes from the slot, not from
/// the order the setters are called in.
#[derive(Default)]
pub struct OrchestratorBuilder {
    settings: WipeSettings,
    memory: Option<Arc<dyn WipeStage>>,
    clipboard: Option<Arc<dyn WipeStage>>,
    network_cache: Option<Arc<dyn WipeStage>>,
    model_cache: Option<Arc<dyn WipeStage>>,
    secure_storage: Option<Arc<dyn WipeStage>>,
    remote: Option<Arc<dyn WipeStage>>,
}

impl OrchestratorBuilder {
    /// Replace all settings
    #[must_use]
    pub const fn settings(mut self, settings: WipeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Enable or disable destructive actions
    #[must_use]
    pub const fn destructive(mut self, destructive: bool) -> Self {
        self.settings.destructive = destructive;
        self
    }

    /// Refuse rather than simulate when destructive actions are off
    #[must_use]
    pub const fn refuse_when_disabled(mut self, refuse: bool) -> Self {
        self.settings.refuse_when_disabled = refuse;
        self
    }

    /// Overwrite passes reported in the wipe report
    #[must_use]
    pub const fn passes(mut self, passes: u32) -> Self {
        self.settings.passes = passes;
        self
    }

    /// Per-stage deadline
    #[must_use]
    pub const fn stage_deadline(mut self, deadline: Duration) -> Self {
        self.settings.stage_deadline = deadline;
        self
    }

    /// Memory zeroing stage
    #[must_use]
    pub fn memory(mut self, stage: Arc<dyn WipeStage>) -> Self {
        self.memory = Some(stage);
        self
    }

    /// Clipboard clear stage
    #[must_use]
    pub fn clipboard(mut self, stage: Arc<dyn WipeStage>) -> Self {
        self.clipboard = Some(stage);
        self
    }

    /// Network cache and cookie stage
    #[must_use]
    pub fn network_cache(mut self, stage: Arc<dyn WipeStage>) -> Self {
        self.network_cache = Some(stage);
        self
    }

    /// Model cache removal stage
    #[must_use]
    pub fn model_cache(mut self, stage: Arc<dyn WipeStage>) -> Self {
        self.model_cache = Some(stage);
        self
    }

    /// Fill every volatile slot from `cleaner`, clearing slots it leaves out
    #[must_use]
    pub fn volatile(mut self, cleaner: &VolatileStateCleaner) -> Self {
        self.memory = Some(cleaner.memory());
        self.clipboard = cleaner.clipboard();
        self.network_cache = Some(cleaner.network_cache());
        self.model_cache = cleaner.model_cache();
        self
    }

    /// Secure storage purge stage
    #[must_use]
    pub fn secure_storage(mut self, stage: Arc<dyn WipeStage>) -> Self {
        self.secure_storage = Some(stage);
        self
    }

    /// Remote wipe stage
    #[must_use]
    pub fn remote(mut self, stage: Arc<dyn WipeStage>) -> Self {
        self.remote = Some(stage);
        self
    }

    /// Build the orchestrator in the `Idle` state
    #[must_use]
    pub fn build(self) -> Orchestrator {
        let local = [
            self.memory,
            self.clipboard,
            self.network_cache,
            self.model_cache,
            self.secure_storage,
        ]
        .into_iter()
        .flatten()
        .collect();

        Orchestrator {
            inner: Arc::new(Inner {
                in_flight: AtomicBool::new(false),
                state: AtomicU8::new(OrchestratorState::Idle.as_u8()),
                settings: self.settings,
                local,
                remote: self.remote,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use panicwipe_core::{
        RemoteWipeOutcome, TriggerContext, TriggerMethod, TriggerPolicy, REMOTE_WIPE_FAILED,
    };
    use panicwipe_local::{
        ClipboardClear, MemoryClipboard, MemoryStore, MemoryZeroing, SecretPool,
        SecureStorageClient, SecureStore, StoreError, StoreResult,
    };
    use panicwipe_local::store::CredentialCategory;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Records every call into a shared log.
    struct FakeStage {
        name: &'static str,
        outcome: StageOutcome,
        delay: Duration,
        log: Arc<Mutex<Vec<String>>>,
        destroys: AtomicUsize,
    }

    impl FakeStage {
        fn new(name: &'static str, outcome: StageOutcome, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome,
                delay: Duration::ZERO,
                log: Arc::clone(log),
                destroys: AtomicUsize::new(0),
            })
        }

        fn slow(name: &'static str, delay: Duration, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome: StageOutcome::done(1),
                delay,
                log: Arc::clone(log),
                destroys: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl WipeStage for FakeStage {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn destroy(&self) -> StageOutcome {
            self.log.lock().unwrap().push(format!("destroy {}", self.name));
            self.destroys.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome.clone()
        }

        async fn survey(&self) -> StageOutcome {
            self.log.lock().unwrap().push(format!("survey {}", self.name));
            StageOutcome::surveyed(vec![format!("{}: item", self.name)])
        }
    }

    fn log() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn trigger(method: TriggerMethod) -> ValidatedTrigger {
        TriggerPolicy::default()
            .validate(method, TriggerContext::none())
            .unwrap()
    }

    fn live() -> OrchestratorBuilder {
        Orchestrator::builder()
            .destructive(true)
            .stage_deadline(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn stages_run_in_fixed_order() {
        let log = log();
        // Registered out of order on purpose.
        let orchestrator = live()
            .remote(FakeStage::new("remote", StageOutcome::done(1), &log))
            .secure_storage(FakeStage::new("storage", StageOutcome::done(1), &log))
            .model_cache(FakeStage::new("models", StageOutcome::done(1), &log))
            .memory(FakeStage::new("memory", StageOutcome::done(1), &log))
            .network_cache(FakeStage::new("cache", StageOutcome::done(1), &log))
            .clipboard(FakeStage::new("clipboard", StageOutcome::done(1), &log))
            .build();

        let report = orchestrator
            .begin_wipe(&trigger(TriggerMethod::PanicButton))
            .await
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            [
                "destroy memory",
                "destroy clipboard",
                "destroy cache",
                "destroy models",
                "destroy storage",
                "destroy remote"
            ]
        );
        assert!(report.success());
        assert_eq!(report.items_destroyed(), 6);
        assert_eq!(orchestrator.state(), OrchestratorState::Completed);
    }

    #[tokio::test]
    async fn success_is_derived_from_errors() {
        let log = log();
        let orchestrator = live()
            .memory(FakeStage::new("memory", StageOutcome::done(1), &log))
            .clipboard(FakeStage::new(
                "clipboard",
                StageOutcome::done(1).with_warning("clipboard not empty after clear"),
                &log,
            ))
            .build();
        let report = orchestrator
            .begin_wipe(&trigger(TriggerMethod::RemoteTrigger))
            .await
            .unwrap();
        assert!(report.success());
        assert_eq!(report.errors().len(), 0);
        assert_eq!(report.warnings().len(), 1);

        let failing = live()
            .memory(FakeStage::new("memory", StageOutcome::failed("pool poisoned"), &log))
            .build();
        let report = failing
            .begin_wipe(&trigger(TriggerMethod::RemoteTrigger))
            .await
            .unwrap();
        assert!(!report.success());
        assert_eq!(report.errors(), ["memory: pool poisoned"]);
    }

    #[tokio::test]
    async fn concurrent_begin_is_rejected() {
        let log = log();
        let orchestrator = live()
            .memory(FakeStage::slow("memory", Duration::from_millis(300), &log))
            .build();

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .begin_wipe(&trigger(TriggerMethod::PanicButton).local_only())
                    .await
            })
        };

        while orchestrator.state() != OrchestratorState::Running {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let second = orchestrator
            .begin_wipe(&trigger(TriggerMethod::PanicButton))
            .await;
        assert!(matches!(second, Err(WipeError::AlreadyInProgress)));
        assert_eq!(orchestrator.state(), OrchestratorState::Running);

        let report = first.await.unwrap().unwrap();
        assert!(report.success());
        assert_eq!(orchestrator.state(), OrchestratorState::Completed);
        assert_eq!(log.lock().unwrap().len(), 1);

        // The guard is released once the first run finishes.
        assert!(orchestrator
            .begin_wipe(&trigger(TriggerMethod::PanicButton).local_only())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn cancelled_run_can_be_reset() {
        let log = log();
        let orchestrator = live()
            .memory(FakeStage::slow("memory", Duration::from_secs(10), &log))
            .build();

        let handle = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .begin_wipe(&trigger(TriggerMethod::PanicButton).local_only())
                    .await
            })
        };
        while orchestrator.state() != OrchestratorState::Running {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert_eq!(orchestrator.state(), OrchestratorState::Running);

        orchestrator.reset();
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
    }

    #[tokio::test]
    async fn failing_stage_does_not_stop_later_stages() {
        let log = log();
        let model_cache = FakeStage::new("models", StageOutcome::failed("permission denied"), &log);
        let storage = FakeStage::new("storage", StageOutcome::done(2), &log);
        let orchestrator = live()
            .memory(FakeStage::new("memory", StageOutcome::done(1), &log))
            .model_cache(model_cache.clone())
            .secure_storage(storage.clone())
            .build();

        let report = orchestrator
            .begin_wipe(&trigger(TriggerMethod::DeadManSwitch).local_only())
            .await
            .unwrap();

        assert_eq!(model_cache.destroys.load(Ordering::SeqCst), 1);
        assert_eq!(storage.destroys.load(Ordering::SeqCst), 1);
        assert_eq!(report.items_destroyed(), 3);
        assert_eq!(report.errors(), ["models: permission denied"]);
        assert!(!report.success());
    }

    /// Third-party stage with a bug.
    struct Panicking;

    #[async_trait]
    impl WipeStage for Panicking {
        fn name(&self) -> &'static str {
            "plugin"
        }

        async fn destroy(&self) -> StageOutcome {
            panic!("index out of bounds");
        }

        async fn survey(&self) -> StageOutcome {
            StageOutcome::default()
        }
    }

    #[tokio::test]
    async fn panicking_stage_is_recorded_and_run_continues() {
        let log = log();
        let storage = FakeStage::new("storage", StageOutcome::done(2), &log);
        let orchestrator = live()
            .memory(FakeStage::new("memory", StageOutcome::done(1), &log))
            .clipboard(Arc::new(Panicking))
            .secure_storage(storage.clone())
            .build();

        let report = orchestrator
            .begin_wipe(&trigger(TriggerMethod::PanicButton).local_only())
            .await
            .unwrap();

        assert_eq!(report.errors(), ["plugin: panicked"]);
        assert_eq!(report.items_destroyed(), 3);
        assert_eq!(storage.destroys.load(Ordering::SeqCst), 1);
        assert_eq!(orchestrator.state(), OrchestratorState::Completed);

        orchestrator.reset();
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
    }

    #[tokio::test]
    async fn stage_deadline_is_recorded_and_run_continues() {
        let log = log();
        let orchestrator = live()
            .stage_deadline(Duration::from_millis(50))
            .memory(FakeStage::slow("memory", Duration::from_secs(10), &log))
            .clipboard(FakeStage::new("clipboard", StageOutcome::done(1), &log))
            .build();

        let report = orchestrator
            .begin_wipe(&trigger(TriggerMethod::PanicButton).local_only())
            .await
            .unwrap();
        assert_eq!(report.errors(), ["memory: timed out after 50ms"]);
        assert_eq!(report.items_destroyed(), 1);
        assert_eq!(orchestrator.state(), OrchestratorState::Completed);
    }

    #[tokio::test]
    async fn repeated_wipe_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        store.insert("vault", "alice", b"secret".to_vec()).await;
        store.insert("tokens", "api", b"token".to_vec()).await;

        let clipboard = Arc::new(MemoryClipboard::with_text("copied password"));
        let pool = SecretPool::new();
        pool.register(b"session key".to_vec());

        let orchestrator = live()
            .memory(Arc::new(MemoryZeroing::new(pool.clone(), 1, Duration::ZERO)))
            .clipboard(Arc::new(ClipboardClear::new(clipboard)))
            .secure_storage(Arc::new(SecureStorageClient::new(
                store.clone(),
                vec!["vault".into(), "tokens".into()],
            )))
            .build();
        let panic = trigger(TriggerMethod::PanicButton).local_only();

        let first = orchestrator.begin_wipe(&panic).await.unwrap();
        assert!(first.success());
        assert_eq!(first.items_destroyed(), 4);
        assert!(store.is_empty().await);
        assert!(pool.is_empty());

        orchestrator.reset();
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);

        // Only the clipboard clear is a fresh action the second time.
        let second = orchestrator.begin_wipe(&panic).await.unwrap();
        assert!(second.success());
        assert_eq!(second.items_destroyed(), 1);
    }

    #[tokio::test]
    async fn disabled_orchestrator_simulates() {
        let log = log();
        let store = Arc::new(MemoryStore::new());
        store.insert("vault", "alice", b"secret".to_vec()).await;

        let orchestrator = Orchestrator::builder()
            .destructive(false)
            .memory(FakeStage::new("memory", StageOutcome::done(1), &log))
            .secure_storage(Arc::new(SecureStorageClient::new(
                store.clone(),
                vec!["vault".into()],
            )))
            .build();

        let report = orchestrator
            .begin_wipe(&trigger(TriggerMethod::PanicButton))
            .await
            .unwrap();

        assert!(report.simulated());
        assert_eq!(report.items_destroyed(), 0);
        assert!(report.success());
        assert!(report.identified_items().contains(&"memory: item".to_string()));
        assert!(report.identified_items().contains(&"vault/alice".to_string()));
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(*log.lock().unwrap(), ["survey memory"]);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn disabled_orchestrator_can_refuse() {
        let log = log();
        let memory = FakeStage::new("memory", StageOutcome::done(1), &log);
        let orchestrator = Orchestrator::builder()
            .destructive(false)
            .refuse_when_disabled(true)
            .memory(memory)
            .build();

        let err = orchestrator
            .begin_wipe(&trigger(TriggerMethod::PanicButton))
            .await
            .unwrap_err();
        assert!(matches!(err, WipeError::DisabledInDebugBuild));
        assert_eq!(orchestrator.state(), OrchestratorState::FailedToStart);
        assert!(log.lock().unwrap().is_empty());

        orchestrator.reset();
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
    }

    #[tokio::test]
    async fn wrong_phrase_never_reaches_a_stage() {
        let log = log();
        let _orchestrator = live()
            .memory(FakeStage::new("memory", StageOutcome::done(1), &log))
            .build();

        let rejected = TriggerPolicy::default().validate(
            TriggerMethod::TextConfirmation,
            TriggerContext::with_phrase("DESTROY ALL"),
        );
        assert!(rejected.is_err());
        assert!(log.lock().unwrap().is_empty());
    }

    /// Deletes everything except one account.
    struct OneBadAccount {
        inner: MemoryStore,
    }

    #[async_trait]
    impl SecureStore for OneBadAccount {
        async fn accounts(&self, namespace: &str) -> StoreResult<Vec<String>> {
            self.inner.accounts(namespace).await
        }

        async fn delete(&self, namespace: &str, account: &str) -> StoreResult<()> {
            if account == "locked" {
                return Err(StoreError::AccessDenied("item is locked".into()));
            }
            self.inner.delete(namespace, account).await
        }

        async fn delete_category(&self, category: CredentialCategory) -> StoreResult<u64> {
            self.inner.delete_category(category).await
        }

        async fn count_category(&self, category: CredentialCategory) -> StoreResult<u64> {
            self.inner.count_category(category).await
        }
    }

    #[tokio::test]
    async fn one_failed_credential_delete_is_one_error() {
        let inner = MemoryStore::new();
        inner.insert("vault", "alice", b"a".to_vec()).await;
        inner.insert("vault", "bob", b"b".to_vec()).await;
        inner.insert("tokens", "locked", b"c".to_vec()).await;
        inner.insert("tokens", "api", b"d".to_vec()).await;
        inner.insert("sessions", "web", b"e".to_vec()).await;

        let orchestrator = live()
            .secure_storage(Arc::new(SecureStorageClient::new(
                Arc::new(OneBadAccount { inner }),
                vec!["vault".into(), "tokens".into(), "sessions".into()],
            )))
            .build();

        let report = orchestrator
            .begin_wipe(&trigger(TriggerMethod::PanicButton).local_only())
            .await
            .unwrap();

        assert_eq!(report.errors().len(), 1);
        assert!(report.errors()[0].contains("tokens/locked"));
        assert_eq!(report.items_destroyed(), 4);
        assert!(!report.success());
    }

    /// Remote stage that reports what a timed-out backend call returns.
    struct TimedOutRemote;

    #[async_trait]
    impl WipeStage for TimedOutRemote {
        fn name(&self) -> &'static str {
            "remote wipe"
        }

        async fn destroy(&self) -> StageOutcome {
            RemoteWipeOutcome::failed(format!("{REMOTE_WIPE_FAILED}: timed out after 30 seconds"))
                .into()
        }

        async fn survey(&self) -> StageOutcome {
            StageOutcome::default()
        }
    }

    #[tokio::test]
    async fn remote_failure_adds_one_error_and_keeps_local_counts() {
        let log = log();
        let orchestrator = live()
            .memory(FakeStage::new("memory", StageOutcome::done(1), &log))
            .clipboard(FakeStage::new("clipboard", StageOutcome::done(1), &log))
            .remote(Arc::new(TimedOutRemote))
            .build();

        let report = orchestrator
            .begin_wipe(&trigger(TriggerMethod::PanicButton))
            .await
            .unwrap();

        assert_eq!(report.items_destroyed(), 2);
        assert_eq!(report.errors().len(), 1);
        assert!(report.errors()[0].starts_with("remote wipe: Backend emergency wipe failed"));
        assert!(!report.success());
    }

    #[tokio::test]
    async fn requested_remote_without_client_is_an_error() {
        let report = live()
            .build()
            .begin_wipe(&trigger(TriggerMethod::PanicButton))
            .await
            .unwrap();
        assert_eq!(
            report.errors(),
            ["remote wipe: requested but no client is configured"]
        );
    }

    #[tokio::test]
    async fn clean_run_sums_stage_units() {
        let log = log();
        let remote = FakeStage::new("remote", StageOutcome::done(9), &log);
        let orchestrator = live()
            .memory(FakeStage::new("memory", StageOutcome::done(1), &log))
            .clipboard(FakeStage::new("clipboard", StageOutcome::done(1), &log))
            .network_cache(FakeStage::new("cache", StageOutcome::done(2), &log))
            .model_cache(FakeStage::new("models", StageOutcome::done(1), &log))
            .secure_storage(Arc::new(SecureStorageClient::new(
                Arc::new(MemoryStore::new()),
                vec!["vault".into()],
            )))
            .remote(remote.clone())
            .passes(3)
            .build();

        // A remote trigger came from the backend, so no remote call is made.
        let report = orchestrator
            .begin_wipe(&trigger(TriggerMethod::RemoteTrigger))
            .await
            .unwrap();

        assert!(report.success());
        assert!(!report.simulated());
        assert_eq!(report.items_destroyed(), 5);
        assert_eq!(report.passes(), 3);
        assert_eq!(remote.destroys.load(Ordering::SeqCst), 0);
        assert!(report.duration_seconds() >= 0.0);
    }
}
