//! Process lifecycle controller.
//!
//! Owns everything that lives longer than one call: settings, the icon
//! cache and the current activation. The host shell drives it through
//! [`ProcessController::on_activate`], [`ProcessController::on_suggest`],
//! [`ProcessController::on_execute`] and [`ProcessController::on_deactivate`].

use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::adapters::{PlatformControl, PlatformLauncher, PlatformProcesses, PlatformWindows};
use crate::application::{RestartPlanner, SnapshotService, TargetResolver, TerminationEngine};
use crate::config::Settings;
use crate::domain::{
    build_catalog, suggest, ActionKind, CatalogEntry, ExecutionReport, KillOutcome,
    RestartOutcome, Snapshot,
};
use crate::error::{Error, Result};
use crate::icons::IconCache;
use crate::ports::{LauncherPort, ProcessControlPort, ProcessSourcePort, WindowSourcePort};

/// One live snapshot and the catalog built from it.
///
/// Read-only once built; shared with every execution started while it
/// is current.
#[derive(Debug)]
pub struct Activation {
    snapshot: Snapshot,
    catalog: Vec<CatalogEntry>,
}

impl Activation {
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }
}

/// The controller wired to the adapters of the current platform.
pub type PlatformController =
    ProcessController<PlatformProcesses, PlatformWindows, PlatformControl, PlatformLauncher>;

impl PlatformController {
    /// Create a controller using the native process, window and launch APIs.
    pub fn platform(settings: Settings) -> Self {
        ProcessController::new(
            PlatformProcesses::new(),
            PlatformWindows::new(),
            PlatformControl::new(),
            PlatformLauncher::new(),
            settings,
        )
    }
}

/// Lifecycle controller generic over its OS ports.
pub struct ProcessController<P, W, C, L>
where
    P: ProcessSourcePort,
    W: WindowSourcePort,
    C: ProcessControlPort,
    L: LauncherPort,
{
    snapshots: SnapshotService<P, W>,
    control: Arc<C>,
    launcher: Arc<L>,

    settings: RwLock<Settings>,
    icons: IconCache,
    activation: RwLock<Option<Arc<Activation>>>,

    // Executions still running; deactivation waits for zero.
    in_flight: AtomicUsize,
    idle: Notify,
}

/// Counts one running execution for as long as it lives.
struct InFlight<'a> {
    count: &'a AtomicUsize,
    idle: &'a Notify,
}

impl<'a> InFlight<'a> {
    fn enter(count: &'a AtomicUsize, idle: &'a Notify) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self { count, idle }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl<P, W, C, L> ProcessController<P, W, C, L>
where
    P: ProcessSourcePort,
    W: WindowSourcePort,
    C: ProcessControlPort + 'static,
    L: LauncherPort,
{
    pub fn new(processes: P, windows: W, control: C, launcher: L, settings: Settings) -> Self {
        Self {
            snapshots: SnapshotService::new(processes, windows),
            control: Arc::new(control),
            launcher: Arc::new(launcher),
            settings: RwLock::new(settings),
            icons: IconCache::new(),
            activation: RwLock::new(None),
            in_flight: AtomicUsize::new(0),
            idle: Notify::new(),
        }
    }

    // ========================================================================
    // Host shell contract
    // ========================================================================

    /// Build (or reuse) the current activation and return its catalog.
    pub async fn on_activate(&self) -> Vec<CatalogEntry> {
        self.activate().await.catalog().to_vec()
    }

    /// Rank the current catalog against `query`, activating first if needed.
    pub async fn on_suggest(&self, query: &str) -> Vec<CatalogEntry> {
        let activation = self.activate().await;
        suggest(activation.catalog(), query)
    }

    /// Run `action` (or the configured default) on `entry`.
    ///
    /// Targets are resolved against the snapshot of the current activation.
    /// Per-process failures are part of the report, not errors; only an
    /// action that does not apply to the entry or a missing activation fail
    /// the call.
    pub async fn on_execute(
        &self,
        entry: &CatalogEntry,
        action: Option<ActionKind>,
    ) -> Result<ExecutionReport> {
        let _in_flight = InFlight::enter(&self.in_flight, &self.idle);

        let settings = self.settings.read().clone();
        let action = action.unwrap_or(settings.default_action);
        if !action.is_available_for(entry.category) {
            return Err(Error::invalid_action(
                action.id(),
                format!("not available for '{}' (no captured command line)", entry.target),
            ));
        }

        let activation = self.current().ok_or(Error::NoActiveCatalog)?;
        let plan = TargetResolver::plan(&entry.target, action, activation.snapshot());
        info!(
            target = %entry.target,
            action = %action,
            pids = plan.pids.len(),
            "Executing action"
        );

        let engine = TerminationEngine::new(
            Arc::clone(&self.control),
            Arc::clone(&self.launcher),
            settings.termination_options(),
        );
        let kills = engine.execute(&plan, activation.snapshot().windows()).await;

        for (pid, outcome) in kills.iter() {
            if outcome.is_failure() {
                warn!(pid = pid, outcome = %outcome, "Kill failed");
            } else {
                info!(pid = pid, outcome = %outcome, "Kill finished");
            }
        }

        let restart = if plan.wants_restart() {
            let outcome = kills.get(entry.pid()).unwrap_or(KillOutcome::NotFound);
            RestartPlanner::new(Arc::clone(&self.launcher))
                .restart(outcome, &entry.captured)
                .await
        } else {
            RestartOutcome::NotRequested
        };

        Ok(ExecutionReport {
            action,
            target: entry.target.clone(),
            kills,
            restart,
        })
    }

    /// Tear down the activation once every running execution finished.
    ///
    /// Running executions are never cancelled. The icon cache is kept.
    pub async fn on_deactivate(&self) {
        loop {
            let idle = self.idle.notified();
            let running = self.in_flight.load(Ordering::SeqCst);
            if running == 0 {
                break;
            }
            debug!(running = running, "Waiting for executions before deactivating");
            idle.await;
        }

        if self.activation.write().take().is_some() {
            debug!("Activation dropped");
        }
    }

    // ========================================================================
    // Settings and queries
    // ========================================================================

    /// Replace the settings. Catalog options apply from the next activation.
    pub fn reload_settings(&self, settings: Settings) {
        *self.settings.write() = settings;
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    pub fn default_action(&self) -> ActionKind {
        self.settings.read().default_action
    }

    pub fn item_label(&self) -> String {
        self.settings.read().item_label.clone()
    }

    /// Actions offered for `entry`, in menu order.
    pub fn actions_for(&self, entry: &CatalogEntry) -> Vec<ActionKind> {
        ActionKind::available_for(entry.category)
    }

    /// The current activation, if any.
    pub fn current(&self) -> Option<Arc<Activation>> {
        self.activation.read().clone()
    }

    pub fn icons(&self) -> &IconCache {
        &self.icons
    }

    async fn activate(&self) -> Arc<Activation> {
        if let Some(activation) = self.current() {
            return activation;
        }

        let hide_background = self.settings.read().hide_background;
        let snapshot = self.snapshots.capture().await;
        let catalog = build_catalog(&snapshot, hide_background, |path| {
            self.icons.get_or_load(path)
        });
        let built = Arc::new(Activation { snapshot, catalog });

        let mut slot = self.activation.write();
        // Another caller may have activated while we were capturing.
        if let Some(existing) = slot.as_ref() {
            return Arc::clone(existing);
        }
        info!(entries = built.catalog.len(), "Catalog activated");
        *slot = Some(Arc::clone(&built));
        built
    }
}
