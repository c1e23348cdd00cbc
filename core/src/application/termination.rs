//! Termination engine: graceful-then-forceful kill policy per PID.
//!
//! Each PID moves through its own state machine:
//!
//! ```text
//! open ──denied──▶ [AccessDenied]
//!  │  └─missing──▶ [NotFound]
//!  ▼
//! request close (graceful only) ─▶ bounded wait ─exited─▶ [TerminatedGracefully]
//!  │                                   │ timed out, still alive
//!  ▼                                   ▼
//! force terminate ─failed─▶ [AccessDenied]
//!  │
//!  ▼ (restart requested)
//! bounded wait ─exited─▶ [Terminated]
//!  └─timed out─────────▶ [TimedOut]
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::{KillMode, KillOutcome, KillPlan, KillReport, WindowIndex, WindowRecord};
use crate::error::OpenError;
use crate::ports::{ElevatedKill, LauncherPort, ProcessControlPort, WaitOutcome};

/// Default wait after asking an application to close (5000ms).
pub const DEFAULT_GRACEFUL_TIMEOUT_MS: u64 = 5000;

/// Default wait confirming exit before a restart (1000ms).
pub const DEFAULT_RESTART_WAIT_TIMEOUT_MS: u64 = 1000;

/// Tunables for the termination engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationOptions {
    /// Whether to ask applications to close before force-killing them.
    pub graceful_close: bool,
    /// Bounded wait after the close request.
    pub graceful_timeout: Duration,
    /// Bounded wait after forceful termination when a restart follows.
    pub restart_wait_timeout: Duration,
}

impl Default for TerminationOptions {
    fn default() -> Self {
        Self {
            graceful_close: true,
            graceful_timeout: Duration::from_millis(DEFAULT_GRACEFUL_TIMEOUT_MS),
            restart_wait_timeout: Duration::from_millis(DEFAULT_RESTART_WAIT_TIMEOUT_MS),
        }
    }
}

/// Executes kill plans.
pub struct TerminationEngine<C: ProcessControlPort, L: LauncherPort> {
    control: Arc<C>,
    launcher: Arc<L>,
    options: TerminationOptions,
}

impl<C, L> TerminationEngine<C, L>
where
    C: ProcessControlPort + 'static,
    L: LauncherPort,
{
    pub fn new(control: Arc<C>, launcher: Arc<L>, options: TerminationOptions) -> Self {
        Self {
            control,
            launcher,
            options,
        }
    }

    pub fn options(&self) -> &TerminationOptions {
        &self.options
    }

    /// Execute `plan`, returning exactly one outcome per planned PID.
    ///
    /// PIDs are killed concurrently and independently; a failure on one
    /// never prevents attempts on the others.
    pub async fn execute(&self, plan: &KillPlan, windows: &WindowIndex) -> KillReport {
        if plan.elevated {
            return self.delegate(plan).await;
        }

        let mut tasks = JoinSet::new();
        for &pid in &plan.pids {
            let control = Arc::clone(&self.control);
            let windows = windows.windows_of(pid).to_vec();
            let options = self.options.clone();
            let wants_restart = plan.wants_restart();

            tasks.spawn(async move {
                let outcome =
                    kill_one(control.as_ref(), pid, &windows, wants_restart, &options).await;
                (pid, outcome)
            });
        }

        let mut report = KillReport::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((pid, outcome)) => report.record(pid, outcome),
                Err(e) => error!(error = %e, "Kill task failed"),
            }
        }

        // A task that died mid-way leaves liveness unknown.
        for &pid in &plan.pids {
            if report.get(pid).is_none() {
                warn!(pid = pid, "No outcome recorded, reporting as timed out");
                report.record(pid, KillOutcome::TimedOut);
            }
        }

        report
    }

    /// Hand the whole plan to the elevated OS helper.
    ///
    /// There is no graceful phase and no introspection: every PID ends up
    /// `Delegated` if the helper launched, `DelegationFailed` otherwise.
    async fn delegate(&self, plan: &KillPlan) -> KillReport {
        if plan.is_empty() {
            info!(target = %plan.target, "Nothing to delegate, no matching processes");
            return KillReport::new();
        }

        let requests: Vec<(Vec<u32>, ElevatedKill)> = match plan.mode {
            KillMode::ByName => vec![(
                plan.pids.iter().copied().collect(),
                ElevatedKill::ByName(plan.target.name.clone()),
            )],
            KillMode::ById | KillMode::ByIdAndRestart => plan
                .pids
                .iter()
                .map(|&pid| (vec![pid], ElevatedKill::ById(pid)))
                .collect(),
        };

        let mut report = KillReport::new();
        for (pids, request) in requests {
            debug!(request = ?request, "Launching elevated kill");
            let outcome = match self.launcher.launch_elevated(&request).await {
                Ok(()) => KillOutcome::Delegated,
                Err(e) => {
                    warn!(request = ?request, error = %e, "Elevated kill could not be launched");
                    KillOutcome::DelegationFailed
                }
            };
            for pid in pids {
                report.record(pid, outcome);
            }
        }
        report
    }
}

/// Run the state machine for one PID.
async fn kill_one<C: ProcessControlPort>(
    control: &C,
    pid: u32,
    windows: &[WindowRecord],
    wants_restart: bool,
    options: &TerminationOptions,
) -> KillOutcome {
    let graceful = options.graceful_close && (!windows.is_empty() || wants_restart);

    let handle = match control.open(pid, graceful || wants_restart).await {
        Ok(handle) => handle,
        Err(OpenError::NotFound(_)) => {
            debug!(pid = pid, "Process not found");
            return KillOutcome::NotFound;
        }
        Err(OpenError::AccessDenied(_)) => {
            warn!(pid = pid, "Access denied opening process");
            return KillOutcome::AccessDenied;
        }
    };

    if graceful && control.request_close(&handle, windows).await {
        debug!(pid = pid, windows = windows.len(), "Close requested, waiting for exit");
        match control.wait_exit(&handle, options.graceful_timeout).await {
            Ok(WaitOutcome::Exited) => {
                debug!(pid = pid, "Process closed gracefully");
                return KillOutcome::TerminatedGracefully;
            }
            Ok(WaitOutcome::TimedOut) => {
                debug!(pid = pid, "Graceful wait timed out");
            }
            Err(e) => {
                warn!(pid = pid, error = %e, "Graceful wait failed");
            }
        }

        // Some applications close their windows without the process
        // object signalling promptly.
        if !control.is_alive(&handle).await {
            debug!(pid = pid, "Process gone after graceful wait");
            return KillOutcome::TerminatedGracefully;
        }
        debug!(pid = pid, "Process still running, forcing termination");
    }

    if let Err(e) = control.terminate(&handle).await {
        if !control.is_alive(&handle).await {
            debug!(pid = pid, "Process exited while terminating");
            return KillOutcome::Terminated;
        }
        warn!(pid = pid, error = %e, "Forceful termination failed");
        return KillOutcome::AccessDenied;
    }

    if !wants_restart {
        return KillOutcome::Terminated;
    }

    match control.wait_exit(&handle, options.restart_wait_timeout).await {
        Ok(WaitOutcome::Exited) => KillOutcome::Terminated,
        Ok(WaitOutcome::TimedOut) => {
            warn!(pid = pid, "Process did not exit after termination");
            KillOutcome::TimedOut
        }
        Err(e) => {
            warn!(pid = pid, error = %e, "Waiting for exit failed");
            KillOutcome::TimedOut
        }
    }
}
