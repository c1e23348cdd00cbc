//! Kill plans and their per-process outcomes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{ActionKind, KillMode, Target};

/// The concrete work derived from one user action. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillPlan {
    pub target: Target,
    pub pids: BTreeSet<u32>,
    pub mode: KillMode,
    pub elevated: bool,
}

impl KillPlan {
    pub fn new(target: Target, pids: BTreeSet<u32>, action: ActionKind) -> Self {
        Self {
            target,
            pids,
            mode: action.mode(),
            elevated: action.is_elevated(),
        }
    }

    pub fn wants_restart(&self) -> bool {
        self.mode.wants_restart()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }
}

/// Terminal state of one PID in a kill plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KillOutcome {
    /// Forcefully terminated (and, when a wait was requested, confirmed gone).
    Terminated,
    /// Exited on its own after being asked to close.
    TerminatedGracefully,
    /// No such process.
    NotFound,
    /// The process could not be opened or terminated with the caller's rights.
    AccessDenied,
    /// The process did not confirm its exit within the bounded wait.
    TimedOut,
    /// Handed to an elevated OS helper; the result is unknown.
    Delegated,
    /// The elevated OS helper could not be launched.
    DelegationFailed,
}

impl KillOutcome {
    /// Whether the process is known to be gone. Only then may it be restarted.
    pub fn confirms_exit(&self) -> bool {
        matches!(self, KillOutcome::Terminated | KillOutcome::TerminatedGracefully)
    }

    /// Whether the outcome counts as a failure for reporting.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            KillOutcome::NotFound
                | KillOutcome::AccessDenied
                | KillOutcome::TimedOut
                | KillOutcome::DelegationFailed
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            KillOutcome::Terminated => "terminated",
            KillOutcome::TerminatedGracefully => "closed gracefully",
            KillOutcome::NotFound => "not found",
            KillOutcome::AccessDenied => "access denied",
            KillOutcome::TimedOut => "did not exit in time",
            KillOutcome::Delegated => "handed to elevated helper",
            KillOutcome::DelegationFailed => "elevated helper failed to start",
        }
    }
}

impl std::fmt::Display for KillOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Outcomes keyed by PID, in PID order regardless of completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillReport {
    outcomes: BTreeMap<u32, KillOutcome>,
}

impl KillReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pid: u32, outcome: KillOutcome) {
        self.outcomes.insert(pid, outcome);
    }

    pub fn get(&self, pid: u32) -> Option<KillOutcome> {
        self.outcomes.get(&pid).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, KillOutcome)> + '_ {
        self.outcomes.iter().map(|(pid, outcome)| (*pid, *outcome))
    }

    pub fn pids(&self) -> BTreeSet<u32> {
        self.outcomes.keys().copied().collect()
    }

    /// PIDs whose outcome is a failure.
    pub fn failed(&self) -> Vec<u32> {
        self.iter()
            .filter(|(_, o)| o.is_failure())
            .map(|(pid, _)| pid)
            .collect()
    }

    /// PIDs known to be terminated.
    pub fn succeeded(&self) -> Vec<u32> {
        self.iter()
            .filter(|(_, o)| o.confirms_exit())
            .map(|(pid, _)| pid)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl FromIterator<(u32, KillOutcome)> for KillReport {
    fn from_iter<I: IntoIterator<Item = (u32, KillOutcome)>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

/// Why a requested restart was not attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "reason")]
pub enum RestartSkip {
    /// The old process was not confirmed gone.
    KillNotConfirmed { outcome: KillOutcome },
    /// No command line was captured for the process.
    NoCommandLine,
    /// The captured command line could not be turned into a program to run.
    MalformedCommandLine { detail: String },
}

impl std::fmt::Display for RestartSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestartSkip::KillNotConfirmed { outcome } => {
                write!(f, "kill not confirmed ({})", outcome)
            }
            RestartSkip::NoCommandLine => f.write_str("no command line captured"),
            RestartSkip::MalformedCommandLine { detail } => {
                write!(f, "malformed command line: {}", detail)
            }
        }
    }
}

/// Result of the restart step of a kill-and-restart action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum RestartOutcome {
    NotRequested,
    Skipped { skip: RestartSkip },
    Launched { argv: Vec<String> },
    Failed { argv: Vec<String>, reason: String },
}

impl RestartOutcome {
    pub fn skipped(skip: RestartSkip) -> Self {
        RestartOutcome::Skipped { skip }
    }
}

/// Everything that happened for one executed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub action: ActionKind,
    pub target: Target,
    pub kills: KillReport,
    pub restart: RestartOutcome,
}

impl ExecutionReport {
    /// True when no targeted PID failed and a requested restart was launched.
    pub fn is_success(&self) -> bool {
        let restart_ok = matches!(
            self.restart,
            RestartOutcome::NotRequested | RestartOutcome::Launched { .. }
        );
        self.kills.failed().is_empty() && restart_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirms_exit() {
        assert!(KillOutcome::Terminated.confirms_exit());
        assert!(KillOutcome::TerminatedGracefully.confirms_exit());
        assert!(!KillOutcome::TimedOut.confirms_exit());
        assert!(!KillOutcome::Delegated.confirms_exit());
        assert!(!KillOutcome::Delegated.is_failure());
    }

    #[test]
    fn test_report_is_ordered_by_pid() {
        let report: KillReport = vec![
            (30, KillOutcome::AccessDenied),
            (10, KillOutcome::Terminated),
            (20, KillOutcome::TerminatedGracefully),
        ]
        .into_iter()
        .collect();

        let pids: Vec<u32> = report.iter().map(|(pid, _)| pid).collect();
        assert_eq!(pids, vec![10, 20, 30]);
        assert_eq!(report.failed(), vec![30]);
        assert_eq!(report.succeeded(), vec![10, 20]);
    }

    #[test]
    fn test_plan_from_action() {
        let plan = KillPlan::new(
            Target::new("app.exe", 7),
            BTreeSet::from([7]),
            ActionKind::KillByIdAndRestart,
        );
        assert!(plan.wants_restart());
        assert!(!plan.elevated);
    }
}
