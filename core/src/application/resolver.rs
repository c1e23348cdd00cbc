//! Expands a selected target into the PIDs an action applies to.

use std::collections::BTreeSet;

use crate::domain::{ActionKind, KillMode, KillPlan, Snapshot, Target};
use crate::error::Result;

/// Resolves a target and an action into a set of PIDs.
pub struct TargetResolver;

impl TargetResolver {
    /// Resolve the PIDs `action` applies to.
    ///
    /// ID actions return exactly the target PID without consulting the
    /// snapshot; a PID that is gone surfaces as `NotFound` at kill time.
    /// Name actions return every snapshot PID whose name equals the
    /// target's, which may be empty.
    pub fn resolve(target: &Target, action: ActionKind, snapshot: &Snapshot) -> BTreeSet<u32> {
        match action.mode() {
            KillMode::ById | KillMode::ByIdAndRestart => BTreeSet::from([target.pid]),
            KillMode::ByName => snapshot.pids_named(&target.name),
        }
    }

    /// Resolve using an action identifier, failing loudly on unknown ones.
    pub fn resolve_named(
        target: &Target,
        action_id: &str,
        snapshot: &Snapshot,
    ) -> Result<BTreeSet<u32>> {
        let action: ActionKind = action_id.parse()?;
        Ok(Self::resolve(target, action, snapshot))
    }

    /// Build the kill plan for `action` on `target`.
    pub fn plan(target: &Target, action: ActionKind, snapshot: &Snapshot) -> KillPlan {
        KillPlan::new(
            target.clone(),
            Self::resolve(target, action, snapshot),
            action,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProcessRecord, WindowIndex};
    use crate::error::Error;

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                ProcessRecord::new(10, "chrome.exe"),
                ProcessRecord::new(11, "chrome.exe"),
                ProcessRecord::new(12, "chrome.exe"),
                ProcessRecord::new(20, "notepad.exe"),
            ],
            WindowIndex::default(),
        )
    }

    #[test]
    fn test_by_id_ignores_snapshot() {
        let target = Target::new("ghost.exe", 999);
        for action in [
            ActionKind::KillById,
            ActionKind::KillByIdElevated,
            ActionKind::KillByIdAndRestart,
        ] {
            assert_eq!(
                TargetResolver::resolve(&target, action, &snapshot()),
                BTreeSet::from([999])
            );
        }
    }

    #[test]
    fn test_by_name_matches_all_instances() {
        let target = Target::new("chrome.exe", 11);
        assert_eq!(
            TargetResolver::resolve(&target, ActionKind::KillByName, &snapshot()),
            BTreeSet::from([10, 11, 12])
        );
        assert_eq!(
            TargetResolver::resolve(&target, ActionKind::KillByNameElevated, &snapshot()),
            BTreeSet::from([10, 11, 12])
        );
    }

    #[test]
    fn test_by_name_without_match_is_empty() {
        let target = Target::new("missing.exe", 1);
        assert!(TargetResolver::resolve(&target, ActionKind::KillByName, &snapshot()).is_empty());
    }

    #[test]
    fn test_unknown_action_id_is_invalid() {
        let target = Target::new("chrome.exe", 10);
        let err = TargetResolver::resolve_named(&target, "kill_everything", &snapshot()).unwrap_err();
        assert!(matches!(err, Error::InvalidAction { .. }));

        let pids = TargetResolver::resolve_named(&target, "kill_by_name", &snapshot()).unwrap();
        assert_eq!(pids.len(), 3);
    }

    #[test]
    fn test_plan_carries_mode_and_elevation() {
        let target = Target::new("notepad.exe", 20);
        let plan = TargetResolver::plan(&target, ActionKind::KillByIdElevated, &snapshot());
        assert!(plan.elevated);
        assert_eq!(plan.mode, KillMode::ById);
        assert_eq!(plan.pids, BTreeSet::from([20]));
    }
}
