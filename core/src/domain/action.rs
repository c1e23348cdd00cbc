//! The closed action vocabulary offered for a selected process.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Category;
use crate::error::Error;

/// How a target is expanded into PIDs and whether a restart follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KillMode {
    /// Every process in the snapshot sharing the target's name.
    ByName,
    /// Exactly the target PID.
    ById,
    /// Exactly the target PID, relaunched from its captured command line afterwards.
    ByIdAndRestart,
}

impl KillMode {
    /// Whether a post-kill wait and relaunch are part of this mode.
    pub fn wants_restart(&self) -> bool {
        matches!(self, KillMode::ByIdAndRestart)
    }
}

/// A user-selectable kill action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ActionKind {
    #[serde(rename = "kill_by_name")]
    KillByName,
    #[default]
    #[serde(rename = "kill_by_id")]
    KillById,
    #[serde(rename = "kill_by_name_admin")]
    KillByNameElevated,
    #[serde(rename = "kill_by_id_admin")]
    KillByIdElevated,
    #[serde(rename = "kill_and_restart_by_id")]
    KillByIdAndRestart,
}

impl ActionKind {
    /// All actions, in menu order.
    pub const ALL: [ActionKind; 5] = [
        ActionKind::KillByName,
        ActionKind::KillById,
        ActionKind::KillByNameElevated,
        ActionKind::KillByIdElevated,
        ActionKind::KillByIdAndRestart,
    ];

    /// Stable identifier used in configuration and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            ActionKind::KillByName => "kill_by_name",
            ActionKind::KillById => "kill_by_id",
            ActionKind::KillByNameElevated => "kill_by_name_admin",
            ActionKind::KillByIdElevated => "kill_by_id_admin",
            ActionKind::KillByIdAndRestart => "kill_and_restart_by_id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::KillByName => "Kill by Name",
            ActionKind::KillById => "Kill by PID",
            ActionKind::KillByNameElevated => "Kill by Name (as Admin)",
            ActionKind::KillByIdElevated => "Kill by PID (as Admin)",
            ActionKind::KillByIdAndRestart => "Kill by PID and restart application",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActionKind::KillByName => "Kills all processes by that name",
            ActionKind::KillById => "Kills single process by its process id",
            ActionKind::KillByNameElevated => {
                "Kills all processes by that name with elevated rights"
            }
            ActionKind::KillByIdElevated => {
                "Kills single process by its process id with elevated rights"
            }
            ActionKind::KillByIdAndRestart => {
                "Kills single process by its process id and tries to restart it"
            }
        }
    }

    pub fn mode(&self) -> KillMode {
        match self {
            ActionKind::KillByName | ActionKind::KillByNameElevated => KillMode::ByName,
            ActionKind::KillById | ActionKind::KillByIdElevated => KillMode::ById,
            ActionKind::KillByIdAndRestart => KillMode::ByIdAndRestart,
        }
    }

    /// Elevated actions delegate the whole kill to an OS helper.
    pub fn is_elevated(&self) -> bool {
        matches!(
            self,
            ActionKind::KillByNameElevated | ActionKind::KillByIdElevated
        )
    }

    /// Whether this action may be offered for an entry of `category`.
    ///
    /// Restarting needs the original command line, so only restartable
    /// entries get the restart action.
    pub fn is_available_for(&self, category: Category) -> bool {
        match self {
            ActionKind::KillByIdAndRestart => category == Category::Restartable,
            _ => true,
        }
    }

    /// Actions offered for an entry of `category`, in menu order.
    pub fn available_for(category: Category) -> Vec<ActionKind> {
        Self::ALL
            .into_iter()
            .filter(|a| a.is_available_for(category))
            .collect()
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|a| a.id() == normalized)
            .ok_or_else(|| {
                Error::invalid_action(
                    s,
                    format!(
                        "expected one of: {}",
                        Self::ALL.map(|a| a.id()).join(", ")
                    ),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action_ids() {
        for action in ActionKind::ALL {
            assert_eq!(action.id().parse::<ActionKind>().unwrap(), action);
        }
        assert_eq!(
            "kill-by-name-admin".parse::<ActionKind>().unwrap(),
            ActionKind::KillByNameElevated
        );
    }

    #[test]
    fn test_parse_unknown_action_is_invalid() {
        let err = "kill_gently".parse::<ActionKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidAction { ref action, .. } if action == "kill_gently"));
    }

    #[test]
    fn test_modes() {
        assert_eq!(ActionKind::KillByNameElevated.mode(), KillMode::ByName);
        assert_eq!(ActionKind::KillByIdElevated.mode(), KillMode::ById);
        assert!(ActionKind::KillByIdAndRestart.mode().wants_restart());
        assert!(!ActionKind::KillByIdAndRestart.is_elevated());
        assert!(ActionKind::KillByIdElevated.is_elevated());
    }

    #[test]
    fn test_restart_only_for_restartable() {
        let normal = ActionKind::available_for(Category::Normal);
        assert_eq!(normal.len(), 4);
        assert!(!normal.contains(&ActionKind::KillByIdAndRestart));

        let restartable = ActionKind::available_for(Category::Restartable);
        assert_eq!(restartable.len(), 5);
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&ActionKind::KillByIdAndRestart).unwrap();
        assert_eq!(json, "\"kill_and_restart_by_id\"");
        let parsed: ActionKind = serde_json::from_str("\"kill_by_name_admin\"").unwrap();
        assert_eq!(parsed, ActionKind::KillByNameElevated);
    }
}
