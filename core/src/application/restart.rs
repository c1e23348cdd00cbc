//! Relaunching a terminated process from its captured command line.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{CapturedData, CommandLineSyntax, KillOutcome, RestartOutcome, RestartSkip};
use crate::ports::LauncherPort;

/// Rebuilds and relaunches the command line of a killed process.
pub struct RestartPlanner<L: LauncherPort> {
    launcher: Arc<L>,
    syntax: CommandLineSyntax,
}

impl<L: LauncherPort> RestartPlanner<L> {
    /// Planner using the command-line syntax of the current platform.
    pub fn new(launcher: Arc<L>) -> Self {
        Self {
            launcher,
            syntax: CommandLineSyntax::native(),
        }
    }

    /// Override the splitting rules (the captured data may come from another platform).
    pub fn with_syntax(mut self, syntax: CommandLineSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Turn captured data into the argument vector to launch.
    ///
    /// A blank argument zero is replaced by the captured executable path.
    pub fn plan_argv(&self, captured: &CapturedData) -> Result<Vec<String>, RestartSkip> {
        let command_line = captured
            .command_line
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or(RestartSkip::NoCommandLine)?;

        let mut argv = self
            .syntax
            .split(command_line)
            .map_err(|e| RestartSkip::MalformedCommandLine {
                detail: e.to_string(),
            })?;

        let program_missing = argv.first().map_or(true, |a| a.trim().is_empty());
        if program_missing {
            let exe = captured
                .executable_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| RestartSkip::MalformedCommandLine {
                    detail: format!("no program in '{}' and no executable path", command_line),
                })?;
            if argv.is_empty() {
                argv.push(exe);
            } else {
                argv[0] = exe;
            }
        }

        Ok(argv)
    }

    /// Relaunch after a kill that ended in `outcome`.
    ///
    /// Nothing is launched unless the kill confirmed the old process is gone.
    pub async fn restart(&self, outcome: KillOutcome, captured: &CapturedData) -> RestartOutcome {
        if !outcome.confirms_exit() {
            warn!(outcome = %outcome, "Not restarting, process exit was not confirmed");
            return RestartOutcome::skipped(RestartSkip::KillNotConfirmed { outcome });
        }

        let argv = match self.plan_argv(captured) {
            Ok(argv) => argv,
            Err(skip) => {
                warn!(reason = %skip, "Restart skipped");
                return RestartOutcome::skipped(skip);
            }
        };

        let (program, args) = match argv.split_first() {
            Some(split) => split,
            None => return RestartOutcome::skipped(RestartSkip::NoCommandLine),
        };

        match self.launcher.launch(program, args).await {
            Ok(()) => {
                info!(program = %program, args = args.len(), "Restarted application");
                RestartOutcome::Launched { argv }
            }
            Err(e) => {
                warn!(program = %program, error = %e, "Restart launch failed");
                RestartOutcome::Failed {
                    argv,
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::application::testing::MockLauncher;

    fn captured(command_line: Option<&str>, exe: Option<&str>) -> CapturedData {
        CapturedData {
            command_line: command_line.map(str::to_string),
            executable_path: exe.map(PathBuf::from),
        }
    }

    fn planner(launcher: &Arc<MockLauncher>) -> RestartPlanner<MockLauncher> {
        RestartPlanner::new(Arc::clone(launcher)).with_syntax(CommandLineSyntax::Windows)
    }

    #[test]
    fn test_plan_argv_quoted_path() {
        let launcher = Arc::new(MockLauncher::new());
        let argv = planner(&launcher)
            .plan_argv(&captured(
                Some(r#""C:\Program Files\App\app.exe" --flag "value with space""#),
                None,
            ))
            .unwrap();
        assert_eq!(
            argv,
            vec![r"C:\Program Files\App\app.exe", "--flag", "value with space"]
        );
    }

    #[test]
    fn test_plan_argv_substitutes_blank_program() {
        let launcher = Arc::new(MockLauncher::new());
        let argv = planner(&launcher)
            .plan_argv(&captured(Some(r#""" --flag"#), Some(r"C:\App\app.exe")))
            .unwrap();
        assert_eq!(argv, vec![r"C:\App\app.exe", "--flag"]);
    }

    #[test]
    fn test_plan_argv_without_command_line() {
        let launcher = Arc::new(MockLauncher::new());
        let skip = planner(&launcher)
            .plan_argv(&captured(None, Some(r"C:\App\app.exe")))
            .unwrap_err();
        assert_eq!(skip, RestartSkip::NoCommandLine);
    }

    #[test]
    fn test_plan_argv_posix_malformed() {
        let launcher = Arc::new(MockLauncher::new());
        let planner = RestartPlanner::new(launcher).with_syntax(CommandLineSyntax::Posix);
        let skip = planner
            .plan_argv(&captured(Some("/usr/bin/app 'unterminated"), None))
            .unwrap_err();
        assert!(matches!(skip, RestartSkip::MalformedCommandLine { .. }));
    }

    #[tokio::test]
    async fn test_restart_never_launches_after_timeout() {
        let launcher = Arc::new(MockLauncher::new());
        let outcome = planner(&launcher)
            .restart(
                KillOutcome::TimedOut,
                &captured(Some(r"C:\App\app.exe"), None),
            )
            .await;

        assert_eq!(
            outcome,
            RestartOutcome::skipped(RestartSkip::KillNotConfirmed {
                outcome: KillOutcome::TimedOut
            })
        );
        assert!(launcher.launches().is_empty());
    }

    #[tokio::test]
    async fn test_restart_launches_after_confirmed_exit() {
        let launcher = Arc::new(MockLauncher::new());
        let outcome = planner(&launcher)
            .restart(
                KillOutcome::TerminatedGracefully,
                &captured(Some(r#""C:\App\app.exe" -n"#), None),
            )
            .await;

        assert!(matches!(outcome, RestartOutcome::Launched { .. }));
        assert_eq!(launcher.launches(), vec![vec![r"C:\App\app.exe", "-n"]]);
    }

    #[tokio::test]
    async fn test_restart_reports_launch_failure() {
        let launcher = Arc::new(MockLauncher::failing());
        let outcome = planner(&launcher)
            .restart(KillOutcome::Terminated, &captured(Some("app.exe"), None))
            .await;

        match outcome {
            RestartOutcome::Failed { argv, reason } => {
                assert_eq!(argv, vec!["app.exe"]);
                assert!(reason.contains("app.exe"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
