//! Detached process launching and `pkexec` elevation.

use std::os::unix::process::CommandExt;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ports::{ElevatedKill, LauncherPort};

/// Launches processes detached from this one.
#[derive(Debug, Default)]
pub struct LinuxLauncher;

impl LinuxLauncher {
    pub fn new() -> Self {
        Self
    }

    /// Spawn `program` in its own process group and let it run.
    fn spawn_detached(program: &str, args: &[String]) -> Result<u32> {
        let mut command = std::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0);

        let child = Command::from(command)
            .spawn()
            .map_err(|e| Error::Launch(format!("{}: {}", program, e)))?;

        Ok(child.id().unwrap_or_default())
    }
}

/// `pkexec` arguments for an elevated forced kill.
fn elevated_args(request: &ElevatedKill) -> Vec<String> {
    match request {
        ElevatedKill::ById(pid) => vec!["kill".into(), "-9".into(), pid.to_string()],
        ElevatedKill::ByName(name) => {
            vec!["pkill".into(), "-9".into(), "-x".into(), name.clone()]
        }
    }
}

impl LauncherPort for LinuxLauncher {
    async fn launch(&self, program: &str, args: &[String]) -> Result<()> {
        let pid = Self::spawn_detached(program, args)?;
        debug!(program = %program, pid = pid, "Launched");
        Ok(())
    }

    async fn launch_elevated(&self, request: &ElevatedKill) -> Result<()> {
        let args = elevated_args(request);
        let pid = Self::spawn_detached("pkexec", &args)?;
        debug!(request = ?request, pid = pid, "Launched pkexec");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevated_args() {
        assert_eq!(elevated_args(&ElevatedKill::ById(42)), vec!["kill", "-9", "42"]);
        assert_eq!(
            elevated_args(&ElevatedKill::ByName("firefox".into())),
            vec!["pkill", "-9", "-x", "firefox"]
        );
    }

    #[tokio::test]
    async fn test_launch_missing_program_fails() {
        let result = LinuxLauncher::new()
            .launch("/nonexistent/taskreaper-test-binary", &[])
            .await;
        assert!(matches!(result, Err(Error::Launch(_))));
    }

    #[tokio::test]
    async fn test_launch_true() {
        LinuxLauncher::new().launch("true", &[]).await.unwrap();
    }
}
