//! Signal-based process control.

use std::process::Stdio;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use procfs::process::Process;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::WindowRecord;
use crate::error::{Error, OpenError, Result};
use crate::ports::{ProcessControlPort, WaitOutcome};

/// Interval between liveness probes while waiting for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A PID pinned to the process instance it referred to when opened.
///
/// The kernel start time distinguishes a reused PID from the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinuxProcessHandle {
    pid: Pid,
    start_time: u64,
}

impl LinuxProcessHandle {
    pub fn pid(&self) -> u32 {
        self.pid.as_raw() as u32
    }
}

/// Process control through signals and the window manager.
#[derive(Debug, Default)]
pub struct LinuxControl;

impl LinuxControl {
    pub fn new() -> Self {
        Self
    }

    /// Whether the pinned process is still running. Zombies count as exited.
    fn probe(handle: &LinuxProcessHandle) -> bool {
        match Process::new(handle.pid.as_raw()).and_then(|p| p.stat()) {
            Ok(stat) => stat.starttime == handle.start_time && stat.state != 'Z',
            Err(_) => false,
        }
    }

    async fn close_window(window: &WindowRecord) -> bool {
        let id = format!("{:#x}", window.handle.0);
        let status = Command::new("wmctrl")
            .args(["-i", "-c", &id])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => true,
            Ok(status) => {
                debug!(window = %window.handle, status = %status, "wmctrl close failed");
                false
            }
            Err(e) => {
                warn!(window = %window.handle, error = %e, "Failed to run wmctrl");
                false
            }
        }
    }
}

impl ProcessControlPort for LinuxControl {
    type Handle = LinuxProcessHandle;

    async fn open(
        &self,
        pid: u32,
        _synchronize: bool,
    ) -> std::result::Result<LinuxProcessHandle, OpenError> {
        let raw = i32::try_from(pid).map_err(|_| OpenError::NotFound(pid))?;

        match kill(Pid::from_raw(raw), None) {
            Ok(()) => {}
            Err(Errno::EPERM) => return Err(OpenError::AccessDenied(pid)),
            Err(_) => return Err(OpenError::NotFound(pid)),
        }

        let stat = Process::new(raw)
            .and_then(|p| p.stat())
            .map_err(|_| OpenError::NotFound(pid))?;
        if stat.state == 'Z' {
            return Err(OpenError::NotFound(pid));
        }

        Ok(LinuxProcessHandle {
            pid: Pid::from_raw(raw),
            start_time: stat.starttime,
        })
    }

    async fn request_close(&self, handle: &LinuxProcessHandle, windows: &[WindowRecord]) -> bool {
        if windows.is_empty() {
            if !Self::probe(handle) {
                return false;
            }
            return match kill(handle.pid, Signal::SIGTERM) {
                Ok(()) => true,
                Err(e) => {
                    debug!(pid = handle.pid(), error = %e, "SIGTERM failed");
                    false
                }
            };
        }

        let mut delivered = false;
        for window in windows {
            delivered |= Self::close_window(window).await;
        }
        delivered
    }

    async fn wait_exit(&self, handle: &LinuxProcessHandle, timeout: Duration) -> Result<WaitOutcome> {
        let exited = async {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            loop {
                interval.tick().await;
                if !Self::probe(handle) {
                    return;
                }
            }
        };

        match tokio::time::timeout(timeout, exited).await {
            Ok(()) => Ok(WaitOutcome::Exited),
            Err(_) => Ok(WaitOutcome::TimedOut),
        }
    }

    async fn is_alive(&self, handle: &LinuxProcessHandle) -> bool {
        Self::probe(handle)
    }

    async fn terminate(&self, handle: &LinuxProcessHandle) -> Result<()> {
        // Never signal a PID that has since been reused.
        if !Self::probe(handle) {
            return Ok(());
        }
        kill(handle.pid, Signal::SIGKILL)
            .map_err(|e| Error::CommandFailed(format!("kill -9 {}: {}", handle.pid, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_current_process() {
        let control = LinuxControl::new();
        let handle = control.open(std::process::id(), true).await.unwrap();
        assert_eq!(handle.pid(), std::process::id());
        assert!(control.is_alive(&handle).await);
    }

    #[tokio::test]
    async fn test_open_nonexistent_process() {
        let control = LinuxControl::new();
        let result = control.open(999_999_999, false).await;
        assert_eq!(result, Err(OpenError::NotFound(999_999_999)));
    }

    #[tokio::test]
    async fn test_wait_exit_times_out_for_live_process() {
        let control = LinuxControl::new();
        let handle = control.open(std::process::id(), true).await.unwrap();
        let outcome = control
            .wait_exit(&handle, Duration::from_millis(120))
            .await
            .unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_kill_spawned_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id().unwrap();

        let control = LinuxControl::new();
        let handle = control.open(pid, true).await.unwrap();
        control.terminate(&handle).await.unwrap();

        let outcome = control
            .wait_exit(&handle, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(outcome, WaitOutcome::Exited);
        let _ = child.wait().await;
    }
}
