//! Win32 process control.

use std::ffi::c_void;
use std::time::Duration;

use tracing::debug;
use windows::Win32::Foundation::{
    ERROR_ACCESS_DENIED, HANDLE, LPARAM, STILL_ACTIVE, WAIT_OBJECT_0, WAIT_TIMEOUT, WPARAM,
};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, TerminateProcess, WaitForSingleObject,
    PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_SYNCHRONIZE, PROCESS_TERMINATE,
};
use windows::Win32::UI::WindowsAndMessaging::{PostMessageW, WM_CLOSE};

use super::handle::OwnedHandle;
use super::switcher::hwnd;
use crate::domain::WindowRecord;
use crate::error::{Error, OpenError, Result};
use crate::ports::{ProcessControlPort, WaitOutcome};

/// Largest finite wait accepted by `WaitForSingleObject`.
const MAX_WAIT_MS: u32 = u32::MAX - 1;

/// An open process handle with termination rights.
#[derive(Debug)]
pub struct Win32ProcessHandle {
    pid: u32,
    handle: OwnedHandle,
}

impl Win32ProcessHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

/// Process control through `OpenProcess` / `TerminateProcess`.
#[derive(Debug, Default)]
pub struct Win32Control;

impl Win32Control {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessControlPort for Win32Control {
    type Handle = Win32ProcessHandle;

    async fn open(
        &self,
        pid: u32,
        synchronize: bool,
    ) -> std::result::Result<Win32ProcessHandle, OpenError> {
        let mut access = PROCESS_TERMINATE | PROCESS_QUERY_LIMITED_INFORMATION;
        if synchronize {
            access |= PROCESS_SYNCHRONIZE;
        }

        // SAFETY: a successful OpenProcess hands ownership of the handle to us.
        match unsafe { OpenProcess(access, false, pid) } {
            Ok(handle) => Ok(Win32ProcessHandle {
                pid,
                handle: OwnedHandle::new(handle),
            }),
            Err(e) if e.code() == ERROR_ACCESS_DENIED.to_hresult() => {
                Err(OpenError::AccessDenied(pid))
            }
            Err(e) => {
                debug!(pid = pid, error = %e, "OpenProcess failed");
                Err(OpenError::NotFound(pid))
            }
        }
    }

    async fn request_close(&self, handle: &Win32ProcessHandle, windows: &[WindowRecord]) -> bool {
        let mut delivered = false;
        for window in windows {
            // SAFETY: posting to a stale window handle fails harmlessly.
            let posted =
                unsafe { PostMessageW(hwnd(window.handle), WM_CLOSE, WPARAM(0), LPARAM(0)) };
            match posted {
                Ok(()) => delivered = true,
                Err(e) => {
                    debug!(pid = handle.pid, window = %window.handle, error = %e, "WM_CLOSE not posted")
                }
            }
        }
        delivered
    }

    async fn wait_exit(&self, handle: &Win32ProcessHandle, timeout: Duration) -> Result<WaitOutcome> {
        let raw = handle.handle.as_isize();
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(MAX_WAIT_MS).min(MAX_WAIT_MS);

        // The handle is borrowed for the whole wait, so it stays open.
        let event = tokio::task::spawn_blocking(move || unsafe {
            WaitForSingleObject(HANDLE(raw as *mut c_void), millis)
        })
        .await
        .map_err(|e| Error::CommandFailed(format!("wait task failed: {}", e)))?;

        if event == WAIT_OBJECT_0 {
            Ok(WaitOutcome::Exited)
        } else if event == WAIT_TIMEOUT {
            Ok(WaitOutcome::TimedOut)
        } else {
            Err(Error::CommandFailed(format!(
                "WaitForSingleObject({}) returned {:#x}",
                handle.pid, event.0
            )))
        }
    }

    async fn is_alive(&self, handle: &Win32ProcessHandle) -> bool {
        let mut code = 0u32;
        // SAFETY: the handle is open for the lifetime of `handle`.
        let queried = unsafe { GetExitCodeProcess(handle.handle.raw(), &mut code) };
        queried.is_ok() && code == STILL_ACTIVE.0 as u32
    }

    async fn terminate(&self, handle: &Win32ProcessHandle) -> Result<()> {
        // SAFETY: the handle is open for the lifetime of `handle`.
        unsafe { TerminateProcess(handle.handle.raw(), 1) }
            .map_err(|e| Error::CommandFailed(format!("TerminateProcess({}): {}", handle.pid, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_nonexistent_process() {
        let result = Win32Control::new().open(999_999_999, false).await;
        assert!(matches!(result, Err(OpenError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_kill_spawned_child() {
        let mut child = tokio::process::Command::new("ping")
            .args(["-n", "30", "127.0.0.1"])
            .stdout(std::process::Stdio::null())
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();

        let control = Win32Control::new();
        let handle = control.open(pid, true).await.unwrap();
        assert!(control.is_alive(&handle).await);

        control.terminate(&handle).await.unwrap();
        let outcome = control
            .wait_exit(&handle, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(outcome, WaitOutcome::Exited);
        assert!(!control.is_alive(&handle).await);
        let _ = child.wait().await;
    }
}
