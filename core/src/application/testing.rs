//! Mock port implementations shared by the application and controller tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use parking_lot::Mutex;

use crate::domain::{ProcessRecord, WindowRecord};
use crate::error::{Error, OpenError, Result};
use crate::ports::{
    ElevatedKill, LauncherPort, ProcessControlPort, ProcessSourcePort, WaitOutcome,
    WindowSourcePort,
};

/// Mock process source.
pub struct MockProcesses {
    processes: Option<Vec<ProcessRecord>>,
}

impl MockProcesses {
    pub fn new(processes: Vec<ProcessRecord>) -> Self {
        Self {
            processes: Some(processes),
        }
    }

    pub fn failing() -> Self {
        Self { processes: None }
    }
}

impl ProcessSourcePort for MockProcesses {
    async fn capture(&self) -> Result<Vec<ProcessRecord>> {
        self.processes
            .clone()
            .ok_or_else(|| Error::Enumeration("snapshot unavailable".to_string()))
    }
}

/// Mock window source.
pub struct MockWindows {
    windows: Option<Vec<WindowRecord>>,
}

impl MockWindows {
    pub fn new(windows: Vec<WindowRecord>) -> Self {
        Self {
            windows: Some(windows),
        }
    }

    pub fn failing() -> Self {
        Self { windows: None }
    }
}

impl WindowSourcePort for MockWindows {
    async fn capture(&self) -> Result<Vec<WindowRecord>> {
        self.windows
            .clone()
            .ok_or_else(|| Error::Enumeration("window list unavailable".to_string()))
    }
}

/// How a mocked PID reacts to the termination primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Ignores close requests, dies on terminate.
    Stubborn,
    /// Exits as soon as a close request arrives.
    Cooperative,
    /// Cannot be opened.
    Protected,
    /// Terminate succeeds but the process never signals exit.
    Hung,
    /// Terminate fails and the process stays alive.
    Unkillable,
    /// Honours a close request, but only after the wait has given up.
    SlowToClose,
    /// Exits on its own just as terminate is attempted, which then fails.
    ExitsDuringTerminate,
}

/// Mock process control recording every call.
pub struct MockControl {
    behaviors: HashMap<u32, Behavior>,
    alive: Mutex<HashSet<u32>>,
    calls: Mutex<Vec<(u32, &'static str)>>,
}

impl MockControl {
    pub fn new(behaviors: impl IntoIterator<Item = (u32, Behavior)>) -> Self {
        let behaviors: HashMap<u32, Behavior> = behaviors.into_iter().collect();
        let alive = behaviors.keys().copied().collect();
        Self {
            behaviors,
            alive: Mutex::new(alive),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, pid: u32, call: &'static str) {
        self.calls.lock().push((pid, call));
    }

    /// Calls made for `pid`, in order.
    pub fn calls_for(&self, pid: u32) -> Vec<&'static str> {
        self.calls
            .lock()
            .iter()
            .filter(|(p, _)| *p == pid)
            .map(|(_, c)| *c)
            .collect()
    }
}

impl ProcessControlPort for MockControl {
    type Handle = u32;

    async fn open(&self, pid: u32, _synchronize: bool) -> std::result::Result<u32, OpenError> {
        self.record(pid, "open");
        match self.behaviors.get(&pid) {
            None => Err(OpenError::NotFound(pid)),
            Some(Behavior::Protected) => Err(OpenError::AccessDenied(pid)),
            Some(_) => Ok(pid),
        }
    }

    async fn request_close(&self, handle: &u32, windows: &[WindowRecord]) -> bool {
        self.record(*handle, "request_close");
        if windows.is_empty() {
            return false;
        }
        if self.behaviors.get(handle) == Some(&Behavior::Cooperative) {
            self.alive.lock().remove(handle);
        }
        true
    }

    async fn wait_exit(&self, handle: &u32, timeout: Duration) -> Result<WaitOutcome> {
        self.record(*handle, "wait_exit");
        if !self.alive.lock().contains(handle) {
            return Ok(WaitOutcome::Exited);
        }
        tokio::time::sleep(timeout).await;
        if self.behaviors.get(handle) == Some(&Behavior::SlowToClose) {
            self.alive.lock().remove(handle);
        }
        Ok(WaitOutcome::TimedOut)
    }

    async fn is_alive(&self, handle: &u32) -> bool {
        self.alive.lock().contains(handle)
    }

    async fn terminate(&self, handle: &u32) -> Result<()> {
        self.record(*handle, "terminate");
        match self.behaviors.get(handle) {
            Some(Behavior::Unkillable) => Err(Error::CommandFailed(format!(
                "TerminateProcess({}) failed",
                handle
            ))),
            Some(Behavior::Hung) => Ok(()),
            Some(Behavior::ExitsDuringTerminate) => {
                self.alive.lock().remove(handle);
                Err(Error::CommandFailed(format!(
                    "TerminateProcess({}) failed",
                    handle
                )))
            }
            _ => {
                self.alive.lock().remove(handle);
                Ok(())
            }
        }
    }
}

/// Mock launcher recording launches.
#[derive(Default)]
pub struct MockLauncher {
    fail: bool,
    launches: Mutex<Vec<Vec<String>>>,
    elevated: Mutex<Vec<ElevatedKill>>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn launches(&self) -> Vec<Vec<String>> {
        self.launches.lock().clone()
    }

    pub fn elevated(&self) -> Vec<ElevatedKill> {
        self.elevated.lock().clone()
    }
}

impl LauncherPort for MockLauncher {
    async fn launch(&self, program: &str, args: &[String]) -> Result<()> {
        if self.fail {
            return Err(Error::Launch(format!("cannot start {}", program)));
        }
        let mut argv = vec![program.to_string()];
        argv.extend(args.iter().cloned());
        self.launches.lock().push(argv);
        Ok(())
    }

    async fn launch_elevated(&self, request: &ElevatedKill) -> Result<()> {
        if self.fail {
            return Err(Error::Launch("elevation refused".to_string()));
        }
        self.elevated.lock().push(request.clone());
        Ok(())
    }
}
