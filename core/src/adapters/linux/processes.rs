//! Process enumeration from `/proc`.

use procfs::process::{all_processes, Process};
use tracing::debug;

use crate::domain::{CommandLineSyntax, ProcessRecord};
use crate::error::{Error, Result};
use crate::ports::ProcessSourcePort;

/// PID of `kthreadd`, parent of every kernel thread.
const KTHREADD_PID: i32 = 2;

/// Reads processes from procfs.
#[derive(Debug, Default)]
pub struct LinuxProcesses;

impl LinuxProcesses {
    pub fn new() -> Self {
        Self
    }

    fn capture_blocking() -> Result<Vec<ProcessRecord>> {
        let processes =
            all_processes().map_err(|e| Error::Enumeration(format!("/proc: {}", e)))?;

        let mut records = Vec::new();
        let mut unreadable = 0usize;
        for process in processes {
            let Ok(process) = process else {
                unreadable += 1;
                continue;
            };
            match read_record(&process) {
                Some(record) => records.push(record),
                None => unreadable += 1,
            }
        }

        debug!(count = records.len(), skipped = unreadable, "Read /proc");
        Ok(records)
    }
}

/// Build a record; `None` for kernel threads and processes that vanished.
fn read_record(process: &Process) -> Option<ProcessRecord> {
    let stat = process.stat().ok()?;
    if stat.pid == KTHREADD_PID || stat.ppid == KTHREADD_PID {
        return None;
    }
    let pid = u32::try_from(stat.pid).ok()?;

    // Permission errors are expected for other users' processes.
    let executable_path = process.exe().ok();
    let command_line = process
        .cmdline()
        .ok()
        .filter(|args| !args.is_empty())
        .map(|args| CommandLineSyntax::Posix.join(&args));

    Some(
        ProcessRecord::new(pid, stat.comm)
            .with_executable_path(executable_path)
            .with_command_line(command_line),
    )
}

impl ProcessSourcePort for LinuxProcesses {
    async fn capture(&self) -> Result<Vec<ProcessRecord>> {
        tokio::task::spawn_blocking(Self::capture_blocking)
            .await
            .map_err(|e| Error::Enumeration(format!("process capture task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_includes_current_process() {
        let records = LinuxProcesses::new().capture().await.unwrap();
        let me = records
            .iter()
            .find(|r| r.pid == std::process::id())
            .expect("current process listed");

        assert!(!me.name.is_empty());
        assert!(me.command_line.is_some());
        assert!(me.executable_path.is_some());
    }

    #[tokio::test]
    async fn test_captured_command_line_splits_back_to_argv() {
        let records = LinuxProcesses::new().capture().await.unwrap();
        let me = records
            .iter()
            .find(|r| r.pid == std::process::id())
            .expect("current process listed");

        let argv: Vec<String> = std::env::args().collect();
        let line = me.command_line.as_deref().unwrap();
        assert_eq!(CommandLineSyntax::Posix.split(line).unwrap(), argv);
    }

    #[tokio::test]
    async fn test_capture_skips_kernel_threads() {
        let records = LinuxProcesses::new().capture().await.unwrap();
        assert!(records.iter().all(|r| r.pid != 2));
    }
}
