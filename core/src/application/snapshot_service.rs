//! Snapshot capture application service.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::{Snapshot, WindowIndex};
use crate::ports::{ProcessSourcePort, WindowSourcePort};

/// Captures processes and windows and joins them into a [`Snapshot`].
///
/// Enumeration failures never propagate: a failed process listing yields an
/// empty snapshot and a failed window listing marks every process as
/// background, each with a logged warning.
pub struct SnapshotService<P: ProcessSourcePort, W: WindowSourcePort> {
    processes: P,
    windows: W,
}

impl<P: ProcessSourcePort, W: WindowSourcePort> SnapshotService<P, W> {
    /// Create a new snapshot service with the given sources.
    pub fn new(processes: P, windows: W) -> Self {
        Self { processes, windows }
    }

    /// Capture a fresh snapshot.
    pub async fn capture(&self) -> Snapshot {
        let start = Instant::now();

        let (processes, windows) = tokio::join!(self.processes.capture(), self.windows.capture());

        let processes = processes.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to enumerate processes");
            Vec::new()
        });
        let windows = windows.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list windows, treating all processes as background");
            Vec::new()
        });

        let index = WindowIndex::from_windows(windows);
        debug!(foreground = index.len(), "Window index built");

        let snapshot = Snapshot::new(processes, index);
        info!(
            "Found {} running processes in {:.1} seconds",
            snapshot.len(),
            start.elapsed().as_secs_f64()
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{MockProcesses, MockWindows};
    use crate::domain::{ProcessRecord, WindowHandle, WindowRecord};

    fn processes() -> Vec<ProcessRecord> {
        vec![
            ProcessRecord::new(0, "System Idle Process"),
            ProcessRecord::new(4, "System"),
            ProcessRecord::new(1000, "explorer.exe"),
            ProcessRecord::new(2000, "code.exe"),
            ProcessRecord::new(2001, "code.exe"),
        ]
    }

    #[tokio::test]
    async fn test_capture_joins_windows() {
        let service = SnapshotService::new(
            MockProcesses::new(processes()),
            MockWindows::new(vec![WindowRecord::new(WindowHandle(7), 2000, "main.rs")]),
        );

        let snapshot = service.capture().await;
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.windows().is_foreground(2000));
        assert!(!snapshot.windows().is_foreground(2001));
    }

    #[tokio::test]
    async fn test_capture_never_contains_placeholders() {
        let service = SnapshotService::new(
            MockProcesses::new(processes()),
            MockWindows::new(Vec::new()),
        );

        let snapshot = service.capture().await;
        assert!(snapshot.find(0).is_none());
        assert!(snapshot.find(4).is_none());
    }

    #[tokio::test]
    async fn test_capture_is_idempotent() {
        let service = SnapshotService::new(
            MockProcesses::new(processes()),
            MockWindows::new(Vec::new()),
        );

        let first = service.capture().await;
        let second = service.capture().await;
        assert_eq!(first.pids(), second.pids());
    }

    #[tokio::test]
    async fn test_process_enumeration_failure_yields_empty() {
        let service = SnapshotService::new(MockProcesses::failing(), MockWindows::new(Vec::new()));
        assert!(service.capture().await.is_empty());
    }

    #[tokio::test]
    async fn test_window_enumeration_failure_is_not_fatal() {
        let service = SnapshotService::new(MockProcesses::new(processes()), MockWindows::failing());

        let snapshot = service.capture().await;
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.windows().is_empty());
    }
}
