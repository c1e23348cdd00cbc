//! Process and window snapshot models.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// PID of the idle placeholder process.
pub const IDLE_PID: u32 = 0;
/// PID of the kernel "System" placeholder process on Windows.
pub const SYSTEM_PID: u32 = 4;

const PLACEHOLDER_CAPTIONS: &[&str] = &["System Idle Process", "System"];

/// Returns true for the kernel placeholders that must never be offered as targets.
pub fn is_system_placeholder(pid: u32, caption: &str) -> bool {
    pid == IDLE_PID || pid == SYSTEM_PID || PLACEHOLDER_CAPTIONS.contains(&caption)
}

// ============================================================================
// ProcessRecord
// ============================================================================

/// One running process as seen by a single snapshot.
///
/// The PID is only meaningful for the lifetime of the snapshot that produced
/// the record; the OS reuses PIDs after a process exits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Process ID.
    pub pid: u32,
    /// Executable name used for kill-by-name matching (e.g. `notepad.exe`).
    pub name: String,
    /// Display name.
    pub caption: String,
    /// Full path of the executable image, when it could be queried.
    pub executable_path: Option<PathBuf>,
    /// Command line the process was started with, when it could be read.
    pub command_line: Option<String>,
}

impl ProcessRecord {
    /// Create a record with only a name; path and command line unknown.
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            pid,
            caption: name.clone(),
            name,
            executable_path: None,
            command_line: None,
        }
    }

    /// Set the display caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Set the executable path; empty paths are treated as unavailable.
    pub fn with_executable_path(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.executable_path = path.map(Into::into).filter(|p| !p.as_os_str().is_empty());
        self
    }

    /// Set the command line; blank command lines are treated as unavailable.
    pub fn with_command_line(mut self, command_line: Option<impl Into<String>>) -> Self {
        self.command_line = command_line
            .map(Into::into)
            .filter(|c: &String| !c.trim().is_empty());
        self
    }

    /// Whether this record is a kernel placeholder.
    pub fn is_system_placeholder(&self) -> bool {
        is_system_placeholder(self.pid, &self.caption)
    }
}

// ============================================================================
// Windows
// ============================================================================

/// Opaque native window identifier (`HWND` on Windows, X11 window id on Linux).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// A top-level, switchable window and the process that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub handle: WindowHandle,
    pub owner_pid: u32,
    pub title: String,
}

impl WindowRecord {
    pub fn new(handle: WindowHandle, owner_pid: u32, title: impl Into<String>) -> Self {
        Self {
            handle,
            owner_pid,
            title: title.into(),
        }
    }
}

/// Windows grouped by owning PID, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowIndex {
    by_pid: BTreeMap<u32, Vec<WindowRecord>>,
}

impl WindowIndex {
    /// Group a flat window list by owner PID.
    pub fn from_windows(windows: impl IntoIterator<Item = WindowRecord>) -> Self {
        let mut by_pid: BTreeMap<u32, Vec<WindowRecord>> = BTreeMap::new();
        for window in windows {
            by_pid.entry(window.owner_pid).or_default().push(window);
        }
        Self { by_pid }
    }

    /// All windows owned by `pid` (empty for background processes).
    pub fn windows_of(&self, pid: u32) -> &[WindowRecord] {
        self.by_pid.get(&pid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A process is foreground when it owns at least one switchable window.
    pub fn is_foreground(&self, pid: u32) -> bool {
        !self.windows_of(pid).is_empty()
    }

    /// Title of the first window owned by `pid`.
    pub fn title_of(&self, pid: u32) -> Option<&str> {
        self.windows_of(pid).first().map(|w| w.title.as_str())
    }

    /// Number of processes owning at least one window.
    pub fn len(&self) -> usize {
        self.by_pid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pid.is_empty()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Point-in-time view of running processes joined with their windows.
///
/// Built once per activation and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Snapshot {
    processes: Vec<ProcessRecord>,
    windows: WindowIndex,
}

impl Snapshot {
    /// Build a snapshot, dropping kernel placeholders and duplicate PIDs
    /// (the first record for a PID wins).
    pub fn new(processes: Vec<ProcessRecord>, windows: WindowIndex) -> Self {
        let mut seen = BTreeSet::new();
        let processes = processes
            .into_iter()
            .filter(|p| !p.is_system_placeholder())
            .filter(|p| !p.name.is_empty())
            .filter(|p| seen.insert(p.pid))
            .collect();

        Self {
            processes,
            windows,
        }
    }

    pub fn processes(&self) -> &[ProcessRecord] {
        &self.processes
    }

    pub fn windows(&self) -> &WindowIndex {
        &self.windows
    }

    /// Set of all PIDs in the snapshot.
    pub fn pids(&self) -> BTreeSet<u32> {
        self.processes.iter().map(|p| p.pid).collect()
    }

    /// Find the record for a PID.
    pub fn find(&self, pid: u32) -> Option<&ProcessRecord> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    /// PIDs of all processes whose name equals `name` exactly.
    pub fn pids_named(&self, name: &str) -> BTreeSet<u32> {
        self.processes
            .iter()
            .filter(|p| p.name == name)
            .map(|p| p.pid)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(handle: isize, pid: u32, title: &str) -> WindowRecord {
        WindowRecord::new(WindowHandle(handle), pid, title)
    }

    #[test]
    fn test_snapshot_drops_placeholders() {
        let snapshot = Snapshot::new(
            vec![
                ProcessRecord::new(0, "System Idle Process"),
                ProcessRecord::new(4, "System"),
                ProcessRecord::new(88, "Registry").with_caption("System"),
                ProcessRecord::new(1200, "explorer.exe"),
            ],
            WindowIndex::default(),
        );

        assert_eq!(snapshot.pids(), BTreeSet::from([1200]));
    }

    #[test]
    fn test_snapshot_deduplicates_pids() {
        let snapshot = Snapshot::new(
            vec![
                ProcessRecord::new(10, "first.exe"),
                ProcessRecord::new(10, "second.exe"),
                ProcessRecord::new(11, "other.exe"),
            ],
            WindowIndex::default(),
        );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.find(10).unwrap().name, "first.exe");
    }

    #[test]
    fn test_pids_named() {
        let snapshot = Snapshot::new(
            vec![
                ProcessRecord::new(10, "code.exe"),
                ProcessRecord::new(11, "code.exe"),
                ProcessRecord::new(12, "Code.exe"),
            ],
            WindowIndex::default(),
        );

        assert_eq!(snapshot.pids_named("code.exe"), BTreeSet::from([10, 11]));
        assert!(snapshot.pids_named("missing.exe").is_empty());
    }

    #[test]
    fn test_window_index_multiple_windows() {
        let index = WindowIndex::from_windows(vec![
            window(1, 100, "Main"),
            window(2, 100, "Settings"),
            window(3, 200, "Other"),
        ]);

        assert_eq!(index.windows_of(100).len(), 2);
        assert_eq!(index.title_of(100), Some("Main"));
        assert!(index.is_foreground(200));
        assert!(!index.is_foreground(300));
        assert!(index.windows_of(300).is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_record_builders_drop_blank_values() {
        let record = ProcessRecord::new(1, "app")
            .with_executable_path(Some(""))
            .with_command_line(Some("   "));
        assert!(record.executable_path.is_none());
        assert!(record.command_line.is_none());
    }
}
