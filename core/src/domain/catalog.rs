//! Display-facing catalog entries built from a snapshot.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

use super::{ProcessRecord, Snapshot};
use crate::error::{Error, Result};

const ADMIN_ONLY_HINT: &str = "Probably only killable as admin or not at all";

// ============================================================================
// Target
// ============================================================================

/// The selected process: name and PID travel together so that kill-by-name
/// and kill-by-id can both be served from one selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub pid: u32,
}

impl Target {
    pub fn new(name: impl Into<String>, pid: u32) -> Self {
        Self {
            name: name.into(),
            pid,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.name, self.pid)
    }
}

impl FromStr for Target {
    type Err = Error;

    /// Parse the `name|pid` form. The PID follows the last `|`.
    fn from_str(s: &str) -> Result<Self> {
        let (name, pid) = s
            .rsplit_once('|')
            .ok_or_else(|| Error::ParseError(format!("target '{}' is not name|pid", s)))?;
        let pid = pid
            .trim()
            .parse()
            .map_err(|e| Error::ParseError(format!("target '{}' has invalid pid: {}", s, e)))?;
        if name.is_empty() {
            return Err(Error::ParseError(format!("target '{}' has an empty name", s)));
        }
        Ok(Target::new(name, pid))
    }
}

// ============================================================================
// Catalog entry
// ============================================================================

/// Whether an entry can be restarted after being killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    #[default]
    Normal,
    /// The command line was captured, so the process can be relaunched.
    Restartable,
}

/// Icon reference for an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum IconRef {
    /// Icon resource `index` inside an executable.
    Executable { path: PathBuf, index: u32 },
    /// The application's own icon.
    Default,
}

impl IconRef {
    /// Resource string in the `@path,index` form used by Windows shells.
    pub fn resource(&self) -> Option<String> {
        match self {
            IconRef::Executable { path, index } => Some(format!("@{},{}", path.display(), index)),
            IconRef::Default => None,
        }
    }
}

/// Process data captured at catalog time, needed later for restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedData {
    pub command_line: Option<String>,
    pub executable_path: Option<PathBuf>,
}

/// One selectable row of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub label: String,
    pub short_description: String,
    pub target: Target,
    pub category: Category,
    pub icon: Arc<IconRef>,
    pub captured: CapturedData,
    pub foreground: bool,
}

impl CatalogEntry {
    /// Build the entry for one process.
    pub fn from_record(
        record: &ProcessRecord,
        window_title: Option<&str>,
        hide_background: bool,
        icon: Arc<IconRef>,
    ) -> Self {
        let foreground = window_title.is_some();
        let title = window_title.unwrap_or_default();

        let label = match (hide_background, foreground) {
            (true, _) => format!("{}: \"{}\"", record.caption, title),
            (false, true) => format!("{}: \"{}\" (foreground)", record.caption, title),
            (false, false) => format!("{} (background)", record.caption),
        };

        let (short_description, category) = match (&record.command_line, &record.executable_path) {
            (Some(cmd), _) => (format!("(pid: {:>5}) {}", record.pid, cmd), Category::Restartable),
            (None, Some(path)) => (
                format!("(pid: {:>5}) {}", record.pid, path.display()),
                Category::Normal,
            ),
            (None, None) => (
                format!("(pid: {:>5}) {} ({})", record.pid, record.name, ADMIN_ONLY_HINT),
                Category::Normal,
            ),
        };

        Self {
            label,
            short_description,
            target: Target::new(record.name.clone(), record.pid),
            category,
            icon,
            captured: CapturedData {
                command_line: record.command_line.clone(),
                executable_path: record.executable_path.clone(),
            },
            foreground,
        }
    }

    pub fn pid(&self) -> u32 {
        self.target.pid
    }

    pub fn is_restartable(&self) -> bool {
        self.category == Category::Restartable
    }
}

/// Build the catalog for a snapshot.
///
/// With `hide_background` set, processes owning no switchable window are
/// left out entirely.
pub fn build_catalog(
    snapshot: &Snapshot,
    hide_background: bool,
    mut icon_for: impl FnMut(Option<&Path>) -> Arc<IconRef>,
) -> Vec<CatalogEntry> {
    let windows = snapshot.windows();

    snapshot
        .processes()
        .iter()
        .filter(|p| !hide_background || windows.is_foreground(p.pid))
        .map(|p| {
            let icon = icon_for(p.executable_path.as_deref());
            CatalogEntry::from_record(p, windows.title_of(p.pid), hide_background, icon)
        })
        .collect()
}

/// Rank entries against a query, best match first.
///
/// Entries are scored by fuzzy matching the label and the short description;
/// the better of the two counts. An empty query keeps catalog order.
pub fn suggest(entries: &[CatalogEntry], query: &str) -> Vec<CatalogEntry> {
    let query = query.trim();
    if query.is_empty() {
        return entries.to_vec();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let mut scored: Vec<(i64, &CatalogEntry)> = entries
        .iter()
        .filter_map(|entry| {
            let label = matcher.fuzzy_match(&entry.label, query);
            let desc = matcher.fuzzy_match(&entry.short_description, query);
            label.max(desc).map(|score| (score, entry))
        })
        .collect();

    scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| a.label.cmp(&b.label)));
    scored.into_iter().map(|(_, e)| e.clone()).collect()
}
