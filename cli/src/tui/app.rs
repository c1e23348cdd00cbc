//! TUI state.

use taskreaper_core::{ActionKind, CatalogEntry, PlatformController};

use crate::commands::report_lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Searching,
}

pub struct App {
    controller: PlatformController,
    entries: Vec<CatalogEntry>,
    pub selected: usize,
    pub search_query: String,
    mode: Mode,
    /// Index into the actions offered for the selected entry.
    action_index: usize,
    status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub async fn new(controller: PlatformController) -> Self {
        let entries = controller.on_activate().await;
        Self {
            controller,
            entries,
            selected: 0,
            search_query: String::new(),
            mode: Mode::Normal,
            action_index: 0,
            status: None,
            should_quit: false,
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn selected_entry(&self) -> Option<&CatalogEntry> {
        self.entries.get(self.selected)
    }

    pub fn item_label(&self) -> String {
        self.controller.item_label()
    }

    /// Action `x` would run for the selected entry.
    pub fn selected_action(&self) -> Option<ActionKind> {
        let entry = self.selected_entry()?;
        let actions = self.controller.actions_for(entry);
        actions.get(self.action_index % actions.len().max(1)).copied()
    }

    pub fn default_action(&self) -> ActionKind {
        self.controller.default_action()
    }

    /// Whether `Enter` can run the default action on the selected entry.
    pub fn default_applies(&self) -> bool {
        self.selected_entry()
            .map_or(false, |entry| self.default_action().is_available_for(entry.category))
    }

    pub fn get_status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.mode == Mode::Searching
    }

    // Navigation

    pub fn next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
            self.action_index = 0;
        }
    }

    pub fn previous(&mut self) {
        if !self.entries.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.entries.len() - 1);
            self.action_index = 0;
        }
    }

    pub fn cycle_action(&mut self) {
        self.action_index = self.action_index.wrapping_add(1);
        if let Some(action) = self.selected_action() {
            self.status = Some(format!("Action: {}", action.label()));
        }
    }

    // Search

    pub fn start_search(&mut self) {
        self.mode = Mode::Searching;
    }

    pub fn finish_search(&mut self) {
        self.mode = Mode::Normal;
    }

    pub async fn cancel_search(&mut self) {
        self.mode = Mode::Normal;
        self.search_query.clear();
        self.update_filter().await;
    }

    pub async fn push_char(&mut self, c: char) {
        self.search_query.push(c);
        self.update_filter().await;
    }

    pub async fn pop_char(&mut self) {
        self.search_query.pop();
        self.update_filter().await;
    }

    async fn update_filter(&mut self) {
        self.entries = self.controller.on_suggest(&self.search_query).await;
        self.selected = 0;
        self.action_index = 0;
    }

    // Actions

    pub async fn execute_default(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        if let Some(hint) = unavailable_hint(self.default_action(), entry) {
            self.status = Some(hint);
            return;
        }
        self.execute(None).await;
    }

    pub async fn execute_selected_action(&mut self) {
        let action = self.selected_action();
        self.execute(action).await;
    }

    async fn execute(&mut self, action: Option<ActionKind>) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };

        self.status = Some(match self.controller.on_execute(&entry, action).await {
            Ok(report) => report_lines(&report).join("; "),
            Err(e) => format!("Error: {}", e),
        });
        self.refresh_keep_status().await;
    }

    /// Drop the activation and capture a fresh snapshot.
    pub async fn refresh(&mut self) {
        self.refresh_keep_status().await;
        self.status = Some(format!("{} processes", self.entries.len()));
    }

    async fn refresh_keep_status(&mut self) {
        self.controller.on_deactivate().await;
        self.entries = self.controller.on_suggest(&self.search_query).await;
        if self.selected >= self.entries.len() {
            self.selected = self.entries.len().saturating_sub(1);
        }
        self.action_index = 0;
    }

    pub async fn shutdown(&self) {
        self.controller.on_deactivate().await;
    }
}

/// Status line for a default action that does not apply to `entry`.
fn unavailable_hint(action: ActionKind, entry: &CatalogEntry) -> Option<String> {
    if action.is_available_for(entry.category) {
        return None;
    }
    let offered: Vec<&str> = ActionKind::available_for(entry.category)
        .into_iter()
        .map(|a| a.label())
        .collect();
    Some(format!(
        "{} is not available for {}; press a to pick: {}",
        action.label(),
        entry.label,
        offered.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taskreaper_core::domain::{IconRef, ProcessRecord};

    fn entry(command_line: Option<&str>) -> CatalogEntry {
        CatalogEntry::from_record(
            &ProcessRecord::new(30, "daemon").with_command_line(command_line),
            None,
            false,
            Arc::new(IconRef::Default),
        )
    }

    #[test]
    fn test_restart_default_on_plain_entry_lists_offered_actions() {
        let hint = unavailable_hint(ActionKind::KillByIdAndRestart, &entry(None))
            .expect("restart is not offered without a command line");

        assert!(hint.starts_with(ActionKind::KillByIdAndRestart.label()));
        let (_, offered) = hint.split_once("pick: ").unwrap();
        assert_eq!(
            offered,
            "Kill by Name, Kill by PID, Kill by Name (as Admin), Kill by PID (as Admin)"
        );
    }

    #[test]
    fn test_applicable_default_has_no_hint() {
        assert!(unavailable_hint(ActionKind::KillById, &entry(None)).is_none());
        assert!(
            unavailable_hint(ActionKind::KillByIdAndRestart, &entry(Some("/usr/sbin/daemon -f")))
                .is_none()
        );
    }
}
