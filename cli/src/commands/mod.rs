//! Non-interactive subcommands.

pub mod actions;
pub mod config;
pub mod kill;
pub mod list;
pub mod search;

use anyhow::Result;
use taskreaper_core::{
    CatalogEntry, ConfigStore, ExecutionReport, PlatformController, RestartOutcome, Settings,
};

/// Settings from the config file.
pub async fn load_settings() -> Result<Settings> {
    Ok(ConfigStore::new()?.load().await?)
}

/// A controller for the current platform.
pub fn controller(settings: Settings) -> PlatformController {
    PlatformController::platform(settings)
}

/// Print catalog entries as a table.
pub fn print_entries(entries: &[CatalogEntry]) {
    println!(
        "{:<8} {:<24} {:<11} {:<4} DESCRIPTION",
        "PID", "NAME", "STATE", "RST"
    );
    println!("{}", "-".repeat(90));

    for entry in entries {
        let state = if entry.foreground {
            "foreground"
        } else {
            "background"
        };
        let restartable = if entry.is_restartable() { "yes" } else { "-" };

        println!(
            "{:<8} {:<24} {:<11} {:<4} {}",
            entry.pid(),
            truncate(&entry.target.name, 24),
            state,
            restartable,
            truncate(&entry.short_description, 60)
        );
    }
}

/// Human-readable lines for an execution report.
pub fn report_lines(report: &ExecutionReport) -> Vec<String> {
    let mut lines = Vec::new();
    if report.kills.is_empty() {
        lines.push(format!("No process matched {}", report.target));
    }
    for (pid, outcome) in report.kills.iter() {
        lines.push(format!("PID {}: {}", pid, outcome));
    }

    match &report.restart {
        RestartOutcome::NotRequested => {}
        RestartOutcome::Skipped { skip } => lines.push(format!("Restart skipped: {}", skip)),
        RestartOutcome::Launched { argv } => {
            lines.push(format!("Restarted: {}", argv.join(" ")))
        }
        RestartOutcome::Failed { argv, reason } => {
            lines.push(format!("Restart of {} failed: {}", argv.join(" "), reason))
        }
    }
    lines
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
