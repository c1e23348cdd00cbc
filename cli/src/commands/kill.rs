//! Kill command - run an action on one catalog entry.

use anyhow::{bail, Result};
use taskreaper_core::{ActionKind, CatalogEntry, Target};

use super::{controller, load_settings, report_lines};

/// Run the action; returns whether every targeted process was handled.
pub async fn run(target: &str, action: Option<&str>, json: bool) -> Result<bool> {
    let action = action.map(str::parse::<ActionKind>).transpose()?;

    let mut settings = load_settings().await?;
    // Any process may be targeted, windowed or not.
    settings.hide_background = false;
    let controller = controller(settings);

    let catalog = controller.on_activate().await;
    let Some(entry) = find_entry(&catalog, target) else {
        bail!("No running process matches '{}'", target);
    };

    let report = controller.on_execute(entry, action).await;
    controller.on_deactivate().await;
    let report = report?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} {}", report.action.label(), report.target);
        for line in report_lines(&report) {
            println!("  {}", line);
        }
    }
    Ok(report.is_success())
}

/// Find the entry named by `target`: `name|pid`, a bare PID, or a name
/// (first match, case-insensitive).
fn find_entry<'a>(catalog: &'a [CatalogEntry], target: &str) -> Option<&'a CatalogEntry> {
    if let Ok(target) = target.parse::<Target>() {
        return catalog.iter().find(|e| e.target == target);
    }
    if let Ok(pid) = target.parse::<u32>() {
        return catalog.iter().find(|e| e.pid() == pid);
    }
    catalog
        .iter()
        .find(|e| e.target.name.eq_ignore_ascii_case(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taskreaper_core::domain::{IconRef, ProcessRecord};

    fn catalog() -> Vec<CatalogEntry> {
        [(10, "Code"), (11, "code"), (20, "bash")]
            .into_iter()
            .map(|(pid, name)| {
                CatalogEntry::from_record(
                    &ProcessRecord::new(pid, name),
                    None,
                    false,
                    Arc::new(IconRef::Default),
                )
            })
            .collect()
    }

    #[test]
    fn test_find_entry_forms() {
        let catalog = catalog();
        assert_eq!(find_entry(&catalog, "code|11").map(|e| e.pid()), Some(11));
        assert_eq!(find_entry(&catalog, "20").map(|e| e.pid()), Some(20));
        assert_eq!(find_entry(&catalog, "code").map(|e| e.pid()), Some(10));
        assert!(find_entry(&catalog, "bash|99").is_none());
        assert!(find_entry(&catalog, "zsh").is_none());
    }
}
