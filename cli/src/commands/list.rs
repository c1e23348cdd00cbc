//! List command - show the process catalog.

use anyhow::Result;

use super::{controller, load_settings, print_entries};

pub async fn run(name_filter: Option<String>, hide_background: Option<bool>, json: bool) -> Result<()> {
    let mut settings = load_settings().await?;
    if let Some(hide) = hide_background {
        settings.hide_background = hide;
    }

    let controller = controller(settings);
    let mut entries = controller.on_activate().await;

    if let Some(ref name) = name_filter {
        let name_lower = name.to_lowercase();
        entries.retain(|e| e.target.name.to_lowercase().contains(&name_lower));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No processes found.");
        return Ok(());
    }

    print_entries(&entries);
    println!("\nTotal: {} processes", entries.len());
    Ok(())
}
