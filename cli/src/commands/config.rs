//! Config command - show or change settings.

use anyhow::Result;
use taskreaper_core::{ActionKind, ConfigStore};

pub async fn run(set_default: Option<&str>, hide_background: Option<bool>, json: bool) -> Result<()> {
    let store = ConfigStore::new()?;

    let mut settings = store.load().await?;
    if let Some(id) = set_default {
        let action: ActionKind = id.parse()?;
        settings = store.set_default_action(action).await?;
    }
    if let Some(hide) = hide_background {
        settings = store.set_hide_background(hide).await?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    println!("Config file:        {}", store.path().display());
    println!("Default action:     {} ({})", settings.default_action, settings.default_action.label());
    println!("Hide background:    {}", settings.hide_background);
    println!("Item label:         {}", settings.item_label);
    println!("Graceful close:     {}", settings.graceful_close);
    println!("Graceful timeout:   {} ms", settings.graceful_timeout_ms);
    println!("Restart wait:       {} ms", settings.restart_wait_timeout_ms);
    Ok(())
}
