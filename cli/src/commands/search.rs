//! Search command - fuzzy-rank the catalog.

use anyhow::Result;

use super::{controller, load_settings, print_entries};

pub async fn run(query: &str, json: bool) -> Result<()> {
    let controller = controller(load_settings().await?);
    let entries = controller.on_suggest(query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No processes match '{}'.", query);
    } else {
        print_entries(&entries);
    }
    Ok(())
}
