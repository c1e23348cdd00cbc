//! Actions command - list the action vocabulary.

use anyhow::Result;
use serde::Serialize;
use taskreaper_core::ActionKind;

use super::load_settings;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionInfo {
    id: &'static str,
    label: &'static str,
    description: &'static str,
    elevated: bool,
    is_default: bool,
}

pub async fn run(json: bool) -> Result<()> {
    let default = load_settings().await?.default_action;

    let actions: Vec<ActionInfo> = ActionKind::ALL
        .into_iter()
        .map(|a| ActionInfo {
            id: a.id(),
            label: a.label(),
            description: a.description(),
            elevated: a.is_elevated(),
            is_default: a == default,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&actions)?);
        return Ok(());
    }

    for action in &actions {
        let marker = if action.is_default { "*" } else { " " };
        println!("{} {:<24} {}", marker, action.id, action.label);
    }
    println!("\n* default action");
    Ok(())
}
