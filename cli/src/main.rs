//! TaskReaper CLI - Pick running processes and kill or restart them
//!
//! Lists processes with their windows, ranks them against a search,
//! and runs kill actions (by name, by PID, elevated, or kill-and-restart).

mod commands;
mod tui;

use clap::{Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "taskreaper")]
#[command(author, version, about = "Pick running processes and kill or restart them")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Disable interactive TUI mode
    #[arg(long, global = true)]
    no_tui: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List running processes
    #[command(alias = "ls")]
    List {
        /// Filter by process name (substring)
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Only processes owning a window
        #[arg(long, conflicts_with = "show_background")]
        hide_background: bool,

        /// Include background processes even if configured to hide them
        #[arg(long)]
        show_background: bool,
    },

    /// Rank processes against a fuzzy query
    #[command(alias = "s")]
    Search { query: String },

    /// Kill a process
    Kill {
        /// `name|pid`, a PID, or a process name
        target: String,

        /// Action identifier (see `taskreaper actions`); defaults to the configured one
        #[arg(short, long)]
        action: Option<String>,
    },

    /// List the available actions
    Actions,

    /// Show or change the configuration
    Config {
        /// Set the default action
        #[arg(long, value_name = "ACTION")]
        set_default: Option<String>,

        /// Hide processes without a window
        #[arg(long, value_name = "BOOL")]
        hide_background: Option<bool>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::List {
            name,
            hide_background,
            show_background,
        }) => {
            let hide = match (hide_background, show_background) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::list::run(name, hide, cli.json).await?;
        }
        Some(Commands::Search { query }) => {
            commands::search::run(&query, cli.json).await?;
        }
        Some(Commands::Kill { target, action }) => {
            let success = commands::kill::run(&target, action.as_deref(), cli.json).await?;
            if !success {
                std::process::exit(1);
            }
        }
        Some(Commands::Actions) => {
            commands::actions::run(cli.json).await?;
        }
        Some(Commands::Config {
            set_default,
            hide_background,
        }) => {
            commands::config::run(set_default.as_deref(), hide_background, cli.json).await?;
        }
        None => {
            // Default: Launch TUI or list processes
            if cli.no_tui || !atty::is(atty::Stream::Stdout) {
                commands::list::run(None, None, cli.json).await?;
            } else {
                tui::run().await?;
            }
        }
    }

    Ok(())
}
