mod chat;
mod config;
mod export_cmd;
mod list_cmd;
mod show_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storyflow_store::Store;

#[derive(Parser)]
#[command(name = "storyflow", about = "Guided authoring of story flow outlines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start or resume the interactive outline wizard
    Chat {
        /// Resume an existing session by id
        #[arg(long)]
        session: Option<String>,
    },

    /// List stored sessions and saved outlines
    List,

    /// Show a stored session's outline
    Show {
        /// Session id
        id: String,
    },

    /// Export a saved outline (or a session's selection) as a markdown table
    Export {
        /// Saved outline id, or a session id
        id: String,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show or set configuration
    Config {
        /// Set the data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Set the default core story concept
        #[arg(long)]
        concept: Option<String>,

        /// Set the implicit attack-point adoption threshold (characters)
        #[arg(long)]
        implicit_attack_min_chars: Option<usize>,
    },
}

/// Open the store at the configured (or platform default) location.
fn open_store(config: &config::CliConfig) -> Result<Store> {
    let store = match &config.data_dir {
        Some(dir) => Store::open(dir)?,
        None => Store::open_default()?,
    };
    Ok(store)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = (|| -> Result<()> {
        let config = config::load_config()?;
        match cli.command {
            Commands::Chat { session } => chat::run_chat(session, &config),
            Commands::List => list_cmd::run_list(&config),
            Commands::Show { id } => show_cmd::run_show(&id, &config),
            Commands::Export { id, out } => export_cmd::run_export(&id, out.as_deref(), &config),
            Commands::Config {
                data_dir,
                concept,
                implicit_attack_min_chars,
            } => {
                if data_dir.is_none() && concept.is_none() && implicit_attack_min_chars.is_none() {
                    config::show_config()
                } else {
                    config::set_config(data_dir, concept, implicit_attack_min_chars)
                }
            }
        }
    })();

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
