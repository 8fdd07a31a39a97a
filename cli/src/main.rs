mod client;
mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use supportdesk::search::history::{FileHistorySlot, HistorySession};

use crate::client::SupportDeskClient;
use crate::commands::OutputFormat;

/// Command-line client for the supportdesk knowledge-base portal.
#[derive(Debug, Parser)]
#[command(name = "supportdesk-cli", version, about)]
struct Cli {
    /// Base URL of the supportdesk server
    #[arg(long, env = "SUPPORTDESK_URL", default_value = "http://localhost:3000")]
    url: String,

    /// Directory holding client-local state (search history)
    #[arg(long, env = "SUPPORTDESK_DATA_DIR", default_value = ".supportdesk")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search the knowledge base
    Search {
        /// Search terms
        #[arg(required = true)]
        query: Vec<String>,

        /// Only return articles of this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Autocomplete suggestions for a partial query
    Suggest { prefix: String },
    /// Run a diagnostic script (network_validator, mdm_checker, storage_cleaner)
    Run {
        script: String,

        /// Device identifier; generated by the server when omitted
        #[arg(long)]
        device: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Print a compliance certificate instead of the report (mdm_checker only)
        #[arg(long)]
        certificate: bool,
    },
    /// Show recent searches
    History {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = SupportDeskClient::new(&cli.url);

    let output = match cli.command {
        Command::Search { query, category } => {
            let mut session = HistorySession::open(FileHistorySlot::in_dir(&cli.data_dir))?;
            commands::search(&client, &mut session, &query.join(" "), category.as_deref()).await?
        }
        Command::Suggest { prefix } => commands::suggest(&client, &prefix).await?,
        Command::Run {
            script,
            device,
            format,
            certificate,
        } => {
            commands::run_script(&client, &script, device.as_deref(), format, certificate).await?
        }
        Command::History { clear } => {
            let mut session = HistorySession::open(FileHistorySlot::in_dir(&cli.data_dir))?;
            commands::history(&mut session, clear, chrono::Utc::now())?
        }
    };

    println!("{output}");
    Ok(())
}
