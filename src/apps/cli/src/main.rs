//! amadeus-agent - Amadeus blockchain agent CLI
//!
//! Discovers the MCP tool catalog, runs the model tool loop and drives
//! two-phase token transfers.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod agent;
mod commands;

const ENV_LOG_LEVEL: &str = "AMADEUS_AGENT_LOG_LEVEL";

#[derive(Parser, Debug)]
#[command(name = "amadeus-agent")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the tools discovered on the MCP endpoint
    Tools {
        /// Print the full descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the agent on a prompt
    Ask {
        /// Prompt text; defaults to claiming testnet AMA for the configured wallet
        prompt: Option<String>,
    },

    /// Build, sign and submit a token transfer from the configured wallet
    Transfer {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Amount in whole tokens, e.g. 10 or 0.5
        #[arg(long)]
        amount: String,

        /// Token symbol
        #[arg(long, default_value = "AMA")]
        token: String,

        /// Submit to mainnet instead of testnet
        #[arg(long)]
        mainnet: bool,
    },

    /// Sign a hex signing payload with AMA_SECRET_KEY
    Sign {
        /// Hex-encoded signing payload
        #[arg(long)]
        payload: String,
    },
}

fn init_logging(cli_level: Option<&str>) {
    let directive = cli_level
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_LOG_LEVEL).ok())
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = agent::load_config(cli.config.as_deref())?;
    let cancel = agent::cancel_on_ctrl_c();

    match cli.command {
        Commands::Tools { json } => commands::list_tools(&config, json).await,
        Commands::Ask { prompt } => commands::ask(&config, prompt, &cancel).await,
        Commands::Transfer {
            to,
            amount,
            token,
            mainnet,
        } => commands::transfer(&config, &to, &amount, &token, mainnet, &cancel).await,
        Commands::Sign { payload } => commands::sign(&config, &payload),
    }
}
