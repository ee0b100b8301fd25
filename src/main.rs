mod client;
mod commands;
mod config;
mod models;
mod store;
mod views;
mod web;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Slot board — mirror a scheduling server's time slots over HTTP + SSE.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print detailed API responses
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Path to config file
    #[arg(short = 'c', long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Override API base URL from config (also: SLOTBOARD_API_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a snapshot and print the board once
    Show {
        /// Only show slots in this category (e.g. "green")
        #[arg(long, default_value = "")]
        color: String,

        /// Only show slots starting on this date (e.g. "2024-03-01")
        #[arg(long, default_value = "")]
        date: String,
    },

    /// Keep the board in sync with the live update channel
    Watch {
        /// Only show slots in this category (e.g. "green")
        #[arg(long, default_value = "")]
        color: String,

        /// Only show slots starting on this date (e.g. "2024-03-01")
        #[arg(long, default_value = "")]
        date: String,
    },

    /// Start web dashboard server
    Serve {
        /// Listen address (e.g. "0.0.0.0:3000")
        #[arg(short = 'a', long, default_value = "0.0.0.0:3009")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let base_url = config::resolve_base_url(cli.base_url.as_deref(), &cli.config)?;

    match &cli.command {
        Command::Show { color, date } => {
            commands::run_show(&base_url, color, date, cli.verbose).await?;
        }
        Command::Watch { color, date } => {
            commands::run_watch(&base_url, color, date).await?;
        }
        Command::Serve { addr } => {
            web::serve(&base_url, addr).await?;
        }
    }

    Ok(())
}
