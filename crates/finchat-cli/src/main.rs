//! Command-line interface for finchat
//!
//! # Usage
//!
//! ```bash
//! # Set up environment variables (or put them in a .env file)
//! export GROQ_API_KEY="gsk-..."
//! export ALPHA_VANTAGE_API_KEY="..."
//!
//! # Chat in the terminal
//! cargo run --bin finchat -- chat
//!
//! # Serve POST /query on 0.0.0.0:8000
//! cargo run --bin finchat -- serve
//! ```

mod app;
mod chat;
mod server;

use anyhow::Context;
use clap::{Parser, Subcommand};
use finchat_utils::AppConfig;
use std::net::SocketAddr;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "finchat")]
#[command(about = "Financial research chat assistant", long_about = None)]
struct Args {
    /// Command to run (defaults to `chat`)
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chat in the terminal
    Chat {
        /// Show error details beneath the apology
        #[arg(long)]
        diagnostics: bool,
    },

    /// Serve the HTTP query endpoint
    Serve {
        /// Address to bind (overrides FINCHAT_BIND)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Include error details in failed responses
        #[arg(long)]
        diagnostics: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command.unwrap_or(Command::Chat { diagnostics: false }) {
        Command::Chat { diagnostics } => {
            // Warnings only while chatting
            finchat_utils::init_tracing("warn");
            let session = app::session_from(AppConfig::from_env(), diagnostics);
            chat::run(session).await
        }
        Command::Serve { bind, diagnostics } => {
            finchat_utils::init_tracing("info");
            let config = AppConfig::from_env().context("Cannot start the server")?;
            let orchestrator = app::build_orchestrator(&config)?;
            let bind = bind.unwrap_or(config.server.bind);

            info!(%bind, model = %config.llm.model, "Starting finchat server");
            server::serve(bind, server::AppState::new(orchestrator, diagnostics)).await
        }
    }
}
