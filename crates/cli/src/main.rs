//! Alice Grocer CLI - talk to the skill webhook from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session against a local skill
//! ag-cli chat
//!
//! # Against a deployed skill, as a specific platform user
//! ag-cli chat --url https://skill.example.com/webhook --user-id tester
//!
//! # One turn at a time, keeping the account store in a file
//! ag-cli say "новый" --state accounts.json
//! ```
//!
//! # Commands
//!
//! - `chat` - REPL that plays the voice platform
//! - `say` - Send a single utterance
//!
//! The webhook URL defaults to `AG_WEBHOOK_URL`, then to a local skill.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

mod client;
mod commands;

use client::CliError;

const DEFAULT_WEBHOOK_URL: &str = "http://127.0.0.1:3000/webhook";

#[derive(Parser)]
#[command(name = "ag-cli")]
#[command(author, version, about = "Alice Grocer developer console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hold a conversation with the skill
    Chat {
        /// Webhook URL
        #[arg(short, long)]
        url: Option<Url>,

        /// Platform user id; the skill keys its session on it
        #[arg(long, default_value = "dev-user")]
        user_id: String,
    },
    /// Send a single utterance
    Say {
        /// What the user says
        utterance: String,

        /// Webhook URL
        #[arg(short, long)]
        url: Option<Url>,

        /// Platform user id; the skill keys its session on it
        #[arg(long, default_value = "dev-user")]
        user_id: String,

        /// JSON file holding the account store between turns
        #[arg(short, long)]
        state: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alice_grocer_cli=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Chat { url, user_id } => {
            commands::chat::run(webhook_url(url)?, &user_id).await?;
        }
        Commands::Say {
            utterance,
            url,
            user_id,
            state,
        } => {
            let reply =
                commands::say::run(webhook_url(url)?, &user_id, &utterance, state.as_deref())
                    .await?;
            println!("{}", reply.response.text);
            if reply.response.end_session {
                println!("(session ended)");
            }
        }
    }
    Ok(())
}

/// Resolve the webhook URL from the flag, the environment, or the default.
fn webhook_url(flag: Option<Url>) -> Result<Url, CliError> {
    if let Some(url) = flag {
        return Ok(url);
    }
    let raw = std::env::var("AG_WEBHOOK_URL").unwrap_or_else(|_| DEFAULT_WEBHOOK_URL.to_string());
    Url::parse(&raw).map_err(|e| CliError::Url(format!("{raw}: {e}")))
}
