// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

use branchline::client::{self, ChatRequest};
use branchline::config::{self, ConfigSource};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "branchline", about = "Streamed chat client for textbook conversations")]
struct Cli {
    /// Path to the branchline.yaml config file
    #[arg(long, default_value = "branchline.yaml", env = "BRANCHLINE_CONFIG", global = true)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one message and print the stream outcome as JSON
    Send {
        /// Textbook the question is about
        #[arg(long)]
        textbook: String,

        /// Chapter the question is about
        #[arg(long)]
        chapter: String,

        /// Continue an existing session instead of starting a new one
        #[arg(long)]
        session: Option<String>,

        message: String,
    },
    /// List stored conversations
    Chats,
    /// Print the messages of one conversation
    History { session_id: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = config::FileSource {
        path: std::path::PathBuf::from(&cli.config),
    };
    let config = match config::load_config(&source) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        origin = %source.origin(),
        version = %config.version,
        base_url = %config.api.base_url,
        authenticated = config.auth.token.is_some() || config.auth.token_file.is_some(),
        "config loaded"
    );

    let client = client::build_chat_client(&config);

    let output = match cli.command {
        Command::Send {
            textbook,
            chapter,
            session,
            message,
        } => {
            let request = ChatRequest {
                message,
                textbook_id: textbook,
                chapter_id: chapter,
                session_id: session,
            };
            let outcome = client.stream_message(&request).await;
            serde_json::to_string_pretty(&outcome)
        }
        Command::Chats => match client.fetch_chats().await {
            Ok(chats) => serde_json::to_string_pretty(&chats),
            Err(e) => {
                tracing::error!("failed to fetch chats: {e}");
                std::process::exit(1);
            }
        },
        Command::History { session_id } => match client.load_chat(&session_id).await {
            Ok(messages) => serde_json::to_string_pretty(&messages),
            Err(e) => {
                tracing::error!(%session_id, "failed to load chat: {e}");
                std::process::exit(1);
            }
        },
    };

    match output {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("failed to render output: {e}");
            std::process::exit(1);
        }
    }
}
