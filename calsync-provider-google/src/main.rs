//! calsync-provider-google - Google Calendar provider for calsync
//!
//! This binary implements the calsync provider protocol, communicating
//! with calsync via JSON over stdin/stdout.
//!
//! The provider manages its own credentials and tokens:
//!   ~/.config/calsync/providers/google/app_config.toml
//!   ~/.config/calsync/providers/google/session/{account}.toml

mod api;
mod app_config;
mod commands;
mod error;
mod google_event;
mod remote_config;
mod session;

use anyhow::Result;
use calsync_core::remote::protocol::{Command, Request, Response};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CALSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&format!("Failed to parse request: {e}")),
        };

        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}

async fn handle_request(request: Request) -> String {
    let result = match request.command {
        Command::ListEvents => match serde_json::from_value(request.params) {
            Ok(cmd) => respond(commands::list_events::handle(cmd).await),
            Err(e) => Err(e.into()),
        },
        Command::ExecuteBatch => match serde_json::from_value(request.params) {
            Ok(cmd) => respond(commands::execute_batch::handle(cmd).await),
            Err(e) => Err(e.into()),
        },
    };

    result.unwrap_or_else(|e| {
        error!("{:#}", e);
        Response::error(&format!("{:#}", e))
    })
}

fn respond<T: Serialize>(result: Result<T>) -> Result<String> {
    Ok(Response::success(result?)?)
}
