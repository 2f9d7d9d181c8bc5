mod cli;
mod commands;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;

use inventario_client::{ClientConfig, ClientError, FileTokenStore, SessionManager};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", describe(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env().context("invalid configuration")?;
    if let Some(url) = cli.api_url.as_deref() {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("--api-url must start with http:// or https://");
        }
        config.api_url = url.to_string();
    }

    inventario_observability::init(config.log_format);
    tracing::debug!(api_url = %config.api_url, token_path = %config.token_path.display(), "starting");

    let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let session = Arc::new(SessionManager::new(&config, store)?);
    session.init().await;

    let outcome = tokio::select! {
        res = commands::dispatch(&cli, &session) => res,
        _ = tokio::signal::ctrl_c() => {
            session.teardown();
            bail!("interrupted");
        }
    };

    session.teardown();
    outcome
}

/// Client failures print the message a user should see; everything else
/// prints its full context chain.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ClientError>() {
        Some(client) => client.user_message(),
        None => format!("{err:#}"),
    }
}
