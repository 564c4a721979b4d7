//! Agora command-line client
//!
//! Thin host around `agora_client::ApiClient`:
//! 1. Loads TOML configuration and the on-disk credential/view-key stores
//! 2. Logs in with credentials from the environment
//! 3. Issues authenticated reads against the forum backend
//!
//! The session mechanics (token attach, silent refresh, login-boundary
//! redirect) all live in the library; this binary only decides where the
//! stores live and prints results.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agora_auth::{CredentialStore, ViewKeyStore};
use agora_client::{ApiClient, TrackingNavigator};

use crate::config::Config;

#[derive(Debug)]
enum Command {
    Login,
    Me,
    Get { path: String },
    Unread,
    Logout,
}

/// Parse `--config <path>` plus one positional command.
fn parse_args(args: &[String]) -> Result<(Option<&str>, Command)> {
    let mut config_path = None;
    let mut positionals: Vec<&str> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let value = args
                    .get(i + 1)
                    .map(|s| s.as_str())
                    .context("--config requires a path")?;
                config_path = Some(value);
                i += 2;
            }
            other => {
                positionals.push(other);
                i += 1;
            }
        }
    }

    let command = match positionals.as_slice() {
        ["login"] => Command::Login,
        ["me"] => Command::Me,
        ["get", path] => Command::Get {
            path: (*path).to_string(),
        },
        ["unread"] => Command::Unread,
        ["logout"] => Command::Logout,
        [] => bail!("usage: agora [--config <path>] <login | me | get <path> | unread | logout>"),
        other => bail!("unrecognized command: {other:?}"),
    };

    Ok((config_path, command))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let (cli_config_path, command) = parse_args(&args)?;

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let credentials = Arc::new(
        CredentialStore::load(config.storage.credential_file.clone())
            .await
            .context("opening credential store")?,
    );
    let view_keys = Arc::new(
        ViewKeyStore::load(config.storage.view_key_file.clone())
            .await
            .context("opening view-key store")?,
    );
    let navigator = Arc::new(TrackingNavigator::new("/"));

    let client = ApiClient::new(config.client, credentials, view_keys, navigator)
        .context("building api client")?;

    match command {
        Command::Login => {
            let login = config::login_from_env()?;
            let user = client.login(&login.user_id, login.password.expose()).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Me => {
            let user = client.current_user().await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Get { path } => {
            let response = client.get(&path).await?;
            println!("{}", response.text());
        }
        Command::Unread => {
            let notifications = agora_client::endpoints::unread_notification_count(&client).await?;
            let messages = agora_client::endpoints::unread_message_count(&client).await?;
            println!("notifications: {notifications}\nmessages: {messages}");
        }
        Command::Logout => {
            client.logout().await?;
            info!("logged out");
        }
    }

    Ok(())
}
