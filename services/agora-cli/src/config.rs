//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Login credentials are read from AGORA_USER_ID / AGORA_USER_PWD env vars,
//! never stored in the TOML, to avoid leaking secrets.

use std::path::{Path, PathBuf};

use agora_client::ClientConfig;
use common::Secret;
use serde::Deserialize;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Where the credential slot and view-key live on disk
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_credential_file")]
    pub credential_file: PathBuf,
    #[serde(default = "default_view_key_file")]
    pub view_key_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            credential_file: default_credential_file(),
            view_key_file: default_view_key_file(),
        }
    }
}

fn default_credential_file() -> PathBuf {
    PathBuf::from("agora-credential.json")
}

fn default_view_key_file() -> PathBuf {
    PathBuf::from("agora-viewkey")
}

/// Login credentials resolved from the environment.
pub struct LoginEnv {
    pub user_id: String,
    pub password: Secret<String>,
}

/// Read AGORA_USER_ID / AGORA_USER_PWD for the `login` command.
pub fn login_from_env() -> common::Result<LoginEnv> {
    let user_id = std::env::var("AGORA_USER_ID")
        .map_err(|_| common::Error::Config("AGORA_USER_ID not set".into()))?;
    let password = std::env::var("AGORA_USER_PWD")
        .map_err(|_| common::Error::Config("AGORA_USER_PWD not set".into()))?;
    Ok(LoginEnv {
        user_id,
        password: Secret::new(password),
    })
}

impl Config {
    /// Load configuration from a TOML file and validate the client section.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        config
            .client
            .validate()
            .map_err(|e| common::Error::Config(e.to_string()))?;

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("agora.toml")
    }
}
