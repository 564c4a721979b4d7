//! Client configuration
//!
//! All route knowledge lives here: the base URL every call is issued
//! against, the admin and view-key prefixes, the public-read allowlist, and
//! the session boundary paths. Binaries load this from a TOML `[client]`
//! table; tests construct it directly.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Configuration for an [`crate::ApiClient`].
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Fixed prefix for every request, e.g. `https://forum.example.com/api`
    pub base_url: String,
    /// Paths under this prefix always classify as admin traffic
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
    /// Resource family whose numbered detail reads carry the view-key header
    #[serde(default = "default_view_key_prefix")]
    pub view_key_prefix: String,
    /// GET paths under these prefixes never require a credential
    #[serde(default = "default_public_read_prefixes")]
    pub public_read_prefixes: Vec<String>,
    /// Session refresh endpoint, relative to `base_url`
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// View path the user is sent to when the session cannot be recovered
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Client-side expiry hint stamped on stored access tokens, in seconds
    #[serde(default = "default_credential_lifetime")]
    pub credential_lifetime_secs: u64,
    /// Per-request timeout, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_admin_prefix() -> String {
    "/admin".into()
}

fn default_view_key_prefix() -> String {
    "/board/".into()
}

fn default_public_read_prefixes() -> Vec<String> {
    vec!["/site/".into(), "/board/search".into()]
}

fn default_refresh_path() -> String {
    agora_auth::REFRESH_PATH.into()
}

fn default_login_path() -> String {
    "/login".into()
}

fn default_credential_lifetime() -> u64 {
    agora_auth::DEFAULT_TOKEN_LIFETIME_SECS
}

fn default_timeout() -> u64 {
    30
}

impl ClientConfig {
    /// Config with the given base URL and default route knowledge.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            admin_prefix: default_admin_prefix(),
            view_key_prefix: default_view_key_prefix(),
            public_read_prefixes: default_public_read_prefixes(),
            refresh_path: default_refresh_path(),
            login_path: default_login_path(),
            credential_lifetime_secs: default_credential_lifetime(),
            timeout_secs: default_timeout(),
        }
    }

    /// Reject configurations the client cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".into()));
        }

        if self.credential_lifetime_secs == 0 {
            return Err(Error::Config(
                "credential_lifetime_secs must be greater than 0".into(),
            ));
        }

        for (name, value) in [
            ("admin_prefix", &self.admin_prefix),
            ("view_key_prefix", &self.view_key_prefix),
            ("refresh_path", &self.refresh_path),
            ("login_path", &self.login_path),
        ] {
            if !value.starts_with('/') {
                return Err(Error::Config(format!("{name} must start with /, got: {value}")));
            }
        }

        for prefix in &self.public_read_prefixes {
            if !prefix.starts_with('/') {
                return Err(Error::Config(format!(
                    "public_read_prefixes entries must start with /, got: {prefix}"
                )));
            }
        }

        Ok(())
    }
}
