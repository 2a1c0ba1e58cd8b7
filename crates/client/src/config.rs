//! Client configuration
//!
//! Loaded once at startup from defaults, an optional TOML file and
//! `SHOPKEEP__*` environment variables (e.g. `SHOPKEEP__API_BASE`), in that
//! order of precedence.

use crate::client::error::ClientError;
use crate::session::{DEFAULT_LOGIN_PATH, DEFAULT_TOKEN_KEY};
use config::Map;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Base address used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address of the Shopkeep API
    pub api_base: Url,

    /// User agent sent with every request
    pub user_agent: String,

    /// Destination published when the session ends
    pub login_path: String,

    /// Storage key of the persisted token
    pub token_key: String,
}

pub(crate) fn default_user_agent() -> String {
    format!("shopkeep-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            user_agent: default_user_agent(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed
    pub fn from_env() -> Result<Self, ClientError> {
        Self::load(None, None)
    }

    /// Load configuration from file, with environment variables taking precedence
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value cannot be parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        Self::load(Some(path.as_ref()), None)
    }

    /// `env` replaces the process environment when given
    fn load(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self, ClientError> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api_base", defaults.api_base.as_str())?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("login_path", defaults.login_path)?
            .set_default("token_key", defaults.token_key)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("SHOPKEEP")
                    .separator("__")
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
