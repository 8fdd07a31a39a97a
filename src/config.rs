use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

pub const ENV_PREFIX: &str = "SUPPORTDESK";
pub const DEFAULT_CONFIG_NAME: &str = "supportdesk";

/// Top-level server configuration.
///
/// Layered from defaults, an optional config file and `SUPPORTDESK__*`
/// environment variables (e.g. `SUPPORTDESK__STORE__BACKEND=mongo`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Allow any origin. Enabled by default, the portal front-end is served separately.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            cors_permissive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Mongo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// Knowledge-base file loaded into an empty store. The embedded sample is used when unset.
    pub seed_file: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "supportdesk".to_string(),
            seed_file: None,
        }
    }
}

/// Per-client-IP limit on `POST /api/run-script/{name}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub per_minute: u32,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_minute: 10,
            burst: 10,
        }
    }
}

impl RateLimitConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl AppConfig {
    /// Load the configuration.
    ///
    /// An explicit `file` must exist; otherwise `supportdesk.{toml,yaml,json}`
    /// in the working directory is read when present.
    pub fn load(file: Option<&Path>) -> Result<Self, AppError> {
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true);
        Self::build(file, env)
    }

    fn build(file: Option<&Path>, env: config::Environment) -> Result<Self, AppError> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config = config::Config::builder()
            .add_source(file_source)
            .add_source(env)
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?
            .try_deserialize::<AppConfig>()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.rate_limit.enabled && (self.rate_limit.per_minute == 0 || self.rate_limit.burst == 0)
        {
            return Err(AppError::Config(
                "rate_limit.per_minute and rate_limit.burst must be positive".into(),
            ));
        }
        if self.store.backend == StoreBackend::Mongo && self.store.mongodb_uri.trim().is_empty() {
            return Err(AppError::Config("store.mongodb_uri is required for the mongo backend".into()));
        }
        Ok(())
    }
}
