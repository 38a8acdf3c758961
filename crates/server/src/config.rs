//! Configuration of the schoolhouse service.
//!
//! Values are layered with figment, later sources overriding earlier ones:
//! 1. Defaults
//! 2. TOML file (`schoolhouse.toml` unless another path is given)
//! 3. Environment variables prefixed with `SCHOOLHOUSE_`, `__` separating sections
//!    (`SCHOOLHOUSE_SERVER__LISTEN_ADDR`). Variables without a section, such as the
//!    client's `SCHOOLHOUSE_SERVER`, are ignored.
//! 4. `BLOB_READ_WRITE_TOKEN`, which switches image storage to the remote bucket
//!    unless it is blank

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "schoolhouse.toml";

/// Environment variable holding the remote bucket token.
pub const BLOB_TOKEN_VAR: &str = "BLOB_READ_WRITE_TOKEN";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the expected shape.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The merged configuration is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener and request limits.
    pub server: ServerConfig,
    /// Relational storage.
    pub database: DatabaseConfig,
    /// Image storage.
    pub blob: BlobConfig,
}

/// Listener and request limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub listen_addr: String,
    /// Largest accepted multipart body, in bytes.
    pub max_upload_size: usize,
}

/// Relational storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL. The file is created when missing.
    pub url: String,
    /// Upper bound of pooled connections.
    pub max_connections: u32,
}

/// Image storage.
///
/// Images go to `local_dir` unless a bucket `token` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    /// Directory receiving uploads in local mode.
    pub local_dir: PathBuf,
    /// URL path under which `local_dir` is served.
    pub public_prefix: String,
    /// Base URL of the remote bucket API.
    pub endpoint: String,
    /// Bucket write token; selects the remote bucket when present and not blank.
    pub token: Option<String>,
}

/// Which image store the configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobBackend {
    /// Files under [`BlobConfig::local_dir`].
    Local,
    /// Objects in the remote bucket.
    Remote,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5800".to_owned(),
            max_upload_size: 5 * 1024 * 1024,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://schoolhouse.db".to_owned(),
            max_connections: 5,
        }
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from("public").join("schoolImages"),
            public_prefix: "/schoolImages".to_owned(),
            endpoint: "https://blob.vercel-storage.com".to_owned(),
            token: None,
        }
    }
}

impl BlobConfig {
    /// The store selected by this configuration.
    #[must_use]
    pub fn backend(&self) -> BlobBackend {
        if self.token.as_deref().is_some_and(|token| !token.trim().is_empty()) {
            BlobBackend::Remote
        } else {
            BlobBackend::Local
        }
    }
}

impl Config {
    /// Loads configuration from `schoolhouse.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, reading the TOML layer from `config_path` when given.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_path.unwrap_or_else(|| Path::new(CONFIG_FILE_NAME));
        Self::figment(config_file).extract::<Self>().map_err(Box::new)?.validated()
    }

    /// The provider chain used by [`Config::load_from`].
    #[must_use]
    pub fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(
                Env::prefixed("SCHOOLHOUSE_")
                    .filter(|key| key.as_str().contains("__"))
                    .split("__"),
            )
            .merge(Env::raw().only(&[BLOB_TOKEN_VAR]).map(|_| "blob.token".into()))
    }

    /// Checks the merged values. A blank bucket token counts as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.blob.token.as_deref().is_some_and(|token| token.trim().is_empty()) {
            self.blob.token = None;
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".to_owned()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".to_owned(),
            ));
        }
        if self.server.max_upload_size == 0 {
            return Err(ConfigError::Invalid(
                "server.max_upload_size must be greater than 0".to_owned(),
            ));
        }
        if self.blob.token.is_some() && self.blob.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "blob.endpoint is required when blob.token is set".to_owned(),
            ));
        }
        if !self.blob.public_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "blob.public_prefix must start with '/': {}",
                self.blob.public_prefix
            )));
        }
        Ok(self)
    }
}
