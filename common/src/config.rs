//! Layered configuration for the console and its server.
//!
//! Layers, later overriding earlier:
//! 1. Built-in defaults
//! 2. `config.toml` in the station home (`$STATION_HOME`, default `~/.station`)
//! 3. Environment variables (`RAILWAY_TOKEN`, `STATION_*`)
//!
//! ```no_run
//! use station_common::ConfigLoader;
//!
//! let config = ConfigLoader::new().load()?;
//! let token = config.require_token()?;
//! # Ok::<(), station_common::ConfigError>(())
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://backboard.railway.app/graphql/v2";
pub const DEFAULT_DASHBOARD_URL: &str = "https://railway.app";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_STALE_TIME_SECS: u64 = 60;
pub const DEFAULT_GC_TIME_SECS: u64 = 300;
pub const DEFAULT_REDIRECT_DELAY_SECS: u64 = 3;

/// Credential for the remote API.
pub const TOKEN_VAR: &str = "RAILWAY_TOKEN";
pub const HOME_VAR: &str = "STATION_HOME";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for ${var}: '{value}' (expected {expected})")]
    InvalidEnvValue {
        var: String,
        value: String,
        expected: &'static str,
    },

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("cannot determine home directory; set $STATION_HOME")]
    NoHome,

    #[error("no API token configured; set $RAILWAY_TOKEN or `token` in config.toml")]
    MissingToken,
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    /// GraphQL endpoint of the remote API.
    pub endpoint: String,
    pub token: Option<String>,
    pub stale_time_secs: u64,
    pub gc_time_secs: u64,
    /// Delay before navigating away after a successful create.
    pub redirect_delay_secs: u64,
    /// Listen address of `station serve`.
    pub bind: String,
    /// Base URL of the provider's web dashboard, used for project links.
    pub dashboard_url: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            stale_time_secs: DEFAULT_STALE_TIME_SECS,
            gc_time_secs: DEFAULT_GC_TIME_SECS,
            redirect_delay_secs: DEFAULT_REDIRECT_DELAY_SECS,
            bind: DEFAULT_BIND.to_string(),
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
        }
    }
}

impl StationConfig {
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingToken)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_time_secs)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_secs(self.redirect_delay_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("endpoint", &self.endpoint), ("dashboard_url", &self.dashboard_url)] {
            url::Url::parse(value).map_err(|e| ConfigError::Invalid {
                field,
                reason: format!("{value}: {e}"),
            })?;
        }
        self.bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                field: "bind",
                reason: format!("{}: {e}", self.bind),
            })?;
        Ok(())
    }
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileLayer {
    endpoint: Option<String>,
    token: Option<String>,
    stale_time_secs: Option<u64>,
    gc_time_secs: Option<u64>,
    redirect_delay_secs: Option<u64>,
    bind: Option<String>,
    dashboard_url: Option<String>,
    #[serde(flatten)]
    unknown: HashMap<String, toml::Value>,
}

impl FileLayer {
    fn apply(self, config: &mut StationConfig) {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if self.token.is_some() {
            config.token = self.token;
        }
        if let Some(secs) = self.stale_time_secs {
            config.stale_time_secs = secs;
        }
        if let Some(secs) = self.gc_time_secs {
            config.gc_time_secs = secs;
        }
        if let Some(secs) = self.redirect_delay_secs {
            config.redirect_delay_secs = secs;
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(url) = self.dashboard_url {
            config.dashboard_url = url;
        }
    }
}

/// Builder for [`StationConfig`].
#[derive(Debug, Default)]
pub struct ConfigLoader {
    home: Option<PathBuf>,
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
    skip_file: bool,
    skip_env: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `home` instead of `$STATION_HOME` or `~/.station`.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Read this file instead of `<home>/config.toml`. Unlike the default
    /// file, it must exist.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Read overrides from `vars` instead of the process environment.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn skip_file_layer(mut self) -> Self {
        self.skip_file = true;
        self
    }

    pub fn skip_env_layer(mut self) -> Self {
        self.skip_env = true;
        self
    }

    pub fn load(self) -> Result<StationConfig, ConfigError> {
        let mut config = StationConfig::default();

        if !self.skip_file {
            let layer = match &self.file {
                Some(path) => Self::read_file(path)?,
                None => {
                    let path = self.resolve_home()?.join(CONFIG_FILE);
                    if path.exists() {
                        Self::read_file(&path)?
                    } else {
                        tracing::debug!("{} not found, using defaults", path.display());
                        FileLayer::default()
                    }
                }
            };
            layer.apply(&mut config);
        }

        if !self.skip_env {
            self.apply_env(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn var(&self, name: &str) -> Option<String> {
        let value = match &self.env {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn resolve_home(&self) -> Result<PathBuf, ConfigError> {
        if let Some(home) = &self.home {
            return Ok(home.clone());
        }
        if !self.skip_env
            && let Some(home) = self.var(HOME_VAR)
        {
            return Ok(PathBuf::from(home));
        }
        dirs::home_dir()
            .map(|home| home.join(".station"))
            .ok_or(ConfigError::NoHome)
    }

    fn read_file(path: &Path) -> Result<FileLayer, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let layer: FileLayer = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        for key in layer.unknown.keys() {
            tracing::warn!("ignoring unknown key `{key}` in {}", path.display());
        }
        Ok(layer)
    }

    fn apply_env(&self, config: &mut StationConfig) -> Result<(), ConfigError> {
        if let Some(token) = self.var(TOKEN_VAR) {
            config.token = Some(token);
        }
        if let Some(endpoint) = self.var("STATION_ENDPOINT") {
            tracing::debug!("applying env override: STATION_ENDPOINT={endpoint}");
            config.endpoint = endpoint;
        }
        if let Some(bind) = self.var("STATION_BIND") {
            config.bind = bind;
        }
        if let Some(url) = self.var("STATION_DASHBOARD_URL") {
            config.dashboard_url = url;
        }
        if let Some(secs) = self.secs_var("STATION_STALE_TIME_SECS")? {
            config.stale_time_secs = secs;
        }
        if let Some(secs) = self.secs_var("STATION_GC_TIME_SECS")? {
            config.gc_time_secs = secs;
        }
        if let Some(secs) = self.secs_var("STATION_REDIRECT_DELAY_SECS")? {
            config.redirect_delay_secs = secs;
        }
        Ok(())
    }

    fn secs_var(&self, name: &str) -> Result<Option<u64>, ConfigError> {
        let Some(value) = self.var(name) else {
            return Ok(None);
        };
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvValue {
                var: name.to_string(),
                value,
                expected: "a whole number of seconds",
            })
    }
}
