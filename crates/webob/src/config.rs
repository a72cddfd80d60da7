//! Configuration loading and validation.

use crate::types::Config;
use common::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

/// Directory name under the user configuration directory.
pub const APP_DIR: &str = "webob";

/// File name of the configuration file.
pub const CONFIG_FILE: &str = "config.yaml";

/// Source of monitor configuration
#[cfg_attr(test, mockall::automock)]
pub trait ConfigSource: Send + Sync {
    /// Resolve the startup configuration from every layer.
    fn load(&self) -> Result<Config>;

    /// Re-read the configuration file alone.
    ///
    /// Implementations must not keep any state from a failed attempt.
    fn reload_from_file(&self) -> Result<Config>;
}

/// On-disk layout of the configuration file.
///
/// Every key is optional; missing keys keep the value from the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub url: Option<String>,
    pub status_code: Option<u16>,
    pub content_type: Option<String>,
    pub server: Option<String>,
    pub user_agent: Option<String>,

    #[serde(with = "humantime_serde")]
    pub tick: Option<Duration>,
}

impl FileConfig {
    /// Parse a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        Self::parse(contents).map_err(Error::config_unavailable)
    }

    /// Read and parse a YAML file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config_unavailable(format!("{}: {}", path.display(), e)))?;
        Self::parse(&contents)
            .map_err(|e| Error::config_unavailable(format!("{}: {}", path.display(), e)))
    }

    fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty file is a valid, empty layer.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}

/// Explicit values layered on top of the file, usually from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub url: Option<String>,
    pub status_code: Option<u16>,
    pub content_type: Option<String>,
    pub server: Option<String>,
    pub user_agent: Option<String>,
    pub tick: Option<Duration>,
}

impl From<FileConfig> for Overrides {
    fn from(file: FileConfig) -> Self {
        Self {
            url: file.url,
            status_code: file.status_code,
            content_type: file.content_type,
            server: file.server,
            user_agent: file.user_agent,
            tick: file.tick,
        }
    }
}

impl Overrides {
    /// Apply every set value on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(status_code) = self.status_code {
            config.status_code = status_code;
        }
        if let Some(content_type) = &self.content_type {
            config.content_type = content_type.clone();
        }
        if let Some(server) = &self.server {
            config.server = server.clone();
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(tick) = self.tick {
            config.tick = tick;
        }
    }
}

/// Check a fully layered configuration.
pub fn validate(config: Config) -> Result<Config> {
    config.validate().map_err(Error::invalid_config)?;
    Ok(config)
}

/// Layered configuration store: defaults, then the YAML file, then overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    overrides: Overrides,
}

impl ConfigStore {
    /// Create a store reading `path` (if any) and layering `overrides` on top.
    pub fn new(path: Option<PathBuf>, overrides: Overrides) -> Self {
        Self { path, overrides }
    }

    /// Create a store using the per-user configuration file.
    pub fn with_default_path(overrides: Overrides) -> Self {
        Self::new(Self::default_path(), overrides)
    }

    /// `<user config dir>/webob/config.yaml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Configuration file this store reads
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read_file(&self) -> Result<FileConfig> {
        match &self.path {
            Some(path) => FileConfig::read(path),
            None => Err(Error::config_unavailable(
                "no configuration file location is known",
            )),
        }
    }
}

impl ConfigSource for ConfigStore {
    fn load(&self) -> Result<Config> {
        let mut config = Config::default();

        match self.read_file() {
            Ok(file) => {
                if let Some(path) = &self.path {
                    tracing::info!("Loaded configuration from: {}", path.display());
                }
                Overrides::from(file).apply(&mut config);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Configuration file not used, continuing with flags");
            }
        }

        self.overrides.apply(&mut config);
        validate(config)
    }

    fn reload_from_file(&self) -> Result<Config> {
        let mut config = Config::default();
        Overrides::from(self.read_file()?).apply(&mut config);
        validate(config)
    }
}
