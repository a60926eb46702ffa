use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { listen_addr: "127.0.0.1:8080".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: Option<String>,
    pub backend: BackendKind,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { db_path: None, backend: BackendKind::Log }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Log,
    Sql,
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::Log
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Loads config from `~/.eduloop/config.toml`, returning defaults if the
    /// file is missing.
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".eduloop").join("config.toml")
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "loaded config");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".eduloop")
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage.db_path.as_ref().map(PathBuf::from).unwrap_or_else(|| {
            let name = match self.storage.backend {
                BackendKind::Log => "eduloop.log",
                BackendKind::Sql => "eduloop.sqlite3",
            };
            Self::data_dir().join(name)
        })
    }

    pub fn log_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }
}
