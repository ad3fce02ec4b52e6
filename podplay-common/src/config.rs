//! Bootstrap configuration loading
//!
//! Configuration is a single TOML file. Every field has a built-in default,
//! so a missing file is never fatal: the service logs a warning and starts
//! with defaults.
//!
//! # Config file resolution priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`PODPLAY_CONFIG`)
//! 3. User config file (`~/.config/podplay/config.toml` or platform equivalent)
//! 4. Built-in defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "PODPLAY_CONFIG";

/// Default HTTP port for the player service
pub const DEFAULT_PORT: u16 = 5790;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: u16,
    pub catalog: CatalogConfig,
    pub storage: StorageConfig,
    pub source: SourceConfig,
    pub transcript: TranscriptConfig,
    pub playback: PlaybackConfig,
    pub events: EventsConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            catalog: CatalogConfig::default(),
            storage: StorageConfig::default(),
            source: SourceConfig::default(),
            transcript: TranscriptConfig::default(),
            playback: PlaybackConfig::default(),
            events: EventsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where the episode catalog comes from
///
/// `path` (a JSON array of episode rows) wins over `url` when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Local JSON file with episode rows
    pub path: Option<PathBuf>,
    /// Base URL of the hosted data API
    pub url: Option<String>,
    /// Public API key sent with catalog requests
    pub api_key: Option<String>,
    /// Table holding episode rows
    pub table: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            api_key: None,
            table: "episodes".to_string(),
        }
    }
}

/// Public document storage used for downloadable transcripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage base URL; transcript links are omitted when unset
    pub base_url: Option<String>,
    pub transcript_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            transcript_bucket: "Transcripts".to_string(),
        }
    }
}

/// Audio source normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Hosts whose share links need the direct-download marker
    pub direct_download_hosts: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            direct_download_hosts: vec!["dropbox.com".to_string()],
        }
    }
}

/// Transcript auto-scroll tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Minimum distance (display units) before a corrective scroll is issued
    pub scroll_deadband: f64,
    /// Smooth-scroll animation length in milliseconds
    pub smooth_scroll_ms: u64,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            scroll_deadband: 5.0,
            smooth_scroll_ms: 300,
        }
    }
}

/// Playback defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Position report interval of the headless media handle
    pub tick_ms: u64,
    pub initial_volume: f64,
    pub initial_rate: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            initial_volume: 1.0,
            initial_rate: 1.0,
        }
    }
}

/// Event bus sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject values the player cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.transcript.scroll_deadband.is_finite() || self.transcript.scroll_deadband < 0.0 {
            return Err(Error::Config(format!(
                "transcript.scroll_deadband must be a non-negative number, got {}",
                self.transcript.scroll_deadband
            )));
        }
        if self.playback.tick_ms == 0 {
            return Err(Error::Config("playback.tick_ms must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.playback.initial_volume) {
            return Err(Error::Config(format!(
                "playback.initial_volume must be within [0, 1], got {}",
                self.playback.initial_volume
            )));
        }
        if !self.playback.initial_rate.is_finite() || self.playback.initial_rate <= 0.0 {
            return Err(Error::Config(format!(
                "playback.initial_rate must be positive, got {}",
                self.playback.initial_rate
            )));
        }
        if self.events.capacity == 0 {
            return Err(Error::Config("events.capacity must be positive".to_string()));
        }
        Ok(())
    }
}

/// Resolves and loads the bootstrap config file
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
    env_var: String,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self {
            cli_path,
            env_var: CONFIG_ENV_VAR.to_string(),
        }
    }

    /// Use a different environment variable (tests)
    pub fn with_env_var(mut self, name: &str) -> Self {
        self.env_var = name.to_string();
        self
    }

    /// Config file path by priority; `None` when nothing is configured and
    /// no user config file exists.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(&self.env_var) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        default_config_path().filter(|p| p.exists())
    }

    /// Load the resolved config file, falling back to defaults when the file
    /// is absent. A file that exists but does not parse is an error.
    pub fn load(&self) -> Result<TomlConfig> {
        match self.resolve_path() {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                TomlConfig::load(&path)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(TomlConfig::default())
            }
            None => {
                info!("No config file found, using built-in defaults");
                Ok(TomlConfig::default())
            }
        }
    }
}

/// Platform user config location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("podplay").join("config.toml"))
}
