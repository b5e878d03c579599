//! Configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional, `basic` feature)
//! - Runtime defaults
//! - Validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
#[cfg(feature = "basic")]
use std::fs;
#[cfg(feature = "basic")]
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Paths configuration
    pub paths: PathsConfig,

    /// Tier selection
    pub tracker: TrackerConfig,

    /// Terminal output configuration
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub claude_home: PathBuf,
    pub log_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Tier name, billing code, or "auto" to read it from the credentials file
    pub tier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub no_color: bool,
    pub width: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "ERROR".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            claude_home: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".claude"),
            log_directory: PathBuf::from("logs"),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tier: "auto".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            width: 42,
        }
    }
}

const LOG_FORMATS: &[&str] = &["pretty", "json"];
const LOG_OUTPUTS: &[&str] = &["console", "file", "both"];

impl Config {
    /// Load configuration from file, environment, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        #[cfg(feature = "basic")]
        {
            let config_paths = [
                PathBuf::from("vibe-monitor.toml"),
                PathBuf::from(".vibe-monitor.toml"),
                dirs::config_dir()
                    .map(|d| d.join("vibe-monitor").join("config.toml"))
                    .unwrap_or_default(),
            ];

            for path in &config_paths {
                if path.is_file() {
                    info!(config_file = %path.display(), "Loading configuration from file");
                    config = Self::load_from_file(path)?;
                    break;
                }
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    #[cfg(feature = "basic")]
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        if let Ok(val) = env::var("CLAUDE_HOME") {
            self.paths.claude_home = PathBuf::from(val);
        }
        if let Ok(val) = env::var("CLAUDE_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        if let Ok(val) = env::var("CLAUDE_TIER") {
            if !val.trim().is_empty() {
                self.tracker.tier = val;
            }
        }

        // NO_COLOR disables color whenever it is set, per no-color.org
        if env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.display.no_color = true;
        }
        if let Ok(val) = env::var("VIBE_MONITOR_WIDTH") {
            self.display.width = val.parse().context("Invalid VIBE_MONITOR_WIDTH")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(20..=100).contains(&self.display.width) {
            return Err(anyhow::anyhow!(
                "Progress width must be between 20 and 100, got {}",
                self.display.width
            ));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log format '{}', expected one of {:?}",
                self.logging.format,
                LOG_FORMATS
            ));
        }

        if !LOG_OUTPUTS.contains(&self.logging.output.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log output '{}', expected one of {:?}",
                self.logging.output,
                LOG_OUTPUTS
            ));
        }

        if self.paths.claude_home.as_os_str().is_empty() {
            warn!("CLAUDE_HOME is empty, session lookup will use the working directory");
        }

        Ok(())
    }

    /// Directory holding per-project session transcripts
    pub fn projects_dir(&self) -> PathBuf {
        self.paths.claude_home.join("projects")
    }

    /// Credentials file written by the Claude Code login flow
    pub fn credentials_path(&self) -> PathBuf {
        self.paths.claude_home.join(".credentials.json")
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load the global configuration, returning file, environment or validation errors.
pub fn try_get_config() -> Result<&'static Config> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = Config::load()?;
    Ok(CONFIG.get_or_init(|| config))
}

/// Get the global configuration instance, falling back to defaults if it cannot be loaded
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| {
        Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load configuration, using defaults");
            Config::default()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "ERROR");
        assert_eq!(config.tracker.tier, "auto");
        assert_eq!(config.display.width, 42);
        assert!(config.paths.claude_home.ends_with(".claude"));
    }

    #[test]
    fn test_derived_paths() {
        let mut config = Config::default();
        config.paths.claude_home = PathBuf::from("/tmp/claude-home");
        assert_eq!(config.projects_dir(), PathBuf::from("/tmp/claude-home/projects"));
        assert_eq!(
            config.credentials_path(),
            PathBuf::from("/tmp/claude-home/.credentials.json")
        );
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.display.width = 10;
        assert!(config.validate().is_err());

        config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.logging.output = "syslog".to_string();
        assert!(config.validate().is_err());
    }
}
