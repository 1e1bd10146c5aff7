//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.m2index.toml` files.

use crate::cli::{Mode, OutputFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".m2index.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Record store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Name recorded as responsible for new listings.
    #[serde(default)]
    pub responsible: String,

    /// Visitor mode hides admin details in listings.
    #[serde(default)]
    pub mode: Mode,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            responsible: String::new(),
            mode: Mode::default(),
        }
    }
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON listing store.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "m2_listings.json".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Currency prefix for prices.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Include the value-history chart when there is more than one point.
    #[serde(default = "default_true")]
    pub include_chart: bool,

    /// Width of the chart polyline box.
    #[serde(default = "default_chart_width")]
    pub chart_width: f64,

    /// Height of the chart polyline box.
    #[serde(default = "default_chart_height")]
    pub chart_height: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
            currency: default_currency(),
            include_chart: true,
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
        }
    }
}

fn default_output() -> String {
    "m2_report.md".to_string()
}

fn default_currency() -> String {
    "R$".to_string()
}

fn default_true() -> bool {
    true
}

fn default_chart_width() -> f64 {
    170.0
}

fn default_chart_height() -> f64 {
    40.0
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref responsible) = args.responsible {
            self.general.responsible = responsible.clone();
        }

        if let Some(mode) = args.mode {
            self.general.mode = mode;
        }

        if let Some(ref store) = args.store {
            self.store.path = store.display().to_string();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command};
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.path, "m2_listings.json");
        assert_eq!(config.report.currency, "R$");
        assert_eq!(config.general.mode, Mode::Visitor);
        assert!(config.general.responsible.is_empty());
        assert!(config.report.include_chart);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
responsible = "Marina"
mode = "admin"

[store]
path = "data/listings.json"

[report]
format = "json"
include_chart = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.responsible, "Marina");
        assert_eq!(config.general.mode, Mode::Admin);
        assert_eq!(config.store.path, "data/listings.json");
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(!config.report.include_chart);
        assert_eq!(config.report.output, "m2_report.md");
        assert_eq!(config.report.chart_width, 170.0);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.general.responsible = "Marina".to_string();

        let args = Args {
            command: Command::Summary,
            config: None,
            store: Some(PathBuf::from("other.json")),
            responsible: None,
            mode: Some(Mode::Admin),
            verbose: true,
            quiet: false,
        };
        config.merge_with_args(&args);

        assert_eq!(config.general.responsible, "Marina");
        assert_eq!(config.general.mode, Mode::Admin);
        assert_eq!(config.store.path, "other.json");
    }

    #[test]
    fn test_logging_level_is_cli_only() {
        assert!(!Config::default_toml().contains("verbose"));

        // Older files with a verbose switch still load.
        let config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        assert_eq!(config.general.mode, Mode::Visitor);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.store.path, "m2_listings.json");
    }
}
