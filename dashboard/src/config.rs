use crate::services::spark_analyzer::alerts::{AlertEngineConfig, IcebergThresholds};
use crate::services::spark_analyzer::AlertType;
use crate::utils::AnalyzerError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub alerts: AlertConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Lowest severity reported: "warning" or "error"
    pub min_severity: String,
    pub max_alerts: usize,
    /// Files replaced above this share of the table raise `replacedMostOfIcebergTable`
    pub replaced_most_of_table_percentage: f64,
    /// Files replaced above, and records changed below, this share raise
    /// `inefficientIcebergReplaceTable`
    pub replaced_more_files_than_records_percentage: f64,
}

impl AlertConfig {
    pub fn to_engine_config(&self) -> Result<AlertEngineConfig, anyhow::Error> {
        let min_severity: AlertType =
            self.min_severity.parse().map_err(AnalyzerError::config)?;
        Ok(AlertEngineConfig {
            max_alerts: self.max_alerts,
            min_severity,
            iceberg: IcebergThresholds {
                replaced_most_of_table_percentage: self.replaced_most_of_table_percentage,
                replaced_more_files_than_records_percentage: self
                    .replaced_more_files_than_records_percentage,
            },
        })
    }
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from the given path, or conf/config.toml / config.toml
    /// 2. Override with environment variables (prefixed with APP_)
    /// 3. Validate the final configuration
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        // 1. Load from config file
        let mut config = match path {
            Some(path) => Self::from_toml(path)?,
            None => match Self::find_config_file() {
                Some(config_path) => Self::from_toml(&config_path)?,
                None => {
                    tracing::warn!("Configuration file not found, using defaults");
                    Config::default()
                },
            },
        };

        // 2. Override with environment variables
        config.apply_env_overrides();

        // 3. Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,spark_dashboard=debug")
    /// - APP_LOG_FILE: Log file path, daily rotated
    /// - APP_ALERTS_MIN_SEVERITY: "warning" or "error"
    /// - APP_ALERTS_MAX: Maximum number of alerts kept
    /// - APP_ALERTS_REPLACED_MOST_PCT: Most-of-table threshold (accepts "60" or "60%")
    /// - APP_ALERTS_REPLACED_FILES_PCT: Files-over-records threshold (accepts "30" or "30%")
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(file) = std::env::var("APP_LOG_FILE") {
            self.logging.file = if file.is_empty() { None } else { Some(file) };
            tracing::info!("Override logging.file from env: {:?}", self.logging.file);
        }

        if let Ok(severity) = std::env::var("APP_ALERTS_MIN_SEVERITY") {
            self.alerts.min_severity = severity;
            tracing::info!(
                "Override alerts.min_severity from env: {}",
                self.alerts.min_severity
            );
        }

        if let Ok(max) = std::env::var("APP_ALERTS_MAX")
            && let Ok(max) = max.parse()
        {
            self.alerts.max_alerts = max;
            tracing::info!("Override alerts.max_alerts from env: {}", self.alerts.max_alerts);
        }

        if let Ok(pct) = std::env::var("APP_ALERTS_REPLACED_MOST_PCT") {
            match parse_percentage(&pct) {
                Ok(val) => {
                    self.alerts.replaced_most_of_table_percentage = val;
                    tracing::info!("Override alerts.replaced_most_of_table_percentage from env: {}", val);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_ALERTS_REPLACED_MOST_PCT '{}': {} (keep {})",
                    pct,
                    e,
                    self.alerts.replaced_most_of_table_percentage
                ),
            }
        }

        if let Ok(pct) = std::env::var("APP_ALERTS_REPLACED_FILES_PCT") {
            match parse_percentage(&pct) {
                Ok(val) => {
                    self.alerts.replaced_more_files_than_records_percentage = val;
                    tracing::info!(
                        "Override alerts.replaced_more_files_than_records_percentage from env: {}",
                        val
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_ALERTS_REPLACED_FILES_PCT '{}': {} (keep {})",
                    pct,
                    e,
                    self.alerts.replaced_more_files_than_records_percentage
                ),
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.alerts.max_alerts == 0 {
            anyhow::bail!("alerts.max_alerts must be > 0");
        }

        for (name, value) in [
            (
                "alerts.replaced_most_of_table_percentage",
                self.alerts.replaced_most_of_table_percentage,
            ),
            (
                "alerts.replaced_more_files_than_records_percentage",
                self.alerts.replaced_more_files_than_records_percentage,
            ),
        ] {
            if !(value > 0.0 && value <= 100.0) {
                anyhow::bail!("{} must be in (0, 100], got {}", name, value);
            }
        }

        if self.alerts.min_severity.parse::<AlertType>().is_err() {
            anyhow::bail!(
                "alerts.min_severity must be \"warning\" or \"error\", got {:?}",
                self.alerts.min_severity
            );
        }

        Ok(())
    }

    fn find_config_file() -> Option<PathBuf> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        possible_paths.iter().map(PathBuf::from).find(|path| path.exists())
    }

    fn from_toml(path: &Path) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn from_toml_str(content: &str) -> Result<Self, anyhow::Error> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,spark_dashboard=debug".to_string(), file: None }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_severity: "warning".to_string(),
            max_alerts: 100,
            replaced_most_of_table_percentage: 60.0,
            replaced_more_files_than_records_percentage: 30.0,
        }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_percentage(input: &str) -> Result<f64, String> {
    let s = input.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim();
    s.parse::<f64>().map_err(|_| format!("invalid percentage: {}", input))
}
