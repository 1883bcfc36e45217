use crate::config::input::InputConfig;
use crate::error::{DashboardError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The airlines the breakdown selector offers when the config does not list any.
pub const DEFAULT_ENTITIES: &[&str] = &[
    "US Airways",
    "United",
    "American",
    "Southwest",
    "Delta",
    "Virgin America",
];

/// Represents the overall dashboard configuration read from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub input: InputConfig,
    /// Closed set of airlines accepted by the breakdown panel.
    /// Empty means [`DEFAULT_ENTITIES`].
    pub entities: Vec<String>,
    pub word_cloud: WordCloudConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WordCloudConfig {
    pub max_words: usize,
    pub min_word_length: usize,
    /// Replaces the built-in English stop words when set.
    pub stop_words: Option<Vec<String>>,
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        WordCloudConfig {
            max_words: 200,
            min_word_length: 2,
            stop_words: None,
            extra_stop_words: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub metrics_port: Option<u16>, // serve /metrics on a separate port as well
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:3000".to_string(),
            metrics_port: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
    pub directory: Option<String>, // daily rolling log files are written here when set
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.input.path.trim().is_empty() {
            return Err(DashboardError::ConfigValidationError(
                "input.path must not be empty".to_string(),
            ));
        }
        let columns = &self.input.columns;
        for (name, value) in [
            ("text", &columns.text),
            ("sentiment", &columns.sentiment),
            ("entity", &columns.entity),
            ("created_at", &columns.created_at),
        ] {
            if value.trim().is_empty() {
                return Err(DashboardError::ConfigValidationError(format!(
                    "input.columns.{} must not be empty",
                    name
                )));
            }
        }
        if let Some(0) = self.input.batch_size {
            return Err(DashboardError::ConfigValidationError(
                "input.batch_size must be greater than 0".to_string(),
            ));
        }
        if self.entities.iter().any(|e| e.trim().is_empty()) {
            return Err(DashboardError::ConfigValidationError(
                "entities must not contain empty names".to_string(),
            ));
        }
        if self.word_cloud.max_words == 0 {
            return Err(DashboardError::ConfigValidationError(
                "word_cloud.max_words must be greater than 0".to_string(),
            ));
        }
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(DashboardError::ConfigValidationError(format!(
                "server.bind '{}' is not a valid socket address",
                self.server.bind
            )));
        }
        Ok(())
    }

    /// The configured entity set, or the built-in airline list.
    pub fn known_entities(&self) -> Vec<String> {
        if self.entities.is_empty() {
            DEFAULT_ENTITIES.iter().map(|s| s.to_string()).collect()
        } else {
            self.entities.clone()
        }
    }
}

/// Loads and parses the dashboard configuration YAML file.
pub fn load_dashboard_config<P: AsRef<Path>>(config_path: P) -> Result<DashboardConfig> {
    let path_ref = config_path.as_ref();
    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        DashboardError::ConfigError(format!(
            "Failed to read dashboard config file '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    serde_yaml::from_str(&config_content).map_err(|e| {
        DashboardError::ConfigError(format!(
            "Failed to parse dashboard config YAML from '{}': {}",
            path_ref.display(),
            e
        ))
    })
}
