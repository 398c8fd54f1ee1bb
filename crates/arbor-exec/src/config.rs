//! Execution configuration.
//!
//! Values come from defaults, then an optional YAML file, then `ARBOR_*`
//! environment variables; later sources win. The merged result is
//! validated before use.

use arbor_hal::HalError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings of the execution core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecConfig {
    /// Process-wide cap on simultaneously executing experiments
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_executions: usize,

    /// Shots used when the job description does not set any
    #[serde(default = "default_shots")]
    pub default_shots: u32,

    /// Largest shot count a job may request
    #[serde(default = "default_max_shots")]
    pub max_shots: u32,

    /// Largest experiment the backend accepts
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,

    /// Default timeout for `wait` and `result`, in seconds
    #[serde(default)]
    pub wait_timeout_secs: Option<u64>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `-v` is not given
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `console` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_max_concurrent() -> usize {
    1
}

fn default_shots() -> u32 {
    arbor_hal::DEFAULT_SHOTS
}

fn default_max_shots() -> u32 {
    65536
}

fn default_max_qubits() -> usize {
    32
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ExecConfig {
    fn default() -> Self {
        ExecConfig {
            max_concurrent_executions: default_max_concurrent(),
            default_shots: default_shots(),
            max_shots: default_max_shots(),
            max_qubits: default_max_qubits(),
            wait_timeout_secs: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ExecConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: ExecConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `config_file` if given, then apply environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => ExecConfig::default(),
        };

        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration.
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge variables from `lookup` into this configuration.
    ///
    /// Only variables that are set override the current values; unparsable
    /// numbers are ignored.
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("ARBOR_MAX_CONCURRENT").and_then(|v| v.parse().ok()) {
            self.max_concurrent_executions = val;
        }
        if let Some(val) = lookup("ARBOR_DEFAULT_SHOTS").and_then(|v| v.parse().ok()) {
            self.default_shots = val;
        }
        if let Some(val) = lookup("ARBOR_MAX_SHOTS").and_then(|v| v.parse().ok()) {
            self.max_shots = val;
        }
        if let Some(val) = lookup("ARBOR_MAX_QUBITS").and_then(|v| v.parse().ok()) {
            self.max_qubits = val;
        }
        if let Some(val) = lookup("ARBOR_WAIT_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.wait_timeout_secs = Some(val);
        }

        // Logging
        if let Some(v) = lookup("ARBOR_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("ARBOR_LOG_FORMAT") {
            self.logging.format = v;
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_executions == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent_executions must be greater than 0".to_string(),
            ));
        }
        if self.default_shots == 0 || self.max_shots == 0 {
            return Err(ConfigError::ValidationError(
                "shot counts must be greater than 0".to_string(),
            ));
        }
        if self.default_shots > self.max_shots {
            return Err(ConfigError::ValidationError(format!(
                "default_shots ({}) exceeds max_shots ({})",
                self.default_shots, self.max_shots
            )));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        Ok(())
    }

    /// Default wait timeout, if configured.
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_secs.map(Duration::from_secs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for HalError {
    fn from(e: ConfigError) -> Self {
        HalError::Configuration(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ExecConfig::default();
        assert_eq!(config.max_concurrent_executions, 1);
        assert_eq!(config.default_shots, 1024);
        assert_eq!(config.max_shots, 65536);
        assert_eq!(config.logging.level, "info");
        assert!(config.wait_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "max_concurrent_executions: 4\nwait_timeout_secs: 30\nlogging:\n  format: json"
        )
        .unwrap();

        let config = ExecConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_concurrent_executions, 4);
        assert_eq!(config.wait_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.default_shots, 1024);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_concurrent_executions: 0").unwrap();
        assert!(matches!(
            ExecConfig::from_file(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_from_file_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_shots: [not, a, number]").unwrap();
        assert!(matches!(
            ExecConfig::from_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ExecConfig::from_file("/nonexistent/arbor.yaml"),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = ExecConfig::default().merge_vars(vars(&[
            ("ARBOR_MAX_CONCURRENT", "3"),
            ("ARBOR_DEFAULT_SHOTS", "100"),
            ("ARBOR_WAIT_TIMEOUT", "5"),
            ("ARBOR_LOG_LEVEL", "debug"),
            ("ARBOR_MAX_SHOTS", "lots"),
        ]));
        assert_eq!(config.max_concurrent_executions, 3);
        assert_eq!(config.default_shots, 100);
        assert_eq!(config.wait_timeout_secs, Some(5));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.max_shots, 65536);
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = ExecConfig::default();
        config.default_shots = 100_000;
        assert!(config.validate().is_err());

        let mut config = ExecConfig::default();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());

        let mut config = ExecConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_error_into_hal_error() {
        let err: HalError = ConfigError::ValidationError("bad".into()).into();
        assert!(matches!(err, HalError::Configuration(msg) if msg.contains("bad")));
    }
}
