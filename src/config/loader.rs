//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::MonitorConfig;
use crate::config::validation::{validate_config, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<MonitorConfig, ConfigError> {
    let config: MonitorConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read and parse a TOML file without validating it.
///
/// For callers that adjust the config (e.g. from CLI flags) before calling
/// [`validate_config`] themselves.
pub fn read_config(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/node-health.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    fn temp_config(tag: &str, content: &str) -> std::path::PathBuf {
        let name = format!("node-health-{}-{}.toml", tag, std::process::id());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_config(
            "load",
            "[[nodes]]\nname = \"local\"\nrpc_url = \"http://127.0.0.1:8545\"\n",
        );

        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.nodes[0].name, "local");
    }

    #[test]
    fn test_read_config_skips_validation() {
        let path = temp_config("read", "[heartbeat]\ninterval_secs = 2\n");

        let config = read_config(&path).unwrap();
        let err = load_config(&path).unwrap_err();
        fs::remove_file(&path).unwrap();

        assert!(config.nodes.is_empty());
        assert_eq!(config.heartbeat.interval_secs, 2);
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("nodes = 3").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse config: "));
    }

    #[test]
    fn test_validation_errors_are_listed() {
        let err = parse_config("[heartbeat]\ninterval_secs = 0\n").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("invalid config: "));
        assert!(message.contains("nodes: at least one node is required"));
        assert!(message.contains("heartbeat.interval_secs"));
    }
}
