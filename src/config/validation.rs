//! Configuration validation.
//!
//! Serde handles syntax; this checks meaning. Every problem is reported,
//! not just the first.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::MonitorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.nodes.is_empty() {
        errors.push(ValidationError::new("nodes", "at least one node is required"));
    }

    let mut seen = HashSet::new();
    for (i, node) in config.nodes.iter().enumerate() {
        let field = format!("nodes[{}]", i);
        if node.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("{}.name", field), "must not be empty"));
        } else if !seen.insert(node.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.name", field),
                format!("duplicate node name '{}'", node.name),
            ));
        }

        if let Err(message) = check_rpc_url(&node.rpc_url) {
            errors.push(ValidationError::new(format!("{}.rpc_url", field), message));
        }
    }

    let hb = &config.heartbeat;
    if hb.interval_secs == 0 {
        errors.push(ValidationError::new("heartbeat.interval_secs", "must be greater than 0"));
    }
    if hb.failure_window_secs == 0 {
        errors.push(ValidationError::new(
            "heartbeat.failure_window_secs",
            "must be greater than 0",
        ));
    }
    if hb.poll_timeout_secs == Some(0) {
        errors.push(ValidationError::new("heartbeat.poll_timeout_secs", "must be greater than 0"));
    }
    if hb.dial_timeout_secs == 0 {
        errors.push(ValidationError::new("heartbeat.dial_timeout_secs", "must be greater than 0"));
    }
    if let Some(retention) = hb.failure_retention_secs {
        if retention < hb.failure_window_secs {
            errors.push(ValidationError::new(
                "heartbeat.failure_retention_secs",
                format!(
                    "{} is shorter than failure_window_secs ({})",
                    retention, hb.failure_window_secs
                ),
            ));
        }
    }

    if config.status.enabled && config.status.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("status.bind_address", "not a socket address"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_rpc_url(raw: &str) -> Result<(), String> {
    if raw.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    // Scheme-less values are IPC paths.
    if !raw.contains("://") {
        return Ok(());
    }
    let url = url::Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" | "ws" | "wss" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::NodeConfig;

    fn node(name: &str, url: &str) -> NodeConfig {
        NodeConfig {
            name: name.to_string(),
            rpc_url: url.to_string(),
            chain_id: None,
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = MonitorConfig::default();
        config.nodes.push(node("a", "http://localhost:8545"));
        config.nodes.push(node("b", "/tmp/geth.ipc"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = MonitorConfig::default();
        config.nodes.push(node("a", "ftp://x"));
        config.nodes.push(node("a", "http://localhost:8545"));
        config.nodes.push(node("", ""));
        config.heartbeat.interval_secs = 0;
        config.heartbeat.failure_window_secs = 7200;
        config.status.enabled = true;
        config.status.bind_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "nodes[0].rpc_url",
                "nodes[1].name",
                "nodes[2].name",
                "nodes[2].rpc_url",
                "heartbeat.interval_secs",
                "heartbeat.failure_retention_secs",
                "status.bind_address",
            ]
        );
    }

    #[test]
    fn test_empty_node_list_rejected() {
        let errors = validate_config(&MonitorConfig::default()).unwrap_err();
        assert_eq!(errors[0].to_string(), "nodes: at least one node is required");
    }
}
