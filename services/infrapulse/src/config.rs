//! Configuration types for the infrapulse service
//!
//! Configuration is split across two YAML files that live side by side:
//! the server inventory (`servers.yaml`) and the private alerting settings
//! (`config.yaml`). A missing private file only disables email alerts.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::InfraPulseError;

/// Name of the private settings file, looked up next to the servers file
pub const PRIVATE_CONFIG_FILE: &str = "config.yaml";

/// Interval used when neither the command line nor the config sets one
pub const DEFAULT_CHECK_INTERVAL: &str = "60s";

/// A named host and the TCP ports to check on it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Target {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub ports: Vec<u16>,
}

/// SMTP relay settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl SmtpConfig {
    /// Alerting is enabled only when a relay host is set
    pub fn is_enabled(&self) -> bool {
        !self.host.trim().is_empty()
    }
}

/// Merged configuration from both files
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub servers: Vec<Target>,
    #[serde(default)]
    pub check_interval: Option<String>,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub alert_recipient: String,
}

#[derive(Debug, Deserialize)]
struct ServersFile {
    #[serde(default)]
    servers: Vec<Target>,
    #[serde(default)]
    check_interval: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PrivateFile {
    #[serde(default)]
    smtp: SmtpConfig,
    #[serde(default)]
    alert_recipient: String,
}

fn default_smtp_port() -> u16 {
    587
}

/// Default location of the servers file: `~/.config/infrapulse/servers.yaml`
pub fn default_servers_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("infrapulse").join("servers.yaml"))
}

/// Path of the private settings file that belongs to `servers_path`
pub fn private_config_path(servers_path: &Path) -> PathBuf {
    servers_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(PRIVATE_CONFIG_FILE)
}

/// Load the servers file and its sibling private settings file
pub fn load_config(servers_path: &Path) -> crate::Result<Config> {
    load_config_pair(servers_path, &private_config_path(servers_path))
}

/// Load and merge an explicit pair of configuration files
pub fn load_config_pair(servers_path: &Path, private_path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(servers_path).map_err(|e| {
        InfraPulseError::Config(format!("Failed to read {:?}: {}", servers_path, e))
    })?;
    let servers: ServersFile = serde_yaml::from_str(&content).map_err(|e| {
        InfraPulseError::Config(format!("Failed to parse {:?}: {}", servers_path, e))
    })?;

    let private = match std::fs::read_to_string(private_path) {
        Ok(content) => serde_yaml::from_str::<PrivateFile>(&content).map_err(|e| {
            InfraPulseError::Config(format!("Failed to parse {:?}: {}", private_path, e))
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No private config at {:?}, email alerts disabled",
                private_path
            );
            PrivateFile::default()
        }
        Err(e) => {
            return Err(InfraPulseError::Config(format!(
                "Failed to read {:?}: {}",
                private_path, e
            )))
        }
    };

    Ok(Config {
        servers: servers.servers,
        check_interval: servers.check_interval,
        smtp: private.smtp,
        alert_recipient: private.alert_recipient,
    })
}

/// Resolve the loop interval: command line override, then config, then default
pub fn resolve_interval(
    override_value: Option<&str>,
    configured: Option<&str>,
) -> crate::Result<Duration> {
    let value = [override_value, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(DEFAULT_CHECK_INTERVAL);

    let duration =
        humantime::parse_duration(value).map_err(|e| InfraPulseError::InvalidInterval {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

    if duration.is_zero() {
        return Err(InfraPulseError::InvalidInterval {
            value: value.to_string(),
            reason: "interval must be greater than zero".to_string(),
        });
    }

    Ok(duration)
}
