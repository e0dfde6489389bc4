//! Configuration management for the demo MCP server
//!
//! Values come from environment variables and can be overridden on the
//! command line.

use crate::error::{ConfigError, Result};

/// Default server name advertised to clients
pub const DEFAULT_SERVER_NAME: &str = "Demo 🚀";

/// Default server version advertised to clients
pub const DEFAULT_SERVER_VERSION: &str = "1.0.0";

pub const ENV_SERVER_NAME: &str = "DEMO_MCP_SERVER_NAME";
pub const ENV_SERVER_VERSION: &str = "DEMO_MCP_SERVER_VERSION";
pub const ENV_PROMPTS: &str = "DEMO_MCP_PROMPTS";

/// Configuration for the demo MCP server
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Name reported in `serverInfo`
    pub server_name: String,

    /// Version reported in `serverInfo`
    pub server_version: String,

    /// Register the demo prompts and advertise the prompts capability
    pub enable_prompts: bool,
}

impl Config {
    /// Load configuration from the process environment
    pub fn new() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let server_name = lookup(ENV_SERVER_NAME).unwrap_or(defaults.server_name);
        let server_version = lookup(ENV_SERVER_VERSION).unwrap_or(defaults.server_version);

        let enable_prompts = match lookup(ENV_PROMPTS) {
            Some(raw) => parse_bool(ENV_PROMPTS, &raw)?,
            None => defaults.enable_prompts,
        };

        let config = Self {
            server_name,
            server_version,
            enable_prompts,
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides
    pub fn with_overrides(mut self, name: Option<String>, version: Option<String>) -> Result<Self> {
        if let Some(name) = name {
            self.server_name = name;
        }
        if let Some(version) = version {
            self.server_version = version;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.server_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "server name must not be empty".to_string(),
            }
            .into());
        }
        if self.server_version.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "server version must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            server_version: DEFAULT_SERVER_VERSION.to_string(),
            enable_prompts: true,
        }
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            message: format!("expected a boolean, got '{}'", raw),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::DemoMcpError;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server_name, "Demo 🚀");
        assert!(config.enable_prompts);
    }

    #[test]
    fn test_env_values() {
        let config = Config::from_lookup(lookup(&[
            (ENV_SERVER_NAME, "custom"),
            (ENV_SERVER_VERSION, "2.0.0"),
            (ENV_PROMPTS, "off"),
        ]))
        .unwrap();

        assert_eq!(config.server_name, "custom");
        assert_eq!(config.server_version, "2.0.0");
        assert!(!config.enable_prompts);
    }

    #[test]
    fn test_invalid_bool() {
        let err = Config::from_lookup(lookup(&[(ENV_PROMPTS, "maybe")])).unwrap_err();
        assert!(matches!(err, DemoMcpError::Config(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(Some("cli".to_string()), None)
            .unwrap();
        assert_eq!(config.server_name, "cli");
        assert_eq!(config.server_version, DEFAULT_SERVER_VERSION);

        assert!(Config::default().with_overrides(Some("  ".to_string()), None).is_err());
    }
}
