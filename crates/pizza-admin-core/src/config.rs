//! Configuration management for pizza-admin

use crate::access::{AccessScope, Grant};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `PIZZA_ADMIN__API__BASE_URL`
pub const ENV_PREFIX: &str = "PIZZA_ADMIN";

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pizza-admin";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote entity API
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Capability grants used when no authorization service is wired in
    #[serde(default)]
    pub access: AccessConfig,
}

/// Remote entity API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the entity paths are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Access configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Grant every capability, ignoring `grants`
    #[serde(default = "default_allow_all")]
    pub allow_all: bool,

    /// Scope pages ask capabilities at
    #[serde(default)]
    pub scope: AccessScope,

    /// Individual grants
    #[serde(default)]
    pub grants: Vec<Grant>,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

const fn default_timeout_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const fn default_allow_all() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allow_all: default_allow_all(),
            scope: AccessScope::default(),
            grants: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from `pizza-admin.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file, falling back to the default
    /// file name, layered under `PIZZA_ADMIN__*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any source fails to parse.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        tracing::debug!(
            base_url = %config.api.base_url,
            allow_all = config.access.allow_all,
            grants = config.access.grants.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Check values that serde defaults cannot guard
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the offending key.
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(crate::Error::configuration(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_seconds == 0 {
            return Err(crate::Error::configuration(
                "api.timeout_seconds must be greater than zero",
            ));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(crate::Error::configuration(format!(
                "logging.format must be 'json' or 'pretty', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::access::AccessOperation;
    use crate::types::EntityKind;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert!(config.api.api_key.is_none());
        assert_eq!(config.api.timeout_seconds, 30);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");

        assert!(config.access.allow_all);
        assert_eq!(config.access.scope, AccessScope::Project);
        assert!(config.access.grants.is_empty());

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_deserialization() {
        let json_str = r#"{
            "api": {"base_url": "https://admin.example.com/api"},
            "access": {"allow_all": false}
        }"#;

        let config: Config = serde_json::from_str(json_str).unwrap();

        assert_eq!(config.api.base_url, "https://admin.example.com/api");
        assert_eq!(config.api.timeout_seconds, 30); // Uses default
        assert_eq!(config.logging.level, "info"); // Uses default
        assert!(!config.access.allow_all);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "http://127.0.0.1:9000"
api_key = "secret"
timeout_seconds = 5

[logging]
level = "debug"
format = "json"

[access]
allow_all = false

[[access.grants]]
entity = "menu_item"
operations = ["read", "update"]
"#
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();

        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.api.api_key.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout_seconds, 5);
        assert_eq!(config.logging.format, "json");
        assert!(!config.access.allow_all);
        assert_eq!(
            config.access.grants,
            vec![Grant {
                entity: EntityKind::MenuItem,
                operations: vec![AccessOperation::Read, AccessOperation::Update],
                scope: AccessScope::Project,
            }]
        );
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = Config::load_from(Some(Path::new("/nonexistent/pizza-admin.toml")));
        assert!(matches!(result, Err(crate::Error::Configuration { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.api.base_url = "localhost:3000".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();

        let serialized = serde_json::to_string(&config).unwrap();
        assert!(!serialized.contains("api_key"));

        let deserialized: Config = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, config);
    }
}
