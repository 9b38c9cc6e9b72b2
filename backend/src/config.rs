//! Server configuration.
//!
//! Read from a YAML file (path in `SURVEY_ADMIN_CONFIG`, default `config.yaml`)
//! when it exists, then overridden by environment variables.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Admin account created at startup if it does not exist yet, so a fresh
    /// database can be administered.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted JSON body, in bytes. Ward and area polygons can be large.
    pub json_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            json_limit: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "survey_admin.sqlite".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub id: String,
    pub name: String,
}

impl Config {
    /// Priority: environment variables, then the config file, then defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("SURVEY_ADMIN_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("SURVEY_ADMIN_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("SURVEY_ADMIN_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("SURVEY_ADMIN_PORT", port))?;
        }

        if let Ok(limit) = std::env::var("SURVEY_ADMIN_JSON_LIMIT") {
            self.server.json_limit = limit
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("SURVEY_ADMIN_JSON_LIMIT", limit))?;
        }

        if let Ok(path) = std::env::var("SURVEY_ADMIN_DB") {
            self.storage.path = path;
        }

        Ok(())
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for {0}: '{1}'")]
    InvalidEnv(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.path, "survey_admin.sqlite");
        assert!(config.bootstrap_admin.is_none());
        assert_eq!(config.url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
server:
  host: 0.0.0.0
  port: 9000

storage:
  path: /var/lib/survey/admin.sqlite

bootstrap_admin:
  id: ADM-1
  name: Ward Office
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.json_limit, 10 * 1024 * 1024);
        assert_eq!(config.storage.path, "/var/lib/survey/admin.sqlite");
        let admin = config.bootstrap_admin.unwrap();
        assert_eq!(admin.id, "ADM-1");
        assert_eq!(admin.name, "Ward Office");
    }

    #[test]
    fn test_parse_yaml_rejects_garbage() {
        let err = Config::from_yaml("server: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
