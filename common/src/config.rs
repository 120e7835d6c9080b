use serde::Deserialize;
use std::{error::Error, fs};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommonConfig {
    pub project_name: String,
    pub database_url: String,
    /// Create missing tables and indexes on startup.
    #[serde(default)]
    pub initialize_schema: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendConfig {
    pub server_address: String,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub common: CommonConfig,
    pub backend: BackendConfig,
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let contents = fs::read_to_string(config_path)?;
        let config = serde_yml::from_str(&contents)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let yaml = r#"
common:
  project_name: "shop-backend"
  database_url: "sqlite::memory:"
  initialize_schema: true
backend:
  server_address: "127.0.0.1:8000"
  log_level: "info"
"#;
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.common.project_name, "shop-backend");
        assert!(config.common.initialize_schema);
        assert_eq!(config.backend.server_address, "127.0.0.1:8000");
    }

    #[test]
    fn initialize_schema_defaults_to_false() {
        let yaml = r#"
common:
  project_name: "shop-backend"
  database_url: "sqlite::memory:"
backend:
  server_address: "127.0.0.1:8000"
  log_level: "debug"
"#;
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert!(!config.common.initialize_schema);
    }
}
