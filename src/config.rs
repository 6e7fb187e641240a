use serde::Deserialize;
use std::{env, fs};

/// Runtime configuration for the console tooling.
///
/// Loaded from a TOML file when one is given, otherwise assembled from
/// environment variables. Individual fields can always be overridden via
/// the environment, which is what deployments script against.
#[derive(Deserialize, Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the platform API, e.g. `https://iaas.example.com/api`.
    pub api_base_url: String,
    /// Path of the JSON file backing the persistent client storage.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Directory for rolling JSON log files; stdout only when unset.
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_storage_path() -> String {
    "console_storage.json".to_string()
}

impl ConsoleConfig {
    pub fn load(config_path: &str) -> Result<Self, String> {
        let raw = fs::read_to_string(config_path)
            .map_err(|err| format!("Failed to read config file '{config_path}': {err}"))?;
        let mut config = Self::parse(&raw)
            .map_err(|err| format!("Failed to parse config file '{config_path}': {err}"))?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_env() -> Result<Self, String> {
        let api_base_url =
            env::var("CONSOLE_API_URL").map_err(|_| "CONSOLE_API_URL must be set".to_string())?;
        let mut config = ConsoleConfig {
            api_base_url,
            storage_path: default_storage_path(),
            log_dir: None,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(api_base_url) = env::var("CONSOLE_API_URL") {
            self.api_base_url = api_base_url;
        }
        if let Ok(storage_path) = env::var("CONSOLE_STORAGE") {
            self.storage_path = storage_path;
        }
        if let Ok(log_dir) = env::var("CONSOLE_LOG_DIR") {
            self.log_dir = Some(log_dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml() {
        let config = ConsoleConfig::parse("api_base_url = \"http://localhost:5000/api\"").unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.storage_path, "console_storage.json");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn parses_full_toml() {
        let raw = r#"
api_base_url = "https://iaas.example.com/api"
storage_path = "/var/lib/console/storage.json"
log_dir = "logs"
"#;
        let config = ConsoleConfig::parse(raw).unwrap();
        assert_eq!(config.storage_path, "/var/lib/console/storage.json");
        assert_eq!(config.log_dir.as_deref(), Some("logs"));
    }

    #[test]
    fn rejects_config_without_api_url() {
        assert!(ConsoleConfig::parse("storage_path = \"x.json\"").is_err());
    }
}
