//! Global configuration loader for Questline.
//!
//! Reads `config.toml` from the data directory (`~/.questline/` in
//! production) and deserializes it into [`AppConfig`]. Falls back to
//! sensible defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use questline_types::config::EngineConfig;
use serde::{Deserialize, Serialize};

/// Application configuration: storage location plus the engine's
/// scheduling parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the default `{data_dir}/questline.db` database.
    pub database_url: Option<String>,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// The effective database URL for this data directory.
    pub fn database_url(&self, data_dir: &Path) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| default_database_url(data_dir))
    }
}

/// Resolve the data directory: `QUESTLINE_DATA_DIR` env var, falling back
/// to `~/.questline`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("QUESTLINE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".questline")
}

pub fn default_database_url(data_dir: &Path) -> String {
    format!("sqlite://{}/questline.db?mode=rwc", data_dir.display())
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the
///   default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.engine.interval_minutes, 30);
        assert!(config.database_url.is_none());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
database_url = "sqlite://custom.db"

[engine]
interval_minutes = 20
lead_minutes = 10
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.database_url.as_deref(), Some("sqlite://custom.db"));
        assert_eq!(config.engine.interval_minutes, 20);
        assert_eq!(config.engine.lead_minutes, 10);
        // Untouched field keeps its default.
        assert_eq!(config.engine.instruction_hours, 4);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.engine.interval_minutes, 30);
    }

    #[test]
    fn database_url_prefers_override() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig {
            database_url: Some("sqlite://elsewhere.db".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.database_url(tmp.path()), "sqlite://elsewhere.db");

        let config = AppConfig::default();
        assert!(config.database_url(tmp.path()).ends_with("/questline.db?mode=rwc"));
    }
}
