use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct QMemoryConfig {
    pub server: ServerConfig,
    pub analysis: AnalysisConfig,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Front-end origins allowed by CORS. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    pub attempt_timeout_secs: u64,
    /// Base URL of the quantum analysis backend. Unset skips that source.
    pub quantum_backend_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Full URL of the secondary backend AI route. Unset skips that source.
    pub secondary_backend_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub nominatim_url: String,
    pub user_agent: String,
    pub unsplash_access_key: Option<String>,
    pub unsplash_url: String,
    pub wikipedia_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub min_request_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8010,
            log_level: "info".into(),
            cors_origins: vec![
                "http://localhost:3000".into(),
                "http://localhost:3001".into(),
                "http://127.0.0.1:3000".into(),
                "http://127.0.0.1:3001".into(),
            ],
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: 10,
            quantum_backend_url: None,
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash-latest".into(),
            gemini_base_url: "https://generativelanguage.googleapis.com".into(),
            secondary_backend_url: None,
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            nominatim_url: "https://nominatim.openstreetmap.org".into(),
            user_agent: concat!("qmemory/", env!("CARGO_PKG_VERSION"), " (memory location recall)")
                .into(),
            unsplash_access_key: None,
            unsplash_url: "https://api.unsplash.com".into(),
            wikipedia_url: "https://en.wikipedia.org/api/rest_v1".into(),
            timeout_secs: 8,
            cache_ttl_secs: 3600,
            min_request_interval_ms: 1000,
        }
    }
}

impl AnalysisConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs.max(1))
    }
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

/// Returns `~/.qmemory/`, or `./.qmemory/` when there is no home directory.
pub fn default_qmemory_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".qmemory")
}

/// Returns the default config file path: `~/.qmemory/config.toml`
pub fn default_config_path() -> PathBuf {
    default_qmemory_dir().join("config.toml")
}

impl QMemoryConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            QMemoryConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("QMEMORY_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("QMEMORY_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid QMEMORY_PORT"),
            }
        }
        if let Ok(val) = std::env::var("QMEMORY_BACKEND_URL") {
            self.analysis.quantum_backend_url = Some(val);
        }
        if let Ok(val) = std::env::var("QMEMORY_SECONDARY_URL") {
            self.analysis.secondary_backend_url = Some(val);
        }
        if let Ok(val) = std::env::var("GEMINI_API_KEY") {
            self.analysis.gemini_api_key = Some(val);
        }
        if let Ok(val) = std::env::var("UNSPLASH_ACCESS_KEY") {
            self.enrichment.unsplash_access_key = Some(val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = QMemoryConfig::default();
        assert_eq!(config.server.port, 8010);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.analysis.attempt_timeout(), Duration::from_secs(10));
        assert!(config.analysis.quantum_backend_url.is_none());
        assert!(config.enrichment.enabled);
        assert!(config.enrichment.user_agent.starts_with("qmemory/"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
port = 9000

[analysis]
quantum_backend_url = "http://localhost:8010"
attempt_timeout_secs = 8

[enrichment]
enabled = false
"#;
        let config: QMemoryConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.analysis.quantum_backend_url.as_deref(),
            Some("http://localhost:8010")
        );
        assert_eq!(config.analysis.attempt_timeout_secs, 8);
        assert!(!config.enrichment.enabled);
        // defaults still apply for unset fields
        assert_eq!(config.analysis.gemini_model, "gemini-1.5-flash-latest");
        assert_eq!(config.enrichment.cache_ttl_secs, 3600);
    }

    #[test]
    fn zero_timeouts_are_floored() {
        let mut config = QMemoryConfig::default();
        config.analysis.attempt_timeout_secs = 0;
        config.enrichment.timeout_secs = 0;
        assert_eq!(config.analysis.attempt_timeout(), Duration::from_secs(1));
        assert_eq!(config.enrichment.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = QMemoryConfig::default();
        std::env::set_var("QMEMORY_LOG_LEVEL", "trace");
        std::env::set_var("QMEMORY_PORT", "9123");
        std::env::set_var("QMEMORY_BACKEND_URL", "http://backend:8010");
        std::env::set_var("GEMINI_API_KEY", "test-key");

        config.apply_env_overrides();

        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.server.port, 9123);
        assert_eq!(
            config.analysis.quantum_backend_url.as_deref(),
            Some("http://backend:8010")
        );
        assert_eq!(config.analysis.gemini_api_key.as_deref(), Some("test-key"));

        // Clean up
        std::env::remove_var("QMEMORY_LOG_LEVEL");
        std::env::remove_var("QMEMORY_PORT");
        std::env::remove_var("QMEMORY_BACKEND_URL");
        std::env::remove_var("GEMINI_API_KEY");
    }

    #[test]
    fn load_from_file_and_missing_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[analysis]\nattempt_timeout_secs = 4\n\n[enrichment]\ncache_ttl_secs = 60\n",
        )
        .unwrap();

        let config = QMemoryConfig::load_from(&path).unwrap();
        assert_eq!(config.analysis.attempt_timeout(), Duration::from_secs(4));
        assert_eq!(config.enrichment.cache_ttl(), Duration::from_secs(60));

        let missing = QMemoryConfig::load_from(tmp.path().join("nope.toml")).unwrap();
        assert_eq!(missing.analysis.attempt_timeout_secs, 10);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(QMemoryConfig::load_from(&path).is_err());
    }
}
