//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, a JSON configuration file, or
//! defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::domains::open_data::client::{DEFAULT_MAX_PAGES, DEFAULT_TIMEOUT_SECS};

/// Environment variable holding the data.go.kr service key.
pub const SERVICE_KEY_ENV: &str = "OPENAPI_KOREA_SERVICE_KEY";

/// Default location of the JSON configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Key value shipped in the sample configuration file.
const PLACEHOLDER_SERVICE_KEY: &str = "YOUR_SERVICE_KEY_HERE";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Open-data API credentials.
    pub credentials: CredentialsConfig,

    /// Upstream fetch behaviour.
    pub fetch: FetchConfig,

    /// Category cache behaviour.
    pub cache: CacheConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Where the service key was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    Environment,
    ConfigFile,
}

/// Configuration for the data.go.kr credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Service key issued by data.go.kr.
    pub service_key: Option<String>,

    /// Lookup that produced `service_key`.
    pub key_source: Option<KeySource>,

    /// JSON file consulted when the environment has no key.
    pub config_file: Option<PathBuf>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "service_key",
                &self.service_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("key_source", &self.key_source)
            .field("config_file", &self.config_file)
            .finish()
    }
}

impl CredentialsConfig {
    /// The configured key, if any.
    pub fn service_key(&self) -> Option<&str> {
        self.service_key.as_deref()
    }

    /// Resolve the key: the environment value first, then the `serviceKey`
    /// field of `config_file`. Blank and placeholder keys are ignored.
    pub fn resolve(env_value: Option<String>, config_file: &Path) -> Self {
        let from_env = env_value
            .filter(|key| is_usable_key(key))
            .map(|key| (key, KeySource::Environment));

        let found = from_env.or_else(|| {
            read_key_file(config_file)
                .filter(|key| is_usable_key(key))
                .map(|key| (key, KeySource::ConfigFile))
        });

        let (service_key, key_source) = match found {
            Some((key, source)) => (Some(key.trim().to_string()), Some(source)),
            None => (None, None),
        };

        Self {
            service_key,
            key_source,
            config_file: Some(config_file.to_path_buf()),
        }
    }
}

fn is_usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_SERVICE_KEY
}

/// Shape of the JSON configuration file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "serviceKey")]
    service_key: Option<String>,
}

fn read_key_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<ConfigFile>(&content) {
        Ok(file) => file.service_key,
        Err(e) => {
            warn!("Ignoring unreadable config file {}: {}", path.display(), e);
            None
        }
    }
}

/// Configuration for upstream fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Upper bound on pages walked when loading a complete dataset.
    pub max_pages: u32,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Configuration for the category cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum age of a servable entry. `None` keeps entries until refreshed.
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "openapi-korea".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            credentials: CredentialsConfig::default(),
            fetch: FetchConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server settings use the `MCP_` prefix, for example `MCP_SERVER_NAME`
    /// or `MCP_FETCH_TIMEOUT_SECS`. The service key is read from
    /// `OPENAPI_KOREA_SERVICE_KEY`, falling back to the file named by
    /// `MCP_CONFIG_FILE`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        if let Some(timeout) = parse_env("MCP_FETCH_TIMEOUT_SECS") {
            config.fetch.timeout_secs = timeout;
        }
        if let Some(max_pages) = parse_env("MCP_FETCH_MAX_PAGES") {
            config.fetch.max_pages = max_pages;
        }

        config.cache.ttl_secs = parse_env("MCP_CACHE_TTL_SECS");

        let config_file = std::env::var("MCP_CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        config.credentials =
            CredentialsConfig::resolve(std::env::var(SERVICE_KEY_ENV).ok(), &config_file);

        match config.credentials.key_source {
            Some(KeySource::Environment) => info!("Service key loaded from {}", SERVICE_KEY_ENV),
            Some(KeySource::ConfigFile) => {
                info!("Service key loaded from {}", config_file.display())
            }
            None => warn!(
                "No service key found. Set {} or serviceKey in {}; \
                 every fetch will fail until one is configured",
                SERVICE_KEY_ENV,
                config_file.display()
            ),
        }

        config
    }
}

pub(crate) fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn key_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_key_wins_over_file() {
        let file = key_file(r#"{"serviceKey": "from-file"}"#);
        let creds = CredentialsConfig::resolve(Some("from-env".to_string()), file.path());
        assert_eq!(creds.service_key(), Some("from-env"));
        assert_eq!(creds.key_source, Some(KeySource::Environment));
    }

    #[test]
    fn test_file_key_used_when_env_missing() {
        let file = key_file(r#"{"serviceKey": " from-file "}"#);
        let creds = CredentialsConfig::resolve(None, file.path());
        assert_eq!(creds.service_key(), Some("from-file"));
        assert_eq!(creds.key_source, Some(KeySource::ConfigFile));

        let creds = CredentialsConfig::resolve(Some("   ".to_string()), file.path());
        assert_eq!(creds.key_source, Some(KeySource::ConfigFile));
    }

    #[test]
    fn test_placeholder_and_missing_keys() {
        let file = key_file(r#"{"serviceKey": "YOUR_SERVICE_KEY_HERE"}"#);
        assert!(CredentialsConfig::resolve(None, file.path()).service_key().is_none());

        let file = key_file("not json");
        assert!(CredentialsConfig::resolve(None, file.path()).service_key().is_none());

        let dir = tempfile::tempdir().unwrap();
        let creds = CredentialsConfig::resolve(None, &dir.path().join("absent.json"));
        assert!(creds.service_key().is_none());
        assert!(creds.key_source.is_none());
    }

    #[test]
    fn test_credentials_redacted_in_debug() {
        let creds = CredentialsConfig {
            service_key: Some("super_secret_key".to_string()),
            ..Default::default()
        };
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
    }

    #[test]
    fn test_from_env_reads_fetch_and_cache_settings() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        unsafe {
            std::env::set_var(SERVICE_KEY_ENV, "test_key_12345");
            std::env::set_var("MCP_CONFIG_FILE", dir.path().join("config.json"));
            std::env::set_var("MCP_FETCH_TIMEOUT_SECS", "3");
            std::env::set_var("MCP_FETCH_MAX_PAGES", "not-a-number");
            std::env::set_var("MCP_CACHE_TTL_SECS", "600");
        }

        let config = Config::from_env();
        assert_eq!(config.credentials.service_key(), Some("test_key_12345"));
        assert_eq!(config.fetch.timeout(), Duration::from_secs(3));
        assert_eq!(config.fetch.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(600)));

        unsafe {
            std::env::remove_var(SERVICE_KEY_ENV);
            std::env::remove_var("MCP_CONFIG_FILE");
            std::env::remove_var("MCP_FETCH_TIMEOUT_SECS");
            std::env::remove_var("MCP_FETCH_MAX_PAGES");
            std::env::remove_var("MCP_CACHE_TTL_SECS");
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.server.name, "openapi-korea");
        assert!(config.credentials.service_key().is_none());
        assert_eq!(config.fetch.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.cache.ttl().is_none());
    }
}
