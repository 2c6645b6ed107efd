mod loader;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::transport::LogToggles;

pub use loader::load_config;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Proxy listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    1338
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Upstream service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Base URL every request is mirrored to (e.g. "https://api.example.com")
    #[serde(default = "default_upstream_url")]
    pub url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// TLS configuration options
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

/// TLS configuration for upstream connections
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Accept invalid certificates (self-signed, expired)
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Path to custom CA certificate (PEM format)
    pub ca_cert_path: Option<String>,
    /// Path to client certificate for mTLS
    pub client_cert_path: Option<String>,
    /// Path to client private key for mTLS
    pub client_key_path: Option<String>,
}

fn default_upstream_url() -> String {
    "http://example.com".to_string()
}

fn default_timeout() -> u64 {
    300
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            timeout_seconds: default_timeout(),
            tls: None,
        }
    }
}

impl UpstreamConfig {
    /// Returns the base URL with trailing slash stripped
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Returns true if the URL uses HTTPS
    pub fn is_tls(&self) -> bool {
        self.url.to_lowercase().starts_with("https://")
    }

    /// `host[:port]` to send as the Host header
    pub fn authority(&self) -> Option<String> {
        let url = url::Url::parse(&self.url).ok()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

/// Exchange record switches
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub requests: bool,
    #[serde(default = "default_true")]
    pub responses: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            requests: true,
            responses: true,
        }
    }
}

impl From<LoggingConfig> for LogToggles {
    fn from(config: LoggingConfig) -> Self {
        Self {
            requests: config.requests,
            responses: config.responses,
        }
    }
}

/// Values that take precedence over the config file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub target: Option<String>,
    pub port: Option<u16>,
    pub requests: Option<bool>,
    pub responses: Option<bool>,
}

impl Overrides {
    /// Read `TARGET`, `PORT`, `LOG_REQUESTS` and `LOG_RESPONSES` through `lookup`
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| {
                ConfigError::Validation(format!("PORT is not a valid port: {:?}", raw))
            })?),
            None => None,
        };

        Ok(Self {
            target: lookup("TARGET"),
            port,
            requests: lookup("LOG_REQUESTS").map(|v| parse_bool("LOG_REQUESTS", &v)).transpose()?,
            responses: lookup("LOG_RESPONSES").map(|v| parse_bool("LOG_RESPONSES", &v)).transpose()?,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Validation(format!("{} is not a boolean: {:?}", key, raw))),
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Load an explicitly requested file, or the default `config.yaml` when
    /// present, or built-in defaults
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => {
                let default_paths = ["config.yaml", "config.yml"];
                for p in default_paths {
                    let path = Path::new(p);
                    if path.exists() {
                        return Self::from_file(path);
                    }
                }
                Ok(Self::default())
            }
        }
    }

    /// Apply overrides on top of the loaded values
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(ref target) = overrides.target {
            self.upstream.url = target.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(requests) = overrides.requests {
            self.logging.requests = requests;
        }
        if let Some(responses) = overrides.responses {
            self.logging.responses = responses;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.upstream.url)
            .map_err(|e| ConfigError::Validation(format!("invalid upstream URL {:?}: {}", self.upstream.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "upstream URL must be http or https, got {:?}",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(ConfigError::Validation("upstream URL has no host".to_string()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation("listen port must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 1338);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.upstream.url, "http://example.com");
        assert_eq!(config.upstream.timeout_seconds, 300);
        assert!(config.logging.requests);
        assert!(config.logging.responses);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upstream_base_url_and_tls() {
        let config = UpstreamConfig {
            url: "https://api.example.com:8443/".to_string(),
            ..UpstreamConfig::default()
        };
        assert_eq!(config.base_url(), "https://api.example.com:8443");
        assert!(config.is_tls());
        assert_eq!(config.authority().as_deref(), Some("api.example.com:8443"));
    }

    #[test]
    fn test_authority_default_port_omitted() {
        let config = UpstreamConfig {
            url: "http://localhost:80/base".to_string(),
            ..UpstreamConfig::default()
        };
        assert_eq!(config.authority().as_deref(), Some("localhost"));
        assert!(!config.is_tls());
    }

    #[test]
    fn test_env_overrides() {
        let overrides = Overrides::from_env_with(env(&[
            ("TARGET", "http://upstream:9000"),
            ("PORT", "8080"),
            ("LOG_REQUESTS", "false"),
        ]))
        .unwrap();

        assert_eq!(overrides.target.as_deref(), Some("http://upstream:9000"));
        assert_eq!(overrides.port, Some(8080));
        assert_eq!(overrides.requests, Some(false));
        assert_eq!(overrides.responses, None);

        let mut config = AppConfig::default();
        config.apply(&overrides);
        assert_eq!(config.upstream.url, "http://upstream:9000");
        assert_eq!(config.server.port, 8080);
        assert!(!config.logging.requests);
        assert!(config.logging.responses);
    }

    #[test]
    fn test_env_empty_is_no_override() {
        let overrides = Overrides::from_env_with(env(&[])).unwrap();
        assert_eq!(overrides, Overrides::default());
    }

    #[test]
    fn test_env_invalid_values() {
        assert!(matches!(
            Overrides::from_env_with(env(&[("PORT", "http")])),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            Overrides::from_env_with(env(&[("LOG_RESPONSES", "maybe")])),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_later_overrides_win() {
        let mut config = AppConfig::default();
        config.apply(&Overrides {
            port: Some(2000),
            target: Some("http://from-env".to_string()),
            ..Overrides::default()
        });
        config.apply(&Overrides {
            port: Some(3000),
            ..Overrides::default()
        });
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.url, "http://from-env");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = AppConfig::default();
        config.upstream.url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.upstream.url = "ftp://files.example.com".to_string();
        assert!(config.validate().is_err());

        config.upstream.url = "http://ok.example.com".to_string();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_into_toggles() {
        let toggles: LogToggles = LoggingConfig {
            requests: false,
            responses: true,
        }
        .into();
        assert!(!toggles.requests);
        assert!(toggles.responses);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound("test.yaml".to_string());
        assert!(err.to_string().contains("test.yaml"));

        let err = ConfigError::Parse(serde_yaml::from_str::<AppConfig>("server: [").unwrap_err());
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_load_or_default_with_missing_path() {
        let result = AppConfig::load_or_default(Some(Path::new("/nonexistent/config.yaml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
