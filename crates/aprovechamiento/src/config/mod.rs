use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use url::Url;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
    pub policy: PolicyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let source = match (non_empty_var("APP_CATALOG_URL"), non_empty_var("APP_CATALOG_PATH")) {
            (Some(raw), _) => CatalogSource::Remote(
                Url::parse(&raw).map_err(|source| ConfigError::InvalidCatalogUrl { source })?,
            ),
            (None, Some(path)) => CatalogSource::File(PathBuf::from(path)),
            (None, None) => CatalogSource::Builtin,
        };
        let timeout_secs = numeric_var("APP_CATALOG_TIMEOUT_SECS", 10)?;
        let cache_ttl_secs = numeric_var("APP_CATALOG_CACHE_TTL_SECS", 300)?;

        let unit_policy_path = non_empty_var("APP_UNIT_POLICY_PATH").map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            catalog: CatalogConfig {
                source,
                timeout_secs,
                cache_ttl_secs,
            },
            policy: PolicyConfig { unit_policy_path },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn numeric_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match non_empty_var(name) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name }),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where treatment parameters come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    File(PathBuf),
    Remote(Url),
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub source: CatalogSource,
    pub timeout_secs: u64,
    /// Zero disables caching of remote listings.
    pub cache_ttl_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSource::Builtin,
            timeout_secs: 10,
            cache_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PolicyConfig {
    pub unit_policy_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCatalogUrl { source: url::ParseError },
    InvalidNumber { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCatalogUrl { source } => {
                write!(f, "APP_CATALOG_URL must be an absolute URL ({})", source)
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{} must be a non-negative integer", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidCatalogUrl { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_CATALOG_URL",
            "APP_CATALOG_PATH",
            "APP_CATALOG_TIMEOUT_SECS",
            "APP_CATALOG_CACHE_TTL_SECS",
            "APP_UNIT_POLICY_PATH",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.catalog.source, CatalogSource::Builtin);
        assert_eq!(config.catalog.cache_ttl_secs, 300);
        assert!(config.policy.unit_policy_path.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn remote_catalog_takes_precedence_over_file() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_CATALOG_URL", "https://pot.example.org/api/tratamientos");
        env::set_var("APP_CATALOG_PATH", "/tmp/tratamientos.csv");
        env::set_var("APP_CATALOG_CACHE_TTL_SECS", "0");

        let config = AppConfig::load().expect("config loads");

        match config.catalog.source {
            CatalogSource::Remote(url) => assert_eq!(url.host_str(), Some("pot.example.org")),
            other => panic!("expected remote catalog, got {other:?}"),
        }
        assert_eq!(config.catalog.cache_ttl_secs, 0);
        reset_env();
    }

    #[test]
    fn rejects_malformed_catalog_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_CATALOG_URL", "not a url");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidCatalogUrl { .. })
        ));

        reset_env();
        env::set_var("APP_CATALOG_TIMEOUT_SECS", "ten");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                name: "APP_CATALOG_TIMEOUT_SECS"
            })
        ));
        reset_env();
    }
}
