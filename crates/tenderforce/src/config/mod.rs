use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::obligations::{BaselinePolicy, ReloadPolicy};

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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            catalog: CatalogConfig::from_env()?,
        })
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

/// Where obligation data comes from and how reloads behave.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// Directory holding `obligations/` and `rules/`; bundled data when unset.
    pub data_dir: Option<PathBuf>,
    pub reload_policy: ReloadPolicy,
    /// Whether the general EED fallback and standard obligations are applied.
    pub baseline: bool,
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let data_dir = env::var("OBLIGATIONS_DATA_DIR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let reload_policy = match env::var("OBLIGATIONS_RELOAD_POLICY") {
            Ok(value) => ReloadPolicy::parse(&value)
                .ok_or(ConfigError::InvalidReloadPolicy { value })?,
            Err(_) => ReloadPolicy::default(),
        };

        let baseline = match env::var("OBLIGATIONS_BASELINE") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidFlag {
                name: "OBLIGATIONS_BASELINE",
                value,
            })?,
            Err(_) => false,
        };

        Ok(Self {
            data_dir,
            reload_policy,
            baseline,
        })
    }

    pub fn baseline_policy(&self) -> BaselinePolicy {
        if self.baseline {
            BaselinePolicy::standard()
        } else {
            BaselinePolicy::disabled()
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidReloadPolicy { value: String },
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidReloadPolicy { value } => write!(
                f,
                "OBLIGATIONS_RELOAD_POLICY must be 'keep-last-good' or 'fail-closed', got '{value}'"
            ),
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidReloadPolicy { .. }
            | ConfigError::InvalidFlag { .. } => None,
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
            "OBLIGATIONS_DATA_DIR",
            "OBLIGATIONS_RELOAD_POLICY",
            "OBLIGATIONS_BASELINE",
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
        assert!(config.catalog.data_dir.is_none());
        assert_eq!(config.catalog.reload_policy, ReloadPolicy::KeepLastGood);
        assert!(!config.catalog.baseline);
        assert!(!config.catalog.baseline_policy().is_enabled());
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
    fn reads_catalog_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("OBLIGATIONS_DATA_DIR", "/srv/obligations");
        env::set_var("OBLIGATIONS_RELOAD_POLICY", "fail-closed");
        env::set_var("OBLIGATIONS_BASELINE", "true");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.catalog.data_dir,
            Some(PathBuf::from("/srv/obligations"))
        );
        assert_eq!(config.catalog.reload_policy, ReloadPolicy::FailClosed);
        assert_eq!(config.catalog.baseline_policy(), BaselinePolicy::standard());
        reset_env();
    }

    #[test]
    fn rejects_unknown_reload_policy_and_flags() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("OBLIGATIONS_RELOAD_POLICY", "retry");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidReloadPolicy { .. })
        ));

        reset_env();
        env::set_var("OBLIGATIONS_BASELINE", "maybe");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidFlag {
                name: "OBLIGATIONS_BASELINE",
                ..
            })
        ));
        reset_env();
    }
}
