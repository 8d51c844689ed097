//! # Application State and Configuration
//!
//! [`AppConfig`] is read once from the environment at startup.
//! [`AppState`] is the immutable context built from it and shared with every
//! handler through the `State` extractor. It holds no per-request mutable
//! state: the signing key and JWKS document are fixed for the process
//! lifetime, and the credential store is only read.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use tokex_crypto::{IssuerConfig, JwksPublisher};
use tokex_store::{StoreNamespace, DEFAULT_LOOKUP_TIMEOUT};

use crate::exchange::ExchangeService;

/// Default key record location.
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "/secrets/jwk-priv.json";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors in the environment configuration. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?}, expected text or json")),
        }
    }
}

/// Service configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub private_key_path: PathBuf,
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub store_namespace: StoreNamespace,
    /// Seed document for the in-memory store.
    pub seed_file: Option<PathBuf>,
    pub lookup_timeout: Duration,
    pub issuer: IssuerConfig,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            private_key_path: PathBuf::from(DEFAULT_PRIVATE_KEY_PATH),
            database_url: None,
            store_namespace: StoreNamespace::default(),
            seed_file: None,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            issuer: IssuerConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: format!("{raw:?}: {e}"),
            })?,
            None => defaults.port,
        };

        let store_namespace = match get("STORE_NAMESPACE") {
            Some(raw) => StoreNamespace::new(raw).map_err(|e| ConfigError::Invalid {
                var: "STORE_NAMESPACE",
                reason: e.to_string(),
            })?,
            None => defaults.store_namespace,
        };

        let lookup_timeout = match get("STORE_LOOKUP_TIMEOUT_MS") {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    var: "STORE_LOOKUP_TIMEOUT_MS",
                    reason: format!("{raw:?}: {e}"),
                })?;
                if ms == 0 {
                    return Err(ConfigError::Invalid {
                        var: "STORE_LOOKUP_TIMEOUT_MS",
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_millis(ms)
            }
            None => defaults.lookup_timeout,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|reason| ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    reason,
                })?,
            None => defaults.log_format,
        };

        Ok(Self {
            port,
            private_key_path: get("PRIVATE_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.private_key_path),
            database_url: get("DATABASE_URL"),
            store_namespace,
            seed_file: get("CREDENTIALS_SEED_FILE").map(PathBuf::from),
            lookup_timeout,
            issuer: IssuerConfig {
                issuer: get("TOKEN_ISSUER").unwrap_or(defaults.issuer.issuer),
                audience: get("TOKEN_AUDIENCE").unwrap_or(defaults.issuer.audience),
            },
            log_format,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("private_key_path", &self.private_key_path)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("store_namespace", &self.store_namespace)
            .field("seed_file", &self.seed_file)
            .field("lookup_timeout", &self.lookup_timeout)
            .field("issuer", &self.issuer)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<ExchangeService>,
    pub jwks: Arc<JwksPublisher>,
    /// Prometheus render handle. `None` when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(exchange: ExchangeService, jwks: JwksPublisher) -> Self {
        Self {
            exchange: Arc::new(exchange),
            jwks: Arc::new(jwks),
            metrics: None,
        }
    }

    /// Attach the Prometheus handle served at `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("exchange", &self.exchange)
            .field("jwks", &self.jwks)
            .field("metrics", &self.metrics.as_ref().map(|_| "[installed]"))
            .finish()
    }
}
