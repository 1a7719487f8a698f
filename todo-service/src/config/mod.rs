use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TodoConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    /// OTLP collector endpoint. Span export is disabled when unset.
    pub otlp_endpoint: Option<String>,
    pub mongodb: MongoConfig,
    pub store: StoreBackend,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Upper bound for one request, store round trips included.
    pub request_timeout: Duration,
    /// How long in-flight requests may run after a shutdown signal.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: Secret::new("mongodb://localhost:27017".to_string()),
            database: "demo_todo".to_string(),
            collection: "todo".to_string(),
        }
    }
}

/// Development defaults, matching what `load` produces with no variables set.
impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            environment: Environment::Dev,
            service_name: "todo-service".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            mongodb: MongoConfig::default(),
            store: StoreBackend::Mongo,
            server: ServerConfig::default(),
        }
    }
}

impl TodoConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let environment: Environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "dev".to_string())
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;
        let is_prod = environment == Environment::Prod;

        Ok(TodoConfig {
            common: common_config,
            environment,
            service_name: "todo-service".to_string(),
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            mongodb: MongoConfig {
                uri: Secret::new(get_env(
                    "MONGODB_URI",
                    Some("mongodb://localhost:27017"),
                    is_prod,
                )?),
                database: get_env("MONGODB_DATABASE", Some("demo_todo"), is_prod)?,
                collection: get_env("MONGODB_COLLECTION", Some("todo"), is_prod)?,
            },
            store: get_env("STORE_BACKEND", Some("mongo"), is_prod)?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            server: ServerConfig {
                request_timeout: parse_timeout(
                    "REQUEST_TIMEOUT_SECONDS",
                    &get_env("REQUEST_TIMEOUT_SECONDS", Some("60"), is_prod)?,
                )?,
                shutdown_grace: parse_seconds(
                    "SHUTDOWN_GRACE_SECONDS",
                    &get_env("SHUTDOWN_GRACE_SECONDS", Some("5"), is_prod)?,
                )?,
            },
        })
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<Duration, AppError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("{} must be whole seconds: {}", key, e)))
}

/// Like `parse_seconds`, but zero is rejected: every store call would miss
/// its deadline.
fn parse_timeout(key: &str, value: &str) -> Result<Duration, AppError> {
    let timeout = parse_seconds(key, value)?;
    if timeout.is_zero() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be at least 1 second",
            key
        )));
    }
    Ok(timeout)
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
