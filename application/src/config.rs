//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use http::header::{HeaderValue, InvalidHeaderValue};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use service::{infra::postgres, read::booking};
use smart_default::SmartDefault;
use tower_http::cors::AllowOrigin;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

impl Cors {
    /// Returns the [`AllowOrigin`] policy permitting all the configured
    /// [`Cors::origins`] at once.
    ///
    /// # Errors
    ///
    /// If any of the [`Cors::origins`] is not a valid header value.
    pub fn allow_origin(&self) -> Result<AllowOrigin, InvalidHeaderValue> {
        if self.origins.iter().any(|o| o == "*") {
            return Ok(AllowOrigin::any());
        }
        self.origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map(AllowOrigin::list)
    }
}

/// Service configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default(SecretString::from("secret".to_owned()))]
    pub jwt_secret: SecretString,

    /// Lifetime of the issued session tokens.
    #[default(service::Config::DEFAULT_SESSION_TTL)]
    #[serde(with = "humantime_serde")]
    pub session_ttl: time::Duration,

    /// Policy of which existing bookings block the dates of a new one.
    pub conflict_scope: ConflictScope,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            session_ttl,
            conflict_scope,
        } = value;

        Self {
            session_ttl,
            conflict_scope: conflict_scope.into(),
            ..Self::with_secret(jwt_secret.expose_secret().as_bytes())
        }
    }
}

/// Policy of which existing bookings block the dates of a new one.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    /// Every booking ever made for the property, deactivated ones included.
    #[default]
    All,

    /// Active bookings only.
    Active,
}

impl From<ConflictScope> for booking::ConflictScope {
    fn from(value: ConflictScope) -> Self {
        match value {
            ConflictScope::All => Self::All,
            ConflictScope::Active => Self::Active,
        }
    }
}

/// Postgres configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default(SecretString::from("postgres".to_owned()))]
    pub password: SecretString,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Timeout of acquiring a connection and of every executed statement.
    #[default(time::Duration::from_secs(5))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Postgres> for postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
            timeout,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password.expose_secret().to_owned()),
            dbname: Some(dbname),
            options: Some(format!(
                "-c statement_timeout={}",
                timeout.as_millis(),
            )),
            pool: Some(postgres::PoolConfig {
                timeouts: postgres::Timeouts {
                    wait: Some(timeout),
                    create: Some(timeout),
                    recycle: Some(timeout),
                },
                ..postgres::PoolConfig::default()
            }),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
