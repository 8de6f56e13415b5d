//! [`Config`]-related definitions.

use std::{path::PathBuf, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use service::infra::{ai::gemini, database::remote};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: Server,

    /// Log configuration.
    #[serde(default)]
    pub log: Log,

    /// Local persistence configuration.
    #[serde(default)]
    pub local: Local,

    /// Remote persistence configuration, if any.
    #[serde(default)]
    pub remote: Option<Remote>,

    /// AI provider configuration.
    #[serde(default)]
    pub ai: Ai,
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

    /// Maximum size of a request body in bytes.
    ///
    /// Images sent for analysis travel inline, so it's bigger than usual.
    #[default(16 * 1024 * 1024)]
    pub body_limit: usize,

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

/// Local persistence configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Local {
    /// Directory to keep the content files in.
    #[default(PathBuf::from("data"))]
    pub dir: PathBuf,

    /// Namespace prefixing the content file names.
    #[default("site".to_owned())]
    pub namespace: String,
}

/// Remote persistence configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Remote {
    /// URL of the realtime database.
    pub url: String,

    /// Secret authorizing requests to the realtime database.
    #[default(SecretString::from(String::new()))]
    #[serde(deserialize_with = "secret")]
    pub secret: SecretString,

    /// Root path all the content is kept under.
    pub namespace: String,

    /// Timeout of a single request.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,

    /// Retry policy of writes.
    pub retry: Retry,

    /// Maximum silence of a subscription before it's considered lost.
    #[default(time::Duration::from_secs(60))]
    #[serde(with = "humantime_serde")]
    pub idle_timeout: time::Duration,

    /// Resubscription policy of lost subscriptions.
    pub reconnect: Reconnect,
}

impl From<Remote> for remote::Config {
    fn from(value: Remote) -> Self {
        let Remote {
            url,
            secret,
            namespace,
            timeout,
            retry: Retry { attempts, backoff },
            idle_timeout,
            reconnect: _,
        } = value;
        Self {
            url,
            secret,
            namespace,
            timeout,
            retry: remote::Retry { attempts, backoff },
            idle_timeout,
        }
    }
}

/// Retry policy of remote writes.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Retry {
    /// Total number of attempts of a single write.
    #[default(3)]
    pub attempts: u32,

    /// Delay before the first retry, doubled on every next one.
    #[default(time::Duration::from_millis(200))]
    #[serde(with = "humantime_serde")]
    pub backoff: time::Duration,
}

/// Resubscription policy of lost remote subscriptions.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Reconnect {
    /// Delay before the first resubscription attempt.
    #[default(time::Duration::from_secs(1))]
    #[serde(with = "humantime_serde")]
    pub min_backoff: time::Duration,

    /// Maximum delay between resubscription attempts.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub max_backoff: time::Duration,
}

impl From<Reconnect> for service::task::listen::Config {
    fn from(value: Reconnect) -> Self {
        let Reconnect {
            min_backoff,
            max_backoff,
        } = value;
        Self {
            min_backoff,
            max_backoff,
        }
    }
}

/// AI provider configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Ai {
    /// API key of the provider.
    #[default(SecretString::from(String::new()))]
    #[serde(deserialize_with = "secret")]
    pub api_key: SecretString,

    /// Model answering text and vision prompts.
    #[default("gemini-2.5-flash".to_owned())]
    pub text_model: String,

    /// Model generating images.
    #[default("gemini-2.5-flash-image".to_owned())]
    pub image_model: String,

    /// Base URL of the provider API.
    #[default("https://generativelanguage.googleapis.com/v1beta".to_owned())]
    pub endpoint: String,

    /// Timeout of a single request.
    #[default(time::Duration::from_secs(60))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Ai> for gemini::Config {
    fn from(value: Ai) -> Self {
        let Ai {
            api_key,
            text_model,
            image_model,
            endpoint,
            timeout,
        } = value;
        Self {
            api_key,
            text_model,
            image_model,
            endpoint,
            timeout,
        }
    }
}

/// Deserializes a [`SecretString`] out of a plain string.
fn secret<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
    String::deserialize(d).map(SecretString::from)
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

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use secrecy::ExposeSecret as _;
    use service::infra::database::remote;

    use super::Config;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_to_local_persistence() {
        let conf = parse("");

        assert!(conf.remote.is_none());
        assert_eq!(conf.local.namespace, "site");
        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.ai.text_model, "gemini-2.5-flash");
        assert!(conf.ai.api_key.expose_secret().is_empty());
    }

    #[test]
    fn parses_remote_section() {
        let conf = parse(
            r#"
            [remote]
            url = "https://site.firebaseio.com"
            secret = "s3cr3t"
            timeout = "5s"
            retry = { attempts = 5 }
            idle_timeout = "90s"
            reconnect = { max_backoff = "1m" }
            "#,
        );

        let remote = conf.remote.unwrap();
        assert_eq!(remote.reconnect.max_backoff, Duration::from_secs(60));
        assert_eq!(remote.retry.backoff, Duration::from_millis(200));

        let remote = remote::Config::from(remote);
        assert_eq!(remote.url, "https://site.firebaseio.com");
        assert_eq!(remote.secret.expose_secret(), "s3cr3t");
        assert_eq!(remote.timeout, Duration::from_secs(5));
        assert_eq!(remote.retry.attempts, 5);
        assert_eq!(remote.idle_timeout, Duration::from_secs(90));
    }
}
