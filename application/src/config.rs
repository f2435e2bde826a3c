//! [`Config`]-related definitions.

use std::env;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: Server,

    /// Session token policy.
    ///
    /// Deliberately carries no defaults. A deployment silently falling back
    /// to some baked-in issuer or audience would accept tokens it was never
    /// meant to, so a missing section aborts startup instead.
    pub token: Token,

    /// Log configuration.
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or incomplete.
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

/// Session token policy, as loaded from the configuration.
///
/// Validated into [`service::security::TokenConfigurations`] on startup.
#[derive(Clone, Debug, Deserialize)]
pub struct Token {
    /// Audience the issued tokens are intended for.
    pub audience: String,

    /// Issuer of the tokens.
    pub issuer: String,

    /// Number of seconds an issued token remains valid for.
    pub seconds: u64,
}

/// Deployment environment variables selecting the backing database.
///
/// These are read from the process environment directly rather than merged
/// into [`Config`], as they address the deployment rather than the
/// application.
#[derive(Clone, Debug)]
pub struct Env {
    /// Requested database provider (the `DATABASE` variable).
    pub database: Option<String>,

    /// Database connection target (the `DB_CONNECTION` variable).
    pub db_connection: Option<String>,

    /// Schema migration marker (the `MIGRATION` variable).
    pub migration: Option<String>,
}

impl Env {
    /// Reads an [`Env`] from the process environment.
    #[must_use]
    pub fn vars() -> Self {
        Self {
            database: env::var("DATABASE").ok(),
            db_connection: env::var("DB_CONNECTION").ok(),
            migration: env::var("MIGRATION").ok(),
        }
    }

    /// Indicates whether applying schema migrations on startup was requested.
    ///
    /// Only the `aplicar` marker (in any casing) counts. Any other value is
    /// the same as an absent one.
    #[must_use]
    pub fn migration_requested(&self) -> bool {
        self.migration
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("aplicar"))
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

#[cfg(test)]
mod config_spec {
    use config::{builder::DefaultState, ConfigBuilder, FileFormat};

    use super::Config;

    fn parse(toml: &str) -> Result<Config, config::ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn missing_token_section_fails_loading() {
        assert!(parse("").is_err());
        assert!(parse("[server]\nport = 9090").is_err());
    }

    #[test]
    fn incomplete_token_section_fails_loading() {
        let toml = "[token]\n\
                    audience = \"ExampleAudience\"\n\
                    issuer = \"ExampleIssuer\"";

        assert!(parse(toml).is_err());
    }

    #[test]
    fn token_section_alone_is_sufficient() {
        let toml = "[token]\n\
                    audience = \"ExampleAudience\"\n\
                    issuer = \"ExampleIssuer\"\n\
                    seconds = 60";

        let conf = parse(toml).unwrap();
        assert_eq!(conf.token.audience, "ExampleAudience");
        assert_eq!(conf.token.seconds, 60);
        assert_eq!(conf.server.port, 8080);
    }
}

#[cfg(test)]
mod env_spec {
    use super::Env;

    fn env(migration: Option<&str>) -> Env {
        Env {
            database: None,
            db_connection: None,
            migration: migration.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn migration_marker_is_case_insensitive() {
        assert!(env(Some("aplicar")).migration_requested());
        assert!(env(Some("APLICAR")).migration_requested());
        assert!(env(Some("Aplicar")).migration_requested());
    }

    #[test]
    fn other_markers_do_not_request_migration() {
        assert!(!env(None).migration_requested());
        assert!(!env(Some("")).migration_requested());
        assert!(!env(Some("yes")).migration_requested());
    }
}
