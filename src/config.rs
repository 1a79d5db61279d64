//! Responder configuration.
//!
//! One binary signal matters: production or not. Outside production the
//! envelope carries `name`/`stack` and the log line carries the stack.
//!
//! ```rust
//! use taxon_errors::{Environment, ResponderConfig};
//!
//! let config = ResponderConfig::new(Environment::Development).with_timestamps(true);
//! assert!(config.diagnostics_enabled());
//! assert!(config.include_timestamp);
//! ```

use serde::Deserialize;
use std::env;
use std::fmt;

/// Environment variable selecting the environment.
pub const ENV_VAR: &str = "APP_ENV";
/// Fallback when [`ENV_VAR`] is unset.
pub const FALLBACK_ENV_VAR: &str = "RUST_ENV";
/// Host identity for the log line.
pub const HOST_VAR: &str = "HOSTNAME";
/// `1`/`true` turns on the envelope timestamp.
pub const TIMESTAMPS_VAR: &str = "ERROR_TIMESTAMPS";

const DEFAULT_HOST: &str = "localhost";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Diagnostics hidden.
    Production,
    /// Diagnostics shown; also any unrecognized value.
    #[default]
    #[serde(other)]
    Development,
}

impl Environment {
    /// `production` (any case) is production; anything else is not.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    /// Whether diagnostics must be withheld.
    #[inline]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Production => "production",
            Self::Development => "development",
        })
    }
}

/// Settings for a [`Responder`](crate::Responder).
///
/// Deserializable so it can sit inside a host application's own config file;
/// every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Gates `name` and `stack` in envelopes.
    pub environment: Environment,
    /// Add an RFC 3339 `timestamp` to every envelope.
    pub include_timestamp: bool,
    /// Host identity written at the start of each log line.
    pub host: String,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

impl ResponderConfig {
    /// Defaults for `environment`: no timestamps, default host.
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            include_timestamp: false,
            host: DEFAULT_HOST.to_owned(),
        }
    }

    /// Override the host written to logs.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Toggle envelope timestamps.
    #[must_use]
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.include_timestamp = enabled;
        self
    }

    /// Read `APP_ENV` (or `RUST_ENV`), `HOSTNAME` and `ERROR_TIMESTAMPS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = lookup(ENV_VAR)
            .or_else(|| lookup(FALLBACK_ENV_VAR))
            .map_or_else(Environment::default, |v| Environment::parse(&v));
        let host = lookup(HOST_VAR)
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let include_timestamp = lookup(TIMESTAMPS_VAR).is_some_and(|v| {
            let v = v.trim();
            v == "1" || v.eq_ignore_ascii_case("true")
        });

        Self {
            environment,
            include_timestamp,
            host,
        }
    }

    /// Diagnostics (`name`, `stack`) are disclosed outside production only.
    #[inline]
    pub const fn diagnostics_enabled(&self) -> bool {
        !self.environment.is_production()
    }
}
