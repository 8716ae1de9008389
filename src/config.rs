//! # Configuration
//!
//! [`LibraryConfig`] collects the few knobs the retrieval layer needs: which
//! transport scheme to use, the host to fall back to when the request carries
//! none, the page size for collection fetches and the request timeout.
//!
//! Values are layered: built-in defaults, then an optional TOML document, then
//! `SHELF_*` environment variables.
//!
//! ```bash
//! SHELF_ENV=development SHELF_PAGE_SIZE=25 RUST_LOG=info cargo run
//! ```

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Default page size for collection fetches.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default upper bound for a single remote call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds a value the library cannot work with.
    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Runtime environment. Governs the transport scheme only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// `http` in development, `https` everywhere else.
    pub fn scheme(self) -> &'static str {
        match self {
            Environment::Development => "http",
            Environment::Production => "https",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

/// Settings for the fetcher and the page loader.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub environment: Environment,
    /// Host used when the request context has no host header.
    pub default_host: String,
    /// Fixed page size for collection fetches.
    pub page_size: usize,
    pub request_timeout_secs: u64,
    /// Mailbox size of each collection actor.
    pub channel_buffer: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            default_host: "localhost:3000".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            channel_buffer: 32,
        }
    }
}

impl LibraryConfig {
    /// Defaults overlaid with `SHELF_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document, then applies `SHELF_*` environment overrides.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(raw)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Unparseable values are ignored with a warning so a typo in one
    /// variable does not discard the rest.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup("SHELF_ENV") {
            match Environment::parse(&raw) {
                Some(env) => self.environment = env,
                None => tracing::warn!(value = %raw, "Ignoring unknown SHELF_ENV"),
            }
        }
        if let Some(host) = lookup("SHELF_DEFAULT_HOST") {
            self.default_host = host.trim().to_string();
        }
        if let Some(size) = parse_var(&lookup, "SHELF_PAGE_SIZE") {
            self.page_size = size;
        }
        if let Some(secs) = parse_var(&lookup, "SHELF_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = secs;
        }
        if let Some(buffer) = parse_var(&lookup, "SHELF_CHANNEL_BUFFER") {
            self.channel_buffer = buffer;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_host.is_empty() {
            return Err(invalid("default_host", "must not be empty"));
        }
        if self.page_size == 0 {
            return Err(invalid("page_size", "must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be at least 1"));
        }
        if self.channel_buffer == 0 {
            return Err(invalid("channel_buffer", "must be at least 1"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparseable override");
            None
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
