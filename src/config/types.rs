//! Public configuration types.

use crate::settings::sources::DefaultSources;

use super::raw;

/// Fully-resolved application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub app_name: String,
    pub log_level: String,
    /// Collaborator inputs to install before any descriptor is read.
    pub sources: DefaultSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: raw::default_app_name(),
            log_level: raw::default_log_level(),
            sources: DefaultSources::builtin(),
        }
    }
}

/// Values taken from the environment that win over the config file.
/// Tests build this directly instead of mutating env vars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub model: Option<String>,
    pub provider: Option<String>,
}

impl Overrides {
    /// Read `CHAT_DEFAULTS_LOG_LEVEL`, `CHAT_DEFAULTS_MODEL` and
    /// `CHAT_DEFAULTS_PROVIDER`.
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("CHAT_DEFAULTS_LOG_LEVEL").ok(),
            model: std::env::var("CHAT_DEFAULTS_MODEL").ok(),
            provider: std::env::var("CHAT_DEFAULTS_PROVIDER").ok(),
        }
    }
}
