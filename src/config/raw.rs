//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use std::collections::HashMap;

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape: serde target before resolution.
/// The `[meta]` table is consumed by the loader and ignored here.
#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub app: RawApp,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub agent: RawAgent,
}

#[derive(Deserialize)]
pub(super) struct RawApp {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RawApp {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawLlm {
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub default_provider: Option<String>,
    /// `[llm.providers.<id>]`: keyed by provider id, validated in `load`.
    #[serde(default)]
    pub providers: HashMap<String, RawProviderOverride>,
}

#[derive(Deserialize, Default)]
pub(super) struct RawProviderOverride {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub fetch_on_client: Option<bool>,
}

// ── Agent ────────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawAgent {
    #[serde(default)]
    pub system_role: Option<String>,
    #[serde(default)]
    pub opening_questions: Option<Vec<String>>,
    #[serde(default)]
    pub plugins: Option<Vec<String>>,
    #[serde(default)]
    pub meta: RawAgentMeta,
}

#[derive(Deserialize, Default)]
pub(super) struct RawAgentMeta {
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub title: Option<String>,
}

// ── Default value functions ──────────────────────────────────────────────────

pub(super) fn default_app_name() -> String {
    "chat-defaults".to_string()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}
