//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains, and
//! applies `CHAT_DEFAULTS_*` env overrides.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::AppError;
use crate::logger;
use crate::settings::llm::{ModelProvider, ProviderOverride};
use crate::settings::meta::AgentMeta;
use crate::settings::sources::DefaultSources;

use super::raw::RawConfig;
use super::types::{Config, Overrides};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Deep-merge two TOML values.
/// Tables are merged recursively: the overlay only needs to specify keys that
/// differ from the base. For every other type (string, integer, array, …)
/// the overlay value replaces the base value wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// fully merged `toml::Value`. `visited` carries canonicalized paths already
/// seen in this chain so circular references are caught early.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let base_str = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str());

    match base_str {
        Some(base_str) => {
            let expanded = expand_home(base_str);
            let base_path = if expanded.is_absolute() {
                expanded
            } else {
                path.parent().unwrap_or(Path::new(".")).join(expanded)
            };
            debug!(path = %path.display(), base = %base_path.display(), "following config base");
            let base_val = load_raw_merged(&base_path, visited)?;
            Ok(merge_toml(base_val, overlay_val))
        }
        None => Ok(overlay_val),
    }
}

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. With no explicit path and no default file, the built-in
/// defaults are used (overrides still apply).
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = Overrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        debug!("no config file found, using built-in defaults");
        resolve(RawConfig::default(), &overrides)
    }
}

/// Load from an explicit path. Follows `[meta] base = "..."` inheritance
/// chains before resolving.
pub fn load_from(path: &Path, overrides: &Overrides) -> Result<Config, AppError> {
    let merged_val = load_raw_merged(path, &mut HashSet::new())?;

    let parsed: RawConfig = Deserialize::deserialize(merged_val).map_err(|e: toml::de::Error| {
        AppError::Config(format!("config error in {}: {e}", path.display()))
    })?;

    resolve(parsed, overrides)
}

/// Turn the raw file shape into a [`Config`], validating provider ids and the
/// log level.
fn resolve(parsed: RawConfig, overrides: &Overrides) -> Result<Config, AppError> {
    let log_level = overrides
        .log_level
        .clone()
        .unwrap_or(parsed.app.log_level);
    if logger::parse_level(&log_level).is_err() {
        return Err(AppError::Config(format!("invalid log_level '{log_level}'")));
    }

    let mut sources = DefaultSources::builtin();

    if let Some(model) = overrides.model.clone().or(parsed.llm.default_model) {
        if model.trim().is_empty() {
            return Err(AppError::Config("default_model must not be empty".into()));
        }
        sources.default_model = model;
    }

    let provider = overrides
        .provider
        .as_deref()
        .or(parsed.llm.default_provider.as_deref());
    if let Some(provider) = provider {
        sources.default_provider = provider.parse()?;
    }

    for (id, raw) in parsed.llm.providers {
        let provider: ModelProvider = id.parse()?;
        sources
            .provider_overrides
            .entry(provider)
            .or_default()
            .merge(&ProviderOverride {
                enabled: raw.enabled,
                fetch_on_client: raw.fetch_on_client,
            });
    }

    let agent = parsed.agent;
    sources.system_role = agent.system_role;
    sources.opening_questions = agent.opening_questions;
    sources.plugins = agent.plugins;
    sources.agent_meta = AgentMeta {
        avatar: agent.meta.avatar,
        background_color: agent.meta.background_color,
        description: agent.meta.description,
        tags: agent.meta.tags,
        title: agent.meta.title,
    };

    Ok(Config {
        app_name: parsed.app.name,
        log_level,
        sources,
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
