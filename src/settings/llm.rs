//! LLM defaults: model/provider constants and the per-provider config map.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::deferred::Handle;
use crate::error::AppError;

use super::sources;

pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_PROVIDER: ModelProvider = ModelProvider::OpenAi;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_PROVIDER: ModelProvider = ModelProvider::OpenAi;

pub const DEFAULT_RERANK_MODEL: &str = "rerank-english-v3.0";
pub const DEFAULT_RERANK_PROVIDER: ModelProvider = ModelProvider::Cohere;
pub const DEFAULT_RERANK_QUERY_MODE: &str = "full_text";

// ── ModelProvider ─────────────────────────────────────────────────────────────

/// Provider backends the settings layer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Anthropic,
    Azure,
    Bedrock,
    Cohere,
    DeepSeek,
    Google,
    Groq,
    HuggingFace,
    LmStudio,
    Mistral,
    Ollama,
    OpenAi,
    OpenRouter,
    Perplexity,
    Qwen,
    XAi,
}

impl ModelProvider {
    pub const ALL: [ModelProvider; 16] = [
        ModelProvider::Anthropic,
        ModelProvider::Azure,
        ModelProvider::Bedrock,
        ModelProvider::Cohere,
        ModelProvider::DeepSeek,
        ModelProvider::Google,
        ModelProvider::Groq,
        ModelProvider::HuggingFace,
        ModelProvider::LmStudio,
        ModelProvider::Mistral,
        ModelProvider::Ollama,
        ModelProvider::OpenAi,
        ModelProvider::OpenRouter,
        ModelProvider::Perplexity,
        ModelProvider::Qwen,
        ModelProvider::XAi,
    ];

    /// Stable identifier used in config files and serialized descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::Anthropic => "anthropic",
            ModelProvider::Azure => "azure",
            ModelProvider::Bedrock => "bedrock",
            ModelProvider::Cohere => "cohere",
            ModelProvider::DeepSeek => "deepseek",
            ModelProvider::Google => "google",
            ModelProvider::Groq => "groq",
            ModelProvider::HuggingFace => "huggingface",
            ModelProvider::LmStudio => "lmstudio",
            ModelProvider::Mistral => "mistral",
            ModelProvider::Ollama => "ollama",
            ModelProvider::OpenAi => "openai",
            ModelProvider::OpenRouter => "openrouter",
            ModelProvider::Perplexity => "perplexity",
            ModelProvider::Qwen => "qwen",
            ModelProvider::XAi => "xai",
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelProvider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::Config(format!("unknown provider: '{s}'")))
    }
}

// ── Per-provider config ───────────────────────────────────────────────────────

/// Resolved settings for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub enabled: bool,
    /// Fetch model lists from the browser instead of the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_on_client: Option<bool>,
}

/// Partial provider settings supplied by collaborators; unset fields keep
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderOverride {
    pub enabled: Option<bool>,
    pub fetch_on_client: Option<bool>,
}

impl ProviderOverride {
    /// Lay `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: &ProviderOverride) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.fetch_on_client.is_some() {
            self.fetch_on_client = other.fetch_on_client;
        }
    }
}

/// Provider id → provider config, one entry per known provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserLlmConfig(BTreeMap<ModelProvider, ProviderConfig>);

impl UserLlmConfig {
    pub fn provider(&self, provider: ModelProvider) -> Option<&ProviderConfig> {
        self.0.get(&provider)
    }

    /// Providers with `enabled = true`, in id order.
    pub fn enabled_providers(&self) -> Vec<ModelProvider> {
        self.0
            .iter()
            .filter(|(_, cfg)| cfg.enabled)
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Overrides applied to the default LLM config when nothing else is configured.
pub fn builtin_provider_overrides() -> BTreeMap<ModelProvider, ProviderOverride> {
    BTreeMap::from([
        (
            ModelProvider::LmStudio,
            ProviderOverride {
                enabled: None,
                fetch_on_client: Some(true),
            },
        ),
        (
            ModelProvider::Ollama,
            ProviderOverride {
                enabled: Some(true),
                fetch_on_client: Some(true),
            },
        ),
        (
            ModelProvider::OpenAi,
            ProviderOverride {
                enabled: Some(true),
                fetch_on_client: None,
            },
        ),
    ])
}

/// Build a config entry for every known provider. Providers are disabled
/// unless an override enables them.
pub fn gen_user_llm_config(overrides: &BTreeMap<ModelProvider, ProviderOverride>) -> UserLlmConfig {
    let providers = ModelProvider::ALL
        .into_iter()
        .map(|provider| {
            let ov = overrides.get(&provider);
            let config = ProviderConfig {
                enabled: ov.and_then(|o| o.enabled).unwrap_or(false),
                fetch_on_client: ov.and_then(|o| o.fetch_on_client),
            };
            (provider, config)
        })
        .collect();
    UserLlmConfig(providers)
}

/// Process-wide default LLM config, built from the installed sources on first read.
pub static DEFAULT_LLM_CONFIG: Handle<UserLlmConfig> =
    Handle::new("DEFAULT_LLM_CONFIG", build_default_llm_config);

fn build_default_llm_config() -> UserLlmConfig {
    gen_user_llm_config(&sources::current().provider_overrides)
}
