//! Agent defaults.
//!
//! All agent descriptors come out of one build, [`AgentDefaults::build`],
//! which takes its collaborator values as an argument. Two ways to reach it:
//!
//! - [`AgentDefaultsResolver`]: owns its collaborator, builds once on first
//!   read. Use this when the inputs are known at construction time.
//! - The process-wide statics ([`DEFAULT_AGENT`], [`DEFAULT_AGENT_CONFIG`],
//!   …): build from [`sources::current`] on first read, never rebuilt.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::deferred::Handle;
use crate::error::AppError;

use super::llm::ModelProvider;
use super::meta::AgentMeta;
use super::sources::{self, DefaultSources, SourceProvider};

// ── TTS ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsService {
    #[default]
    OpenAi,
    Edge,
    Microsoft,
}

/// Voice per TTS service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtsVoice {
    pub openai: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microsoft: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTtsConfig {
    pub show_all_locale_voice: bool,
    pub stt_locale: String,
    pub tts_service: TtsService,
    pub voice: TtsVoice,
}

impl Default for AgentTtsConfig {
    fn default() -> Self {
        Self {
            show_all_locale_voice: false,
            stt_locale: "auto".to_string(),
            tts_service: TtsService::OpenAi,
            voice: TtsVoice {
                openai: "alloy".to_string(),
                edge: None,
                microsoft: None,
            },
        }
    }
}

// ── Chat ──────────────────────────────────────────────────────────────────────

/// Model used for search function-calling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFcModel {
    pub model: String,
    pub provider: ModelProvider,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Chat,
    Docs,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Off,
    Auto,
    On,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentChatConfig {
    /// Message count after which a topic is created automatically.
    pub auto_create_topic_threshold: u32,
    pub display_mode: DisplayMode,
    pub enable_auto_create_topic: bool,
    pub enable_compress_history: bool,
    pub enable_history_count: bool,
    pub enable_reasoning: bool,
    pub history_count: u32,
    pub reasoning_budget_token: u32,
    #[serde(rename = "searchFCModel")]
    pub search_fc_model: SearchFcModel,
    pub search_mode: SearchMode,
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmParams {
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for LlmParams {
    fn default() -> Self {
        Self {
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            temperature: 1.0,
            top_p: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub chat_config: AgentChatConfig,
    pub model: String,
    pub opening_questions: Vec<String>,
    pub params: LlmParams,
    pub plugins: Vec<String>,
    pub provider: ModelProvider,
    pub system_role: String,
    pub tts: AgentTtsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub config: AgentConfig,
    pub meta: AgentMeta,
}

/// Every agent descriptor produced by one build.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDefaults {
    pub agent: Agent,
    pub chat_config: AgentChatConfig,
    pub config: AgentConfig,
    pub search_fc_model: SearchFcModel,
    pub tts: AgentTtsConfig,
}

impl AgentDefaults {
    /// Assemble the agent descriptors from collaborator values. Unset
    /// optional inputs fall back to empty values; nothing here fails.
    pub fn build(sources: &DefaultSources) -> Self {
        let tts = AgentTtsConfig::default();

        let search_fc_model = SearchFcModel {
            model: sources.default_model.clone(),
            provider: sources.default_provider,
        };

        let chat_config = AgentChatConfig {
            auto_create_topic_threshold: 2,
            display_mode: DisplayMode::Chat,
            enable_auto_create_topic: true,
            enable_compress_history: true,
            enable_history_count: true,
            enable_reasoning: false,
            history_count: 20,
            reasoning_budget_token: 1024,
            search_fc_model: search_fc_model.clone(),
            search_mode: SearchMode::Off,
        };

        let config = AgentConfig {
            chat_config: chat_config.clone(),
            model: sources.default_model.clone(),
            opening_questions: sources.opening_questions.clone().unwrap_or_default(),
            params: LlmParams::default(),
            plugins: sources.plugins.clone().unwrap_or_default(),
            provider: sources.default_provider,
            system_role: sources.system_role.clone().unwrap_or_default(),
            tts: tts.clone(),
        };

        let agent = Agent {
            config: config.clone(),
            meta: sources.agent_meta.clone(),
        };

        Self {
            agent,
            chat_config,
            config,
            search_fc_model,
            tts,
        }
    }
}

// ── Injected resolver ─────────────────────────────────────────────────────────

type BuildFn = Box<dyn Fn() -> AgentDefaults + Send + Sync>;

/// Agent defaults bound to an explicit collaborator.
///
/// The collaborator is asked for its values once, during the first read;
/// changes it sees afterwards do not reach the resolved descriptors.
pub struct AgentDefaultsResolver {
    handle: Handle<AgentDefaults, BuildFn>,
}

impl AgentDefaultsResolver {
    pub fn new(provider: Arc<dyn SourceProvider>) -> Self {
        let build: BuildFn = Box::new(move || AgentDefaults::build(&provider.sources()));
        Self {
            handle: Handle::new("agent defaults", build),
        }
    }

    pub fn resolve(&self) -> &AgentDefaults {
        self.handle.resolve()
    }

    pub fn try_resolve(&self) -> Result<&AgentDefaults, AppError> {
        self.handle.try_resolve()
    }

    /// Read a field of the resolved defaults by dotted path
    /// (`"config.model"`, `"chatConfig.historyCount"`).
    pub fn get(&self, key: &str) -> Option<Value> {
        self.handle.get(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.handle.keys()
    }

    pub fn is_resolved(&self) -> bool {
        self.handle.is_resolved()
    }

    pub fn build_count(&self) -> usize {
        self.handle.build_count()
    }
}

// ── Process-wide descriptors ──────────────────────────────────────────────────

static AGENT_DEFAULTS: Handle<AgentDefaults> =
    Handle::new("agent defaults", build_agent_defaults);

fn build_agent_defaults() -> AgentDefaults {
    AgentDefaults::build(sources::current())
}

pub static DEFAULT_AGENT_TTS_CONFIG: Handle<AgentTtsConfig> =
    Handle::new("DEFAULT_AGENT_TTS_CONFIG", || AGENT_DEFAULTS.tts.clone());

pub static DEFAULT_AGENT_SEARCH_FC_MODEL: Handle<SearchFcModel> =
    Handle::new("DEFAULT_AGENT_SEARCH_FC_MODEL", || AGENT_DEFAULTS.search_fc_model.clone());

pub static DEFAULT_AGENT_CHAT_CONFIG: Handle<AgentChatConfig> =
    Handle::new("DEFAULT_AGENT_CHAT_CONFIG", || AGENT_DEFAULTS.chat_config.clone());

pub static DEFAULT_AGENT_CONFIG: Handle<AgentConfig> =
    Handle::new("DEFAULT_AGENT_CONFIG", || AGENT_DEFAULTS.config.clone());

pub static DEFAULT_AGENT: Handle<Agent> =
    Handle::new("DEFAULT_AGENT", || AGENT_DEFAULTS.agent.clone());
