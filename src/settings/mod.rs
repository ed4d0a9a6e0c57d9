//! Default settings descriptors.
//!
//! - **sources**: collaborator inputs and their process-wide installation.
//! - **llm**: model/provider constants and the default LLM config.
//! - **meta**: agent display metadata.
//! - **agent**: agent, chat, TTS and search-model defaults.
//! - **user**: user preference defaults.

pub mod agent;
pub mod llm;
pub mod meta;
pub mod sources;
pub mod user;

pub use agent::{
    Agent, AgentChatConfig, AgentConfig, AgentDefaults, AgentDefaultsResolver, AgentTtsConfig,
    DEFAULT_AGENT, DEFAULT_AGENT_CHAT_CONFIG, DEFAULT_AGENT_CONFIG, DEFAULT_AGENT_SEARCH_FC_MODEL,
    DEFAULT_AGENT_TTS_CONFIG, SearchFcModel,
};
pub use llm::{DEFAULT_LLM_CONFIG, DEFAULT_MODEL, DEFAULT_PROVIDER, ModelProvider, UserLlmConfig};
pub use meta::AgentMeta;
pub use sources::{DefaultSources, SourceProvider};
pub use user::{DEFAULT_PREFERENCE, UserPreference};
