//! Agent display metadata and its defaults.

use serde::{Deserialize, Serialize};

pub const DEFAULT_AVATAR: &str = "🤖";
pub const DEFAULT_USER_AVATAR: &str = "😀";
pub const DEFAULT_BACKGROUND_COLOR: &str = "rgba(0,0,0,0)";
pub const DEFAULT_INBOX_AVATAR: &str = "🤯";

/// Title, avatar and tags shown for an agent. Every field is optional; the
/// default agent carries none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl AgentMeta {
    /// Avatar to render, falling back to [`DEFAULT_AVATAR`].
    pub fn avatar_or_default(&self) -> &str {
        self.avatar.as_deref().unwrap_or(DEFAULT_AVATAR)
    }

    /// Background colour to render, falling back to [`DEFAULT_BACKGROUND_COLOR`].
    pub fn background_or_default(&self) -> &str {
        self.background_color.as_deref().unwrap_or(DEFAULT_BACKGROUND_COLOR)
    }
}

/// Meta of the built-in default agent: empty.
pub fn default_agent_meta() -> AgentMeta {
    AgentMeta::default()
}
