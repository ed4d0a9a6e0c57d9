//! User preference defaults.

use serde::{Deserialize, Serialize};

use crate::deferred::Handle;

/// How topics are grouped in the sidebar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopicDisplayMode {
    #[default]
    ByTime,
    Flat,
}

/// One-time onboarding hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGuide {
    pub move_settings_to_avatar: bool,
    pub topic: bool,
}

impl Default for UserGuide {
    fn default() -> Self {
        Self {
            move_settings_to_avatar: true,
            topic: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreference {
    pub guide: UserGuide,
    /// `None` until the user has answered the telemetry prompt.
    pub telemetry: Option<bool>,
    pub topic_display_mode: TopicDisplayMode,
    pub use_cmd_enter_to_send: bool,
}

pub static DEFAULT_PREFERENCE: Handle<UserPreference> =
    Handle::new("DEFAULT_PREFERENCE", UserPreference::default);
