//! Collaborator inputs for default-settings builds.
//!
//! Descriptors never reach into other settings modules on their own. Whatever
//! raw values they need (default model and provider, agent meta, provider
//! overrides) arrive as a [`DefaultSources`], either passed to a resolver
//! directly or installed process-wide with [`install`] before the first read.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use tracing::{debug, info};

use crate::error::AppError;

use super::llm::{self, ModelProvider, ProviderOverride};
use super::meta::{self, AgentMeta};

/// Raw default values consumed while building descriptors.
///
/// Optional fields are agent-level overrides; when unset the descriptor uses
/// its own default (empty string or empty list).
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultSources {
    pub default_model: String,
    pub default_provider: ModelProvider,
    pub agent_meta: AgentMeta,
    pub system_role: Option<String>,
    pub opening_questions: Option<Vec<String>>,
    pub plugins: Option<Vec<String>>,
    pub provider_overrides: BTreeMap<ModelProvider, ProviderOverride>,
}

impl DefaultSources {
    /// Values compiled into the crate.
    pub fn builtin() -> Self {
        Self {
            default_model: llm::DEFAULT_MODEL.to_string(),
            default_provider: llm::DEFAULT_PROVIDER,
            agent_meta: meta::default_agent_meta(),
            system_role: None,
            opening_questions: None,
            plugins: None,
            provider_overrides: llm::builtin_provider_overrides(),
        }
    }
}

impl Default for DefaultSources {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Something that can hand over a snapshot of default inputs.
///
/// Resolvers call [`SourceProvider::sources`] once, inside their single build.
pub trait SourceProvider: Send + Sync {
    fn sources(&self) -> DefaultSources;
}

impl SourceProvider for DefaultSources {
    fn sources(&self) -> DefaultSources {
        self.clone()
    }
}

static INSTALLED: OnceLock<DefaultSources> = OnceLock::new();

/// Install the process-wide sources.
///
/// Must run before any process-wide descriptor is read. Fails once sources
/// are fixed, whether by an earlier `install` or by a read that fell back to
/// the built-in values.
pub fn install(sources: DefaultSources) -> Result<(), AppError> {
    let model = sources.default_model.clone();
    let provider = sources.default_provider;
    INSTALLED
        .set(sources)
        .map_err(|_| AppError::Config("default sources already fixed".into()))?;
    info!(default_model = %model, default_provider = %provider, "default sources installed");
    Ok(())
}

/// Sources for process-wide builds. Fixes the built-in values if nothing was
/// installed yet.
pub fn current() -> &'static DefaultSources {
    INSTALLED.get_or_init(|| {
        debug!("no default sources installed, using built-in values");
        DefaultSources::builtin()
    })
}

/// Whether process-wide sources are already fixed.
pub fn is_fixed() -> bool {
    INSTALLED.get().is_some()
}
