//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (optional), then applies `CHAT_DEFAULTS_LOG_LEVEL`, `CHAT_DEFAULTS_MODEL`
//! and `CHAT_DEFAULTS_PROVIDER`. The result carries the [`DefaultSources`]
//! that the binary installs before reading any descriptor.
//!
//! # Module layout
//!
//! - **types**: `Config` and `Overrides`.
//! - **raw**: Raw TOML deserialization types; kept private.
//! - **load**: `merge_toml`, `load_raw_merged`, `load`, `load_from`,
//!   `expand_home`.
//!
//! [`DefaultSources`]: crate::settings::sources::DefaultSources

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::llm::ModelProvider;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::{NamedTempFile, TempDir};

    const MINIMAL_TOML: &str = r#"
[app]
name = "test-app"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn no_overrides() -> Overrides {
        Overrides::default()
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &no_overrides()).unwrap();
        assert_eq!(cfg.app_name, "test-app");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.sources.default_model, "gpt-5-mini");
        assert_eq!(cfg.sources.default_provider, ModelProvider::OpenAi);
    }

    #[test]
    fn empty_file_uses_builtin_defaults() {
        let f = write_toml("");
        let cfg = load_from(f.path(), &no_overrides()).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn parse_llm_and_agent_sections() {
        let toml = r#"
[llm]
default_model = "claude-sonnet"
default_provider = "anthropic"

[llm.providers.anthropic]
enabled = true

[llm.providers.ollama]
enabled = false

[agent]
system_role = "Be brief."
opening_questions = ["Hi?"]

[agent.meta]
title = "Helper"
avatar = "🦀"
"#;
        let f = write_toml(toml);
        let cfg = load_from(f.path(), &no_overrides()).unwrap();
        let s = &cfg.sources;
        assert_eq!(s.default_model, "claude-sonnet");
        assert_eq!(s.default_provider, ModelProvider::Anthropic);
        assert_eq!(s.provider_overrides[&ModelProvider::Anthropic].enabled, Some(true));

        // File value wins for `enabled`; the built-in fetch_on_client survives.
        let ollama = &s.provider_overrides[&ModelProvider::Ollama];
        assert_eq!(ollama.enabled, Some(false));
        assert_eq!(ollama.fetch_on_client, Some(true));

        assert_eq!(s.system_role.as_deref(), Some("Be brief."));
        assert_eq!(s.opening_questions.as_deref(), Some(&["Hi?".to_string()][..]));
        assert!(s.plugins.is_none());
        assert_eq!(s.agent_meta.title.as_deref(), Some("Helper"));
        assert_eq!(s.agent_meta.avatar.as_deref(), Some("🦀"));
    }

    #[test]
    fn unknown_provider_section_errors() {
        let f = write_toml("[llm.providers.skynet]\nenabled = true\n");
        let err = load_from(f.path(), &no_overrides()).unwrap_err();
        assert!(err.to_string().contains("unknown provider"));
    }

    #[test]
    fn unknown_default_provider_errors() {
        let f = write_toml("[llm]\ndefault_provider = \"nope\"\n");
        assert!(load_from(f.path(), &no_overrides()).is_err());
    }

    #[test]
    fn empty_default_model_errors() {
        let f = write_toml("[llm]\ndefault_model = \"  \"\n");
        let err = load_from(f.path(), &no_overrides()).unwrap_err();
        assert!(err.to_string().contains("default_model"));
    }

    #[test]
    fn invalid_log_level_errors() {
        let f = write_toml("[app]\nlog_level = \"loud\"\n");
        let err = load_from(f.path(), &no_overrides()).unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.chat-defaults");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with(".chat-defaults"));
    }

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_home("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), &no_overrides());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn env_overrides_win() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = Overrides {
            log_level: Some("debug".into()),
            model: Some("gpt-override".into()),
            provider: Some("ollama".into()),
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.sources.default_model, "gpt-override");
        assert_eq!(cfg.sources.default_provider, ModelProvider::Ollama);
    }

    const BASE_TOML: &str = r#"
[app]
name = "base-app"
log_level = "info"

[llm]
default_model = "gpt-base"

[agent]
system_role = "base role"
"#;

    fn write_named(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let p = dir.path().join(name);
        std::fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn overlay_keeps_base_fields() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "base.toml", BASE_TOML);
        let overlay = r#"
[meta]
base = "base.toml"

[app]
log_level = "debug"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let cfg = load_from(&overlay_path, &no_overrides()).unwrap();
        assert_eq!(cfg.app_name, "base-app");
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.sources.default_model, "gpt-base");
    }

    #[test]
    fn overlay_wins_scalar() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "base.toml", BASE_TOML);
        let overlay = r#"
[meta]
base = "base.toml"

[llm]
default_model = "gpt-overlay"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let cfg = load_from(&overlay_path, &no_overrides()).unwrap();
        assert_eq!(cfg.sources.default_model, "gpt-overlay");
        assert_eq!(cfg.sources.system_role.as_deref(), Some("base role"));
    }

    #[test]
    fn chained_bases() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "grandbase.toml", BASE_TOML);
        let middle = r#"
[meta]
base = "grandbase.toml"

[app]
name = "middle-app"
"#;
        write_named(&dir, "middle.toml", middle);
        let top = r#"
[meta]
base = "middle.toml"

[app]
log_level = "warn"
"#;
        let top_path = write_named(&dir, "top.toml", top);
        let cfg = load_from(&top_path, &no_overrides()).unwrap();
        assert_eq!(cfg.app_name, "middle-app");
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn missing_base_errors() {
        let dir = TempDir::new().unwrap();
        let overlay = r#"
[meta]
base = "nonexistent.toml"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let msg = load_from(&overlay_path, &no_overrides())
            .unwrap_err()
            .to_string();
        assert!(msg.contains("cannot read"));
    }

    #[test]
    fn cycle_detection() {
        let dir = TempDir::new().unwrap();
        let self_path = dir.path().join("self.toml");
        let content = format!(
            "[meta]\nbase = \"{}\"\n{BASE_TOML}",
            self_path.display()
        );
        std::fs::write(&self_path, content).unwrap();
        let msg = load_from(&self_path, &no_overrides())
            .unwrap_err()
            .to_string();
        assert!(msg.contains("circular"));
    }
}
