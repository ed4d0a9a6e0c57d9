//! chat-defaults: print resolved default-settings descriptors.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger at configured level
//!   4. Install default sources
//!   5. Resolve the requested descriptor and print it as JSON

use chat_defaults::config;
use chat_defaults::error::AppError;
use chat_defaults::logger;
use chat_defaults::settings::{self, sources};
use serde_json::Value;
use tracing::{debug, info};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    // Load .env if present: ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;
    logger::init(&config.log_level)?;

    info!(
        app = %config.app_name,
        log_level = %config.log_level,
        default_model = %config.sources.default_model,
        "config loaded"
    );

    sources::install(config.sources)?;

    let descriptor = describe(&args.descriptor)?;
    let output = match args.key.as_deref() {
        Some(key) => chat_defaults::descriptor::lookup(&descriptor, key)
            .cloned()
            .ok_or_else(|| AppError::Config(format!("no key '{key}' in {}", args.descriptor)))?,
        None => descriptor,
    };
    debug!(descriptor = %args.descriptor, key = ?args.key, "printing descriptor");

    let text = serde_json::to_string_pretty(&output)
        .map_err(|e| AppError::Config(format!("cannot render descriptor: {e}")))?;
    println!("{text}");

    Ok(())
}

/// Resolve one named process-wide descriptor into its key/value view.
fn describe(name: &str) -> Result<Value, AppError> {
    let view = match name {
        "agent" => settings::DEFAULT_AGENT.try_descriptor()?,
        "agent-config" => settings::DEFAULT_AGENT_CONFIG.try_descriptor()?,
        "chat-config" => settings::DEFAULT_AGENT_CHAT_CONFIG.try_descriptor()?,
        "search-fc-model" => settings::DEFAULT_AGENT_SEARCH_FC_MODEL.try_descriptor()?,
        "tts" => settings::DEFAULT_AGENT_TTS_CONFIG.try_descriptor()?,
        "llm" => settings::DEFAULT_LLM_CONFIG.try_descriptor()?,
        "preference" => settings::DEFAULT_PREFERENCE.try_descriptor()?,
        other => {
            return Err(AppError::Config(format!(
                "unknown descriptor '{other}' (try --help)"
            )));
        }
    };
    Ok(view.clone())
}

struct CliArgs {
    config_path: Option<String>,
    descriptor: String,
    key: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut config_path = None;
    let mut positional = Vec::new();

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: chat-defaults [OPTIONS] [DESCRIPTOR [KEY]]");
                println!();
                println!("Descriptors:");
                println!("  agent, agent-config, chat-config, search-fc-model, tts, llm, preference");
                println!("  (default: agent)");
                println!();
                println!("KEY is a dotted path into the descriptor, e.g. config.chatConfig.historyCount");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let descriptor = positional.next().unwrap_or_else(|| "agent".to_string());
    let key = positional.next();

    CliArgs {
        config_path,
        descriptor,
        key,
    }
}
