//! Tracing setup for the CLI. Output goes to stderr so the JSON printed on
//! stdout stays machine-readable.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Install the global subscriber. A non-empty `RUST_LOG` wins over the
/// configured `level`.
pub fn init(level: &str) -> Result<(), AppError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = filter_for(level, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

fn filter_for(level: &str, rust_log: Option<&str>) -> Result<EnvFilter, AppError> {
    let fallback = parse_level(level)?;
    match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| AppError::Logger(format!("invalid RUST_LOG '{directives}': {e}"))),
        None => Ok(EnvFilter::default().add_directive(fallback.into())),
    }
}

/// Validate a `log_level` value from config or `CHAT_DEFAULTS_LOG_LEVEL`.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}
