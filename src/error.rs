//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    /// A descriptor's build re-entered its own resolver before the first
    /// build finished.
    #[error("reentrant resolution of '{0}' during its own build")]
    Reentrant(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
