// Library root: exposes the settings core for the binary and integration tests.
// The binary entry point is src/main.rs.

pub mod config;
pub mod deferred;
pub mod descriptor;
pub mod error;
pub mod logger;
pub mod settings;

pub use deferred::{Deferred, Handle};
pub use error::AppError;
