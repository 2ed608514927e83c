//! Coded logging for the grammar composer.
//!
//! A single process-wide [`LoggingService`] is built on first initialization.
//! Until then every logging macro is a no-op, so embedding applications that
//! never initialize logging pay only an atomic load per call site.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::config::LoggingPreferences;
use std::sync::OnceLock;

pub use codes::Code;
pub use config::LoggingError;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<LoggingService> = OnceLock::new();

/// Codes the composer's own failure paths depend on
const REQUIRED_CODES: [Code; 4] = [
    codes::system::INTERNAL_ERROR,
    codes::context::UNMATCHED_TERMINATOR,
    codes::context::UNCLOSED_CONTEXT,
    codes::composer::UNHANDLED_PARSE_EXCEPTION,
];

/// Build the global logger from environment-derived preferences
pub fn init_global_logging() -> Result<(), LoggingError> {
    build_global(config::active())
}

/// Build the global logger from explicit preferences, usually
/// [`ComposerConfig::logging`](crate::config::ComposerConfig)
pub fn init_global_logging_with(preferences: LoggingPreferences) -> Result<(), LoggingError> {
    if GLOBAL_LOGGER.get().is_some() {
        return Err(LoggingError::AlreadyInitialized);
    }
    config::install(preferences)?;
    build_global(config::active())
}

fn build_global(preferences: &LoggingPreferences) -> Result<(), LoggingError> {
    config::check_limits()?;
    if let Some(missing) = REQUIRED_CODES
        .into_iter()
        .find(|code| codes::lookup(*code).is_none())
    {
        return Err(LoggingError::MissingMetadata(missing));
    }

    GLOBAL_LOGGER
        .set(LoggingService::from_preferences(preferences))
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging initialized",
        "min_level" => preferences.min_level.label(),
        "console" => preferences.console
    );
    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

#[doc(hidden)]
pub fn global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get()
}
