//! Logging preferences in effect for this process.
//!
//! Preferences are installed at most once, before the global logger is built.
//! Anything that reads them first freezes the environment-derived defaults.

use super::codes::Code;
use super::events::LogLevel;
use crate::config::compile_time::logging::{LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LENGTH};
use crate::config::LoggingPreferences;
use std::sync::OnceLock;

static ACTIVE: OnceLock<LoggingPreferences> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoggingError {
    #[error("Global logger already initialized")]
    AlreadyInitialized,

    #[error("Logging preferences were read before they could be installed")]
    PreferencesFrozen,

    #[error("Logging limit '{name}' is too small: {value}")]
    LimitTooSmall { name: &'static str, value: usize },

    #[error("Missing metadata for code {0}")]
    MissingMetadata(Code),
}

pub fn install(preferences: LoggingPreferences) -> Result<(), LoggingError> {
    ACTIVE
        .set(preferences)
        .map_err(|_| LoggingError::PreferencesFrozen)
}

pub fn active() -> &'static LoggingPreferences {
    ACTIVE.get_or_init(LoggingPreferences::default)
}

pub fn min_level() -> LogLevel {
    active().min_level
}

pub fn performance_events() -> bool {
    active().performance_events
}

pub fn buffer_capacity() -> usize {
    LOG_BUFFER_SIZE
}

pub(crate) fn check_limits() -> Result<(), LoggingError> {
    if LOG_BUFFER_SIZE < 100 {
        return Err(LoggingError::LimitTooSmall {
            name: "LOG_BUFFER_SIZE",
            value: LOG_BUFFER_SIZE,
        });
    }
    if MAX_LOG_MESSAGE_LENGTH < 80 {
        return Err(LoggingError::LimitTooSmall {
            name: "MAX_LOG_MESSAGE_LENGTH",
            value: MAX_LOG_MESSAGE_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_hold() {
        assert_eq!(check_limits(), Ok(()));
        assert!(buffer_capacity() >= 100);
    }

    #[test]
    fn test_install_after_read_is_rejected() {
        let _ = active();
        assert_eq!(
            install(LoggingPreferences::default()),
            Err(LoggingError::PreferencesFrozen)
        );
    }
}
