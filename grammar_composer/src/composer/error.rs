//! Composer errors
//!
//! Raised while configuring a composer. Parsing itself never returns an
//! error to the caller; failures are reported inside the parse result.

use crate::config::ConfigError;
use crate::context::TriggerError;
use crate::grammar::{GrammarResolutionError, GrammarSourceError};
use crate::logging::{codes, Code};

#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("Grammar resolution failed: {0}")]
    Grammar(#[from] GrammarResolutionError),

    #[error("Grammar source could not be read: {0}")]
    GrammarSource(#[from] GrammarSourceError),

    #[error("Invalid context trigger: {0}")]
    Trigger(#[from] TriggerError),

    #[error("Invalid composer configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Language '{language}' is not registered")]
    LanguageNotRegistered { language: String },

    #[error("Invalid configuration for language '{language}': {reason}")]
    InvalidLanguageConfig { language: String, reason: String },
}

impl ComposerError {
    pub fn invalid_language(language: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLanguageConfig {
            language: language.to_string(),
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Grammar(e) => e.error_code(),
            Self::GrammarSource(e) => e.error_code(),
            Self::Trigger(e) => e.error_code(),
            Self::Config(_) => codes::system::INITIALIZATION_FAILURE,
            Self::LanguageNotRegistered { .. } => codes::composer::LANGUAGE_NOT_REGISTERED,
            Self::InvalidLanguageConfig { .. } => codes::composer::INVALID_LANGUAGE_CONFIG,
        }
    }
}
