//! Runtime preferences.
//!
//! Every field can be set from TOML supplied by the caller. Fields the TOML
//! leaves out fall back to a `COMPOSER_*` environment variable and then to a
//! built-in default.

use crate::logging::LogLevel;
use crate::symbols::{ConflictPolicy, MergeStrategy};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Reads and parses an environment variable, ignoring unset or malformed values
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerPreferences {
    /// Language every document starts in
    pub host_language: String,
    pub collect_performance_metrics: bool,
    /// Downgrade a panic inside a parse to a failed result
    pub capture_panics: bool,
    pub include_parse_tree: bool,
    /// Run cross-language validation after every successful parse
    pub validate_after_parse: bool,
}

impl Default for ComposerPreferences {
    fn default() -> Self {
        Self {
            host_language: env_or(env_vars::HOST_LANGUAGE, "HTML".to_string()),
            collect_performance_metrics: env_or(env_vars::COLLECT_METRICS, true),
            capture_panics: env_or(env_vars::CAPTURE_PANICS, true),
            include_parse_tree: env_or(env_vars::INCLUDE_PARSE_TREE, true),
            validate_after_parse: env_or(env_vars::VALIDATE_AFTER_PARSE, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolPreferences {
    /// Used for languages that do not declare their own strategy
    pub default_merge_strategy: MergeStrategy,
    pub conflict_policy: ConflictPolicy,
    pub case_insensitive_elements: bool,
    /// Log a count of symbols that stayed inside isolated scopes
    pub log_isolated_symbols: bool,
}

impl Default for SymbolPreferences {
    fn default() -> Self {
        Self {
            default_merge_strategy: env_or(
                env_vars::SYMBOLS_MERGE_STRATEGY,
                MergeStrategy::Hierarchical,
            ),
            conflict_policy: env_or(env_vars::SYMBOLS_CONFLICT_POLICY, ConflictPolicy::ParentWins),
            case_insensitive_elements: env_or(env_vars::SYMBOLS_CASE_INSENSITIVE_ELEMENTS, true),
            log_isolated_symbols: env_or(env_vars::SYMBOLS_LOG_ISOLATED, false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPreferences {
    pub report_unused_functions: bool,
    pub report_unmatched_selectors: bool,
    pub max_suggestions_per_finding: usize,
    /// Accepted on top of the built-in event allow-list, lowercase
    pub extra_event_kinds: Vec<String>,
}

impl Default for ValidationPreferences {
    fn default() -> Self {
        let extra_event_kinds = env::var(env_vars::VALIDATION_EXTRA_EVENTS)
            .map(|raw| {
                raw.split(',')
                    .map(|kind| kind.trim().to_lowercase())
                    .filter(|kind| !kind.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            report_unused_functions: env_or(env_vars::VALIDATION_REPORT_UNUSED_FUNCTIONS, true),
            report_unmatched_selectors: env_or(
                env_vars::VALIDATION_REPORT_UNMATCHED_SELECTORS,
                true,
            ),
            max_suggestions_per_finding: env_or(env_vars::VALIDATION_MAX_SUGGESTIONS, 3),
            extra_event_kinds,
        }
    }
}

/// How the global logger is built by [`crate::logging::init_global_logging_with`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// JSON lines instead of plain text; only meaningful with console output
    pub structured: bool,
    /// Without console output events go to a bounded memory buffer
    pub console: bool,
    pub min_level: LogLevel,
    pub performance_events: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            structured: env_or(env_vars::LOGGING_STRUCTURED, false),
            console: env_or(env_vars::LOGGING_CONSOLE, false),
            min_level: env_or(env_vars::LOGGING_MIN_LEVEL, LogLevel::Info),
            performance_events: env_or(env_vars::LOGGING_PERFORMANCE, true),
        }
    }
}

/// Errors raised while loading a [`ComposerConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse composer configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// All runtime preferences, one section per concern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub composer: ComposerPreferences,
    pub symbols: SymbolPreferences,
    pub validation: ValidationPreferences,
    pub logging: LoggingPreferences,
}

impl ComposerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ComposerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.composer.host_language.trim().is_empty() {
            return Err(ConfigError::invalid("composer.host_language", "must not be empty"));
        }
        if self.validation.max_suggestions_per_finding == 0 {
            return Err(ConfigError::invalid(
                "validation.max_suggestions_per_finding",
                "at least one suggestion must be allowed",
            ));
        }
        if self
            .validation
            .extra_event_kinds
            .iter()
            .any(|kind| kind.is_empty() || kind.chars().any(char::is_uppercase))
        {
            return Err(ConfigError::invalid(
                "validation.extra_event_kinds",
                "event kinds must be non-empty and lowercase",
            ));
        }
        Ok(())
    }
}

/// Environment variables consulted for defaults
pub mod env_vars {
    pub const HOST_LANGUAGE: &str = "COMPOSER_HOST_LANGUAGE";
    pub const COLLECT_METRICS: &str = "COMPOSER_COLLECT_METRICS";
    pub const CAPTURE_PANICS: &str = "COMPOSER_CAPTURE_PANICS";
    pub const INCLUDE_PARSE_TREE: &str = "COMPOSER_INCLUDE_PARSE_TREE";
    pub const VALIDATE_AFTER_PARSE: &str = "COMPOSER_VALIDATE_AFTER_PARSE";

    pub const SYMBOLS_MERGE_STRATEGY: &str = "COMPOSER_SYMBOLS_MERGE_STRATEGY";
    pub const SYMBOLS_CONFLICT_POLICY: &str = "COMPOSER_SYMBOLS_CONFLICT_POLICY";
    pub const SYMBOLS_CASE_INSENSITIVE_ELEMENTS: &str =
        "COMPOSER_SYMBOLS_CASE_INSENSITIVE_ELEMENTS";
    pub const SYMBOLS_LOG_ISOLATED: &str = "COMPOSER_SYMBOLS_LOG_ISOLATED";

    pub const VALIDATION_REPORT_UNUSED_FUNCTIONS: &str =
        "COMPOSER_VALIDATION_REPORT_UNUSED_FUNCTIONS";
    pub const VALIDATION_REPORT_UNMATCHED_SELECTORS: &str =
        "COMPOSER_VALIDATION_REPORT_UNMATCHED_SELECTORS";
    pub const VALIDATION_MAX_SUGGESTIONS: &str = "COMPOSER_VALIDATION_MAX_SUGGESTIONS";
    pub const VALIDATION_EXTRA_EVENTS: &str = "COMPOSER_VALIDATION_EXTRA_EVENTS";

    pub const LOGGING_STRUCTURED: &str = "COMPOSER_LOGGING_STRUCTURED";
    pub const LOGGING_CONSOLE: &str = "COMPOSER_LOGGING_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "COMPOSER_LOGGING_MIN_LEVEL";
    pub const LOGGING_PERFORMANCE: &str = "COMPOSER_LOGGING_PERFORMANCE";
}
