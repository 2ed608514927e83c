//! Configuration module for the grammar composer
//!
//! Compile-time limits live in [`constants`]; user preferences that may be
//! changed at runtime (environment or TOML) live in [`runtime`].

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{
    ComposerConfig, ComposerPreferences, ConfigError, LoggingPreferences,
    SymbolPreferences, ValidationPreferences,
};
