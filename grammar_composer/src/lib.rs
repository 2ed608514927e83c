// Internal modules
#[macro_use]
pub mod logging;
pub mod composer;
pub mod config;
pub mod context;
pub mod grammar;
pub mod symbols;
pub mod utils;
pub mod validation;

// Re-export key types for library consumers
pub use composer::{
    ComposerError, EmbeddedGrammarComposer, EmbeddedLanguageConfig, EmbeddedParseResult,
    ParseDiagnostic, PerformanceMetrics,
};
pub use config::ComposerConfig;
pub use context::{ContextTrigger, LanguageKind, TriggerKind};
pub use grammar::{EffectiveGrammar, Grammar, GrammarResolutionError, InheritanceResolver, TokenPattern};
pub use symbols::{ConflictPolicy, MergeStrategy, SymbolKind, SymbolTable};
pub use utils::Position;
pub use validation::{
    CrossLanguageRule, Finding, FindingCategory, FindingSeverity, ValidationResult, ValidatorKind,
};
