//! Grammar errors

use crate::logging::{codes, Code};
use crate::utils::Position;

/// Fatal errors raised while flattening an inheritance chain
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarResolutionError {
    #[error("Cyclic grammar inheritance: {}", .cycle.join(" -> "))]
    CyclicInheritance { cycle: Vec<String> },

    #[error("Grammar '{name}' is not registered")]
    UnknownGrammar { name: String },

    #[error("Grammar '{grammar}' extends unregistered base grammar '{base}'")]
    UnknownBaseGrammar { grammar: String, base: String },

    #[error("Invalid token pattern '{token}' in grammar '{grammar}': {reason}")]
    InvalidTokenPattern {
        grammar: String,
        token: String,
        reason: String,
    },

    #[error("Inheritance chain of '{grammar}' exceeds maximum depth {limit}")]
    InheritanceTooDeep { grammar: String, limit: usize },

    #[error("Effective grammar '{grammar}' has {count} rules (max {limit})")]
    RuleLimitExceeded {
        grammar: String,
        count: usize,
        limit: usize,
    },

    #[error("Grammar registry full: {limit} grammars registered")]
    RegistryFull { limit: usize },
}

impl GrammarResolutionError {
    pub fn cyclic(cycle: Vec<String>) -> Self {
        Self::CyclicInheritance { cycle }
    }

    pub fn unknown_base(grammar: &str, base: &str) -> Self {
        Self::UnknownBaseGrammar {
            grammar: grammar.to_string(),
            base: base.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::CyclicInheritance { .. } => codes::grammar::CYCLIC_INHERITANCE,
            Self::UnknownGrammar { .. } => codes::grammar::UNKNOWN_GRAMMAR,
            Self::UnknownBaseGrammar { .. } => codes::grammar::UNKNOWN_BASE_GRAMMAR,
            Self::InvalidTokenPattern { .. } => codes::grammar::INVALID_TOKEN_PATTERN,
            Self::InheritanceTooDeep { .. } => codes::grammar::INHERITANCE_TOO_DEEP,
            Self::RuleLimitExceeded { .. } => codes::grammar::RULE_LIMIT_EXCEEDED,
            Self::RegistryFull { .. } => codes::grammar::REGISTRY_FULL,
        }
    }
}

/// Errors raised while reading grammar source text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarSourceError {
    #[error("Expected {expected} at {position}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("Unterminated {what} starting at {position}")]
    Unterminated { what: &'static str, position: Position },

    #[error("Token '{token}' at {position}: {reason}")]
    InvalidToken {
        token: String,
        reason: String,
        position: Position,
    },

    #[error("Grammar source is {size} bytes (max {limit})")]
    TooLarge { size: usize, limit: usize },
}

impl GrammarSourceError {
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Unexpected { position, .. }
            | Self::Unterminated { position, .. }
            | Self::InvalidToken { position, .. } => Some(*position),
            Self::TooLarge { .. } => None,
        }
    }

    pub fn error_code(&self) -> Code {
        codes::grammar::GRAMMAR_SOURCE_SYNTAX
    }
}
