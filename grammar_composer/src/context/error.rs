//! Context switching errors

use crate::logging::{codes, Code};
use crate::symbols::SymbolTableError;
use crate::utils::Position;

/// Violations of the push/pop discipline; each one aborts the parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextStackError {
    #[error("Terminator '{terminator}' at {position} has no matching opener")]
    UnmatchedTerminator { terminator: String, position: Position },

    #[error("Attempted to pop the root context at {position}")]
    PopPastRoot { position: Position },

    #[error("{language} context opened at {opened_at} is never closed")]
    UnclosedContext { language: String, opened_at: Position },

    #[error("Nesting depth limit {limit} exceeded at {position}")]
    DepthExceeded { limit: usize, position: Position },

    #[error("Expected to close {expected} context at {position} but {found} is active")]
    MismatchedPop {
        expected: String,
        found: String,
        position: Position,
    },
}

impl ContextStackError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnmatchedTerminator { .. } => codes::context::UNMATCHED_TERMINATOR,
            Self::PopPastRoot { .. } => codes::context::POP_PAST_ROOT,
            Self::UnclosedContext { .. } => codes::context::UNCLOSED_CONTEXT,
            Self::DepthExceeded { .. } => codes::context::DEPTH_EXCEEDED,
            Self::MismatchedPop { .. } => codes::context::MISMATCHED_POP,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::UnmatchedTerminator { position, .. }
            | Self::PopPastRoot { position }
            | Self::DepthExceeded { position, .. }
            | Self::MismatchedPop { position, .. } => *position,
            Self::UnclosedContext { opened_at, .. } => *opened_at,
        }
    }
}

/// Rejected trigger definitions, reported at language registration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("Invalid {kind} trigger pattern '{pattern}': {reason}")]
    InvalidPattern {
        kind: &'static str,
        pattern: String,
        reason: String,
    },

    #[error("Content trigger '{pattern}' has no terminator")]
    MissingTerminator { pattern: String },

    #[error("Trigger limit exceeded: {limit} triggers")]
    TooManyTriggers { limit: usize },
}

impl TriggerError {
    pub fn error_code(&self) -> Code {
        codes::context::INVALID_TRIGGER_PATTERN
    }
}

/// Fatal conditions raised while driving a parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Stack(#[from] ContextStackError),

    #[error(transparent)]
    Symbols(#[from] SymbolTableError),

    #[error("Document of {size} bytes exceeds the {limit} byte limit")]
    DocumentTooLarge { size: usize, limit: usize },

    #[error("No grammar available for context language '{language}'")]
    LanguageNotRegistered { language: String },
}

impl ParseError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Stack(e) => e.error_code(),
            Self::Symbols(e) => e.error_code(),
            Self::DocumentTooLarge { .. } => codes::context::DOCUMENT_TOO_LARGE,
            Self::LanguageNotRegistered { .. } => codes::composer::LANGUAGE_NOT_REGISTERED,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Stack(e) => Some(e.position()),
            _ => None,
        }
    }
}
