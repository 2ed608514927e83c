//! Symbol table errors

use super::types::{ScopeId, SymbolKind};
use crate::logging::{codes, Code};
use crate::utils::Position;
use serde::Serialize;

pub type SymbolResult<T> = Result<T, SymbolTableError>;

/// Fatal symbol table failures; these abort the current parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolTableError {
    #[error("Symbol limit exceeded: {limit} symbols per parse")]
    SymbolLimitExceeded { limit: usize },

    #[error("Scope limit exceeded: {limit} scopes per parse")]
    ScopeLimitExceeded { limit: usize },

    #[error("Unknown scope {scope}")]
    UnknownScope { scope: ScopeId },
}

impl SymbolTableError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::SymbolLimitExceeded { .. } => codes::symbols::SYMBOL_LIMIT_EXCEEDED,
            Self::ScopeLimitExceeded { .. } => codes::symbols::SCOPE_LIMIT_EXCEEDED,
            Self::UnknownScope { .. } => codes::symbols::UNKNOWN_SCOPE,
        }
    }
}

/// Same-scope collision under the `error` conflict policy.
///
/// Never fatal: recorded on the table and surfaced by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Conflicting {kind} '{name}' in {language} {scope}: first declared at {first}, redeclared at {duplicate}")]
pub struct SymbolConflictError {
    pub name: String,
    pub kind: SymbolKind,
    pub language: String,
    pub scope: ScopeId,
    pub first: Position,
    pub duplicate: Position,
}

impl SymbolConflictError {
    pub fn error_code(&self) -> Code {
        codes::symbols::SYMBOL_CONFLICT
    }
}
