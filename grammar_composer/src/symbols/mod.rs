//! Cross-language symbol tracking
//!
//! One [`SymbolTable`] is built per parse. The host language owns the root
//! scope; every embedded context gets a scope chosen by its language's
//! [`MergeStrategy`].

pub mod error;
pub mod report;
pub mod table;
pub mod types;

pub use error::{SymbolConflictError, SymbolResult, SymbolTableError};
pub use report::SymbolTableReport;
pub use table::{SymbolTable, SymbolTableSnapshot};
pub use types::{
    ConflictPolicy, InsertOutcome, MergeStrategy, NewSymbol, Scope, ScopeId, Symbol, SymbolId,
    SymbolInsertion, SymbolKind, Visibility,
};
