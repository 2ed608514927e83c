//! Context-switching parser
//!
//! Parses a host markup document, entering embedded-language contexts when
//! registered [`ContextTrigger`]s match and returning to the enclosing
//! context at each region's terminator. Everything found along the way is
//! recorded into the shared [`SymbolTable`](crate::symbols::SymbolTable)
//! and the parse's [`ParseArtifacts`].

pub mod error;
pub mod parser;
pub mod references;
pub mod scanner;
pub mod script;
pub mod stack;
pub mod style;
pub mod tree;
pub mod trigger;

pub use error::{ContextStackError, ParseError, TriggerError};
pub use parser::{ContextParser, ContextStats, LanguageSpec, ParseOutput};
pub use references::{
    BindingTarget, CrossReference, CrossReferenceId, DomBinding, EventBinding, IdentifierUsage,
    ParseArtifacts, ReferenceKind, ReferenceOrigin, StyleBinding,
};
pub use scanner::{LanguageKind, LanguageScanner, Region, RegionMode, ScanSink};
pub use stack::{ContextStack, ParsingContext};
pub use tree::{Attribute, Node, NodeId, NodeKind, ParseTree};
pub use trigger::{CompiledTrigger, ContextTrigger, TriggerKind, TriggerMatcher, TriggerSet};
