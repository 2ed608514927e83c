//! Grammar model, grammar source reader and inheritance resolution

pub mod builtin;
pub mod error;
pub mod model;
pub mod resolver;
pub mod source;
pub mod tokenizer;

pub use error::{GrammarResolutionError, GrammarSourceError};
pub use model::{Grammar, GrammarBuilder, ProductionRule, TokenPattern};
pub use resolver::{EffectiveGrammar, EffectiveRule, EffectiveToken, InheritanceResolver};
pub use source::parse_grammar_source;
pub use tokenizer::{GrammarTokenizer, Token, TokenizeSummary};
