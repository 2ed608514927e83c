//! One parse, start to finish
//!
//! A session owns the symbol table for exactly one document. The composer
//! builds a fresh session per call, so nothing recorded for one document
//! can reach the next.

use crate::context::{ContextParser, LanguageSpec, ParseError, ParseOutput, TriggerSet};
use crate::logging::{codes, Code};
use crate::symbols::SymbolTable;
use crate::utils::Position;
use indexmap::IndexMap;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

pub struct ParseSession<'c> {
    host: &'c LanguageSpec,
    languages: &'c IndexMap<String, LanguageSpec>,
    triggers: &'c TriggerSet,
    table: SymbolTable,
    capture_panics: bool,
}

/// Why a session produced no parse output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub code: Code,
    pub message: String,
    pub position: Position,
}

impl From<ParseError> for SessionFailure {
    fn from(error: ParseError) -> Self {
        Self {
            code: error.error_code(),
            message: error.to_string(),
            position: error.position().unwrap_or_else(Position::zero),
        }
    }
}

impl SessionFailure {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());

        Self {
            code: codes::composer::UNHANDLED_PARSE_EXCEPTION,
            message: format!("Unhandled exception during parse: {}", detail),
            position: Position::zero(),
        }
    }
}

pub struct SessionOutcome {
    /// Complete on success, partial on failure
    pub table: SymbolTable,
    pub result: Result<ParseOutput, SessionFailure>,
    pub parse_duration: Duration,
}

impl<'c> ParseSession<'c> {
    pub fn new(
        host: &'c LanguageSpec,
        languages: &'c IndexMap<String, LanguageSpec>,
        triggers: &'c TriggerSet,
        table: SymbolTable,
        capture_panics: bool,
    ) -> Self {
        Self {
            host,
            languages,
            triggers,
            table,
            capture_panics,
        }
    }

    pub fn run(self, content: &str) -> SessionOutcome {
        let Self {
            host,
            languages,
            triggers,
            mut table,
            capture_panics,
        } = self;

        let started = Instant::now();
        let parse = |table: &mut SymbolTable| -> Result<ParseOutput, ParseError> {
            ContextParser::new(content, host, languages, triggers, table)?.parse()
        };

        let result = if capture_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| parse(&mut table))) {
                Ok(result) => result.map_err(SessionFailure::from),
                Err(payload) => Err(SessionFailure::from_panic(payload)),
            }
        } else {
            parse(&mut table).map_err(SessionFailure::from)
        };

        SessionOutcome {
            table,
            result,
            parse_duration: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payloads_become_failures() {
        let failure = SessionFailure::from_panic(Box::new("index out of bounds"));
        assert_eq!(failure.code, codes::composer::UNHANDLED_PARSE_EXCEPTION);
        assert_eq!(failure.position, Position::zero());
        assert!(failure.message.ends_with("index out of bounds"));

        let failure = SessionFailure::from_panic(Box::new(String::from("boom")));
        assert!(failure.message.ends_with("boom"));

        let failure = SessionFailure::from_panic(Box::new(42_u8));
        assert!(failure.message.ends_with("unknown panic payload"));
    }
}
