//! Cross-language validation
//!
//! Checks the references and bindings collected during a parse against the
//! merged symbol table. Findings never abort anything; they are collected
//! into a [`ValidationResult`].

pub mod rules;
pub mod suggest;
pub mod types;
pub mod validator;

pub use rules::{CrossLanguageRule, CustomCheck, ValidatorKind, BUILTIN_HANDLERS, KNOWN_EVENTS};
pub use types::{Finding, FindingCategory, FindingSeverity, ValidationResult};
pub use validator::{resolve_references, CrossLanguageValidator};
