//! Every code the composer emits, with the metadata used to classify and
//! report it.
//!
//! Error codes drive [`ParseDiagnostic`](crate::ParseDiagnostic) and
//! [`Finding`](crate::Finding) classification; success codes tag info-level
//! log events.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    System,
    Grammar,
    Context,
    Symbols,
    Validation,
    Composer,
    Success,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::System => "System",
            Category::Grammar => "Grammar",
            Category::Context => "Context",
            Category::Symbols => "Symbols",
            Category::Validation => "Validation",
            Category::Composer => "Composer",
            Category::Success => "Success",
        }
    }
}

/// Whether processing can go on after a code is raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Halt,
    Continue,
}

#[derive(Debug, Clone)]
pub struct CodeInfo {
    pub code: Code,
    pub category: Category,
    pub severity: Severity,
    pub disposition: Disposition,
    pub description: &'static str,
    pub action: &'static str,
}

impl CodeInfo {
    pub fn requires_halt(&self) -> bool {
        self.disposition == Disposition::Halt
    }
}

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Grammar model and inheritance resolution
pub mod grammar {
    use super::Code;

    pub const CYCLIC_INHERITANCE: Code = Code::new("G001");
    pub const UNKNOWN_GRAMMAR: Code = Code::new("G002");
    pub const UNKNOWN_BASE_GRAMMAR: Code = Code::new("G003");
    pub const INVALID_TOKEN_PATTERN: Code = Code::new("G004");
    pub const INHERITANCE_TOO_DEEP: Code = Code::new("G005");
    pub const GRAMMAR_SOURCE_SYNTAX: Code = Code::new("G006");
    pub const REGISTRY_FULL: Code = Code::new("G007");
    pub const RULE_LIMIT_EXCEEDED: Code = Code::new("G008");
}

/// Context stack and embedded-region scanning
pub mod context {
    use super::Code;

    pub const UNMATCHED_TERMINATOR: Code = Code::new("C001");
    pub const POP_PAST_ROOT: Code = Code::new("C002");
    pub const UNCLOSED_CONTEXT: Code = Code::new("C003");
    pub const DEPTH_EXCEEDED: Code = Code::new("C004");
    pub const MISMATCHED_POP: Code = Code::new("C005");
    pub const DOCUMENT_TOO_LARGE: Code = Code::new("C006");
    pub const INVALID_TRIGGER_PATTERN: Code = Code::new("C007");
    pub const UNMATCHED_REGION_TEXT: Code = Code::new("C008");
}

/// Symbol table
pub mod symbols {
    use super::Code;

    pub const SYMBOL_CONFLICT: Code = Code::new("S001");
    pub const SYMBOL_LIMIT_EXCEEDED: Code = Code::new("S002");
    pub const SCOPE_LIMIT_EXCEEDED: Code = Code::new("S003");
    pub const UNKNOWN_SCOPE: Code = Code::new("S004");
}

/// Cross-language validation findings
pub mod validation {
    use super::Code;

    pub const MISSING_REFERENCE: Code = Code::new("V001");
    pub const UNUSED_DECLARATION: Code = Code::new("V002");
    pub const INVALID_EVENT: Code = Code::new("V003");
    pub const UNRESOLVED_HANDLER: Code = Code::new("V004");
    pub const CUSTOM_RULE_VIOLATION: Code = Code::new("V005");
    pub const FINDING_LIMIT_REACHED: Code = Code::new("V006");
    pub const REFERENCE_LIMIT_REACHED: Code = Code::new("V007");
}

/// Composer boundary
pub mod composer {
    use super::Code;

    pub const UNHANDLED_PARSE_EXCEPTION: Code = Code::new("P001");
    pub const LANGUAGE_NOT_REGISTERED: Code = Code::new("P002");
    pub const INVALID_LANGUAGE_CONFIG: Code = Code::new("P003");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const GRAMMAR_REGISTERED: Code = Code::new("I010");
    pub const GRAMMAR_RESOLVED: Code = Code::new("I011");

    pub const LANGUAGE_REGISTERED: Code = Code::new("I020");

    pub const DOCUMENT_PARSED: Code = Code::new("I030");
    pub const SYMBOL_TABLE_BUILT: Code = Code::new("I040");

    pub const VALIDATION_COMPLETE: Code = Code::new("I050");
    pub const VALIDATION_PASSED: Code = Code::new("I051");
}

const fn entry(
    code: Code,
    category: Category,
    severity: Severity,
    disposition: Disposition,
    description: &'static str,
    action: &'static str,
) -> CodeInfo {
    CodeInfo {
        code,
        category,
        severity,
        disposition,
        description,
        action,
    }
}

use Disposition::{Continue, Halt};
use Severity::{Critical, High, Low, Medium};

static REGISTRY: &[CodeInfo] = &[
    // System
    entry(
        system::INTERNAL_ERROR,
        Category::System,
        Critical,
        Halt,
        "Critical internal error",
        "File a bug report with the input that triggered it",
    ),
    entry(
        system::INITIALIZATION_FAILURE,
        Category::System,
        Critical,
        Halt,
        "Logging or configuration initialization failure",
        "Check configuration values and environment",
    ),
    // Grammar
    entry(
        grammar::CYCLIC_INHERITANCE,
        Category::Grammar,
        High,
        Halt,
        "A grammar reappears on its own inheritance path",
        "Remove one of the base-grammar edges forming the cycle",
    ),
    entry(
        grammar::UNKNOWN_GRAMMAR,
        Category::Grammar,
        High,
        Halt,
        "Requested grammar is not registered",
        "Register the grammar before resolving it",
    ),
    entry(
        grammar::UNKNOWN_BASE_GRAMMAR,
        Category::Grammar,
        High,
        Halt,
        "A declared base grammar is not registered",
        "Register the base grammar or fix the extends clause",
    ),
    entry(
        grammar::INVALID_TOKEN_PATTERN,
        Category::Grammar,
        High,
        Halt,
        "Token pattern is not a valid regular expression",
        "Fix the token pattern syntax",
    ),
    entry(
        grammar::INHERITANCE_TOO_DEEP,
        Category::Grammar,
        High,
        Halt,
        "Inheritance chain exceeds the maximum depth",
        "Flatten the grammar hierarchy",
    ),
    entry(
        grammar::GRAMMAR_SOURCE_SYNTAX,
        Category::Grammar,
        High,
        Halt,
        "Grammar source text is malformed",
        "Fix the grammar source at the reported position",
    ),
    entry(
        grammar::REGISTRY_FULL,
        Category::Grammar,
        High,
        Halt,
        "Grammar registry is full",
        "Use a separate resolver or fewer grammars",
    ),
    entry(
        grammar::RULE_LIMIT_EXCEEDED,
        Category::Grammar,
        High,
        Halt,
        "Effective grammar exceeds the rule limit",
        "Split the grammar",
    ),
    // Context
    entry(
        context::UNMATCHED_TERMINATOR,
        Category::Context,
        High,
        Halt,
        "Context terminator without a matching opener",
        "Remove the stray terminator or add its opener",
    ),
    entry(
        context::POP_PAST_ROOT,
        Category::Context,
        Critical,
        Halt,
        "Attempted to pop the root context",
        "Check terminator balance in the document",
    ),
    entry(
        context::UNCLOSED_CONTEXT,
        Category::Context,
        High,
        Halt,
        "Embedded context opened but never closed",
        "Add the missing terminator",
    ),
    entry(
        context::DEPTH_EXCEEDED,
        Category::Context,
        High,
        Halt,
        "Context nesting exceeds the maximum depth",
        "Reduce nesting of embedded regions",
    ),
    entry(
        context::MISMATCHED_POP,
        Category::Context,
        High,
        Halt,
        "Terminator closes a context that is not the innermost one",
        "Close inner embedded regions first",
    ),
    entry(
        context::DOCUMENT_TOO_LARGE,
        Category::Context,
        High,
        Halt,
        "Document exceeds the maximum accepted size",
        "Split the document before parsing",
    ),
    entry(
        context::INVALID_TRIGGER_PATTERN,
        Category::Context,
        High,
        Halt,
        "Context trigger pattern is not a valid regular expression",
        "Fix the trigger pattern in the language configuration",
    ),
    entry(
        context::UNMATCHED_REGION_TEXT,
        Category::Context,
        Low,
        Continue,
        "Embedded region contains text no token of its grammar matches",
        "Extend the language grammar's token patterns",
    ),
    // Symbols
    entry(
        symbols::SYMBOL_CONFLICT,
        Category::Symbols,
        Medium,
        Continue,
        "Same-scope symbol collision under the error conflict policy",
        "Rename one of the colliding declarations",
    ),
    entry(
        symbols::SYMBOL_LIMIT_EXCEEDED,
        Category::Symbols,
        High,
        Halt,
        "Symbol count exceeds the per-parse limit",
        "Reduce document size",
    ),
    entry(
        symbols::SCOPE_LIMIT_EXCEEDED,
        Category::Symbols,
        High,
        Halt,
        "Scope count exceeds the per-parse limit",
        "Reduce the number of embedded regions",
    ),
    entry(
        symbols::UNKNOWN_SCOPE,
        Category::Symbols,
        Critical,
        Halt,
        "Symbol references a scope that does not exist",
        "File a bug report",
    ),
    // Validation
    entry(
        validation::MISSING_REFERENCE,
        Category::Validation,
        Medium,
        Continue,
        "Cross-language reference target does not exist",
        "Declare the target or fix the reference name",
    ),
    entry(
        validation::UNUSED_DECLARATION,
        Category::Validation,
        Low,
        Continue,
        "Declaration is never referenced",
        "Remove the declaration or reference it",
    ),
    entry(
        validation::INVALID_EVENT,
        Category::Validation,
        Low,
        Continue,
        "Event kind is not recognised",
        "Use a standard event name",
    ),
    entry(
        validation::UNRESOLVED_HANDLER,
        Category::Validation,
        Low,
        Continue,
        "Event handler is not declared in any script context",
        "Declare the handler function",
    ),
    entry(
        validation::CUSTOM_RULE_VIOLATION,
        Category::Validation,
        Medium,
        Continue,
        "Custom cross-language rule violated",
        "See the rule message",
    ),
    entry(
        validation::FINDING_LIMIT_REACHED,
        Category::Validation,
        Low,
        Continue,
        "Finding limit reached, further findings dropped",
        "Fix reported findings and re-run",
    ),
    entry(
        validation::REFERENCE_LIMIT_REACHED,
        Category::Validation,
        Low,
        Continue,
        "Cross-reference limit reached, further references not recorded",
        "Split the document before parsing",
    ),
    // Composer
    entry(
        composer::UNHANDLED_PARSE_EXCEPTION,
        Category::Composer,
        Critical,
        Halt,
        "Unhandled exception during parse",
        "File a bug report with the input that triggered it",
    ),
    entry(
        composer::LANGUAGE_NOT_REGISTERED,
        Category::Composer,
        High,
        Continue,
        "Embedded language is not registered",
        "Register the language before referring to it",
    ),
    entry(
        composer::INVALID_LANGUAGE_CONFIG,
        Category::Composer,
        High,
        Continue,
        "Embedded language configuration is invalid",
        "Fix the language configuration",
    ),
    // Success
    entry(
        success::OPERATION_COMPLETED_SUCCESSFULLY,
        Category::Success,
        Low,
        Continue,
        "Operation completed successfully",
        "No action required",
    ),
    entry(
        success::SYSTEM_INITIALIZATION_COMPLETED,
        Category::Success,
        Low,
        Continue,
        "Logging system initialized",
        "No action required",
    ),
    // Grammar
    entry(
        success::GRAMMAR_REGISTERED,
        Category::Grammar,
        Low,
        Continue,
        "Grammar registered",
        "No action required",
    ),
    entry(
        success::GRAMMAR_RESOLVED,
        Category::Grammar,
        Low,
        Continue,
        "Grammar resolved",
        "No action required",
    ),
    // Composer
    entry(
        success::LANGUAGE_REGISTERED,
        Category::Composer,
        Low,
        Continue,
        "Embedded language registered",
        "No action required",
    ),
    entry(
        success::DOCUMENT_PARSED,
        Category::Composer,
        Low,
        Continue,
        "Document parsed",
        "No action required",
    ),
    // Symbols
    entry(
        success::SYMBOL_TABLE_BUILT,
        Category::Symbols,
        Low,
        Continue,
        "Symbol table built",
        "No action required",
    ),
    // Validation
    entry(
        success::VALIDATION_COMPLETE,
        Category::Validation,
        Low,
        Continue,
        "Cross-language validation completed",
        "Review reported findings",
    ),
    entry(
        success::VALIDATION_PASSED,
        Category::Validation,
        Low,
        Continue,
        "Cross-language validation passed without errors",
        "No action required",
    ),
];

pub fn lookup(code: Code) -> Option<&'static CodeInfo> {
    REGISTRY.iter().find(|info| info.code == code)
}

/// Unknown codes are treated as medium severity
pub fn severity(code: Code) -> Severity {
    lookup(code).map_or(Severity::Medium, |info| info.severity)
}

/// Unknown codes never halt
pub fn requires_halt(code: Code) -> bool {
    lookup(code).is_some_and(CodeInfo::requires_halt)
}

pub fn category(code: Code) -> &'static str {
    lookup(code).map_or("Unknown", |info| info.category.as_str())
}

pub fn action(code: Code) -> &'static str {
    lookup(code).map_or("No specific action available", |info| info.action)
}
