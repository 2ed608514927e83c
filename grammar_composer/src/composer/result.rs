//! Parse results handed to collaborators

use super::metrics::PerformanceMetrics;
use crate::context::{NodeKind, ParseArtifacts, ParseTree};
use crate::logging::{codes, Code};
use crate::symbols::{SymbolTable, SymbolTableReport};
use crate::utils::Position;
use crate::validation::ValidationResult;
use serde::Serialize;

/// A parse-level error or warning, separate from validation findings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub message: String,
    pub position: Position,
    pub code: Code,
}

impl ParseDiagnostic {
    pub fn new(code: Code, message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
            code,
        }
    }
}

/// Everything one `parse_embedded_document` call produces.
///
/// The symbol table serializes as its snapshot; the collected references
/// and bindings appear at the top level.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddedParseResult {
    pub success: bool,
    pub parse_tree: Option<ParseTree>,
    pub symbol_table: SymbolTable,
    #[serde(flatten)]
    pub artifacts: ParseArtifacts,
    pub validation_results: ValidationResult,
    pub symbol_table_report: SymbolTableReport,
    pub performance_metrics: PerformanceMetrics,
    pub errors: Vec<ParseDiagnostic>,
    pub warnings: Vec<ParseDiagnostic>,
}

impl EmbeddedParseResult {
    /// A failed parse: one error, whatever symbols were recorded before the
    /// failure, nothing else
    pub fn failure(table: SymbolTable, error: ParseDiagnostic, metrics: PerformanceMetrics) -> Self {
        Self {
            success: false,
            parse_tree: None,
            symbol_table_report: table.report(),
            symbol_table: table,
            artifacts: ParseArtifacts::default(),
            validation_results: ValidationResult::new(),
            performance_metrics: metrics,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn binding_count(&self) -> usize {
        self.artifacts.binding_count()
    }
}

/// Warnings about the parse itself: regions with text no token matched and
/// references dropped at the collection limit
pub(crate) fn parse_warnings(tree: &ParseTree, artifacts: &ParseArtifacts) -> Vec<ParseDiagnostic> {
    let mut warnings: Vec<ParseDiagnostic> = tree
        .embedded()
        .filter_map(|node| match &node.kind {
            NodeKind::Embedded {
                language,
                unmatched_bytes,
                ..
            } if *unmatched_bytes > 0 => Some(ParseDiagnostic::new(
                codes::context::UNMATCHED_REGION_TEXT,
                format!(
                    "{} bytes of the {} region matched no token of its grammar",
                    unmatched_bytes, language
                ),
                node.span.start,
            )),
            _ => None,
        })
        .collect();

    if artifacts.dropped_references > 0 {
        warnings.push(ParseDiagnostic::new(
            codes::validation::REFERENCE_LIMIT_REACHED,
            format!(
                "{} cross-references were not recorded after the per-parse limit",
                artifacts.dropped_references
            ),
            Position::zero(),
        ));
    }

    warnings
}
