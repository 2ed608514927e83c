//! Validation findings and results

use crate::logging::Code;
use crate::utils::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    Error,
    Warning,
    Suggestion,
}

impl FindingSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSeverity::Error => "error",
            FindingSeverity::Warning => "warning",
            FindingSeverity::Suggestion => "suggestion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    /// A reference whose target does not exist
    MissingReference,
    /// A declaration nothing refers to
    Unused,
    InvalidEvent,
    SymbolConflict,
    Custom,
}

impl FindingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCategory::MissingReference => "missing_reference",
            FindingCategory::Unused => "unused",
            FindingCategory::InvalidEvent => "invalid_event",
            FindingCategory::SymbolConflict => "symbol_conflict",
            FindingCategory::Custom => "custom",
        }
    }
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub message: String,
    pub position: Position,
    pub severity: FindingSeverity,
    pub category: FindingCategory,
    pub source_language: String,
    pub target_language: String,
    /// Name the finding is about, when there is one
    pub reference_name: Option<String>,
    pub code: Code,
    pub suggestions: Vec<String>,
}

impl Finding {
    pub fn new(
        severity: FindingSeverity,
        category: FindingCategory,
        code: Code,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            message: message.into(),
            position,
            severity,
            category,
            source_language: String::new(),
            target_language: String::new(),
            reference_name: None,
            code,
            suggestions: Vec::new(),
        }
    }

    pub fn between(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_language = source.into();
        self.target_language = target.into();
        self
    }

    pub fn about(mut self, name: impl Into<String>) -> Self {
        self.reference_name = Some(name.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} at {}:{}",
            self.severity.as_str(),
            self.code,
            self.message,
            self.position.line,
            self.position.column
        )
    }
}

/// Outcome of cross-language validation.
///
/// Each list is in source order by finding offset. Findings sharing an
/// offset keep the order their checks ran in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub suggestions: Vec<Finding>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    /// File a finding under its severity
    pub fn push(&mut self, finding: Finding) {
        match finding.severity {
            FindingSeverity::Error => {
                self.is_valid = false;
                self.errors.push(finding);
            }
            FindingSeverity::Warning => self.warnings.push(finding),
            FindingSeverity::Suggestion => self.suggestions.push(finding),
        }
    }

    pub fn finding_count(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.suggestions.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn findings_by_category(&self, category: FindingCategory) -> Vec<&Finding> {
        self.errors
            .iter()
            .chain(&self.warnings)
            .chain(&self.suggestions)
            .filter(|f| f.category == category)
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "Cross-language validation: {} errors, {} warnings, {} suggestions, valid: {}",
            self.errors.len(),
            self.warnings.len(),
            self.suggestions.len(),
            self.is_valid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_push_files_by_severity() {
        let mut result = ValidationResult::new();
        assert!(result.is_valid);

        result.push(Finding::new(
            FindingSeverity::Warning,
            FindingCategory::Unused,
            codes::validation::UNUSED_DECLARATION,
            "unused",
            Position::start(),
        ));
        assert!(result.is_valid);

        result.push(
            Finding::new(
                FindingSeverity::Error,
                FindingCategory::MissingReference,
                codes::validation::MISSING_REFERENCE,
                "missing",
                Position::new(4, 1, 5),
            )
            .between("CSS", "HTML")
            .about("app"),
        );

        assert!(!result.is_valid);
        assert_eq!(result.finding_count(), 2);
        assert_eq!(result.findings_by_category(FindingCategory::Unused).len(), 1);
        assert_eq!(result.errors[0].to_string(), "error [V001] missing at 1:5");
    }
}
