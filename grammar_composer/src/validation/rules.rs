//! Cross-language rule model
//!
//! Rules are plain data: a language pair plus a [`ValidatorKind`] naming the
//! check to run. The validator interprets them.

use super::types::{FindingCategory, FindingSeverity};
use crate::context::{LanguageKind, ReferenceKind};
use crate::symbols::SymbolKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossLanguageRule {
    pub name: String,
    pub source_language: String,
    pub target_language: String,
    pub validator: ValidatorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorKind {
    /// Every selector or lookup part (id, class, element) must exist
    SelectorExists,
    /// Id references must exist
    IdExists,
    /// Class references must exist
    ClassExists,
    /// Event bindings use known event kinds, existing targets and
    /// declared handlers
    EventValid,
    Custom(CustomCheck),
}

/// A reference kind that must resolve to a symbol of `target_kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCheck {
    pub reference_kind: ReferenceKind,
    pub target_kind: SymbolKind,
    pub severity: FindingSeverity,
    pub category: FindingCategory,
    /// `{name}` is replaced with the reference name
    pub message: String,
}

impl ValidatorKind {
    /// Whether this check covers references of `kind`
    pub fn covers(&self, kind: ReferenceKind) -> bool {
        match self {
            ValidatorKind::SelectorExists => true,
            ValidatorKind::IdExists => kind == ReferenceKind::Id,
            ValidatorKind::ClassExists => kind == ReferenceKind::Class,
            ValidatorKind::EventValid => false,
            ValidatorKind::Custom(check) => check.reference_kind == kind,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidatorKind::SelectorExists => "selector_exists",
            ValidatorKind::IdExists => "id_exists",
            ValidatorKind::ClassExists => "class_exists",
            ValidatorKind::EventValid => "event_valid",
            ValidatorKind::Custom(_) => "custom",
        }
    }
}

impl CrossLanguageRule {
    pub fn new(
        name: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        validator: ValidatorKind,
    ) -> Self {
        Self {
            name: name.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            validator,
        }
    }

    pub fn applies_to(&self, source_language: &str, target_language: &str) -> bool {
        self.source_language == source_language && self.target_language == target_language
    }

    /// Checks every language of a scanner family gets against the host
    pub fn builtin_for(language: &str, kind: LanguageKind, host: &str) -> Vec<CrossLanguageRule> {
        let rule = |check: &str, validator: ValidatorKind| {
            let name = format!("{}-{}", language.to_lowercase(), check);
            CrossLanguageRule::new(name, language, host, validator)
        };

        match kind {
            LanguageKind::Style => vec![rule("selectors", ValidatorKind::SelectorExists)],
            LanguageKind::Script => vec![
                rule("dom-lookups", ValidatorKind::SelectorExists),
                rule("events", ValidatorKind::EventValid),
            ],
            LanguageKind::Markup if language == host => vec![rule("events", ValidatorKind::EventValid)],
            LanguageKind::Markup | LanguageKind::Other => Vec::new(),
        }
    }
}

/// Event kinds accepted by `EventValid` before any configured extension
pub const KNOWN_EVENTS: &[&str] = &[
    "abort", "beforeunload", "blur", "change", "click", "contextmenu", "copy", "cut", "dblclick",
    "domcontentloaded", "drag", "dragend", "dragenter", "dragleave", "dragover", "dragstart",
    "drop", "error", "focus", "focusin", "focusout", "input", "keydown", "keypress", "keyup",
    "load", "mousedown", "mouseenter", "mouseleave", "mousemove", "mouseout", "mouseover",
    "mouseup", "paste", "reset", "resize", "scroll", "select", "submit", "touchcancel",
    "touchend", "touchmove", "touchstart", "unload", "wheel",
];

/// Globals an event handler may name without a declaration
pub const BUILTIN_HANDLERS: &[&str] = &[
    "alert", "confirm", "prompt", "console", "window", "document", "setTimeout", "setInterval",
    "clearTimeout", "clearInterval", "fetch", "history", "location", "event",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_coverage() {
        assert!(ValidatorKind::SelectorExists.covers(ReferenceKind::Element));
        assert!(ValidatorKind::IdExists.covers(ReferenceKind::Id));
        assert!(!ValidatorKind::IdExists.covers(ReferenceKind::Class));
        assert!(!ValidatorKind::EventValid.covers(ReferenceKind::Id));

        let custom = ValidatorKind::Custom(CustomCheck {
            reference_kind: ReferenceKind::Class,
            target_kind: SymbolKind::Class,
            severity: FindingSeverity::Error,
            category: FindingCategory::Custom,
            message: "class '{name}' is required".into(),
        });
        assert!(custom.covers(ReferenceKind::Class));
        assert!(!custom.covers(ReferenceKind::Id));
    }

    #[test]
    fn test_builtin_rules_per_kind() {
        let style = CrossLanguageRule::builtin_for("CSS", LanguageKind::Style, "HTML");
        assert_eq!(style.len(), 1);
        assert_eq!(style[0].name, "css-selectors");
        assert!(style[0].applies_to("CSS", "HTML"));

        let script = CrossLanguageRule::builtin_for("JavaScript", LanguageKind::Script, "HTML");
        assert_eq!(script[1].validator, ValidatorKind::EventValid);

        assert_eq!(CrossLanguageRule::builtin_for("HTML", LanguageKind::Markup, "HTML").len(), 1);
        assert!(CrossLanguageRule::builtin_for("Expr", LanguageKind::Other, "HTML").is_empty());
    }

    #[test]
    fn test_rule_language_pair() {
        let rule = CrossLanguageRule::new("css-ids", "CSS", "HTML", ValidatorKind::IdExists);
        assert!(rule.applies_to("CSS", "HTML"));
        assert!(!rule.applies_to("JavaScript", "HTML"));
    }
}
