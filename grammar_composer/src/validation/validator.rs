//! Cross-language validation over one parse's symbol table and artifacts
//!
//! Findings come out in source order, keyed by the offset each one points
//! at. Findings at the same offset keep the order the checks run in:
//! symbol conflicts, cross-references, event bindings, unused declarations.
//! The same input always yields the same result.

use super::rules::{CrossLanguageRule, CustomCheck, ValidatorKind, BUILTIN_HANDLERS, KNOWN_EVENTS};
use super::suggest::nearest_names;
use super::types::{Finding, FindingCategory, FindingSeverity, ValidationResult};
use crate::config::compile_time::validation::MAX_FINDINGS;
use crate::config::ValidationPreferences;
use crate::context::{CrossReference, EventBinding, ParseArtifacts, ReferenceKind, ReferenceOrigin};
use crate::logging::codes;
use crate::symbols::{SymbolKind, SymbolTable};
use crate::utils::Position;
use std::collections::HashSet;

pub struct CrossLanguageValidator<'v> {
    table: &'v SymbolTable,
    artifacts: &'v ParseArtifacts,
    rules: &'v [CrossLanguageRule],
    preferences: &'v ValidationPreferences,
}

/// Accumulates findings, then orders and caps them
#[derive(Default)]
struct Collector {
    findings: Vec<Finding>,
}

impl Collector {
    fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Stable sort by offset, then keep the first `MAX_FINDINGS`
    fn finish(mut self) -> ValidationResult {
        self.findings.sort_by_key(|finding| finding.position.offset);
        let truncated = self.findings.len() > MAX_FINDINGS;
        self.findings.truncate(MAX_FINDINGS);

        let mut result = ValidationResult::new();
        for finding in self.findings {
            result.push(finding);
        }
        if truncated {
            result.push(Finding::new(
                FindingSeverity::Warning,
                FindingCategory::Custom,
                codes::validation::FINDING_LIMIT_REACHED,
                format!("Finding limit of {} reached; remaining findings dropped", MAX_FINDINGS),
                Position::zero(),
            ));
        }
        result
    }
}

/// Host-visible functions and variables an event handler may name
struct Callables<'v> {
    names: Vec<&'v str>,
    lookup: HashSet<&'v str>,
}

impl<'v> CrossLanguageValidator<'v> {
    /// `rules` are consulted in order; the first rule covering a reference
    /// decides how it is checked
    pub fn new(
        table: &'v SymbolTable,
        artifacts: &'v ParseArtifacts,
        rules: &'v [CrossLanguageRule],
        preferences: &'v ValidationPreferences,
    ) -> Self {
        Self {
            table,
            artifacts,
            rules,
            preferences,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut collector = Collector::default();

        self.check_conflicts(&mut collector);
        for reference in &self.artifacts.cross_references {
            self.check_reference(reference, &mut collector);
        }
        let callables = self.callables();
        for binding in &self.artifacts.event_bindings {
            self.check_event(binding, &callables, &mut collector);
        }
        if self.preferences.report_unused_functions {
            self.check_unused_functions(&mut collector);
        }

        let result = collector.finish();
        if result.is_valid {
            crate::log_success!(codes::success::VALIDATION_PASSED, "Cross-language validation passed",
                "warnings" => result.warning_count(),
                "suggestions" => result.suggestions.len()
            );
        }
        crate::log_success!(codes::success::VALIDATION_COMPLETE, "Cross-language validation complete",
            "errors" => result.error_count(),
            "warnings" => result.warning_count(),
            "suggestions" => result.suggestions.len(),
            "references" => self.artifacts.cross_references.len()
        );
        result
    }

    fn suggest<'a>(&self, name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        nearest_names(name, candidates, self.preferences.max_suggestions_per_finding)
    }

    // ===== CONFLICTS =====

    fn check_conflicts(&self, collector: &mut Collector) {
        for conflict in self.table.conflicts() {
            collector.push(
                Finding::new(
                    FindingSeverity::Error,
                    FindingCategory::SymbolConflict,
                    conflict.error_code(),
                    conflict.to_string(),
                    conflict.duplicate,
                )
                .between(&conflict.language, &conflict.language)
                .about(&conflict.name),
            );
        }
    }

    // ===== REFERENCES =====

    fn check_reference(&self, reference: &CrossReference, collector: &mut Collector) {
        if reference.isolated {
            return;
        }

        let Some(rule) = self.rules.iter().find(|rule| {
            rule.applies_to(&reference.source_language, &reference.target_language)
                && rule.validator.covers(reference.kind)
        }) else {
            return;
        };

        let target_kind = match &rule.validator {
            ValidatorKind::Custom(check) => check.target_kind,
            _ => reference.kind.symbol_kind(),
        };
        if self
            .table
            .find_visible(&reference.target_language, target_kind, &reference.name)
            .is_some()
        {
            return;
        }

        let finding = match &rule.validator {
            ValidatorKind::Custom(check) => Some(self.custom_finding(reference, check)),
            _ => self.missing_target(reference),
        };
        if let Some(finding) = finding {
            collector.push(finding);
        }
    }

    fn missing_target(&self, reference: &CrossReference) -> Option<Finding> {
        let known = self
            .table
            .names_of_kind(&reference.target_language, reference.kind.symbol_kind());
        let near = self.suggest(&reference.name, known);

        let finding = match (&reference.origin, reference.kind) {
            (ReferenceOrigin::StyleRule { selector }, ReferenceKind::Id) => Finding::new(
                FindingSeverity::Error,
                FindingCategory::MissingReference,
                codes::validation::MISSING_REFERENCE,
                format!(
                    "Selector '{}' references id '{}' which is not defined in {}",
                    selector, reference.name, reference.target_language
                ),
                reference.source_position,
            )
            .with_suggestions(did_you_mean(reference.kind, near, true)),

            (ReferenceOrigin::StyleRule { selector }, kind) => {
                if !self.preferences.report_unmatched_selectors {
                    return None;
                }
                let mut suggestions = did_you_mean(kind, near, true);
                if suggestions.is_empty() {
                    suggestions.push(format!("Remove unused rule '{}'", selector));
                }
                Finding::new(
                    FindingSeverity::Warning,
                    FindingCategory::Unused,
                    codes::validation::UNUSED_DECLARATION,
                    format!(
                        "Style rule '{}' matches no {} '{}' in {}",
                        selector,
                        kind.as_str(),
                        reference.name,
                        reference.target_language
                    ),
                    reference.source_position,
                )
                .with_suggestions(suggestions)
            }

            (ReferenceOrigin::DomLookup { method }, kind) => Finding::new(
                if kind == ReferenceKind::Id {
                    FindingSeverity::Error
                } else {
                    FindingSeverity::Warning
                },
                FindingCategory::MissingReference,
                codes::validation::MISSING_REFERENCE,
                format!(
                    "{} looks up {} '{}' which is not defined in {}",
                    method,
                    kind.as_str(),
                    reference.name,
                    reference.target_language
                ),
                reference.source_position,
            )
            .with_suggestions(did_you_mean(kind, near, false)),
        };

        Some(
            finding
                .between(&reference.source_language, &reference.target_language)
                .about(&reference.name),
        )
    }

    fn custom_finding(&self, reference: &CrossReference, check: &CustomCheck) -> Finding {
        let known = self
            .table
            .names_of_kind(&reference.target_language, check.target_kind);
        let near = self.suggest(&reference.name, known);

        Finding::new(
            check.severity,
            check.category,
            codes::validation::CUSTOM_RULE_VIOLATION,
            check.message.replace("{name}", &reference.name),
            reference.source_position,
        )
        .between(&reference.source_language, &reference.target_language)
        .about(&reference.name)
        .with_suggestions(did_you_mean(reference.kind, near, false))
    }

    // ===== EVENTS =====

    /// Event kind and handler checks. A listener attached through a DOM
    /// lookup is checked for its target by that lookup's cross-reference.
    fn check_event(&self, binding: &EventBinding, callables: &Callables<'_>, collector: &mut Collector) {
        if binding.isolated {
            return;
        }

        let Some(rule) = self.rules.iter().find(|rule| {
            rule.source_language == binding.source_language
                && rule.validator == ValidatorKind::EventValid
        }) else {
            return;
        };
        let target_language = rule.target_language.as_str();

        let known_event = KNOWN_EVENTS.contains(&binding.event.as_str())
            || self
                .preferences
                .extra_event_kinds
                .iter()
                .any(|extra| extra.eq_ignore_ascii_case(&binding.event));
        if !known_event {
            let near = self.suggest(&binding.event, KNOWN_EVENTS.iter().copied());
            collector.push(
                Finding::new(
                    FindingSeverity::Warning,
                    FindingCategory::InvalidEvent,
                    codes::validation::INVALID_EVENT,
                    format!("Unknown event kind '{}'", binding.event),
                    binding.position,
                )
                .between(&binding.source_language, target_language)
                .about(&binding.event)
                .with_suggestions(near.into_iter().map(|e| format!("Did you mean '{}'?", e)).collect()),
            );
        }

        if let Some(handler) = &binding.handler {
            self.check_handler(binding, handler, target_language, callables, collector);
        }
    }

    fn callables(&self) -> Callables<'v> {
        let names: Vec<&'v str> = self
            .table
            .get_symbols_for_language(self.table.host_language())
            .into_iter()
            .filter(|s| matches!(s.kind, SymbolKind::Function | SymbolKind::Variable))
            .map(|s| s.name.as_str())
            .collect();
        let lookup = names.iter().copied().collect();
        Callables { names, lookup }
    }

    fn check_handler(
        &self,
        binding: &EventBinding,
        handler: &str,
        target_language: &str,
        callables: &Callables<'_>,
        collector: &mut Collector,
    ) {
        if BUILTIN_HANDLERS.contains(&handler) || callables.lookup.contains(handler) {
            return;
        }

        let near = self.suggest(handler, callables.names.iter().copied());
        collector.push(
            Finding::new(
                FindingSeverity::Warning,
                FindingCategory::MissingReference,
                codes::validation::UNRESOLVED_HANDLER,
                format!(
                    "Handler '{}' for '{}' is not a declared function",
                    handler, binding.event
                ),
                binding.position,
            )
            .between(&binding.source_language, target_language)
            .about(handler)
            .with_suggestions(near.into_iter().map(|f| format!("Did you mean '{}'?", f)).collect()),
        );
    }

    // ===== UNUSED DECLARATIONS =====

    fn check_unused_functions(&self, collector: &mut Collector) {
        let host = self.table.host_language();
        let used = self.artifacts.used_names();

        for symbol in self.table.get_symbols_for_language(host) {
            if symbol.kind != SymbolKind::Function
                || !symbol.cross_reference_candidate
                || used.contains(symbol.name.as_str())
            {
                continue;
            }

            collector.push(
                Finding::new(
                    FindingSeverity::Warning,
                    FindingCategory::Unused,
                    codes::validation::UNUSED_DECLARATION,
                    format!("Function '{}' is never called or bound to an event", symbol.name),
                    symbol.position,
                )
                .between(&symbol.language, host)
                .about(&symbol.name)
                .with_suggestions(vec![format!(
                    "Remove '{}' or bind it to an event handler",
                    symbol.name
                )]),
            );
        }
    }
}

fn did_you_mean(kind: ReferenceKind, names: Vec<String>, selector_form: bool) -> Vec<String> {
    names
        .into_iter()
        .map(|name| {
            let shown = if selector_form {
                kind.selector_form(&name)
            } else {
                name
            };
            format!("Did you mean '{}'?", shown)
        })
        .collect()
}

/// Mark references whose target exists as resolved and record where the
/// target was declared. Isolated references stay unresolved.
pub fn resolve_references(table: &SymbolTable, artifacts: &mut ParseArtifacts) -> usize {
    let mut resolved = 0;
    for reference in artifacts.cross_references.iter_mut() {
        if reference.isolated {
            continue;
        }
        if let Some(target) =
            table.find_visible(&reference.target_language, reference.kind.symbol_kind(), &reference.name)
        {
            reference.resolved = true;
            reference.target_position = Some(target.position);
            resolved += 1;
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BindingTarget;
    use crate::symbols::{ConflictPolicy, NewSymbol};

    fn position(offset: usize) -> Position {
        Position::new(offset, 1, offset as u32 + 1)
    }

    struct Fixture {
        table: SymbolTable,
        artifacts: ParseArtifacts,
        rules: Vec<CrossLanguageRule>,
        preferences: ValidationPreferences,
    }

    impl Fixture {
        fn new() -> Self {
            let mut table = SymbolTable::new("HTML", ConflictPolicy::Error);
            let root = table.root_scope();
            for (name, kind) in [
                ("div", SymbolKind::Element),
                ("button", SymbolKind::Element),
                ("app", SymbolKind::Id),
                ("save", SymbolKind::Id),
                ("primary", SymbolKind::Class),
            ] {
                table
                    .add_symbol(root, NewSymbol::new(name, "HTML", kind, position(0)), true)
                    .unwrap();
            }

            let mut rules = CrossLanguageRule::builtin_for("HTML", crate::context::LanguageKind::Markup, "HTML");
            rules.extend(CrossLanguageRule::builtin_for("CSS", crate::context::LanguageKind::Style, "HTML"));
            rules.extend(CrossLanguageRule::builtin_for(
                "JavaScript",
                crate::context::LanguageKind::Script,
                "HTML",
            ));

            Self {
                table,
                artifacts: ParseArtifacts::default(),
                rules,
                preferences: ValidationPreferences {
                    report_unused_functions: true,
                    report_unmatched_selectors: true,
                    max_suggestions_per_finding: 3,
                    extra_event_kinds: vec!["pointerdown".into()],
                },
            }
        }

        fn style_reference(&mut self, name: &str, kind: ReferenceKind, selector: &str, isolated: bool) {
            self.artifacts.add_reference(
                "CSS",
                "HTML",
                name,
                kind,
                ReferenceOrigin::StyleRule {
                    selector: selector.into(),
                },
                position(10),
                isolated,
            );
        }

        fn event(&mut self, event: &str, target: BindingTarget, handler: Option<&str>, language: &str) {
            self.artifacts.event_bindings.push(EventBinding {
                event: event.into(),
                target,
                handler: handler.map(str::to_string),
                source_language: language.into(),
                position: position(20),
                isolated: false,
            });
        }

        fn declare_function(&mut self, name: &str) {
            let root = self.table.root_scope();
            let scope = self.table.open_scope("JavaScript", root, false).unwrap();
            self.table
                .add_symbol(
                    scope,
                    NewSymbol::new(name, "JavaScript", SymbolKind::Function, position(30)),
                    true,
                )
                .unwrap();
        }

        fn validate(&self) -> ValidationResult {
            CrossLanguageValidator::new(&self.table, &self.artifacts, &self.rules, &self.preferences).validate()
        }
    }

    #[test]
    fn test_missing_id_selector_is_single_error() {
        let _ = crate::logging::init_global_logging();
        let mut fixture = Fixture::new();
        fixture.style_reference("missing", ReferenceKind::Id, "#missing", false);
        fixture.style_reference("app", ReferenceKind::Id, "#app", false);

        let result = fixture.validate();
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.warnings.is_empty());

        let error = &result.errors[0];
        assert_eq!(error.source_language, "CSS");
        assert_eq!(error.target_language, "HTML");
        assert_eq!(error.reference_name.as_deref(), Some("missing"));
        assert_eq!(error.category, FindingCategory::MissingReference);
        assert_eq!(error.position, position(10));
    }

    #[test]
    fn test_unmatched_class_selector_warns_with_suggestion() {
        let mut fixture = Fixture::new();
        fixture.style_reference("primay", ReferenceKind::Class, ".primay", false);
        fixture.style_reference("sidebar", ReferenceKind::Class, ".sidebar", false);

        let result = fixture.validate();
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings.iter().all(|w| w.category == FindingCategory::Unused));
        assert_eq!(result.warnings[0].suggestions, vec!["Did you mean '.primary'?"]);
        assert_eq!(result.warnings[1].suggestions, vec!["Remove unused rule '.sidebar'"]);
    }

    #[test]
    fn test_unmatched_selectors_can_be_silenced() {
        let mut fixture = Fixture::new();
        fixture.preferences.report_unmatched_selectors = false;
        fixture.style_reference("span", ReferenceKind::Element, "span", false);
        fixture.style_reference("ghost", ReferenceKind::Id, "#ghost", false);

        let result = fixture.validate();
        assert!(result.warnings.is_empty());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_isolated_references_are_skipped() {
        let mut fixture = Fixture::new();
        fixture.style_reference("missing", ReferenceKind::Id, "#missing", true);
        assert!(fixture.validate().is_valid);
    }

    #[test]
    fn test_dom_lookup_severity_by_kind() {
        let mut fixture = Fixture::new();
        for (name, kind) in [("sav", ReferenceKind::Id), ("card", ReferenceKind::Class)] {
            fixture.artifacts.add_reference(
                "JavaScript",
                "HTML",
                name,
                kind,
                ReferenceOrigin::DomLookup {
                    method: "querySelector".into(),
                },
                position(5),
                false,
            );
        }

        let result = fixture.validate();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].suggestions, vec!["Did you mean 'save'?"]);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].category, FindingCategory::MissingReference);
    }

    #[test]
    fn test_event_checks() {
        let mut fixture = Fixture::new();
        fixture.declare_function("submitForm");
        fixture.event("click", BindingTarget::Id("save".into()), Some("submitForm"), "HTML");
        fixture.event("clik", BindingTarget::Id("save".into()), Some("alert"), "HTML");
        fixture.event("pointerdown", BindingTarget::Id("app".into()), Some("submitFrom"), "HTML");
        fixture.artifacts.add_reference(
            "JavaScript",
            "HTML",
            "nowhere",
            ReferenceKind::Id,
            ReferenceOrigin::DomLookup {
                method: "getElementById".into(),
            },
            position(15),
            false,
        );
        fixture.event("click", BindingTarget::Id("nowhere".into()), None, "JavaScript");

        let result = fixture.validate();

        let invalid = result.findings_by_category(FindingCategory::InvalidEvent);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].suggestions, vec!["Did you mean 'click'?"]);

        assert_eq!(result.warnings[1].code, codes::validation::UNRESOLVED_HANDLER);
        assert_eq!(result.warnings[1].suggestions, vec!["Did you mean 'submitForm'?"]);

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].reference_name.as_deref(), Some("nowhere"));
        assert_eq!(result.errors[0].position, position(15));
    }

    #[test]
    fn test_unused_functions() {
        let mut fixture = Fixture::new();
        fixture.declare_function("init");
        fixture.declare_function("helper");
        fixture.artifacts.usages.push(crate::context::IdentifierUsage {
            name: "init".into(),
            language: "JavaScript".into(),
            position: position(40),
        });

        let result = fixture.validate();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].reference_name.as_deref(), Some("helper"));
        assert_eq!(result.warnings[0].category, FindingCategory::Unused);
        assert!(!result.warnings[0].suggestions.is_empty());

        fixture.preferences.report_unused_functions = false;
        assert!(fixture.validate().warnings.is_empty());
    }

    #[test]
    fn test_findings_follow_source_order() {
        let mut fixture = Fixture::new();
        fixture.style_reference("ghost", ReferenceKind::Id, "#ghost", false);
        let root = fixture.table.root_scope();
        fixture
            .table
            .add_symbol(root, NewSymbol::new("app", "HTML", SymbolKind::Id, position(50)), true)
            .unwrap();
        fixture
            .table
            .add_symbol(root, NewSymbol::new("save", "HTML", SymbolKind::Id, position(10)), true)
            .unwrap();

        let result = fixture.validate();
        let order: Vec<(usize, FindingCategory, Option<&str>)> = result
            .errors
            .iter()
            .map(|e| (e.position.offset, e.category, e.reference_name.as_deref()))
            .collect();
        assert_eq!(
            order,
            vec![
                (10, FindingCategory::SymbolConflict, Some("save")),
                (10, FindingCategory::MissingReference, Some("ghost")),
                (50, FindingCategory::SymbolConflict, Some("app")),
            ]
        );
    }

    #[test]
    fn test_finding_limit_keeps_earliest() {
        let mut collector = Collector::default();
        for offset in (0..=MAX_FINDINGS).rev() {
            collector.push(Finding::new(
                FindingSeverity::Warning,
                FindingCategory::Unused,
                codes::validation::UNUSED_DECLARATION,
                "unused",
                position(offset),
            ));
        }

        let result = collector.finish();
        assert_eq!(result.warnings.len(), MAX_FINDINGS + 1);
        assert_eq!(result.warnings[0].position.offset, 0);
        assert_eq!(result.warnings[MAX_FINDINGS - 1].position.offset, MAX_FINDINGS - 1);
        assert_eq!(result.warnings[MAX_FINDINGS].code, codes::validation::FINDING_LIMIT_REACHED);
    }

    #[test]
    fn test_first_covering_rule_decides() {
        let mut fixture = Fixture::new();
        fixture.rules.insert(
            0,
            CrossLanguageRule::new(
                "css-classes-required",
                "CSS",
                "HTML",
                ValidatorKind::Custom(CustomCheck {
                    reference_kind: ReferenceKind::Class,
                    target_kind: SymbolKind::Class,
                    severity: FindingSeverity::Suggestion,
                    category: FindingCategory::Custom,
                    message: "Add class '{name}' to the markup".into(),
                }),
            ),
        );
        fixture.style_reference("sidebar", ReferenceKind::Class, ".sidebar", false);

        let result = fixture.validate();
        assert!(result.warnings.is_empty());
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].message, "Add class 'sidebar' to the markup");
        assert_eq!(result.suggestions[0].code, codes::validation::CUSTOM_RULE_VIOLATION);
    }

    #[test]
    fn test_validation_is_deterministic() {
        let mut fixture = Fixture::new();
        fixture.style_reference("missing", ReferenceKind::Id, "#missing", false);
        fixture.style_reference("nav", ReferenceKind::Class, ".nav", false);
        fixture.event("hover", BindingTarget::Unknown, Some("go"), "JavaScript");

        assert_eq!(fixture.validate(), fixture.validate());
    }

    #[test]
    fn test_resolve_references() {
        let mut fixture = Fixture::new();
        fixture.style_reference("app", ReferenceKind::Id, "#app", false);
        fixture.style_reference("gone", ReferenceKind::Class, ".gone", false);
        fixture.style_reference("app", ReferenceKind::Id, "#app", true);

        let resolved = resolve_references(&fixture.table, &mut fixture.artifacts);
        assert_eq!(resolved, 1);

        let references = &fixture.artifacts.cross_references;
        assert!(references[0].resolved);
        assert_eq!(references[0].target_position, Some(position(0)));
        assert!(!references[1].resolved);
        assert!(!references[2].resolved);
    }
}
