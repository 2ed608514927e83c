//! Embedded grammar composition
//!
//! [`EmbeddedGrammarComposer`] is the public entry point. It owns the grammar
//! registry and the embedded-language registrations, composes the host
//! grammar so it inherits from every embedded grammar, and runs each
//! document through a fresh [`ParseSession`] followed by cross-language
//! validation.

mod config;
mod error;
mod metrics;
mod result;
mod session;

pub use config::EmbeddedLanguageConfig;
pub use error::ComposerError;
pub use metrics::PerformanceMetrics;
pub use result::{EmbeddedParseResult, ParseDiagnostic};
pub use session::{ParseSession, SessionFailure, SessionOutcome};

use crate::config::compile_time::context::MAX_CONTEXT_TRIGGERS;
use crate::config::ComposerConfig;
use crate::context::{
    CompiledTrigger, ContextTrigger, LanguageKind, LanguageSpec, ParseOutput, TriggerError,
    TriggerSet,
};
use crate::grammar::{builtin, EffectiveGrammar, Grammar, InheritanceResolver};
use crate::logging::codes;
use crate::symbols::{SymbolTable, Visibility};
use crate::utils::Position;
use crate::validation::{resolve_references, CrossLanguageRule, CrossLanguageValidator, ValidationResult};
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct RegisteredLanguage {
    config: EmbeddedLanguageConfig,
    triggers: Vec<CompiledTrigger>,
}

/// Composes a host grammar with embedded languages and parses documents
/// that mix them.
///
/// Parsing takes `&self`: every call builds its own session, so results of
/// one document never leak into the next.
#[derive(Debug)]
pub struct EmbeddedGrammarComposer {
    config: ComposerConfig,
    resolver: InheritanceResolver,
    /// Host grammar as registered, before embedded bases are added
    host_grammar: Grammar,
    languages: IndexMap<String, RegisteredLanguage>,
    /// Resolved host followed by every embedded language
    specs: IndexMap<String, LanguageSpec>,
    triggers: TriggerSet,
    custom_rules: Vec<CrossLanguageRule>,
}

impl EmbeddedGrammarComposer {
    /// Composer with default preferences, HTML as host and CSS and
    /// JavaScript embedded
    pub fn new() -> Result<Self, ComposerError> {
        Self::with_config(ComposerConfig::default())
    }

    /// The host must name one of the built-in grammars
    pub fn with_config(config: ComposerConfig) -> Result<Self, ComposerError> {
        let host = config.composer.host_language.clone();
        let host_grammar = [builtin::html()?, builtin::css()?, builtin::javascript()?]
            .into_iter()
            .find(|grammar| grammar.name() == host)
            .ok_or(ComposerError::LanguageNotRegistered { language: host })?;
        Self::with_host_grammar(config, host_grammar)
    }

    /// Composer whose host is `host_grammar`. The built-in grammars are
    /// registered alongside it; CSS and JavaScript are embedded unless one of
    /// them is the host.
    pub fn with_host_grammar(config: ComposerConfig, host_grammar: Grammar) -> Result<Self, ComposerError> {
        config.validate()?;

        let host = config.composer.host_language.clone();
        if host_grammar.name() != host {
            return Err(ComposerError::invalid_language(
                host_grammar.name(),
                format!("host grammar must be named '{}'", host),
            ));
        }

        let mut resolver = InheritanceResolver::new();
        for grammar in [builtin::html()?, builtin::css()?, builtin::javascript()?] {
            if grammar.name() != host {
                resolver.register_grammar(grammar)?;
            }
        }

        let mut composer = Self {
            config,
            resolver,
            host_grammar,
            languages: IndexMap::new(),
            specs: IndexMap::new(),
            triggers: TriggerSet::new(),
            custom_rules: Vec::new(),
        };
        composer.recompose()?;

        for language in [EmbeddedLanguageConfig::css(), EmbeddedLanguageConfig::javascript()] {
            if language.name != host {
                composer.register_embedded_language(language)?;
            }
        }

        crate::log_success!(codes::success::OPERATION_COMPLETED_SUCCESSFULLY, "Embedded grammar composer ready",
            "host" => &host,
            "languages" => composer.languages.len(),
            "triggers" => composer.triggers.len()
        );

        Ok(composer)
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn host_language(&self) -> &str {
        &self.config.composer.host_language
    }

    pub fn resolver(&self) -> &InheritanceResolver {
        &self.resolver
    }

    /// Embedded languages in registration order
    pub fn languages(&self) -> impl Iterator<Item = &EmbeddedLanguageConfig> {
        self.languages.values().map(|language| &language.config)
    }

    pub fn language(&self, name: &str) -> Option<&EmbeddedLanguageConfig> {
        self.languages.get(name).map(|language| &language.config)
    }

    pub fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    // ===== REGISTRATION =====

    /// Register or replace a grammar. Replacing the host grammar keeps the
    /// inheritance edges to every embedded language.
    ///
    /// If the new grammar cannot be composed, the previously composed
    /// grammars stay in effect for parsing.
    pub fn register_grammar(&mut self, grammar: Grammar) -> Result<(), ComposerError> {
        if grammar.name() == self.host_language() {
            self.host_grammar = grammar;
        } else {
            self.resolver.register_grammar(grammar)?;
        }
        self.recompose()
    }

    pub fn resolve_grammar(&mut self, name: &str) -> Result<Arc<EffectiveGrammar>, ComposerError> {
        Ok(self.resolver.resolve(name)?)
    }

    /// Register an embedded language, replacing any earlier registration of
    /// the same name in place.
    ///
    /// On error nothing changes except that a grammar carried by `config`
    /// may remain in the registry.
    pub fn register_embedded_language(&mut self, config: EmbeddedLanguageConfig) -> Result<(), ComposerError> {
        let triggers = self.check_language(&config)?;
        let name = config.name.clone();
        let trigger_count = triggers.len();

        let replaced_grammar = match &config.grammar {
            Some(grammar) => {
                let previous = self.resolver.grammar(&name).map(|g| Grammar::clone(g));
                self.resolver.register_grammar(grammar.clone())?;
                previous
            }
            None => None,
        };

        let previous = self
            .languages
            .insert(name.clone(), RegisteredLanguage { config, triggers });

        if let Err(err) = self.recompose() {
            crate::log_error!(err.error_code(), "Embedded language registration rolled back",
                "language" => &name,
                "reason" => &err
            );
            match previous {
                Some(previous) => {
                    self.languages.insert(name, previous);
                }
                None => {
                    self.languages.shift_remove(&name);
                }
            }
            if let Some(grammar) = replaced_grammar {
                self.resolver.register_grammar(grammar)?;
            }
            self.recompose()?;
            return Err(err);
        }

        crate::log_success!(codes::success::LANGUAGE_REGISTERED, "Embedded language registered",
            "language" => &name,
            "triggers" => trigger_count,
            "replaced" => previous.is_some()
        );

        Ok(())
    }

    /// Rules are consulted in order: custom rules first, then the built-in
    /// checks of the host and of each embedded language
    pub fn add_validation_rule(&mut self, rule: CrossLanguageRule) {
        self.custom_rules.push(rule);
    }

    pub fn rules(&self) -> Vec<CrossLanguageRule> {
        let host = self.host_language();
        let mut rules = self.custom_rules.clone();
        rules.extend(CrossLanguageRule::builtin_for(host, LanguageKind::Markup, host));
        for (name, language) in &self.languages {
            rules.extend(CrossLanguageRule::builtin_for(name, language.config.kind, host));
        }
        rules
    }

    fn check_language(&self, config: &EmbeddedLanguageConfig) -> Result<Vec<CompiledTrigger>, ComposerError> {
        let name = config.name.as_str();
        if name.trim().is_empty() {
            return Err(ComposerError::invalid_language(name, "language name is empty"));
        }
        if name == self.host_language() {
            return Err(ComposerError::invalid_language(name, "the host language cannot be embedded"));
        }
        if config.kind == LanguageKind::Markup {
            return Err(ComposerError::invalid_language(name, "markup is only supported as the host"));
        }

        match &config.grammar {
            Some(grammar) if grammar.name() != name => {
                return Err(ComposerError::invalid_language(
                    name,
                    format!("grammar is named '{}'", grammar.name()),
                ));
            }
            Some(_) => {}
            None if !self.resolver.is_registered(name) => {
                return Err(ComposerError::LanguageNotRegistered {
                    language: name.to_string(),
                });
            }
            None => {}
        }

        for trigger in &config.context_triggers {
            let target = trigger.target_context.as_str();
            if target != name && !self.languages.contains_key(target) {
                return Err(ComposerError::invalid_language(
                    name,
                    format!("trigger '{}' targets unknown language '{}'", trigger.pattern, target),
                ));
            }
        }

        let triggers = config
            .context_triggers
            .iter()
            .map(ContextTrigger::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let others: usize = self
            .languages
            .iter()
            .filter(|(registered, _)| registered.as_str() != name)
            .map(|(_, language)| language.triggers.len())
            .sum();
        if others + triggers.len() > MAX_CONTEXT_TRIGGERS {
            return Err(TriggerError::TooManyTriggers {
                limit: MAX_CONTEXT_TRIGGERS,
            }
            .into());
        }

        Ok(triggers)
    }

    /// Re-register the host with every embedded language as a base, then
    /// rebuild the parser's language specs and trigger set
    fn recompose(&mut self) -> Result<(), ComposerError> {
        let host = self.host_language().to_string();
        let composed = self.host_grammar.with_additional_bases(self.languages.keys());
        self.resolver.register_grammar(composed)?;

        let mut specs = IndexMap::with_capacity(self.languages.len() + 1);
        specs.insert(
            host.clone(),
            LanguageSpec {
                name: host.clone(),
                kind: LanguageKind::Markup,
                grammar: self.resolver.resolve(&host)?,
            },
        );
        for (name, language) in &self.languages {
            specs.insert(
                name.clone(),
                LanguageSpec {
                    name: name.clone(),
                    kind: language.config.kind,
                    grammar: self.resolver.resolve(name)?,
                },
            );
        }

        self.specs = specs;
        self.triggers = TriggerSet::from_compiled(
            self.languages
                .values()
                .flat_map(|language| language.triggers.iter().cloned())
                .collect(),
        );
        Ok(())
    }

    // ===== PARSING =====

    fn new_table(&self) -> SymbolTable {
        let preferences = &self.config.symbols;
        let mut table = SymbolTable::new(self.host_language(), preferences.conflict_policy)
            .with_default_strategy(preferences.default_merge_strategy)
            .with_case_insensitive_elements(preferences.case_insensitive_elements);
        for (name, language) in &self.languages {
            let strategy = language
                .config
                .symbol_table_merge_strategy
                .unwrap_or(preferences.default_merge_strategy);
            table.set_merge_strategy(name, strategy);
        }
        table
    }

    /// Parse a document in the host language, switching into embedded
    /// languages at their triggers, then validate across languages.
    ///
    /// Never fails: fatal conditions come back as `success: false` with a
    /// single error and whatever symbols were recorded before the failure.
    pub fn parse_embedded_document(&self, content: &str) -> EmbeddedParseResult {
        let started = Instant::now();
        let preferences = &self.config.composer;

        crate::log_debug!("Parsing embedded document",
            "bytes" => content.len(),
            "languages" => self.languages.len()
        );

        let Some(host) = self.specs.get(self.host_language()) else {
            let failure = ParseDiagnostic::new(
                codes::composer::LANGUAGE_NOT_REGISTERED,
                format!("Host language '{}' has no composed grammar", self.host_language()),
                Position::zero(),
            );
            return EmbeddedParseResult::failure(self.new_table(), failure, PerformanceMetrics::default());
        };

        let session = ParseSession::new(
            host,
            &self.specs,
            &self.triggers,
            self.new_table(),
            preferences.capture_panics,
        );
        let SessionOutcome {
            table,
            result,
            parse_duration,
        } = session.run(content);

        let output = match result {
            Ok(output) => output,
            Err(failure) => {
                crate::log_error!(failure.code, "Embedded document parse failed",
                    "reason" => &failure.message,
                    "line" => failure.position.line,
                    "column" => failure.position.column
                );
                let mut metrics = PerformanceMetrics {
                    symbol_count: table.total_symbols(),
                    bytes_processed: content.len(),
                    ..PerformanceMetrics::default()
                };
                if preferences.collect_performance_metrics {
                    metrics.record_durations(started.elapsed(), parse_duration, Duration::ZERO);
                }
                let error = ParseDiagnostic::new(failure.code, failure.message, failure.position);
                return EmbeddedParseResult::failure(table, error, metrics);
            }
        };

        let ParseOutput {
            tree,
            mut artifacts,
            stats,
        } = output;
        let resolved = resolve_references(&table, &mut artifacts);
        crate::log_success!(codes::success::SYMBOL_TABLE_BUILT, "Symbol table built",
            "symbols" => table.total_symbols(),
            "scopes" => table.scopes().len(),
            "conflicts" => table.conflicts().len(),
            "resolved" => resolved
        );

        let validation_started = Instant::now();
        let validation_results = if preferences.validate_after_parse {
            let rules = self.rules();
            CrossLanguageValidator::new(&table, &artifacts, &rules, &self.config.validation).validate()
        } else {
            ValidationResult::new()
        };
        let validation_duration = validation_started.elapsed();

        let mut metrics = PerformanceMetrics::from_stats(&stats);
        metrics.symbol_count = table.total_symbols();
        metrics.cross_reference_count = artifacts.cross_references.len();
        metrics.binding_count = artifacts.binding_count();
        if preferences.collect_performance_metrics {
            metrics.record_durations(started.elapsed(), parse_duration, validation_duration);
        }

        if self.config.symbols.log_isolated_symbols {
            let isolated = table
                .symbols()
                .iter()
                .filter(|symbol| symbol.visibility == Visibility::Private)
                .count();
            crate::log_info!("Isolated symbols recorded", "count" => isolated);
        }

        let warnings = result::parse_warnings(&tree, &artifacts);

        crate::log_performance!(codes::success::DOCUMENT_PARSED, "Embedded document parsed",
            duration = started.elapsed(),
            "bytes" => content.len(),
            "symbols" => metrics.symbol_count,
            "cross_references" => metrics.cross_reference_count,
            "resolved" => resolved,
            "context_switches" => stats.switch_count,
            "findings" => validation_results.finding_count()
        );

        EmbeddedParseResult {
            success: true,
            parse_tree: preferences.include_parse_tree.then_some(tree),
            symbol_table_report: table.report(),
            symbol_table: table,
            artifacts,
            validation_results,
            performance_metrics: metrics,
            errors: Vec::new(),
            warnings,
        }
    }

    /// Validate a stored result again with the current rules and
    /// preferences, without re-parsing
    pub fn validate_cross_language_references(&self, result: &EmbeddedParseResult) -> ValidationResult {
        let rules = self.rules();
        CrossLanguageValidator::new(&result.symbol_table, &result.artifacts, &rules, &self.config.validation)
            .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TriggerKind;
    use crate::grammar::TokenPattern;
    use crate::symbols::{MergeStrategy, SymbolKind};
    use crate::validation::{CustomCheck, FindingCategory, FindingSeverity, ValidatorKind};
    use assert_matches::assert_matches;

    fn composer() -> EmbeddedGrammarComposer {
        let _ = crate::logging::init_global_logging();
        EmbeddedGrammarComposer::new().unwrap()
    }

    fn expr_language() -> EmbeddedLanguageConfig {
        EmbeddedLanguageConfig::new("Expr", LanguageKind::Other)
            .with_grammar(
                Grammar::builder("Expr")
                    .rule("expr", ["WORD+"])
                    .token("WORD", TokenPattern::Regex("[A-Za-z.]+".into()))
                    .build(),
            )
            .with_trigger(ContextTrigger::content("{{", "}}", "Expr"))
    }

    #[test]
    fn test_default_composition() {
        let mut composer = composer();
        let names: Vec<&str> = composer.languages().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["CSS", "JavaScript"]);
        assert_eq!(composer.triggers().len(), 5);

        let host = composer.resolve_grammar("HTML").unwrap();
        assert!(host.inherits_from("CSS"));
        assert!(host.inherits_from("JavaScript"));
        assert_eq!(host.lineage.last().map(String::as_str), Some("HTML"));
    }

    #[test]
    fn test_unknown_host_is_rejected() {
        let mut config = ComposerConfig::default();
        config.composer.host_language = "XML".into();
        let err = EmbeddedGrammarComposer::with_config(config).unwrap_err();
        assert_matches!(err, ComposerError::LanguageNotRegistered { ref language } if language == "XML");
    }

    #[test]
    fn test_register_language_with_content_trigger() {
        let mut composer = composer();
        composer.register_embedded_language(expr_language()).unwrap();

        assert!(composer.resolve_grammar("HTML").unwrap().inherits_from("Expr"));
        let result = composer.parse_embedded_document("<p>{{ user.name }}</p>");
        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.performance_metrics.max_context_depth, 2);
        assert_eq!(result.performance_metrics.context_switches, 2);
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut composer = composer();
        let css = EmbeddedLanguageConfig::css()
            .with_trigger(ContextTrigger::element("x-style", "CSS"))
            .with_merge_strategy(MergeStrategy::Isolated);
        composer.register_embedded_language(css.clone()).unwrap();
        composer.register_embedded_language(css).unwrap();

        let names: Vec<&str> = composer.languages().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["CSS", "JavaScript"]);
        assert_eq!(composer.language("CSS").unwrap().context_triggers.len(), 3);
        assert_eq!(composer.triggers().len(), 6);
    }

    #[test]
    fn test_invalid_language_configs() {
        let mut composer = composer();

        let err = composer
            .register_embedded_language(EmbeddedLanguageConfig::new("HTML", LanguageKind::Other))
            .unwrap_err();
        assert_matches!(err, ComposerError::InvalidLanguageConfig { .. });

        let err = composer
            .register_embedded_language(EmbeddedLanguageConfig::new("SVG", LanguageKind::Markup))
            .unwrap_err();
        assert_matches!(err, ComposerError::InvalidLanguageConfig { .. });

        let err = composer
            .register_embedded_language(EmbeddedLanguageConfig::new("Lua", LanguageKind::Script))
            .unwrap_err();
        assert_matches!(err, ComposerError::LanguageNotRegistered { ref language } if language == "Lua");

        let stray = expr_language().with_trigger(ContextTrigger::element("lua", "Lua"));
        let err = composer.register_embedded_language(stray).unwrap_err();
        assert_matches!(err, ComposerError::InvalidLanguageConfig { ref reason, .. } if reason.contains("Lua"));

        let bad = expr_language().with_trigger(ContextTrigger::attribute("(", "Expr"));
        let err = composer.register_embedded_language(bad).unwrap_err();
        assert_matches!(err, ComposerError::Trigger(TriggerError::InvalidPattern { .. }));

        assert_eq!(composer.languages().count(), 2);
    }

    #[test]
    fn test_cyclic_language_is_rolled_back() {
        let mut composer = composer();
        let cyclic = EmbeddedLanguageConfig::new("Tpl", LanguageKind::Other)
            .with_grammar(Grammar::builder("Tpl").extends("HTML").rule("tpl", ["'x'"]).build())
            .with_trigger(ContextTrigger::content("[[", "]]", "Tpl"));

        let err = composer.register_embedded_language(cyclic).unwrap_err();
        assert_matches!(err, ComposerError::Grammar(_));
        assert!(composer.language("Tpl").is_none());
        assert_eq!(composer.triggers().len(), 5);

        let result = composer.parse_embedded_document("<p>[[ x ]]</p>");
        assert!(result.success);
        assert_eq!(result.performance_metrics.context_switches, 0);
    }

    #[test]
    fn test_failure_keeps_partial_table() {
        let composer = composer();
        let result = composer.parse_embedded_document("<div id=\"a\"></div>\n</script>");

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, codes::context::UNMATCHED_TERMINATOR);
        assert_eq!(result.errors[0].position.line, 2);
        assert!(result.parse_tree.is_none());
        assert!(result.symbol_table.has_html_id("a"));
    }

    #[test]
    fn test_parses_do_not_share_state() {
        let composer = composer();
        let first = composer.parse_embedded_document("<div id=\"a\"></div>");
        let second = composer.parse_embedded_document("<div id=\"b\"></div>");

        assert!(first.symbol_table.has_html_id("a"));
        assert!(!second.symbol_table.has_html_id("a"));
        assert!(second.symbol_table.has_html_id("b"));
    }

    #[test]
    fn test_custom_rule_takes_precedence() {
        let mut composer = composer();
        composer.add_validation_rule(CrossLanguageRule::new(
            "strict-classes",
            "CSS",
            "HTML",
            ValidatorKind::Custom(CustomCheck {
                reference_kind: crate::context::ReferenceKind::Class,
                target_kind: SymbolKind::Class,
                severity: FindingSeverity::Error,
                category: FindingCategory::MissingReference,
                message: "Class '{name}' is required".into(),
            }),
        ));

        let result = composer
            .parse_embedded_document("<div class=\"card\"></div><style>.cards { color: red }</style>");
        let validation = &result.validation_results;
        assert!(!validation.is_valid);
        assert_eq!(validation.errors.len(), 1);
        assert_eq!(validation.errors[0].message, "Class 'cards' is required");
        assert_eq!(validation.errors[0].code, codes::validation::CUSTOM_RULE_VIOLATION);
        assert!(validation.findings_by_category(FindingCategory::Unused).is_empty());
    }

    #[test]
    fn test_revalidation_matches_parse() {
        let composer = composer();
        let result =
            composer.parse_embedded_document("<div id=\"app\"></div><style>#apq { color: red }</style>");
        let again = composer.validate_cross_language_references(&result);
        assert_eq!(again, result.validation_results);
        assert_eq!(again.errors[0].suggestions, vec!["Did you mean '#app'?".to_string()]);
    }

    #[test]
    fn test_preferences_shape_the_result() {
        let _ = crate::logging::init_global_logging();
        let mut config = ComposerConfig::default();
        config.composer.include_parse_tree = false;
        config.composer.collect_performance_metrics = false;
        config.composer.validate_after_parse = false;
        let composer = EmbeddedGrammarComposer::with_config(config).unwrap();

        let result = composer.parse_embedded_document("<style>#missing { color: red }</style>");
        assert!(result.success);
        assert!(result.parse_tree.is_none());
        assert_eq!(result.performance_metrics.total_duration_us, 0);
        assert_eq!(result.validation_results.finding_count(), 0);
        assert_eq!(composer.validate_cross_language_references(&result).error_count(), 1);
    }

    #[test]
    fn test_conflict_and_missing_reference_in_source_order() {
        let _ = crate::logging::init_global_logging();
        let mut config = ComposerConfig::default();
        config.symbols.conflict_policy = crate::symbols::ConflictPolicy::Error;
        let composer = EmbeddedGrammarComposer::with_config(config).unwrap();

        let result = composer.parse_embedded_document(
            "<style>#ghost { color: red }</style>\n<div id=\"a\"></div>\n<div id=\"a\"></div>",
        );
        let errors = &result.validation_results.errors;
        let lines: Vec<u32> = errors.iter().map(|e| e.position.line).collect();
        assert_eq!(lines, vec![1, 3]);
        assert_eq!(errors[0].category, FindingCategory::MissingReference);
        assert_eq!(errors[1].category, FindingCategory::SymbolConflict);
    }

    #[test]
    fn test_success_path_logs_completion_codes() {
        let composer = composer();
        let result = composer.parse_embedded_document(
            "<div id=\"app\"></div><script>document.getElementById('app');</script>",
        );
        assert!(result.success);

        let Some(memory) = crate::logging::global_logger()
            .filter(|service| service.enabled(crate::logging::LogLevel::Info))
            .and_then(|service| service.memory())
        else {
            return;
        };
        for code in [
            codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
            codes::success::GRAMMAR_RESOLVED,
            codes::success::SYMBOL_TABLE_BUILT,
            codes::success::VALIDATION_COMPLETE,
        ] {
            assert!(!memory.with_code(code).is_empty(), "{}", code);
        }
    }

    #[test]
    fn test_builtin_rule_order() {
        let composer = composer();
        let rules = composer.rules();
        let names: Vec<&str> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["html-events", "css-selectors", "javascript-dom-lookups", "javascript-events"]
        );
        assert_eq!(composer.triggers().iter().filter(|t| t.kind() == TriggerKind::ElementEnd).count(), 1);
    }
}
