use assert_matches::assert_matches;
use grammar_composer::logging::codes;
use grammar_composer::context::BindingTarget;
use grammar_composer::{
    ComposerConfig, ConflictPolicy, ContextTrigger, EmbeddedGrammarComposer, EmbeddedLanguageConfig, FindingCategory,
    FindingSeverity, Grammar, GrammarResolutionError, InheritanceResolver, MergeStrategy, SymbolKind,
};

fn composer() -> EmbeddedGrammarComposer {
    let _ = grammar_composer::logging::init_global_logging();
    EmbeddedGrammarComposer::new().expect("default composer")
}

#[test]
fn derived_alternatives_follow_base_alternatives() {
    let mut resolver = InheritanceResolver::new();
    resolver
        .register_grammar(Grammar::builder("B").rule("R", ["'x'"]).build())
        .unwrap();
    resolver
        .register_grammar(Grammar::builder("G").extends("B").rule("R", ["'y'"]).build())
        .unwrap();

    let effective = resolver.resolve("G").unwrap();
    assert_eq!(
        effective.alternatives("R"),
        Some(&["'x'".to_string(), "'y'".to_string()][..])
    );
    assert_eq!(effective.lineage, vec!["B".to_string(), "G".to_string()]);
}

#[test]
fn mutual_inheritance_is_rejected() {
    let mut resolver = InheritanceResolver::new();
    resolver
        .register_grammar(Grammar::builder("A").extends("B").rule("a", ["'a'"]).build())
        .unwrap();
    resolver
        .register_grammar(Grammar::builder("B").extends("A").rule("b", ["'b'"]).build())
        .unwrap();

    let err = resolver.resolve("A").unwrap_err();
    assert_matches!(err, GrammarResolutionError::CyclicInheritance { ref cycle } if cycle.first() == cycle.last());
}

#[test]
fn script_region_returns_to_host() {
    let composer = composer();
    let result = composer.parse_embedded_document(
        "<html><body><script>var count = 1;</script><p>done</p></body></html>",
    );

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.performance_metrics.max_context_depth, 2);
    assert_eq!(result.performance_metrics.context_switches, 2);

    let tree = result.parse_tree.as_ref().unwrap();
    let script = tree.embedded().next().unwrap();
    assert_eq!(script.context_depth, 2);
    assert!(tree.elements().any(|node| node.tag() == Some("p")));
    assert!(result.symbol_table.has_html_element("p"));
}

#[test]
fn isolated_language_stays_out_of_host_listing() {
    let mut composer = composer();
    let source = "<div id=\"app\"></div><script>function hidden() {}</script>";

    let merged = composer.parse_embedded_document(source);
    assert!(merged
        .symbol_table
        .get_symbols_for_language("HTML")
        .iter()
        .any(|s| s.name == "hidden"));

    composer
        .register_embedded_language(
            EmbeddedLanguageConfig::javascript().with_merge_strategy(MergeStrategy::Isolated),
        )
        .unwrap();
    let isolated = composer.parse_embedded_document(source);

    assert!(isolated.success);
    assert!(!isolated
        .symbol_table
        .get_symbols_for_language("HTML")
        .iter()
        .any(|s| s.name == "hidden"));
    assert!(isolated
        .symbol_table
        .find_visible("JavaScript", SymbolKind::Function, "hidden")
        .is_none());
}

#[test]
fn missing_id_selector_is_a_single_error() {
    let composer = composer();
    let result = composer.parse_embedded_document(
        "<div id=\"app\"></div>\n<style>#missing { color: red }</style>",
    );
    assert!(result.success);

    let validation = composer.validate_cross_language_references(&result);
    assert!(!validation.is_valid);
    assert_eq!(validation.errors.len(), 1);

    let error = &validation.errors[0];
    assert_eq!(error.severity, FindingSeverity::Error);
    assert_eq!(error.source_language, "CSS");
    assert_eq!(error.target_language, "HTML");
    assert_eq!(error.reference_name.as_deref(), Some("missing"));
    assert!(error.message.contains("missing"));
    assert_eq!(error.position.line, 2);
}

#[test]
fn identical_input_gives_identical_results() {
    let source = "<div class=\"card\" id=\"app\"></div>\
                  <style>.cards { margin: 0 } #nav { color: red } span { color: blue }</style>\
                  <script>document.getElementById('ap'); function unused() {}</script>";

    let first = composer().parse_embedded_document(source);
    let second = composer().parse_embedded_document(source);
    assert_eq!(first.validation_results, second.validation_results);
    assert!(first.validation_results.finding_count() >= 4);

    let composer = composer();
    let again = composer.parse_embedded_document(source);
    let once_more = composer.parse_embedded_document(source);
    assert_eq!(again.validation_results, once_more.validation_results);
    assert_eq!(again.validation_results, first.validation_results);
}

#[test]
fn unmatched_selectors_warn_with_suggestions() {
    let composer = composer();
    let result = composer.parse_embedded_document(
        "<div class=\"card\"></div><style>.cards { margin: 0 } .ghost { color: red }</style>",
    );
    assert!(result.validation_results.is_valid);

    let unused = result.validation_results.findings_by_category(FindingCategory::Unused);
    assert_eq!(unused.len(), 2);
    assert!(unused.iter().all(|f| f.severity == FindingSeverity::Warning));
    assert_eq!(unused[0].suggestions, vec!["Did you mean '.card'?".to_string()]);
    assert_eq!(unused[1].suggestions, vec!["Remove unused rule '.ghost'".to_string()]);
}

#[test]
fn events_and_lookups_are_checked_against_markup() {
    let composer = composer();
    let result = composer.parse_embedded_document(
        "<button id=\"save\" onclick=\"save()\" onclik=\"save()\">Save</button>\
         <script>function save() {} document.getElementById('sav');</script>",
    );
    let validation = &result.validation_results;

    let events = validation.findings_by_category(FindingCategory::InvalidEvent);
    assert_eq!(events.len(), 1);
    assert!(events[0].suggestions.contains(&"Did you mean 'click'?".to_string()));

    assert_eq!(validation.errors.len(), 1);
    assert_eq!(validation.errors[0].reference_name.as_deref(), Some("sav"));
    assert_eq!(validation.errors[0].suggestions, vec!["Did you mean 'save'?".to_string()]);
    assert_eq!(result.artifacts.event_bindings.len(), 2);
    assert!(result.binding_count() >= 3);
}

#[test]
fn listener_on_missing_id_is_reported_once_at_the_lookup() {
    let composer = composer();
    let result = composer.parse_embedded_document(
        "<div id=\"app\"></div>\n\
         <script>function go() {}\ndocument.getElementById('nowhere').addEventListener('click', go);</script>",
    );
    assert_matches!(
        &result.artifacts.event_bindings[..],
        [binding] if binding.target == BindingTarget::Id("nowhere".into())
    );

    let validation = &result.validation_results;
    assert_eq!(validation.errors.len(), 1);
    assert_eq!(validation.errors[0].reference_name.as_deref(), Some("nowhere"));
    assert_eq!(validation.errors[0].code, codes::validation::MISSING_REFERENCE);
    assert_eq!(validation.errors[0].position.line, 3);
    assert!(validation.warnings.is_empty());
}

#[test]
fn findings_across_categories_follow_the_document() {
    let _ = grammar_composer::logging::init_global_logging();
    let mut config = ComposerConfig::default();
    config.symbols.conflict_policy = ConflictPolicy::Error;
    config.validation.report_unused_functions = true;
    config.validation.report_unmatched_selectors = true;
    let composer = EmbeddedGrammarComposer::with_config(config).expect("composer");

    let result = composer.parse_embedded_document(
        "<style>#ghost { color: red } .nope { margin: 0 }</style>\n\
         <div id=\"a\"></div>\n\
         <div id=\"a\"></div>\n\
         <script>function unused() {}</script>",
    );
    let validation = &result.validation_results;

    let sequence = |findings: &[grammar_composer::Finding]| -> Vec<(u32, FindingCategory, String)> {
        findings
            .iter()
            .map(|f| (f.position.line, f.category, f.reference_name.clone().unwrap_or_default()))
            .collect()
    };
    assert_eq!(
        sequence(validation.errors.as_slice()),
        vec![
            (1, FindingCategory::MissingReference, "ghost".to_string()),
            (3, FindingCategory::SymbolConflict, "a".to_string()),
        ]
    );
    assert_eq!(
        sequence(validation.warnings.as_slice()),
        vec![
            (1, FindingCategory::Unused, "nope".to_string()),
            (4, FindingCategory::Unused, "unused".to_string()),
        ]
    );
    assert!(validation.suggestions.is_empty());
}

#[test]
fn fatal_condition_yields_one_error() {
    let composer = composer();
    let result = composer.parse_embedded_document("<div class=\"a\"></div><style>p { color: red }");

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, codes::context::UNCLOSED_CONTEXT);
    assert!(result.parse_tree.is_none());
    assert!(result.symbol_table.has_html_class("a"));
    assert_eq!(result.validation_results.finding_count(), 0);
}

#[test]
fn result_serializes_for_collaborators() {
    let composer = composer();
    let result = composer.parse_embedded_document(
        "<div id=\"app\"></div><style>#app { color: red }</style><script>document.querySelector('#app')</script>",
    );
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["cross_references"].as_array().unwrap().len(), 2);
    assert_eq!(json["cross_references"][0]["resolved"], true);
    assert!(json["dom_bindings"].is_array());
    assert!(json["style_bindings"].is_array());
    assert!(json["event_bindings"].is_array());
    assert_eq!(json["validation_results"]["is_valid"], true);
    assert!(json["symbol_table"].is_object());
    assert!(json["symbol_table_report"].is_object());
    assert!(json["performance_metrics"]["bytes_processed"].as_u64().unwrap() > 0);
}

#[test]
fn languages_load_from_toml() {
    let mut composer = composer();
    let config = EmbeddedLanguageConfig::from_toml_str(
        r#"
        name = "Expr"
        kind = "other"
        grammar_source = """
            grammar Expr;
            expr : WORD+ ;
            WORD : /[A-Za-z.]+/ ;
        """

        [[context_triggers]]
        kind = "content"
        pattern = "{{"
        terminator = "}}"
        target_context = "Expr"
        "#,
    )
    .unwrap();
    composer.register_embedded_language(config).unwrap();

    let result = composer.parse_embedded_document("<p>{{ user.name }}</p><p>{{ user.email }}</p>");
    assert!(result.success);
    assert_eq!(result.performance_metrics.embedded_regions, 2);
    assert!(result.warnings.is_empty());

    let tolerant = ComposerConfig::from_toml_str(
        r#"
        [composer]
        include_parse_tree = false

        [validation]
        extra_event_kinds = ["clik"]
        "#,
    )
    .unwrap();
    let composer = EmbeddedGrammarComposer::with_config(tolerant).unwrap();
    let result = composer.parse_embedded_document("<a onclik=\"go()\"></a><script>function go() {}</script>");
    assert!(result.parse_tree.is_none());
    assert!(result
        .validation_results
        .findings_by_category(FindingCategory::InvalidEvent)
        .is_empty());
}

#[test]
fn reregistration_is_idempotent() {
    let mut composer = composer();
    let extra = EmbeddedLanguageConfig::css().with_trigger(ContextTrigger::element("x-style", "CSS"));

    composer.register_embedded_language(extra.clone()).unwrap();
    let first = composer.triggers().len();
    composer.register_embedded_language(extra).unwrap();

    assert_eq!(composer.triggers().len(), first);
    assert_eq!(composer.languages().count(), 2);

    let result = composer.parse_embedded_document("<x-style>.a { color: red }</x-style><i class=\"a\"></i>");
    assert!(result.success);
    assert_eq!(result.performance_metrics.embedded_regions, 1);
}
