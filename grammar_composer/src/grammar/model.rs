//! Grammar model
//!
//! A [`Grammar`] is immutable once built. Derived grammars name their bases;
//! the [`InheritanceResolver`](super::InheritanceResolver) turns the chain
//! into an [`EffectiveGrammar`](super::EffectiveGrammar).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A production rule as declared in one grammar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRule {
    pub name: String,
    pub alternatives: Vec<String>,
    /// Replace inherited alternatives instead of appending to them
    pub is_override: bool,
}

/// Lexical token definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TokenPattern {
    Regex(String),
    Literal(String),
}

impl TokenPattern {
    /// Regex source equivalent to this pattern
    pub fn to_regex_source(&self) -> String {
        match self {
            TokenPattern::Regex(source) => source.clone(),
            TokenPattern::Literal(text) => regex::escape(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    name: String,
    rules: IndexMap<String, ProductionRule>,
    tokens: IndexMap<String, TokenPattern>,
    base_grammars: Vec<String>,
}

impl Grammar {
    pub fn builder(name: impl Into<String>) -> GrammarBuilder {
        GrammarBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &IndexMap<String, ProductionRule> {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&ProductionRule> {
        self.rules.get(name)
    }

    pub fn tokens(&self) -> &IndexMap<String, TokenPattern> {
        &self.tokens
    }

    pub fn base_grammars(&self) -> &[String] {
        &self.base_grammars
    }

    /// Copy of this grammar with extra base grammars appended.
    ///
    /// Bases already declared, and the grammar's own name, are skipped.
    pub fn with_additional_bases<I, S>(&self, bases: I) -> Grammar
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut composed = self.clone();
        for base in bases {
            let base = base.into();
            if base != composed.name && !composed.base_grammars.contains(&base) {
                composed.base_grammars.push(base);
            }
        }
        composed
    }
}

/// Builder for [`Grammar`]
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    grammar: Grammar,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            grammar: Grammar {
                name: name.into(),
                rules: IndexMap::new(),
                tokens: IndexMap::new(),
                base_grammars: Vec::new(),
            },
        }
    }

    pub fn extends(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        if !self.grammar.base_grammars.contains(&base) {
            self.grammar.base_grammars.push(base);
        }
        self
    }

    /// Add alternatives to a rule; repeated calls for one name accumulate
    pub fn rule<I, S>(self, name: impl Into<String>, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_rule(name.into(), alternatives, false)
    }

    /// Add a rule that replaces inherited alternatives
    pub fn override_rule<I, S>(self, name: impl Into<String>, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_rule(name.into(), alternatives, true)
    }

    fn add_rule<I, S>(mut self, name: String, alternatives: I, is_override: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rule = self
            .grammar
            .rules
            .entry(name.clone())
            .or_insert_with(|| ProductionRule {
                name,
                alternatives: Vec::new(),
                is_override: false,
            });

        rule.is_override |= is_override;
        for alternative in alternatives {
            let alternative = normalize_alternative(&alternative.into());
            if !rule.alternatives.contains(&alternative) {
                rule.alternatives.push(alternative);
            }
        }
        self
    }

    /// Define a token; a later definition of the same name replaces it
    pub fn token(mut self, name: impl Into<String>, pattern: TokenPattern) -> Self {
        self.grammar.tokens.insert(name.into(), pattern);
        self
    }

    pub fn build(self) -> Grammar {
        self.grammar
    }
}

/// Collapse runs of whitespace so textual duplicates compare equal
pub(crate) fn normalize_alternative(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_and_dedups_alternatives() {
        let grammar = Grammar::builder("G")
            .extends("B")
            .extends("B")
            .rule("R", ["a  b", "c"])
            .rule("R", ["a b", "d"])
            .build();

        assert_eq!(grammar.base_grammars(), ["B".to_string()]);
        assert_eq!(grammar.rule("R").unwrap().alternatives, vec!["a b", "c", "d"]);
        assert!(!grammar.rule("R").unwrap().is_override);
    }

    #[test]
    fn test_with_additional_bases_skips_self_and_existing() {
        let host = Grammar::builder("HTML").extends("Base").build();
        let composed = host.with_additional_bases(["CSS", "Base", "HTML", "JavaScript"]);

        assert_eq!(composed.base_grammars(), ["Base", "CSS", "JavaScript"]);
        // source grammar untouched
        assert_eq!(host.base_grammars(), ["Base"]);
    }

    #[test]
    fn test_literal_token_escapes_to_regex() {
        assert_eq!(TokenPattern::Literal("a.b".into()).to_regex_source(), r"a\.b");
    }
}
