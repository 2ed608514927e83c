//! Grammar inheritance resolution
//!
//! Flattens a grammar's base chain depth-first into an [`EffectiveGrammar`].
//! Bases contribute in declared order before the derived grammar. Results
//! are memoized per grammar name and dropped when any grammar in their
//! lineage is re-registered.

use super::error::GrammarResolutionError;
use super::model::{Grammar, TokenPattern};
use crate::config::compile_time::grammar::*;
use crate::logging::codes;
use crate::{log_error, log_success};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// A rule after inheritance, alternatives paired with the grammar that
/// contributed each one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveRule {
    pub alternatives: Vec<String>,
    pub origins: Vec<String>,
}

impl EffectiveRule {
    fn append(&mut self, alternatives: &[String], origin: &str) {
        for alternative in alternatives {
            if !self.alternatives.contains(alternative) {
                self.alternatives.push(alternative.clone());
                self.origins.push(origin.to_string());
            }
        }
    }

    fn replace(&mut self, alternatives: &[String], origin: &str) {
        self.alternatives.clear();
        self.origins.clear();
        self.append(alternatives, origin);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveToken {
    pub pattern: TokenPattern,
    pub origin: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledToken {
    pub name: String,
    pub regex: Regex,
}

/// Flattened, read-only result of resolving a grammar's inheritance chain
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveGrammar {
    pub name: String,
    pub rules: IndexMap<String, EffectiveRule>,
    pub tokens: IndexMap<String, EffectiveToken>,
    /// Every grammar that contributed, bases first, each once
    pub lineage: Vec<String>,
    #[serde(skip)]
    pub(crate) compiled_tokens: Vec<CompiledToken>,
}

impl EffectiveGrammar {
    pub fn alternatives(&self, rule: &str) -> Option<&[String]> {
        self.rules.get(rule).map(|r| r.alternatives.as_slice())
    }

    pub fn has_rule(&self, rule: &str) -> bool {
        self.rules.contains_key(rule)
    }

    pub fn inherits_from(&self, grammar: &str) -> bool {
        self.lineage.iter().any(|g| g == grammar)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn accumulator(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: IndexMap::new(),
            tokens: IndexMap::new(),
            lineage: Vec::new(),
            compiled_tokens: Vec::new(),
        }
    }

    /// Fold an already-resolved base in. Between sibling bases the first
    /// token definition of a name is kept.
    fn merge_base(&mut self, base: &EffectiveGrammar) {
        for (name, rule) in &base.rules {
            match self.rules.get_mut(name) {
                Some(existing) => {
                    for (alternative, origin) in rule.alternatives.iter().zip(&rule.origins) {
                        existing.append(std::slice::from_ref(alternative), origin);
                    }
                }
                None => {
                    self.rules.insert(name.clone(), rule.clone());
                }
            }
        }

        for (name, token) in &base.tokens {
            self.tokens
                .entry(name.clone())
                .or_insert_with(|| token.clone());
        }

        for grammar in &base.lineage {
            if !self.lineage.contains(grammar) {
                self.lineage.push(grammar.clone());
            }
        }
    }

    fn apply_own(&mut self, grammar: &Grammar) {
        let origin = grammar.name();
        for (name, rule) in grammar.rules() {
            let entry = self
                .rules
                .entry(name.clone())
                .or_insert_with(|| EffectiveRule {
                    alternatives: Vec::new(),
                    origins: Vec::new(),
                });
            if rule.is_override {
                entry.replace(&rule.alternatives, origin);
            } else {
                entry.append(&rule.alternatives, origin);
            }
        }

        for (name, pattern) in grammar.tokens() {
            self.tokens.insert(
                name.clone(),
                EffectiveToken {
                    pattern: pattern.clone(),
                    origin: origin.to_string(),
                },
            );
        }

        if !self.lineage.iter().any(|g| g == origin) {
            self.lineage.push(origin.to_string());
        }
    }

    fn compile_tokens(&mut self) -> Result<(), GrammarResolutionError> {
        let mut compiled = Vec::with_capacity(self.tokens.len());
        for (name, token) in &self.tokens {
            let source = format!(r"\A(?:{})", token.pattern.to_regex_source());
            let regex = Regex::new(&source).map_err(|e| GrammarResolutionError::InvalidTokenPattern {
                grammar: self.name.clone(),
                token: name.clone(),
                reason: e.to_string(),
            })?;
            compiled.push(CompiledToken {
                name: name.clone(),
                regex,
            });
        }
        self.compiled_tokens = compiled;
        Ok(())
    }
}

/// Grammar registry plus memoized inheritance resolution
#[derive(Debug, Default)]
pub struct InheritanceResolver {
    grammars: IndexMap<String, Arc<Grammar>>,
    cache: HashMap<String, Arc<EffectiveGrammar>>,
}

impl InheritanceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a grammar without resolving it.
    ///
    /// Replacing a registered grammar drops every cached result whose
    /// lineage contains it.
    pub fn register_grammar(&mut self, grammar: Grammar) -> Result<(), GrammarResolutionError> {
        let name = grammar.name().to_string();

        if !self.grammars.contains_key(&name) && self.grammars.len() >= MAX_REGISTERED_GRAMMARS {
            log_error!(codes::grammar::REGISTRY_FULL, "Grammar registry is full",
                "grammar" => &name,
                "limit" => MAX_REGISTERED_GRAMMARS
            );
            return Err(GrammarResolutionError::RegistryFull {
                limit: MAX_REGISTERED_GRAMMARS,
            });
        }

        let replaced = self.grammars.insert(name.clone(), Arc::new(grammar)).is_some();
        let invalidated = self.invalidate(&name);

        log_success!(codes::success::GRAMMAR_REGISTERED, "Grammar registered",
            "grammar" => &name,
            "replaced" => replaced,
            "invalidated_cache_entries" => invalidated
        );

        Ok(())
    }

    fn invalidate(&mut self, name: &str) -> usize {
        let before = self.cache.len();
        self.cache
            .retain(|key, effective| key != name && !effective.inherits_from(name));
        before - self.cache.len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.grammars.contains_key(name)
    }

    pub fn grammar(&self, name: &str) -> Option<&Arc<Grammar>> {
        self.grammars.get(name)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    pub fn grammar_names(&self) -> impl Iterator<Item = &str> {
        self.grammars.keys().map(String::as_str)
    }

    pub fn resolve(&mut self, name: &str) -> Result<Arc<EffectiveGrammar>, GrammarResolutionError> {
        let mut path = Vec::new();
        let result = self.resolve_on_path(name, &mut path);

        match &result {
            Ok(effective) => log_success!(codes::success::GRAMMAR_RESOLVED, "Grammar resolved",
                "grammar" => name,
                "rules" => effective.rule_count(),
                "lineage" => effective.lineage.join(",")
            ),
            Err(err) => log_error!(err.error_code(), "Grammar resolution failed",
                "grammar" => name,
                "reason" => err
            ),
        }

        result
    }

    fn resolve_on_path(
        &mut self,
        name: &str,
        path: &mut Vec<String>,
    ) -> Result<Arc<EffectiveGrammar>, GrammarResolutionError> {
        if let Some(index) = path.iter().position(|active| active == name) {
            let mut cycle = path[index..].to_vec();
            cycle.push(name.to_string());
            return Err(GrammarResolutionError::cyclic(cycle));
        }

        if let Some(cached) = self.cache.get(name) {
            return Ok(Arc::clone(cached));
        }

        if path.len() >= MAX_INHERITANCE_DEPTH {
            return Err(GrammarResolutionError::InheritanceTooDeep {
                grammar: path.first().cloned().unwrap_or_else(|| name.to_string()),
                limit: MAX_INHERITANCE_DEPTH,
            });
        }

        let grammar = match self.grammars.get(name) {
            Some(grammar) => Arc::clone(grammar),
            None => {
                return Err(match path.last() {
                    Some(derived) => GrammarResolutionError::unknown_base(derived, name),
                    None => GrammarResolutionError::UnknownGrammar {
                        name: name.to_string(),
                    },
                })
            }
        };

        path.push(name.to_string());
        let mut effective = EffectiveGrammar::accumulator(name);
        for base in grammar.base_grammars() {
            let resolved_base = self.resolve_on_path(base, path)?;
            effective.merge_base(&resolved_base);
        }
        path.pop();

        effective.apply_own(&grammar);

        if effective.rules.len() > MAX_EFFECTIVE_RULES {
            return Err(GrammarResolutionError::RuleLimitExceeded {
                grammar: name.to_string(),
                count: effective.rules.len(),
                limit: MAX_EFFECTIVE_RULES,
            });
        }

        effective.compile_tokens()?;

        let effective = Arc::new(effective);
        self.cache.insert(name.to_string(), Arc::clone(&effective));
        Ok(effective)
    }
}
