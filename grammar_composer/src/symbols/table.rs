//! Arena-indexed symbol table with per-language merge strategies

use super::error::{SymbolConflictError, SymbolResult, SymbolTableError};
use super::types::*;
use crate::config::compile_time::symbols::*;
use crate::logging::codes;
use crate::log_warning;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

type ScopeKey = (&'static str, String);

/// Cross-language-visible symbol ids per language, in insertion order
type VisibleIndex<K> = HashMap<String, HashMap<K, Vec<SymbolId>>>;

/// Symbols and scopes recorded during one parse.
///
/// Scope 0 is the host root. Scopes for embedded contexts are created on
/// demand through [`SymbolTable::open_scope`]; under `flat` every context of
/// a language shares one scope.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    host_language: String,
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    index: HashMap<ScopeId, HashMap<ScopeKey, SymbolId>>,
    visible_by_key: VisibleIndex<ScopeKey>,
    visible_by_kind: VisibleIndex<SymbolKind>,
    strategies: IndexMap<String, MergeStrategy>,
    default_strategy: MergeStrategy,
    flat_scopes: HashMap<String, ScopeId>,
    conflict_policy: ConflictPolicy,
    conflicts: Vec<SymbolConflictError>,
    case_insensitive_elements: bool,
}

impl SymbolTable {
    pub fn new(host_language: impl Into<String>, conflict_policy: ConflictPolicy) -> Self {
        let host_language = host_language.into();
        let root = Scope {
            id: ScopeId(0),
            parent: None,
            language: host_language.clone(),
            depth: 0,
            strategy: MergeStrategy::Hierarchical,
            symbols: Vec::new(),
        };

        Self {
            host_language,
            scopes: vec![root],
            symbols: Vec::new(),
            index: HashMap::new(),
            visible_by_key: HashMap::new(),
            visible_by_kind: HashMap::new(),
            strategies: IndexMap::new(),
            default_strategy: MergeStrategy::Hierarchical,
            flat_scopes: HashMap::new(),
            conflict_policy,
            conflicts: Vec::new(),
            case_insensitive_elements: true,
        }
    }

    pub fn with_default_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    pub fn with_case_insensitive_elements(mut self, enabled: bool) -> Self {
        self.case_insensitive_elements = enabled;
        self
    }

    pub fn host_language(&self) -> &str {
        &self.host_language
    }

    pub fn root_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }

    pub fn set_merge_strategy(&mut self, language: impl Into<String>, strategy: MergeStrategy) {
        self.strategies.insert(language.into(), strategy);
    }

    pub fn merge_strategy(&self, language: &str) -> MergeStrategy {
        self.strategies
            .get(language)
            .copied()
            .unwrap_or(self.default_strategy)
    }

    pub fn merge_strategies(&self) -> &IndexMap<String, MergeStrategy> {
        &self.strategies
    }

    // ===== SCOPES =====

    /// Scope for a newly opened context of `language` nested under `parent`.
    ///
    /// `isolate` forces the isolated strategy regardless of the language's
    /// configured one (contexts that do not preserve the symbol table).
    pub fn open_scope(
        &mut self,
        language: &str,
        parent: ScopeId,
        isolate: bool,
    ) -> SymbolResult<ScopeId> {
        let parent_depth = self.scope(parent)?.depth;
        let strategy = if isolate {
            MergeStrategy::Isolated
        } else {
            self.merge_strategy(language)
        };

        match strategy {
            MergeStrategy::Flat if language == self.host_language => Ok(self.root_scope()),
            MergeStrategy::Flat => {
                if let Some(&shared) = self.flat_scopes.get(language) {
                    return Ok(shared);
                }
                let shared = self.push_scope(language, Some(self.root_scope()), 1, strategy)?;
                self.flat_scopes.insert(language.to_string(), shared);
                Ok(shared)
            }
            MergeStrategy::Hierarchical => {
                self.push_scope(language, Some(parent), parent_depth + 1, strategy)
            }
            MergeStrategy::Isolated => self.push_scope(language, None, parent_depth + 1, strategy),
        }
    }

    fn push_scope(
        &mut self,
        language: &str,
        parent: Option<ScopeId>,
        depth: usize,
        strategy: MergeStrategy,
    ) -> SymbolResult<ScopeId> {
        if self.scopes.len() >= MAX_SCOPES_PER_PARSE {
            return Err(SymbolTableError::ScopeLimitExceeded {
                limit: MAX_SCOPES_PER_PARSE,
            });
        }

        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            id,
            parent,
            language: language.to_string(),
            depth,
            strategy,
            symbols: Vec::new(),
        });
        Ok(id)
    }

    pub fn scope(&self, id: ScopeId) -> SymbolResult<&Scope> {
        self.scopes
            .get(id.0)
            .ok_or(SymbolTableError::UnknownScope { scope: id })
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn max_scope_depth(&self) -> usize {
        self.scopes.iter().map(|s| s.depth).max().unwrap_or(0)
    }

    // ===== INSERTION =====

    fn key_for(&self, kind: SymbolKind, name: &str) -> ScopeKey {
        let name = if kind == SymbolKind::Element && self.case_insensitive_elements {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        };
        (kind.namespace(), name)
    }

    /// Record a symbol in `scope`, applying the conflict policy on a
    /// same-scope collision between unique kinds
    pub fn add_symbol(
        &mut self,
        scope: ScopeId,
        symbol: NewSymbol,
        cross_reference_candidate: bool,
    ) -> SymbolResult<SymbolInsertion> {
        let strategy = self.scope(scope)?.strategy;
        let key = self.key_for(symbol.kind, &symbol.name);

        let existing = self
            .index
            .get(&scope)
            .and_then(|entries| entries.get(&key))
            .copied();

        if let Some(id) = existing {
            let before = (self.symbols[id.0].language.clone(), self.symbols[id.0].kind);
            let outcome = self.resolve_collision(id, scope, symbol);
            if outcome == InsertOutcome::Replaced {
                self.reindex_visible(id, before, key);
            }
            return Ok(SymbolInsertion { id, outcome });
        }

        if self.symbols.len() >= MAX_SYMBOLS_PER_PARSE {
            return Err(SymbolTableError::SymbolLimitExceeded {
                limit: MAX_SYMBOLS_PER_PARSE,
            });
        }

        let id = SymbolId(self.symbols.len());
        self.symbols.push(Symbol {
            id,
            name: symbol.name,
            language: symbol.language,
            kind: symbol.kind,
            scope,
            position: symbol.position,
            visibility: strategy.into(),
            attributes: symbol.attributes,
            occurrences: vec![symbol.position],
            cross_reference_candidate,
        });
        self.scopes[scope.0].symbols.push(id);
        self.index.entry(scope).or_default().insert(key.clone(), id);
        if strategy != MergeStrategy::Isolated {
            self.index_visible(id, key);
        }

        Ok(SymbolInsertion {
            id,
            outcome: InsertOutcome::Inserted,
        })
    }

    fn index_visible(&mut self, id: SymbolId, key: ScopeKey) {
        let symbol = &self.symbols[id.0];
        insert_ordered(
            self.visible_by_key
                .entry(symbol.language.clone())
                .or_default()
                .entry(key)
                .or_default(),
            id,
        );
        insert_ordered(
            self.visible_by_kind
                .entry(symbol.language.clone())
                .or_default()
                .entry(symbol.kind)
                .or_default(),
            id,
        );
    }

    /// A replacing child may change the language and kind a symbol is
    /// indexed under; the key itself stays the same.
    fn reindex_visible(&mut self, id: SymbolId, before: (String, SymbolKind), key: ScopeKey) {
        let (language, kind) = before;
        let symbol = &self.symbols[id.0];
        if symbol.language == language && symbol.kind == kind {
            return;
        }
        if !self.is_visible_across_languages(symbol) {
            return;
        }

        if let Some(ids) = self
            .visible_by_key
            .get_mut(&language)
            .and_then(|keys| keys.get_mut(&key))
        {
            ids.retain(|other| *other != id);
        }
        if let Some(ids) = self
            .visible_by_kind
            .get_mut(&language)
            .and_then(|kinds| kinds.get_mut(&kind))
        {
            ids.retain(|other| *other != id);
        }
        self.index_visible(id, key);
    }

    fn resolve_collision(&mut self, id: SymbolId, scope: ScopeId, incoming: NewSymbol) -> InsertOutcome {
        let policy = self.conflict_policy;
        let existing = &mut self.symbols[id.0];

        if existing.occurrences.len() < MAX_OCCURRENCES_PER_SYMBOL {
            existing.occurrences.push(incoming.position);
        }

        if !existing.kind.is_unique() && !incoming.kind.is_unique() {
            for (key, value) in incoming.attributes {
                existing.attributes.entry(key).or_insert(value);
            }
            return InsertOutcome::Occurrence;
        }

        match policy {
            ConflictPolicy::ParentWins => InsertOutcome::KeptExisting,
            ConflictPolicy::ChildWins => {
                existing.kind = incoming.kind;
                existing.position = incoming.position;
                existing.language = incoming.language;
                existing.attributes = incoming.attributes;
                InsertOutcome::Replaced
            }
            ConflictPolicy::Merge => {
                for (key, value) in incoming.attributes {
                    existing.attributes.entry(key).or_insert(value);
                }
                InsertOutcome::Merged
            }
            ConflictPolicy::Error => {
                let conflict = SymbolConflictError {
                    name: existing.name.clone(),
                    kind: existing.kind,
                    language: existing.language.clone(),
                    scope,
                    first: existing.position,
                    duplicate: incoming.position,
                };

                log_warning!(code = codes::symbols::SYMBOL_CONFLICT, "Symbol conflict",
                    "name" => &conflict.name,
                    "kind" => conflict.kind,
                    "first" => conflict.first,
                    "duplicate" => conflict.duplicate
                );

                self.conflicts.push(conflict);
                InsertOutcome::Conflict
            }
        }
    }

    // ===== QUERIES =====

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    /// All symbols in insertion order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn total_symbols(&self) -> usize {
        self.symbols.len()
    }

    pub fn conflicts(&self) -> &[SymbolConflictError] {
        &self.conflicts
    }

    fn is_visible_across_languages(&self, symbol: &Symbol) -> bool {
        self.scopes
            .get(symbol.scope.0)
            .map(|scope| !scope.is_isolated())
            .unwrap_or(false)
    }

    /// Symbols a language contributes to cross-language lookup.
    ///
    /// Isolated scopes never contribute. The host language's view includes
    /// every merged embedded symbol as well.
    pub fn get_symbols_for_language(&self, language: &str) -> Vec<&Symbol> {
        let is_host = language == self.host_language;
        self.symbols
            .iter()
            .filter(|s| self.is_visible_across_languages(s))
            .filter(|s| is_host || s.language == language)
            .collect()
    }

    /// First cross-language-visible symbol of `language` with this kind and name
    pub fn find_visible(&self, language: &str, kind: SymbolKind, name: &str) -> Option<&Symbol> {
        let wanted = self.key_for(kind, name);
        self.visible_by_key
            .get(language)
            .and_then(|keys| keys.get(&wanted))?
            .iter()
            .filter_map(|id| self.symbol(*id))
            .find(|s| s.kind == kind || !kind.is_unique())
    }

    pub fn names_of_kind(&self, language: &str, kind: SymbolKind) -> Vec<&str> {
        self.visible_by_kind
            .get(language)
            .and_then(|kinds| kinds.get(&kind))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.symbol(*id))
                    .map(|s| s.name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_html_element(&self, name: &str) -> bool {
        self.find_visible(&self.host_language, SymbolKind::Element, name)
            .is_some()
    }

    pub fn has_html_id(&self, name: &str) -> bool {
        self.find_visible(&self.host_language, SymbolKind::Id, name)
            .is_some()
    }

    pub fn has_html_class(&self, name: &str) -> bool {
        self.find_visible(&self.host_language, SymbolKind::Class, name)
            .is_some()
    }

    pub fn has_symbol_in_scope(&self, scope: ScopeId, kind: SymbolKind, name: &str) -> bool {
        let key = self.key_for(kind, name);
        self.index
            .get(&scope)
            .and_then(|entries| entries.get(&key))
            .and_then(|id| self.symbol(*id))
            .map(|s| s.kind == kind)
            .unwrap_or(false)
    }

    /// Scoped lookup: the scope itself, then ancestors. Isolated scopes
    /// have no parent so the walk stops there.
    pub fn lookup(&self, scope: ScopeId, kind: SymbolKind, name: &str) -> Option<&Symbol> {
        let key = self.key_for(kind, name);
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(found) = self
                .index
                .get(&id)
                .and_then(|entries| entries.get(&key))
                .and_then(|sid| self.symbol(*sid))
            {
                return Some(found);
            }
            current = self.scopes.get(id.0).and_then(|s| s.parent);
        }
        None
    }

    pub fn snapshot(&self) -> SymbolTableSnapshot {
        SymbolTableSnapshot {
            host_language: self.host_language.clone(),
            conflict_policy: self.conflict_policy,
            merge_strategies: self.strategies.clone(),
            scopes: self.scopes.clone(),
            symbols: self.symbols.clone(),
            conflicts: self.conflicts.clone(),
        }
    }
}

fn insert_ordered(ids: &mut Vec<SymbolId>, id: SymbolId) {
    if let Err(at) = ids.binary_search(&id) {
        ids.insert(at, id);
    }
}

impl Serialize for SymbolTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

/// Serializable copy of a table at the end of (or partway through) a parse
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolTableSnapshot {
    pub host_language: String,
    pub conflict_policy: ConflictPolicy,
    pub merge_strategies: IndexMap<String, MergeStrategy>,
    pub scopes: Vec<Scope>,
    pub symbols: Vec<Symbol>,
    pub conflicts: Vec<SymbolConflictError>,
}

impl SymbolTableSnapshot {
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbols_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.symbols.iter().filter(move |s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;
    use assert_matches::assert_matches;

    fn at(offset: usize) -> Position {
        Position::new(offset, 1, offset as u32 + 1)
    }

    fn js_function(name: &str, offset: usize) -> NewSymbol {
        NewSymbol::new(name, "JavaScript", SymbolKind::Function, at(offset))
    }

    #[test]
    fn test_isolated_symbol_absent_from_host_view() {
        let mut table = SymbolTable::new("HTML", ConflictPolicy::ParentWins);
        table.set_merge_strategy("JavaScript", MergeStrategy::Isolated);

        let root = table.root_scope();
        table
            .add_symbol(root, NewSymbol::new("div", "HTML", SymbolKind::Element, at(0)), true)
            .unwrap();
        let script = table.open_scope("JavaScript", root, false).unwrap();
        table.add_symbol(script, js_function("secret", 10), true).unwrap();

        let host: Vec<&str> = table
            .get_symbols_for_language("HTML")
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(host, vec!["div"]);
        assert!(table.get_symbols_for_language("JavaScript").is_empty());
        assert!(table.has_symbol_in_scope(script, SymbolKind::Function, "secret"));
        assert!(table.lookup(script, SymbolKind::Element, "div").is_none());
    }

    #[test]
    fn test_hierarchical_lookup_walks_to_host() {
        let mut table = SymbolTable::new("HTML", ConflictPolicy::ParentWins);
        let root = table.root_scope();
        table
            .add_symbol(root, NewSymbol::new("app", "HTML", SymbolKind::Id, at(0)), true)
            .unwrap();
        let script = table.open_scope("JavaScript", root, false).unwrap();
        table.add_symbol(script, js_function("init", 5), true).unwrap();

        assert!(table.lookup(script, SymbolKind::Id, "app").is_some());
        assert!(table.lookup(root, SymbolKind::Function, "init").is_none());
        assert_eq!(table.scope(script).unwrap().depth, 1);
        assert_eq!(table.get_symbols_for_language("HTML").len(), 2);
    }

    #[test]
    fn test_flat_strategy_shares_one_scope_per_language() {
        let mut table = SymbolTable::new("HTML", ConflictPolicy::Error);
        table.set_merge_strategy("JavaScript", MergeStrategy::Flat);
        let root = table.root_scope();

        let first = table.open_scope("JavaScript", root, false).unwrap();
        let second = table.open_scope("JavaScript", root, false).unwrap();
        assert_eq!(first, second);

        table.add_symbol(first, js_function("init", 0), true).unwrap();
        let insertion = table.add_symbol(second, js_function("init", 40), true).unwrap();

        assert_eq!(insertion.outcome, InsertOutcome::Conflict);
        assert_eq!(table.conflicts().len(), 1);
        assert_eq!(table.conflicts()[0].duplicate.offset, 40);
    }

    #[test]
    fn test_isolate_flag_overrides_language_strategy() {
        let mut table = SymbolTable::new("HTML", ConflictPolicy::ParentWins);
        table.set_merge_strategy("CSS", MergeStrategy::Flat);
        let scope = table.open_scope("CSS", table.root_scope(), true).unwrap();

        assert!(table.scope(scope).unwrap().is_isolated());
        assert_eq!(table.scope(scope).unwrap().parent, None);
    }

    #[test]
    fn test_conflict_policies() {
        for (policy, expected_outcome, expected_offset) in [
            (ConflictPolicy::ParentWins, InsertOutcome::KeptExisting, 0),
            (ConflictPolicy::ChildWins, InsertOutcome::Replaced, 7),
            (ConflictPolicy::Merge, InsertOutcome::Merged, 0),
            (ConflictPolicy::Error, InsertOutcome::Conflict, 0),
        ] {
            let mut table = SymbolTable::new("HTML", policy);
            let root = table.root_scope();
            table
                .add_symbol(
                    root,
                    NewSymbol::new("app", "HTML", SymbolKind::Id, at(0)).with_attribute("tag", "div"),
                    true,
                )
                .unwrap();
            let insertion = table
                .add_symbol(
                    root,
                    NewSymbol::new("app", "HTML", SymbolKind::Id, at(7))
                        .with_attribute("tag", "span")
                        .with_attribute("role", "main"),
                    true,
                )
                .unwrap();

            let symbol = table.symbol(insertion.id).unwrap();
            assert_eq!(insertion.outcome, expected_outcome, "{:?}", policy);
            assert_eq!(symbol.position.offset, expected_offset, "{:?}", policy);
            assert_eq!(symbol.occurrences.len(), 2);
            assert_eq!(table.total_symbols(), 1);

            match policy {
                ConflictPolicy::Merge => {
                    assert_eq!(symbol.attributes["tag"], "div");
                    assert_eq!(symbol.attributes["role"], "main");
                }
                ConflictPolicy::ChildWins => assert_eq!(symbol.attributes["tag"], "span"),
                _ => assert!(!symbol.attributes.contains_key("role")),
            }
        }
    }

    #[test]
    fn test_repeated_elements_add_occurrences_not_conflicts() {
        let mut table = SymbolTable::new("HTML", ConflictPolicy::Error);
        let root = table.root_scope();
        table
            .add_symbol(root, NewSymbol::new("DIV", "HTML", SymbolKind::Element, at(0)), true)
            .unwrap();
        let insertion = table
            .add_symbol(root, NewSymbol::new("div", "HTML", SymbolKind::Element, at(9)), true)
            .unwrap();

        assert_eq!(insertion.outcome, InsertOutcome::Occurrence);
        assert!(table.conflicts().is_empty());
        assert!(table.has_html_element("Div"));
    }

    #[test]
    fn test_symbol_count_is_monotonic() {
        let mut table = SymbolTable::new("HTML", ConflictPolicy::ChildWins);
        let root = table.root_scope();
        let mut last = 0;
        for (i, name) in ["a", "b", "a", "c", "b"].iter().enumerate() {
            table
                .add_symbol(root, NewSymbol::new(*name, "HTML", SymbolKind::Id, at(i)), true)
                .unwrap();
            assert!(table.total_symbols() >= last);
            last = table.total_symbols();
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn test_visible_lookup_follows_replacement() {
        let mut table = SymbolTable::new("HTML", ConflictPolicy::ChildWins);
        let root = table.root_scope();
        table
            .add_symbol(root, NewSymbol::new("app", "HTML", SymbolKind::Id, at(0)), true)
            .unwrap();
        table
            .add_symbol(root, NewSymbol::new("app", "JavaScript", SymbolKind::Id, at(5)), true)
            .unwrap();

        assert!(table.find_visible("HTML", SymbolKind::Id, "app").is_none());
        assert_eq!(
            table.find_visible("JavaScript", SymbolKind::Id, "app").map(|s| s.position.offset),
            Some(5)
        );
        assert!(table.names_of_kind("HTML", SymbolKind::Id).is_empty());
        assert_eq!(table.names_of_kind("JavaScript", SymbolKind::Id), vec!["app"]);

        let script = table.open_scope("JavaScript", root, false).unwrap();
        table.add_symbol(script, js_function("config", 10), true).unwrap();
        table
            .add_symbol(
                script,
                NewSymbol::new("config", "JavaScript", SymbolKind::Variable, at(20)),
                true,
            )
            .unwrap();

        assert!(table.find_visible("JavaScript", SymbolKind::Function, "config").is_none());
        assert!(table.find_visible("JavaScript", SymbolKind::Variable, "config").is_some());
        assert!(table.names_of_kind("JavaScript", SymbolKind::Function).is_empty());
    }

    #[test]
    fn test_names_of_kind_keeps_insertion_order() {
        let mut table = SymbolTable::new("HTML", ConflictPolicy::ParentWins);
        let root = table.root_scope();
        for (i, name) in ["nav", "main", "nav", "footer"].iter().enumerate() {
            table
                .add_symbol(root, NewSymbol::new(*name, "HTML", SymbolKind::Class, at(i)), true)
                .unwrap();
        }
        table.set_merge_strategy("CSS", MergeStrategy::Isolated);
        let style = table.open_scope("CSS", root, false).unwrap();
        table
            .add_symbol(style, NewSymbol::new("hidden", "CSS", SymbolKind::Class, at(9)), true)
            .unwrap();

        assert_eq!(table.names_of_kind("HTML", SymbolKind::Class), vec!["nav", "main", "footer"]);
        assert!(table.names_of_kind("CSS", SymbolKind::Class).is_empty());
        assert!(table.find_visible("HTML", SymbolKind::Class, "main").is_some());
        assert!(table.find_visible("HTML", SymbolKind::Element, "main").is_none());
    }

    #[test]
    fn test_unknown_scope() {
        let mut table = SymbolTable::new("HTML", ConflictPolicy::ParentWins);
        assert_matches!(
            table.add_symbol(ScopeId(9), js_function("f", 0), true),
            Err(SymbolTableError::UnknownScope { .. })
        );
    }
}
