//! Summary statistics over a populated symbol table

use super::table::SymbolTable;
use super::types::{ConflictPolicy, MergeStrategy};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolTableReport {
    pub total_symbols: usize,
    pub symbols_by_language: BTreeMap<String, usize>,
    pub symbols_by_kind: BTreeMap<String, usize>,
    pub scope_count: usize,
    pub isolated_scope_count: usize,
    pub max_scope_depth: usize,
    pub conflict_count: usize,
    pub conflict_policy: ConflictPolicy,
    pub merge_strategies: IndexMap<String, MergeStrategy>,
}

impl SymbolTableReport {
    pub fn summary(&self) -> String {
        format!(
            "{} symbols across {} scopes ({} isolated, max depth {}), {} conflicts under {}",
            self.total_symbols,
            self.scope_count,
            self.isolated_scope_count,
            self.max_scope_depth,
            self.conflict_count,
            self.conflict_policy.as_str()
        )
    }
}

impl SymbolTable {
    pub fn report(&self) -> SymbolTableReport {
        let mut symbols_by_language = BTreeMap::new();
        let mut symbols_by_kind = BTreeMap::new();
        for symbol in self.symbols() {
            *symbols_by_language.entry(symbol.language.clone()).or_insert(0) += 1;
            *symbols_by_kind.entry(symbol.kind.as_str().to_string()).or_insert(0) += 1;
        }

        SymbolTableReport {
            total_symbols: self.total_symbols(),
            symbols_by_language,
            symbols_by_kind,
            scope_count: self.scopes().len(),
            isolated_scope_count: self.scopes().iter().filter(|s| s.is_isolated()).count(),
            max_scope_depth: self.max_scope_depth(),
            conflict_count: self.conflicts().len(),
            conflict_policy: self.conflict_policy(),
            merge_strategies: self.merge_strategies().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{NewSymbol, SymbolKind};
    use crate::utils::Position;

    #[test]
    fn test_report_counts() {
        let mut table = SymbolTable::new("HTML", ConflictPolicy::Error);
        table.set_merge_strategy("CSS", MergeStrategy::Isolated);
        let root = table.root_scope();

        table
            .add_symbol(root, NewSymbol::new("div", "HTML", SymbolKind::Element, Position::start()), true)
            .unwrap();
        table
            .add_symbol(root, NewSymbol::new("app", "HTML", SymbolKind::Id, Position::start()), true)
            .unwrap();
        let css = table.open_scope("CSS", root, false).unwrap();
        table
            .add_symbol(css, NewSymbol::new("#app", "CSS", SymbolKind::Selector, Position::start()), false)
            .unwrap();

        let report = table.report();
        assert_eq!(report.total_symbols, 3);
        assert_eq!(report.symbols_by_language["HTML"], 2);
        assert_eq!(report.symbols_by_kind["selector"], 1);
        assert_eq!(report.scope_count, 2);
        assert_eq!(report.isolated_scope_count, 1);
        assert_eq!(report.max_scope_depth, 1);
        assert!(report.summary().starts_with("3 symbols across 2 scopes"));
    }
}
