//! Symbol table value types

use crate::utils::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub usize);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "symbol#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Element,
    Id,
    Class,
    Attribute,
    Selector,
    Function,
    Variable,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Element => "element",
            SymbolKind::Id => "id",
            SymbolKind::Class => "class",
            SymbolKind::Attribute => "attribute",
            SymbolKind::Selector => "selector",
            SymbolKind::Function => "function",
            SymbolKind::Variable => "variable",
        }
    }

    /// Kinds whose repeated declaration in one scope is a collision.
    /// Others (an element used twice, a class on many nodes) only add
    /// occurrences.
    pub fn is_unique(&self) -> bool {
        matches!(
            self,
            SymbolKind::Id | SymbolKind::Function | SymbolKind::Variable
        )
    }

    /// Functions and variables share one identifier namespace
    pub(crate) fn namespace(&self) -> &'static str {
        match self {
            SymbolKind::Function | SymbolKind::Variable => "identifier",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an embedded language's symbols combine with the host's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// One child scope per context; lookup walks up to the host
    #[default]
    Hierarchical,
    /// One shared namespace per language regardless of nesting
    Flat,
    /// Visible only inside the owning context
    Isolated,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Hierarchical => "hierarchical",
            MergeStrategy::Flat => "flat",
            MergeStrategy::Isolated => "isolated",
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hierarchical" => Ok(MergeStrategy::Hierarchical),
            "flat" => Ok(MergeStrategy::Flat),
            "isolated" => Ok(MergeStrategy::Isolated),
            other => Err(format!("unknown merge strategy '{}'", other)),
        }
    }
}

/// Resolution of a same-scope collision between unique symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Keep the first declaration
    #[default]
    ParentWins,
    /// Overwrite with the later declaration
    ChildWins,
    /// Keep the first, union in attributes it does not have
    Merge,
    /// Keep the first and record a conflict finding
    Error,
}

impl ConflictPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::ParentWins => "parent_wins",
            ConflictPolicy::ChildWins => "child_wins",
            ConflictPolicy::Merge => "merge",
            ConflictPolicy::Error => "error",
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "parent_wins" => Ok(ConflictPolicy::ParentWins),
            "child_wins" => Ok(ConflictPolicy::ChildWins),
            "merge" => Ok(ConflictPolicy::Merge),
            "error" => Ok(ConflictPolicy::Error),
            other => Err(format!("unknown conflict policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Shared language namespace (flat)
    Public,
    /// Visible to the owning context and its descendants
    Scoped,
    /// Owning context only
    Private,
}

impl From<MergeStrategy> for Visibility {
    fn from(strategy: MergeStrategy) -> Self {
        match strategy {
            MergeStrategy::Flat => Visibility::Public,
            MergeStrategy::Hierarchical => Visibility::Scoped,
            MergeStrategy::Isolated => Visibility::Private,
        }
    }
}

/// A symbol as reported by a scanner, before the table places it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSymbol {
    pub name: String,
    pub language: String,
    pub kind: SymbolKind,
    pub position: Position,
    pub attributes: BTreeMap<String, String>,
}

impl NewSymbol {
    pub fn new(
        name: impl Into<String>,
        language: impl Into<String>,
        kind: SymbolKind,
        position: Position,
    ) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            kind,
            position,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub language: String,
    pub kind: SymbolKind,
    pub scope: ScopeId,
    pub position: Position,
    pub visibility: Visibility,
    pub attributes: BTreeMap<String, String>,
    /// Every position the name was declared or used at, first included
    pub occurrences: Vec<Position>,
    /// Set when the owning context enables cross-language validation
    pub cross_reference_candidate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub language: String,
    pub depth: usize,
    pub strategy: MergeStrategy,
    pub symbols: Vec<SymbolId>,
}

impl Scope {
    pub fn is_isolated(&self) -> bool {
        self.strategy == MergeStrategy::Isolated
    }
}

/// What `add_symbol` did with a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Non-unique kind seen again; occurrence recorded
    Occurrence,
    KeptExisting,
    Replaced,
    Merged,
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInsertion {
    pub id: SymbolId,
    pub outcome: InsertOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_and_strategy_parsing() {
        assert_eq!("FLAT".parse::<MergeStrategy>(), Ok(MergeStrategy::Flat));
        assert_eq!("child-wins".parse::<ConflictPolicy>(), Ok(ConflictPolicy::ChildWins));
        assert!("loose".parse::<MergeStrategy>().is_err());
    }

    #[test]
    fn test_identifier_namespace_is_shared() {
        assert_eq!(SymbolKind::Function.namespace(), SymbolKind::Variable.namespace());
        assert_ne!(SymbolKind::Id.namespace(), SymbolKind::Class.namespace());
        assert!(SymbolKind::Id.is_unique());
        assert!(!SymbolKind::Element.is_unique());
    }
}
