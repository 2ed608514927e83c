//! Cross-language references and bindings collected while scanning

use super::tree::NodeId;
use crate::config::compile_time::validation::MAX_CROSS_REFERENCES;
use crate::symbols::SymbolKind;
use crate::utils::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CrossReferenceId(pub usize);

impl fmt::Display for CrossReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xref#{}", self.0)
    }
}

/// What kind of markup entity a reference expects to find
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Id,
    Class,
    Element,
}

impl ReferenceKind {
    pub fn symbol_kind(&self) -> SymbolKind {
        match self {
            ReferenceKind::Id => SymbolKind::Id,
            ReferenceKind::Class => SymbolKind::Class,
            ReferenceKind::Element => SymbolKind::Element,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.symbol_kind().as_str()
    }

    /// How the name appears in a selector
    pub fn selector_form(&self, name: &str) -> String {
        match self {
            ReferenceKind::Id => format!("#{}", name),
            ReferenceKind::Class => format!(".{}", name),
            ReferenceKind::Element => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReferenceOrigin {
    /// A selector of a style rule
    StyleRule { selector: String },
    /// A script DOM lookup such as `getElementById`
    DomLookup { method: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    pub id: CrossReferenceId,
    pub source_language: String,
    pub target_language: String,
    pub name: String,
    pub kind: ReferenceKind,
    pub origin: ReferenceOrigin,
    pub source_position: Position,
    /// Declaration the reference resolved to
    pub target_position: Option<Position>,
    pub resolved: bool,
    /// Raised from a context whose symbols stay private
    pub isolated: bool,
}

/// What a binding attaches to in the markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BindingTarget {
    Id(String),
    Class(String),
    Element(String),
    /// A specific element, for inline attributes
    Node(NodeId),
    /// No resolvable target, e.g. `*` or a variable receiver
    Unknown,
}

impl BindingTarget {
    pub fn from_reference(kind: ReferenceKind, name: &str) -> Self {
        match kind {
            ReferenceKind::Id => BindingTarget::Id(name.to_string()),
            ReferenceKind::Class => BindingTarget::Class(name.to_string()),
            ReferenceKind::Element => BindingTarget::Element(name.to_string()),
        }
    }
}

/// Script access to a markup element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomBinding {
    pub language: String,
    pub method: String,
    pub target: BindingTarget,
    pub position: Position,
}

/// Style applied to markup, through a rule selector or an inline attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleBinding {
    pub language: String,
    pub selector: Option<String>,
    pub target: BindingTarget,
    pub inline: bool,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventBinding {
    /// Event name without the `on` prefix, lower-cased
    pub event: String,
    pub target: BindingTarget,
    pub handler: Option<String>,
    pub source_language: String,
    pub position: Position,
    pub isolated: bool,
}

/// An identifier read (not declared) in script code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierUsage {
    pub name: String,
    pub language: String,
    pub position: Position,
}

/// Everything besides symbols that one parse collects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseArtifacts {
    pub cross_references: Vec<CrossReference>,
    pub dom_bindings: Vec<DomBinding>,
    pub style_bindings: Vec<StyleBinding>,
    pub event_bindings: Vec<EventBinding>,
    pub usages: Vec<IdentifierUsage>,
    /// References dropped after the collection limit was reached
    pub dropped_references: usize,
}

impl ParseArtifacts {
    /// Record a reference, assigning the next id. Returns `None` once the
    /// per-parse limit is reached.
    #[allow(clippy::too_many_arguments)]
    pub fn add_reference(
        &mut self,
        source_language: &str,
        target_language: &str,
        name: &str,
        kind: ReferenceKind,
        origin: ReferenceOrigin,
        position: Position,
        isolated: bool,
    ) -> Option<CrossReferenceId> {
        if self.cross_references.len() >= MAX_CROSS_REFERENCES {
            self.dropped_references += 1;
            return None;
        }

        let id = CrossReferenceId(self.cross_references.len());
        self.cross_references.push(CrossReference {
            id,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            name: name.to_string(),
            kind,
            origin,
            source_position: position,
            target_position: None,
            resolved: false,
            isolated,
        });
        Some(id)
    }

    pub fn binding_count(&self) -> usize {
        self.dom_bindings.len() + self.style_bindings.len() + self.event_bindings.len()
    }

    /// Identifiers read somewhere or named as an event handler
    pub fn used_names(&self) -> HashSet<&str> {
        self.usages
            .iter()
            .map(|u| u.name.as_str())
            .chain(self.event_bindings.iter().filter_map(|b| b.handler.as_deref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_ids_follow_discovery_order() {
        let mut artifacts = ParseArtifacts::default();
        let origin = ReferenceOrigin::StyleRule {
            selector: "#a".into(),
        };
        let first = artifacts
            .add_reference("CSS", "HTML", "a", ReferenceKind::Id, origin.clone(), Position::start(), false)
            .unwrap();
        let second = artifacts
            .add_reference("CSS", "HTML", "b", ReferenceKind::Class, origin, Position::start(), false)
            .unwrap();

        assert_eq!((first.0, second.0), (0, 1));
        assert_eq!(artifacts.cross_references[1].kind.selector_form("b"), ".b");
        assert!(!artifacts.cross_references[0].resolved);
    }

    #[test]
    fn test_handler_counts_as_usage() {
        let mut artifacts = ParseArtifacts::default();
        artifacts.event_bindings.push(EventBinding {
            event: "click".into(),
            target: BindingTarget::Id("btn".into()),
            handler: Some("save".into()),
            source_language: "HTML".into(),
            position: Position::start(),
            isolated: false,
        });
        let used = artifacts.used_names();
        assert!(used.contains("save"));
        assert!(!used.contains("load"));
    }
}
