//! Per-language scanners for embedded regions
//!
//! The host scanner drives context switches. Once a region's language is
//! known, the matching [`LanguageScanner`] walks the region's tokens (from
//! the language's effective grammar) and reports symbols, references and
//! bindings through a [`ScanSink`].

use super::references::{
    BindingTarget, DomBinding, EventBinding, IdentifierUsage, ParseArtifacts, ReferenceKind,
    ReferenceOrigin, StyleBinding,
};
use super::script::ScriptScanner;
use super::style::StyleScanner;
use super::tree::NodeId;
use crate::grammar::Token;
use crate::symbols::{NewSymbol, ScopeId, SymbolInsertion, SymbolKind, SymbolTable, SymbolTableError};
use crate::utils::{Position, SourceMap};
use serde::{Deserialize, Serialize};

/// Scanner family for a language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageKind {
    /// Tag-based markup; only meaningful as the host language
    Markup,
    Style,
    Script,
    /// Tokens are counted but no symbols are extracted
    #[default]
    Other,
}

impl LanguageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageKind::Markup => "markup",
            LanguageKind::Style => "style",
            LanguageKind::Script => "script",
            LanguageKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionMode {
    /// Element content or a content-trigger region
    Block,
    /// An attribute value on `element`
    Attribute { element: NodeId, attribute: String },
}

/// An embedded region ready for scanning. Nested regions of other
/// languages are already blanked out of `text`, so offsets still line up.
pub struct Region<'r> {
    pub text: &'r str,
    /// Offset of `text` in the document
    pub base: usize,
    pub tokens: &'r [Token],
    pub mode: &'r RegionMode,
}

impl<'r> Region<'r> {
    pub fn token_text(&self, token: &Token) -> &'r str {
        &self.text[token.start..token.end]
    }

    pub fn offset(&self, token: &Token) -> usize {
        self.base + token.start
    }
}

pub trait LanguageScanner {
    fn scan(&self, region: &Region<'_>, sink: &mut ScanSink<'_>) -> Result<(), SymbolTableError>;
}

pub fn scanner_for(kind: LanguageKind) -> Option<&'static dyn LanguageScanner> {
    static STYLE: StyleScanner = StyleScanner;
    static SCRIPT: ScriptScanner = ScriptScanner;

    match kind {
        LanguageKind::Style => Some(&STYLE),
        LanguageKind::Script => Some(&SCRIPT),
        LanguageKind::Markup | LanguageKind::Other => None,
    }
}

/// Where scanners report what they find, bound to the active context
pub struct ScanSink<'s> {
    table: &'s mut SymbolTable,
    artifacts: &'s mut ParseArtifacts,
    map: &'s SourceMap<'s>,
    scope: ScopeId,
    language: &'s str,
    host_language: &'s str,
    cross_reference: bool,
    isolated: bool,
}

impl<'s> ScanSink<'s> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        table: &'s mut SymbolTable,
        artifacts: &'s mut ParseArtifacts,
        map: &'s SourceMap<'s>,
        scope: ScopeId,
        language: &'s str,
        host_language: &'s str,
        cross_reference: bool,
        isolated: bool,
    ) -> Self {
        Self {
            table,
            artifacts,
            map,
            scope,
            language,
            host_language,
            cross_reference,
            isolated,
        }
    }

    pub fn language(&self) -> &str {
        self.language
    }

    pub fn position(&self, offset: usize) -> Position {
        self.map.position_at(offset)
    }

    pub fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        offset: usize,
    ) -> Result<SymbolInsertion, SymbolTableError> {
        let symbol = NewSymbol::new(name, self.language, kind, self.position(offset));
        self.table.add_symbol(self.scope, symbol, self.cross_reference)
    }

    pub fn declare_with(&mut self, symbol: NewSymbol) -> Result<SymbolInsertion, SymbolTableError> {
        self.table.add_symbol(self.scope, symbol, self.cross_reference)
    }

    /// Reference to a host markup entity. Contexts without cross-reference
    /// validation record nothing.
    pub fn reference(&mut self, name: &str, kind: ReferenceKind, origin: ReferenceOrigin, offset: usize) {
        if !self.cross_reference || name.is_empty() {
            return;
        }
        let position = self.position(offset);
        self.artifacts.add_reference(
            self.language,
            self.host_language,
            name,
            kind,
            origin,
            position,
            self.isolated,
        );
    }

    pub fn dom_binding(&mut self, method: &str, target: BindingTarget, offset: usize) {
        let position = self.position(offset);
        self.artifacts.dom_bindings.push(DomBinding {
            language: self.language.to_string(),
            method: method.to_string(),
            target,
            position,
        });
    }

    pub fn style_binding(&mut self, selector: Option<&str>, target: BindingTarget, inline: bool, offset: usize) {
        let position = self.position(offset);
        self.artifacts.style_bindings.push(StyleBinding {
            language: self.language.to_string(),
            selector: selector.map(str::to_string),
            target,
            inline,
            position,
        });
    }

    pub fn event_binding(&mut self, event: &str, target: BindingTarget, handler: Option<&str>, offset: usize) {
        let position = self.position(offset);
        self.artifacts.event_bindings.push(EventBinding {
            event: event.to_ascii_lowercase(),
            target,
            handler: handler.map(str::to_string),
            source_language: self.language.to_string(),
            position,
            isolated: self.isolated,
        });
    }

    pub fn usage(&mut self, name: &str, offset: usize) {
        let position = self.position(offset);
        self.artifacts.usages.push(IdentifierUsage {
            name: name.to_string(),
            language: self.language.to_string(),
            position,
        });
    }
}

/// Whitespace-separated words with their byte offsets
pub fn words(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                out.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out
}

/// Split a selector string into the id, class and type names it mentions.
/// Attribute brackets and pseudo-class arguments are skipped.
pub fn selector_parts(selector: &str) -> Vec<(ReferenceKind, String, usize)> {
    let mut parts = Vec::new();
    let bytes = selector.as_bytes();
    let mut i = 0;
    let mut bracket = 0usize;
    let mut paren = 0usize;

    let is_name = |b: u8| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'[' => bracket += 1,
            b']' => bracket = bracket.saturating_sub(1),
            b'(' => paren += 1,
            b')' => paren = paren.saturating_sub(1),
            b':' if bracket == 0 => {
                // pseudo-class or pseudo-element name
                i += 1;
                while i < bytes.len() && (bytes[i] == b':' || is_name(bytes[i])) {
                    i += 1;
                }
                continue;
            }
            b'#' | b'.' if bracket == 0 => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && is_name(bytes[end]) {
                    end += 1;
                }
                if end > start {
                    let kind = if b == b'#' {
                        ReferenceKind::Id
                    } else {
                        ReferenceKind::Class
                    };
                    parts.push((kind, selector[start..end].to_string(), i));
                }
                i = end;
                continue;
            }
            _ if bracket == 0 && paren == 0 && b.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && is_name(bytes[i]) {
                    i += 1;
                }
                parts.push((ReferenceKind::Element, selector[start..i].to_string(), start));
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parts() {
        let parts = selector_parts("div.card > #main a:hover, input[type=text]:not(.x)");
        let names: Vec<(ReferenceKind, &str)> = parts.iter().map(|(k, n, _)| (*k, n.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (ReferenceKind::Element, "div"),
                (ReferenceKind::Class, "card"),
                (ReferenceKind::Id, "main"),
                (ReferenceKind::Element, "a"),
                (ReferenceKind::Element, "input"),
                (ReferenceKind::Class, "x"),
            ]
        );
        assert_eq!(parts[2].2, 11);
    }

    #[test]
    fn test_words_offsets() {
        assert_eq!(words("  btn\tbtn-primary  x"), vec![(2, "btn"), (6, "btn-primary"), (19, "x")]);
        assert!(words(" ").is_empty());
    }

    #[test]
    fn test_scanner_lookup() {
        assert!(scanner_for(LanguageKind::Style).is_some());
        assert!(scanner_for(LanguageKind::Script).is_some());
        assert!(scanner_for(LanguageKind::Other).is_none());
    }
}
