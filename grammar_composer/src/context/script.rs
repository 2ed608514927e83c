//! Script scanning: declarations, identifier usage, DOM lookups and
//! event wiring

use super::references::{BindingTarget, ReferenceKind, ReferenceOrigin};
use super::scanner::{selector_parts, words, LanguageScanner, Region, ScanSink};
use crate::grammar::Token;
use crate::symbols::{SymbolKind, SymbolTableError};
use std::collections::HashMap;

const DOM_LOOKUPS: &[&str] = &[
    "getElementById",
    "getElementsByClassName",
    "getElementsByTagName",
    "querySelector",
    "querySelectorAll",
];

const DECLARATION_KEYWORDS: &[&str] = &["var", "let", "const"];

pub struct ScriptScanner;

type Lexeme<'r> = (&'r Token, &'r str);

impl LanguageScanner for ScriptScanner {
    fn scan(&self, region: &Region<'_>, sink: &mut ScanSink<'_>) -> Result<(), SymbolTableError> {
        let lexemes: Vec<Lexeme<'_>> = region
            .tokens
            .iter()
            .filter(|t| t.kind != "COMMENT")
            .map(|t| (t, region.token_text(t)))
            .collect();

        let mut walker = Walker {
            region,
            lexemes: &lexemes,
            receivers: HashMap::new(),
            lookup_ends: HashMap::new(),
            pending_variable: None,
        };
        walker.run(sink)
    }
}

struct Walker<'w, 'r> {
    region: &'w Region<'r>,
    lexemes: &'w [Lexeme<'r>],
    /// Variables initialized from a DOM lookup
    receivers: HashMap<&'r str, BindingTarget>,
    /// Index of the `)` closing a DOM lookup call
    lookup_ends: HashMap<usize, BindingTarget>,
    pending_variable: Option<&'r str>,
}

impl<'w, 'r> Walker<'w, 'r> {
    fn kind_at(&self, i: usize) -> Option<&'r str> {
        self.lexemes.get(i).map(|&(t, _)| t.kind.as_str())
    }

    fn text_at(&self, i: usize) -> Option<&'r str> {
        self.lexemes.get(i).map(|&(_, text)| text)
    }

    fn identifier_at(&self, i: usize) -> Option<Lexeme<'r>> {
        self.lexemes
            .get(i)
            .copied()
            .filter(|(t, _)| t.kind == "IDENTIFIER")
    }

    fn run(&mut self, sink: &mut ScanSink<'_>) -> Result<(), SymbolTableError> {
        let mut i = 0;
        while i < self.lexemes.len() {
            let (token, text) = self.lexemes[i];

            match token.kind.as_str() {
                "KEYWORD" if text == "function" => {
                    if let Some((name_token, name)) = self.identifier_at(i + 1) {
                        sink.declare(name, SymbolKind::Function, self.region.offset(name_token))?;
                        i += 2;
                        continue;
                    }
                }
                "KEYWORD" if DECLARATION_KEYWORDS.contains(&text) => {
                    if let Some((name_token, name)) = self.identifier_at(i + 1) {
                        sink.declare(name, SymbolKind::Variable, self.region.offset(name_token))?;
                        self.pending_variable = Some(name);
                        i += 2;
                        continue;
                    }
                }
                "IDENTIFIER" if i > 0 && self.text_at(i - 1) == Some(".") => {
                    if let Some(end) = self.member(i, sink) {
                        i = end + 1;
                        continue;
                    }
                }
                "IDENTIFIER" => sink.usage(text, self.region.offset(token)),
                _ if matches!(text, ";" | "{" | "}") => self.pending_variable = None,
                _ => {}
            }
            i += 1;
        }
        Ok(())
    }

    /// Property access at `i`. Returns the index of the last lexeme consumed
    /// when the access was a complete DOM lookup call.
    fn member(&mut self, i: usize, sink: &mut ScanSink<'_>) -> Option<usize> {
        let (token, name) = self.lexemes[i];

        if DOM_LOOKUPS.contains(&name) {
            return self.dom_lookup(i, sink);
        }

        if name == "addEventListener" && self.text_at(i + 1) == Some("(") && self.kind_at(i + 2) == Some("STRING") {
            let (event_token, event) = self.lexemes[i + 2];
            let handler = (self.text_at(i + 3) == Some(","))
                .then(|| self.identifier_at(i + 4))
                .flatten()
                .map(|(_, handler)| handler);
            let target = self.receiver(i);
            sink.event_binding(unquote(event), target, handler, self.region.offset(event_token) + 1);
        } else if let Some(event) = event_property(name) {
            if self.text_at(i + 1) == Some("=") {
                let handler = self.identifier_at(i + 2).map(|(_, handler)| handler);
                let target = self.receiver(i);
                sink.event_binding(event, target, handler, self.region.offset(token));
            }
        }

        None
    }

    fn dom_lookup(&mut self, i: usize, sink: &mut ScanSink<'_>) -> Option<usize> {
        let (method_token, method) = self.lexemes[i];
        if self.text_at(i + 1) != Some("(") || self.kind_at(i + 2) != Some("STRING") || self.text_at(i + 3) != Some(")") {
            return None;
        }

        let (arg_token, quoted) = self.lexemes[i + 2];
        let argument = unquote(quoted);
        if quoted.starts_with('`') && argument.contains("${") {
            return None;
        }
        let base = self.region.offset(arg_token) + 1;

        let references: Vec<(ReferenceKind, String, usize)> = match method {
            "getElementById" => vec![(ReferenceKind::Id, argument.trim().to_string(), 0)],
            "getElementsByClassName" => words(argument)
                .into_iter()
                .map(|(at, class)| (ReferenceKind::Class, class.to_string(), at))
                .collect(),
            "getElementsByTagName" => vec![(ReferenceKind::Element, argument.trim().to_string(), 0)],
            _ => selector_parts(argument),
        };

        for (kind, name, at) in &references {
            sink.reference(
                name,
                *kind,
                ReferenceOrigin::DomLookup {
                    method: method.to_string(),
                },
                base + at,
            );
        }

        let target = references
            .last()
            .map(|(kind, name, _)| BindingTarget::from_reference(*kind, name))
            .unwrap_or(BindingTarget::Unknown);
        sink.dom_binding(method, target.clone(), self.region.offset(method_token));

        let end = i + 3;
        if let Some(variable) = self.pending_variable.take() {
            self.receivers.insert(variable, target.clone());
        }
        self.lookup_ends.insert(end, target);
        Some(end)
    }

    /// Element a method at `i` is called on: a preceding lookup call or a
    /// variable holding one
    fn receiver(&self, i: usize) -> BindingTarget {
        let Some(j) = i.checked_sub(2) else {
            return BindingTarget::Unknown;
        };
        let target = match self.lexemes.get(j) {
            Some(&(_, ")")) => self.lookup_ends.get(&j).cloned(),
            Some(&(token, name)) if token.kind == "IDENTIFIER" => self.receivers.get(name).cloned(),
            _ => None,
        };
        target.unwrap_or(BindingTarget::Unknown)
    }
}

/// `onclick` → `click`
fn event_property(name: &str) -> Option<&str> {
    name.strip_prefix("on")
        .filter(|event| !event.is_empty() && event.bytes().all(|b| b.is_ascii_lowercase()))
}

fn unquote(literal: &str) -> &str {
    let mut chars = literal.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '"' | '\'' | '`') => {
            &literal[1..literal.len() - 1]
        }
        _ => literal,
    }
}
