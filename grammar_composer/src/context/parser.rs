//! Markup host scanner and the context-switching state machine
//!
//! The document is read as host markup. When a registered trigger matches
//! (a start tag, an attribute name, or a content opener) the target
//! language's context is pushed, its region is tokenized with that
//! language's effective grammar and handed to the language scanner, and the
//! context is popped at the region's terminator. Content triggers may nest
//! inside any region of another language; such nested regions are parsed
//! first and blanked out of the enclosing region's text.

use super::error::{ContextStackError, ParseError};
use super::references::{BindingTarget, ParseArtifacts};
use super::scanner::{scanner_for, words, LanguageKind, Region, RegionMode, ScanSink};
use super::stack::{ContextStack, ParsingContext};
use super::tree::{Attribute, NodeId, NodeKind, ParseTree};
use super::trigger::{CompiledTrigger, TriggerMatcher, TriggerSet};
use crate::config::compile_time::context::{MAX_DOCUMENT_SIZE, MAX_ELEMENT_NESTING};
use crate::grammar::EffectiveGrammar;
use crate::symbols::{NewSymbol, SymbolKind, SymbolTable};
use crate::utils::{SourceMap, Spanned};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is never markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Words that start an inline handler but are not a handler name
const HANDLER_KEYWORDS: &[&str] = &[
    "return", "if", "function", "var", "let", "const", "new", "this", "typeof", "void", "true",
    "false", "null",
];

/// A language as the parser sees it: scanner family plus resolved grammar
#[derive(Debug, Clone)]
pub struct LanguageSpec {
    pub name: String,
    pub kind: LanguageKind,
    pub grammar: Arc<EffectiveGrammar>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextStats {
    pub switch_count: usize,
    pub max_depth: usize,
    pub final_depth: usize,
    pub embedded_regions: usize,
    pub bytes_processed: usize,
}

#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub tree: ParseTree,
    pub artifacts: ParseArtifacts,
    pub stats: ContextStats,
}

pub struct ContextParser<'a> {
    source: &'a str,
    map: SourceMap<'a>,
    host: &'a LanguageSpec,
    languages: &'a IndexMap<String, LanguageSpec>,
    triggers: &'a TriggerSet,
    table: &'a mut SymbolTable,
    stack: ContextStack,
    tree: ParseTree,
    artifacts: ParseArtifacts,
    embedded_regions: usize,
}

impl<'a> ContextParser<'a> {
    /// `languages` must contain every trigger target; symbols are recorded
    /// into `table`, which keeps whatever was recorded if the parse fails
    pub fn new(
        source: &'a str,
        host: &'a LanguageSpec,
        languages: &'a IndexMap<String, LanguageSpec>,
        triggers: &'a TriggerSet,
        table: &'a mut SymbolTable,
    ) -> Result<Self, ParseError> {
        if source.len() > MAX_DOCUMENT_SIZE {
            return Err(ParseError::DocumentTooLarge {
                size: source.len(),
                limit: MAX_DOCUMENT_SIZE,
            });
        }

        let map = SourceMap::new(source);
        let root = ParsingContext::root(&host.name, Arc::clone(&host.grammar), table.root_scope());
        let tree = ParseTree::new(map.span(0, source.len()));

        Ok(Self {
            source,
            map,
            host,
            languages,
            triggers,
            table,
            stack: ContextStack::new(root),
            tree,
            artifacts: ParseArtifacts::default(),
            embedded_regions: 0,
        })
    }

    pub fn parse(mut self) -> Result<ParseOutput, ParseError> {
        let root = self.tree.root();
        self.scan_markup(0, self.source.len(), root)?;

        if self.stack.depth() != 1 {
            let open = self.stack.current();
            return Err(ContextStackError::UnclosedContext {
                language: open.language.clone(),
                opened_at: open.opened_at,
            }
            .into());
        }

        let stats = ContextStats {
            switch_count: self.stack.switch_count(),
            max_depth: self.stack.max_depth(),
            final_depth: self.stack.depth(),
            embedded_regions: self.embedded_regions,
            bytes_processed: self.source.len(),
        };

        Ok(ParseOutput {
            tree: self.tree,
            artifacts: self.artifacts,
            stats,
        })
    }

    fn host_sink(&mut self) -> ScanSink<'_> {
        let scope = self.table.root_scope();
        ScanSink::new(
            &mut *self.table,
            &mut self.artifacts,
            &self.map,
            scope,
            &self.host.name,
            &self.host.name,
            true,
            false,
        )
    }

    // ===== HOST MARKUP =====

    fn scan_markup(&mut self, start: usize, end: usize, root: NodeId) -> Result<(), ParseError> {
        let source = self.source;
        let triggers = self.triggers;
        let mut open: Vec<(NodeId, String)> = Vec::new();
        let mut pos = start;

        while pos < end {
            let parent = open.last().map(|(id, _)| *id).unwrap_or(root);
            let rest = &source[pos..end];
            let bytes = rest.as_bytes();

            if let Some((opener, terminator, trigger)) = triggers
                .content_triggers()
                .find(|(opener, _, _)| rest.starts_with(opener))
            {
                pos = self.content_region(trigger, opener, terminator, pos, end, parent)?;
            } else if let Some((_, terminator, _)) = triggers
                .content_triggers()
                .find(|(_, terminator, _)| rest.starts_with(terminator))
            {
                return Err(ContextStackError::UnmatchedTerminator {
                    terminator: terminator.to_string(),
                    position: self.map.position_at(pos),
                }
                .into());
            } else if rest.starts_with("<!--") {
                pos = self.comment(pos, end, parent);
            } else if rest.starts_with("</") {
                pos = self.end_tag(pos, end, &mut open)?;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                pos = rest.find('>').map(|i| pos + i + 1).unwrap_or(end);
            } else if bytes.len() > 1 && bytes[0] == b'<' && bytes[1].is_ascii_alphabetic() {
                pos = self.start_tag(pos, end, parent, &mut open)?;
            } else {
                pos = self.text(pos, end, parent);
            }
        }

        Ok(())
    }

    fn comment(&mut self, pos: usize, end: usize, parent: NodeId) -> usize {
        let body_start = pos + "<!--".len();
        let (body_end, next) = match self.source[body_start..end].find("-->") {
            Some(i) => (body_start + i, body_start + i + 3),
            None => (end, end),
        };

        let text = self.source[body_start..body_end].to_string();
        let span = self.map.span(pos, next);
        self.tree
            .add(parent, NodeKind::Comment { text }, span, self.stack.depth());
        next
    }

    fn text(&mut self, pos: usize, end: usize, parent: NodeId) -> usize {
        let source = self.source;
        let first = source[pos..end].chars().next().map(char::len_utf8).unwrap_or(1);
        let search_from = pos + first;
        let haystack = &source[search_from..end];

        let mut next = haystack.find('<').map(|i| search_from + i).unwrap_or(end);
        for (opener, terminator, _) in self.triggers.content_triggers() {
            for pattern in [opener, terminator] {
                if let Some(i) = haystack.find(pattern) {
                    next = next.min(search_from + i);
                }
            }
        }

        let text = &source[pos..next];
        if !text.trim().is_empty() {
            let span = self.map.span(pos, next);
            self.tree.add(
                parent,
                NodeKind::Text {
                    text: text.to_string(),
                },
                span,
                self.stack.depth(),
            );
        }
        next
    }

    fn end_tag(&mut self, pos: usize, end: usize, open: &mut Vec<(NodeId, String)>) -> Result<usize, ParseError> {
        let source = self.source;
        let name_start = pos + 2;
        let name_end = scan_name(source, name_start, end);
        let name = source[name_start..name_end].to_ascii_lowercase();
        let close = source[name_end..end]
            .find('>')
            .map(|i| name_end + i + 1)
            .unwrap_or(end);

        if !name.is_empty() && self.triggers.is_registered_end_tag(&name) {
            return Err(ContextStackError::UnmatchedTerminator {
                terminator: format!("</{}>", name),
                position: self.map.position_at(pos),
            }
            .into());
        }

        // unmatched non-context end tags are ignored
        if let Some(index) = open.iter().rposition(|(_, tag)| *tag == name) {
            for (id, _) in open.split_off(index) {
                self.close_element(id, close);
            }
        }

        Ok(close)
    }

    fn close_element(&mut self, id: NodeId, end: usize) {
        let Some(start) = self.tree.node(id).map(|n| n.span.start.offset) else {
            return;
        };
        let span = self.map.span(start, end);
        if let Some(node) = self.tree.node_mut(id) {
            node.span = span;
        }
    }

    fn start_tag(
        &mut self,
        pos: usize,
        end: usize,
        parent: NodeId,
        open: &mut Vec<(NodeId, String)>,
    ) -> Result<usize, ParseError> {
        let source = self.source;
        let triggers = self.triggers;

        if open.len() >= MAX_ELEMENT_NESTING {
            return Err(ContextStackError::DepthExceeded {
                limit: MAX_ELEMENT_NESTING,
                position: self.map.position_at(pos),
            }
            .into());
        }

        let name_end = scan_name(source, pos + 1, end);
        let tag = &source[pos + 1..name_end];
        let (attributes, self_closing, tag_end) = self.read_attributes(name_end, end);

        let span = self.map.span(pos, tag_end);
        let node = self.tree.add(
            parent,
            NodeKind::Element {
                tag: tag.to_string(),
                attributes: attributes.clone(),
                self_closing,
            },
            span,
            self.stack.depth(),
        );

        self.record_element(tag, pos, &attributes)?;
        self.attribute_contexts(node, &attributes)?;

        let lower = tag.to_ascii_lowercase();
        if self_closing || VOID_ELEMENTS.contains(&lower.as_str()) {
            return Ok(tag_end);
        }

        if let Some(trigger) = triggers.element_start(tag) {
            let end_tag = triggers.end_tag_for(trigger);
            let nested = !RAW_TEXT_ELEMENTS.contains(&lower.as_str());
            let Some((close_start, close_end)) = find_end_tag(source, tag_end, end, end_tag, nested) else {
                return Err(ContextStackError::UnclosedContext {
                    language: trigger.target().to_string(),
                    opened_at: self.map.position_at(pos),
                }
                .into());
            };
            self.embed(trigger, tag_end, close_start, node, RegionMode::Block)?;
            self.close_element(node, close_end);
            return Ok(close_end);
        }

        if RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
            let (close_start, close_end) = find_end_tag(source, tag_end, end, &lower, false).unwrap_or((end, end));
            let text = &source[tag_end..close_start];
            if !text.trim().is_empty() {
                let span = self.map.span(tag_end, close_start);
                self.tree.add(
                    node,
                    NodeKind::Text {
                        text: text.to_string(),
                    },
                    span,
                    self.stack.depth(),
                );
            }
            self.close_element(node, close_end);
            return Ok(close_end);
        }

        open.push((node, lower));
        Ok(tag_end)
    }

    /// Attributes from `from` up to the end of the tag. Returns them with
    /// the self-closing flag and the offset just past the tag.
    fn read_attributes(&self, from: usize, end: usize) -> (Vec<Attribute>, bool, usize) {
        let source = self.source;
        let bytes = source.as_bytes();
        let mut attributes = Vec::new();
        let mut i = from;

        let skip_whitespace = |mut i: usize| {
            while i < end && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            i
        };

        loop {
            i = skip_whitespace(i);
            if i >= end {
                return (attributes, false, end);
            }
            if bytes[i] == b'>' {
                return (attributes, false, i + 1);
            }
            if bytes[i..end].starts_with(b"/>") {
                return (attributes, true, i + 2);
            }
            if matches!(bytes[i], b'/' | b'=' | b'"' | b'\'') {
                i += 1;
                continue;
            }

            let name_start = i;
            while i < end
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'"' | b'\'')
                && !bytes[i..end].starts_with(b"/>")
            {
                i += 1;
            }
            let name = Spanned::new(source[name_start..i].to_string(), self.map.span(name_start, i));

            let mut j = skip_whitespace(i);
            let value = if j < end && bytes[j] == b'=' {
                j = skip_whitespace(j + 1);
                let (value_start, value_end, next) = if j < end && matches!(bytes[j], b'"' | b'\'') {
                    let quote = bytes[j] as char;
                    let value_start = j + 1;
                    let value_end = source[value_start..end]
                        .find(quote)
                        .map(|k| value_start + k)
                        .unwrap_or(end);
                    (value_start, value_end, (value_end + 1).min(end))
                } else {
                    let value_start = j;
                    while j < end && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                        j += 1;
                    }
                    (value_start, j, j)
                };
                i = next;
                Some(Spanned::new(
                    source[value_start..value_end].to_string(),
                    self.map.span(value_start, value_end),
                ))
            } else {
                None
            };

            attributes.push(Attribute { name, value });
        }
    }

    fn record_element(&mut self, tag: &str, pos: usize, attributes: &[Attribute]) -> Result<(), ParseError> {
        let host = self.host;
        let mut sink = self.host_sink();
        sink.declare(tag, SymbolKind::Element, pos + 1)?;

        for attribute in attributes {
            let Some(value) = &attribute.value else {
                continue;
            };
            match attribute.name.value.to_ascii_lowercase().as_str() {
                "id" if !value.value.trim().is_empty() => {
                    let symbol = NewSymbol::new(value.value.trim(), &host.name, SymbolKind::Id, value.span.start)
                        .with_attribute("tag", tag);
                    sink.declare_with(symbol)?;
                }
                "class" => {
                    for (at, class) in words(&value.value) {
                        sink.declare(class, SymbolKind::Class, value.span.start.offset + at)?;
                    }
                }
                "name" if !value.value.is_empty() => {
                    sink.declare(&value.value, SymbolKind::Attribute, value.span.start.offset)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Inline event handlers and attribute-triggered contexts
    fn attribute_contexts(&mut self, node: NodeId, attributes: &[Attribute]) -> Result<(), ParseError> {
        let triggers = self.triggers;
        let element_id = attributes
            .iter()
            .find(|a| a.name.value.eq_ignore_ascii_case("id"))
            .and_then(|a| a.value.as_ref())
            .map(|v| v.value.trim())
            .filter(|id| !id.is_empty());

        for attribute in attributes {
            let Some(value) = &attribute.value else {
                continue;
            };
            let name = attribute.name.value.to_ascii_lowercase();

            if let Some(event) = name.strip_prefix("on").filter(|e| !e.is_empty()) {
                let target = element_id
                    .map(|id| BindingTarget::Id(id.to_string()))
                    .unwrap_or(BindingTarget::Node(node));
                let handler = handler_name(&value.value);
                self.host_sink()
                    .event_binding(event, target, handler, value.span.start.offset);
            }

            if let Some(trigger) = triggers.attribute(&attribute.name.value) {
                let mode = RegionMode::Attribute {
                    element: node,
                    attribute: attribute.name.value.clone(),
                };
                self.embed(trigger, value.span.start.offset, value.span.end.offset, node, mode)?;
            }
        }

        Ok(())
    }

    // ===== EMBEDDED CONTEXTS =====

    fn content_region(
        &mut self,
        trigger: &'a CompiledTrigger,
        opener: &str,
        terminator: &str,
        pos: usize,
        end: usize,
        parent: NodeId,
    ) -> Result<usize, ParseError> {
        let inner_start = pos + opener.len();
        let Some(found) = self.source[inner_start..end].find(terminator) else {
            return Err(ContextStackError::UnclosedContext {
                language: trigger.target().to_string(),
                opened_at: self.map.position_at(pos),
            }
            .into());
        };

        let inner_end = inner_start + found;
        self.embed(trigger, inner_start, inner_end, parent, RegionMode::Block)?;
        Ok(inner_end + terminator.len())
    }

    /// Push the trigger's context, scan `start..end` in it, pop
    fn embed(
        &mut self,
        trigger: &'a CompiledTrigger,
        start: usize,
        end: usize,
        parent: NodeId,
        mode: RegionMode,
    ) -> Result<NodeId, ParseError> {
        let languages = self.languages;
        let language = trigger.target();
        let spec = languages
            .get(language)
            .ok_or_else(|| ParseError::LanguageNotRegistered {
                language: language.to_string(),
            })?;

        let opened_at = self.map.position_at(start);
        let parent_scope = self.stack.current().scope;
        let scope = self
            .table
            .open_scope(language, parent_scope, !trigger.trigger.preserve_symbol_table)?;
        self.stack.push(ParsingContext::embedded(
            &trigger.trigger,
            Arc::clone(&spec.grammar),
            scope,
            opened_at,
        ))?;

        let span = self.map.span(start, end);
        let node = self.tree.add(
            parent,
            NodeKind::Embedded {
                language: language.to_string(),
                grammar: spec.grammar.name.clone(),
                trigger: trigger.kind(),
                token_count: 0,
                unmatched_bytes: 0,
            },
            span,
            self.stack.depth(),
        );
        self.embedded_regions += 1;

        let text = self.blank_nested_regions(language, start, end, node)?;
        let grammar = Arc::clone(&self.stack.current().grammar);
        let summary = grammar.tokenizer().tokenize(&text);

        if let Some(scanner) = scanner_for(spec.kind) {
            let isolated = self.table.scope(scope)?.is_isolated();
            let region = Region {
                text: &text,
                base: start,
                tokens: &summary.tokens,
                mode: &mode,
            };
            let mut sink = ScanSink::new(
                &mut *self.table,
                &mut self.artifacts,
                &self.map,
                scope,
                language,
                &self.host.name,
                trigger.trigger.enable_cross_reference,
                isolated,
            );
            scanner.scan(&region, &mut sink)?;
        }

        if let Some(NodeKind::Embedded {
            token_count,
            unmatched_bytes,
            ..
        }) = self.tree.node_mut(node).map(|n| &mut n.kind)
        {
            *token_count = summary.tokens.len();
            *unmatched_bytes = summary.unmatched_bytes;
        }

        self.stack.pop(language, self.map.position_at(end))?;
        Ok(node)
    }

    /// Parse content-trigger regions of other languages inside `start..end`
    /// and return the region's text with them replaced by spaces
    fn blank_nested_regions(
        &mut self,
        language: &str,
        start: usize,
        end: usize,
        parent: NodeId,
    ) -> Result<String, ParseError> {
        let triggers = self.triggers;
        let source = self.source;
        let text = &source[start..end];
        let mut blanked = String::with_capacity(text.len());
        let mut cursor = 0;

        while let Some((at, trigger)) = triggers.next_content_opener(text, cursor, Some(language)) {
            let TriggerMatcher::Content { opener, terminator } = &trigger.matcher else {
                break;
            };
            let inner_start = at + opener.len();
            let Some(found) = text[inner_start..].find(terminator.as_str()) else {
                return Err(ContextStackError::UnclosedContext {
                    language: trigger.target().to_string(),
                    opened_at: self.map.position_at(start + at),
                }
                .into());
            };
            let inner_end = inner_start + found;
            let resume = inner_end + terminator.len();

            self.embed(trigger, start + inner_start, start + inner_end, parent, RegionMode::Block)?;

            blanked.push_str(&text[cursor..at]);
            blanked.extend(std::iter::repeat(' ').take(resume - at));
            cursor = resume;
        }

        blanked.push_str(&text[cursor..]);
        Ok(blanked)
    }
}

fn scan_name(source: &str, from: usize, end: usize) -> usize {
    let bytes = source.as_bytes();
    let mut i = from;
    while i < end && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'-' | b':' | b'_')) {
        i += 1;
    }
    i
}

/// `(start, end)` of the `</tag ...>` closing an element opened just
/// before `from`, compared case-insensitively. With `nested`, each
/// `<tag ...>` opened on the way needs its own end tag first; otherwise the
/// first end tag closes.
fn find_end_tag(source: &str, from: usize, end: usize, tag: &str, nested: bool) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut i = from;

    while let Some(found) = source[i..end].find('<') {
        let at = i + found;
        let closing = source.as_bytes().get(at + 1) == Some(&b'/');
        let name_start = if closing { at + 2 } else { at + 1 };

        if !names_tag(source, name_start, end, tag) || (!closing && !nested) {
            i = at + 1;
            continue;
        }

        let name_end = name_start + tag.len();
        let close = source[name_end..end]
            .find('>')
            .map(|k| name_end + k + 1)
            .unwrap_or(end);

        if closing {
            if depth == 0 {
                return Some((at, close));
            }
            depth -= 1;
        } else if !source[at..close].ends_with("/>") {
            depth += 1;
        }
        i = close.max(at + 1);
    }

    None
}

/// Whether `tag` starts at `name_start` and the tag name ends there
fn names_tag(source: &str, name_start: usize, end: usize, tag: &str) -> bool {
    let name_end = name_start + tag.len();
    if name_end > end
        || !source
            .get(name_start..name_end)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    {
        return false;
    }
    name_end == end || {
        let next = source.as_bytes()[name_end];
        matches!(next, b'>' | b'/') || next.is_ascii_whitespace()
    }
}

/// Handler named by an inline event attribute: `save()`, `save(event);` or
/// a bare `save`
fn handler_name(value: &str) -> Option<&str> {
    let trimmed = value.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(trimmed.len());
    let name = &trimmed[..end];

    if name.is_empty() || name.as_bytes()[0].is_ascii_digit() || HANDLER_KEYWORDS.contains(&name) {
        return None;
    }

    let rest = trimmed[end..].trim_start();
    (rest.is_empty() || rest.starts_with('(') || rest.starts_with(';')).then_some(name)
}
