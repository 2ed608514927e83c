//! Style sheet scanning: selectors become symbols, references and bindings

use super::references::{BindingTarget, ReferenceKind, ReferenceOrigin};
use super::scanner::{LanguageScanner, Region, RegionMode, ScanSink};
use crate::grammar::Token;
use crate::symbols::{SymbolKind, SymbolTableError};

/// At-rules whose block holds further rule sets
const NESTED_RULE_AT_RULES: &[&str] = &["@media", "@supports", "@container", "@layer", "@document"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Rules,
    Declarations,
}

pub struct StyleScanner;

impl LanguageScanner for StyleScanner {
    fn scan(&self, region: &Region<'_>, sink: &mut ScanSink<'_>) -> Result<(), SymbolTableError> {
        if let RegionMode::Attribute { element, .. } = region.mode {
            sink.style_binding(None, BindingTarget::Node(*element), true, region.base);
            return Ok(());
        }

        let mut blocks: Vec<Block> = Vec::new();
        let mut prelude: Vec<&Token> = Vec::new();
        let mut at_rule: Option<&str> = None;

        for token in region.tokens.iter().filter(|t| t.kind != "COMMENT") {
            let text = region.token_text(token);

            if blocks.last() == Some(&Block::Declarations) {
                match text {
                    "{" => blocks.push(Block::Declarations),
                    "}" => {
                        blocks.pop();
                    }
                    _ => {}
                }
                continue;
            }

            match text {
                ";" => {
                    at_rule = None;
                    prelude.clear();
                }
                "{" => {
                    let block = match at_rule.take() {
                        Some(name) if NESTED_RULE_AT_RULES.contains(&name.to_ascii_lowercase().as_str()) => {
                            Block::Rules
                        }
                        Some(_) => Block::Declarations,
                        None => {
                            rule_set(region, &prelude, sink)?;
                            Block::Declarations
                        }
                    };
                    prelude.clear();
                    blocks.push(block);
                }
                "}" => {
                    blocks.pop();
                    prelude.clear();
                    at_rule = None;
                }
                _ if token.kind == "AT_KEYWORD" => {
                    at_rule = Some(text);
                    prelude.clear();
                }
                _ if at_rule.is_none() => prelude.push(token),
                _ => {}
            }
        }

        Ok(())
    }
}

fn rule_set(region: &Region<'_>, prelude: &[&Token], sink: &mut ScanSink<'_>) -> Result<(), SymbolTableError> {
    let mut depth = 0usize;
    let mut groups: Vec<Vec<&Token>> = vec![Vec::new()];

    for &token in prelude {
        match region.token_text(token) {
            "," if depth == 0 => groups.push(Vec::new()),
            text => {
                if text == "(" || token.kind == "FUNCTION" {
                    depth += 1;
                } else if text == ")" {
                    depth = depth.saturating_sub(1);
                }
                if let Some(group) = groups.last_mut() {
                    group.push(token);
                }
            }
        }
    }

    for group in groups.iter().filter(|g| !g.is_empty()) {
        let (first, last) = (group[0], group[group.len() - 1]);
        let selector = region.text[first.start..last.end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        sink.declare(&selector, SymbolKind::Selector, region.offset(first))?;

        for (kind, name, offset) in selector_references(region, group) {
            sink.reference(
                name,
                kind,
                ReferenceOrigin::StyleRule {
                    selector: selector.clone(),
                },
                offset,
            );
            sink.style_binding(
                Some(&selector),
                BindingTarget::from_reference(kind, name),
                false,
                offset,
            );
        }
    }

    Ok(())
}

/// Id, class and type names in one selector, skipping attribute brackets,
/// pseudo-class names and pseudo-class arguments other than ids and classes
fn selector_references<'r>(region: &Region<'r>, selector: &[&Token]) -> Vec<(ReferenceKind, &'r str, usize)> {
    let mut found = Vec::new();
    let mut paren = 0usize;
    let mut bracket = 0usize;
    let mut after_colon = false;

    for &token in selector {
        let text = region.token_text(token);
        match (token.kind.as_str(), text) {
            (_, ":") => {
                after_colon = true;
                continue;
            }
            ("FUNCTION", _) | (_, "(") => paren += 1,
            (_, ")") => paren = paren.saturating_sub(1),
            (_, "[") => bracket += 1,
            (_, "]") => bracket = bracket.saturating_sub(1),
            ("ID_SELECTOR", _) if bracket == 0 => {
                found.push((ReferenceKind::Id, &text[1..], region.offset(token) + 1))
            }
            ("CLASS_SELECTOR", _) if bracket == 0 => {
                found.push((ReferenceKind::Class, &text[1..], region.offset(token) + 1))
            }
            ("IDENT" | "TYPE_SELECTOR", _) if bracket == 0 && paren == 0 && !after_colon => {
                found.push((ReferenceKind::Element, text, region.offset(token)))
            }
            _ => {}
        }
        after_colon = false;
    }

    found
}
