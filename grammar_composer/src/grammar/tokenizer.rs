//! Token scanning with an effective grammar's token patterns
//!
//! Leftmost-longest: at each offset every pattern is tried and the longest
//! match wins, ties going to the pattern defined first. Whitespace between
//! tokens is skipped; bytes no pattern accepts are counted and skipped.

use super::resolver::{CompiledToken, EffectiveGrammar};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenizeSummary {
    pub tokens: Vec<Token>,
    pub unmatched_bytes: usize,
}

pub struct GrammarTokenizer<'g> {
    grammar: &'g EffectiveGrammar,
}

impl<'g> GrammarTokenizer<'g> {
    pub fn new(grammar: &'g EffectiveGrammar) -> Self {
        Self { grammar }
    }

    pub fn tokenize(&self, text: &str) -> TokenizeSummary {
        let mut summary = TokenizeSummary::default();
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];
            let trimmed = rest.trim_start();
            pos += rest.len() - trimmed.len();
            if trimmed.is_empty() {
                break;
            }

            let best = self
                .grammar
                .compiled_tokens
                .iter()
                .filter_map(|token| {
                    token
                        .regex
                        .find(trimmed)
                        .filter(|m| m.end() > 0)
                        .map(|m| (token, m.end()))
                })
                .fold(None, |best: Option<(&CompiledToken, usize)>, candidate| match best {
                    Some((_, len)) if len >= candidate.1 => best,
                    _ => Some(candidate),
                });

            match best {
                Some((token, len)) => {
                    summary.tokens.push(Token {
                        kind: token.name.clone(),
                        start: pos,
                        end: pos + len,
                    });
                    pos += len;
                }
                None => {
                    let skip = trimmed.chars().next().map(char::len_utf8).unwrap_or(1);
                    summary.unmatched_bytes += skip;
                    pos += skip;
                }
            }
        }

        summary
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.tokenize(text).tokens.len()
    }
}

impl EffectiveGrammar {
    pub fn tokenizer(&self) -> GrammarTokenizer<'_> {
        GrammarTokenizer::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, InheritanceResolver, TokenPattern};

    fn effective(grammar: Grammar) -> std::sync::Arc<EffectiveGrammar> {
        let mut resolver = InheritanceResolver::new();
        let name = grammar.name().to_string();
        resolver.register_grammar(grammar).unwrap();
        resolver.resolve(&name).unwrap()
    }

    #[test]
    fn test_longest_match_then_first_defined() {
        let grammar = effective(
            Grammar::builder("T")
                .token("KEYWORD", TokenPattern::Regex(r"(?:let|const)\b".into()))
                .token("IDENT", TokenPattern::Regex(r"[a-z]+".into()))
                .token("EQ", TokenPattern::Literal("=".into()))
                .token("EQEQ", TokenPattern::Literal("==".into()))
                .build(),
        );

        let summary = grammar.tokenizer().tokenize("let letter == x");
        let kinds: Vec<&str> = summary.tokens.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["KEYWORD", "IDENT", "EQEQ", "IDENT"]);
        assert_eq!(summary.tokens[1].start, 4);
        assert_eq!(summary.unmatched_bytes, 0);
    }

    #[test]
    fn test_unmatched_bytes_are_skipped() {
        let grammar = effective(
            Grammar::builder("T")
                .token("NUM", TokenPattern::Regex("[0-9]+".into()))
                .build(),
        );

        let summary = grammar.tokenizer().tokenize("12 é 34");
        assert_eq!(summary.tokens.len(), 2);
        assert_eq!(summary.unmatched_bytes, 2);
    }
}
