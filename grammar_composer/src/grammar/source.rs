//! Grammar source text reader
//!
//! ```text
//! // comments: line and block
//! grammar Derived extends Base, Other;
//! document : element* ;
//! @override attribute : NAME '=' VALUE | NAME ;
//! NAME : /[a-z][a-z0-9-]*/ ;
//! EQ   : '=' ;
//! ```
//!
//! Rules whose name is entirely upper-case are token patterns; their
//! alternatives must be `/regex/` or quoted literals.

use super::error::GrammarSourceError;
use super::model::{Grammar, GrammarBuilder, TokenPattern};
use crate::config::compile_time::grammar::MAX_GRAMMAR_SOURCE_SIZE;
use crate::utils::SourceMap;

impl Grammar {
    /// Read a grammar from its source text
    pub fn parse_source(text: &str) -> Result<Grammar, GrammarSourceError> {
        parse_grammar_source(text)
    }
}

pub fn parse_grammar_source(text: &str) -> Result<Grammar, GrammarSourceError> {
    if text.len() > MAX_GRAMMAR_SOURCE_SIZE {
        return Err(GrammarSourceError::TooLarge {
            size: text.len(),
            limit: MAX_GRAMMAR_SOURCE_SIZE,
        });
    }

    SourceReader::new(text).read()
}

fn is_token_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

struct SourceReader<'a> {
    src: &'a str,
    pos: usize,
    map: SourceMap<'a>,
}

impl<'a> SourceReader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            map: SourceMap::new(src),
        }
    }

    fn read(mut self) -> Result<Grammar, GrammarSourceError> {
        self.skip_trivia()?;
        self.expect_keyword("grammar")?;
        let name = self.ident()?;
        let mut builder = Grammar::builder(name);

        self.skip_trivia()?;
        if self.rest().starts_with("extends") {
            self.expect_keyword("extends")?;
            loop {
                builder = builder.extends(self.ident()?);
                self.skip_trivia()?;
                if !self.eat(',') {
                    break;
                }
            }
        }
        self.expect_char(';')?;

        loop {
            self.skip_trivia()?;
            if self.at_end() {
                break;
            }
            builder = self.read_rule(builder)?;
        }

        Ok(builder.build())
    }

    fn read_rule(&mut self, builder: GrammarBuilder) -> Result<GrammarBuilder, GrammarSourceError> {
        let start = self.pos;
        let is_override = if self.eat('@') {
            self.expect_keyword("override")?;
            true
        } else {
            false
        };

        let name = self.ident()?;
        self.expect_char(':')?;

        if is_token_name(&name) {
            if is_override {
                return Err(GrammarSourceError::InvalidToken {
                    token: name,
                    reason: "override marker applies to production rules only".into(),
                    position: self.map.position_at(start),
                });
            }
            let pattern = self.read_token_pattern(&name, start)?;
            return Ok(builder.token(name, pattern));
        }

        let alternatives = self.read_alternatives(start)?;
        Ok(if is_override {
            builder.override_rule(name, alternatives)
        } else {
            builder.rule(name, alternatives)
        })
    }

    /// Raw alternatives up to the closing `;`, split on top-level `|`
    fn read_alternatives(&mut self, rule_start: usize) -> Result<Vec<String>, GrammarSourceError> {
        let mut alternatives = Vec::new();
        let mut current = String::new();
        let mut depth = 0usize;

        loop {
            let Some(ch) = self.peek() else {
                return Err(GrammarSourceError::Unterminated {
                    what: "rule",
                    position: self.map.position_at(rule_start),
                });
            };

            match ch {
                '\'' | '"' => {
                    let literal_start = self.pos;
                    self.bump();
                    current.push(ch);
                    loop {
                        match self.bump() {
                            Some('\\') => {
                                current.push('\\');
                                if let Some(escaped) = self.bump() {
                                    current.push(escaped);
                                }
                            }
                            Some(c) if c == ch => {
                                current.push(c);
                                break;
                            }
                            Some(c) => current.push(c),
                            None => {
                                return Err(GrammarSourceError::Unterminated {
                                    what: "literal",
                                    position: self.map.position_at(literal_start),
                                })
                            }
                        }
                    }
                }
                '/' if self.rest().starts_with("//") || self.rest().starts_with("/*") => {
                    self.skip_trivia()?;
                    current.push(' ');
                }
                '(' | '[' => {
                    depth += 1;
                    current.push(ch);
                    self.bump();
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                    self.bump();
                }
                '|' if depth == 0 => {
                    alternatives.push(std::mem::take(&mut current));
                    self.bump();
                }
                ';' if depth == 0 => {
                    alternatives.push(current);
                    self.bump();
                    return Ok(alternatives);
                }
                _ => {
                    current.push(ch);
                    self.bump();
                }
            }
        }
    }

    fn read_token_pattern(
        &mut self,
        name: &str,
        rule_start: usize,
    ) -> Result<TokenPattern, GrammarSourceError> {
        let mut patterns = Vec::new();

        loop {
            self.skip_trivia()?;
            let pattern_start = self.pos;
            let pattern = match self.peek() {
                Some('/') => TokenPattern::Regex(self.regex_literal()?),
                Some(q @ ('\'' | '"')) => TokenPattern::Literal(self.quoted_literal(q)?),
                _ => return Err(self.unexpected("'/regex/' or quoted literal")),
            };

            if let Err(err) = regex::Regex::new(&pattern.to_regex_source()) {
                return Err(GrammarSourceError::InvalidToken {
                    token: name.to_string(),
                    reason: err.to_string(),
                    position: self.map.position_at(pattern_start),
                });
            }
            patterns.push(pattern);

            self.skip_trivia()?;
            match self.peek() {
                Some('|') => {
                    self.bump();
                }
                Some(';') => {
                    self.bump();
                    break;
                }
                Some(_) => return Err(self.unexpected("'|' or ';'")),
                None => {
                    return Err(GrammarSourceError::Unterminated {
                        what: "token rule",
                        position: self.map.position_at(rule_start),
                    })
                }
            }
        }

        if patterns.len() == 1 {
            return Ok(patterns.remove(0));
        }

        let combined = patterns
            .iter()
            .map(|p| format!("(?:{})", p.to_regex_source()))
            .collect::<Vec<_>>()
            .join("|");
        Ok(TokenPattern::Regex(combined))
    }

    /// `/.../` with `\/` unescaped to `/`; other escapes pass through
    fn regex_literal(&mut self) -> Result<String, GrammarSourceError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some('/') => out.push('/'),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => break,
                },
                Some('/') => return Ok(out),
                Some('\n') | None => break,
                Some(c) => out.push(c),
            }
        }
        Err(GrammarSourceError::Unterminated {
            what: "regex",
            position: self.map.position_at(start),
        })
    }

    fn quoted_literal(&mut self, quote: char) -> Result<String, GrammarSourceError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => break,
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(GrammarSourceError::Unterminated {
            what: "literal",
            position: self.map.position_at(start),
        })
    }

    // ===== CURSOR =====

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) -> Result<(), GrammarSourceError> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                let line_len = trimmed.find('\n').unwrap_or(trimmed.len());
                self.pos += line_len;
            } else if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => {
                        return Err(GrammarSourceError::Unterminated {
                            what: "comment",
                            position: self.map.position_at(self.pos),
                        })
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    fn ident(&mut self) -> Result<String, GrammarSourceError> {
        self.skip_trivia()?;
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return Err(self.unexpected("identifier")),
        }
        let len = chars
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), GrammarSourceError> {
        let start = self.pos;
        match self.ident() {
            Ok(word) if word == keyword => Ok(()),
            _ => {
                self.pos = start;
                self.skip_trivia()?;
                Err(self.unexpected(&format!("'{}'", keyword)))
            }
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), GrammarSourceError> {
        self.skip_trivia()?;
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    fn unexpected(&self, expected: &str) -> GrammarSourceError {
        GrammarSourceError::Unexpected {
            expected: expected.to_string(),
            found: self
                .peek()
                .map(|c| format!("'{}'", c))
                .unwrap_or_else(|| "end of input".to_string()),
            position: self.map.position_at(self.pos),
        }
    }
}
