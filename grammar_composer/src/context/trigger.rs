//! Context triggers: the patterns that open and close embedded contexts

use super::error::TriggerError;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Start tag name, e.g. `script`; the region runs to the matching end tag
    ElementStart,
    /// End tag name that closes the target context
    ElementEnd,
    /// Regular expression over attribute names; the value is the region
    Attribute,
    /// Literal opener in text content, closed by a literal terminator
    Content,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::ElementStart => "element_start",
            TriggerKind::ElementEnd => "element_end",
            TriggerKind::Attribute => "attribute",
            TriggerKind::Content => "content",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTrigger {
    pub kind: TriggerKind,
    pub pattern: String,
    /// End tag (element start) or closing literal (content)
    #[serde(default)]
    pub terminator: Option<String>,
    pub target_context: String,
    #[serde(default = "default_true")]
    pub preserve_symbol_table: bool,
    #[serde(default = "default_true")]
    pub enable_cross_reference: bool,
}

fn default_true() -> bool {
    true
}

impl ContextTrigger {
    fn new(kind: TriggerKind, pattern: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
            terminator: None,
            target_context: target.into(),
            preserve_symbol_table: true,
            enable_cross_reference: true,
        }
    }

    pub fn element(tag: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(TriggerKind::ElementStart, tag, target)
    }

    pub fn element_end(tag: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(TriggerKind::ElementEnd, tag, target)
    }

    pub fn attribute(name_pattern: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(TriggerKind::Attribute, name_pattern, target)
    }

    pub fn content(
        opener: impl Into<String>,
        terminator: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::new(TriggerKind::Content, opener, target).with_terminator(terminator)
    }

    pub fn with_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = Some(terminator.into());
        self
    }

    pub fn isolated(mut self) -> Self {
        self.preserve_symbol_table = false;
        self
    }

    pub fn without_cross_reference(mut self) -> Self {
        self.enable_cross_reference = false;
        self
    }

    pub fn compile(&self) -> Result<CompiledTrigger, TriggerError> {
        let matcher = match self.kind {
            TriggerKind::ElementStart | TriggerKind::ElementEnd => {
                let tag = valid_tag(self.kind, &self.pattern)?;
                let terminator = match &self.terminator {
                    Some(end) => valid_tag(self.kind, end)?,
                    None => tag.clone(),
                };
                TriggerMatcher::Tag { tag, terminator }
            }
            TriggerKind::Attribute => {
                let regex = Regex::new(&self.pattern).map_err(|e| TriggerError::InvalidPattern {
                    kind: self.kind.as_str(),
                    pattern: self.pattern.clone(),
                    reason: e.to_string(),
                })?;
                TriggerMatcher::Attribute(regex)
            }
            TriggerKind::Content => {
                if self.pattern.is_empty() {
                    return Err(TriggerError::InvalidPattern {
                        kind: self.kind.as_str(),
                        pattern: self.pattern.clone(),
                        reason: "opener is empty".into(),
                    });
                }
                let terminator = self
                    .terminator
                    .clone()
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| TriggerError::MissingTerminator {
                        pattern: self.pattern.clone(),
                    })?;
                TriggerMatcher::Content {
                    opener: self.pattern.clone(),
                    terminator,
                }
            }
        };

        Ok(CompiledTrigger {
            trigger: self.clone(),
            matcher,
        })
    }
}

fn valid_tag(kind: TriggerKind, tag: &str) -> Result<String, TriggerError> {
    let ok = tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':');
    if ok {
        Ok(tag.to_ascii_lowercase())
    } else {
        Err(TriggerError::InvalidPattern {
            kind: kind.as_str(),
            pattern: tag.to_string(),
            reason: "not a tag name".into(),
        })
    }
}

#[derive(Debug, Clone)]
pub enum TriggerMatcher {
    /// Lower-cased tag names
    Tag { tag: String, terminator: String },
    Attribute(Regex),
    Content { opener: String, terminator: String },
}

/// A trigger with its pattern validated and compiled, in registration order
#[derive(Debug, Clone)]
pub struct CompiledTrigger {
    pub trigger: ContextTrigger,
    pub matcher: TriggerMatcher,
}

impl CompiledTrigger {
    pub fn kind(&self) -> TriggerKind {
        self.trigger.kind
    }

    pub fn target(&self) -> &str {
        &self.trigger.target_context
    }

    pub fn matches_start_tag(&self, tag: &str) -> bool {
        match (&self.matcher, self.trigger.kind) {
            (TriggerMatcher::Tag { tag: t, .. }, TriggerKind::ElementStart) => {
                t.eq_ignore_ascii_case(tag)
            }
            _ => false,
        }
    }

    pub fn matches_attribute(&self, name: &str) -> bool {
        match &self.matcher {
            TriggerMatcher::Attribute(regex) => regex.is_match(name),
            _ => false,
        }
    }
}

/// Registered triggers, consulted in registration order so the first
/// registered trigger wins when several match at one position
#[derive(Debug, Clone, Default)]
pub struct TriggerSet {
    triggers: Vec<CompiledTrigger>,
}

impl TriggerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_compiled(triggers: Vec<CompiledTrigger>) -> Self {
        Self { triggers }
    }

    pub fn push(&mut self, trigger: CompiledTrigger) {
        self.triggers.push(trigger);
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledTrigger> {
        self.triggers.iter()
    }

    pub fn element_start(&self, tag: &str) -> Option<&CompiledTrigger> {
        self.triggers.iter().find(|t| t.matches_start_tag(tag))
    }

    pub fn attribute(&self, name: &str) -> Option<&CompiledTrigger> {
        self.triggers.iter().find(|t| t.matches_attribute(name))
    }

    /// End tag for a context opened by `trigger`. An explicit terminator wins,
    /// then an element-end trigger registered for the same target.
    pub fn end_tag_for<'a>(&'a self, trigger: &'a CompiledTrigger) -> &'a str {
        let TriggerMatcher::Tag { tag, terminator } = &trigger.matcher else {
            return "";
        };
        if trigger.trigger.terminator.is_some() {
            return terminator;
        }
        self.triggers
            .iter()
            .filter(|t| t.kind() == TriggerKind::ElementEnd && t.target() == trigger.target())
            .find_map(|t| match &t.matcher {
                TriggerMatcher::Tag { tag, .. } => Some(tag.as_str()),
                _ => None,
            })
            .unwrap_or(tag)
    }

    /// Whether `tag` closes some registered context
    pub fn is_registered_end_tag(&self, tag: &str) -> bool {
        self.triggers.iter().any(|t| match &t.matcher {
            TriggerMatcher::Tag { tag: open, .. } => match t.kind() {
                TriggerKind::ElementEnd => open.eq_ignore_ascii_case(tag),
                _ => self.end_tag_for(t).eq_ignore_ascii_case(tag),
            },
            _ => false,
        })
    }

    /// Content triggers as `(opener, terminator, trigger)`, in registration order
    pub fn content_triggers(&self) -> impl Iterator<Item = (&str, &str, &CompiledTrigger)> {
        self.triggers.iter().filter_map(|t| match &t.matcher {
            TriggerMatcher::Content { opener, terminator } => {
                Some((opener.as_str(), terminator.as_str(), t))
            }
            _ => None,
        })
    }

    /// Earliest content opener at or after `from` whose target is not
    /// `exclude`; ties at one offset go to the first registered trigger
    pub fn next_content_opener<'a>(
        &'a self,
        text: &str,
        from: usize,
        exclude: Option<&str>,
    ) -> Option<(usize, &'a CompiledTrigger)> {
        self.content_triggers()
            .filter(|(_, _, t)| Some(t.target()) != exclude)
            .filter_map(|(opener, _, t)| text[from..].find(opener).map(|i| (from + i, t)))
            .fold(None, |best: Option<(usize, &CompiledTrigger)>, candidate| match best {
                Some((at, _)) if at <= candidate.0 => best,
                _ => Some(candidate),
            })
    }
}
