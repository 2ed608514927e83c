//! The context stack behind the context-switching state machine

use super::error::ContextStackError;
use super::trigger::{ContextTrigger, TriggerKind};
use crate::config::compile_time::context::MAX_CONTEXT_STACK_DEPTH;
use crate::grammar::EffectiveGrammar;
use crate::symbols::ScopeId;
use crate::utils::Position;
use serde::Serialize;
use std::sync::Arc;

/// One frame: the active grammar and how it was entered
#[derive(Debug, Clone, Serialize)]
pub struct ParsingContext {
    pub language: String,
    #[serde(skip)]
    pub grammar: Arc<EffectiveGrammar>,
    /// `None` for the root context
    pub entered_by: Option<TriggerKind>,
    /// Index of the parent frame
    pub parent: Option<usize>,
    /// 1 for the root context
    pub depth: usize,
    pub scope: ScopeId,
    pub preserve_symbol_table: bool,
    pub enable_cross_reference: bool,
    pub opened_at: Position,
}

impl ParsingContext {
    pub fn root(language: impl Into<String>, grammar: Arc<EffectiveGrammar>, scope: ScopeId) -> Self {
        Self {
            language: language.into(),
            grammar,
            entered_by: None,
            parent: None,
            depth: 1,
            scope,
            preserve_symbol_table: true,
            enable_cross_reference: true,
            opened_at: Position::start(),
        }
    }

    /// Context entered through `trigger`; parent and depth are set on push
    pub fn embedded(
        trigger: &ContextTrigger,
        grammar: Arc<EffectiveGrammar>,
        scope: ScopeId,
        opened_at: Position,
    ) -> Self {
        Self {
            language: trigger.target_context.clone(),
            grammar,
            entered_by: Some(trigger.kind),
            parent: None,
            depth: 0,
            scope,
            preserve_symbol_table: trigger.preserve_symbol_table,
            enable_cross_reference: trigger.enable_cross_reference,
            opened_at,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether symbols recorded in this context can take part in
    /// cross-language lookup
    pub fn is_isolated(&self) -> bool {
        !self.preserve_symbol_table
    }
}

/// Stack of active contexts. Never empty: the root frame is pushed on
/// construction and cannot be popped.
#[derive(Debug, Clone)]
pub struct ContextStack {
    frames: Vec<ParsingContext>,
    switch_count: usize,
    max_depth: usize,
}

impl ContextStack {
    pub fn new(root: ParsingContext) -> Self {
        Self {
            frames: vec![root],
            switch_count: 0,
            max_depth: 1,
        }
    }

    pub fn current(&self) -> &ParsingContext {
        // frames is never empty
        &self.frames[self.frames.len() - 1]
    }

    pub fn root(&self) -> &ParsingContext {
        &self.frames[0]
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of pushes and pops so far
    pub fn switch_count(&self) -> usize {
        self.switch_count
    }

    pub fn frames(&self) -> &[ParsingContext] {
        &self.frames
    }

    /// Push a context as a child of the current one, filling in its parent
    /// link and depth
    pub fn push(&mut self, mut context: ParsingContext) -> Result<&ParsingContext, ContextStackError> {
        if self.frames.len() >= MAX_CONTEXT_STACK_DEPTH {
            return Err(ContextStackError::DepthExceeded {
                limit: MAX_CONTEXT_STACK_DEPTH,
                position: context.opened_at,
            });
        }

        context.parent = Some(self.frames.len() - 1);
        context.depth = self.frames.len() + 1;
        self.frames.push(context);
        self.switch_count += 1;
        self.max_depth = self.max_depth.max(self.frames.len());

        crate::log_debug!("Context pushed",
            "language" => &self.current().language,
            "depth" => self.frames.len(),
            "switches" => self.switch_count
        );

        Ok(self.current())
    }

    /// Pop the current context, which must be a `language` context
    pub fn pop(&mut self, language: &str, position: Position) -> Result<ParsingContext, ContextStackError> {
        if self.frames.len() == 1 {
            return Err(ContextStackError::PopPastRoot { position });
        }

        if self.current().language != language {
            return Err(ContextStackError::MismatchedPop {
                expected: language.to_string(),
                found: self.current().language.clone(),
                position,
            });
        }

        let popped = self
            .frames
            .pop()
            .ok_or(ContextStackError::PopPastRoot { position })?;
        self.switch_count += 1;

        crate::log_debug!("Context popped",
            "language" => &popped.language,
            "depth" => self.frames.len(),
            "switches" => self.switch_count
        );

        Ok(popped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, InheritanceResolver};
    use assert_matches::assert_matches;

    fn grammar(name: &str) -> Arc<EffectiveGrammar> {
        let mut resolver = InheritanceResolver::new();
        resolver
            .register_grammar(Grammar::builder(name).rule("start", ["'x'"]).build())
            .unwrap();
        resolver.resolve(name).unwrap()
    }

    fn child(language: &str) -> ParsingContext {
        let trigger = ContextTrigger::element("x-embed", language);
        ParsingContext::embedded(&trigger, grammar(language), ScopeId(1), Position::start())
    }

    #[test]
    fn test_push_pop_restores_root() {
        let _ = crate::logging::init_global_logging();
        let mut stack = ContextStack::new(ParsingContext::root("HTML", grammar("HTML"), ScopeId(0)));

        let pushed = stack.push(child("JavaScript")).unwrap();
        assert_eq!(pushed.depth, 2);
        assert_eq!(pushed.parent, Some(0));

        stack.pop("JavaScript", Position::zero()).unwrap();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.switch_count(), 2);
        assert_eq!(stack.max_depth(), 2);
        assert!(stack.current().is_root());
    }

    #[test]
    fn test_pop_past_root_and_mismatch() {
        let mut stack = ContextStack::new(ParsingContext::root("HTML", grammar("HTML"), ScopeId(0)));
        assert_matches!(
            stack.pop("HTML", Position::zero()),
            Err(ContextStackError::PopPastRoot { .. })
        );

        stack.push(child("CSS")).unwrap();
        stack.push(child("JavaScript")).unwrap();
        assert_matches!(
            stack.pop("CSS", Position::zero()),
            Err(ContextStackError::MismatchedPop { .. })
        );
        assert_eq!(stack.depth(), 3);
    }

    #[test]
    fn test_depth_limit() {
        let mut stack = ContextStack::new(ParsingContext::root("HTML", grammar("HTML"), ScopeId(0)));
        let css = child("CSS");
        for _ in 1..MAX_CONTEXT_STACK_DEPTH {
            stack.push(css.clone()).unwrap();
        }
        assert_matches!(
            stack.push(css),
            Err(ContextStackError::DepthExceeded { .. })
        );
    }
}
