//! Embedded language registration

use crate::config::ConfigError;
use crate::context::{ContextTrigger, LanguageKind};
use crate::grammar::{builtin, Grammar};
use crate::symbols::MergeStrategy;
use serde::{Deserialize, Serialize};

use super::error::ComposerError;

/// How one embedded language joins the composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedLanguageConfig {
    pub name: String,
    #[serde(default)]
    pub kind: LanguageKind,
    /// Grammar to register under `name`. Without one, a grammar of that
    /// name must already be registered.
    #[serde(default)]
    pub grammar: Option<Grammar>,
    #[serde(default)]
    pub context_triggers: Vec<ContextTrigger>,
    /// Falls back to the composer's default strategy
    #[serde(default)]
    pub symbol_table_merge_strategy: Option<MergeStrategy>,
}

impl EmbeddedLanguageConfig {
    pub fn new(name: impl Into<String>, kind: LanguageKind) -> Self {
        Self {
            name: name.into(),
            kind,
            grammar: None,
            context_triggers: Vec::new(),
            symbol_table_merge_strategy: None,
        }
    }

    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = Some(grammar);
        self
    }

    pub fn with_trigger(mut self, trigger: ContextTrigger) -> Self {
        self.context_triggers.push(trigger);
        self
    }

    pub fn with_merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.symbol_table_merge_strategy = Some(strategy);
        self
    }

    /// Read a language definition from TOML text. A `grammar_source` key,
    /// when present, holds grammar source text for the language.
    pub fn from_toml_str(text: &str) -> Result<Self, ComposerError> {
        let mut table: toml::Table = text.parse().map_err(ConfigError::from)?;
        let grammar_source = match table.remove("grammar_source") {
            Some(toml::Value::String(source)) => Some(source),
            Some(_) => {
                return Err(ConfigError::InvalidValue {
                    field: "grammar_source".into(),
                    reason: "must be a string".into(),
                }
                .into())
            }
            None => None,
        };

        let mut config: EmbeddedLanguageConfig = toml::Value::Table(table)
            .try_into()
            .map_err(ConfigError::from)?;
        if let Some(source) = grammar_source {
            config.grammar = Some(Grammar::parse_source(&source)?);
        }
        Ok(config)
    }

    /// `<style>` elements and `style` attributes
    pub fn css() -> Self {
        Self::new(builtin::CSS, LanguageKind::Style)
            .with_trigger(ContextTrigger::element("style", builtin::CSS))
            .with_trigger(ContextTrigger::attribute("^style$", builtin::CSS))
    }

    /// `<script>` elements and `on*` event attributes
    pub fn javascript() -> Self {
        Self::new(builtin::JAVASCRIPT, LanguageKind::Script)
            .with_trigger(ContextTrigger::element("script", builtin::JAVASCRIPT))
            .with_trigger(ContextTrigger::element_end("script", builtin::JAVASCRIPT))
            .with_trigger(ContextTrigger::attribute("^on[a-z]+$", builtin::JAVASCRIPT))
    }
}
