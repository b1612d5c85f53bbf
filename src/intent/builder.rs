//! Ergonomic construction of [`GrammarRule`]s (spec §9 leaves the catalogue
//! as implementer-populated data; this builder is the constructor that
//! populates it without repeating struct literals for every rule).

use std::sync::Arc;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::intent::grammar::{Extractor, GrammarRule};
use crate::intent::types::IntentKind;

pub struct GrammarRuleBuilder {
    pattern: Option<String>,
    intent_kind: Option<IntentKind>,
    priority: Option<i32>,
    page_level: bool,
    extractor: Option<Extractor>,
}

impl GrammarRuleBuilder {
    pub fn new() -> Self {
        Self {
            pattern: None,
            intent_kind: None,
            priority: None,
            page_level: false,
            extractor: None,
        }
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn intent_kind(mut self, kind: IntentKind) -> Self {
        self.intent_kind = Some(kind);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn page_level(mut self, page_level: bool) -> Self {
        self.page_level = page_level;
        self
    }

    pub fn extractor(
        mut self,
        f: impl Fn(&Captures) -> Result<crate::intent::types::Intent> + Send + Sync + 'static,
    ) -> Self {
        self.extractor = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Result<GrammarRule> {
        let pattern_text = self
            .pattern
            .ok_or_else(|| Error::Internal("grammar rule missing pattern".to_string()))?;
        let pattern = Regex::new(&pattern_text)?;
        let intent_kind = self
            .intent_kind
            .ok_or_else(|| Error::Internal("grammar rule missing intent kind".to_string()))?;
        let priority = self
            .priority
            .ok_or_else(|| Error::Internal("grammar rule missing priority".to_string()))?;
        let extractor = self
            .extractor
            .ok_or_else(|| Error::Internal("grammar rule missing extractor".to_string()))?;

        Ok(GrammarRule {
            pattern,
            intent_kind,
            priority,
            page_level: self.page_level,
            extractor,
        })
    }
}

impl Default for GrammarRuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
