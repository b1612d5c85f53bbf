//! The grammar rule registry and two-pass matcher (spec §4.1).

use std::sync::Arc;

use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::error::{Error, ParseErrorKind, Result};
use crate::intent::synonyms;
use crate::intent::types::{Intent, IntentKind};

/// Turns a regex capture into a fully-formed [`Intent`]. Boxed behind `Arc`
/// so rules are cheaply cloneable and the registry can be shared across
/// scenario workers without recompiling patterns.
pub type Extractor = Arc<dyn Fn(&Captures) -> Result<Intent> + Send + Sync>;

/// One entry in the grammar registry (spec §3, "Grammar rule").
#[derive(Clone)]
pub struct GrammarRule {
    pub pattern: Regex,
    pub intent_kind: IntentKind,
    pub priority: i32,
    pub page_level: bool,
    pub extractor: Extractor,
}

impl std::fmt::Debug for GrammarRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarRule")
            .field("pattern", &self.pattern.as_str())
            .field("intent_kind", &self.intent_kind)
            .field("priority", &self.priority)
            .field("page_level", &self.page_level)
            .finish()
    }
}

/// Collapse runs of whitespace and trim the ends. Does not touch word
/// stems or synonyms (spec §4.1, Pass 1's normalisation is whitespace-only).
pub fn normalise_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The grammar rule registry. Matching is across the whole registry; family
/// partitioning is purely an authoring convenience (spec §3).
#[derive(Default)]
pub struct GrammarRegistry {
    rules: Vec<GrammarRule>,
}

impl GrammarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. Idempotent when an identical `(pattern, priority)`
    /// pair is already present. Rejects a conflicting pattern whose new
    /// priority is not strictly more specific (numerically lower) than the
    /// rule already registered for that pattern text.
    pub fn register_rule(&mut self, rule: GrammarRule) -> Result<()> {
        if let Some(existing_idx) = self
            .rules
            .iter()
            .position(|r| r.pattern.as_str() == rule.pattern.as_str())
        {
            let existing_priority = self.rules[existing_idx].priority;
            if existing_priority == rule.priority && self.rules[existing_idx].intent_kind == rule.intent_kind {
                return Ok(()); // idempotent re-registration
            }
            if rule.priority >= existing_priority {
                return Err(Error::Internal(format!(
                    "conflicting grammar rule for pattern {:?}: existing priority {} is already at or above {}",
                    rule.pattern.as_str(),
                    existing_priority,
                    rule.priority
                )));
            }
            self.rules[existing_idx] = rule;
        } else {
            self.rules.push(rule);
        }
        // Stable sort: equal-priority rules keep insertion order (spec §4.1,
        // "Priority semantics").
        self.rules.sort_by_key(|r| r.priority);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parse `raw` into an [`Intent`] via the two-pass algorithm (spec §4.1).
    pub fn parse(&self, raw: &str) -> Result<Intent> {
        let normalised = normalise_whitespace(raw);

        if let Some(intent) = self.try_match(&normalised)? {
            return Ok(intent);
        }

        debug!(instruction = %normalised, "pass 1 produced no match, attempting pass 2");
        let rewritten = synonyms::normalise(&normalised);
        if let Some(intent) = self.try_match(&rewritten)? {
            return Ok(intent);
        }

        Err(Error::Parse(ParseErrorKind::NoMatch(raw.to_string())))
    }

    /// Try every rule in ascending priority order; the first whole-string
    /// match wins. Signature validation (store-as presence, page-level
    /// target absence) happens one layer up, once the wire-format clauses
    /// have been merged in.
    fn try_match(&self, text: &str) -> Result<Option<Intent>> {
        for rule in &self.rules {
            trace!(pattern = %rule.pattern.as_str(), "evaluating rule");
            if let Some(caps) = rule.pattern.captures(text) {
                let whole = caps.get(0).expect("capture group 0 always present");
                if whole.start() == 0 && whole.end() == text.len() {
                    let intent = (rule.extractor)(&caps)?;
                    return Ok(Some(intent));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_rule(pattern: &str, priority: i32) -> GrammarRule {
        GrammarRule {
            pattern: Regex::new(pattern).unwrap(),
            intent_kind: IntentKind::Click,
            priority,
            page_level: false,
            extractor: Arc::new(|caps| {
                let target = caps.name("target").unwrap().as_str().to_string();
                Ok(Intent::new(IntentKind::Click).with_target(target))
            }),
        }
    }

    #[test]
    fn first_match_wins_by_priority() {
        let mut registry = GrammarRegistry::new();
        registry
            .register_rule(GrammarRule {
                pattern: Regex::new(r"^(?i)click (?P<target>.+)$").unwrap(),
                intent_kind: IntentKind::Click,
                priority: 50,
                page_level: false,
                extractor: Arc::new(|caps| {
                    Ok(Intent::new(IntentKind::Click)
                        .with_target(caps.name("target").unwrap().as_str()))
                }),
            })
            .unwrap();
        registry
            .register_rule(GrammarRule {
                pattern: Regex::new(r"^(?i)click the (?P<target>.+) button$").unwrap(),
                intent_kind: IntentKind::Click,
                priority: 10,
                page_level: false,
                extractor: Arc::new(|caps| {
                    Ok(Intent::new(IntentKind::Click)
                        .with_target(format!("the {} button", caps.name("target").unwrap().as_str())))
                }),
            })
            .unwrap();

        let intent = registry.parse("Click the Login button").unwrap();
        assert_eq!(intent.target_description.as_deref(), Some("the Login button"));
    }

    #[test]
    fn rejects_conflicting_same_priority_pattern() {
        let mut registry = GrammarRegistry::new();
        registry.register_rule(click_rule(r"^(?i)click (?P<target>.+)$", 10)).unwrap();
        let err = registry
            .register_rule(GrammarRule {
                pattern: Regex::new(r"^(?i)click (?P<target>.+)$").unwrap(),
                intent_kind: IntentKind::Hover,
                priority: 10,
                page_level: false,
                extractor: Arc::new(|_| Ok(Intent::new(IntentKind::Hover))),
            })
            .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn no_match_is_parse_error() {
        let registry = GrammarRegistry::new();
        let err = registry.parse("asdkjfh").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseErrorKind::NoMatch(_))));
    }

    #[test]
    fn synonym_pass_recovers_casual_phrasing() {
        let mut registry = GrammarRegistry::new();
        registry
            .register_rule(GrammarRule {
                pattern: Regex::new(r"^(?i)click the (?P<target>.+) button$").unwrap(),
                intent_kind: IntentKind::Click,
                priority: 10,
                page_level: false,
                extractor: Arc::new(|caps| {
                    Ok(Intent::new(IntentKind::Click)
                        .with_target(format!("the {} button", caps.name("target").unwrap().as_str())))
                }),
            })
            .unwrap();

        let intent = registry.parse("Tap the Submit button").unwrap();
        assert_eq!(intent.kind, IntentKind::Click);
        assert_eq!(intent.target_description.as_deref(), Some("the Submit button"));
    }
}
