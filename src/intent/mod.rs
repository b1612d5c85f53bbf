//! The grammar-based intent parser (spec §4.1): turns a raw instruction
//! string into a structured, typed [`Intent`], deterministically and
//! without any model or remote service involved.

pub mod builder;
pub mod catalog;
pub mod grammar;
pub mod synonyms;
pub mod types;
pub mod value;
pub mod wire;

pub use grammar::{GrammarRegistry, GrammarRule};
pub use types::{Intent, IntentFamily, IntentKind, IntentOptions, IntentOptionsExt, IntentValue};
pub use wire::{parse_step_text, WireStep};

use crate::context::{interpolate, InterpolationSources};
use crate::error::Result;

/// Outcome of parsing one Gherkin step's text through the full wire-format
/// + interpolation + grammar pipeline.
pub enum StepParse {
    /// The step's conditional clause's predicate did not hold; the step
    /// short-circuits and nothing is executed (spec §6, "conditional —
    /// short-circuits").
    Skipped,
    Intent(Intent),
}

/// Parse a Gherkin step's text (the `AI "..."` wire format of spec §6) into
/// an [`Intent`], applying interpolation before grammar matching (spec §3's
/// invariant) and merging in the wire format's trailing clauses.
///
/// Returns `Ok(None)` (via [`StepParse::Skipped`]) for steps that don't
/// carry the `AI "..."` marker at all — those are conventional step
/// definitions outside this core's concern.
pub fn parse_step(
    registry: &GrammarRegistry,
    step_text: &str,
    sources: &impl InterpolationSources,
) -> Result<Option<StepParse>> {
    let Some(wire) = parse_step_text(step_text) else {
        return Ok(None);
    };

    if let Some((var, expected)) = &wire.conditional {
        let actual = sources.scenario().get(var).map(|v| v.as_interpolated_text());
        if actual.as_deref() != Some(expected.as_str()) {
            return Ok(Some(StepParse::Skipped));
        }
    }

    let interpolated = interpolate(&wire.instruction, sources)?;
    let mut intent = registry.parse(&interpolated)?;

    if let Some(name) = wire.store_as {
        intent = intent.with_store_as(name);
    }
    if let Some(literal) = wire.value_override {
        let interpolated_value = interpolate(&literal, sources)?;
        intent = intent.with_value(IntentValue::Text(interpolated_value));
    }

    intent.validate_signature()?;
    Ok(Some(StepParse::Intent(intent)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FeatureContext, ScenarioContext};

    struct Fixture {
        scenario: ScenarioContext,
        feature: FeatureContext,
    }

    impl InterpolationSources for Fixture {
        fn scenario(&self) -> &ScenarioContext {
            &self.scenario
        }
        fn feature(&self) -> &FeatureContext {
            &self.feature
        }
        fn config_value(&self, _key: &str) -> Option<String> {
            None
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            scenario: ScenarioContext::new(),
            feature: FeatureContext::new(),
        }
    }

    #[test]
    fn interpolation_happens_before_grammar_matching() {
        let registry = catalog::default_registry().unwrap();
        let mut f = fixture();
        f.scenario.set("username", "alice");
        let step = r#"AI "Type '{scenario:username}' in the Username field""#;
        let result = parse_step(&registry, step, &f).unwrap().unwrap();
        match result {
            StepParse::Intent(intent) => {
                assert_eq!(intent.kind, IntentKind::Type);
                assert_eq!(intent.value, Some(IntentValue::Text("alice".to_string())));
            }
            StepParse::Skipped => panic!("expected an intent"),
        }
    }

    #[test]
    fn query_form_attaches_store_as() {
        let registry = catalog::default_registry().unwrap();
        let f = fixture();
        let step = r#"AI "Get the heading text" and store as "heading""#;
        let result = parse_step(&registry, step, &f).unwrap().unwrap();
        match result {
            StepParse::Intent(intent) => assert_eq!(intent.store_as.as_deref(), Some("heading")),
            StepParse::Skipped => panic!("expected an intent"),
        }
    }

    #[test]
    fn conditional_short_circuits_when_unmet() {
        let registry = catalog::default_registry().unwrap();
        let f = fixture();
        let step = r#"AI "Click the Continue button" if "env" is "staging""#;
        let result = parse_step(&registry, step, &f).unwrap().unwrap();
        assert!(matches!(result, StepParse::Skipped));
    }

    #[test]
    fn non_ai_step_is_none() {
        let registry = catalog::default_registry().unwrap();
        let f = fixture();
        assert!(parse_step(&registry, "Given the user is logged in", &f).unwrap().is_none());
    }
}
