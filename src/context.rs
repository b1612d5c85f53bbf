//! Scenario- and feature-scoped variable stores, plus literal interpolation.
//!
//! [`ScenarioContext`] lives for exactly one scenario; [`FeatureContext`] for
//! one feature (spec §3, "Lifecycles"). Both are plain string-keyed maps —
//! the interesting behaviour is [`interpolate`], which resolves the five
//! literal-reference forms recognised in raw instruction text *before* the
//! grammar matcher ever sees it (spec §3, "Invariant: interpolation happens
//! before grammar matching").

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A scenario/feature variable value. Closed over the four JSON-ish shapes
/// spec.md names explicitly; arbitrary JSON fragments fall into `Json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    Json(serde_json::Value),
}

impl Value {
    /// Render as the text that should be substituted into an instruction.
    pub fn as_interpolated_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
            Value::Json(v) => v.to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// A string-keyed variable store scoped to one lifetime (scenario or feature).
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    values: HashMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Wipe all values. Called by the scenario/feature runner at scope end
    /// (spec §5, "ScenarioContext is reset per scenario").
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Variables scoped to exactly one scenario.
pub type ScenarioContext = VariableStore;

/// Variables scoped to one feature (shared by all of that feature's scenarios).
pub type FeatureContext = VariableStore;

/// Everything [`interpolate`] needs to resolve a literal reference.
pub trait InterpolationSources {
    fn scenario(&self) -> &ScenarioContext;
    fn feature(&self) -> &FeatureContext;
    /// External configuration lookup (`{config:KEY}`); the config layer
    /// itself is an external collaborator (spec §6), so this is just a
    /// key/value probe into whatever the host supplies.
    fn config_value(&self, key: &str) -> Option<String>;
}

struct Patterns {
    scenario: Regex,
    feature: Regex,
    config: Regex,
    env: Regex,
    mustache: Regex,
    dollar: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        scenario: Regex::new(r"\{scenario:([A-Za-z0-9_.\-]+)\}").unwrap(),
        feature: Regex::new(r"\{feature:([A-Za-z0-9_.\-]+)\}").unwrap(),
        config: Regex::new(r"\{config:([A-Za-z0-9_.\-]+)\}").unwrap(),
        env: Regex::new(r"\{env:([A-Za-z0-9_.\-]+)\}").unwrap(),
        mustache: Regex::new(r"\{\{([A-Za-z0-9_.\-]+)\}\}").unwrap(),
        dollar: Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").unwrap(),
    })
}

/// Resolve every recognised interpolation reference in `raw`, returning the
/// fully-substituted text the grammar matcher will see.
///
/// Fails with [`Error::VariableUnresolved`] on the first reference that
/// cannot be satisfied — a partially-interpolated instruction is never
/// handed to the parser.
pub fn interpolate(raw: &str, sources: &impl InterpolationSources) -> Result<String> {
    let p = patterns();
    let mut text = raw.to_string();

    text = replace_all(&p.scenario, &text, |key| {
        sources
            .scenario()
            .get(key)
            .map(Value::as_interpolated_text)
            .ok_or_else(|| Error::VariableUnresolved(format!("scenario:{key}")))
    })?;

    text = replace_all(&p.feature, &text, |key| {
        sources
            .feature()
            .get(key)
            .map(Value::as_interpolated_text)
            .ok_or_else(|| Error::VariableUnresolved(format!("feature:{key}")))
    })?;

    text = replace_all(&p.config, &text, |key| {
        sources
            .config_value(key)
            .ok_or_else(|| Error::VariableUnresolved(format!("config:{key}")))
    })?;

    text = replace_all(&p.env, &text, |key| {
        std::env::var(key).map_err(|_| Error::VariableUnresolved(format!("env:{key}")))
    })?;

    // Compatibility aliases: {{var}} and $var both resolve from scenario scope.
    text = replace_all(&p.mustache, &text, |key| {
        sources
            .scenario()
            .get(key)
            .map(Value::as_interpolated_text)
            .ok_or_else(|| Error::VariableUnresolved(format!("{{{{{key}}}}}")))
    })?;

    text = replace_all(&p.dollar, &text, |key| {
        sources
            .scenario()
            .get(key)
            .map(Value::as_interpolated_text)
            .ok_or_else(|| Error::VariableUnresolved(format!("${key}")))
    })?;

    Ok(text)
}

/// Apply `resolve` to every capture of `re` in `text`, short-circuiting on
/// the first error. Regex has no fallible `replace_all`, so this walks
/// matches manually and rebuilds the string.
fn replace_all(
    re: &Regex,
    text: &str,
    mut resolve: impl FnMut(&str) -> Result<String>,
) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;
    for caps in re.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let key = caps.get(1).unwrap().as_str();
        out.push_str(&text[last_end..whole.start()]);
        out.push_str(&resolve(key)?);
        last_end = whole.end();
    }
    out.push_str(&text[last_end..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

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
        fn config_value(&self, key: &str) -> Option<String> {
            if key == "BASE_URL" {
                Some("https://example.test".to_string())
            } else {
                None
            }
        }
    }

    fn fixture() -> Fixture {
        let mut scenario = ScenarioContext::new();
        scenario.set("username", "alice");
        let mut feature = FeatureContext::new();
        feature.set("env_name", "staging");
        Fixture { scenario, feature }
    }

    #[test]
    fn resolves_scenario_and_feature_refs() {
        let f = fixture();
        let out = interpolate("Type '{scenario:username}' into {feature:env_name}", &f).unwrap();
        assert_eq!(out, "Type 'alice' into staging");
    }

    #[test]
    fn resolves_compatibility_aliases() {
        let f = fixture();
        assert_eq!(interpolate("hi {{username}}", &f).unwrap(), "hi alice");
        assert_eq!(interpolate("hi $username", &f).unwrap(), "hi alice");
    }

    #[test]
    fn resolves_config_and_env() {
        std::env::set_var("AI_STEP_ENGINE_TEST_VAR", "42");
        let f = fixture();
        let out = interpolate("{config:BASE_URL}/{env:AI_STEP_ENGINE_TEST_VAR}", &f).unwrap();
        assert_eq!(out, "https://example.test/42");
    }

    #[test]
    fn unresolved_reference_is_an_error() {
        let f = fixture();
        let err = interpolate("{scenario:missing}", &f).unwrap_err();
        assert!(matches!(err, Error::VariableUnresolved(_)));
    }

    #[test]
    fn scenario_scope_is_independent_across_instances() {
        let mut a = ScenarioContext::new();
        a.set("x", "1");
        let b = ScenarioContext::new();
        assert!(a.contains("x"));
        assert!(!b.contains("x"));
    }
}
