//! Parsing of the CLI surface's step-text wire format (spec §6):
//!
//! ```text
//! AI "<instruction>"                                [general action/assertion]
//! AI "<instruction>" and store as "<name>"          [query form]
//! AI "<instruction>" with value "<literal>"         [explicit value injection]
//! AI "<instruction>" if "<var>" is "<value>"        [conditional — short-circuits]
//! ```
//!
//! The Gherkin step text itself (keyword, table, doc-string) is parsed by an
//! external collaborator; this module only unwraps the `AI "..."` clause
//! structure once that collaborator has handed this core the step's text.

use std::sync::OnceLock;

use regex::Regex;

struct WirePatterns {
    ai_prefix: Regex,
    store_as: Regex,
    with_value: Regex,
    conditional: Regex,
}

fn patterns() -> &'static WirePatterns {
    static PATTERNS: OnceLock<WirePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| WirePatterns {
        ai_prefix: Regex::new(r#"^AI\s+"(?P<instruction>.*?)"\s*(?P<rest>.*)$"#).unwrap(),
        store_as: Regex::new(r#"^and store as\s+"(?P<name>[^"]+)"\s*$"#).unwrap(),
        with_value: Regex::new(r#"^with value\s+"(?P<value>[^"]*)"\s*$"#).unwrap(),
        conditional: Regex::new(r#"^if\s+"(?P<var>[^"]+)"\s+is\s+"(?P<value>[^"]*)"\s*$"#).unwrap(),
    })
}

/// The decomposed form of one `AI "..."` step-text clause.
#[derive(Debug, Clone, PartialEq)]
pub struct WireStep {
    /// The raw instruction text (still containing unresolved interpolation
    /// references; not yet grammar-matched).
    pub instruction: String,
    pub store_as: Option<String>,
    pub value_override: Option<String>,
    /// `(scenario variable name, expected value)` for the conditional form.
    pub conditional: Option<(String, String)>,
}

/// Split a step's text into its instruction and optional trailing clauses.
/// Returns `None` if the text does not carry the `AI "..."` marker at all —
/// such steps are routed to conventional step-definition dispatch outside
/// this core (spec §6).
pub fn parse_step_text(step_text: &str) -> Option<WireStep> {
    let p = patterns();
    let caps = p.ai_prefix.captures(step_text.trim())?;
    let instruction = caps.name("instruction")?.as_str().to_string();
    let rest = caps.name("rest").map(|m| m.as_str().trim()).unwrap_or("");

    let mut step = WireStep {
        instruction,
        store_as: None,
        value_override: None,
        conditional: None,
    };

    if rest.is_empty() {
        return Some(step);
    }

    if let Some(c) = p.store_as.captures(rest) {
        step.store_as = Some(c.name("name").unwrap().as_str().to_string());
    } else if let Some(c) = p.with_value.captures(rest) {
        step.value_override = Some(c.name("value").unwrap().as_str().to_string());
    } else if let Some(c) = p.conditional.captures(rest) {
        step.conditional = Some((
            c.name("var").unwrap().as_str().to_string(),
            c.name("value").unwrap().as_str().to_string(),
        ));
    }

    Some(step)
}
