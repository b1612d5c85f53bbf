//! The closed synonym table used in Pass 2 of the grammar matcher (spec
//! §4.1, "Pass 2 — synonym normalisation").

/// One synonym substitution. `guard` lets a rule depend on the token that
/// follows the match (e.g. `select` only normalises to `click` when it is
/// not immediately followed by `from`, so `"Select X from Y"` keeps its own
/// `select` rule intact).
struct SynonymRule {
    from: &'static str,
    to: &'static str,
    guard: Option<fn(next: Option<&str>) -> bool>,
}

const RULES: &[SynonymRule] = &[
    SynonymRule {
        from: "tap",
        to: "click",
        guard: None,
    },
    SynonymRule {
        from: "enter",
        to: "type",
        guard: None,
    },
    SynonymRule {
        from: "select",
        to: "click",
        guard: Some(|next| !matches!(next, Some(w) if w.eq_ignore_ascii_case("from"))),
    },
    SynonymRule {
        from: "hit",
        to: "press",
        guard: None,
    },
    SynonymRule {
        from: "goto",
        to: "navigate",
        guard: None,
    },
    SynonymRule {
        from: "check",
        to: "verify",
        guard: None,
    },
    SynonymRule {
        from: "fetch",
        to: "get",
        guard: None,
    },
];

/// Apply the synonym table to `text`, token by token. Only the matched
/// token is rewritten; surrounding text and whitespace are preserved
/// verbatim so capture groups elsewhere in the instruction are unaffected.
pub fn normalise(text: &str) -> String {
    let tokens: Vec<&str> = text.split(' ').collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());

    for (i, token) in tokens.iter().enumerate() {
        let next = tokens.get(i + 1).copied();
        let rewritten = RULES.iter().find_map(|rule| {
            if token.eq_ignore_ascii_case(rule.from) {
                let allowed = rule.guard.map(|g| g(next)).unwrap_or(true);
                if allowed {
                    return Some(rule.to.to_string());
                }
            }
            None
        });
        out.push(rewritten.unwrap_or_else(|| token.to_string()));
    }

    out.join(" ")
}
