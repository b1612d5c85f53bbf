//! Key-combo parsing and canonicalisation (spec §4.1, "Modifier
//! canonicalisation table").

/// Named, non-modifier keys recognised by the engine. Anything outside this
/// list falls back as a single-character literal (spec §4.1).
const NAMED_KEYS: &[&str] = &[
    "Enter", "Tab", "Escape", "Backspace", "Delete", "Space", "Home", "End", "PageUp", "PageDown",
    "ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown", "F1", "F2", "F3", "F4", "F5", "F6", "F7",
    "F8", "F9", "F10", "F11", "F12",
];

/// Canonicalise one modifier token per the table:
///
/// | Input | Canonical |
/// |---|---|
/// | `ctrl`, `control` | `Control` |
/// | `alt`, `option` | `Alt` |
/// | `shift` | `Shift` |
/// | `cmd`, `command`, `meta`, `win`, `windows` | `Meta` |
fn canonicalise_modifier(token: &str) -> Option<&'static str> {
    match token.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Some("Control"),
        "alt" | "option" => Some("Alt"),
        "shift" => Some("Shift"),
        "cmd" | "command" | "meta" | "win" | "windows" => Some("Meta"),
        _ => None,
    }
}

fn canonicalise_named_key(token: &str) -> Option<&'static str> {
    NAMED_KEYS
        .iter()
        .find(|k| k.eq_ignore_ascii_case(token))
        .copied()
}

/// Parse a `+`-joined key combo (e.g. `"Ctrl+Shift+Delete"`) into an ordered
/// list of canonical tokens: zero or more modifiers followed by exactly one
/// non-modifier key. Unknown non-modifier tokens fall back as literal
/// single-character strings, per spec.md's "unknown names fall back as
/// single-character literals".
pub fn parse_key_combo(raw: &str) -> Vec<String> {
    raw.split('+')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            if let Some(modifier) = canonicalise_modifier(part) {
                modifier.to_string()
            } else if let Some(named) = canonicalise_named_key(part) {
                named.to_string()
            } else {
                part.chars().next().map(|c| c.to_string()).unwrap_or_default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalises_modifiers_and_named_key() {
        assert_eq!(
            parse_key_combo("Ctrl+Shift+Delete"),
            vec!["Control", "Shift", "Delete"]
        );
    }

    #[test]
    fn canonicalises_case_insensitively() {
        assert_eq!(parse_key_combo("control+ALT+tab"), vec!["Control", "Alt", "Tab"]);
    }

    #[test]
    fn unknown_single_key_falls_back_as_literal() {
        assert_eq!(parse_key_combo("q"), vec!["q"]);
    }

    #[test]
    fn cmd_variants_map_to_meta() {
        for variant in ["cmd", "command", "meta", "win", "windows"] {
            assert_eq!(parse_key_combo(variant), vec!["Meta"]);
        }
    }
}
