//! The public resolver API (spec §4.2): `resolve(page, targetDescription,
//! hintContext?) → {handle, confidence, method}`, plus disambiguation and
//! per-scenario caching.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::error::{Error, ResolveErrorKind, Result};
use crate::resolver::ladder::{discover, Candidate};
use crate::resolver::page::{ElementHandle, Page};

/// The resolver's successful result (spec §4.2).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveResult {
    pub handle: ElementHandle,
    pub confidence: f64,
    pub method: &'static str,
}

/// Per-scenario `(pageFingerprint, targetDescription) → handle` cache (spec
/// §4.2 "Caching"). Invalidated wholesale on navigation, or for one entry on
/// an observed failure against it.
#[derive(Debug, Default)]
pub struct ResolverCache {
    entries: HashMap<(String, String), ElementHandle>,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &str, description: &str) -> Option<&ElementHandle> {
        self.entries.get(&(fingerprint.to_string(), description.to_string()))
    }

    pub fn put(&mut self, fingerprint: &str, description: &str, handle: ElementHandle) {
        self.entries.insert((fingerprint.to_string(), description.to_string()), handle);
    }

    pub fn invalidate(&mut self, fingerprint: &str, description: &str) {
        self.entries.remove(&(fingerprint.to_string(), description.to_string()));
    }

    /// Called on navigation (spec §4.2: "invalidated on navigation").
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }
}

fn strip_ordinal_and_cue(description: &str) -> String {
    let lower = description.to_lowercase();
    for prefix in ["the first ", "the second ", "the third ", "the last "] {
        if lower.starts_with(prefix) {
            return description[prefix.len()..].to_string();
        }
    }
    description.to_string()
}

enum Ordinal {
    First,
    Second,
    Third,
    Last,
}

fn parse_ordinal(description: &str) -> Option<Ordinal> {
    let lower = description.to_lowercase();
    if lower.contains("the first ") || lower.starts_with("first ") {
        Some(Ordinal::First)
    } else if lower.contains("the second ") || lower.starts_with("second ") {
        Some(Ordinal::Second)
    } else if lower.contains("the third ") || lower.starts_with("third ") {
        Some(Ordinal::Third)
    } else if lower.contains("last ") {
        Some(Ordinal::Last)
    } else {
        None
    }
}

fn apply_ordinal(tied: &[Candidate], ordinal: Ordinal) -> Option<Candidate> {
    match ordinal {
        Ordinal::First => tied.first().cloned(),
        Ordinal::Second => tied.get(1).cloned(),
        Ordinal::Third => tied.get(2).cloned(),
        Ordinal::Last => tied.last().cloned(),
    }
}

const POSITIONAL_MARKERS: &[&str] = &["near ", "above ", "inside the "];

fn parse_positional_anchor(description: &str) -> Option<String> {
    let lower = description.to_lowercase();
    for marker in POSITIONAL_MARKERS {
        if let Some(idx) = lower.find(marker) {
            let anchor = &description[idx + marker.len()..];
            let anchor = anchor.trim_end_matches("area").trim();
            if !anchor.is_empty() {
                return Some(anchor.to_string());
            }
        }
    }
    None
}

fn apply_positional(tied: &[Candidate], anchor: &str) -> Option<Candidate> {
    let anchor = anchor.to_lowercase();
    tied.iter()
        .find(|c| {
            c.node.visible_text.to_lowercase().contains(&anchor)
                || c.node.accessible_name.to_lowercase().contains(&anchor)
        })
        .cloned()
}

const VISUAL_ADJECTIVES: &[&str] = &["red", "blue", "green", "yellow", "black", "white", "orange", "purple", "large", "small"];

fn parse_visual_cue(description: &str) -> Option<&'static str> {
    let lower = description.to_lowercase();
    VISUAL_ADJECTIVES.iter().find(|adj| lower.contains(*adj)).copied()
}

fn apply_visual(tied: &[Candidate], cue: &str) -> Option<Candidate> {
    // Best-effort: a node whose attribute set names the colour/size
    // adjective directly (e.g. a `data-colour="red"` or class `btn-large`).
    tied.iter()
        .find(|c| c.node.attributes.values().any(|v| v.to_lowercase().contains(cue)))
        .cloned()
}

/// Disambiguate a set of tied top candidates (spec §4.2 "Disambiguation"):
/// ordinal, then positional cue, then visual cue; `None` if still tied.
fn disambiguate(description: &str, tied: &[Candidate]) -> Option<Candidate> {
    if let Some(ordinal) = parse_ordinal(description) {
        if let Some(picked) = apply_ordinal(tied, ordinal) {
            return Some(picked);
        }
    }
    if let Some(anchor) = parse_positional_anchor(description) {
        if let Some(picked) = apply_positional(tied, &anchor) {
            return Some(picked);
        }
    }
    if let Some(cue) = parse_visual_cue(description) {
        if let Some(picked) = apply_visual(tied, cue) {
            return Some(picked);
        }
    }
    None
}

/// Resolve a target description against a live page. `hint_context` is the
/// stripped description used for disambiguation parsing (ordinal/positional
/// cues are parsed straight out of `description` itself, per spec.md's
/// examples like `"the first ..."`).
pub async fn resolve(
    page: &dyn Page,
    description: &str,
    page_fingerprint: &str,
    cache: &mut ResolverCache,
    config: &RuntimeConfig,
) -> Result<ResolveResult> {
    if let Some(handle) = cache.get(page_fingerprint, description) {
        debug!(description, "resolver cache hit");
        return Ok(ResolveResult { handle: handle.clone(), confidence: 1.0, method: "cache" });
    }

    let clean_description = strip_ordinal_and_cue(description);
    let (candidates, _method) = discover(page, &clean_description, &config.similarity_weights, config.ai_confidence_threshold).await?;

    let qualifying: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.confidence >= config.ai_confidence_threshold)
        .collect();

    if qualifying.is_empty() {
        return Err(Error::Resolve(ResolveErrorKind::NotFound(description.to_string())));
    }

    let best_confidence = qualifying.iter().map(|c| c.confidence).fold(f64::MIN, f64::max);
    let tied: Vec<Candidate> = qualifying
        .into_iter()
        .filter(|c| (best_confidence - c.confidence).abs() <= config.ai_tie_tolerance)
        .collect();

    let winner = if tied.len() == 1 {
        tied.into_iter().next().unwrap()
    } else {
        disambiguate(description, &tied).ok_or_else(|| {
            Error::Resolve(ResolveErrorKind::Ambiguous {
                description: description.to_string(),
                candidate_count: tied.len(),
            })
        })?
    };

    info!(description, method = winner.method, confidence = winner.confidence, "resolved");
    cache.put(page_fingerprint, description, winner.handle.clone());

    Ok(ResolveResult { handle: winner.handle, confidence: winner.confidence, method: winner.method })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_parsing() {
        assert!(matches!(parse_ordinal("the first result"), Some(Ordinal::First)));
        assert!(matches!(parse_ordinal("the last item"), Some(Ordinal::Last)));
        assert!(parse_ordinal("the button").is_none());
    }

    #[test]
    fn positional_anchor_parsing() {
        assert_eq!(parse_positional_anchor("the icon near the search box"), Some("the search box".to_string()));
        assert_eq!(
            parse_positional_anchor("the button inside the checkout area"),
            Some("the checkout".to_string())
        );
    }

    #[test]
    fn visual_cue_parsing() {
        assert_eq!(parse_visual_cue("the red button"), Some("red"));
        assert_eq!(parse_visual_cue("the Submit button"), None);
    }
}
