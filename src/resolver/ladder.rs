//! The six-rung candidate-discovery ladder (spec §4.2, "Candidate discovery
//! — priority-ordered ladder").

use crate::config::SimilarityWeights;
use crate::error::Result;
use crate::resolver::features::ElementFeatures;
use crate::resolver::page::{AccessibleNode, ElementHandle, Page};
use crate::resolver::similarity::score_candidate;

/// A scored candidate produced by one ladder rung, carrying enough of its
/// source node for the resolver's disambiguation step to reason about
/// position and text without re-querying the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub handle: ElementHandle,
    pub confidence: f64,
    pub method: &'static str,
    pub node: AccessibleNode,
}

const ROLE_HINTS: &[&str] = &[
    "button", "link", "input", "checkbox", "textbox", "image", "heading", "select", "dropdown",
    "tab", "dialog", "table",
];

/// Strip leading articles and surrounding quotes, lowercase the remainder.
/// This is the "parsed salient text" spec §4.2 rung 1 refers to.
pub fn salient_text(description: &str) -> String {
    let trimmed = description.trim().trim_matches(|c| c == '\'' || c == '"');
    let lower = trimmed.to_lowercase();
    let without_article = lower
        .strip_prefix("the ")
        .or_else(|| lower.strip_prefix("a "))
        .or_else(|| lower.strip_prefix("an "))
        .unwrap_or(&lower);
    without_article.trim().to_string()
}

/// If the description names an element type ("the Login *button*"), return
/// the matching ARIA role hint (spec §4.2 rung 2).
pub fn role_hint(description: &str) -> Option<&'static str> {
    let lower = description.to_lowercase();
    ROLE_HINTS.iter().find(|role| lower.contains(*role)).copied()
}

fn node_text_candidates(node: &AccessibleNode) -> [&str; 2] {
    [node.accessible_name.as_str(), node.visible_text.as_str()]
}

/// Walk the six-rung ladder, stopping at the first rung whose best
/// candidate clears `threshold`. Returns an empty vector (with an empty
/// method name) if no rung produces a qualifying candidate.
pub async fn discover(
    page: &dyn Page,
    description: &str,
    weights: &SimilarityWeights,
    threshold: f64,
) -> Result<(Vec<Candidate>, &'static str)> {
    let nodes = page.query_accessible().await?;
    let salient = salient_text(description);
    let role = role_hint(description);

    // Rung 1: exact accessible-name match.
    let rung1: Vec<Candidate> = nodes
        .iter()
        .filter(|n| node_text_candidates(n).iter().any(|t| t.to_lowercase() == salient))
        .map(|n| Candidate { handle: n.handle.clone(), confidence: 1.0, method: "exact-name", node: (*n).clone() })
        .collect();
    if rung1.iter().any(|c| c.confidence >= threshold) {
        return Ok((rung1, "exact-name"));
    }

    // Rung 2: semantic role + text.
    if let Some(role) = role {
        let rung2: Vec<Candidate> = nodes
            .iter()
            .filter(|n| n.role.eq_ignore_ascii_case(role))
            .filter(|n| node_text_candidates(n).iter().any(|t| t.to_lowercase().contains(&salient) || salient.contains(&t.to_lowercase())))
            .map(|n| Candidate { handle: n.handle.clone(), confidence: 0.92, method: "role+text", node: (*n).clone() })
            .collect();
        if rung2.iter().any(|c| c.confidence >= threshold) {
            return Ok((rung2, "role+text"));
        }
    }

    // Rung 3: placeholder / label association.
    let rung3: Vec<Candidate> = nodes
        .iter()
        .filter(|n| {
            n.attributes
                .get("placeholder")
                .or_else(|| n.attributes.get("aria-labelledby"))
                .map(|v| v.to_lowercase().contains(&salient))
                .unwrap_or(false)
        })
        .map(|n| Candidate { handle: n.handle.clone(), confidence: 0.85, method: "label", node: (*n).clone() })
        .collect();
    if rung3.iter().any(|c| c.confidence >= threshold) {
        return Ok((rung3, "label"));
    }

    // Rung 4: text content contains (substring on visible inner text).
    let rung4: Vec<Candidate> = nodes
        .iter()
        .filter(|n| !salient.is_empty() && n.visible_text.to_lowercase().contains(&salient))
        .map(|n| Candidate { handle: n.handle.clone(), confidence: 0.80, method: "text-contains", node: (*n).clone() })
        .collect();
    if rung4.iter().any(|c| c.confidence >= threshold) {
        return Ok((rung4, "text-contains"));
    }

    // Rung 5: attribute match (data-testid, id, name, aria-label).
    let rung5: Vec<Candidate> = nodes
        .iter()
        .filter(|n| {
            ["data-testid", "id", "name", "aria-label"]
                .iter()
                .any(|attr| n.attributes.get(*attr).map(|v| v.to_lowercase() == salient).unwrap_or(false))
        })
        .map(|n| Candidate { handle: n.handle.clone(), confidence: 0.88, method: "attr", node: (*n).clone() })
        .collect();
    if rung5.iter().any(|c| c.confidence >= threshold) {
        return Ok((rung5, "attr"));
    }

    // Rung 6: feature-similarity search over all candidates.
    let target = ElementFeatures {
        text: crate::resolver::features::TextFeatures {
            visible_text: salient.clone(),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut rung6 = Vec::with_capacity(nodes.len());
    for node in &nodes {
        let features = page.features_of(&node.handle).await?;
        let score = score_candidate(&target, &features, weights);
        rung6.push(Candidate { handle: node.handle.clone(), confidence: score.total, method: "similarity", node: node.clone() });
    }
    Ok((rung6, "similarity"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salient_text_strips_articles_and_quotes() {
        assert_eq!(salient_text("the Login button"), "login button");
        assert_eq!(salient_text("'Submit'"), "submit");
    }

    #[test]
    fn role_hint_detects_button() {
        assert_eq!(role_hint("the Login button"), Some("button"));
        assert_eq!(role_hint("the Username field"), None);
    }
}
