//! Multi-dimensional weighted similarity scoring (spec §3 `SimilarityScore`,
//! §4.2 "Feature similarity"), grounded in the teacher's `ConfidenceScore`
//! weighted-sum-with-breakdown shape.

use serde::{Deserialize, Serialize};

use crate::config::SimilarityWeights;
use crate::resolver::features::ElementFeatures;

/// `{text, visual, structural, semantic, context, total}` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub text: f64,
    pub visual: f64,
    pub structural: f64,
    pub semantic: f64,
    pub context: f64,
    pub total: f64,
}

impl SimilarityScore {
    pub fn compute(
        text: f64,
        visual: f64,
        structural: f64,
        semantic: f64,
        context: f64,
        weights: &SimilarityWeights,
    ) -> Self {
        let total = (weights.text * text
            + weights.structural * structural
            + weights.visual * visual
            + weights.semantic * semantic
            + weights.context * context)
            .clamp(0.0, 1.0);
        Self { text, visual, structural, semantic, context, total }
    }
}

/// Normalised edit-distance similarity in `[0, 1]`: `1 - levenshtein/max_len`.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(&a, &b);
    1.0 - (distance as f64 / max_len as f64)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let cur = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j - 1])
            };
            prev = cur;
        }
    }
    row[b.len()]
}

/// Jaccard set overlap in `[0, 1]`; two empty sets are defined as fully
/// similar (nothing to disagree on).
pub fn set_overlap(a: &std::collections::HashSet<String>, b: &std::collections::HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Score one candidate's [`ElementFeatures`] against a target description's
/// derived feature vector, combining the five group similarities per the
/// configured weights.
pub fn score_candidate(
    target: &ElementFeatures,
    candidate: &ElementFeatures,
    weights: &SimilarityWeights,
) -> SimilarityScore {
    let text = [
        text_similarity(&target.text.visible_text, &candidate.text.visible_text),
        text_similarity(&target.text.aria_label, &candidate.text.aria_label),
        text_similarity(&target.text.placeholder, &candidate.text.placeholder),
    ]
    .into_iter()
    .fold(0.0_f64, f64::max);

    let structural = {
        let attrs = set_overlap(&target.structural.attributes, &candidate.structural.attributes);
        let classes = set_overlap(&target.structural.classes, &candidate.structural.classes);
        let tag_match = if target.structural.tag.is_empty() || target.structural.tag == candidate.structural.tag {
            1.0
        } else {
            0.0
        };
        (attrs + classes + tag_match) / 3.0
    };

    let visual = {
        let bbox = target.visual.bounding_box.iou(&candidate.visual.bounding_box);
        let colour = 1.0 - target.visual.colour.distance(&candidate.visual.colour);
        (bbox + colour) / 2.0
    };

    let semantic = set_overlap(&target.semantic.aria_attributes, &candidate.semantic.aria_attributes);

    let context = {
        let parent = match (&target.context.parent_role, &candidate.context.parent_role) {
            (Some(a), Some(b)) if a == b => 1.0,
            (None, None) => 1.0,
            _ => 0.0,
        };
        let siblings = set_overlap(&target.context.sibling_roles, &candidate.context.sibling_roles);
        (parent + siblings) / 2.0
    };

    SimilarityScore::compute(text, visual, structural, semantic, context, weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_scores_one() {
        assert_eq!(text_similarity("Login", "Login"), 1.0);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(text_similarity("LOGIN", "login"), 1.0);
    }

    #[test]
    fn completely_different_text_scores_low() {
        assert!(text_similarity("Login", "zzzzz") < 0.3);
    }

    #[test]
    fn weighted_sum_matches_default_weights() {
        let weights = SimilarityWeights::default();
        let score = SimilarityScore::compute(1.0, 1.0, 1.0, 1.0, 1.0, &weights);
        assert!((score.total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_sets_are_fully_similar() {
        let empty = std::collections::HashSet::new();
        assert_eq!(set_overlap(&empty, &empty), 1.0);
    }
}
