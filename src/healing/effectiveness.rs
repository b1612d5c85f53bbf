//! Per-strategy effectiveness tracking and sliding-window reordering
//! (SPEC_FULL.md §3 "Strategy effectiveness reordering"), grounded on the
//! teacher's `FunctionRegistry::usage_stats` ring-buffer-backed counters.

use std::collections::{HashMap, VecDeque};

/// Key: `(element kind, failure kind)`, e.g. `("button", "not-found")`.
type Key = (String, String);

/// One strategy's outcome within a sliding window.
#[derive(Debug, Clone)]
struct Attempt {
    strategy: String,
    succeeded: bool,
}

/// Tracks the last `window` heal attempts per `(element kind, failure kind)`
/// pair and promotes a strategy ahead of the static ladder order once its
/// empirical success rate beats the current leader by more than `margin`.
#[derive(Debug)]
pub struct EffectivenessTracker {
    window: usize,
    margin: f64,
    history: HashMap<Key, VecDeque<Attempt>>,
}

impl EffectivenessTracker {
    pub fn new(window: usize, margin: f64) -> Self {
        Self { window: window.max(1), margin, history: HashMap::new() }
    }

    pub fn record(&mut self, element_kind: &str, failure_kind: &str, strategy: &str, succeeded: bool) {
        let key = (element_kind.to_string(), failure_kind.to_string());
        let entry = self.history.entry(key).or_default();
        entry.push_back(Attempt { strategy: strategy.to_string(), succeeded });
        while entry.len() > self.window {
            entry.pop_front();
        }
    }

    fn success_rate(&self, element_kind: &str, failure_kind: &str, strategy: &str) -> Option<f64> {
        let key = (element_kind.to_string(), failure_kind.to_string());
        let entry = self.history.get(&key)?;
        let relevant: Vec<&Attempt> = entry.iter().filter(|a| a.strategy == strategy).collect();
        if relevant.is_empty() {
            return None;
        }
        let successes = relevant.iter().filter(|a| a.succeeded).count();
        Some(successes as f64 / relevant.len() as f64)
    }

    /// Reorder `static_order` (names, highest static priority first) by
    /// promoting whichever strategy has the best observed success rate for
    /// this `(element kind, failure kind)` pair, if it beats the current
    /// leader's rate by more than `margin`. Falls back to `static_order`
    /// unchanged when there isn't enough history to justify a promotion.
    pub fn effective_order(&self, element_kind: &str, failure_kind: &str, static_order: &[&'static str]) -> Vec<&'static str> {
        if static_order.is_empty() {
            return Vec::new();
        }
        let leader = static_order[0];
        let leader_rate = self.success_rate(element_kind, failure_kind, leader).unwrap_or(0.0);

        let mut best = leader;
        let mut best_rate = leader_rate;
        for &name in &static_order[1..] {
            if let Some(rate) = self.success_rate(element_kind, failure_kind, name) {
                if rate > best_rate + self.margin {
                    best = name;
                    best_rate = rate;
                }
            }
        }

        if best == leader {
            return static_order.to_vec();
        }
        let mut reordered = vec![best];
        reordered.extend(static_order.iter().filter(|&&n| n != best));
        reordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_history_keeps_static_order() {
        let tracker = EffectivenessTracker::new(50, 0.1);
        let order = tracker.effective_order("button", "not-found", &["alternative-locators", "visual-similarity"]);
        assert_eq!(order, vec!["alternative-locators", "visual-similarity"]);
    }

    #[test]
    fn strong_challenger_is_promoted() {
        let mut tracker = EffectivenessTracker::new(50, 0.1);
        for _ in 0..10 {
            tracker.record("button", "not-found", "alternative-locators", false);
        }
        for _ in 0..10 {
            tracker.record("button", "not-found", "visual-similarity", true);
        }
        let order = tracker.effective_order("button", "not-found", &["alternative-locators", "visual-similarity"]);
        assert_eq!(order[0], "visual-similarity");
    }

    #[test]
    fn window_discards_old_attempts() {
        let mut tracker = EffectivenessTracker::new(3, 0.1);
        tracker.record("button", "not-found", "alternative-locators", true);
        tracker.record("button", "not-found", "alternative-locators", true);
        tracker.record("button", "not-found", "alternative-locators", true);
        tracker.record("button", "not-found", "alternative-locators", false);
        tracker.record("button", "not-found", "alternative-locators", false);
        tracker.record("button", "not-found", "alternative-locators", false);
        assert_eq!(tracker.success_rate("button", "not-found", "alternative-locators"), Some(0.0));
    }
}
