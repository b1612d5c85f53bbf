//! [`LearningStore`] (spec §3): the append-only outcome log and its derived
//! aggregates. Persistence is an external concern; this crate only keeps the
//! in-process log for the lifetime of the worker.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::learning::fragility::FragilityScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ok,
    Err,
}

/// One append-only log entry (spec §3 `LearningStore`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub timestamp_utc: DateTime<Utc>,
    pub instruction_text: String,
    pub intent_kind: String,
    pub element_description: Option<String>,
    pub strategy_used: Option<String>,
    pub outcome: Outcome,
    pub confidence: f64,
    pub duration_ms: u64,
}

/// Per-strategy aggregate (spec §3: `{attempts, successes, avgConfidence}`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategyEffectiveness {
    pub attempts: u32,
    pub successes: u32,
    pub avg_confidence: f64,
}

impl StrategyEffectiveness {
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }
}

/// The append-only outcome log plus on-read aggregation (spec §5:
/// "Aggregates ... recomputed on read; never locked").
#[derive(Debug, Default)]
pub struct LearningStore {
    records: Vec<OutcomeRecord>,
}

impl LearningStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: OutcomeRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    /// Fragility for one locator description, derived from the records that
    /// name it (spec §3 `FragilityScore`).
    pub fn fragility_for(&self, element_description: &str) -> FragilityScore {
        let relevant: Vec<&OutcomeRecord> = self
            .records
            .iter()
            .filter(|r| r.element_description.as_deref() == Some(element_description))
            .collect();

        if relevant.is_empty() {
            return FragilityScore::compute(0, 0.0, 0.0, 0.0);
        }

        let heal_count = relevant.iter().filter(|r| r.strategy_used.is_some()).count() as u32;
        let failures = relevant.iter().filter(|r| r.outcome == Outcome::Err).count();
        let failure_rate = failures as f64 / relevant.len() as f64;

        // Instability: spread of confidence scores across attempts — a
        // locator whose resolution confidence swings wildly is less stable
        // than one that resolves consistently, even if always above threshold.
        let mean_confidence = relevant.iter().map(|r| r.confidence).sum::<f64>() / relevant.len() as f64;
        let variance = relevant
            .iter()
            .map(|r| (r.confidence - mean_confidence).powi(2))
            .sum::<f64>()
            / relevant.len() as f64;
        let locator_instability = variance.sqrt().min(1.0);

        // Recency penalty: weight failures in the most recent half of the
        // observed window more heavily than older ones.
        let half = relevant.len() / 2;
        let recent = &relevant[half.min(relevant.len().saturating_sub(1))..];
        let recent_failures = recent.iter().filter(|r| r.outcome == Outcome::Err).count();
        let recency_penalty = if recent.is_empty() {
            0.0
        } else {
            recent_failures as f64 / recent.len() as f64
        };

        FragilityScore::compute(heal_count, failure_rate, locator_instability, recency_penalty)
    }

    /// Per-strategy effectiveness (spec §4.3 "Learning feedback").
    pub fn effectiveness_for(&self, strategy: &str) -> StrategyEffectiveness {
        let relevant: Vec<&OutcomeRecord> = self
            .records
            .iter()
            .filter(|r| r.strategy_used.as_deref() == Some(strategy))
            .collect();

        if relevant.is_empty() {
            return StrategyEffectiveness::default();
        }

        let attempts = relevant.len() as u32;
        let successes = relevant.iter().filter(|r| r.outcome == Outcome::Ok).count() as u32;
        let avg_confidence = relevant.iter().map(|r| r.confidence).sum::<f64>() / relevant.len() as f64;

        StrategyEffectiveness { attempts, successes, avg_confidence }
    }

    /// Frequency of each intent kind observed, for pattern learning (spec
    /// §3: "per-pattern frequency for pattern learning").
    pub fn pattern_frequency(&self) -> HashMap<String, u32> {
        let mut freq = HashMap::new();
        for record in &self.records {
            *freq.entry(record.intent_kind.clone()).or_insert(0) += 1;
        }
        freq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(desc: &str, strategy: Option<&str>, outcome: Outcome, confidence: f64) -> OutcomeRecord {
        OutcomeRecord {
            timestamp_utc: Utc::now(),
            instruction_text: "Click the Submit button".to_string(),
            intent_kind: "click".to_string(),
            element_description: Some(desc.to_string()),
            strategy_used: strategy.map(str::to_string),
            outcome,
            confidence,
            duration_ms: 10,
        }
    }

    #[test]
    fn unobserved_locator_has_zero_fragility() {
        let store = LearningStore::new();
        let score = store.fragility_for("the Submit button");
        assert_eq!(score.composite, 0.0);
    }

    #[test]
    fn repeated_healing_raises_fragility() {
        let mut store = LearningStore::new();
        for _ in 0..10 {
            store.record(record("the Submit button", Some("alternative-locators"), Outcome::Ok, 0.9));
        }
        let score = store.fragility_for("the Submit button");
        assert!(score.composite > 0.0);
    }

    #[test]
    fn effectiveness_tracks_attempts_and_successes() {
        let mut store = LearningStore::new();
        store.record(record("x", Some("force-click"), Outcome::Ok, 0.5));
        store.record(record("x", Some("force-click"), Outcome::Err, 0.4));
        let eff = store.effectiveness_for("force-click");
        assert_eq!(eff.attempts, 2);
        assert_eq!(eff.successes, 1);
        assert_eq!(eff.success_rate(), 0.5);
    }

    #[test]
    fn pattern_frequency_counts_intent_kinds() {
        let mut store = LearningStore::new();
        store.record(record("a", None, Outcome::Ok, 1.0));
        store.record(record("b", None, Outcome::Ok, 1.0));
        let freq = store.pattern_frequency();
        assert_eq!(freq.get("click"), Some(&2));
    }
}
