//! [`FragilityScore`] (spec §3): a per-locator ordering signal, never a hard
//! gate, grounded in the teacher's `confidence_scorer.rs` factor-explained
//! scoring shape.

use serde::{Deserialize, Serialize};

/// Classification bands for a composite fragility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FragilityClass {
    Critical,
    High,
    Medium,
    Low,
}

impl FragilityClass {
    pub fn classify(composite: f64) -> Self {
        if composite > 0.8 {
            FragilityClass::Critical
        } else if composite > 0.6 {
            FragilityClass::High
        } else if composite > 0.4 {
            FragilityClass::Medium
        } else {
            FragilityClass::Low
        }
    }
}

/// `{healCount, failureRate, locatorInstability, recencyPenalty,
/// composite∈[0,1]}` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragilityScore {
    pub heal_count: u32,
    pub failure_rate: f64,
    pub locator_instability: f64,
    pub recency_penalty: f64,
    pub composite: f64,
}

impl FragilityScore {
    /// `composite = clip(0.4·f(healCount) + 0.3·failureRate + 0.2·instability
    /// + 0.3·recencyPenalty, 0, 1)`.
    ///
    /// `f(healCount)` saturates healing frequency into `[0,1]` via
    /// `healCount / (healCount + 5)`, so a handful of heals already move the
    /// needle but no amount of healing alone can blow past 1.0 unaided by
    /// the other factors.
    pub fn compute(heal_count: u32, failure_rate: f64, locator_instability: f64, recency_penalty: f64) -> Self {
        let heal_factor = heal_count as f64 / (heal_count as f64 + 5.0);
        let composite = (0.4 * heal_factor + 0.3 * failure_rate + 0.2 * locator_instability + 0.3 * recency_penalty)
            .clamp(0.0, 1.0);
        Self {
            heal_count,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            locator_instability: locator_instability.clamp(0.0, 1.0),
            recency_penalty: recency_penalty.clamp(0.0, 1.0),
            composite,
        }
    }

    pub fn classification(&self) -> FragilityClass {
        FragilityClass::classify(self.composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_factors_is_low() {
        let score = FragilityScore::compute(0, 0.0, 0.0, 0.0);
        assert_eq!(score.composite, 0.0);
        assert_eq!(score.classification(), FragilityClass::Low);
    }

    #[test]
    fn high_everything_is_critical() {
        let score = FragilityScore::compute(50, 1.0, 1.0, 1.0);
        assert!(score.composite > 0.8);
        assert_eq!(score.classification(), FragilityClass::Critical);
    }

    #[test]
    fn composite_never_exceeds_one() {
        let score = FragilityScore::compute(1_000_000, 1.0, 1.0, 1.0);
        assert!(score.composite <= 1.0);
    }
}
