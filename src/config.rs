//! Runtime tuning knobs for the AI step engine.
//!
//! The full configuration layer (sync, policy, per-project/team/user
//! hierarchy) is an external collaborator (spec §6); this module owns only
//! the handful of thresholds spec.md names explicitly (`AI_CONFIDENCE_THRESHOLD`
//! and friends). Loaded from an optional TOML file, then overridden by
//! `AI_*` environment variables — the same load-then-override shape the
//! teacher's config loader uses, collapsed to one layer.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Screenshot capture policy (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotPolicy {
    Off,
    OnFailure,
    Always,
}

/// Selective-loader matching mode (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderMode {
    Explicit,
    Auto,
    Hybrid,
}

/// The five similarity weights of [`crate::resolver::SimilarityScore`].
/// Must sum to 1.0; [`SimilarityWeights::normalised`] renormalises an
/// arbitrary user-supplied set (spec §3: "when user-set, must renormalise
/// to 1.0").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    pub text: f64,
    pub structural: f64,
    pub visual: f64,
    pub semantic: f64,
    pub context: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            text: 0.30,
            structural: 0.25,
            visual: 0.20,
            semantic: 0.15,
            context: 0.10,
        }
    }
}

impl SimilarityWeights {
    pub fn sum(&self) -> f64 {
        self.text + self.structural + self.visual + self.semantic + self.context
    }

    /// Scale all five weights so they sum to exactly 1.0.
    ///
    /// Returns [`Error::Internal`] if every weight is zero (nothing to scale).
    pub fn normalised(&self) -> Result<Self> {
        let sum = self.sum();
        if sum <= 0.0 {
            return Err(Error::Internal(
                "similarity weights must not all be zero".to_string(),
            ));
        }
        Ok(Self {
            text: self.text / sum,
            structural: self.structural / sum,
            visual: self.visual / sum,
            semantic: self.semantic / sum,
            context: self.context / sum,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Minimum similarity score a resolver candidate must clear (spec §4.2).
    pub ai_confidence_threshold: f64,
    /// Tolerance within which two top candidates are considered tied.
    pub ai_tie_tolerance: f64,
    /// Per-strategy timeout budget for the healing engine (spec §4.3).
    pub ai_healing_timeout_ms: u64,
    /// Total number of strategies the healing engine will try per heal call.
    pub ai_max_healing_attempts: usize,
    /// Force the browser subsystem regardless of tag/pattern detection (spec §4.5).
    pub browser_always_launch: bool,
    /// Selective loader matching mode.
    pub loader_mode: LoaderMode,
    /// Assertion retry budget (spec §4.4).
    pub assertion_retry_budget_ms: u64,
    /// Overall per-step timeout (spec §5).
    pub step_timeout_ms: u64,
    /// Upper bound for `wait-seconds` (spec §4.4).
    pub wait_seconds_max_ms: u64,
    /// Screenshot capture policy.
    pub screenshot_policy: ScreenshotPolicy,
    /// Whether the browser context is reused across scenarios (spec §5).
    pub browser_reuse: bool,
    /// Sliding window size for strategy-effectiveness reordering (spec §4.3).
    pub effectiveness_reorder_window: usize,
    /// Margin by which an empirical ordering must beat the static one to take over.
    pub effectiveness_reorder_margin: f64,
    /// Weights for the resolver's [`crate::resolver::SimilarityScore`].
    pub similarity_weights: SimilarityWeights,
    /// Number of recent network/console entries attached to failure diagnostics.
    pub diagnostic_log_tail: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ai_confidence_threshold: 0.70,
            ai_tie_tolerance: 0.05,
            ai_healing_timeout_ms: 5_000,
            ai_max_healing_attempts: 3,
            browser_always_launch: false,
            loader_mode: LoaderMode::Hybrid,
            assertion_retry_budget_ms: 5_000,
            step_timeout_ms: 60_000,
            wait_seconds_max_ms: 600_000,
            screenshot_policy: ScreenshotPolicy::OnFailure,
            browser_reuse: true,
            effectiveness_reorder_window: 50,
            effectiveness_reorder_margin: 0.1,
            similarity_weights: SimilarityWeights::default(),
            diagnostic_log_tail: 20,
        }
    }
}

impl RuntimeConfig {
    /// Parse a TOML document, falling back to defaults for any absent field.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Internal(format!("invalid config toml: {e}")))
    }

    /// Apply `AI_*`-prefixed environment variable overrides on top of `self`.
    ///
    /// Recognises `AI_CONFIDENCE_THRESHOLD`, `AI_TIE_TOLERANCE`,
    /// `AI_HEALING_TIMEOUT_MS`, `AI_MAX_HEALING_ATTEMPTS`, and
    /// `BROWSER_ALWAYS_LAUNCH`; unrecognised or malformed variables are
    /// ignored rather than rejected, since the process environment is not
    /// under this crate's control.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("AI_CONFIDENCE_THRESHOLD") {
            if let Ok(parsed) = v.parse() {
                self.ai_confidence_threshold = parsed;
            }
        }
        if let Ok(v) = std::env::var("AI_TIE_TOLERANCE") {
            if let Ok(parsed) = v.parse() {
                self.ai_tie_tolerance = parsed;
            }
        }
        if let Ok(v) = std::env::var("AI_HEALING_TIMEOUT_MS") {
            if let Ok(parsed) = v.parse() {
                self.ai_healing_timeout_ms = parsed;
            }
        }
        if let Ok(v) = std::env::var("AI_MAX_HEALING_ATTEMPTS") {
            if let Ok(parsed) = v.parse() {
                self.ai_max_healing_attempts = parsed;
            }
        }
        if let Ok(v) = std::env::var("BROWSER_ALWAYS_LAUNCH") {
            if let Ok(parsed) = v.parse() {
                self.browser_always_launch = parsed;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.ai_confidence_threshold) {
            return Err(Error::Internal(
                "ai_confidence_threshold must be in [0.0, 1.0]".to_string(),
            ));
        }
        self.similarity_weights.normalised()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.ai_confidence_threshold, 0.70);
        assert_eq!(cfg.ai_tie_tolerance, 0.05);
        assert_eq!(cfg.ai_healing_timeout_ms, 5_000);
        assert_eq!(cfg.ai_max_healing_attempts, 3);
        assert!((cfg.similarity_weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn env_override_applies() {
        std::env::set_var("AI_CONFIDENCE_THRESHOLD", "0.85");
        let cfg = RuntimeConfig::default().with_env_overrides();
        assert_eq!(cfg.ai_confidence_threshold, 0.85);
        std::env::remove_var("AI_CONFIDENCE_THRESHOLD");
    }

    #[test]
    fn weights_renormalise() {
        let weights = SimilarityWeights {
            text: 3.0,
            structural: 2.0,
            visual: 2.0,
            semantic: 2.0,
            context: 1.0,
        };
        let normalised = weights.normalised().unwrap();
        assert!((normalised.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn toml_round_trip_uses_defaults_for_missing_fields() {
        let cfg = RuntimeConfig::from_toml_str("ai_confidence_threshold = 0.9\n").unwrap();
        assert_eq!(cfg.ai_confidence_threshold, 0.9);
        assert_eq!(cfg.ai_healing_timeout_ms, 5_000);
    }
}
