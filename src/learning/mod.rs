//! The learning store (spec §3): observed outcomes feeding fragility
//! scoring and strategy-effectiveness reordering.

pub mod fragility;
pub mod store;

pub use fragility::{FragilityClass, FragilityScore};
pub use store::{LearningStore, Outcome, OutcomeRecord, StrategyEffectiveness};
