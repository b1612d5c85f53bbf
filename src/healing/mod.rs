//! The self-healing engine (spec §4.3): when resolution or an action fails
//! with a recoverable error, try the strategy ladder before surfacing the
//! failure to the caller.

pub mod effectiveness;
pub mod engine;
pub mod strategy;

pub use effectiveness::EffectivenessTracker;
pub use engine::{heal, HealResult};
pub use strategy::{default_ladder, HealContext, HealOutcome, HealingStrategy};
