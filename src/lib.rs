//! AI Step Engine core: a grammar-based natural-language step parser, an
//! accessibility-first element resolver, a self-healing strategy ladder, a
//! per-intent action executor, and a selective subsystem loader — the part
//! of a BDD automation stack that turns `AI "..."` step text into browser
//! and API actions without a model or remote service in the loop.
//!
//! This crate owns none of the external capabilities it drives (no DOM
//! engine, no HTTP client, no database driver); those are the `Page` and
//! `HttpClient` traits in [`resolver::page`] and [`executor::http`], to be
//! implemented by whatever browser-automation/HTTP stack the host process
//! already depends on.

pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod healing;
pub mod intent;
pub mod learning;
pub mod loader;
pub mod resolver;

pub use config::RuntimeConfig;
pub use context::{FeatureContext, ScenarioContext};
pub use error::{Error, Result};
pub use executor::{execute_step, StepContext, StepOutcome};
pub use healing::{default_ladder, heal, EffectivenessTracker, HealContext, HealResult};
pub use intent::{parse_step, Intent, IntentKind, StepParse};
pub use learning::LearningStore;
pub use loader::{detect as detect_subsystems, Subsystem};
pub use resolver::{resolve, Page, ResolveResult, ResolverCache};
