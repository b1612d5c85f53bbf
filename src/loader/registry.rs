//! Lazy subsystem initialisation (spec §4.5 "Effect"): a subsystem not
//! required by any scenario this worker has seen must never be instantiated.

use std::collections::HashSet;

use tracing::info;

use crate::loader::detector::Subsystem;

/// Tracks which subsystems this worker has already initialised, so repeated
/// scenarios requiring the same subsystem don't re-run its initialiser.
#[derive(Debug, Default)]
pub struct SubsystemRegistry {
    initialised: HashSet<Subsystem>,
}

impl SubsystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialised(&self, subsystem: Subsystem) -> bool {
        self.initialised.contains(&subsystem)
    }

    /// Run `init` for every subsystem in `required` that hasn't been
    /// initialised yet on this worker. `init` is given the subsystem so one
    /// closure can dispatch to the right lazy constructor.
    pub fn ensure<F>(&mut self, required: &HashSet<Subsystem>, mut init: F)
    where
        F: FnMut(Subsystem),
    {
        for &subsystem in required {
            if self.initialised.insert(subsystem) {
                init(subsystem);
            }
        }
    }
}

/// Log the resolved subsystem set for one scenario (spec §2.1 "loader" log
/// point): once per scenario, with whether it came from tags or patterns.
pub fn log_resolution(scenario_name: &str, subsystems: &HashSet<Subsystem>, from_explicit_tags: bool) {
    info!(
        scenario = scenario_name,
        subsystems = ?subsystems,
        source = if from_explicit_tags { "explicit-tags" } else { "pattern-detection" },
        "resolved subsystem set"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialiser_runs_once_per_subsystem() {
        let mut registry = SubsystemRegistry::new();
        let mut calls = 0;
        let required = HashSet::from([Subsystem::Browser]);

        registry.ensure(&required, |_| calls += 1);
        registry.ensure(&required, |_| calls += 1);

        assert_eq!(calls, 1);
        assert!(registry.is_initialised(Subsystem::Browser));
        assert!(!registry.is_initialised(Subsystem::Http));
    }
}
