//! Selective Loader / Module Detector (spec §4.5): decide, before a scenario
//! runs, which external subsystems it actually needs so idle ones are never
//! instantiated. Grounded on the teacher's keyword-based domain router, kept
//! to a boolean presence test rather than a weighted score since the
//! detector only needs "does this subsystem apply at all", not a ranking.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{LoaderMode, RuntimeConfig};

/// One of the external subsystems a scenario may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subsystem {
    Browser,
    Http,
    Db,
    Soap,
}

fn explicit_tag_table() -> &'static HashMap<&'static str, Subsystem> {
    static TABLE: OnceLock<HashMap<&'static str, Subsystem>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m = HashMap::new();
        m.insert("ui", Subsystem::Browser);
        m.insert("browser", Subsystem::Browser);
        m.insert("web", Subsystem::Browser);
        m.insert("api", Subsystem::Http);
        m.insert("rest", Subsystem::Http);
        m.insert("http", Subsystem::Http);
        m.insert("database", Subsystem::Db);
        m.insert("db", Subsystem::Db);
        m.insert("sql", Subsystem::Db);
        m.insert("soap", Subsystem::Soap);
        m.insert("wsdl", Subsystem::Soap);
        m
    })
}

struct PatternFamily {
    subsystem: Subsystem,
    patterns: Vec<Regex>,
}

fn pattern_families() -> &'static Vec<PatternFamily> {
    static FAMILIES: OnceLock<Vec<PatternFamily>> = OnceLock::new();
    FAMILIES.get_or_init(|| {
        let compile = |patterns: &[&str]| -> Vec<Regex> {
            patterns.iter().map(|p| Regex::new(p).expect("built-in pattern is valid")).collect()
        };
        vec![
            PatternFamily {
                subsystem: Subsystem::Browser,
                patterns: compile(&[
                    r"(?i)\bclick\b",
                    r"(?i)\bnavigate\b",
                    r"(?i)\bpage\b",
                    r"(?i)\bbutton\b",
                    r"(?i)\bshould see\b",
                    r"(?i)\bscroll\b",
                    r"(?i)\bdropdown\b",
                ]),
            },
            PatternFamily {
                subsystem: Subsystem::Http,
                patterns: compile(&[
                    r"(?i)\bapi\b",
                    r"(?i)\bendpoint\b",
                    r"(?i)\brequest\b",
                    r"(?i)\bresponse\b",
                    r"(?i)\bGET\b|\bPOST\b|\bPUT\b|\bDELETE\b|\bPATCH\b",
                    r"(?i)\bstatus code\b",
                ]),
            },
            PatternFamily {
                subsystem: Subsystem::Db,
                patterns: compile(&[
                    r"(?i)\bquery\b",
                    r"(?i)\btable\b",
                    r"(?i)\brow\b",
                    r"(?i)\bdatabase\b",
                    r"(?i)\bselect \*|\binsert into\b|\bupdate\b.*\bset\b",
                ]),
            },
            PatternFamily {
                subsystem: Subsystem::Soap,
                patterns: compile(&[r"(?i)\bsoap\b", r"(?i)\bwsdl\b", r"(?i)\bxml envelope\b"]),
            },
        ]
    })
}

/// Subsystems implied by an explicit tag set (spec §4.5 table). Empty if no
/// recognised tag is present.
pub fn from_tags(tags: &[String]) -> HashSet<Subsystem> {
    let table = explicit_tag_table();
    tags.iter()
        .filter_map(|t| table.get(t.trim_start_matches('@').to_lowercase().as_str()))
        .copied()
        .collect()
}

/// Subsystems implied by regex pattern matches against step texts.
pub fn from_patterns(step_texts: &[String]) -> HashSet<Subsystem> {
    let mut found = HashSet::new();
    for family in pattern_families() {
        if step_texts.iter().any(|text| family.patterns.iter().any(|re| re.is_match(text))) {
            found.insert(family.subsystem);
        }
    }
    found
}

/// Decide the subsystem set for one scenario (spec §4.5 "Rules"/"Modes"/
/// "Override"). `tags` is the union of feature and scenario tags.
pub fn detect(tags: &[String], step_texts: &[String], config: &RuntimeConfig) -> HashSet<Subsystem> {
    let mut subsystems = match config.loader_mode {
        LoaderMode::Explicit => from_tags(tags),
        LoaderMode::Auto => from_patterns(step_texts),
        LoaderMode::Hybrid => {
            let explicit = from_tags(tags);
            if !explicit.is_empty() {
                explicit
            } else {
                from_patterns(step_texts)
            }
        }
    };

    if subsystems.is_empty() {
        // No explicit tag and no pattern matched anything: default to
        // browser to preserve legacy behaviour (spec §4.5 "Rules").
        subsystems.insert(Subsystem::Browser);
    }

    if config.browser_always_launch {
        subsystems.insert(Subsystem::Browser);
    }

    subsystems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_tag_is_authoritative_over_patterns() {
        let cfg = RuntimeConfig { loader_mode: LoaderMode::Hybrid, ..Default::default() };
        let tags = vec!["@api".to_string()];
        let steps = vec!["Click the submit button".to_string()];
        let result = detect(&tags, &steps, &cfg);
        assert_eq!(result, HashSet::from([Subsystem::Http]));
    }

    #[test]
    fn falls_back_to_patterns_when_no_tags_present() {
        let cfg = RuntimeConfig { loader_mode: LoaderMode::Hybrid, ..Default::default() };
        let steps = vec!["Send a POST request to the endpoint".to_string()];
        let result = detect(&[], &steps, &cfg);
        assert_eq!(result, HashSet::from([Subsystem::Http]));
    }

    #[test]
    fn defaults_to_browser_when_nothing_matches() {
        let cfg = RuntimeConfig { loader_mode: LoaderMode::Hybrid, ..Default::default() };
        let result = detect(&[], &[], &cfg);
        assert_eq!(result, HashSet::from([Subsystem::Browser]));
    }

    #[test]
    fn explicit_mode_ignores_patterns() {
        let cfg = RuntimeConfig { loader_mode: LoaderMode::Explicit, ..Default::default() };
        let steps = vec!["Send a POST request".to_string()];
        let result = detect(&[], &steps, &cfg);
        assert_eq!(result, HashSet::from([Subsystem::Browser]));
    }

    #[test]
    fn browser_always_launch_forces_browser() {
        let cfg = RuntimeConfig {
            loader_mode: LoaderMode::Explicit,
            browser_always_launch: true,
            ..Default::default()
        };
        let tags = vec!["@api".to_string()];
        let result = detect(&tags, &[], &cfg);
        assert!(result.contains(&Subsystem::Browser));
        assert!(result.contains(&Subsystem::Http));
    }

    #[test]
    fn multiple_subsystems_can_combine() {
        let tags = vec!["@ui".to_string(), "@api".to_string()];
        let result = from_tags(&tags);
        assert_eq!(result, HashSet::from([Subsystem::Browser, Subsystem::Http]));
    }
}
