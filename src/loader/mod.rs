//! Selective Loader / Module Detector (spec §4.5).

pub mod detector;
pub mod registry;

pub use detector::{detect, from_patterns, from_tags, Subsystem};
pub use registry::{log_resolution, SubsystemRegistry};
