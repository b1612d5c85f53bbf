//! The element resolver (spec §4.2): turns a free-text target description
//! plus live page state into a stable, actionable element reference.

pub mod features;
pub mod ladder;
pub mod page;
pub mod resolver;
pub mod similarity;

pub use features::ElementFeatures;
pub use page::{AccessibleNode, ElementHandle, Page, TextPredicate, UrlPredicate};
pub use resolver::{resolve, ResolveResult, ResolverCache};
pub use similarity::SimilarityScore;
