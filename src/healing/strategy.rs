//! [`HealingStrategy`] records and the default seven-strategy ladder (spec
//! §3 `HealingStrategy`, §4.3 "Strategy ladder").

use async_trait::async_trait;
use tracing::warn;

use crate::config::RuntimeConfig;
use crate::error::{ActionErrorKind, Error, ResolveErrorKind, Result};
use crate::resolver::ladder::{discover, role_hint};
use crate::resolver::page::{ElementHandle, Page};
use crate::resolver::resolver::{self, ResolverCache};

/// Everything one healing attempt needs (spec §4.3: "`ctx` carries the
/// original targetDescription, the failing error, a snapshot of page URL
/// and relevant DOM region, and the scenario's history for this
/// description"). The DOM-region snapshot and description history are
/// folded into `page`/`cache`, which strategies query directly rather than
/// through a frozen snapshot, since this core holds no DOM engine of its own.
pub struct HealContext<'a> {
    pub page: &'a dyn Page,
    pub target_description: &'a str,
    pub failing_error: &'a Error,
    pub page_fingerprint: &'a str,
    pub cache: &'a mut ResolverCache,
    pub config: &'a RuntimeConfig,
    /// The handle that failed, if one was previously resolved.
    pub handle: Option<ElementHandle>,
    /// Whether the step's intent was `click` (for `force-click`'s trigger).
    pub intent_is_click: bool,
}

/// What a successful strategy produces.
#[derive(Debug, Clone, PartialEq)]
pub struct HealOutcome {
    pub handle: ElementHandle,
    pub confidence: f64,
}

/// One entry in the healing ladder.
#[async_trait]
pub trait HealingStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    /// Higher numeric value runs earlier (spec §4.3's worked table orders
    /// `alternative-locators` at 10 first, `force-click` at 1 last).
    fn priority(&self) -> i32;
    /// Whether this strategy's trigger condition holds for `ctx`.
    fn applicable(&self, ctx: &HealContext<'_>) -> bool;
    async fn try_heal(&self, ctx: &mut HealContext<'_>) -> Result<HealOutcome>;
}

fn is_visibility_error(err: &Error) -> bool {
    matches!(
        err,
        Error::Action(ActionErrorKind::NotActionable(_)) | Error::Timeout(_)
    )
}

fn is_intercepted(err: &Error) -> bool {
    matches!(err, Error::Action(ActionErrorKind::Intercepted(_)))
}

fn is_not_found(err: &Error) -> bool {
    matches!(err, Error::Resolve(ResolveErrorKind::NotFound(_)))
}

pub struct AlternativeLocators;

#[async_trait]
impl HealingStrategy for AlternativeLocators {
    fn name(&self) -> &'static str {
        "alternative-locators"
    }
    fn priority(&self) -> i32 {
        10
    }
    fn applicable(&self, _ctx: &HealContext<'_>) -> bool {
        true
    }
    async fn try_heal(&self, ctx: &mut HealContext<'_>) -> Result<HealOutcome> {
        ctx.cache.invalidate(ctx.page_fingerprint, ctx.target_description);
        let result = resolver::resolve(ctx.page, ctx.target_description, ctx.page_fingerprint, ctx.cache, ctx.config).await?;
        Ok(HealOutcome { handle: result.handle, confidence: result.confidence })
    }
}

pub struct ScrollIntoView;

#[async_trait]
impl HealingStrategy for ScrollIntoView {
    fn name(&self) -> &'static str {
        "scroll-into-view"
    }
    fn priority(&self) -> i32 {
        9
    }
    fn applicable(&self, ctx: &HealContext<'_>) -> bool {
        ctx.handle.is_some()
    }
    async fn try_heal(&self, ctx: &mut HealContext<'_>) -> Result<HealOutcome> {
        let handle = ctx.handle.clone().ok_or_else(|| Error::Internal("scroll-into-view requires a handle".to_string()))?;
        ctx.page.scroll_into_view(&handle).await?;
        Ok(HealOutcome { handle, confidence: 0.75 })
    }
}

pub struct WaitForVisible;

#[async_trait]
impl HealingStrategy for WaitForVisible {
    fn name(&self) -> &'static str {
        "wait-for-visible"
    }
    fn priority(&self) -> i32 {
        8
    }
    fn applicable(&self, ctx: &HealContext<'_>) -> bool {
        ctx.handle.is_some() && is_visibility_error(ctx.failing_error)
    }
    async fn try_heal(&self, ctx: &mut HealContext<'_>) -> Result<HealOutcome> {
        let handle = ctx.handle.clone().ok_or_else(|| Error::Internal("wait-for-visible requires a handle".to_string()))?;
        let became_visible = ctx.page.wait_for_visible(&handle, ctx.config.ai_healing_timeout_ms).await?;
        if became_visible {
            Ok(HealOutcome { handle, confidence: 0.75 })
        } else {
            Err(Error::Timeout(format!("{} did not become visible", ctx.target_description)))
        }
    }
}

pub struct RemoveOverlay;

#[async_trait]
impl HealingStrategy for RemoveOverlay {
    fn name(&self) -> &'static str {
        "remove-overlay"
    }
    fn priority(&self) -> i32 {
        7
    }
    fn applicable(&self, ctx: &HealContext<'_>) -> bool {
        is_intercepted(ctx.failing_error)
    }
    async fn try_heal(&self, ctx: &mut HealContext<'_>) -> Result<HealOutcome> {
        let nodes = ctx.page.query_accessible().await?;
        let dismiss = nodes.iter().find(|n| {
            n.accessible_name.to_lowercase().contains("close")
                || n.attributes.get("aria-label").map(|v| v.eq_ignore_ascii_case("close")).unwrap_or(false)
        });
        if let Some(dismiss) = dismiss {
            ctx.page.click(&dismiss.handle, false).await?;
        } else {
            ctx.page.press_key(None, &["Escape".to_string()]).await?;
        }
        ctx.cache.invalidate(ctx.page_fingerprint, ctx.target_description);
        let result = resolver::resolve(ctx.page, ctx.target_description, ctx.page_fingerprint, ctx.cache, ctx.config).await?;
        Ok(HealOutcome { handle: result.handle, confidence: result.confidence })
    }
}

pub struct PatternBasedSearch;

#[async_trait]
impl HealingStrategy for PatternBasedSearch {
    fn name(&self) -> &'static str {
        "pattern-based-search"
    }
    fn priority(&self) -> i32 {
        6
    }
    fn applicable(&self, ctx: &HealContext<'_>) -> bool {
        is_not_found(ctx.failing_error)
    }
    async fn try_heal(&self, ctx: &mut HealContext<'_>) -> Result<HealOutcome> {
        let nodes = ctx.page.query_accessible().await?;
        let role = role_hint(ctx.target_description);
        let matched = match role {
            Some(role) => nodes.iter().find(|n| n.role.eq_ignore_ascii_case(role)),
            None => nodes.first(),
        };
        matched
            .map(|n| HealOutcome { handle: n.handle.clone(), confidence: 0.72 })
            .ok_or_else(|| Error::Resolve(ResolveErrorKind::NotFound(ctx.target_description.to_string())))
    }
}

pub struct VisualSimilarity;

#[async_trait]
impl HealingStrategy for VisualSimilarity {
    fn name(&self) -> &'static str {
        "visual-similarity"
    }
    fn priority(&self) -> i32 {
        5
    }
    fn applicable(&self, ctx: &HealContext<'_>) -> bool {
        is_not_found(ctx.failing_error)
    }
    async fn try_heal(&self, ctx: &mut HealContext<'_>) -> Result<HealOutcome> {
        let lowered_threshold = (ctx.config.ai_confidence_threshold - 0.1).max(0.0);
        let (candidates, _method) = discover(ctx.page, ctx.target_description, &ctx.config.similarity_weights, lowered_threshold).await?;
        candidates
            .into_iter()
            .filter(|c| c.confidence >= lowered_threshold)
            .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
            .map(|c| HealOutcome { handle: c.handle, confidence: c.confidence })
            .ok_or_else(|| Error::Resolve(ResolveErrorKind::NotFound(ctx.target_description.to_string())))
    }
}

pub struct ForceClick;

#[async_trait]
impl HealingStrategy for ForceClick {
    fn name(&self) -> &'static str {
        "force-click"
    }
    fn priority(&self) -> i32 {
        1
    }
    fn applicable(&self, ctx: &HealContext<'_>) -> bool {
        ctx.intent_is_click && ctx.handle.is_some()
    }
    async fn try_heal(&self, ctx: &mut HealContext<'_>) -> Result<HealOutcome> {
        let handle = ctx.handle.clone().ok_or_else(|| Error::Internal("force-click requires a handle".to_string()))?;
        warn!(target = ctx.target_description, "force-click: bypassing actionability checks");
        ctx.page.click(&handle, true).await?;
        Ok(HealOutcome { handle, confidence: 0.2 })
    }
}

/// `alternative-locators` (10) → `force-click` (1), spec.md's default ladder.
pub fn default_ladder() -> Vec<Box<dyn HealingStrategy>> {
    vec![
        Box::new(AlternativeLocators),
        Box::new(ScrollIntoView),
        Box::new(WaitForVisible),
        Box::new(RemoveOverlay),
        Box::new(PatternBasedSearch),
        Box::new(VisualSimilarity),
        Box::new(ForceClick),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ladder_is_sorted_highest_priority_first() {
        let ladder = default_ladder();
        for pair in ladder.windows(2) {
            assert!(pair[0].priority() >= pair[1].priority());
        }
    }

    #[test]
    fn force_click_is_lowest_priority() {
        let ladder = default_ladder();
        assert_eq!(ladder.last().unwrap().name(), "force-click");
    }
}
