//! Healing orchestration (spec §4.3): run the ladder in order, bounded by
//! `AI_MAX_HEALING_ATTEMPTS`, recording each tried strategy's outcome.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::healing::effectiveness::EffectivenessTracker;
use crate::healing::strategy::{HealContext, HealingStrategy};
use crate::resolver::page::ElementHandle;

/// A successful heal (spec §4.3: `{ok:{handle, strategy, confidence,
/// attempts}}`).
#[derive(Debug, Clone, PartialEq)]
pub struct HealResult {
    pub handle: ElementHandle,
    pub strategy: &'static str,
    pub confidence: f64,
    pub attempts: usize,
}

/// Try `ladder` in order, skipping strategies whose trigger condition does
/// not hold, until one succeeds or `max_attempts` strategies have actually
/// been tried. Only strategies that were tried count against the budget;
/// inapplicable ones are free to skip.
pub async fn heal(
    ctx: &mut HealContext<'_>,
    ladder: &[Box<dyn HealingStrategy>],
    max_attempts: usize,
    mut effectiveness: Option<(&mut EffectivenessTracker, &str, &str)>,
) -> Result<HealResult> {
    let mut attempts = 0usize;
    let mut last_err: Option<Error> = None;

    // Reorder the static ladder per observed effectiveness for this
    // (element kind, failure kind) pair before trying anything (spec §4.3
    // "Learning feedback"). Falls back to ladder order when there isn't
    // enough history to justify a promotion.
    let order: Vec<&'static str> = if let Some((tracker, element_kind, failure_kind)) = &effectiveness {
        let static_order: Vec<&'static str> = ladder.iter().map(|s| s.name()).collect();
        tracker.effective_order(element_kind, failure_kind, &static_order)
    } else {
        ladder.iter().map(|s| s.name()).collect()
    };

    for name in order {
        let Some(entry) = ladder.iter().find(|s| s.name() == name) else {
            continue;
        };
        if attempts >= max_attempts {
            break;
        }
        if !entry.applicable(ctx) {
            continue;
        }

        attempts += 1;
        debug!(strategy = entry.name(), attempts, "attempting heal strategy");
        let outcome = entry.try_heal(ctx).await;

        if let Some((tracker, element_kind, failure_kind)) = effectiveness.as_deref_mut() {
            tracker.record(element_kind, failure_kind, entry.name(), outcome.is_ok());
        }

        match outcome {
            Ok(healed) => {
                return Ok(HealResult {
                    handle: healed.handle,
                    strategy: entry.name(),
                    confidence: healed.confidence,
                    attempts,
                })
            }
            Err(err) => {
                warn!(strategy = entry.name(), error = %err, "heal strategy failed");
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| Error::Internal("no applicable healing strategy".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::error::ResolveErrorKind;
    use crate::healing::strategy::{HealOutcome, HealingStrategy as _};
    use crate::resolver::resolver::ResolverCache;
    use async_trait::async_trait;

    struct AlwaysFails;
    #[async_trait]
    impl HealingStrategy for AlwaysFails {
        fn name(&self) -> &'static str {
            "always-fails"
        }
        fn priority(&self) -> i32 {
            10
        }
        fn applicable(&self, _ctx: &HealContext<'_>) -> bool {
            true
        }
        async fn try_heal(&self, ctx: &mut HealContext<'_>) -> Result<HealOutcome> {
            Err(Error::Resolve(ResolveErrorKind::NotFound(ctx.target_description.to_string())))
        }
    }

    struct FakePage;

    #[async_trait]
    impl crate::resolver::page::Page for FakePage {
        async fn goto(&self, _url: &str) -> Result<()> {
            unimplemented!()
        }
        async fn url(&self) -> Result<String> {
            unimplemented!()
        }
        async fn title(&self) -> Result<String> {
            unimplemented!()
        }
        async fn query_accessible(&self) -> Result<Vec<crate::resolver::page::AccessibleNode>> {
            Ok(Vec::new())
        }
        async fn features_of(&self, _handle: &ElementHandle) -> Result<crate::resolver::ElementFeatures> {
            unimplemented!()
        }
        async fn click(&self, _handle: &ElementHandle, _force: bool) -> Result<()> {
            Ok(())
        }
        async fn type_text(&self, _handle: &ElementHandle, _text: &str, _clear_first: bool) -> Result<()> {
            unimplemented!()
        }
        async fn press_key(&self, _handle: Option<&ElementHandle>, _combo: &[String]) -> Result<()> {
            Ok(())
        }
        async fn hover(&self, _handle: &ElementHandle) -> Result<()> {
            unimplemented!()
        }
        async fn scroll_into_view(&self, _handle: &ElementHandle) -> Result<()> {
            Ok(())
        }
        async fn select_option(&self, _handle: &ElementHandle, _value: &str) -> Result<()> {
            unimplemented!()
        }
        async fn upload(&self, _handle: &ElementHandle, _path: &str) -> Result<()> {
            unimplemented!()
        }
        async fn wait_for_visible(&self, _handle: &ElementHandle, _timeout_ms: u64) -> Result<bool> {
            Ok(true)
        }
        async fn wait_for_hidden(&self, _handle: &ElementHandle, _timeout_ms: u64) -> Result<bool> {
            unimplemented!()
        }
        async fn wait_for_detached(&self, _handle: &ElementHandle, _timeout_ms: u64) -> Result<bool> {
            unimplemented!()
        }
        async fn wait_url_change(&self, _predicate: crate::resolver::page::UrlPredicate, _timeout_ms: u64) -> Result<bool> {
            unimplemented!()
        }
        async fn wait_text_change(
            &self,
            _handle: &ElementHandle,
            _predicate: crate::resolver::page::TextPredicate,
            _timeout_ms: u64,
        ) -> Result<bool> {
            unimplemented!()
        }
        async fn evaluate(&self, _script: &str, _args: &[serde_json::Value]) -> Result<serde_json::Value> {
            unimplemented!()
        }
        async fn screenshot(&self, _handle: Option<&ElementHandle>) -> Result<String> {
            unimplemented!()
        }
        async fn set_cookie(&self, _name: &str, _value: &str) -> Result<()> {
            unimplemented!()
        }
        async fn clear_cookies(&self) -> Result<()> {
            unimplemented!()
        }
        async fn get_cookie(&self, _name: &str) -> Result<Option<String>> {
            unimplemented!()
        }
        async fn set_storage_item(&self, _key: &str, _value: &str) -> Result<()> {
            unimplemented!()
        }
        async fn clear_storage(&self) -> Result<()> {
            unimplemented!()
        }
        async fn get_storage_item(&self, _key: &str) -> Result<Option<String>> {
            unimplemented!()
        }
        async fn switch_tab(&self, _selector: &str) -> Result<()> {
            unimplemented!()
        }
        async fn open_new_tab(&self, _url: Option<&str>) -> Result<()> {
            unimplemented!()
        }
        async fn close_tab(&self, _selector: Option<&str>) -> Result<()> {
            unimplemented!()
        }
        async fn switch_frame(&self, _selector: &str) -> Result<()> {
            unimplemented!()
        }
        async fn switch_main_frame(&self) -> Result<()> {
            unimplemented!()
        }
        async fn download_path(&self, _name: &str) -> Result<Option<String>> {
            unimplemented!()
        }
    }

    struct AlwaysSucceeds;
    #[async_trait]
    impl HealingStrategy for AlwaysSucceeds {
        fn name(&self) -> &'static str {
            "always-succeeds"
        }
        fn priority(&self) -> i32 {
            5
        }
        fn applicable(&self, _ctx: &HealContext<'_>) -> bool {
            true
        }
        async fn try_heal(&self, _ctx: &mut HealContext<'_>) -> Result<HealOutcome> {
            Ok(HealOutcome { handle: ElementHandle("ok".to_string()), confidence: 0.9 })
        }
    }

    #[tokio::test]
    async fn falls_through_to_next_strategy_on_failure() {
        let config = RuntimeConfig::default();
        let mut cache = ResolverCache::new();
        let err = Error::Resolve(ResolveErrorKind::NotFound("the button".to_string()));
        let mut ctx = HealContext {
            page: &FakePage,
            target_description: "the button",
            failing_error: &err,
            page_fingerprint: "fp",
            cache: &mut cache,
            config: &config,
            handle: None,
            intent_is_click: true,
        };
        let ladder: Vec<Box<dyn HealingStrategy>> = vec![Box::new(AlwaysFails), Box::new(AlwaysSucceeds)];
        let result = heal(&mut ctx, &ladder, 3, None).await.unwrap();
        assert_eq!(result.strategy, "always-succeeds");
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn stops_at_max_attempts() {
        let config = RuntimeConfig::default();
        let mut cache = ResolverCache::new();
        let err = Error::Resolve(ResolveErrorKind::NotFound("the button".to_string()));
        let mut ctx = HealContext {
            page: &FakePage,
            target_description: "the button",
            failing_error: &err,
            page_fingerprint: "fp",
            cache: &mut cache,
            config: &config,
            handle: None,
            intent_is_click: true,
        };
        let ladder: Vec<Box<dyn HealingStrategy>> = vec![Box::new(AlwaysFails), Box::new(AlwaysFails), Box::new(AlwaysSucceeds)];
        let result = heal(&mut ctx, &ladder, 2, None).await;
        assert!(result.is_err());
    }
}
