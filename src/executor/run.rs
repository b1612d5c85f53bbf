//! Step execution (spec §4.4): resolve (if needed), run, retry assertions
//! within budget, heal recoverable failures once, and record the outcome.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::RuntimeConfig;
use crate::context::ScenarioContext;
use crate::error::{Error, Result};
use crate::executor::diagnostics::DiagnosticRecordBuilder;
use crate::executor::dispatch::run_once;
use crate::executor::http::HttpClient;
use crate::executor::outcome::{StepOutcome, StoredValue};
use crate::executor::state_machine::{StepRunState, StepState};
use crate::healing::{self, EffectivenessTracker, HealContext, HealingStrategy};
use crate::intent::{Intent, IntentFamily};
use crate::learning::{LearningStore, Outcome, OutcomeRecord};
use crate::resolver::ladder::role_hint;
use crate::resolver::page::{ElementHandle, Page};
use crate::resolver::resolver::{self, ResolverCache};

/// Everything one step execution needs. Borrowed rather than owned since the
/// caller (a scenario runner) holds these across many steps.
pub struct StepContext<'a> {
    pub page: &'a dyn Page,
    pub http: Option<&'a dyn HttpClient>,
    pub cache: &'a mut ResolverCache,
    pub config: &'a RuntimeConfig,
    pub page_fingerprint: &'a str,
    pub scenario: &'a mut ScenarioContext,
    pub ladder: &'a [Box<dyn HealingStrategy>],
    pub effectiveness: &'a mut EffectivenessTracker,
    pub learning: &'a mut LearningStore,
}

fn failure_kind(err: &Error) -> &'static str {
    use crate::error::{ActionErrorKind, ResolveErrorKind};
    match err {
        Error::Resolve(ResolveErrorKind::NotFound(_)) => "not-found",
        Error::Action(ActionErrorKind::NotActionable(_)) => "not-actionable",
        Error::Action(ActionErrorKind::Intercepted(_)) => "intercepted",
        Error::Action(ActionErrorKind::Detached(_)) => "detached",
        Error::Timeout(_) => "timeout",
        _ => "other",
    }
}

/// Resolve `intent`'s target, healing once if resolution fails recoverably.
async fn resolve_with_healing(
    ctx: &mut StepContext<'_>,
    intent: &Intent,
    run: &mut StepRunState,
) -> Result<(Option<ElementHandle>, Option<&'static str>)> {
    let Some(description) = intent.target_description.as_deref() else {
        return Ok((None, None));
    };

    run.transition(StepState::Resolving);
    let resolved = resolver::resolve(ctx.page, description, ctx.page_fingerprint, ctx.cache, ctx.config).await;

    match resolved {
        Ok(result) => Ok((Some(result.handle), None)),
        Err(err) if err.is_recoverable() => {
            if !run.transition(StepState::Healing) {
                return Err(err);
            }
            warn!(description, error = %err, "resolution failed, attempting heal");
            let element_kind = role_hint(description).unwrap_or("element");
            let kind = failure_kind(&err);
            let mut heal_ctx = HealContext {
                page: ctx.page,
                target_description: description,
                failing_error: &err,
                page_fingerprint: ctx.page_fingerprint,
                cache: ctx.cache,
                config: ctx.config,
                handle: None,
                intent_is_click: intent.kind == crate::intent::IntentKind::Click,
            };
            let healed = healing::heal(
                &mut heal_ctx,
                ctx.ladder,
                ctx.config.ai_max_healing_attempts,
                Some((ctx.effectiveness, element_kind, kind)),
            )
            .await;
            run.transition(StepState::Resolving);
            match healed {
                Ok(result) => Ok((Some(result.handle), Some(result.strategy))),
                Err(_) => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

/// Run `intent`, retrying assertions within `assertion_retry_budget_ms` and
/// healing at most once anywhere in the step's lifetime (spec §4.3/§4.4).
pub async fn execute_step(ctx: &mut StepContext<'_>, intent: &Intent, instruction_text: &str) -> StepOutcome {
    let start = Instant::now();
    let mut run = StepRunState::new();
    run.transition(StepState::Parsed);

    let diagnostics_base = DiagnosticRecordBuilder::new(instruction_text, format!("{:?}", intent.kind))
        .target(intent.target_description.clone());

    let (handle, strategy_used) = match resolve_with_healing(ctx, intent, &mut run).await {
        Ok(h) => h,
        Err(err) => {
            return fail(ctx, intent, instruction_text, diagnostics_base, start, err, None).await;
        }
    };

    run.transition(StepState::Executing);

    let is_assertion = intent.kind.family() == IntentFamily::Assertion;
    let deadline = Instant::now() + Duration::from_millis(ctx.config.assertion_retry_budget_ms);

    let result = loop {
        let attempt = run_once(ctx.page, ctx.http, ctx.scenario, intent, handle.as_ref()).await;
        match &attempt {
            Err(Error::AssertionFailed { .. }) if is_assertion && Instant::now() < deadline => {
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
            _ => break attempt,
        }
    };

    match result {
        Ok(value) => {
            run.transition(StepState::Done);
            let stored = match (&intent.store_as, value) {
                (Some(name), Some(value)) => {
                    ctx.scenario.set(name.as_str(), crate::context::Value::Json(value.clone()));
                    Some(StoredValue { name: name.clone(), value })
                }
                _ => None,
            };
            let diagnostics = diagnostics_base.duration_ms(start.elapsed().as_millis() as u64).build();
            record_outcome(ctx, intent, instruction_text, Outcome::Ok, 1.0, start, strategy_used);
            info!(instruction = instruction_text, "step done");
            StepOutcome::Done { stored, diagnostics }
        }
        Err(err) => fail(ctx, intent, instruction_text, diagnostics_base, start, err, strategy_used).await,
    }
}

async fn fail(
    ctx: &mut StepContext<'_>,
    intent: &Intent,
    instruction_text: &str,
    diagnostics_base: DiagnosticRecordBuilder,
    start: Instant,
    err: Error,
    strategy_used: Option<&'static str>,
) -> StepOutcome {
    let screenshot = match ctx.config.screenshot_policy {
        crate::config::ScreenshotPolicy::Off => None,
        _ => ctx.page.screenshot(None).await.ok(),
    };
    let diagnostics = diagnostics_base
        .screenshot(screenshot)
        .duration_ms(start.elapsed().as_millis() as u64)
        .error(Some(err.to_string()))
        .build();
    record_outcome(ctx, intent, instruction_text, Outcome::Err, 0.0, start, strategy_used);
    warn!(instruction = instruction_text, error = %err, "step failed");
    StepOutcome::Failed { error: err, diagnostics }
}

fn record_outcome(
    ctx: &mut StepContext<'_>,
    intent: &Intent,
    instruction_text: &str,
    outcome: Outcome,
    confidence: f64,
    start: Instant,
    strategy_used: Option<&'static str>,
) {
    ctx.learning.record(OutcomeRecord {
        timestamp_utc: chrono::Utc::now(),
        instruction_text: instruction_text.to_string(),
        intent_kind: format!("{:?}", intent.kind),
        element_description: intent.target_description.clone(),
        strategy_used: strategy_used.map(|s| s.to_string()),
        outcome,
        confidence,
        duration_ms: start.elapsed().as_millis() as u64,
    });
}
