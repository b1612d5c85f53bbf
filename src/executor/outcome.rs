//! The result an executed step produces (spec §4.4).

use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::executor::diagnostics::DiagnosticRecord;

/// What a query intent wrote into scenario context, if anything.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValue {
    pub name: String,
    pub value: JsonValue,
}

/// The terminal result of running one step through the executor (spec §4.4:
/// "Idle → Parsed → (Executing|Resolving) → Healing(≤1) → Done/Failed").
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Done {
        stored: Option<StoredValue>,
        diagnostics: DiagnosticRecord,
    },
    Failed {
        error: Error,
        diagnostics: DiagnosticRecord,
    },
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, StepOutcome::Done { .. })
    }

    pub fn diagnostics(&self) -> &DiagnosticRecord {
        match self {
            StepOutcome::Done { diagnostics, .. } => diagnostics,
            StepOutcome::Failed { diagnostics, .. } => diagnostics,
        }
    }
}
