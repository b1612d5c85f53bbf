//! The step executor (spec §4.4): resolves a target, dispatches the intent,
//! retries assertions within budget, heals recoverable failures once, and
//! hands back a [`StepOutcome`] with diagnostics attached.

pub mod diagnostics;
pub mod dispatch;
pub mod http;
pub mod outcome;
pub mod run;
pub mod state_machine;

pub use diagnostics::{DiagnosticRecord, DiagnosticRecordBuilder};
pub use dispatch::run_once;
pub use http::{ApiResponse, HttpClient};
pub use outcome::{StepOutcome, StoredValue};
pub use run::{execute_step, StepContext};
pub use state_machine::{StepRunState, StepState};
