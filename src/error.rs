//! Crate-wide error taxonomy.
//!
//! Every failure surfaced across layer boundaries (parser, resolver, healing
//! engine, executor, loader) is one of the variants below. Internal helper
//! functions may use other error types locally but must convert to this one
//! before crossing a module boundary.

use thiserror::Error;

/// Reason a raw instruction failed to parse into an [`Intent`](crate::intent::Intent).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// No grammar rule matched the instruction in either pass.
    #[error("no grammar rule matched: {0:?}")]
    NoMatch(String),

    /// A rule matched but a captured parameter failed type coercion.
    #[error("parameter {param} could not be parsed from {value:?}: {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },
}

/// Reason the element resolver could not produce a handle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveErrorKind {
    /// No candidate scored above `AI_CONFIDENCE_THRESHOLD` on any ladder rung.
    #[error("no element found for {0:?}")]
    NotFound(String),

    /// Multiple candidates tied within tolerance with no disambiguator.
    #[error("ambiguous target {description:?}: {candidate_count} tied candidates")]
    Ambiguous {
        description: String,
        candidate_count: usize,
    },
}

/// Reason an action could not be carried out against a resolved handle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionErrorKind {
    /// Element exists but cannot receive the action (hidden, intercepted, disabled).
    #[error("element not actionable: {0}")]
    NotActionable(String),

    /// Element is not an editable control.
    #[error("element not editable: {0}")]
    NotEditable(String),

    /// Element reference is stale; it left the DOM.
    #[error("element detached: {0}")]
    Detached(String),

    /// A pointer event would hit a different element (overlay, modal).
    #[error("element intercepted: {0}")]
    Intercepted(String),
}

/// Primary error type for the AI step engine core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Instruction parsing failed. See [`ParseErrorKind`].
    #[error("parse error: {0}")]
    Parse(#[from] ParseErrorKind),

    /// A `{scope:key}` / `{{var}}` / `$var` interpolation reference had no value.
    #[error("unresolved variable reference: {0}")]
    VariableUnresolved(String),

    /// Element resolution failed. See [`ResolveErrorKind`].
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveErrorKind),

    /// Action dispatch failed at the element level. See [`ActionErrorKind`].
    #[error("action error: {0}")]
    Action(#[from] ActionErrorKind),

    /// A suspending operation exceeded its budget.
    #[error("timeout: {0}")]
    Timeout(String),

    /// An assertion's predicate did not hold within the retry budget.
    #[error("assertion failed ({kind}): expected {expected:?}, got {actual:?}")]
    AssertionFailed {
        kind: String,
        expected: String,
        actual: String,
    },

    /// The HTTP capability reported a non-response-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// An external collaborator (DB, SOAP) reported failure.
    #[error("integration error: {0}")]
    Integration(String),

    /// Programmer error: invalid registration, invariant violation. Never recovered.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the step runner's recoverable set (spec §7.3) contains this error.
    ///
    /// Recoverable: `NotActionable`, `Intercepted`, `Detached`, a visibility
    /// `Timeout`, and `Resolve(NotFound)`. Everything else is terminal for the step.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Action(ActionErrorKind::NotActionable(_))
                | Error::Action(ActionErrorKind::Intercepted(_))
                | Error::Action(ActionErrorKind::Detached(_))
                | Error::Resolve(ResolveErrorKind::NotFound(_))
                | Error::Timeout(_)
        )
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Internal(format!("invalid grammar pattern: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(format!("serialization error: {err}"))
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
