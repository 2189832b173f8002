//! error types used throughout the engine.

use crate::identifiers::RemoteId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// error surfaced by a [`crate::ProviderPort`] implementation.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("provider error ({status}): {message}")]
pub struct ProviderError {
    pub status: u16,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// gateway-class failures (>=500, or a 504-equivalent timeout) are
    /// retried once by the bounded retry wrapper.
    pub fn is_retryable(&self) -> bool {
        self.status >= 500
    }

    /// 401/404 are surfaced to the operator as configuration errors rather
    /// than retried or silently propagated.
    pub fn is_config_error(&self) -> bool {
        matches!(self.status, 401 | 404)
    }
}

/// top-level error of the engine, see spec.md §7.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum EngineError {
    /// the remote bracket provider rejected or failed a call
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// `setup` found conflicting event-ordering dates
    #[error("conflicting dates: {offenders:?}")]
    ConflictingDates { offenders: Vec<String> },

    /// the participant cap was reached
    #[error("participant limit reached")]
    LimitReached,

    /// the user is already registered
    #[error("already registered")]
    AlreadyRegistered,

    /// the user is not registered
    #[error("not registered")]
    NotRegistered,

    /// the operation is not allowed in the tournament's current phase
    #[error("wrong phase: {operation} requires one of {allowed:?}, found {actual}")]
    WrongPhase {
        operation: String,
        allowed: Vec<String>,
        actual: String,
    },

    /// restored state references a participant no longer reachable in chat
    #[error("lost participant: {0}")]
    LostParticipant(RemoteId),

    /// a structural invariant was violated (should not happen in practice)
    #[error("invariant violation: {0}")]
    Invariant(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
