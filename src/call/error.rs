use thiserror::Error;

use super::model::CallStatus;

/// Typed failures of call-session operations
///
/// Pure analysis components never produce these; they degrade to empty
/// output instead. Only the store's guarded transitions and payload
/// validation reject.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("call session not found")]
    NotFound,

    /// Operation attempted from a disallowed status; session state unchanged
    #[error("cannot {action} while call is {from}")]
    InvalidTransition {
        from: CallStatus,
        action: &'static str,
    },

    /// Malformed payload, rejected before any state transition
    #[error("{0}")]
    Validation(String),
}
