#![forbid(unsafe_code)]

//! Error type shared by subjects, observables, and delivery reports.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Invalid argument | Empty name, negative value, overflowing increment | Constructor / mutation returns `Err` |
//! | Callback failure | An observation callback panicked | Logged, recorded in [`Delivery`](crate::Delivery), delivery continues |

use std::fmt;

/// Errors from observation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvoError {
    /// An argument was rejected by validation.
    InvalidArgument {
        /// Which argument was rejected.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
    /// A callback panicked while a change was being delivered to it.
    CallbackFailure {
        /// Identity of the failing observation (see `ObservationHandle::id`).
        observation: u64,
        /// Panic message, or a placeholder when the payload was not a string.
        message: String,
    },
}

impl KvoError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for KvoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { field, reason } => {
                write!(f, "invalid argument '{field}': {reason}")
            }
            Self::CallbackFailure {
                observation,
                message,
            } => write!(f, "observation #{observation} failed: {message}"),
        }
    }
}

impl std::error::Error for KvoError {}
