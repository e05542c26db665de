#![forbid(unsafe_code)]

//! Per-mutation delivery report.

use crate::error::KvoError;

/// Outcome of one notification pass.
///
/// Returned by every mutation on an [`Observable`](super::Observable). A
/// pass that was suppressed by [`NotifyPolicy::OnChange`](super::NotifyPolicy)
/// yields an empty report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub(crate) delivered: usize,
    pub(crate) failures: Vec<KvoError>,
}

impl Delivery {
    /// Number of callbacks that ran to completion.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Callbacks that panicked during this pass, in the order they ran.
    #[must_use]
    pub fn failures(&self) -> &[KvoError] {
        &self.failures
    }

    /// True when no callback failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Collapse into a `Result`, surfacing the first failure.
    pub fn into_result(self) -> Result<usize, KvoError> {
        match self.failures.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.delivered),
        }
    }
}
