// =============================================================================
// Engine Errors
// =============================================================================
//
// The indicator engine is pure math over already-shaped data, so the error
// taxonomy is deliberately narrow.  Insufficient history is never an error:
// it shows up as `None` entries in a series or as an empty window.

use thiserror::Error;

/// Errors raised by the indicator engine and the window slicer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A window/span/period or a slicing threshold is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
}

impl EngineError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Reject a zero-length look-back window.
pub(crate) fn require_positive(name: &'static str, value: usize) -> Result<(), EngineError> {
    if value == 0 {
        return Err(EngineError::invalid(name, "must be >= 1"));
    }
    Ok(())
}
