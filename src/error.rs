use thiserror::Error;

/// Input-shape and parameter errors. All of them are raised before any
/// relaxation work starts; a run that exhausts its iteration budget is not an
/// error and is reported through [`crate::adjust::AdjustOutcome`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineIdError {
    #[error("{name} must be scalar or of length {expected} (got {found})")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("left edge ({left}) must be finite and strictly less than right edge ({right})")]
    DegenerateBoundary { left: f64, right: f64 },

    #[error("plot frame has an empty or inverted {axis} range")]
    DegenerateFrame { axis: &'static str },

    #[error("invalid adjust parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },

    #[error("no spectral lines to label")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, LineIdError>;

pub(crate) fn check_edges(left: f64, right: f64) -> Result<()> {
    if left.is_finite() && right.is_finite() && left < right {
        Ok(())
    } else {
        Err(LineIdError::DegenerateBoundary { left, right })
    }
}
