//! Error types for geometry primitives.
//!
//! Degenerate geometry is not an error here; these variants cover broken
//! caller preconditions and internal invariant violations only.

use thiserror::Error;

/// Errors raised by geometry helpers when a precondition does not hold.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Too few points were supplied for the requested construction.
    #[error("not enough points: need at least {needed}, got {got}")]
    InsufficientPoints {
        /// Minimum number of points required
        needed: usize,
        /// Number of points supplied
        got: usize,
    },

    /// Two parallel inputs have different lengths.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Triangles of one batch do not share a single point arena.
    #[error("triangles reference more than one point arena")]
    MixedPointArenas,

    /// An algorithm reached a state that should be unreachable.
    #[error("internal geometry error: {0}")]
    Internal(String),
}

/// A specialized `Result` type for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;

impl GeometryError {
    /// Returns `true` if the error is caused by invalid caller input.
    pub fn is_precondition_error(&self) -> bool {
        matches!(
            self,
            GeometryError::InsufficientPoints { .. }
                | GeometryError::LengthMismatch { .. }
                | GeometryError::MixedPointArenas
        )
    }

    /// Returns `true` if the error signals a bug rather than bad input.
    pub fn is_internal_error(&self) -> bool {
        matches!(self, GeometryError::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeometryError::InsufficientPoints { needed: 4, got: 2 };
        assert_eq!(err.to_string(), "not enough points: need at least 4, got 2");
    }

    #[test]
    fn test_error_categories() {
        let pre = GeometryError::LengthMismatch {
            expected: 3,
            got: 2,
        };
        let internal = GeometryError::Internal("unreachable".to_string());

        assert!(pre.is_precondition_error());
        assert!(!pre.is_internal_error());
        assert!(internal.is_internal_error());
        assert!(!internal.is_precondition_error());
    }
}
