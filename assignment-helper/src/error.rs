//! Error types for the assignment solver

use thiserror::Error;

/// Result type alias using the crate's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or solving an assignment problem
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The weight matrix was rejected (empty, ragged, negative or non-finite entries, non-square)
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input
        reason: String,
    },

    /// Label vectors or a seed matching disagree with the matrix dimensions
    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Which argument had the wrong size
        what: &'static str,
        /// Size implied by the weight matrix
        expected: usize,
        /// Size that was supplied
        got: usize,
    },

    /// A path handed to `augment` is not augmenting in the current equality graph.
    /// Indicates a bug in tree growth, not a recoverable condition.
    #[error("Invalid augmenting path: {reason}")]
    InvalidAugmentingPath {
        /// Which property of the path was violated
        reason: String,
    },

    /// No slack edge leaves the alternating tree, so no label adjustment exists
    #[error("No improving label delta: no present edge leaves the alternating tree")]
    NoImprovingDelta,

    /// The 0/1 support of the weight matrix has no perfect matching
    #[error("No perfect matching possible: at most {matched} of {size} rows can be matched")]
    NoPerfectMatchingPossible {
        /// Size of the matching reached (or a Hall bound) when the solver gave up
        matched: usize,
        /// Number of rows
        size: usize,
    },
}

impl Error {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow() -> Self {
        Self::invalid_input("weights overflow label arithmetic")
    }

    pub(crate) fn invalid_path(reason: impl Into<String>) -> Self {
        Error::InvalidAugmentingPath {
            reason: reason.into(),
        }
    }
}
