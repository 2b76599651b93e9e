//! Error types for content generation.

/// Parameters a generator cannot satisfy.
///
/// Generation is total over valid parameters, so every variant here is a
/// caller bug (bad extras reaching a generator), never a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// A size that must be at least one was zero.
    #[error("{0} must be at least 1")]
    Empty(&'static str),

    /// More distinct items were requested than exist.
    #[error("cannot pick {wanted} distinct items from {available}")]
    NotEnough { wanted: usize, available: usize },

    /// A probability outside `0.0..=1.0`.
    #[error("probability {0} is outside 0..=1")]
    Probability(String),

    /// A numeric bound above what a generator accepts.
    #[error("{what} must be at most {max}, got {got}")]
    TooLarge { what: &'static str, max: i64, got: i64 },

    /// A puzzle grid too small to shuffle.
    #[error("puzzle side must be at least 2, got {0}")]
    PuzzleTooSmall(usize),
}
