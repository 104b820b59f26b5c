//! Errors for malformed rounds.

/// A round that cannot be adjudicated.
///
/// Every variant is a caller bug: the round should be rejected before
/// anything about it is stored.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidRound {
    /// Fewer than two entries were submitted.
    #[display("A round needs at least 2 participants, got {}", count)]
    TooFewParticipants {
        /// Number of entries actually submitted.
        count: usize,
    },

    /// The same participant appears more than once.
    #[display("Participant '{}' submitted more than one move", _0)]
    DuplicateParticipant(#[error(not(source))] String),

    /// A move value outside rock, paper and scissors.
    #[display("Unknown move '{}' (expected rock, paper or scissors)", _0)]
    UnknownMove(#[error(not(source))] String),
}
