//! Validated rounds and their outcomes.

use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{InvalidRound, Move};

/// Smallest number of participants a round may have.
pub const MIN_PARTICIPANTS: usize = 2;

/// One batch of simultaneous throws, validated on construction.
///
/// Participant ids are unique and there are at least
/// [`MIN_PARTICIPANTS`] of them. A round cannot be changed once built,
/// so resolving it always sees the final move set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Round<P> {
    entries: Vec<(P, Move)>,
}

impl<P> Round<P>
where
    P: Clone + Eq + Hash + Ord + Display,
{
    /// Validates `entries` into a round.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRound::TooFewParticipants`] for fewer than two
    /// entries and [`InvalidRound::DuplicateParticipant`] when a
    /// participant repeats.
    #[instrument(skip(entries))]
    pub fn new(entries: impl IntoIterator<Item = (P, Move)>) -> Result<Self, InvalidRound> {
        let entries: Vec<(P, Move)> = entries.into_iter().collect();

        if entries.len() < MIN_PARTICIPANTS {
            return Err(InvalidRound::TooFewParticipants {
                count: entries.len(),
            });
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for (participant, _) in &entries {
            if !seen.insert(participant) {
                return Err(InvalidRound::DuplicateParticipant(participant.to_string()));
            }
        }

        debug!(participants = entries.len(), "Round validated");
        Ok(Self { entries })
    }

    /// Entries in submission order.
    pub fn entries(&self) -> &[(P, Move)] {
        &self.entries
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; a valid round has at least two entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The move each participant threw, if they are in this round.
    pub fn move_of(&self, participant: &P) -> Option<Move> {
        self.entries
            .iter()
            .find(|(p, _)| p == participant)
            .map(|(_, mv)| *mv)
    }

    /// The move that wins this round, or `None` for a draw.
    ///
    /// A single distinct move is a draw. All three moves present is
    /// also a draw, since each one is beaten by another. With exactly
    /// two distinct moves one of them dominates.
    #[instrument(skip(self))]
    pub fn winning_move(&self) -> Option<Move> {
        let distinct: BTreeSet<Move> = self.entries.iter().map(|(_, mv)| *mv).collect();
        let mut moves = distinct.into_iter();

        match (moves.next(), moves.next(), moves.next()) {
            (Some(a), Some(b), None) => Some(if a.beats(b) { a } else { b }),
            _ => None,
        }
    }

    /// Adjudicates the round.
    #[instrument(skip(self), fields(participants = self.entries.len()))]
    pub fn resolve(&self) -> Outcome<P> {
        let winners = match self.winning_move() {
            Some(winning) => self
                .entries
                .iter()
                .filter(|(_, mv)| *mv == winning)
                .map(|(p, _)| p.clone())
                .collect(),
            None => BTreeSet::new(),
        };

        debug!(winners = winners.len(), "Round resolved");
        Outcome { winners }
    }
}

/// The winners of a round. Empty means a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<P: Ord> {
    winners: BTreeSet<P>,
}

impl<P: Ord> Outcome<P> {
    /// Winning participants, in sorted order.
    pub fn winners(&self) -> &BTreeSet<P> {
        &self.winners
    }

    /// Consumes the outcome, returning the winner set.
    pub fn into_winners(self) -> BTreeSet<P> {
        self.winners
    }

    /// `true` when nobody won.
    pub fn is_draw(&self) -> bool {
        self.winners.is_empty()
    }

    /// `true` if `participant` is among the winners.
    pub fn contains(&self, participant: &P) -> bool {
        self.winners.contains(participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_single_entry() {
        let result = Round::new([("a", Move::Rock)]);
        assert_eq!(result, Err(InvalidRound::TooFewParticipants { count: 1 }));
    }

    #[test]
    fn test_new_rejects_empty() {
        let result = Round::<&str>::new([]);
        assert_eq!(result, Err(InvalidRound::TooFewParticipants { count: 0 }));
    }

    #[test]
    fn test_new_rejects_duplicate() {
        let result = Round::new([("a", Move::Rock), ("b", Move::Paper), ("a", Move::Paper)]);
        assert_eq!(result, Err(InvalidRound::DuplicateParticipant("a".to_string())));
    }

    #[test]
    fn test_winning_move_two_distinct() {
        let round = Round::new([("a", Move::Paper), ("b", Move::Scissors)]).unwrap();
        assert_eq!(round.winning_move(), Some(Move::Scissors));
    }

    #[test]
    fn test_winning_move_none_for_three_distinct() {
        let round =
            Round::new([("a", Move::Paper), ("b", Move::Scissors), ("c", Move::Rock)]).unwrap();
        assert_eq!(round.winning_move(), None);
    }

    #[test]
    fn test_move_of() {
        let round = Round::new([("a", Move::Paper), ("b", Move::Scissors)]).unwrap();
        assert_eq!(round.move_of(&"b"), Some(Move::Scissors));
        assert_eq!(round.move_of(&"z"), None);
        assert_eq!(round.len(), 2);
        assert!(!round.is_empty());
    }

    #[test]
    fn test_outcome_is_subset_of_participants() {
        let round = Round::new([
            ("a", Move::Rock),
            ("b", Move::Rock),
            ("c", Move::Scissors),
            ("d", Move::Scissors),
        ])
        .unwrap();
        let outcome = round.resolve();
        for winner in outcome.winners() {
            assert!(round.move_of(winner).is_some());
        }
        assert_eq!(outcome.into_winners(), BTreeSet::from(["a", "b"]));
    }
}
