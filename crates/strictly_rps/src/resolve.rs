//! One-shot round resolution.

use std::fmt::Display;
use std::hash::Hash;

use tracing::instrument;

use crate::{InvalidRound, Move, Outcome, Round};

/// Validates `entries` as a round and returns its winners.
///
/// Stateless and side-effect free: the same input always yields the
/// same outcome, regardless of entry order.
///
/// # Errors
///
/// Returns [`InvalidRound`] for fewer than two entries or a repeated
/// participant. No outcome is produced in that case.
#[instrument(skip(entries))]
pub fn resolve<P>(entries: impl IntoIterator<Item = (P, Move)>) -> Result<Outcome<P>, InvalidRound>
where
    P: Clone + Eq + Hash + Ord + Display,
{
    Ok(Round::new(entries)?.resolve())
}
