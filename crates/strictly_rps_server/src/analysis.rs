//! Win-rate, choice-pattern, and next-move analytics.
//!
//! Everything here is a pure function over the stored choice history,
//! so it can be tested without a database.

use std::collections::BTreeMap;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strictly_rps::Move;
use tracing::{debug, instrument};

use crate::ChoiceRecord;

/// How often a player threw each move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct MoveCounts {
    rock: u32,
    paper: u32,
    scissors: u32,
}

impl MoveCounts {
    /// Counts one more throw of `mv`.
    pub fn record(&mut self, mv: Move) {
        match mv {
            Move::Rock => self.rock += 1,
            Move::Paper => self.paper += 1,
            Move::Scissors => self.scissors += 1,
        }
    }

    /// Count for a single move.
    pub fn get(&self, mv: Move) -> u32 {
        match mv {
            Move::Rock => self.rock,
            Move::Paper => self.paper,
            Move::Scissors => self.scissors,
        }
    }

    /// Total throws counted.
    pub fn total(&self) -> u32 {
        self.rock + self.paper + self.scissors
    }
}

/// Analytics over the whole ledger, keyed by player name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
pub struct Analysis {
    /// Percentage of games won (0.0 to 100.0).
    win_rates: BTreeMap<String, f64>,
    /// Throw counts per move.
    choice_patterns: BTreeMap<String, MoveCounts>,
    /// Predicted next throw.
    predictions: BTreeMap<String, Move>,
}

/// Recent-history statistics for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct PlayerProfile {
    name: String,
    total_games: u32,
    wins: u32,
    /// Fraction of throws per move over the window; sums to 1.
    choice_distribution: BTreeMap<Move, f64>,
    /// Predicted next throw.
    prediction: Move,
}

fn history_of<'a>(
    name: &'a str,
    history: &'a [ChoiceRecord],
) -> impl Iterator<Item = &'a ChoiceRecord> + 'a {
    history.iter().filter(move |c| c.player_name() == name)
}

/// Percentage of games each player won. Players with no games get 0.
#[instrument(skip_all, fields(players = players.len(), choices = history.len()))]
pub fn win_rates<S: AsRef<str>>(players: &[S], history: &[ChoiceRecord]) -> BTreeMap<String, f64> {
    players
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let (played, won) = history_of(name, history).fold((0u32, 0u32), |(p, w), c| {
                (p + 1, w + u32::from(*c.is_winner()))
            });
            let rate = if played == 0 {
                0.0
            } else {
                f64::from(won) / f64::from(played) * 100.0
            };
            debug!(player = %name, played, won, rate, "Win rate computed");
            (name.to_string(), rate)
        })
        .collect()
}

/// How many times each player threw each move.
#[instrument(skip_all, fields(players = players.len(), choices = history.len()))]
pub fn choice_patterns<S: AsRef<str>>(
    players: &[S],
    history: &[ChoiceRecord],
) -> BTreeMap<String, MoveCounts> {
    players
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let mut counts = MoveCounts::default();
            for choice in history_of(name, history) {
                counts.record(*choice.choice());
            }
            (name.to_string(), counts)
        })
        .collect()
}

/// Predicts a player's next throw from their last one.
///
/// Assumes the player repeats, and answers with the move that beats
/// their most recent throw. With no history the prediction is rock.
#[instrument(skip(history))]
pub fn predict_next(name: &str, history: &[ChoiceRecord]) -> Move {
    history_of(name, history)
        .max_by_key(|c| *c.game_id())
        .map(|c| c.choice().counter())
        .unwrap_or(Move::Rock)
}

/// Next-throw prediction for every player.
#[instrument(skip_all, fields(players = players.len()))]
pub fn predictions<S: AsRef<str>>(players: &[S], history: &[ChoiceRecord]) -> BTreeMap<String, Move> {
    players
        .iter()
        .map(|name| (name.as_ref().to_string(), predict_next(name.as_ref(), history)))
        .collect()
}

/// Full analytics for the roster. Empty when no games have been played.
#[instrument(skip_all, fields(players = players.len(), choices = history.len()))]
pub fn analyze<S: AsRef<str>>(players: &[S], history: &[ChoiceRecord]) -> Analysis {
    if history.is_empty() {
        debug!("No games recorded, returning empty analysis");
        return Analysis::default();
    }

    Analysis {
        win_rates: win_rates(players, history),
        choice_patterns: choice_patterns(players, history),
        predictions: predictions(players, history),
    }
}

/// Statistics over a player's `window` most recent throws.
///
/// Returns `None` when the player has never played.
#[instrument(skip(history))]
pub fn player_profile(name: &str, history: &[ChoiceRecord], window: usize) -> Option<PlayerProfile> {
    let mut recent: Vec<&ChoiceRecord> = history_of(name, history).collect();
    if recent.is_empty() {
        return None;
    }
    recent.sort_by_key(|c| *c.game_id());
    let recent = &recent[recent.len().saturating_sub(window)..];

    let mut counts = MoveCounts::default();
    let mut wins = 0u32;
    for choice in recent {
        counts.record(*choice.choice());
        wins += u32::from(*choice.is_winner());
    }

    let total = counts.total();
    let choice_distribution = Move::ALL
        .into_iter()
        .filter(|mv| counts.get(*mv) > 0)
        .map(|mv| (mv, f64::from(counts.get(mv)) / f64::from(total)))
        .collect();

    let prediction = recent
        .last()
        .map(|c| c.choice().counter())
        .unwrap_or(Move::Rock);

    Some(PlayerProfile {
        name: name.to_string(),
        total_games: total,
        wins,
        choice_distribution,
        prediction,
    })
}
