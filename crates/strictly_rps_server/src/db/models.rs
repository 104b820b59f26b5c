//! Database models and the records built from them.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use strictly_rps::Move;
use tracing::instrument;

use crate::db::{DbError, DbErrorKind, schema};

/// Roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::players)]
pub struct Player {
    id: i32,
    name: String,
    created_at: NaiveDateTime,
}

/// Insertable player for roster seeding and auto-registration.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer {
    name: String,
}

/// One adjudicated round.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct Game {
    id: i32,
    /// Server time the round was submitted, in UTC.
    played_at: NaiveDateTime,
    created_at: NaiveDateTime,
}

/// Insertable game row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    played_at: NaiveDateTime,
}

/// A player's throw in one game, as stored.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::player_choices)]
#[diesel(belongs_to(Game))]
#[diesel(belongs_to(Player))]
pub struct PlayerChoice {
    id: i32,
    game_id: i32,
    player_id: i32,
    choice: String,
    is_winner: bool,
    created_at: NaiveDateTime,
}

impl PlayerChoice {
    /// Parses the stored choice string into a [`Move`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds something other than a move.
    #[instrument(skip(self), fields(choice = %self.choice))]
    pub fn parse_choice(&self) -> Result<Move, DbError> {
        self.choice
            .parse()
            .map_err(|e| DbError::with_kind(DbErrorKind::Corrupt, format!("Choice row {}: {}", self.id, e)))
    }
}

/// Insertable choice row.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::player_choices)]
pub struct NewChoice {
    game_id: i32,
    player_id: i32,
    choice: String,
    is_winner: bool,
}

/// A stored choice joined with its player's name.
///
/// This is the unit the analytics work over.
#[derive(Debug, Clone, PartialEq, Eq, new, Getters)]
pub struct ChoiceRecord {
    game_id: i32,
    player_name: String,
    choice: Move,
    is_winner: bool,
}

impl ChoiceRecord {
    /// Builds a record from a stored row and its player.
    #[instrument(skip_all, fields(choice_id = row.id()))]
    pub fn from_row(row: &PlayerChoice, player: &Player) -> Result<Self, DbError> {
        Ok(Self::new(
            *row.game_id(),
            player.name().clone(),
            row.parse_choice()?,
            *row.is_winner(),
        ))
    }
}

/// A game with all of its choices, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, new, Getters)]
pub struct GameRecord {
    game: Game,
    choices: Vec<ChoiceRecord>,
}

impl GameRecord {
    /// Names of the winning players. Empty for a draw.
    pub fn winners(&self) -> Vec<&str> {
        self.choices
            .iter()
            .filter(|c| *c.is_winner())
            .map(|c| c.player_name().as_str())
            .collect()
    }
}
