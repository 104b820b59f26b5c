//! Database persistence layer for players, games, and their choices.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{ChoiceRecord, Game, GameRecord, NewChoice, NewGame, NewPlayer, Player, PlayerChoice};
pub use repository::{GameRepository, MIGRATIONS};
