//! Round submission and query business logic.

use chrono::Utc;
use derive_getters::Getters;
use derive_more::{Display, Error, From};
use derive_new::new;
use serde::{Deserialize, Serialize};
use strictly_rps::{InvalidRound, Move, Round};
use tracing::{debug, info, instrument, warn};

use crate::analysis::{self, Analysis, PlayerProfile};
use crate::{DbError, GameRecord, GameRepository, Player};

/// One player's throw as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new, Getters)]
pub struct ChoiceSubmission {
    player_name: String,
    /// Raw move text; parsed and validated on submission.
    choice: String,
}

/// Reasons a service call can fail.
#[derive(Debug, Clone, Display, Error, From)]
pub enum ServiceError {
    /// The submitted round is malformed.
    #[display("Invalid round: {}", _0)]
    InvalidRound(InvalidRound),

    /// A participant is not on the roster and auto-registration is off.
    #[display("Unknown player '{}'", _0)]
    #[from(skip)]
    UnknownPlayer(#[error(not(source))] String),

    /// No game with this id.
    #[display("Game {} not found", _0)]
    #[from(skip)]
    GameNotFound(#[error(not(source))] i32),

    /// The player has no recorded games.
    #[display("No history for player '{}'", _0)]
    #[from(skip)]
    PlayerNotFound(#[error(not(source))] String),

    /// Storage failure.
    #[display("{}", _0)]
    Db(DbError),
}

/// Service layer for recording and querying rounds.
///
/// Wraps [`GameRepository`] with round validation, resolution, roster
/// policy, and analytics.
#[derive(Debug, Clone)]
pub struct RoundService {
    repository: GameRepository,
    auto_register_players: bool,
    history_window: usize,
}

impl RoundService {
    /// Creates a new round service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: GameRepository, auto_register_players: bool, history_window: usize) -> Self {
        info!("Creating RoundService");
        Self {
            repository,
            auto_register_players,
            history_window,
        }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &GameRepository {
        &self.repository
    }

    /// Validates, resolves, and records a round.
    ///
    /// The move list is frozen into a [`Round`] before resolution. Every
    /// check that can reject runs before the first write, and new players,
    /// the game, and its winner flags are stored in one transaction. A
    /// rejected round writes nothing, not even a roster entry.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRound`] for unknown moves, fewer than
    /// two players, or a repeated player; [`ServiceError::UnknownPlayer`]
    /// when auto-registration is off; [`ServiceError::Db`] on storage failure.
    #[instrument(skip(self, submission), fields(participants = submission.len()))]
    pub fn submit_round(&self, submission: &[ChoiceSubmission]) -> Result<GameRecord, ServiceError> {
        let entries = submission
            .iter()
            .map(|s| -> Result<(String, Move), InvalidRound> {
                Ok((s.player_name.trim().to_string(), s.choice.parse()?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let round = Round::new(entries)?;
        let outcome = round.resolve();
        debug!(winners = ?outcome.winners(), draw = outcome.is_draw(), "Round adjudicated");

        self.check_players(round.entries().iter().map(|(name, _)| name.as_str()))?;

        let entries: Vec<(String, Move, bool)> = round
            .entries()
            .iter()
            .map(|(name, mv)| (name.clone(), *mv, outcome.contains(name)))
            .collect();

        let record = self
            .repository
            .record_round(Utc::now().naive_utc(), &entries)?;
        info!(game_id = record.game().id(), "Round recorded");
        Ok(record)
    }

    /// Rejects blank names and, unless auto-registration is on, names not
    /// on the roster. Reads only.
    fn check_players<'a>(&self, names: impl Iterator<Item = &'a str>) -> Result<(), ServiceError> {
        for name in names {
            if name.is_empty() {
                warn!("Rejected submission with a blank player name");
                return Err(ServiceError::UnknownPlayer(String::new()));
            }
            if !self.auto_register_players && self.repository.get_player_by_name(name)?.is_none() {
                warn!(name = %name, "Rejected submission from unknown player");
                return Err(ServiceError::UnknownPlayer(name.to_string()));
            }
        }
        Ok(())
    }

    /// All roster players.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] on storage failure.
    #[instrument(skip(self))]
    pub fn list_players(&self) -> Result<Vec<Player>, ServiceError> {
        Ok(self.repository.list_players()?)
    }

    /// All games, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] on storage failure.
    #[instrument(skip(self))]
    pub fn list_games(&self) -> Result<Vec<GameRecord>, ServiceError> {
        Ok(self.repository.list_games()?)
    }

    /// Deletes one game.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::GameNotFound`] if it does not exist.
    #[instrument(skip(self))]
    pub fn delete_game(&self, game_id: i32) -> Result<(), ServiceError> {
        if self.repository.delete_game(game_id)? {
            Ok(())
        } else {
            Err(ServiceError::GameNotFound(game_id))
        }
    }

    /// Deletes every game, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] on storage failure.
    #[instrument(skip(self))]
    pub fn delete_all_games(&self) -> Result<usize, ServiceError> {
        Ok(self.repository.delete_all_games()?)
    }

    /// Win rates, choice patterns, and predictions for the roster.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] on storage failure.
    #[instrument(skip(self))]
    pub fn analysis(&self) -> Result<Analysis, ServiceError> {
        if self.repository.count_games()? == 0 {
            return Ok(Analysis::default());
        }

        let names: Vec<String> = self
            .repository
            .list_players()?
            .into_iter()
            .map(|p| p.name().clone())
            .collect();
        let history = self.repository.list_choice_history()?;
        Ok(analysis::analyze(&names, &history))
    }

    /// Recent-history statistics for one player.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PlayerNotFound`] if they have never played.
    #[instrument(skip(self))]
    pub fn player_profile(&self, name: &str) -> Result<PlayerProfile, ServiceError> {
        let history = self.repository.list_choice_history()?;
        analysis::player_profile(name, &history, self.history_window)
            .ok_or_else(|| ServiceError::PlayerNotFound(name.to_string()))
    }
}
