//! Database repository for the roster and recorded rounds.

use chrono::NaiveDateTime;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use strictly_rps::Move;
use tracing::{debug, info, instrument};

use crate::db::{
    ChoiceRecord, DbError, DbErrorKind, Game, GameRecord, NewChoice, NewGame, NewPlayer, Player, PlayerChoice,
    schema,
};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository for player and game operations.
///
/// Holds only the database path. Every operation opens its own
/// connection and drops it before returning, so a repository can be
/// cloned freely across request handlers.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// Use a temporary file in tests; `":memory:"` gives every connection
    /// its own empty database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::with_kind(DbErrorKind::Connection, "Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Path this repository connects to.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| {
                DbError::with_kind(
                    DbErrorKind::Connection,
                    format!("Failed to connect to '{}': {}", self.db_path, e),
                )
            })?;

        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}; PRAGMA foreign_keys = ON;"
        ))?;
        Ok(conn)
    }

    /// Applies any pending schema migrations. Returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn.run_pending_migrations(MIGRATIONS)?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    /// Creates a new player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the name is already taken or a database error occurs.
    #[instrument(skip(self))]
    pub fn create_player(&self, name: &str) -> Result<Player, DbError> {
        debug!(name = %name, "Creating player");
        let mut conn = self.connection()?;

        let player = diesel::insert_into(schema::players::table)
            .values(&NewPlayer::new(name.to_string()))
            .returning(Player::as_returning())
            .get_result(&mut conn)?;

        info!(player_id = player.id(), name = %player.name(), "Player created");
        Ok(player)
    }

    /// Gets a player by name. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_player_by_name(&self, name: &str) -> Result<Option<Player>, DbError> {
        let mut conn = self.connection()?;
        Self::find_player(&mut conn, name)
    }

    fn find_player(conn: &mut SqliteConnection, name: &str) -> Result<Option<Player>, DbError> {
        let player = schema::players::table
            .filter(schema::players::name.eq(name))
            .select(Player::as_select())
            .first(conn)
            .optional()?;

        debug!(name = %name, found = player.is_some(), "Player lookup");
        Ok(player)
    }

    /// Returns the named player, inserting them first if absent.
    ///
    /// Safe against a concurrent insert of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn ensure_player(&self, name: &str) -> Result<(Player, bool), DbError> {
        let mut conn = self.connection()?;
        Self::ensure_player_on(&mut conn, name)
    }

    fn ensure_player_on(conn: &mut SqliteConnection, name: &str) -> Result<(Player, bool), DbError> {
        let inserted = diesel::insert_into(schema::players::table)
            .values(&NewPlayer::new(name.to_string()))
            .on_conflict_do_nothing()
            .execute(conn)?;

        let player = Self::find_player(conn, name)?
            .ok_or_else(|| DbError::new(format!("Player '{}' vanished after insert", name)))?;

        if inserted > 0 {
            info!(player_id = player.id(), name = %name, "Player registered");
        }
        Ok((player, inserted > 0))
    }

    /// Lists all players in roster order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_players(&self) -> Result<Vec<Player>, DbError> {
        let mut conn = self.connection()?;

        let players = schema::players::table
            .order(schema::players::id.asc())
            .select(Player::as_select())
            .load(&mut conn)?;

        debug!(count = players.len(), "Players loaded");
        Ok(players)
    }

    /// Records a resolved round and all of its choices atomically.
    ///
    /// `choices` pairs each player with their move and whether they won.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any insert fails; nothing is written then.
    #[instrument(skip(self, choices), fields(participants = choices.len()))]
    pub fn record_game(
        &self,
        played_at: NaiveDateTime,
        choices: &[(Player, Move, bool)],
    ) -> Result<GameRecord, DbError> {
        let mut conn = self.connection()?;
        let record = conn
            .transaction::<_, DbError, _>(|conn| Self::insert_game(conn, played_at, choices))?;

        info!(
            game_id = record.game().id(),
            winners = ?record.winners(),
            "Game recorded"
        );
        Ok(record)
    }

    /// Records a resolved round keyed by player name, registering any
    /// name not yet on the roster.
    ///
    /// New players and the game land in one transaction: if any write
    /// fails, no player, game or choice row is left behind.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any insert fails; nothing is written then.
    #[instrument(skip(self, entries), fields(participants = entries.len()))]
    pub fn record_round(
        &self,
        played_at: NaiveDateTime,
        entries: &[(String, Move, bool)],
    ) -> Result<GameRecord, DbError> {
        let mut conn = self.connection()?;

        let record = conn.transaction::<_, DbError, _>(|conn| {
            let choices = entries
                .iter()
                .map(|(name, mv, won)| -> Result<(Player, Move, bool), DbError> {
                    let (player, _) = Self::ensure_player_on(conn, name)?;
                    Ok((player, *mv, *won))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Self::insert_game(conn, played_at, &choices)
        })?;

        info!(
            game_id = record.game().id(),
            winners = ?record.winners(),
            "Round recorded"
        );
        Ok(record)
    }

    fn insert_game(
        conn: &mut SqliteConnection,
        played_at: NaiveDateTime,
        choices: &[(Player, Move, bool)],
    ) -> Result<GameRecord, DbError> {
        let game: Game = diesel::insert_into(schema::games::table)
            .values(&NewGame::new(played_at))
            .returning(Game::as_returning())
            .get_result(conn)?;

        let rows: Vec<NewChoice> = choices
            .iter()
            .map(|(player, mv, won)| {
                NewChoice::new(*game.id(), *player.id(), mv.as_str().to_string(), *won)
            })
            .collect();

        diesel::insert_into(schema::player_choices::table)
            .values(&rows)
            .execute(conn)?;

        let records = choices
            .iter()
            .map(|(player, mv, won)| ChoiceRecord::new(*game.id(), player.name().clone(), *mv, *won))
            .collect();

        Ok(GameRecord::new(game, records))
    }

    /// Lists every game with its choices, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or a stored choice is corrupt.
    #[instrument(skip(self))]
    pub fn list_games(&self) -> Result<Vec<GameRecord>, DbError> {
        let mut conn = self.connection()?;

        let games: Vec<Game> = schema::games::table
            .order(schema::games::id.desc())
            .select(Game::as_select())
            .load(&mut conn)?;

        let records = Self::attach_choices(&mut conn, games)?;
        debug!(count = records.len(), "Games loaded");
        Ok(records)
    }

    /// Gets one game with its choices.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: i32) -> Result<Option<GameRecord>, DbError> {
        let mut conn = self.connection()?;

        let game: Option<Game> = schema::games::table
            .find(game_id)
            .select(Game::as_select())
            .first(&mut conn)
            .optional()?;

        match game {
            Some(game) => Ok(Self::attach_choices(&mut conn, vec![game])?.pop()),
            None => Ok(None),
        }
    }

    fn attach_choices(
        conn: &mut SqliteConnection,
        games: Vec<Game>,
    ) -> Result<Vec<GameRecord>, DbError> {
        let rows: Vec<(PlayerChoice, Player)> = PlayerChoice::belonging_to(&games)
            .inner_join(schema::players::table)
            .order(schema::player_choices::id.asc())
            .select((PlayerChoice::as_select(), Player::as_select()))
            .load(conn)?;

        let grouped = rows.grouped_by(&games);

        games
            .into_iter()
            .zip(grouped)
            .map(|(game, rows)| {
                let choices = rows
                    .iter()
                    .map(|(row, player)| ChoiceRecord::from_row(row, player))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GameRecord::new(game, choices))
            })
            .collect()
    }

    /// Deletes a game and its choices. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_game(&self, game_id: i32) -> Result<bool, DbError> {
        let mut conn = self.connection()?;

        let deleted = conn.transaction::<_, DbError, _>(|conn| {
            diesel::delete(
                schema::player_choices::table.filter(schema::player_choices::game_id.eq(game_id)),
            )
            .execute(conn)?;
            Ok(diesel::delete(schema::games::table.find(game_id)).execute(conn)?)
        })?;

        info!(game_id, deleted = deleted > 0, "Game delete");
        Ok(deleted > 0)
    }

    /// Deletes every game and choice. Players are kept.
    ///
    /// Returns the number of games removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_all_games(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;

        let deleted = conn.transaction::<_, DbError, _>(|conn| {
            diesel::delete(schema::player_choices::table).execute(conn)?;
            Ok(diesel::delete(schema::games::table).execute(conn)?)
        })?;

        info!(count = deleted, "All games deleted");
        Ok(deleted)
    }

    /// Counts recorded games.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_games(&self) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        Ok(schema::games::table.count().get_result(&mut conn)?)
    }

    /// Every stored choice with its player's name, oldest game first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or a stored choice is corrupt.
    #[instrument(skip(self))]
    pub fn list_choice_history(&self) -> Result<Vec<ChoiceRecord>, DbError> {
        let mut conn = self.connection()?;

        let rows: Vec<(PlayerChoice, Player)> = schema::player_choices::table
            .inner_join(schema::players::table)
            .order((
                schema::player_choices::game_id.asc(),
                schema::player_choices::id.asc(),
            ))
            .select((PlayerChoice::as_select(), Player::as_select()))
            .load(&mut conn)?;

        let history = rows
            .iter()
            .map(|(row, player)| ChoiceRecord::from_row(row, player))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = history.len(), "Choice history loaded");
        Ok(history)
    }
}
