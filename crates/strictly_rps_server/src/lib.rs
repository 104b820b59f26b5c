//! Strictly RPS server - a ledger of rock-paper-scissors rounds.
//!
//! Players on a fixed roster submit rounds; each round is resolved with
//! [`strictly_rps::resolve`] semantics, stored, and fed into simple
//! win-rate and choice-pattern analytics.
//!
//! # Architecture
//!
//! - **db**: Diesel/SQLite repository for players, games, and choices
//! - **roster**: Startup seeding of the configured players
//! - **service**: Round submission and queries
//! - **analysis**: Pure analytics over the stored history
//! - **http**: Axum REST API
//! - **config**: TOML + environment configuration
//!
//! # Example
//!
//! ```no_run
//! use strictly_rps_server::{ChoiceSubmission, GameRepository, RoundService};
//!
//! # fn example() -> anyhow::Result<()> {
//! let repo = GameRepository::new("rps_game.db".to_string())?;
//! repo.run_migrations()?;
//!
//! let service = RoundService::new(repo, true, 100);
//! let record = service.submit_round(&[
//!     ChoiceSubmission::new("alice".to_string(), "rock".to_string()),
//!     ChoiceSubmission::new("bob".to_string(), "scissors".to_string()),
//! ])?;
//! assert_eq!(record.winners(), vec!["alice"]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod db;
mod roster;

pub mod analysis;
pub mod http;
pub mod service;

// Crate-level exports - Configuration
pub use config::{ConfigError, DEFAULT_ROSTER, ServerConfig};

// Crate-level exports - Persistence
pub use db::{
    ChoiceRecord, DbError, DbErrorKind, Game, GameRecord, GameRepository, MIGRATIONS, NewChoice, NewGame,
    NewPlayer, Player, PlayerChoice,
};

// Crate-level exports - Roster
pub use roster::seed_roster;

// Crate-level exports - Service layer
pub use analysis::{Analysis, MoveCounts, PlayerProfile};
pub use http::{AppState, create_router};
pub use service::{ChoiceSubmission, RoundService, ServiceError};
