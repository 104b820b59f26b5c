//! Strictly RPS - Unified CLI
//!
//! Round ledger server, roster seeding, and offline round resolution.

#![warn(missing_docs)]

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use strictly_rps::Move;
use strictly_rps_server::{
    AppState, GameRepository, RoundService, ServerConfig, create_router, seed_roster,
};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            db_path,
        } => run_server(&config, host, port, db_path).await,
        Command::Seed { config, db_path } => run_seed(&config, db_path),
        Command::Resolve { entries } => run_resolve(&entries),
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strictly_rps_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Loads config, applies CLI overrides, migrates, and seeds the roster.
#[instrument(skip_all, fields(config_path = %config_path.display()))]
fn prepare(
    config_path: &Path,
    db_path: Option<String>,
) -> Result<(ServerConfig, GameRepository)> {
    let config = ServerConfig::load(config_path)?.with_database_url(db_path);
    config.validate()?;

    let repository = GameRepository::new(config.database_path()?)?;
    repository
        .run_migrations()
        .context("Failed to apply database migrations")?;

    let added = seed_roster(&repository, config.roster().as_slice())?;
    info!(added, roster = config.roster().len(), "Roster ready");

    Ok((config, repository))
}

/// Run the HTTP server
async fn run_server(
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
    db_path: Option<String>,
) -> Result<()> {
    let (config, repository) = prepare(config_path, db_path)?;
    let config = config.with_bind(host, port);

    let service = RoundService::new(
        repository,
        *config.auto_register_players(),
        *config.history_window(),
    );
    let app = create_router(AppState::new(service, config.utc_offset()?));

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port()))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host(), config.port()))?;
    info!("Server ready at http://{}:{}/", config.host(), config.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Migrate and seed only
fn run_seed(config_path: &Path, db_path: Option<String>) -> Result<()> {
    let (_config, repository) = prepare(config_path, db_path)?;
    let players = repository.list_players()?;
    info!(db = %repository.db_path(), players = players.len(), "Database seeded");
    for player in players {
        println!("{:>4}  {}", player.id(), player.name());
    }
    Ok(())
}

/// Resolve a round given on the command line
#[instrument]
fn run_resolve(entries: &[String]) -> Result<()> {
    let parsed = entries
        .iter()
        .map(|entry| -> Result<(String, Move)> {
            let (name, mv) = entry
                .split_once('=')
                .with_context(|| format!("Expected NAME=MOVE, got '{}'", entry))?;
            Ok((name.trim().to_string(), mv.parse::<Move>()?))
        })
        .collect::<Result<Vec<_>>>()?;

    let outcome = strictly_rps::resolve(parsed)?;
    if outcome.is_draw() {
        println!("draw");
    } else {
        let winners: Vec<&str> = outcome.winners().iter().map(String::as_str).collect();
        println!("winners: {}", winners.join(", "));
    }
    Ok(())
}
