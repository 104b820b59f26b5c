//! Roster seeding.

use tracing::{info, instrument};

use crate::{DbError, GameRepository};

/// Inserts every name in `names` that is not yet a player.
///
/// Existing players are left alone, so running this on every startup is
/// harmless. Returns how many players were added.
///
/// # Errors
///
/// Returns [`DbError`] if a database error occurs.
#[instrument(skip(repository, names), fields(requested = names.len()))]
pub fn seed_roster<S: AsRef<str>>(repository: &GameRepository, names: &[S]) -> Result<usize, DbError> {
    let mut added = 0;
    for name in names {
        let (_, created) = repository.ensure_player(name.as_ref().trim())?;
        if created {
            added += 1;
        }
    }

    info!(added, "Roster seeded");
    Ok(added)
}
