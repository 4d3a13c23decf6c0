//! Subcommand bodies.

use readrise_core::model::UserId;
use services::{AppServices, Clock, SeedOutcome, TokenVerifier};

use super::CliError;
use crate::api::{self, AppState};

fn verifier(secret: Option<&str>, clock: Clock) -> Result<Option<TokenVerifier>, CliError> {
    secret
        .filter(|s| !s.is_empty())
        .map(|s| TokenVerifier::new(s.as_bytes(), clock))
        .transpose()
        .map_err(CliError::from)
}

/// Run the HTTP API until Ctrl-C.
///
/// # Errors
///
/// Returns `CliError` if storage cannot be opened or the address cannot be
/// bound.
pub async fn serve(
    db_url: &str,
    secret: Option<&str>,
    host: &str,
    port: u16,
) -> Result<(), CliError> {
    let clock = Clock::System;
    let services = AppServices::new_sqlite(db_url, clock).await?;
    let state = AppState::new(services, verifier(secret, clock)?);
    api::run_server(&format!("{host}:{port}"), state).await?;
    Ok(())
}

/// Write the starter catalog unless one exists (or `force`).
///
/// # Errors
///
/// Returns `CliError` on storage failures.
pub async fn seed(db_url: &str, force: bool) -> Result<(), CliError> {
    let services = AppServices::new_sqlite(db_url, Clock::System).await?;
    match services.content().seed_default(force).await? {
        SeedOutcome::Seeded { levels } => println!("Seeded {levels} levels."),
        SeedOutcome::Skipped { existing } => {
            println!("Catalog already has {existing} levels; use --force to overwrite.");
        }
    }
    Ok(())
}

/// Print every level with its readings.
///
/// # Errors
///
/// Returns `CliError` on storage failures.
pub async fn levels(db_url: &str) -> Result<(), CliError> {
    let services = AppServices::new_sqlite(db_url, Clock::System).await?;
    let levels = services.content().list_levels().await?;
    if levels.is_empty() {
        println!("No levels. Run `readrise seed` first.");
        return Ok(());
    }
    for level in &levels {
        let lock = if level.is_unlocked() { "open" } else { "locked" };
        println!("[{}] {} ({lock})", level.id(), level.title());
        for reading in level.readings() {
            println!(
                "    {:>3}  {:<40} {:<6} {:>3} pts",
                reading.id().value(),
                reading.title(),
                reading.difficulty().label(),
                reading.award_points()
            );
        }
    }
    Ok(())
}

/// Print the leaderboard.
///
/// # Errors
///
/// Returns `CliError` on storage failures.
pub async fn leaderboard(db_url: &str, limit: usize) -> Result<(), CliError> {
    let services = AppServices::new_sqlite(db_url, Clock::System).await?;
    let entries = services.leaderboard().top(limit).await?;
    if entries.is_empty() {
        println!("No players yet.");
    }
    for entry in entries {
        println!(
            "{:>3}. {:<24} {:>6} pts  level {}",
            entry.rank, entry.name, entry.total_points, entry.level
        );
    }
    Ok(())
}

/// Print a signed session token for `user_id`.
///
/// # Errors
///
/// Returns `CliError::MissingSecret` without a secret, or
/// `CliError::UserId` for a blank user id.
pub fn token(secret: Option<&str>, user_id: &str, ttl_secs: Option<i64>) -> Result<(), CliError> {
    let clock = Clock::System;
    let verifier = verifier(secret, clock)?.ok_or(CliError::MissingSecret)?;
    let user_id = UserId::new(user_id)?;
    let expires_at = ttl_secs.map(|ttl| clock.unix_seconds().saturating_add(ttl));
    println!("{}", verifier.issue(&user_id, expires_at));
    Ok(())
}
