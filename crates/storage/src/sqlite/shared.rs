//! Process-wide `SQLite` handle.
//!
//! The pool is created on first use and reused afterwards. Concurrent first
//! callers wait on the same initialization; if it fails the cell stays empty
//! and the next caller tries again.

use tokio::sync::OnceCell;

use super::{SqliteInitError, SqliteRepository};

static SHARED: OnceCell<(String, SqliteRepository)> = OnceCell::const_new();

/// Return the shared repository, connecting and migrating on first use.
///
/// The first successful caller's URL wins; later calls with a different URL
/// get the existing pool and a warning.
///
/// # Errors
///
/// Returns `SqliteInitError` if connecting or migrating fails.
pub async fn shared_repository(
    database_url: &str,
) -> Result<&'static SqliteRepository, SqliteInitError> {
    let (url, repo) = SHARED
        .get_or_try_init(|| async {
            let repo = SqliteRepository::connect(database_url).await?;
            repo.migrate().await?;
            tracing::info!(database_url, "shared sqlite pool initialized");
            Ok::<_, SqliteInitError>((database_url.to_owned(), repo))
        })
        .await?;

    if url != database_url {
        tracing::warn!(
            requested = database_url,
            active = url.as_str(),
            "shared sqlite pool already bound to another database"
        );
    }
    Ok(repo)
}
