//! Shared error types for the services crate.

use thiserror::Error;

use readrise_core::model::{CatalogError, StatsError};
use readrise_core::{NavigationError, ProgressionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PlayService`.
///
/// `Progression` and `Navigation` are user-correctable and leave the session
/// untouched. `Storage` means the new progress was not persisted, so it was not
/// applied either.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayError {
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Why a session token was not accepted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("token secret must not be empty")]
    InvalidSecret,
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("token header or claims are not valid base64url JSON")]
    Decode,
    #[error("unsupported token algorithm {0}")]
    UnsupportedAlgorithm(String),
    #[error("token signature does not match")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token carries no usable subject")]
    MissingSubject,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Content(#[from] ContentServiceError),
}
