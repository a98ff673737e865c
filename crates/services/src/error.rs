//! Shared error types for the services crate.

use thiserror::Error;

use drill_core::model::{CardError, PreferencesError, StoreError};
use drill_core::scheduler::SchedulerError;
use drill_core::session::SessionError;
use storage::repository::StorageError;

/// Errors emitted by `CardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CardServiceError {
    #[error(transparent)]
    Card(#[from] CardError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Reading an import file failed; nothing was changed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The in-memory change was kept but could not be saved.
    #[error("change kept in memory but not saved: {0}")]
    PersistenceWriteFailed(#[source] StorageError),
}

/// Errors emitted by `SessionLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionLoopError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The answer was applied in memory but could not be saved. The session
    /// can continue; `ReviewSession::last_outcome` holds the result.
    #[error("answer recorded but not saved: {0}")]
    PersistenceWriteFailed(#[source] StorageError),
}

/// Errors emitted by `PreferencesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreferencesServiceError {
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
    #[error("preferences updated but not saved: {0}")]
    PersistenceWriteFailed(#[source] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Writing the starter cards on first launch failed.
    #[error("could not seed starter cards: {0}")]
    Seed(#[from] CardServiceError),
}
