use std::path::PathBuf;
use std::sync::Arc;

use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::card_service::CardService;
use crate::error::AppServicesError;
use crate::library::Library;
use crate::preferences_service::PreferencesService;
use crate::sessions::SessionLoopService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    clock: Clock,
    card_service: Arc<CardService>,
    session_loop: Arc<SessionLoopService>,
    preferences: Arc<PreferencesService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: Storage, clock: Clock) -> Self {
        let card_service = Arc::new(CardService::new(Arc::clone(&storage.cards)));
        let session_loop = Arc::new(SessionLoopService::new(
            clock,
            Arc::clone(&storage.cards),
            Arc::clone(&storage.stats),
        ));
        let preferences = Arc::new(PreferencesService::new(Arc::clone(&storage.preferences)));

        Self {
            storage,
            clock,
            card_service,
            session_loop,
            preferences,
        }
    }

    /// Build services backed by JSON documents under `root`.
    #[must_use]
    pub fn json(root: impl Into<PathBuf>, clock: Clock) -> Self {
        Self::new(Storage::json(root), clock)
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(Storage::in_memory(), clock)
    }

    /// Load the library from storage.
    ///
    /// On first launch, when no card list was ever stored, the sample cards
    /// are added and saved.
    ///
    /// # Errors
    ///
    /// - `Storage` if a repository cannot be read
    /// - `Seed` if the first-launch card list cannot be written
    pub fn load_library(&self) -> Result<Library, AppServicesError> {
        let first_launch = !self.storage.cards.has_card_list()?;
        let mut library = Library::load(&self.storage)?;
        if first_launch {
            let report = self.card_service.seed_samples(&mut library)?;
            info!(added = report.added, "first launch, sample cards written");
        }
        Ok(library)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn card_service(&self) -> Arc<CardService> {
        Arc::clone(&self.card_service)
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn preferences(&self) -> Arc<PreferencesService> {
        Arc::clone(&self.preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CardServiceError;
    use drill_core::model::CardDraft;
    use drill_core::time::fixed_today;
    use storage::repository::{CardRepository, InMemoryRepository};

    fn services_over(repo: &InMemoryRepository) -> AppServices {
        AppServices::new(
            Storage::from_backend(repo.clone()),
            Clock::fixed(fixed_today()),
        )
    }

    #[test]
    fn first_launch_writes_sample_cards() {
        let repo = InMemoryRepository::new();
        let services = services_over(&repo);

        let library = services.load_library().unwrap();
        assert_eq!(library.store().len(), 2);
        assert!(library.store().contains("Haus"));
        assert_eq!(repo.load_cards().unwrap().len(), 2);
    }

    #[test]
    fn stored_list_is_not_reseeded() {
        let baum = CardDraft::new("Baum", "tree", "A2").validate().unwrap();
        let repo = InMemoryRepository::with_cards(vec![baum]);
        let services = services_over(&repo);

        let library = services.load_library().unwrap();
        assert_eq!(library.store().len(), 1);
        assert!(!library.store().contains("Haus"));
    }

    #[test]
    fn failed_first_launch_write_is_reported() {
        let repo = InMemoryRepository::new();
        repo.set_reject_writes(true);
        let services = services_over(&repo);

        assert!(matches!(
            services.load_library(),
            Err(AppServicesError::Seed(CardServiceError::PersistenceWriteFailed(_)))
        ));
    }
}
