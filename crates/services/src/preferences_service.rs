use std::sync::Arc;

use drill_core::model::{Preferences, PreferencesDraft};
use storage::repository::PreferencesRepository;
use tracing::{info, warn};

use crate::error::PreferencesServiceError;
use crate::library::Library;

#[derive(Clone)]
pub struct PreferencesService {
    repo: Arc<dyn PreferencesRepository>,
}

impl PreferencesService {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferencesRepository>) -> Self {
        Self { repo }
    }

    /// Validate `draft` against the current preferences, apply and persist it.
    ///
    /// # Errors
    ///
    /// - `Preferences` if validation fails (nothing is changed)
    /// - `PersistenceWriteFailed` if saving fails; the new values stay active
    pub fn update(
        &self,
        library: &mut Library,
        draft: PreferencesDraft,
    ) -> Result<Preferences, PreferencesServiceError> {
        let preferences = draft.validate(library.preferences())?;
        library.set_preferences(preferences.clone());
        info!(max_cards = preferences.max_cards(), "preferences updated");

        self.repo.save_preferences(&preferences).map_err(|e| {
            warn!(error = %e, "saving preferences failed");
            PreferencesServiceError::PersistenceWriteFailed(e)
        })?;
        Ok(preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::model::PreferencesError;
    use storage::repository::InMemoryRepository;

    #[test]
    fn update_applies_and_persists() {
        let repo = InMemoryRepository::new();
        let svc = PreferencesService::new(Arc::new(repo.clone()));
        let mut library = Library::default();

        let draft = PreferencesDraft {
            max_cards: Some(8),
            dark_mode: Some(true),
            ..PreferencesDraft::new()
        };
        let prefs = svc.update(&mut library, draft).unwrap();

        assert_eq!(library.preferences().max_cards(), 8);
        assert_eq!(repo.load_preferences().unwrap(), Some(prefs));
    }

    #[test]
    fn invalid_draft_leaves_preferences_alone() {
        let repo = InMemoryRepository::new();
        let svc = PreferencesService::new(Arc::new(repo.clone()));
        let mut library = Library::default();

        let err = svc
            .update(
                &mut library,
                PreferencesDraft {
                    max_cards: Some(0),
                    ..PreferencesDraft::new()
                },
            )
            .unwrap_err();

        assert!(matches!(
            err,
            PreferencesServiceError::Preferences(PreferencesError::InvalidMaxCards)
        ));
        assert_eq!(library.preferences(), &Preferences::default());
        assert!(repo.load_preferences().unwrap().is_none());
    }
}
