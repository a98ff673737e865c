use std::path::Path;
use std::sync::Arc;

use drill_core::model::{CardDraft, CardError, ImportReport};
use storage::repository::CardRepository;
use storage::{read_cards_file, write_cards_file};
use tracing::{info, warn};

use crate::error::CardServiceError;
use crate::library::Library;

/// Orchestrates card creation, favorites, import/export and persistence.
///
/// Every mutation is flushed immediately. When the flush fails the change
/// stays in the library and `PersistenceWriteFailed` is returned.
#[derive(Clone)]
pub struct CardService {
    cards: Arc<dyn CardRepository>,
}

impl CardService {
    #[must_use]
    pub fn new(cards: Arc<dyn CardRepository>) -> Self {
        Self { cards }
    }

    /// Validate a draft, add it to the store and persist the card list.
    ///
    /// Returns the store position of the new card.
    ///
    /// # Errors
    ///
    /// - `Card` for validation failures
    /// - `Store` if the german term already exists
    /// - `PersistenceWriteFailed` if the card list cannot be saved
    pub fn add_card(
        &self,
        library: &mut Library,
        draft: CardDraft,
    ) -> Result<usize, CardServiceError> {
        let card = draft.validate()?;
        let german = card.german().to_owned();
        let position = library.store_mut().add(card)?;
        info!(%german, position, "card added");
        self.flush(library)?;
        Ok(position)
    }

    /// Flip the favorite flag of a card by its german term.
    ///
    /// # Errors
    ///
    /// - `Store` for an unknown term
    /// - `PersistenceWriteFailed` if the card list cannot be saved
    pub fn toggle_favorite(
        &self,
        library: &mut Library,
        german: &str,
    ) -> Result<bool, CardServiceError> {
        let favorite = library.store_mut().toggle_favorite(german)?;
        self.flush(library)?;
        Ok(favorite)
    }

    /// Import cards from a JSON list file.
    ///
    /// Existing terms are skipped, never overwritten. Invalid entries count
    /// as skipped. The card list is saved only when something was added.
    ///
    /// # Errors
    ///
    /// - `Storage` if the file cannot be read or is not a JSON list
    /// - `PersistenceWriteFailed` if the card list cannot be saved
    pub fn import_file(
        &self,
        library: &mut Library,
        path: &Path,
    ) -> Result<ImportReport, CardServiceError> {
        let decoded = read_cards_file(path)?;
        let mut report = library.store_mut().import(decoded.cards);
        report.skipped += decoded.rejected;
        info!(
            path = %path.display(),
            added = report.added,
            skipped = report.skipped,
            "cards imported"
        );
        if report.added > 0 {
            self.flush(library)?;
        }
        Ok(report)
    }

    /// Write every card to `path` as a JSON list. Returns the card count.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the file cannot be written.
    pub fn export_file(&self, library: &Library, path: &Path) -> Result<usize, CardServiceError> {
        let cards = library.store().cards();
        write_cards_file(path, cards)?;
        info!(path = %path.display(), count = cards.len(), "cards exported");
        Ok(cards.len())
    }

    /// Add the built-in sample words, skipping any already present.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceWriteFailed` if the card list cannot be saved.
    pub fn seed_samples(&self, library: &mut Library) -> Result<ImportReport, CardServiceError> {
        let report = library.store_mut().import(sample_cards()?);
        if report.added > 0 {
            self.flush(library)?;
        }
        Ok(report)
    }

    fn flush(&self, library: &Library) -> Result<(), CardServiceError> {
        self.cards.save_cards(library.store().cards()).map_err(|e| {
            warn!(error = %e, "saving card list failed");
            CardServiceError::PersistenceWriteFailed(e)
        })
    }
}

/// Starter vocabulary for an empty library.
///
/// # Errors
///
/// Returns `CardError` only if the built-in drafts stop validating.
pub fn sample_cards() -> Result<Vec<drill_core::model::Card>, CardError> {
    Ok(vec![
        CardDraft::new("Haus", "House", "A1")
            .with_category("Noun")
            .with_gender("Das")
            .with_example("Das Haus ist groß.")
            .validate()?,
        CardDraft::new("gehen", "to go", "A1")
            .with_category("Verb")
            .with_example("Ich gehe zur Schule.")
            .validate()?,
    ])
}
