use drill_core::model::{CardStore, Preferences, Stats};
use storage::repository::{Storage, StorageError};
use tracing::{info, warn};

/// In-memory source of truth for one process: the card store, the stats
/// record and the preferences.
///
/// Loaded once at startup. Services mutate it and flush the touched part
/// right away.
#[derive(Debug, Clone, Default)]
pub struct Library {
    store: CardStore,
    stats: Stats,
    preferences: Preferences,
}

impl Library {
    #[must_use]
    pub fn new(store: CardStore, stats: Stats, preferences: Preferences) -> Self {
        Self {
            store,
            stats,
            preferences,
        }
    }

    /// Load cards, stats and preferences from `storage`.
    ///
    /// Missing records load as empty / default. Cards repeating an earlier
    /// `german` term are dropped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a repository cannot be read.
    pub fn load(storage: &Storage) -> Result<Self, StorageError> {
        let cards = storage.cards.load_cards()?;
        let (store, report) = CardStore::from_cards(cards);
        if report.skipped > 0 {
            warn!(skipped = report.skipped, "dropped cards with duplicate terms");
        }

        let stats = storage.stats.load_stats()?.unwrap_or_default();
        let preferences = storage.preferences.load_preferences()?.unwrap_or_default();

        info!(
            cards = store.len(),
            total_reviews = stats.total_reviews(),
            "library loaded"
        );
        Ok(Self::new(store, stats, preferences))
    }

    #[must_use]
    pub fn store(&self) -> &CardStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CardStore {
        &mut self.store
    }

    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub(crate) fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
    }

    /// Split borrow for answering: the session mutates both at once.
    pub(crate) fn store_and_stats_mut(&mut self) -> (&mut CardStore, &mut Stats) {
        (&mut self.store, &mut self.stats)
    }
}
