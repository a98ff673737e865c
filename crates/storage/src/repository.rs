use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use drill_core::model::{Card, Preferences, Stats};
use thiserror::Error;

use crate::json::JsonRepository;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Repository contract for the card list. Saves replace the whole list.
pub trait CardRepository: Send + Sync {
    /// Load every persisted card; an absent list loads as empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list exists but cannot be read.
    fn load_cards(&self) -> Result<Vec<Card>, StorageError>;

    /// Whether a card list was ever stored, even an empty one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    fn has_card_list(&self) -> Result<bool, StorageError>;

    /// Overwrite the persisted list with `cards`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be written.
    fn save_cards(&self, cards: &[Card]) -> Result<(), StorageError>;
}

pub trait StatsRepository: Send + Sync {
    /// Load the stats record, `None` if nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    fn load_stats(&self) -> Result<Option<Stats>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    fn save_stats(&self, stats: &Stats) -> Result<(), StorageError>;
}

pub trait PreferencesRepository: Send + Sync {
    /// Load preferences, `None` if nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    fn load_preferences(&self) -> Result<Option<Preferences>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    fn save_preferences(&self, preferences: &Preferences) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Writes can be switched off to exercise persistence failure paths.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    cards: Arc<Mutex<Option<Vec<Card>>>>,
    stats: Arc<Mutex<Option<Stats>>>,
    preferences: Arc<Mutex<Option<Preferences>>>,
    reject_writes: Arc<AtomicBool>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with an initial card list.
    #[must_use]
    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: Arc::new(Mutex::new(Some(cards))),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail with `StorageError::Connection`.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("writes are disabled".into()));
        }
        Ok(())
    }
}

impl CardRepository for InMemoryRepository {
    fn load_cards(&self) -> Result<Vec<Card>, StorageError> {
        let guard = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn has_card_list(&self) -> Result<bool, StorageError> {
        let guard = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.is_some())
    }

    fn save_cards(&self, cards: &[Card]) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(cards.to_vec());
        Ok(())
    }
}

impl StatsRepository for InMemoryRepository {
    fn load_stats(&self) -> Result<Option<Stats>, StorageError> {
        let guard = self
            .stats
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save_stats(&self, stats: &Stats) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self
            .stats
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(stats.clone());
        Ok(())
    }
}

impl PreferencesRepository for InMemoryRepository {
    fn load_preferences(&self) -> Result<Option<Preferences>, StorageError> {
        let guard = self
            .preferences
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save_preferences(&self, preferences: &Preferences) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self
            .preferences
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(preferences.clone());
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub cards: Arc<dyn CardRepository>,
    pub stats: Arc<dyn StatsRepository>,
    pub preferences: Arc<dyn PreferencesRepository>,
}

impl Storage {
    /// Wire all three repositories to one backend.
    #[must_use]
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: CardRepository + StatsRepository + PreferencesRepository + Clone + 'static,
    {
        let cards: Arc<dyn CardRepository> = Arc::new(backend.clone());
        let stats: Arc<dyn StatsRepository> = Arc::new(backend.clone());
        let preferences: Arc<dyn PreferencesRepository> = Arc::new(backend);
        Self {
            cards,
            stats,
            preferences,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_backend(InMemoryRepository::new())
    }

    /// JSON documents under `root` (`data/` and `config/` subdirectories).
    #[must_use]
    pub fn json(root: impl Into<PathBuf>) -> Self {
        Self::from_backend(JsonRepository::new(root))
    }
}
