use std::fs;
use std::path::{Path, PathBuf};

use drill_core::model::{Card, Preferences, Stats};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::record::{DecodedCards, decode_cards, encode_cards};
use crate::repository::{CardRepository, PreferencesRepository, StatsRepository, StorageError};

const CARDS_FILE: &str = "data/flashcards.json";
const BACKUP_FILE: &str = "data/backup/backup.json";
const STATS_FILE: &str = "config/stats.json";
const PREFERENCES_FILE: &str = "config/config.json";

/// JSON document store rooted at a data directory.
///
/// ```text
/// {root}/
/// ├── data/
/// │   ├── flashcards.json     # card list
/// │   └── backup/backup.json  # copy taken after every card save
/// └── config/
///     ├── stats.json
///     └── config.json         # preferences
/// ```
///
/// Every save rewrites the whole file.
#[derive(Debug, Clone)]
pub struct JsonRepository {
    root: PathBuf,
}

impl JsonRepository {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn cards_path(&self) -> PathBuf {
        self.root.join(CARDS_FILE)
    }

    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        self.root.join(BACKUP_FILE)
    }

    #[must_use]
    pub fn stats_path(&self) -> PathBuf {
        self.root.join(STATS_FILE)
    }

    #[must_use]
    pub fn preferences_path(&self) -> PathBuf {
        self.root.join(PREFERENCES_FILE)
    }

    fn backup_cards(&self) -> Result<(), StorageError> {
        let backup = self.backup_path();
        ensure_parent(&backup)?;
        fs::copy(self.cards_path(), &backup).map_err(|e| StorageError::io(&backup, e))?;
        Ok(())
    }
}

impl CardRepository for JsonRepository {
    fn load_cards(&self) -> Result<Vec<Card>, StorageError> {
        let path = self.cards_path();
        if !path.exists() {
            debug!(path = %path.display(), "no card list yet");
            return Ok(Vec::new());
        }
        let decoded = read_cards_file(&path)?;
        if decoded.rejected > 0 {
            warn!(
                path = %path.display(),
                rejected = decoded.rejected,
                "dropped invalid card records while loading"
            );
        }
        Ok(decoded.cards)
    }

    fn has_card_list(&self) -> Result<bool, StorageError> {
        let path = self.cards_path();
        path.try_exists().map_err(|e| StorageError::io(&path, e))
    }

    fn save_cards(&self, cards: &[Card]) -> Result<(), StorageError> {
        write_cards_file(&self.cards_path(), cards)?;
        self.backup_cards()
    }
}

impl StatsRepository for JsonRepository {
    fn load_stats(&self) -> Result<Option<Stats>, StorageError> {
        read_record(&self.stats_path())
    }

    fn save_stats(&self, stats: &Stats) -> Result<(), StorageError> {
        write_json(&self.stats_path(), stats)
    }
}

impl PreferencesRepository for JsonRepository {
    fn load_preferences(&self) -> Result<Option<Preferences>, StorageError> {
        Ok(read_record::<Preferences>(&self.preferences_path())?.map(Preferences::sanitized))
    }

    fn save_preferences(&self, preferences: &Preferences) -> Result<(), StorageError> {
        write_json(&self.preferences_path(), preferences)
    }
}

/// Read a JSON card list from any file, e.g. for import.
///
/// # Errors
///
/// Returns `StorageError::Io` if the file cannot be read, or
/// `StorageError::Serialization` if it is not a JSON list.
pub fn read_cards_file(path: &Path) -> Result<DecodedCards, StorageError> {
    let text = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    decode_cards(&text)
}

/// Write cards as a JSON list to any file, e.g. for export.
///
/// # Errors
///
/// Returns `StorageError` if the list cannot be encoded or written.
pub fn write_cards_file(path: &Path, cards: &[Card]) -> Result<(), StorageError> {
    let text = encode_cards(cards)?;
    ensure_parent(path)?;
    fs::write(path, text).map_err(|e| StorageError::io(path, e))
}

// A missing file is `None`. So is an unreadable document: stats and
// preferences fall back to defaults and the next save replaces the file.
fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    match serde_json::from_str(&text) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable record, using defaults");
            Ok(None)
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    ensure_parent(path)?;
    fs::write(path, text).map_err(|e| StorageError::io(path, e))
}

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))
        }
        _ => Ok(()),
    }
}
