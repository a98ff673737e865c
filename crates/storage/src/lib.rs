#![forbid(unsafe_code)]

pub mod json;
pub mod record;
pub mod repository;

pub use json::{JsonRepository, read_cards_file, write_cards_file};
pub use record::{CardRecord, DecodedCards};
pub use repository::{
    CardRepository, InMemoryRepository, PreferencesRepository, StatsRepository, Storage,
    StorageError,
};
