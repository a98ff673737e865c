mod card;
mod preferences;
mod stats;
mod store;

pub use card::{Card, CardDraft, CardError, Category, Gender, LeitnerBox, Level, MAX_EXAMPLE_CHARS};
pub use preferences::{
    DEFAULT_MAX_CARDS, DEFAULT_TRANSITION_DELAY_MS, MAX_TRANSITION_DELAY_MS, Preferences,
    PreferencesDraft, PreferencesError,
};
pub use stats::{OutcomeCounts, Stats};
pub use store::{CardStore, ImportReport, StoreError};
