use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::card::{Category, Level};

pub const DEFAULT_MAX_CARDS: usize = 20;
pub const DEFAULT_TRANSITION_DELAY_MS: u32 = 500;
pub const MAX_TRANSITION_DELAY_MS: u32 = 5000;

/// User preferences, persisted as a flat record.
///
/// Only `max_cards` and the default filters feed the scheduler; the rest are
/// carried for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    dark_mode: bool,
    sound_enabled: bool,
    max_cards: usize,
    transition_delay: u32,
    keyboard_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_level: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_category: Option<Category>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            sound_enabled: true,
            max_cards: DEFAULT_MAX_CARDS,
            transition_delay: DEFAULT_TRANSITION_DELAY_MS,
            keyboard_enabled: true,
            default_level: None,
            default_category: None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error("max cards must be greater than zero")]
    InvalidMaxCards,

    #[error("transition delay {0}ms is outside 0..={max}ms", max = MAX_TRANSITION_DELAY_MS)]
    InvalidTransitionDelay(u32),

    #[error("unknown default level `{0}`")]
    InvalidDefaultLevel(String),

    #[error("unknown default category `{0}`")]
    InvalidDefaultCategory(String),
}

/// Partial update of `Preferences`; `None` keeps the current value.
///
/// Filter fields take raw user text, where `"All"` or blank clears the
/// default.
#[derive(Clone, Debug, Default)]
pub struct PreferencesDraft {
    pub dark_mode: Option<bool>,
    pub sound_enabled: Option<bool>,
    pub max_cards: Option<usize>,
    pub transition_delay: Option<u32>,
    pub keyboard_enabled: Option<bool>,
    pub default_level: Option<String>,
    pub default_category: Option<String>,
}

impl PreferencesDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the draft on top of `base`.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` for a zero card count, an out-of-range delay
    /// or an unrecognized default filter.
    pub fn validate(self, base: &Preferences) -> Result<Preferences, PreferencesError> {
        let mut next = base.clone();

        if let Some(max_cards) = self.max_cards {
            if max_cards == 0 {
                return Err(PreferencesError::InvalidMaxCards);
            }
            next.max_cards = max_cards;
        }
        if let Some(delay) = self.transition_delay {
            if delay > MAX_TRANSITION_DELAY_MS {
                return Err(PreferencesError::InvalidTransitionDelay(delay));
            }
            next.transition_delay = delay;
        }
        if let Some(raw) = self.default_level {
            next.default_level = parse_filter(&raw, Level::parse)
                .map_err(PreferencesError::InvalidDefaultLevel)?;
        }
        if let Some(raw) = self.default_category {
            next.default_category = parse_filter(&raw, Category::parse)
                .map_err(PreferencesError::InvalidDefaultCategory)?;
        }

        next.dark_mode = self.dark_mode.unwrap_or(next.dark_mode);
        next.sound_enabled = self.sound_enabled.unwrap_or(next.sound_enabled);
        next.keyboard_enabled = self.keyboard_enabled.unwrap_or(next.keyboard_enabled);

        Ok(next)
    }
}

impl Preferences {
    /// Repair values loaded from disk that would be rejected by the draft.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.max_cards == 0 {
            self.max_cards = DEFAULT_MAX_CARDS;
        }
        self.transition_delay = self.transition_delay.min(MAX_TRANSITION_DELAY_MS);
        self
    }

    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    #[must_use]
    pub fn max_cards(&self) -> usize {
        self.max_cards
    }

    #[must_use]
    pub fn transition_delay(&self) -> u32 {
        self.transition_delay
    }

    #[must_use]
    pub fn keyboard_enabled(&self) -> bool {
        self.keyboard_enabled
    }

    #[must_use]
    pub fn default_level(&self) -> Option<Level> {
        self.default_level
    }

    #[must_use]
    pub fn default_category(&self) -> Option<Category> {
        self.default_category
    }
}

fn parse_filter<T>(raw: &str, parse: fn(&str) -> Option<T>) -> Result<Option<T>, String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    parse(raw).map(Some).ok_or_else(|| raw.to_owned())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let prefs = Preferences::default();
        assert_eq!(prefs.max_cards(), 20);
        assert_eq!(prefs.transition_delay(), 500);
        assert!(prefs.default_level().is_none());
        assert!(prefs.default_category().is_none());
    }

    #[test]
    fn draft_rejects_zero_cards_and_long_delay() {
        let base = Preferences::default();

        let draft = PreferencesDraft {
            max_cards: Some(0),
            ..PreferencesDraft::new()
        };
        assert_eq!(draft.validate(&base), Err(PreferencesError::InvalidMaxCards));

        let draft = PreferencesDraft {
            transition_delay: Some(9000),
            ..PreferencesDraft::new()
        };
        assert_eq!(
            draft.validate(&base),
            Err(PreferencesError::InvalidTransitionDelay(9000))
        );
    }

    #[test]
    fn draft_parses_and_clears_default_filters() {
        let base = Preferences::default();
        let draft = PreferencesDraft {
            default_level: Some("b1".into()),
            default_category: Some("verb".into()),
            max_cards: Some(5),
            ..PreferencesDraft::new()
        };
        let prefs = draft.validate(&base).unwrap();
        assert_eq!(prefs.default_level(), Some(Level::B1));
        assert_eq!(prefs.default_category(), Some(Category::Verb));
        assert_eq!(prefs.max_cards(), 5);

        let cleared = PreferencesDraft {
            default_level: Some("All".into()),
            ..PreferencesDraft::new()
        }
        .validate(&prefs)
        .unwrap();
        assert!(cleared.default_level().is_none());
        assert_eq!(cleared.default_category(), Some(Category::Verb));
    }

    #[test]
    fn draft_rejects_unknown_filter() {
        let err = PreferencesDraft {
            default_category: Some("Article".into()),
            ..PreferencesDraft::new()
        }
        .validate(&Preferences::default())
        .unwrap_err();
        assert_eq!(err, PreferencesError::InvalidDefaultCategory("Article".into()));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"dark_mode": true}"#).unwrap();
        assert!(prefs.dark_mode());
        assert_eq!(prefs.max_cards(), DEFAULT_MAX_CARDS);

        let prefs: Preferences = serde_json::from_str(r#"{"max_cards": 0}"#).unwrap();
        assert_eq!(prefs.sanitized().max_cards(), DEFAULT_MAX_CARDS);
    }
}
