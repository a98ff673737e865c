use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest example sentence accepted when adding a card.
pub const MAX_EXAMPLE_CHARS: usize = 200;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("german term cannot be empty")]
    EmptyGerman,

    #[error("english translation cannot be empty")]
    EmptyEnglish,

    #[error("level is required (A1, A2, B1, B2, C1)")]
    MissingLevel,

    #[error("unknown level `{0}`")]
    InvalidLevel(String),

    #[error("unknown category `{0}`")]
    InvalidCategory(String),

    #[error("unknown gender `{0}`")]
    InvalidGender(String),

    #[error("example sentence has {len} characters, limit is {max}")]
    ExampleTooLong { len: usize, max: usize },
}

//
// ─── LEVEL / CATEGORY / GENDER ─────────────────────────────────────────────────
//

/// CEFR proficiency level of a vocabulary card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
}

impl Level {
    pub const ALL: [Level; 5] = [Level::A1, Level::A2, Level::B1, Level::B2, Level::C1];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
            Level::C1 => "C1",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Part of speech of a vocabulary card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Preposition,
    Conjunction,
    Interjection,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Noun,
        Category::Verb,
        Category::Adjective,
        Category::Adverb,
        Category::Pronoun,
        Category::Preposition,
        Category::Conjunction,
        Category::Interjection,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Noun => "Noun",
            Category::Verb => "Verb",
            Category::Adjective => "Adjective",
            Category::Adverb => "Adverb",
            Category::Pronoun => "Pronoun",
            Category::Preposition => "Preposition",
            Category::Conjunction => "Conjunction",
            Category::Interjection => "Interjection",
        }
    }

    /// Case-insensitive lookup, so `"noun"` and `"NOUN"` both normalize to `Noun`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grammatical gender article. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Der,
    Die,
    Das,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Der, Gender::Die, Gender::Das];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Der => "Der",
            Gender::Die => "Die",
            Gender::Das => "Das",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|gender| gender.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── LEITNER BOX ───────────────────────────────────────────────────────────────
//

/// Mastery tier of a card, always within `1..=5`.
///
/// Box 1 holds the least mastered cards. The constructor clamps, so no value
/// outside the range can exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeitnerBox(u8);

impl LeitnerBox {
    pub const MIN: LeitnerBox = LeitnerBox(1);
    pub const MAX: LeitnerBox = LeitnerBox(5);

    /// Creates a box, clamping `raw` into `1..=5`.
    #[must_use]
    pub fn new(raw: i64) -> Self {
        let clamped = raw.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
        Self(u8::try_from(clamped).unwrap_or(Self::MIN.0))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// One box up, staying at 5.
    #[must_use]
    pub fn promote(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX.0))
    }

    /// One box down, staying at 1.
    #[must_use]
    pub fn demote(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN.0))
    }

    /// Selection weight used by weighted review: `1 / box`.
    #[must_use]
    pub fn weight(self) -> f64 {
        1.0 / f64::from(self.0)
    }
}

impl Default for LeitnerBox {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for LeitnerBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

/// A vocabulary card. The `german` term is the identity key inside a `CardStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    german: String,
    english: String,
    level: Option<Level>,
    category: Option<Category>,
    gender: Option<Gender>,
    examples: Vec<String>,
    leitner_box: LeitnerBox,
    favorite: bool,
}

impl Card {
    /// Rehydrate a card from already-normalized persisted values.
    ///
    /// # Errors
    ///
    /// Returns `CardError::EmptyGerman` / `CardError::EmptyEnglish` when a
    /// required term is blank.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        german: impl Into<String>,
        english: impl Into<String>,
        level: Option<Level>,
        category: Option<Category>,
        gender: Option<Gender>,
        examples: Vec<String>,
        leitner_box: LeitnerBox,
        favorite: bool,
    ) -> Result<Self, CardError> {
        let german = german.into().trim().to_owned();
        let english = english.into().trim().to_owned();
        if german.is_empty() {
            return Err(CardError::EmptyGerman);
        }
        if english.is_empty() {
            return Err(CardError::EmptyEnglish);
        }

        Ok(Self {
            german,
            english,
            level,
            category,
            gender,
            examples,
            leitner_box,
            favorite,
        })
    }

    #[must_use]
    pub fn german(&self) -> &str {
        &self.german
    }

    #[must_use]
    pub fn english(&self) -> &str {
        &self.english
    }

    #[must_use]
    pub fn level(&self) -> Option<Level> {
        self.level
    }

    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    #[must_use]
    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    #[must_use]
    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    #[must_use]
    pub fn leitner_box(&self) -> LeitnerBox {
        self.leitner_box
    }

    #[must_use]
    pub fn is_favorite(&self) -> bool {
        self.favorite
    }

    /// Flip the favorite flag and return the new value.
    pub fn toggle_favorite(&mut self) -> bool {
        self.favorite = !self.favorite;
        self.favorite
    }

    /// Move the card one box up on a correct answer, one down otherwise.
    ///
    /// Returns the box the card was in before the move.
    pub fn apply_answer(&mut self, correct: bool) -> LeitnerBox {
        let before = self.leitner_box;
        self.leitner_box = if correct {
            before.promote()
        } else {
            before.demote()
        };
        before
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// User-entered card fields, validated strictly before entering the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDraft {
    pub german: String,
    pub english: String,
    pub level: String,
    pub category: String,
    pub gender: String,
    pub examples: Vec<String>,
}

impl CardDraft {
    #[must_use]
    pub fn new(
        german: impl Into<String>,
        english: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            german: german.into(),
            english: english.into(),
            level: level.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Validate the draft into a fresh card (box 1, not a favorite).
    ///
    /// Unlike the load boundary, unrecognized values are rejected instead of
    /// being blanked.
    ///
    /// # Errors
    ///
    /// Returns the first `CardError` found.
    pub fn validate(self) -> Result<Card, CardError> {
        let level_raw = self.level.trim();
        if level_raw.is_empty() {
            return Err(CardError::MissingLevel);
        }
        let level = Level::parse(level_raw)
            .ok_or_else(|| CardError::InvalidLevel(level_raw.to_owned()))?;

        let category = parse_optional(&self.category, Category::parse)
            .map_err(CardError::InvalidCategory)?;
        let gender = parse_optional(&self.gender, Gender::parse).map_err(CardError::InvalidGender)?;

        let mut examples = Vec::with_capacity(self.examples.len());
        for example in self.examples {
            let example = example.trim();
            if example.is_empty() {
                continue;
            }
            let len = example.chars().count();
            if len > MAX_EXAMPLE_CHARS {
                return Err(CardError::ExampleTooLong {
                    len,
                    max: MAX_EXAMPLE_CHARS,
                });
            }
            examples.push(example.to_owned());
        }

        Card::from_persisted(
            self.german,
            self.english,
            Some(level),
            category,
            gender,
            examples,
            LeitnerBox::MIN,
            false,
        )
    }
}

fn parse_optional<T>(raw: &str, parse: fn(&str) -> Option<T>) -> Result<Option<T>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
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
    fn box_constructor_clamps() {
        assert_eq!(LeitnerBox::new(0).value(), 1);
        assert_eq!(LeitnerBox::new(-7).value(), 1);
        assert_eq!(LeitnerBox::new(3).value(), 3);
        assert_eq!(LeitnerBox::new(42).value(), 5);
    }

    #[test]
    fn box_moves_by_one_and_sticks_at_bounds() {
        assert_eq!(LeitnerBox::new(3).promote().value(), 4);
        assert_eq!(LeitnerBox::new(3).demote().value(), 2);
        assert_eq!(LeitnerBox::MAX.promote(), LeitnerBox::MAX);
        assert_eq!(LeitnerBox::MIN.demote(), LeitnerBox::MIN);
    }

    #[test]
    fn box_weight_is_inverse() {
        assert!((LeitnerBox::new(1).weight() - 1.0).abs() < f64::EPSILON);
        assert!((LeitnerBox::new(5).weight() - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn level_and_category_parse_case_insensitively() {
        assert_eq!(Level::parse(" b2 "), Some(Level::B2));
        assert_eq!(Level::parse("C2"), None);
        assert_eq!(Category::parse("noun"), Some(Category::Noun));
        assert_eq!(Category::parse("ADVERB"), Some(Category::Adverb));
        assert_eq!(Category::parse("Article"), None);
        assert_eq!(Gender::parse("das"), Some(Gender::Das));
    }

    #[test]
    fn draft_requires_terms_and_level() {
        let err = CardDraft::new("", "house", "A1").validate().unwrap_err();
        assert_eq!(err, CardError::EmptyGerman);

        let err = CardDraft::new("Haus", "  ", "A1").validate().unwrap_err();
        assert_eq!(err, CardError::EmptyEnglish);

        let err = CardDraft::new("Haus", "house", "").validate().unwrap_err();
        assert_eq!(err, CardError::MissingLevel);

        let err = CardDraft::new("Haus", "house", "Z9").validate().unwrap_err();
        assert_eq!(err, CardError::InvalidLevel("Z9".into()));
    }

    #[test]
    fn draft_rejects_unknown_category_and_long_examples() {
        let err = CardDraft::new("Haus", "house", "A1")
            .with_category("Article")
            .validate()
            .unwrap_err();
        assert_eq!(err, CardError::InvalidCategory("Article".into()));

        let err = CardDraft::new("Haus", "house", "A1")
            .with_example("x".repeat(MAX_EXAMPLE_CHARS + 1))
            .validate()
            .unwrap_err();
        assert!(matches!(err, CardError::ExampleTooLong { .. }));
    }

    #[test]
    fn valid_draft_starts_in_box_one() {
        let card = CardDraft::new(" Haus ", "house", "a1")
            .with_category("noun")
            .with_gender("das")
            .with_example("Das Haus ist groß.")
            .with_example("   ")
            .validate()
            .unwrap();

        assert_eq!(card.german(), "Haus");
        assert_eq!(card.level(), Some(Level::A1));
        assert_eq!(card.category(), Some(Category::Noun));
        assert_eq!(card.gender(), Some(Gender::Das));
        assert_eq!(card.examples(), ["Das Haus ist groß.".to_string()]);
        assert_eq!(card.leitner_box(), LeitnerBox::MIN);
        assert!(!card.is_favorite());
    }

    #[test]
    fn apply_answer_reports_previous_box() {
        let mut card = CardDraft::new("Haus", "house", "A1").validate().unwrap();
        let before = card.apply_answer(true);
        assert_eq!(before.value(), 1);
        assert_eq!(card.leitner_box().value(), 2);

        card.apply_answer(false);
        card.apply_answer(false);
        assert_eq!(card.leitner_box().value(), 1);
    }
}
