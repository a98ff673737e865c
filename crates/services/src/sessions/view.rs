use drill_core::model::{Card, CardStore, LeitnerBox};
use drill_core::session::{ReviewSession, Side};

const ARTICLES: [&str; 3] = ["der", "die", "das"];

/// Presentation-agnostic rendering of one side of a card.
///
/// Text is already capitalized for display; layout and styling are left to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFace {
    pub side: Side,
    pub text: String,
    /// Example sentences, only on the back.
    pub examples: Vec<String>,
    pub favorite: bool,
    pub leitner_box: LeitnerBox,
}

impl CardFace {
    #[must_use]
    pub fn for_card(card: &Card, side: Side) -> Self {
        let (text, examples) = match side {
            Side::Front => (display_german(card.german()), Vec::new()),
            Side::Back => (display_english(card.english()), card.examples().to_vec()),
        };
        Self {
            side,
            text,
            examples,
            favorite: card.is_favorite(),
            leitner_box: card.leitner_box(),
        }
    }

    /// Face of the session's current card, `None` when idle.
    #[must_use]
    pub fn current(session: &ReviewSession, store: &CardStore) -> Option<Self> {
        session
            .current_card(store)
            .map(|card| Self::for_card(card, session.side()))
    }
}

/// Capitalize a german term; a leading article and its noun are both
/// capitalized.
#[must_use]
pub fn display_german(term: &str) -> String {
    let term = term.trim();
    if let Some((first, rest)) = term.split_once(char::is_whitespace) {
        let is_article = ARTICLES
            .iter()
            .any(|article| article.eq_ignore_ascii_case(first));
        if is_article {
            return format!("{} {}", capitalize(first), capitalize(rest.trim_start()));
        }
    }
    capitalize(term)
}

/// Capitalize every word; slash-separated alternatives are spaced out.
#[must_use]
pub fn display_english(text: &str) -> String {
    if text.contains('/') {
        return text
            .split('/')
            .map(|part| capitalize(part.trim()))
            .collect::<Vec<_>>()
            .join(" / ");
    }
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::model::CardDraft;

    #[test]
    fn german_capitalization() {
        assert_eq!(display_german("haus"), "Haus");
        assert_eq!(display_german("der hund"), "Der Hund");
        assert_eq!(display_german("  GEHEN "), "Gehen");
        assert_eq!(display_german("guten Tag"), "Guten tag");
        assert_eq!(display_german("über"), "Über");
    }

    #[test]
    fn english_capitalization() {
        assert_eq!(display_english("to go"), "To Go");
        assert_eq!(display_english("house/home"), "House / Home");
        assert_eq!(display_english(""), "");
    }

    #[test]
    fn back_face_carries_examples() {
        let card = CardDraft::new("Haus", "house", "A1")
            .with_example("Das Haus ist groß.")
            .validate()
            .unwrap();

        let front = CardFace::for_card(&card, Side::Front);
        assert_eq!(front.text, "Haus");
        assert!(front.examples.is_empty());

        let back = CardFace::for_card(&card, Side::Back);
        assert_eq!(back.text, "House");
        assert_eq!(back.examples, vec!["Das Haus ist groß.".to_string()]);
        assert_eq!(back.leitner_box, LeitnerBox::MIN);
    }
}
