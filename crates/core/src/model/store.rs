use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::model::card::{Card, Category, Level};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("card `{0}` already exists")]
    DuplicateCard(String),

    #[error("card `{0}` not found")]
    NotFound(String),
}

/// Counts produced by a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
}

/// Ordered, in-memory collection of cards keyed by their `german` term.
///
/// Cards are only ever appended, so a position handed out by the store stays
/// valid for the lifetime of the store. Review queues rely on this.
#[derive(Debug, Clone, Default)]
pub struct CardStore {
    cards: Vec<Card>,
    positions: HashMap<String, usize>,
}

impl CardStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded cards, keeping the first card of each key.
    #[must_use]
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> (Self, ImportReport) {
        let mut store = Self::new();
        let report = store.import(cards);
        (store, report)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Card> {
        self.cards.get(position)
    }

    pub(crate) fn get_mut(&mut self, position: usize) -> Option<&mut Card> {
        self.cards.get_mut(position)
    }

    #[must_use]
    pub fn position(&self, german: &str) -> Option<usize> {
        self.positions.get(german).copied()
    }

    #[must_use]
    pub fn find(&self, german: &str) -> Option<&Card> {
        self.position(german).and_then(|pos| self.cards.get(pos))
    }

    #[must_use]
    pub fn contains(&self, german: &str) -> bool {
        self.positions.contains_key(german)
    }

    /// Append a card, rejecting an existing `german` key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateCard` if the key is taken.
    pub fn add(&mut self, card: Card) -> Result<usize, StoreError> {
        if self.contains(card.german()) {
            return Err(StoreError::DuplicateCard(card.german().to_owned()));
        }
        let position = self.cards.len();
        self.positions.insert(card.german().to_owned(), position);
        self.cards.push(card);
        Ok(position)
    }

    /// Append every card whose key is not present yet; duplicates are skipped,
    /// never merged or overwritten.
    pub fn import(&mut self, cards: impl IntoIterator<Item = Card>) -> ImportReport {
        let mut report = ImportReport::default();
        for card in cards {
            match self.add(card) {
                Ok(_) => report.added += 1,
                Err(_) => report.skipped += 1,
            }
        }
        report
    }

    /// Flip the favorite flag of the card with the given key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown key.
    pub fn toggle_favorite(&mut self, german: &str) -> Result<bool, StoreError> {
        let position = self
            .position(german)
            .ok_or_else(|| StoreError::NotFound(german.to_owned()))?;
        let card = self
            .cards
            .get_mut(position)
            .ok_or_else(|| StoreError::NotFound(german.to_owned()))?;
        Ok(card.toggle_favorite())
    }

    /// Levels present on at least one card, in CEFR order.
    #[must_use]
    pub fn available_levels(&self) -> Vec<Level> {
        self.cards
            .iter()
            .filter_map(Card::level)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Categories present on at least one card.
    #[must_use]
    pub fn available_categories(&self) -> Vec<Category> {
        self.cards
            .iter()
            .filter_map(Card::category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardDraft;

    fn card(german: &str, level: &str, category: &str) -> Card {
        CardDraft::new(german, format!("{german}-en"), level)
            .with_category(category)
            .validate()
            .unwrap()
    }

    #[test]
    fn add_rejects_duplicate_key() {
        let mut store = CardStore::new();
        store.add(card("Haus", "A1", "Noun")).unwrap();
        let err = store.add(card("Haus", "B1", "Noun")).unwrap_err();
        assert_eq!(err, StoreError::DuplicateCard("Haus".into()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.find("Haus").unwrap().level(), Some(Level::A1));
    }

    #[test]
    fn import_skips_existing_and_repeated_keys() {
        let mut store = CardStore::new();
        store.add(card("Haus", "A1", "Noun")).unwrap();

        let report = store.import(vec![
            card("Haus", "C1", "Noun"),
            card("gehen", "A1", "Verb"),
            card("gehen", "A2", "Verb"),
        ]);

        assert_eq!(
            report,
            ImportReport {
                added: 1,
                skipped: 2,
            }
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.find("Haus").unwrap().level(), Some(Level::A1));
        assert_eq!(store.position("gehen"), Some(1));
    }

    #[test]
    fn toggle_favorite_by_key() {
        let mut store = CardStore::new();
        store.add(card("Haus", "A1", "Noun")).unwrap();
        assert!(store.toggle_favorite("Haus").unwrap());
        assert!(!store.toggle_favorite("Haus").unwrap());
        assert!(matches!(
            store.toggle_favorite("Baum"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn available_values_are_sorted_and_unique() {
        let (store, report) = CardStore::from_cards(vec![
            card("schnell", "B1", "Adjective"),
            card("Haus", "A1", "Noun"),
            card("Baum", "A1", "Noun"),
        ]);
        assert_eq!(report.added, 3);
        assert_eq!(store.available_levels(), vec![Level::A1, Level::B1]);
        assert_eq!(
            store.available_categories(),
            vec![Category::Noun, Category::Adjective]
        );
    }
}
