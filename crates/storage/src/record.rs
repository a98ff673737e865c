use drill_core::model::{Card, CardError, Category, Gender, LeitnerBox, Level};
use serde::{Deserialize, Deserializer, Serialize};

use crate::repository::StorageError;

/// Persisted shape for a card.
///
/// Reading is lenient: missing or `null` text fields load as empty, a missing
/// or `null` `box` loads as 1, a `null` `favorite` as false, and the older single `example` field is accepted in
/// place of `examples`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub german: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub english: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub level: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(default)]
    pub examples: Option<Vec<String>>,
    #[serde(default, skip_serializing)]
    pub example: Option<String>,
    #[serde(rename = "box", default = "default_box", deserialize_with = "null_as_min_box")]
    pub leitner_box: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub favorite: bool,
}

fn default_box() -> i64 {
    i64::from(LeitnerBox::MIN.value())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_min_box<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_else(default_box))
}

impl CardRecord {
    #[must_use]
    pub fn from_card(card: &Card) -> Self {
        Self {
            german: card.german().to_owned(),
            english: card.english().to_owned(),
            level: card.level().map(|l| l.as_str().to_owned()).unwrap_or_default(),
            category: card
                .category()
                .map(|c| c.as_str().to_owned())
                .unwrap_or_default(),
            gender: card.gender().map(|g| g.as_str().to_owned()).unwrap_or_default(),
            examples: Some(card.examples().to_vec()),
            example: None,
            leitner_box: i64::from(card.leitner_box().value()),
            favorite: card.is_favorite(),
        }
    }

    /// Normalize the record into a domain `Card`.
    ///
    /// Unrecognized level, category or gender values are blanked and the box
    /// is clamped into range.
    ///
    /// # Errors
    ///
    /// Returns `CardError` if `german` or `english` is blank.
    pub fn into_card(self) -> Result<Card, CardError> {
        let examples = match (self.examples, self.example) {
            (Some(examples), _) => examples,
            (None, Some(example)) if !example.trim().is_empty() => vec![example],
            (None, _) => Vec::new(),
        };

        Card::from_persisted(
            self.german,
            self.english,
            Level::parse(&self.level),
            Category::parse(&self.category),
            Gender::parse(&self.gender),
            examples,
            LeitnerBox::new(self.leitner_box),
            self.favorite,
        )
    }
}

/// Cards decoded from a JSON list, plus the number of entries that were
/// dropped because they were malformed or failed validation.
#[derive(Debug, Default)]
pub struct DecodedCards {
    pub cards: Vec<Card>,
    pub rejected: usize,
}

/// Decode a JSON array of card records.
///
/// Entries are decoded one by one, so a single malformed entry does not
/// discard the rest of the list.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the text is not JSON or its top
/// level is not an array.
pub fn decode_cards(json: &str) -> Result<DecodedCards, StorageError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let serde_json::Value::Array(entries) = value else {
        return Err(StorageError::Serialization(
            "expected a list of cards at the top level".into(),
        ));
    };

    let mut decoded = DecodedCards::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let card = serde_json::from_value::<CardRecord>(entry)
            .map_err(|e| e.to_string())
            .and_then(|record| record.into_card().map_err(|e| e.to_string()));
        match card {
            Ok(card) => decoded.cards.push(card),
            Err(reason) => {
                tracing::warn!(index, %reason, "skipping invalid card record");
                decoded.rejected += 1;
            }
        }
    }
    Ok(decoded)
}

/// Encode cards as a pretty-printed JSON array of records.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_cards(cards: &[Card]) -> Result<String, StorageError> {
    let records: Vec<CardRecord> = cards.iter().map(CardRecord::from_card).collect();
    serde_json::to_string_pretty(&records).map_err(|e| StorageError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_legacy_record() {
        let json = r#"[{
            "german": " Haus ",
            "english": "house",
            "level": " a1 ",
            "category": "noun",
            "gender": "das",
            "example": "Das Haus ist groß."
        }]"#;
        let decoded = decode_cards(json).unwrap();
        assert_eq!(decoded.rejected, 0);

        let card = &decoded.cards[0];
        assert_eq!(card.german(), "Haus");
        assert_eq!(card.level(), Some(Level::A1));
        assert_eq!(card.category(), Some(Category::Noun));
        assert_eq!(card.gender(), Some(Gender::Das));
        assert_eq!(card.examples(), ["Das Haus ist groß.".to_string()]);
        assert_eq!(card.leitner_box(), LeitnerBox::MIN);
        assert!(!card.is_favorite());
    }

    #[test]
    fn blanks_unknown_values_and_clamps_box() {
        let json = r#"[{"german": "gehen", "english": "to go", "level": "Z9",
                        "category": "Article", "box": 9, "favorite": true, "level2": 1}]"#;
        let card = decode_cards(json).unwrap().cards.remove(0);
        assert_eq!(card.level(), None);
        assert_eq!(card.category(), None);
        assert_eq!(card.leitner_box(), LeitnerBox::MAX);
        assert!(card.is_favorite());
    }

    #[test]
    fn null_box_and_favorite_use_defaults() {
        let json = r#"[{"german": "Baum", "english": "tree", "box": null, "favorite": null}]"#;
        let decoded = decode_cards(json).unwrap();
        assert_eq!(decoded.rejected, 0);

        let card = &decoded.cards[0];
        assert_eq!(card.leitner_box(), LeitnerBox::MIN);
        assert!(!card.is_favorite());
    }

    #[test]
    fn skips_invalid_entries() {
        let json = r#"[
            {"german": "", "english": "nothing"},
            {"german": "Baum", "english": "tree", "box": "three"},
            42,
            {"german": "Tisch", "english": "table", "level": null}
        ]"#;
        let decoded = decode_cards(json).unwrap();
        assert_eq!(decoded.rejected, 3);
        assert_eq!(decoded.cards.len(), 1);
        assert_eq!(decoded.cards[0].german(), "Tisch");
    }

    #[test]
    fn rejects_non_list_documents() {
        assert!(matches!(
            decode_cards(r#"{"german": "Haus"}"#),
            Err(StorageError::Serialization(_))
        ));
        assert!(decode_cards("not json").is_err());
    }

    #[test]
    fn encoded_records_use_box_field_and_blank_strings() {
        let card = decode_cards(r#"[{"german": "Haus", "english": "house", "box": 3}]"#)
            .unwrap()
            .cards
            .remove(0);
        let json = encode_cards(&[card]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["box"], 3);
        assert_eq!(value[0]["level"], "");
        assert_eq!(value[0]["examples"], serde_json::json!([]));
        assert!(value[0].get("example").is_none());
    }
}
