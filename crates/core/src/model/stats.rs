use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::card::{Card, Level};

/// Correct/incorrect tally for one level or category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeCounts {
    pub correct: u32,
    pub incorrect: u32,
}

impl OutcomeCounts {
    pub fn record(&mut self, correct: bool) {
        if correct {
            self.correct = self.correct.saturating_add(1);
        } else {
            self.incorrect = self.incorrect.saturating_add(1);
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }

    /// Percentage of correct answers, `0.0` when nothing was answered.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        accuracy(self.correct, self.incorrect)
    }
}

/// Lifetime review statistics.
///
/// The field names double as the persisted shape. Per-level and per-category
/// tallies are keyed by display name and created on first use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    total_reviews: u32,
    correct: u32,
    incorrect: u32,
    streak: u32,
    last_review_date: Option<NaiveDate>,
    by_level: BTreeMap<String, OutcomeCounts>,
    by_category: BTreeMap<String, OutcomeCounts>,
    difficult_words: BTreeMap<String, u32>,
}

impl Stats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one answer to every counter, including the daily streak.
    ///
    /// Cards without a level or category still count towards the totals but
    /// leave the per-level / per-category tallies alone. An incorrect answer
    /// bumps the card in `difficult_words`; entries are never removed.
    pub fn record_outcome(&mut self, card: &Card, correct: bool, today: NaiveDate) {
        self.total_reviews = self.total_reviews.saturating_add(1);
        if correct {
            self.correct = self.correct.saturating_add(1);
        } else {
            self.incorrect = self.incorrect.saturating_add(1);
        }

        if let Some(level) = card.level() {
            self.by_level
                .entry(level.as_str().to_owned())
                .or_default()
                .record(correct);
        }
        if let Some(category) = card.category() {
            self.by_category
                .entry(category.as_str().to_owned())
                .or_default()
                .record(correct);
        }

        if !correct {
            let count = self
                .difficult_words
                .entry(card.german().to_owned())
                .or_insert(0);
            *count = count.saturating_add(1);
        }

        self.touch_daily_streak(today);
    }

    /// Advance the consecutive-day counter for a review made on `today`.
    ///
    /// Same day leaves the streak unchanged, the next day extends it, and any
    /// longer gap restarts it at 1. A stored date after `today` is treated as
    /// the same day.
    pub fn touch_daily_streak(&mut self, today: NaiveDate) {
        self.streak = match self.last_review_date {
            None => 1,
            Some(last) => match last.succ_opt() {
                Some(next) if today == next => self.streak.saturating_add(1),
                Some(next) if today > next => 1,
                _ => self.streak,
            },
        };
        self.last_review_date = Some(today);
    }

    #[must_use]
    pub fn total_reviews(&self) -> u32 {
        self.total_reviews
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn last_review_date(&self) -> Option<NaiveDate> {
        self.last_review_date
    }

    #[must_use]
    pub fn by_level(&self) -> &BTreeMap<String, OutcomeCounts> {
        &self.by_level
    }

    #[must_use]
    pub fn by_category(&self) -> &BTreeMap<String, OutcomeCounts> {
        &self.by_category
    }

    #[must_use]
    pub fn difficult_words(&self) -> &BTreeMap<String, u32> {
        &self.difficult_words
    }

    #[must_use]
    pub fn level_counts(&self, level: Level) -> OutcomeCounts {
        self.by_level
            .get(level.as_str())
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_difficult(&self, german: &str) -> bool {
        self.difficult_words.contains_key(german)
    }

    /// Overall accuracy in percent. Derived, never stored.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        accuracy(self.correct, self.incorrect)
    }

    /// Difficult words, most-missed first; ties ordered by term.
    #[must_use]
    pub fn difficult_words_ranked(&self) -> Vec<(&str, u32)> {
        let mut ranked: Vec<(&str, u32)> = self
            .difficult_words
            .iter()
            .map(|(word, count)| (word.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

fn accuracy(correct: u32, incorrect: u32) -> f64 {
    let total = u64::from(correct) + u64::from(incorrect);
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = f64::from(correct) / total as f64;
    ratio * 100.0
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
