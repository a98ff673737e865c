use drill_core::model::{Category, Level, OutcomeCounts, Stats};

/// One per-level or per-category line of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeRow {
    pub name: String,
    pub correct: u32,
    pub incorrect: u32,
    pub accuracy: f64,
}

impl OutcomeRow {
    fn new(name: &str, counts: OutcomeCounts) -> Self {
        Self {
            name: name.to_owned(),
            correct: counts.correct,
            incorrect: counts.incorrect,
            accuracy: counts.accuracy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultWord {
    pub german: String,
    pub misses: u32,
}

/// Derived statistics view. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsReport {
    pub total_reviews: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub accuracy: f64,
    pub streak: u32,
    /// Every level, in CEFR order, including ones never reviewed.
    pub by_level: Vec<OutcomeRow>,
    /// Categories that have at least one answer.
    pub by_category: Vec<OutcomeRow>,
    /// Most-missed first.
    pub difficult_words: Vec<DifficultWord>,
}

impl StatsReport {
    #[must_use]
    pub fn from_stats(stats: &Stats) -> Self {
        let by_level = Level::ALL
            .into_iter()
            .map(|level| OutcomeRow::new(level.as_str(), stats.level_counts(level)))
            .collect();

        let by_category = Category::ALL
            .into_iter()
            .filter_map(|category| {
                stats
                    .by_category()
                    .get(category.as_str())
                    .map(|counts| OutcomeRow::new(category.as_str(), *counts))
            })
            .collect();

        let difficult_words = stats
            .difficult_words_ranked()
            .into_iter()
            .map(|(german, misses)| DifficultWord {
                german: german.to_owned(),
                misses,
            })
            .collect();

        Self {
            total_reviews: stats.total_reviews(),
            correct: stats.correct(),
            incorrect: stats.incorrect(),
            accuracy: stats.accuracy(),
            streak: stats.streak(),
            by_level,
            by_category,
            difficult_words,
        }
    }
}
