use std::num::NonZeroUsize;

use drill_core::model::{CardStore, Preferences};
use drill_core::scheduler::{
    ReviewFilter, ReviewQueue, Scheduler, SchedulerError, difficult_candidates,
    favorite_candidates, parse_card_count,
};
use rand::Rng;
use tracing::warn;

use crate::library::Library;

/// How a session picks its cards.
///
/// Filter fields hold raw user input. `None` falls back to the default filter
/// from the preferences; `"All"` explicitly disables filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewMode {
    /// Weighted review over the filtered store.
    All {
        level: Option<String>,
        category: Option<String>,
    },
    /// Bounded review of `count` distinct cards, easiest-box last.
    Custom {
        count: String,
        level: Option<String>,
        category: Option<String>,
    },
    /// Weighted review over favorite cards.
    Favorites,
    /// Weighted review over cards that were ever answered incorrectly.
    DifficultWords,
}

impl ReviewMode {
    #[must_use]
    pub fn all() -> Self {
        Self::All {
            level: None,
            category: None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ReviewMode::All { .. } => "review",
            ReviewMode::Custom { .. } => "custom review",
            ReviewMode::Favorites => "favorites",
            ReviewMode::DifficultWords => "difficult words",
        }
    }
}

/// Build the queue for `mode` from the library's current state.
///
/// # Errors
///
/// Returns `SchedulerError` when no card qualifies or a filter is invalid.
pub fn build_queue<R: Rng>(
    mode: &ReviewMode,
    library: &Library,
    scheduler: &mut Scheduler<R>,
) -> Result<ReviewQueue, SchedulerError> {
    let store = library.store();
    let preferences = library.preferences();
    match mode {
        ReviewMode::All { level, category } => {
            let filter = resolve_filter(store, preferences, level.as_deref(), category.as_deref())?;
            scheduler.build_weighted_queue(store, &filter)
        }
        ReviewMode::Custom {
            count,
            level,
            category,
        } => {
            let filter = resolve_filter(store, preferences, level.as_deref(), category.as_deref())?;
            let count = session_size(count, preferences);
            scheduler.build_bounded_queue(store, count, &filter)
        }
        ReviewMode::Favorites => {
            scheduler.weighted_queue_from(store, &favorite_candidates(store))
        }
        ReviewMode::DifficultWords => {
            scheduler.weighted_queue_from(store, &difficult_candidates(store, library.stats()))
        }
    }
}

fn resolve_filter(
    store: &CardStore,
    preferences: &Preferences,
    level: Option<&str>,
    category: Option<&str>,
) -> Result<ReviewFilter, SchedulerError> {
    let parsed = ReviewFilter::parse(store, level, category)?;
    Ok(ReviewFilter {
        level: if level.is_some() {
            parsed.level
        } else {
            preferences.default_level()
        },
        category: if category.is_some() {
            parsed.category
        } else {
            preferences.default_category()
        },
    })
}

/// Parse the requested session size, falling back to `max_cards`.
#[must_use]
pub fn session_size(raw: &str, preferences: &Preferences) -> NonZeroUsize {
    parse_card_count(raw).unwrap_or_else(|e| {
        let fallback = NonZeroUsize::new(preferences.max_cards()).unwrap_or(NonZeroUsize::MIN);
        warn!(error = %e, fallback = fallback.get(), "invalid card count, using default");
        fallback
    })
}
