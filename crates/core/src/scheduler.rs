use std::fmt;
use std::num::NonZeroUsize;

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::model::{Card, CardStore, Category, Level, Stats};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Which filter a `SchedulerError::InvalidFilter` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Level,
    Category,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Level => f.write_str("level"),
            FilterKind::Category => f.write_str("category"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SchedulerError {
    #[error("no cards available for review")]
    NoCardsAvailable,

    #[error("invalid {kind} filter `{value}` (available: {})", available.join(", "))]
    InvalidFilter {
        kind: FilterKind,
        value: String,
        available: Vec<String>,
    },

    #[error("could not build selection weights: {0}")]
    Weighting(String),
}

/// A requested session size that is not a positive integer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardCountError {
    #[error("card count `{0}` is not a number")]
    NotANumber(String),

    #[error("card count must be positive, got {0}")]
    NotPositive(i64),
}

/// Parse a user-entered session size.
///
/// Callers are expected to recover from the error by substituting their
/// configured default.
///
/// # Errors
///
/// Returns `CardCountError` for non-numeric or non-positive input.
///
/// # Examples
///
/// ```
/// # use drill_core::scheduler::parse_card_count;
/// assert_eq!(parse_card_count(" 5 ").map(|n| n.get()), Ok(5));
/// assert!(parse_card_count("-3").is_err());
/// assert!(parse_card_count("lots").is_err());
/// ```
pub fn parse_card_count(raw: &str) -> Result<NonZeroUsize, CardCountError> {
    let raw = raw.trim();
    let value: i64 = raw
        .parse()
        .map_err(|_| CardCountError::NotANumber(raw.to_owned()))?;
    usize::try_from(value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or(CardCountError::NotPositive(value))
}

//
// ─── FILTER ────────────────────────────────────────────────────────────────────
//

/// Level / category restriction applied before selection. `None` means "All".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub level: Option<Level>,
    pub category: Option<Category>,
}

impl ReviewFilter {
    #[must_use]
    pub fn new(level: Option<Level>, category: Option<Category>) -> Self {
        Self { level, category }
    }

    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Resolve raw filter text against the store. Absent, blank or `"All"`
    /// disables a filter.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidFilter` for an unrecognized value,
    /// listing the values the store actually holds.
    pub fn parse(
        store: &CardStore,
        level: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self, SchedulerError> {
        let level = match selected(level) {
            None => None,
            Some(raw) => Some(Level::parse(raw).ok_or_else(|| SchedulerError::InvalidFilter {
                kind: FilterKind::Level,
                value: raw.to_owned(),
                available: available_levels(store),
            })?),
        };
        let category = match selected(category) {
            None => None,
            Some(raw) => Some(Category::parse(raw).ok_or_else(|| {
                SchedulerError::InvalidFilter {
                    kind: FilterKind::Category,
                    value: raw.to_owned(),
                    available: available_categories(store),
                }
            })?),
        };
        Ok(Self { level, category })
    }

    #[must_use]
    pub fn matches(&self, card: &Card) -> bool {
        self.level.is_none_or(|level| card.level() == Some(level))
            && self
                .category
                .is_none_or(|category| card.category() == Some(category))
    }

    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.level.is_none() && self.category.is_none()
    }
}

fn selected(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("all"))
}

fn available_levels(store: &CardStore) -> Vec<String> {
    store
        .available_levels()
        .into_iter()
        .map(|level| level.as_str().to_owned())
        .collect()
}

fn available_categories(store: &CardStore) -> Vec<String> {
    store
        .available_categories()
        .into_iter()
        .map(|category| category.as_str().to_owned())
        .collect()
}

//
// ─── CANDIDATES ────────────────────────────────────────────────────────────────
//

/// Store positions matching `filter`.
///
/// # Errors
///
/// - `NoCardsAvailable` if the store is empty or the filters do not intersect
/// - `InvalidFilter` if a filter names a value no card in the store carries
pub fn filtered_candidates(
    store: &CardStore,
    filter: &ReviewFilter,
) -> Result<Vec<usize>, SchedulerError> {
    if store.is_empty() {
        return Err(SchedulerError::NoCardsAvailable);
    }
    if let Some(level) = filter.level {
        if !store.iter().any(|card| card.level() == Some(level)) {
            return Err(SchedulerError::InvalidFilter {
                kind: FilterKind::Level,
                value: level.as_str().to_owned(),
                available: available_levels(store),
            });
        }
    }
    if let Some(category) = filter.category {
        if !store.iter().any(|card| card.category() == Some(category)) {
            return Err(SchedulerError::InvalidFilter {
                kind: FilterKind::Category,
                value: category.as_str().to_owned(),
                available: available_categories(store),
            });
        }
    }

    let positions: Vec<usize> = positions_where(store, |card| filter.matches(card));
    if positions.is_empty() {
        return Err(SchedulerError::NoCardsAvailable);
    }
    Ok(positions)
}

/// Store positions of favorite cards.
#[must_use]
pub fn favorite_candidates(store: &CardStore) -> Vec<usize> {
    positions_where(store, Card::is_favorite)
}

/// Store positions of cards that were ever answered incorrectly.
#[must_use]
pub fn difficult_candidates(store: &CardStore, stats: &Stats) -> Vec<usize> {
    positions_where(store, |card| stats.is_difficult(card.german()))
}

fn positions_where(store: &CardStore, predicate: impl Fn(&Card) -> bool) -> Vec<usize> {
    store
        .iter()
        .enumerate()
        .filter(|(_, card)| predicate(card))
        .map(|(position, _)| position)
        .collect()
}

//
// ─── QUEUE ─────────────────────────────────────────────────────────────────────
//

/// Ordered positions into a `CardStore`, fixed in length once built.
///
/// The queue refers to cards rather than copying them, so box and favorite
/// changes made during a session land directly in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewQueue {
    slots: Vec<usize>,
}

impl ReviewQueue {
    /// Wrap an explicit order of store positions.
    #[must_use]
    pub fn from_positions(slots: Vec<usize>) -> Self {
        Self { slots }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.slots.get(index).copied()
    }

    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.slots
    }

    /// Resolve every slot against `store`, skipping positions it does not hold.
    pub fn cards<'a>(&'a self, store: &'a CardStore) -> impl Iterator<Item = &'a Card> + 'a {
        self.slots.iter().filter_map(|&position| store.get(position))
    }
}

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Leitner-box scheduler.
///
/// Builds review queues in two modes:
///
/// - **weighted** (`build_weighted_queue`): draws as many cards as there are
///   candidates, with replacement, each pick proportional to `1 / box`. Low
///   boxes come up more often; duplicates and omissions are expected.
/// - **bounded** (`build_bounded_queue`): draws `min(count, candidates)`
///   distinct cards uniformly, then orders them by ascending box.
///
/// Box 5 cards keep a weight of 0.2 and are never retired.
///
/// # Examples
///
/// ```
/// # use drill_core::model::{CardDraft, CardStore};
/// # use drill_core::scheduler::{ReviewFilter, Scheduler};
/// let mut store = CardStore::new();
/// store.add(CardDraft::new("Haus", "house", "A1").validate()?)?;
/// store.add(CardDraft::new("gehen", "to go", "A1").validate()?)?;
///
/// let mut scheduler = Scheduler::seeded(7);
/// let queue = scheduler.build_weighted_queue(&store, &ReviewFilter::all())?;
/// assert_eq!(queue.len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Scheduler<R = StdRng> {
    rng: R,
}

impl Scheduler<StdRng> {
    /// Scheduler seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic scheduler for tests and reproducible sessions.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for Scheduler<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Scheduler<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Weighted full review over the filtered store.
    ///
    /// # Errors
    ///
    /// - `NoCardsAvailable` if nothing matches
    /// - `InvalidFilter` if a filter value is absent from the store
    pub fn build_weighted_queue(
        &mut self,
        store: &CardStore,
        filter: &ReviewFilter,
    ) -> Result<ReviewQueue, SchedulerError> {
        let candidates = filtered_candidates(store, filter)?;
        self.weighted_queue_from(store, &candidates)
    }

    /// Weighted resampling over an explicit candidate set.
    ///
    /// The result has exactly `candidates.len()` slots.
    ///
    /// # Errors
    ///
    /// - `NoCardsAvailable` if `candidates` is empty
    /// - `Weighting` if a candidate position is not in the store
    pub fn weighted_queue_from(
        &mut self,
        store: &CardStore,
        candidates: &[usize],
    ) -> Result<ReviewQueue, SchedulerError> {
        if candidates.is_empty() {
            return Err(SchedulerError::NoCardsAvailable);
        }

        let weights = candidates
            .iter()
            .map(|&position| {
                store
                    .get(position)
                    .map(|card| card.leitner_box().weight())
                    .ok_or_else(|| {
                        SchedulerError::Weighting(format!("no card at position {position}"))
                    })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        let distribution =
            WeightedIndex::new(&weights).map_err(|e| SchedulerError::Weighting(e.to_string()))?;

        let slots = (0..candidates.len())
            .map(|_| candidates[distribution.sample(&mut self.rng)])
            .collect();
        Ok(ReviewQueue { slots })
    }

    /// Bounded custom review over the filtered store.
    ///
    /// # Errors
    ///
    /// - `NoCardsAvailable` if nothing matches
    /// - `InvalidFilter` if a filter value is absent from the store
    pub fn build_bounded_queue(
        &mut self,
        store: &CardStore,
        count: NonZeroUsize,
        filter: &ReviewFilter,
    ) -> Result<ReviewQueue, SchedulerError> {
        let candidates = filtered_candidates(store, filter)?;
        let amount = count.get().min(candidates.len());

        let mut slots: Vec<usize> = index::sample(&mut self.rng, candidates.len(), amount)
            .into_iter()
            .map(|i| candidates[i])
            .collect();
        // stable: equal boxes keep their drawn order
        slots.sort_by_key(|&position| store.get(position).map(Card::leitner_box));
        Ok(ReviewQueue { slots })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
