#![forbid(unsafe_code)]

pub mod app_services;
pub mod card_service;
pub mod error;
pub mod library;
pub mod preferences_service;
pub mod sessions;
pub mod stats_view;

pub use drill_core::Clock;

pub use app_services::AppServices;
pub use card_service::{CardService, sample_cards};
pub use error::{AppServicesError, CardServiceError, PreferencesServiceError, SessionLoopError};
pub use library::Library;
pub use preferences_service::PreferencesService;
pub use sessions::{CardFace, ReviewMode, SessionAnswerResult, SessionLoopService};
pub use stats_view::{DifficultWord, OutcomeRow, StatsReport};
