mod plan;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionLoopError;
pub use plan::{ReviewMode, build_queue, session_size};
pub use view::{CardFace, display_english, display_german};
pub use workflow::{SessionAnswerResult, SessionLoopService};
