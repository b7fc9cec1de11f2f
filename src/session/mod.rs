//! Search session state machine
//!
//! `SearchSession` owns the client state and the request tokens; the actual
//! state changes are the plain functions in `transition`.

pub mod events;
pub mod search_session;
pub mod state;
pub mod transition;

pub use events::{Completion, Dispatch, RequestToken, Resolution, SessionEvent};
pub use search_session::SearchSession;
pub use state::{Outfit, SessionState, SubmissionPhase};
