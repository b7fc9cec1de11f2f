//! Submission messages and the session event log

use crate::api_client::FetchError;
use crate::session::state::{Outfit, SubmissionPhase};
use std::fmt;

/// Identifies one dispatched request. Tokens only ever increase within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request the session wants issued on its behalf
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub token: RequestToken,
    pub query: String,
    pub top_k: usize,
}

/// The outcome of a dispatched request, tagged with the token it was issued under
#[derive(Debug, Clone)]
pub struct Completion {
    pub token: RequestToken,
    pub outcome: Result<Vec<Outfit>, FetchError>,
}

impl Completion {
    pub fn new(token: RequestToken, outcome: Result<Vec<Outfit>, FetchError>) -> Self {
        Self { token, outcome }
    }
}

/// What `resolve` did with a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The completion belonged to the latest request and was written to state
    Applied(SubmissionPhase),

    /// A newer request was dispatched (or this one was already resolved)
    Stale {
        token: RequestToken,
        latest: Option<RequestToken>,
    },
}

impl Resolution {
    pub fn is_applied(&self) -> bool {
        matches!(self, Resolution::Applied(_))
    }
}

/// Things that happened to the session, kept for the debug pane
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SubmitSkipped,
    SubmissionStarted {
        token: RequestToken,
        query: String,
    },
    SubmissionSucceeded {
        token: RequestToken,
        count: usize,
    },
    SubmissionFailed {
        token: RequestToken,
        message: String,
    },
    StaleCompletionDiscarded {
        token: RequestToken,
        latest: Option<RequestToken>,
    },
}

impl SessionEvent {
    pub fn describe(&self) -> String {
        match self {
            SessionEvent::SubmitSkipped => "submit ignored: empty query".to_string(),
            SessionEvent::SubmissionStarted { token, query } => {
                format!("{} started: {:?}", token, query)
            }
            SessionEvent::SubmissionSucceeded { token, count } => {
                format!("{} succeeded: {} results", token, count)
            }
            SessionEvent::SubmissionFailed { token, message } => {
                format!("{} failed: {}", token, message)
            }
            SessionEvent::StaleCompletionDiscarded { token, latest } => match latest {
                Some(latest) => format!("{} discarded (latest is {})", token, latest),
                None => format!("{} discarded (already resolved)", token),
            },
        }
    }
}
