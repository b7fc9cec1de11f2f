use crate::api_client::{RecommendationService, TOP_K};
use crate::session::events::{Completion, Dispatch, RequestToken, Resolution, SessionEvent};
use crate::session::state::SessionState;
use crate::session::transition;
use tracing::{debug, info, trace, warn};

/// Maximum number of session events kept for the debug pane
const MAX_HISTORY: usize = 100;

/// Owns the session state and decides which request outcome gets to update it
pub struct SearchSession {
    state: SessionState,

    /// Token handed to the most recent dispatch
    last_token: RequestToken,

    /// Token of the latest dispatch that has not been resolved yet
    pending: Option<RequestToken>,

    history: Vec<SessionEvent>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::default(),
            last_token: RequestToken::default(),
            pending: None,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Token a completion has to carry to be applied
    pub fn pending_token(&self) -> Option<RequestToken> {
        self.pending
    }

    pub fn history(&self) -> &[SessionEvent] {
        &self.history
    }

    /// Replace the query text. Allowed while a request is in flight.
    pub fn update_query(&mut self, text: &str) {
        trace!(target: "session", "Query updated ({} chars)", text.len());
        transition::edit_query(&mut self.state, text);
    }

    /// Start a submission for the current query.
    ///
    /// Returns the request to issue, or `None` when the query is blank (in which
    /// case nothing changed).
    pub fn submit(&mut self) -> Option<Dispatch> {
        if !transition::begin_submission(&mut self.state) {
            trace!(target: "session", "Submit ignored: query is blank");
            self.record(SessionEvent::SubmitSkipped);
            return None;
        }

        let token = self.last_token.next();
        self.last_token = token;
        if let Some(previous) = self.pending.replace(token) {
            debug!(target: "session", "{} supersedes in-flight {}", token, previous);
        }

        let query = self.state.query.clone();
        info!(target: "session", "Submitting {}: {:?}", token, query);
        self.record(SessionEvent::SubmissionStarted {
            token,
            query: query.clone(),
        });

        Some(Dispatch {
            token,
            query,
            top_k: TOP_K,
        })
    }

    /// Feed back the outcome of a dispatched request.
    ///
    /// Only the completion for the latest dispatch is applied; anything older is
    /// dropped without touching state.
    pub fn resolve(&mut self, completion: Completion) -> Resolution {
        let Completion { token, outcome } = completion;

        if self.pending != Some(token) {
            debug!(
                target: "session",
                "Discarding stale completion {} (pending: {:?})",
                token,
                self.pending.map(|t| t.value())
            );
            self.record(SessionEvent::StaleCompletionDiscarded {
                token,
                latest: self.pending,
            });
            return Resolution::Stale {
                token,
                latest: self.pending,
            };
        }

        self.pending = None;
        let event = match &outcome {
            Ok(results) => {
                info!(target: "session", "{} returned {} results", token, results.len());
                SessionEvent::SubmissionSucceeded {
                    token,
                    count: results.len(),
                }
            }
            Err(err) => {
                warn!(target: "session", "{} failed ({}): {}", token, err.kind(), err);
                SessionEvent::SubmissionFailed {
                    token,
                    message: err.to_string(),
                }
            }
        };

        let phase = transition::finish_submission(&mut self.state, outcome);
        self.record(event);
        Resolution::Applied(phase)
    }

    /// Submit and wait for the service in one go.
    ///
    /// Used where only one request can be outstanding at a time (the line REPL).
    /// Returns `None` if the query was blank.
    pub async fn submit_and_wait(
        &mut self,
        service: &dyn RecommendationService,
    ) -> Option<Resolution> {
        let dispatch = self.submit()?;
        let outcome = service.recommend(&dispatch.query, dispatch.top_k).await;
        Some(self.resolve(Completion::new(dispatch.token, outcome)))
    }

    fn record(&mut self, event: SessionEvent) {
        self.history.push(event);
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::FetchError;
    use crate::session::state::{Outfit, SubmissionPhase};

    fn outfit(id: i64, score: f64) -> Outfit {
        Outfit {
            id,
            title: format!("Look {}", id),
            image_url: format!("https://img.example/{}.jpg", id),
            color: "black".into(),
            tags: "streetwear, minimal".into(),
            score,
        }
    }

    #[test]
    fn test_submit_blank_is_noop() {
        let mut session = SearchSession::new();
        session.update_query("   ");
        let before = session.state().clone();

        assert!(session.submit().is_none());
        assert_eq!(session.state(), &before);
        assert!(session.pending_token().is_none());
    }

    #[test]
    fn test_submit_sets_busy_before_response() {
        let mut session = SearchSession::new();
        session.update_query("black minimal streetwear blazer");

        let dispatch = session.submit().unwrap();
        assert!(session.state().is_busy());
        assert_eq!(dispatch.query, "black minimal streetwear blazer");
        assert_eq!(dispatch.top_k, 5);
        assert_eq!(session.state().phase(), SubmissionPhase::Submitting);
    }

    #[test]
    fn test_tokens_increase() {
        let mut session = SearchSession::new();
        session.update_query("a");
        let first = session.submit().unwrap().token;
        let second = session.submit().unwrap().token;
        assert!(second > first);
        assert_eq!(session.pending_token(), Some(second));
    }

    #[test]
    fn test_later_submission_wins_when_earlier_resolves_last() {
        let mut session = SearchSession::new();
        session.update_query("first");
        let a = session.submit().unwrap();
        session.update_query("second");
        let b = session.submit().unwrap();

        let applied = session.resolve(Completion::new(b.token, Ok(vec![outfit(2, 0.8)])));
        assert_eq!(applied, Resolution::Applied(SubmissionPhase::Succeeded));

        let stale = session.resolve(Completion::new(
            a.token,
            Err(FetchError::Service { status: 500 }),
        ));
        assert!(!stale.is_applied());

        assert!(session.state().error().is_none());
        assert_eq!(session.state().results(), &[outfit(2, 0.8)]);
        assert!(!session.state().is_busy());
    }

    #[test]
    fn test_earlier_resolving_first_keeps_busy() {
        let mut session = SearchSession::new();
        session.update_query("first");
        let a = session.submit().unwrap();
        let b = session.submit().unwrap();

        session.resolve(Completion::new(a.token, Ok(vec![outfit(1, 0.9)])));
        assert!(session.state().is_busy());
        assert!(session.state().results().is_empty());

        session.resolve(Completion::new(b.token, Ok(vec![])));
        assert!(!session.state().is_busy());
        assert!(session.state().results().is_empty());
    }

    #[test]
    fn test_duplicate_completion_is_ignored() {
        let mut session = SearchSession::new();
        session.update_query("knit");
        let dispatch = session.submit().unwrap();

        session.resolve(Completion::new(dispatch.token, Ok(vec![outfit(1, 0.7)])));
        let again = session.resolve(Completion::new(
            dispatch.token,
            Err(FetchError::Transport("reset".into())),
        ));

        assert_eq!(
            again,
            Resolution::Stale {
                token: dispatch.token,
                latest: None
            }
        );
        assert_eq!(session.state().results().len(), 1);
        assert!(session.state().error().is_none());
    }

    #[test]
    fn test_update_query_same_text_is_idempotent() {
        let mut session = SearchSession::new();
        session.update_query("red cozy knit");
        let dispatch = session.submit().unwrap();
        session.resolve(Completion::new(
            dispatch.token,
            Err(FetchError::Service { status: 500 }),
        ));
        let before = session.state().clone();

        for _ in 0..3 {
            session.update_query("red cozy knit");
        }
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut session = SearchSession::new();
        for _ in 0..(MAX_HISTORY + 20) {
            session.submit();
        }
        assert_eq!(session.history().len(), MAX_HISTORY);
        assert!(session
            .history()
            .iter()
            .all(|e| *e == SessionEvent::SubmitSkipped));
    }
}
