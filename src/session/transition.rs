//! State transitions for a search session.
//!
//! These functions only touch the `SessionState` they are handed; request
//! tokens and event bookkeeping live in `SearchSession`.

use crate::api_client::FetchError;
use crate::session::state::{Outfit, SessionState, SubmissionPhase};

/// Replace the query text verbatim
pub fn edit_query(state: &mut SessionState, text: &str) {
    if state.query != text {
        state.query.clear();
        state.query.push_str(text);
    }
}

/// The only input check: the trimmed query must not be empty.
/// A byte order mark counts as whitespace here.
pub fn is_submittable(state: &SessionState) -> bool {
    !state
        .query
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .is_empty()
}

/// Enter `Submitting`. Returns false and leaves state untouched when the query is blank.
pub fn begin_submission(state: &mut SessionState) -> bool {
    if !is_submittable(state) {
        return false;
    }

    state.error = None;
    state.is_busy = true;
    state.phase = SubmissionPhase::Submitting;
    true
}

/// Apply the outcome of the latest request. Results are always replaced wholesale.
pub fn finish_submission(
    state: &mut SessionState,
    outcome: Result<Vec<Outfit>, FetchError>,
) -> SubmissionPhase {
    match outcome {
        Ok(results) => {
            state.results = results;
            state.error = None;
            state.phase = SubmissionPhase::Succeeded;
        }
        Err(err) => {
            state.results = Vec::new();
            state.error = Some(err.to_string());
            state.phase = SubmissionPhase::Failed;
        }
    }
    state.is_busy = false;
    state.phase
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outfit(id: i64) -> Outfit {
        Outfit {
            id,
            title: format!("Outfit {}", id),
            image_url: String::new(),
            color: "black".into(),
            tags: "minimal".into(),
            score: 0.5,
        }
    }

    #[test]
    fn test_begin_clears_error_and_sets_busy() {
        let mut state = SessionState::default();
        edit_query(&mut state, "blue denim");
        state.error = Some("API error: 500".into());

        assert!(begin_submission(&mut state));
        assert!(state.is_busy);
        assert!(state.error.is_none());
        assert_eq!(state.phase, SubmissionPhase::Submitting);
    }

    #[test]
    fn test_begin_rejects_whitespace() {
        let mut state = SessionState::default();
        edit_query(&mut state, " \t\n ");
        let before = state.clone();

        assert!(!begin_submission(&mut state));
        assert_eq!(state, before);
    }

    #[test]
    fn test_begin_rejects_byte_order_mark() {
        let mut state = SessionState::default();
        edit_query(&mut state, "\u{feff}");
        assert!(!begin_submission(&mut state));

        edit_query(&mut state, " \u{feff}\u{a0} ");
        assert!(!begin_submission(&mut state));
        assert!(!state.is_busy);

        edit_query(&mut state, "\u{feff}linen");
        assert!(begin_submission(&mut state));
    }

    #[test]
    fn test_begin_keeps_previous_results_until_finish() {
        let mut state = SessionState::default();
        state.results = vec![outfit(1)];
        edit_query(&mut state, "red");

        begin_submission(&mut state);
        assert_eq!(state.results.len(), 1);
    }

    #[test]
    fn test_failure_empties_results() {
        let mut state = SessionState::default();
        state.results = vec![outfit(1), outfit(2)];
        state.is_busy = true;

        let phase = finish_submission(&mut state, Err(FetchError::Service { status: 502 }));
        assert_eq!(phase, SubmissionPhase::Failed);
        assert!(state.results.is_empty());
        assert_eq!(state.error.as_deref(), Some("API error: 502"));
        assert!(!state.is_busy);
    }

    #[test]
    fn test_success_replaces_results() {
        let mut state = SessionState::default();
        state.results = vec![outfit(1), outfit(2), outfit(3)];
        state.is_busy = true;

        finish_submission(&mut state, Ok(vec![outfit(9)]));
        assert_eq!(state.results, vec![outfit(9)]);
        assert!(state.error.is_none());
        assert!(!state.is_busy);
    }

    #[test]
    fn test_edit_query_is_verbatim() {
        let mut state = SessionState::default();
        edit_query(&mut state, "  padded  ");
        assert_eq!(state.query, "  padded  ");
    }
}
