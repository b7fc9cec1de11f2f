//! Text projection of the session state.
//!
//! Everything here is a plain function of `SessionState`; the TUI only adds
//! styling and layout on top.

use crate::config::DisplayConfig;
use crate::session::{Outfit, SessionState, SubmissionPhase};

pub const PLACEHOLDER_HINT: &str =
    "No results yet - describe a look above, e.g. \"black minimal streetwear blazer\"";

pub const INPUT_HINT: &str = "e.g. \"red cozy knit\" or \"blue denim streetwear\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Hint,
    Busy,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

/// One line of status under the input box, driven by the phase of the last submission
pub fn status_line(state: &SessionState, display: &DisplayConfig) -> StatusLine {
    let icons = &display.icons;
    match state.phase() {
        SubmissionPhase::Submitting => StatusLine {
            kind: StatusKind::Busy,
            text: format!("{} Searching...", icons.busy),
        },
        _ if state.is_blank() => StatusLine {
            kind: StatusKind::Hint,
            text: PLACEHOLDER_HINT.to_string(),
        },
        SubmissionPhase::Failed => StatusLine {
            kind: StatusKind::Error,
            text: format!("{} {}", icons.error, state.error().unwrap_or_default()),
        },
        SubmissionPhase::Idle | SubmissionPhase::Succeeded => {
            let count = state.results().len();
            StatusLine {
                kind: StatusKind::Success,
                text: format!(
                    "{} {} result{}",
                    icons.success,
                    count,
                    if count == 1 { "" } else { "s" }
                ),
            }
        }
    }
}

/// Label of the submit control
pub fn submit_label(state: &SessionState) -> &'static str {
    if state.is_busy() {
        "Searching..."
    } else {
        "Go"
    }
}

pub fn format_score(score: f64, precision: usize) -> String {
    format!("{:.*}", precision, score)
}

/// The text lines of one result card: title, attributes, score, image
pub fn outfit_lines(rank: usize, outfit: &Outfit, display: &DisplayConfig) -> Vec<String> {
    let mut lines = vec![
        format!("{}. {}", rank, outfit.title),
        format!("   Color: {} · Tags: {}", outfit.color, outfit.tags),
        format!(
            "   Score: {}",
            format_score(outfit.score, display.score_precision)
        ),
    ];
    if display.show_image_urls && outfit.has_image() {
        lines.push(format!("   {} {}", display.icons.image, outfit.image_url));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SearchSession;

    fn outfit() -> Outfit {
        Outfit {
            id: 1,
            title: "Black blazer".into(),
            image_url: "https://img.example/1.jpg".into(),
            color: "black".into(),
            tags: "minimal".into(),
            score: 0.9123,
        }
    }

    #[test]
    fn test_blank_state_shows_hint() {
        let status = status_line(&SessionState::default(), &DisplayConfig::default());
        assert_eq!(status.kind, StatusKind::Hint);
        assert_eq!(status.text, PLACEHOLDER_HINT);
    }

    #[test]
    fn test_busy_state() {
        let mut session = SearchSession::new();
        session.update_query("blue denim");
        session.submit();

        let status = status_line(session.state(), &DisplayConfig::default());
        assert_eq!(status.kind, StatusKind::Busy);
        assert_eq!(submit_label(session.state()), "Searching...");
    }

    #[tokio::test]
    async fn test_status_follows_last_outcome() {
        use crate::api_client::{FetchError, RecommendationService};
        use async_trait::async_trait;

        struct Answer(Result<Vec<Outfit>, FetchError>);

        #[async_trait]
        impl RecommendationService for Answer {
            async fn recommend(
                &self,
                _query: &str,
                _top_k: usize,
            ) -> Result<Vec<Outfit>, FetchError> {
                self.0.clone()
            }
        }

        let display = DisplayConfig::default();
        let mut session = SearchSession::new();
        session.update_query("black blazer");

        session.submit_and_wait(&Answer(Ok(vec![outfit()]))).await;
        let status = status_line(session.state(), &display);
        assert_eq!(status.kind, StatusKind::Success);
        assert!(status.text.ends_with("1 result"));

        session
            .submit_and_wait(&Answer(Err(FetchError::Service { status: 500 })))
            .await;
        let status = status_line(session.state(), &display);
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.ends_with("API error: 500"));

        // A successful search with no matches has nothing to report
        session.submit_and_wait(&Answer(Ok(vec![]))).await;
        assert_eq!(status_line(session.state(), &display).kind, StatusKind::Hint);
    }

    #[test]
    fn test_score_precision() {
        assert_eq!(format_score(0.91, 3), "0.910");
        assert_eq!(format_score(0.78456, 2), "0.78");
    }

    #[test]
    fn test_outfit_lines() {
        let display = DisplayConfig::default();
        let lines = outfit_lines(1, &outfit(), &display);
        assert_eq!(lines[0], "1. Black blazer");
        assert_eq!(lines[2], "   Score: 0.912");
        assert_eq!(lines.len(), 4);

        let mut no_image = outfit();
        no_image.image_url = String::new();
        assert_eq!(outfit_lines(1, &no_image, &display).len(), 3);
    }
}
