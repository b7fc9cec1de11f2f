use serde::{Deserialize, Deserializer, Serialize};

/// A single recommended item as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
    pub color: String,
    pub tags: String,
    pub score: f64,
}

impl Outfit {
    pub fn has_image(&self) -> bool {
        !self.image_url.trim().is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where the most recent submission stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Client state for one search session.
///
/// Fields are only writable from inside the session module so every mutation
/// goes through the transition functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub(crate) query: String,
    pub(crate) is_busy: bool,
    pub(crate) error: Option<String>,
    pub(crate) results: Vec<Outfit>,
    pub(crate) phase: SubmissionPhase,
}

impl SessionState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn results(&self) -> &[Outfit] {
        &self.results
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Nothing to show yet: not busy, no error, no results
    pub fn is_blank(&self) -> bool {
        !self.is_busy && self.error.is_none() && self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outfit_null_image() {
        let outfit: Outfit = serde_json::from_str(
            r#"{"id": 3, "title": "Knit", "image_url": null, "color": "red", "tags": "cozy", "score": 0.5}"#,
        )
        .unwrap();
        assert_eq!(outfit.image_url, "");
        assert!(!outfit.has_image());
    }

    #[test]
    fn test_outfit_missing_image() {
        let outfit: Outfit = serde_json::from_str(
            r#"{"id": 3, "title": "Knit", "color": "red", "tags": "cozy", "score": 0.5}"#,
        )
        .unwrap();
        assert!(!outfit.has_image());
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::default();
        assert_eq!(state.query(), "");
        assert!(!state.is_busy());
        assert!(state.error().is_none());
        assert!(state.results().is_empty());
        assert_eq!(state.phase(), SubmissionPhase::Idle);
        assert!(state.is_blank());
    }
}
