use crate::session::state::Outfit;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of recommendations requested per submission
pub const TOP_K: usize = 5;

/// Endpoint path on the recommendation service
pub const RECOMMEND_PATH: &str = "/recommend";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    pub top_k: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub results: Option<Vec<Outfit>>,
}

impl RecommendResponse {
    /// A missing or null `results` field means no matches, not a failure
    pub fn into_results(self) -> Vec<Outfit> {
        self.results.unwrap_or_default()
    }
}

/// Ways a recommendation request can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Nothing came back: connection refused, DNS failure, timeout...
    #[error("Could not reach the recommendation service: {0}")]
    Transport(String),

    #[error("API error: {status}")]
    Service { status: u16 },

    #[error("Malformed response from recommendation service: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Service { .. } => "service",
            FetchError::MalformedResponse(_) => "malformed",
        }
    }
}

/// The remote collaborator that turns a style description into ranked outfits
#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn recommend(&self, query: &str, top_k: usize) -> Result<Vec<Outfit>, FetchError>;
}

#[derive(Clone)]
pub struct HttpRecommendationService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRecommendationService {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client with an optional overall request timeout
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, RECOMMEND_PATH)
    }
}

#[async_trait]
impl RecommendationService for HttpRecommendationService {
    async fn recommend(&self, query: &str, top_k: usize) -> Result<Vec<Outfit>, FetchError> {
        let url = self.endpoint();
        let request = RecommendRequest {
            query: query.to_string(),
            top_k,
        };

        debug!(target: "api", "POST {} (top_k={}) query={:?}", url, top_k, query);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "api", "Request to {} failed: {}", url, e);
                FetchError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "api", "Service answered {} for {}", status, url);
            return Err(FetchError::Service {
                status: status.as_u16(),
            });
        }

        // Read the body first so a broken connection and a bad payload stay distinguishable
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let parsed: RecommendResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!(target: "api", "Could not decode response body: {}", e);
            FetchError::MalformedResponse(e.to_string())
        })?;

        let results = parsed.into_results();
        debug!(target: "api", "Received {} outfits", results.len());
        Ok(results)
    }
}
