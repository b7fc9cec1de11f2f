use crate::api_client::RecommendationService;
use crate::session::{Completion, Dispatch, SearchSession};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Runs dispatched requests on the tokio runtime and hands their completions
/// back to whoever owns the session.
///
/// The session itself never crosses threads: the UI loop calls `dispatch`,
/// keeps drawing, and later drains completions into `SearchSession::resolve`.
pub struct SubmissionDispatcher {
    service: Arc<dyn RecommendationService>,
    runtime: Handle,
    sender: UnboundedSender<Completion>,
    receiver: UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl SubmissionDispatcher {
    pub fn new(service: Arc<dyn RecommendationService>, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            service,
            runtime,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Issue the request described by `dispatch` in the background
    pub fn dispatch(&mut self, dispatch: Dispatch) {
        let service = Arc::clone(&self.service);
        let sender = self.sender.clone();
        self.in_flight += 1;

        debug!(target: "dispatch", "Spawning request {}", dispatch.token);
        self.runtime.spawn(async move {
            let outcome = service.recommend(&dispatch.query, dispatch.top_k).await;
            if sender.send(Completion::new(dispatch.token, outcome)).is_err() {
                warn!(target: "dispatch", "Completion {} dropped: receiver gone", dispatch.token);
            }
        });
    }

    /// Requests spawned but not yet drained
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Next completion if one is ready, without blocking
    pub fn try_next(&mut self) -> Option<Completion> {
        match self.receiver.try_recv() {
            Ok(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(completion)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait for the next completion
    pub async fn next(&mut self) -> Option<Completion> {
        let completion = self.receiver.recv().await;
        if completion.is_some() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        completion
    }

    /// Feed every ready completion into the session. Returns how many were applied.
    pub fn drain_into(&mut self, session: &mut SearchSession) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.try_next() {
            if session.resolve(completion).is_applied() {
                applied += 1;
            }
        }
        applied
    }
}
