//! Cloneable handle to a running match.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::core::{EngineError, EngineResult};
use crate::events::MatchEvent;
use crate::scheduler::{ClaimResult, MatchSnapshot};

/// Request sent to the match actor.
#[derive(Debug)]
pub(crate) enum Request {
    Roll(oneshot::Sender<EngineResult<u8>>),
    Answer(usize, oneshot::Sender<EngineResult<bool>>),
    Claim(bool, oneshot::Sender<EngineResult<ClaimResult>>),
    Quit(oneshot::Sender<EngineResult<()>>),
    Snapshot(oneshot::Sender<MatchSnapshot>),
}

/// Player-side access to a running match.
///
/// Every call is a round trip to the match actor. Once the actor has
/// exited, calls fail with `EngineError::MatchClosed`.
#[derive(Clone, Debug)]
pub struct MatchHandle {
    requests: mpsc::Sender<Request>,
    events: broadcast::Sender<MatchEvent>,
}

impl MatchHandle {
    pub(crate) fn new(requests: mpsc::Sender<Request>, events: broadcast::Sender<MatchEvent>) -> Self {
        Self { requests, events }
    }

    /// Roll the die for the player.
    pub async fn roll_dice(&self) -> EngineResult<u8> {
        self.call(Request::Roll).await?
    }

    /// Answer the pending quiz with option `index`.
    pub async fn answer_quiz(&self, index: usize) -> EngineResult<bool> {
        self.call(|reply| Request::Answer(index, reply)).await?
    }

    /// Accept or refuse the pending claim offer.
    pub async fn respond_to_claim(&self, accept: bool) -> EngineResult<ClaimResult> {
        self.call(|reply| Request::Claim(accept, reply)).await?
    }

    /// Abandon the match.
    pub async fn quit(&self) -> EngineResult<()> {
        self.call(Request::Quit).await?
    }

    /// Copy of the drawable state.
    pub async fn snapshot(&self) -> EngineResult<MatchSnapshot> {
        self.call(Request::Snapshot).await
    }

    /// Subscribe to events from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.events.subscribe()
    }

    /// Whether the match actor has exited.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.requests.is_closed()
    }

    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Request) -> EngineResult<T> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(make(reply))
            .await
            .map_err(|_| EngineError::MatchClosed)?;
        response.await.map_err(|_| EngineError::MatchClosed)
    }
}
