//! Outbound collaborator ports.
//!
//! Ports are fire-and-forget: the match loop spawns each call with a
//! timeout and never waits on it. A failing or slow port can cost a line
//! of commentary or an experience award, never a turn.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::core::EngineError;

/// Error reported by a port implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// The collaborator could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The collaborator refused the request.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Boxed future returned by ports.
pub type PortFuture = Pin<Box<dyn Future<Output = Result<(), PortError>> + Send + 'static>>;

/// Narrates landings and the final result.
pub trait CommentaryPort: Send + Sync {
    /// Narrate a short description of something that happened.
    fn notify(&self, description: String) -> PortFuture;
}

/// Credits the player's avatar with experience.
pub trait LedgerPort: Send + Sync {
    /// Award `amount` experience.
    fn award_experience(&self, amount: u32) -> PortFuture;
}

/// Commentary that writes to the tracing log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogCommentary;

impl CommentaryPort for LogCommentary {
    fn notify(&self, description: String) -> PortFuture {
        Box::pin(async move {
            info!(target: "health_board::commentary", "{}", description);
            Ok(())
        })
    }
}

/// Collaborators attached to a running match.
#[derive(Clone, Default)]
pub struct Ports {
    commentary: Option<Arc<dyn CommentaryPort>>,
    ledger: Option<Arc<dyn LedgerPort>>,
    timeout: Duration,
}

impl std::fmt::Debug for Ports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ports")
            .field("commentary", &self.commentary.is_some())
            .field("ledger", &self.ledger.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Ports {
    /// No collaborators.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Attach a commentary port.
    #[must_use]
    pub fn with_commentary(mut self, port: impl CommentaryPort + 'static) -> Self {
        self.commentary = Some(Arc::new(port));
        self
    }

    /// Attach a ledger port.
    #[must_use]
    pub fn with_ledger(mut self, port: impl LedgerPort + 'static) -> Self {
        self.ledger = Some(Arc::new(port));
        self
    }

    /// Bound on each port call. Zero means the match configuration decides.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn resolve_timeout(&mut self, fallback: Duration) {
        if self.timeout.is_zero() {
            self.timeout = fallback;
        }
    }

    /// Spawn a commentary call.
    pub(crate) fn narrate(&self, description: String) {
        let Some(port) = self.commentary.clone() else {
            return;
        };
        let limit = self.timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(limit, port.notify(description)).await {
                Ok(Ok(())) => trace!("commentary delivered"),
                Ok(Err(err)) => {
                    let err = EngineError::ExternalNotifyFailure(err.to_string());
                    debug!(error = %err, "commentary dropped");
                }
                Err(_) => debug!(?limit, "commentary timed out"),
            }
        });
    }

    /// Spawn an experience award.
    pub(crate) fn award(&self, amount: u32) {
        let Some(port) = self.ledger.clone() else {
            return;
        };
        let limit = self.timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(limit, port.award_experience(amount)).await {
                Ok(Ok(())) => info!(amount, "experience awarded"),
                Ok(Err(err)) => {
                    let err = EngineError::ExternalNotifyFailure(err.to_string());
                    warn!(error = %err, amount, "experience award failed");
                }
                Err(_) => warn!(amount, ?limit, "experience award timed out"),
            }
        });
    }
}
