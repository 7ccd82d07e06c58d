//! Outbound events and the bounded display log.
//!
//! The scheduler queues a `MatchEvent` for every transition. The runtime
//! drains the queue after each step, fans events out to subscribers and
//! forwards narration-worthy ones to the commentary port.

mod event;
mod log;

pub use event::{DeclineReason, MatchEvent};
pub use log::EventLog;
