//! Async runtime for a live match.
//!
//! `spawn_match` moves a `TurnScheduler` into a tokio task that supplies
//! real time: pacing delays, the opponent safety bound, decision windows
//! and the one-second match clock. The player talks to it through a
//! cloneable `MatchHandle`; UIs subscribe to the event stream.
//!
//! ## Usage
//!
//! ```no_run
//! use health_board::runtime::{spawn_match, LogCommentary, Ports};
//! use health_board::scheduler::MatchBuilder;
//!
//! # async fn play() -> Result<(), health_board::core::EngineError> {
//! let scheduler = MatchBuilder::new().seed(42).build()?;
//! let running = spawn_match(scheduler, Ports::none().with_commentary(LogCommentary));
//!
//! let value = running.handle.roll_dice().await?;
//! println!("rolled {}", value);
//! # Ok(())
//! # }
//! ```

mod driver;
mod handle;
mod ports;

pub use driver::{spawn_match, RunningMatch};
pub use handle::MatchHandle;
pub use ports::{CommentaryPort, LedgerPort, LogCommentary, PortError, PortFuture, Ports};
