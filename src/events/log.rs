//! Bounded display log, newest line first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::event::MatchEvent;

/// The most recent log lines, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl EventLog {
    /// Create a log keeping at most `capacity` lines.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a line, dropping the oldest past capacity.
    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        self.lines.push_front(line.into());
        self.lines.truncate(self.capacity);
    }

    /// Record an event's log line, if it has one.
    pub fn record(&mut self, event: &MatchEvent) {
        if let Some(line) = event.log_line() {
            self.push(line);
        }
    }

    /// Iterate newest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Number of lines held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no lines are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Side;

    #[test]
    fn test_newest_first_and_bounded() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.push(format!("line {}", i));
        }

        let lines: Vec<_> = log.lines().collect();
        assert_eq!(lines, vec!["line 4", "line 3", "line 2"]);
    }

    #[test]
    fn test_record_skips_silent_events() {
        let mut log = EventLog::new(10);
        log.record(&MatchEvent::ClockTick { remaining_seconds: 10 });
        assert!(log.is_empty());

        log.record(&MatchEvent::Resting {
            side: Side::Opponent,
            remaining: 0,
        });
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_zero_capacity() {
        let mut log = EventLog::new(0);
        log.push("ignored");
        assert!(log.is_empty());
    }
}
