//! Resume-delay hints for suspended units.
//!
//! The host scheduler owns the real timer; a unit only suggests how long to
//! wait, backing off as the number of polls grows.

use crate::config::PollingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Poll counters persisted with the unit's output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollAttempts {
    /// Poll cycles run since initiation
    pub total: u32,
    /// Consecutive poll cycles that hit a transport error
    pub failed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    intervals: Vec<Duration>,
    attempts_before_next_interval: u32,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default())
    }
}

impl PollSchedule {
    pub fn new(intervals: Vec<Duration>, attempts_before_next_interval: u32) -> Self {
        Self {
            intervals,
            attempts_before_next_interval: attempts_before_next_interval.max(1),
        }
    }

    pub fn from_config(config: &PollingConfig) -> Self {
        Self::new(config.intervals(), config.attempts_before_next_interval)
    }

    /// Suggested delay before the next poll, given polls run so far
    pub fn delay_for(&self, total_polls: u32) -> Duration {
        let index = (total_polls / self.attempts_before_next_interval) as usize;
        self.intervals
            .get(index)
            .or_else(|| self.intervals.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}
