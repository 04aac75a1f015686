// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Time Limit
//!
//! Enforces a wall-clock budget on the whole search. The clock is read only
//! every `clock_check_mask + 1` polls, so `check` stays cheap in tight
//! branching loops.
//!
//! ## Highlights
//!
//! - Every `check()` counts one step; `(steps & clock_check_mask) == 0`
//!   triggers a clock read. The default mask (`0x3FF`) reads the clock about
//!   every 1,024 polls.
//! - Once the budget is exceeded the decision is cached, so every later poll
//!   terminates without touching the clock.
//! - `init()` restarts the clock. Forks share the start time through
//!   `copy_from`, so a branch cannot extend the budget.
//!
//! ## Usage
//!
//! ```rust
//! use sojourn_search::monitor::time_limit::TimeLimit;
//! use sojourn_search::monitor::search_monitor::{SearchCommand, SearchMonitor};
//! use std::time::Duration;
//!
//! let mut limit = TimeLimit::new(Duration::from_secs(5));
//! limit.init();
//! match limit.check() {
//!     SearchCommand::Continue => { /* keep searching */ }
//!     SearchCommand::Terminate(_reason) => { /* stop */ }
//! }
//! ```

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimit {
    clock_check_mask: u64,
    steps: u64,
    time_limit: Duration,
    start_time: Instant,
    reached: bool,
}

impl TimeLimit {
    /// Default mask: Check every 1,024 polls (2^10).
    const DEFAULT_CLOCK_CHECK_MASK: u64 = 0x3FF;

    #[inline]
    pub fn new(time_limit: Duration) -> Self {
        Self::with_clock_check_mask(time_limit, Self::DEFAULT_CLOCK_CHECK_MASK)
    }

    #[inline]
    pub fn with_clock_check_mask(time_limit: Duration, clock_check_mask: u64) -> Self {
        Self {
            clock_check_mask,
            steps: 0,
            time_limit,
            start_time: Instant::now(),
            reached: false,
        }
    }

    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    #[inline]
    pub fn is_reached(&self) -> bool {
        self.reached
    }
}

impl std::fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TimeLimit({:.3}s, reached = {})",
            self.time_limit.as_secs_f64(),
            self.reached
        )
    }
}

impl SearchMonitor for TimeLimit {
    fn name(&self) -> &str {
        "TimeLimit"
    }

    fn init(&mut self) {
        self.start_time = Instant::now();
        self.steps = 0;
        self.reached = false;
    }

    #[inline]
    fn check(&mut self) -> SearchCommand {
        if !self.reached
            && (self.steps & self.clock_check_mask) == 0
            && self.start_time.elapsed() >= self.time_limit
        {
            self.reached = true;
        }
        self.steps = self.steps.wrapping_add(1);

        if self.reached {
            SearchCommand::Terminate("time limit reached".to_string())
        } else {
            SearchCommand::Continue
        }
    }

    fn on_solution_found(&mut self) -> bool {
        true
    }

    fn copy_from(&mut self, other: &dyn SearchMonitor) {
        if let Some(other) = other.as_any().downcast_ref::<Self>() {
            self.clock_check_mask = other.clock_check_mask;
            self.steps = other.steps;
            self.time_limit = other.time_limit;
            self.start_time = other.start_time;
            self.reached = other.reached;
        }
    }

    fn clone_box(&self) -> Box<dyn SearchMonitor> {
        Box::new(Self::with_clock_check_mask(
            self.time_limit,
            self.clock_check_mask,
        ))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn debug_string(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_monitor_with_limit(ms: u64) -> TimeLimit {
        TimeLimit::new(Duration::from_millis(ms))
    }

    fn past(ms: u64) -> Instant {
        Instant::now()
            .checked_sub(Duration::from_millis(ms))
            .expect("monotonic clock too close to its origin")
    }

    #[test]
    fn test_default_mask_is_power_of_two_minus_one() {
        assert_eq!(TimeLimit::DEFAULT_CLOCK_CHECK_MASK, 0x3FF);
        assert_eq!((TimeLimit::DEFAULT_CLOCK_CHECK_MASK + 1).count_ones(), 1);
    }

    #[test]
    fn test_terminates_after_time_limit_when_mask_condition_met() {
        let mut mon = new_monitor_with_limit(10);
        mon.start_time = past(50);
        mon.steps = 0;
        match mon.check() {
            SearchCommand::Terminate(msg) => {
                assert!(msg.contains("time limit"), "unexpected message: {msg}");
            }
            other => panic!("expected Terminate, got {:?}", other),
        }
        assert!(mon.is_reached());
    }

    #[test]
    fn test_continues_when_mask_condition_not_met_even_if_time_exceeded() {
        let mut mon = new_monitor_with_limit(1);
        mon.start_time = past(50);
        mon.steps = 1;
        assert_eq!(mon.check(), SearchCommand::Continue);
    }

    #[test]
    fn test_mask_zero_always_checks() {
        let mut mon = TimeLimit::with_clock_check_mask(Duration::from_millis(1), 0);
        mon.start_time = past(50);
        mon.steps = 12345;
        assert!(mon.check().is_terminate());
    }

    #[test]
    fn test_reached_is_cached() {
        let mut mon = TimeLimit::with_clock_check_mask(Duration::from_millis(1), 0x3);
        mon.start_time = past(50);
        assert!(mon.check().is_terminate());
        // Steps 1..=3 skip the clock but stay terminated.
        for _ in 0..3 {
            assert!(mon.check().is_terminate());
        }
    }

    #[test]
    fn test_check_counts_steps_wrapping() {
        let mut mon = new_monitor_with_limit(1000);
        mon.check();
        assert_eq!(mon.steps, 1);
        mon.steps = u64::MAX;
        mon.check();
        assert_eq!(mon.steps, 0);
    }

    #[test]
    fn test_init_restarts_clock() {
        let mut mon = TimeLimit::with_clock_check_mask(Duration::from_millis(20), 0);
        mon.start_time = past(50);
        assert!(mon.check().is_terminate());
        mon.init();
        assert!(!mon.is_reached());
        assert_eq!(mon.check(), SearchCommand::Continue);
    }

    #[test]
    fn test_fork_shares_start_time_through_copy_from() {
        let mut mon = TimeLimit::with_clock_check_mask(Duration::from_millis(20), 0);
        mon.start_time = past(50);

        let mut fresh = mon.clone_box();
        assert_eq!(fresh.check(), SearchCommand::Continue);

        let mut fork = mon.clone_box();
        fork.copy_from(&mon);
        assert!(fork.check().is_terminate());
    }

    #[test]
    fn test_display() {
        let mon = TimeLimit::new(Duration::from_millis(1500));
        assert_eq!(mon.to_string(), "TimeLimit(1.500s, reached = false)");
    }
}
