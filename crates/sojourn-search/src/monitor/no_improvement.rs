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

//! # No-Improvement Limit
//!
//! Stops the search once it has converged: either too many consecutive
//! solutions failed to strictly improve the best objective, or too much wall
//! clock time has passed since the last improvement.
//!
//! ## Highlights
//!
//! - `stagnation_count` is reset to zero by a strictly better solution and
//!   incremented by every other one. The limit is crossed once it exceeds
//!   the tolerance, so exactly `tolerance` stale solutions are still allowed.
//! - The time budget is measured from the last improvement (or from `init`),
//!   with a monotonic clock.
//! - Once crossed, the limit stays crossed until the next `init`.
//! - `clone_box` yields a fresh limit on the same objective source;
//!   `copy_from` copies the full [`TerminationState`].
//!
//! ## Usage
//!
//! ```rust
//! use sojourn_search::monitor::no_improvement::NoImprovementLimit;
//! use sojourn_search::monitor::search_monitor::SearchMonitor;
//! use sojourn_search::objective::{ObjectiveSense, ObjectiveTracker, ObjectiveVar};
//! use std::time::Duration;
//!
//! let cost = ObjectiveVar::new();
//! let tracker = ObjectiveTracker::new(Some(cost.clone())).unwrap();
//! let mut limit =
//!     NoImprovementLimit::new(tracker, 1, Duration::from_secs(60), ObjectiveSense::Minimize);
//! limit.init();
//!
//! for objective in [10, 12, 11] {
//!     cost.set(objective);
//!     limit.on_solution_found();
//! }
//! assert!(limit.check().is_terminate());
//! ```

use crate::{
    monitor::search_monitor::{SearchCommand, SearchMonitor},
    objective::{ObjectiveSense, ObjectiveTracker},
};
use std::time::{Duration, Instant};

/// Progress state of a [`NoImprovementLimit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerminationState {
    best_value: i64,
    stagnation_count: u64,
    last_improvement: Instant,
    reached: bool,
}

impl TerminationState {
    #[inline]
    fn fresh(sense: ObjectiveSense) -> Self {
        Self {
            best_value: sense.worst(),
            stagnation_count: 0,
            last_improvement: Instant::now(),
            reached: false,
        }
    }

    #[inline]
    pub fn best_value(&self) -> i64 {
        self.best_value
    }

    #[inline]
    pub fn stagnation_count(&self) -> u64 {
        self.stagnation_count
    }

    #[inline]
    pub fn last_improvement(&self) -> Instant {
        self.last_improvement
    }

    #[inline]
    pub fn reached(&self) -> bool {
        self.reached
    }
}

#[derive(Clone, Debug)]
pub struct NoImprovementLimit {
    objective: ObjectiveTracker,
    stagnation_tolerance: u64,
    time_budget: Duration,
    sense: ObjectiveSense,
    state: TerminationState,
}

impl NoImprovementLimit {
    #[inline]
    pub fn new(
        objective: ObjectiveTracker,
        stagnation_tolerance: u64,
        time_budget: Duration,
        sense: ObjectiveSense,
    ) -> Self {
        Self {
            objective,
            stagnation_tolerance,
            time_budget,
            sense,
            state: TerminationState::fresh(sense),
        }
    }

    #[inline]
    pub fn state(&self) -> &TerminationState {
        &self.state
    }

    #[inline]
    pub fn stagnation_tolerance(&self) -> u64 {
        self.stagnation_tolerance
    }

    #[inline]
    pub fn time_budget(&self) -> Duration {
        self.time_budget
    }

    #[inline]
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    #[inline]
    pub fn objective(&self) -> &ObjectiveTracker {
        &self.objective
    }

    /// Returns `true` once the limit has been crossed.
    #[inline]
    pub fn is_reached(&self) -> bool {
        self.state.reached
    }

    /// Folds one objective sample into the termination state.
    pub fn observe(&mut self, sample: i64) {
        if self.sense.is_better(sample, self.state.best_value) {
            self.state.best_value = sample;
            self.state.stagnation_count = 0;
            self.state.last_improvement = Instant::now();
        } else {
            self.state.stagnation_count = self.state.stagnation_count.saturating_add(1);
        }
    }

    #[inline]
    fn limit_crossed(&self) -> bool {
        self.state.stagnation_count > self.stagnation_tolerance
            || self.state.last_improvement.elapsed() > self.time_budget
    }
}

impl std::fmt::Display for NoImprovementLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NoImprovementLimit(crossed = {})", self.state.reached)
    }
}

impl SearchMonitor for NoImprovementLimit {
    fn name(&self) -> &str {
        "NoImprovementLimit"
    }

    fn init(&mut self) {
        self.state = TerminationState::fresh(self.sense);
    }

    fn check(&mut self) -> SearchCommand {
        if !self.state.reached && self.limit_crossed() {
            self.state.reached = true;
            tracing::debug!(
                stagnation_count = self.state.stagnation_count,
                best_value = self.state.best_value,
                "no improvement limit crossed"
            );
        }

        if self.state.reached {
            SearchCommand::Terminate("no improvement limit reached".to_string())
        } else {
            SearchCommand::Continue
        }
    }

    fn on_solution_found(&mut self) -> bool {
        let sample = self.objective.sample();
        self.observe(sample);
        true
    }

    fn copy_from(&mut self, other: &dyn SearchMonitor) {
        if let Some(other) = other.as_any().downcast_ref::<Self>() {
            self.stagnation_tolerance = other.stagnation_tolerance;
            self.time_budget = other.time_budget;
            self.sense = other.sense;
            self.state = other.state;
        }
    }

    fn clone_box(&self) -> Box<dyn SearchMonitor> {
        Box::new(Self::new(
            self.objective.clone(),
            self.stagnation_tolerance,
            self.time_budget,
            self.sense,
        ))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn debug_string(&self) -> String {
        self.to_string()
    }
}
