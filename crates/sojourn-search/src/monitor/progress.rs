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

//! # Progress Logger
//!
//! Observability monitor. It never stops the search; it only reports what
//! the search is doing:
//!
//! - an improvement record whenever a solution strictly beats the best seen,
//! - a milestone record when the number of observed solutions reaches the
//!   next power of two (1, 2, 4, 8, ...), so long searches stay readable,
//! - a final record with the best value and the iteration count once the
//!   search has exited.
//!
//! Records go to `tracing` at `info` level. [`ProgressLogger::observe`]
//! also returns them so callers can assert on the exact output.

use crate::{
    monitor::search_monitor::{SearchCommand, SearchMonitor},
    objective::{ObjectiveSense, ObjectiveTracker},
};

/// A single progress record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressRecord {
    /// `best_value` was found after `iteration` earlier solutions.
    Improvement { iteration: u64, best_value: i64 },
    /// `iteration` solutions have been observed so far.
    Milestone { iteration: u64 },
    /// Summary emitted once the search is over.
    Final { iteration: u64, best_value: i64 },
}

impl std::fmt::Display for ProgressRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressRecord::Improvement {
                iteration,
                best_value,
            } => write!(f, "Improvement(iteration: {}, best: {})", iteration, best_value),
            ProgressRecord::Milestone { iteration } => {
                write!(f, "Milestone(iteration: {})", iteration)
            }
            ProgressRecord::Final {
                iteration,
                best_value,
            } => write!(f, "Final(iterations: {}, best: {})", iteration, best_value),
        }
    }
}

/// Records emitted by a single observation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub improvement: Option<ProgressRecord>,
    pub milestone: Option<ProgressRecord>,
}

impl ProgressUpdate {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.improvement.is_none() && self.milestone.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressState {
    best_value: i64,
    iteration_count: u64,
    next_log_exponent: u32,
}

impl ProgressState {
    #[inline]
    fn fresh(sense: ObjectiveSense) -> Self {
        Self {
            best_value: sense.worst(),
            iteration_count: 0,
            next_log_exponent: 0,
        }
    }

    #[inline]
    pub fn best_value(&self) -> i64 {
        self.best_value
    }

    #[inline]
    pub fn iteration_count(&self) -> u64 {
        self.iteration_count
    }

    #[inline]
    pub fn next_log_exponent(&self) -> u32 {
        self.next_log_exponent
    }

    /// Iteration count at which the next milestone fires, `None` once the
    /// exponent has run past `u64`.
    #[inline]
    pub fn next_milestone(&self) -> Option<u64> {
        1u64.checked_shl(self.next_log_exponent)
    }
}

#[derive(Clone, Debug)]
pub struct ProgressLogger {
    objective: ObjectiveTracker,
    sense: ObjectiveSense,
    cost_scale: i64,
    state: ProgressState,
}

impl ProgressLogger {
    #[inline]
    pub fn new(objective: ObjectiveTracker, sense: ObjectiveSense) -> Self {
        Self {
            objective,
            sense,
            cost_scale: 1,
            state: ProgressState::fresh(sense),
        }
    }

    /// Divides every logged cost by `cost_scale`. Values below one are
    /// treated as one.
    #[inline]
    pub fn with_cost_scale(mut self, cost_scale: i64) -> Self {
        self.cost_scale = cost_scale.max(1);
        self
    }

    #[inline]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    #[inline]
    pub fn cost_scale(&self) -> i64 {
        self.cost_scale
    }

    #[inline]
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    #[inline]
    fn scaled(&self, value: i64) -> f64 {
        value as f64 / self.cost_scale as f64
    }

    /// Folds one objective sample into the progress state and logs the
    /// resulting records.
    pub fn observe(&mut self, sample: i64) -> ProgressUpdate {
        let mut update = ProgressUpdate::default();

        if self.sense.is_better(sample, self.state.best_value) {
            self.state.best_value = sample;
            let record = ProgressRecord::Improvement {
                iteration: self.state.iteration_count,
                best_value: sample,
            };
            tracing::info!(
                iteration = self.state.iteration_count,
                best = self.scaled(sample),
                "improved solution"
            );
            update.improvement = Some(record);
        }

        self.state.iteration_count = self.state.iteration_count.saturating_add(1);

        if let Some(milestone) = self.state.next_milestone() {
            if self.state.iteration_count >= milestone {
                self.state.next_log_exponent += 1;
                tracing::info!(
                    iteration = self.state.iteration_count,
                    best = self.scaled(self.state.best_value),
                    "search progress"
                );
                update.milestone = Some(ProgressRecord::Milestone {
                    iteration: self.state.iteration_count,
                });
            }
        }

        update
    }

    /// Logs and returns the summary of the search so far. Returns `None`
    /// when no solution has been observed.
    pub fn final_report(&self) -> Option<ProgressRecord> {
        if self.state.iteration_count == 0 {
            return None;
        }

        tracing::info!(
            iterations = self.state.iteration_count,
            best = self.scaled(self.state.best_value),
            "search finished"
        );
        Some(ProgressRecord::Final {
            iteration: self.state.iteration_count,
            best_value: self.state.best_value,
        })
    }
}

impl std::fmt::Display for ProgressLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ProgressLogger(iterations = {}, best = {})",
            self.state.iteration_count, self.state.best_value
        )
    }
}

impl SearchMonitor for ProgressLogger {
    fn name(&self) -> &str {
        "ProgressLogger"
    }

    fn init(&mut self) {
        self.state = ProgressState::fresh(self.sense);
    }

    #[inline]
    fn check(&mut self) -> SearchCommand {
        SearchCommand::Continue
    }

    fn on_solution_found(&mut self) -> bool {
        let sample = self.objective.sample();
        self.observe(sample);
        true
    }

    fn on_exit_search(&mut self) {
        self.final_report();
    }

    fn copy_from(&mut self, other: &dyn SearchMonitor) {
        if let Some(other) = other.as_any().downcast_ref::<Self>() {
            self.sense = other.sense;
            self.cost_scale = other.cost_scale;
            self.state = other.state;
        }
    }

    fn clone_box(&self) -> Box<dyn SearchMonitor> {
        Box::new(Self::new(self.objective.clone(), self.sense).with_cost_scale(self.cost_scale))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn debug_string(&self) -> String {
        self.to_string()
    }
}
