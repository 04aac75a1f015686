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

//! # Solution Limit
//!
//! Terminates the search once a fixed number of solutions has been accepted.
//! With a limit of one it turns the search into "first feasible route wins",
//! which is what small routes need: there is nothing to converge on.
//!
//! The counter is owned by the monitor. A forked monitor starts from zero
//! (`clone_box`) or from the progress of the monitor it copies
//! (`copy_from`), so the limit stays global to one search when the engine
//! commits forks back.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionLimit {
    solutions_found: u64,
    solution_limit: u64,
}

impl SolutionLimit {
    #[inline]
    pub fn new(solution_limit: u64) -> Self {
        Self {
            solutions_found: 0,
            solution_limit,
        }
    }

    #[inline]
    pub fn solution_limit(&self) -> u64 {
        self.solution_limit
    }

    #[inline]
    pub fn solutions_found(&self) -> u64 {
        self.solutions_found
    }

    #[inline]
    fn reached_limit(&self) -> bool {
        self.solutions_found >= self.solution_limit
    }
}

impl std::fmt::Display for SolutionLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SolutionLimit({}/{})",
            self.solutions_found, self.solution_limit
        )
    }
}

impl SearchMonitor for SolutionLimit {
    fn name(&self) -> &str {
        "SolutionLimit"
    }

    fn init(&mut self) {
        self.solutions_found = 0;
    }

    fn check(&mut self) -> SearchCommand {
        if self.reached_limit() {
            SearchCommand::Terminate("solution limit reached".to_string())
        } else {
            SearchCommand::Continue
        }
    }

    fn on_solution_found(&mut self) -> bool {
        self.solutions_found = self.solutions_found.saturating_add(1);
        true
    }

    fn copy_from(&mut self, other: &dyn SearchMonitor) {
        if let Some(other) = other.as_any().downcast_ref::<Self>() {
            self.solutions_found = other.solutions_found;
            self.solution_limit = other.solution_limit;
        }
    }

    fn clone_box(&self) -> Box<dyn SearchMonitor> {
        Box::new(Self::new(self.solution_limit))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn debug_string(&self) -> String {
        self.to_string()
    }
}
