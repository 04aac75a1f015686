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

//! # Objective Tracking
//!
//! Monitors never receive the solution itself. The engine owns a cost
//! variable ([`ObjectiveVar`]) and writes the objective of the solution it is
//! about to report into it; monitors read it back through an
//! [`ObjectiveTracker`]. A monitor and every clone of it are bound to the
//! same variable, so duplicated monitors keep observing the same objective
//! source while owning independent state.
//!
//! [`ObjectiveSense`] is the single place where "better" is defined.
//!
//! ```rust
//! use sojourn_search::objective::{ObjectiveSense, ObjectiveTracker, ObjectiveVar};
//!
//! let cost = ObjectiveVar::new();
//! let tracker = ObjectiveTracker::new(Some(cost.clone())).unwrap();
//! cost.set(42);
//! assert_eq!(tracker.sample(), 42);
//! assert!(ObjectiveSense::Minimize.is_better(41, tracker.sample()));
//! ```

use crate::error::MonitorError;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

/// Handle to the engine's cost variable.
///
/// Cloning the handle shares the variable. Only the engine should call
/// [`ObjectiveVar::set`].
#[derive(Clone, Debug, Default)]
pub struct ObjectiveVar {
    value: Arc<AtomicI64>,
}

impl ObjectiveVar {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the objective value of the solution currently being reported.
    #[inline]
    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Stores the objective value of the solution about to be reported.
    #[inline]
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Returns `true` if both handles point at the same variable.
    #[inline]
    pub fn same_source(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

/// Read-only view of an [`ObjectiveVar`], shared by the monitors.
#[derive(Clone, Debug)]
pub struct ObjectiveTracker {
    objective: ObjectiveVar,
}

impl ObjectiveTracker {
    /// Binds a tracker to the engine's cost variable.
    ///
    /// Fails with [`MonitorError::MissingObjective`] when the engine has not
    /// exposed one (typically because its model is not closed yet).
    #[inline]
    pub fn new(objective: Option<ObjectiveVar>) -> Result<Self, MonitorError> {
        objective
            .map(|objective| Self { objective })
            .ok_or(MonitorError::MissingObjective)
    }

    /// Takes a sample of the current objective value.
    #[inline]
    pub fn sample(&self) -> i64 {
        self.objective.value()
    }

    #[inline]
    pub fn source(&self) -> &ObjectiveVar {
        &self.objective
    }
}

/// Direction of optimization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    /// The value every real objective improves upon.
    #[inline]
    pub const fn worst(self) -> i64 {
        match self {
            ObjectiveSense::Minimize => i64::MAX,
            ObjectiveSense::Maximize => i64::MIN,
        }
    }

    /// Returns `true` if `candidate` is strictly better than `incumbent`.
    #[inline]
    pub const fn is_better(self, candidate: i64, incumbent: i64) -> bool {
        match self {
            ObjectiveSense::Minimize => candidate < incumbent,
            ObjectiveSense::Maximize => candidate > incumbent,
        }
    }
}

impl std::fmt::Display for ObjectiveSense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectiveSense::Minimize => write!(f, "minimize"),
            ObjectiveSense::Maximize => write!(f, "maximize"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_requires_objective() {
        assert_eq!(
            ObjectiveTracker::new(None).unwrap_err(),
            MonitorError::MissingObjective
        );
    }

    #[test]
    fn test_tracker_reads_through_shared_variable() {
        let var = ObjectiveVar::new();
        let tracker = ObjectiveTracker::new(Some(var.clone())).unwrap();
        let copy = tracker.clone();

        var.set(17);
        assert_eq!(tracker.sample(), 17);
        assert_eq!(copy.sample(), 17);
        assert!(tracker.source().same_source(copy.source()));
        assert!(!var.same_source(&ObjectiveVar::new()));
    }

    #[test]
    fn test_sense_is_strict() {
        let min = ObjectiveSense::Minimize;
        assert!(min.is_better(1, 2));
        assert!(!min.is_better(2, 2));
        assert!(min.is_better(i64::MAX - 1, min.worst()));

        let max = ObjectiveSense::Maximize;
        assert!(max.is_better(3, 2));
        assert!(!max.is_better(2, 2));
        assert!(max.is_better(i64::MIN + 1, max.worst()));
    }
}
