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

//! # Time Windows
//!
//! Raw ready/due timestamps as they come out of the data matrix. Two sentinel
//! conventions are preserved exactly because upstream producers rely on them:
//!
//! - a bound `<= 0` is **unspecified**,
//! - a due time `>= NO_DEADLINE` (`2^31 - 1`) means **no deadline**.

/// Any bound at or below this value is treated as unspecified.
pub const UNSPECIFIED: i64 = 0;

/// Due times at or above this value mean "no deadline".
pub const NO_DEADLINE: i64 = i32::MAX as i64;

/// The ready/due pair of a single node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct NodeWindow {
    ready: i64,
    due: i64,
}

impl NodeWindow {
    /// Creates a window from raw ready/due timestamps.
    #[inline]
    pub const fn new(ready: i64, due: i64) -> Self {
        Self { ready, due }
    }

    /// A window with neither bound specified.
    #[inline]
    pub const fn unconstrained() -> Self {
        Self::new(UNSPECIFIED, UNSPECIFIED)
    }

    /// Returns the raw ready time.
    #[inline]
    pub const fn ready(&self) -> i64 {
        self.ready
    }

    /// Returns the raw due time.
    #[inline]
    pub const fn due(&self) -> i64 {
        self.due
    }

    /// Returns the ready time if it is specified.
    #[inline]
    pub const fn ready_time(&self) -> Option<i64> {
        if self.ready > UNSPECIFIED {
            Some(self.ready)
        } else {
            None
        }
    }

    /// Returns the due time if it is specified, finite or not.
    #[inline]
    pub const fn due_time(&self) -> Option<i64> {
        if self.due > UNSPECIFIED {
            Some(self.due)
        } else {
            None
        }
    }

    /// Returns the deadline if it is specified and below `NO_DEADLINE`.
    #[inline]
    pub const fn deadline(&self) -> Option<i64> {
        if self.due > UNSPECIFIED && self.due < NO_DEADLINE {
            Some(self.due)
        } else {
            None
        }
    }

    /// Returns `true` if neither bound is specified.
    #[inline]
    pub const fn is_unconstrained(&self) -> bool {
        self.ready <= UNSPECIFIED && self.due <= UNSPECIFIED
    }
}

impl std::fmt::Display for NodeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.ready_time(), self.due_time()) {
            (None, None) => write!(f, "[-, -]"),
            (Some(r), None) => write!(f, "[{}, -]", r),
            (None, Some(d)) => write!(f, "[-, {}]", d),
            (Some(r), Some(d)) => write!(f, "[{}, {}]", r, d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_bounds_are_unspecified() {
        let w = NodeWindow::new(0, -5);
        assert!(w.is_unconstrained());
        assert_eq!(w.ready_time(), None);
        assert_eq!(w.due_time(), None);
        assert_eq!(w.deadline(), None);
    }

    #[test]
    fn test_ready_only_is_constrained() {
        let w = NodeWindow::new(100, 0);
        assert!(!w.is_unconstrained());
        assert_eq!(w.ready_time(), Some(100));
        assert_eq!(w.deadline(), None);
    }

    #[test]
    fn test_no_deadline_sentinel_is_not_a_deadline() {
        let w = NodeWindow::new(0, 2_147_483_647);
        assert!(!w.is_unconstrained());
        assert_eq!(w.due_time(), Some(NO_DEADLINE));
        assert_eq!(w.deadline(), None);

        let just_below = NodeWindow::new(0, NO_DEADLINE - 1);
        assert_eq!(just_below.deadline(), Some(NO_DEADLINE - 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeWindow::new(3, 9).to_string(), "[3, 9]");
        assert_eq!(NodeWindow::unconstrained().to_string(), "[-, -]");
        assert_eq!(NodeWindow::new(0, 9).to_string(), "[-, 9]");
    }
}
