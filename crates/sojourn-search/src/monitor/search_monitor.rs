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

use std::any::Any;

/// Command returned by a monitor to control the search process.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum SearchCommand {
    #[default]
    Continue,
    Terminate(String),
}

impl SearchCommand {
    #[inline]
    pub fn is_terminate(&self) -> bool {
        matches!(self, SearchCommand::Terminate(_))
    }
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// Observer and controller hooked into an engine's search loop.
///
/// The engine calls these synchronously from a single search thread:
///
/// 1. `init` once when a search starts,
/// 2. `on_solution_found` for every feasible solution, in discovery order,
///    after it has written the solution's objective into its cost variable,
/// 3. `check` at every branch and after every solution,
/// 4. `on_exit_search` once when the search is over.
///
/// When the engine forks a branch it duplicates its monitors with
/// `clone_box` (fresh state) and optionally `copy_from` (same progress).
/// Duplicates never share mutable state.
pub trait SearchMonitor: Send {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Resets all per-search state.
    fn init(&mut self);

    /// Polled by the engine; `Terminate` asks it to unwind the search.
    fn check(&mut self) -> SearchCommand;

    /// Called for each feasible solution. Returning `false` rejects it.
    fn on_solution_found(&mut self) -> bool;

    /// Called once after the search has ended.
    fn on_exit_search(&mut self) {}

    /// Copies the progress state of `other` into `self`. Monitors of another
    /// concrete type are ignored.
    fn copy_from(&mut self, other: &dyn SearchMonitor);

    /// Returns a monitor with the same configuration and freshly initialised state.
    fn clone_box(&self) -> Box<dyn SearchMonitor>;

    fn as_any(&self) -> &dyn Any;

    fn debug_string(&self) -> String {
        self.name().to_string()
    }
}

impl std::fmt::Debug for dyn SearchMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.debug_string())
    }
}

impl std::fmt::Display for dyn SearchMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}
