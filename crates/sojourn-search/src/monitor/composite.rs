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

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};

/// A composite monitor that aggregates multiple monitors and forwards events to all of them.
pub struct CompositeMonitor {
    monitors: Vec<Box<dyn SearchMonitor>>,
}

impl std::fmt::Debug for CompositeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let monitors_str = self
            .monitors
            .iter()
            .map(|m| m.debug_string())
            .collect::<Vec<String>>()
            .join(", ");

        f.debug_struct("CompositeMonitor")
            .field("monitors", &monitors_str)
            .finish()
    }
}

impl std::fmt::Display for CompositeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompositeMonitor([{}])", self.names().join(", "))
    }
}

impl Default for CompositeMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeMonitor {
    /// Creates a new empty `CompositeMonitor`.
    #[inline]
    pub fn new() -> CompositeMonitor {
        CompositeMonitor {
            monitors: Vec::new(),
        }
    }

    /// Creates a new `CompositeMonitor` with the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> CompositeMonitor {
        CompositeMonitor {
            monitors: Vec::with_capacity(capacity),
        }
    }

    /// Adds a new monitor to the composite monitor.
    #[inline]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: SearchMonitor + 'static,
    {
        self.monitors.push(Box::new(monitor));
    }

    /// Adds a new boxed monitor to the composite monitor.
    #[inline]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn SearchMonitor>) {
        self.monitors.push(monitor);
    }

    /// Returns the number of monitors in the composite monitor.
    #[inline]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Returns `true` if the composite monitor contains no monitors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Returns a reference to the monitor at the specified index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn monitor(&self, index: usize) -> &dyn SearchMonitor {
        assert!(
            index < self.monitors.len(),
            "called `CompositeMonitor::monitor` with index out of bounds: the len is {} but the index is {}",
            self.monitors.len(),
            index
        );

        self.monitors[index].as_ref()
    }

    /// Names of the member monitors, in insertion order.
    #[inline]
    pub fn names(&self) -> Vec<&str> {
        self.monitors.iter().map(|m| m.name()).collect()
    }

    /// Returns an iterator over the member monitors.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &dyn SearchMonitor> {
        self.monitors.iter().map(|m| m.as_ref())
    }
}

impl FromIterator<Box<dyn SearchMonitor>> for CompositeMonitor {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn SearchMonitor>>,
    {
        CompositeMonitor {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl SearchMonitor for CompositeMonitor {
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn init(&mut self) {
        for monitor in &mut self.monitors {
            monitor.init();
        }
    }

    fn check(&mut self) -> SearchCommand {
        // Polled at every branch: a plain loop, first termination wins.
        for monitor in &mut self.monitors {
            if let SearchCommand::Terminate(reason) = monitor.check() {
                return SearchCommand::Terminate(reason);
            }
        }
        SearchCommand::Continue
    }

    fn on_solution_found(&mut self) -> bool {
        // Every member must see the solution, even after one rejected it.
        let mut accepted = true;
        for monitor in &mut self.monitors {
            accepted &= monitor.on_solution_found();
        }
        accepted
    }

    fn on_exit_search(&mut self) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search();
        }
    }

    fn copy_from(&mut self, other: &dyn SearchMonitor) {
        if let Some(other) = other.as_any().downcast_ref::<Self>() {
            for (mine, theirs) in self.monitors.iter_mut().zip(&other.monitors) {
                mine.copy_from(theirs.as_ref());
            }
        }
    }

    fn clone_box(&self) -> Box<dyn SearchMonitor> {
        Box::new(
            self.monitors
                .iter()
                .map(|m| m.clone_box())
                .collect::<CompositeMonitor>(),
        )
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
    use crate::monitor::solution_limit::SolutionLimit;

    /// Records its callbacks and optionally terminates or rejects.
    #[derive(Clone, Default)]
    struct Probe {
        name: &'static str,
        terminate: bool,
        accept: bool,
        inits: usize,
        checks: usize,
        solutions: usize,
        exits: usize,
    }

    impl Probe {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                accept: true,
                ..Default::default()
            }
        }
    }

    impl SearchMonitor for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn init(&mut self) {
            self.inits += 1;
        }

        fn check(&mut self) -> SearchCommand {
            self.checks += 1;
            if self.terminate {
                SearchCommand::Terminate(format!("{} stop", self.name))
            } else {
                SearchCommand::Continue
            }
        }

        fn on_solution_found(&mut self) -> bool {
            self.solutions += 1;
            self.accept
        }

        fn on_exit_search(&mut self) {
            self.exits += 1;
        }

        fn copy_from(&mut self, other: &dyn SearchMonitor) {
            if let Some(other) = other.as_any().downcast_ref::<Self>() {
                *self = other.clone();
            }
        }

        fn clone_box(&self) -> Box<dyn SearchMonitor> {
            Box::new(Probe {
                name: self.name,
                terminate: self.terminate,
                accept: self.accept,
                ..Default::default()
            })
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn probe(composite: &CompositeMonitor, index: usize) -> &Probe {
        composite
            .monitor(index)
            .as_any()
            .downcast_ref::<Probe>()
            .unwrap()
    }

    #[test]
    fn test_empty_composite_continues() {
        let mut composite = CompositeMonitor::new();
        assert!(composite.is_empty());
        assert_eq!(composite.check(), SearchCommand::Continue);
        assert!(composite.on_solution_found());
    }

    #[test]
    fn test_forwards_every_callback() {
        let mut composite = CompositeMonitor::with_capacity(2);
        composite.add_monitor(Probe::new("a"));
        composite.add_monitor_boxed(Box::new(Probe::new("b")));
        assert_eq!(composite.len(), 2);

        composite.init();
        composite.on_solution_found();
        composite.check();
        composite.on_exit_search();

        for i in 0..2 {
            let p = probe(&composite, i);
            assert_eq!((p.inits, p.solutions, p.checks, p.exits), (1, 1, 1, 1));
        }
    }

    #[test]
    fn test_check_short_circuits_on_first_terminate() {
        let mut composite = CompositeMonitor::new();
        composite.add_monitor(Probe::new("a"));
        composite.add_monitor(Probe {
            terminate: true,
            ..Probe::new("b")
        });
        composite.add_monitor(Probe::new("c"));

        assert_eq!(
            composite.check(),
            SearchCommand::Terminate("b stop".to_string())
        );
        assert_eq!(probe(&composite, 0).checks, 1);
        assert_eq!(probe(&composite, 1).checks, 1);
        assert_eq!(probe(&composite, 2).checks, 0);
    }

    #[test]
    fn test_rejection_still_reaches_all_members() {
        let mut composite = CompositeMonitor::new();
        composite.add_monitor(Probe {
            accept: false,
            ..Probe::new("a")
        });
        composite.add_monitor(Probe::new("b"));

        assert!(!composite.on_solution_found());
        assert_eq!(probe(&composite, 1).solutions, 1);
    }

    #[test]
    fn test_clone_and_copy_are_member_wise() {
        let mut composite = CompositeMonitor::new();
        composite.add_monitor(SolutionLimit::new(2));
        composite.add_monitor(Probe::new("p"));
        composite.on_solution_found();

        let mut fork = composite.clone_box();
        assert_eq!(
            fork.debug_string(),
            "CompositeMonitor([SolutionLimit, p])"
        );
        assert_eq!(fork.check(), SearchCommand::Continue);

        fork.copy_from(&composite);
        fork.on_solution_found();
        assert!(fork.check().is_terminate());
        assert_eq!(composite.check(), SearchCommand::Continue);

        composite.copy_from(fork.as_ref());
        assert!(composite.check().is_terminate());
    }

    #[test]
    fn test_display_and_names() {
        let composite: CompositeMonitor = vec![
            Box::new(Probe::new("x")) as Box<dyn SearchMonitor>,
            Box::new(SolutionLimit::new(1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(composite.names(), vec!["x", "SolutionLimit"]);
        assert_eq!(
            composite.to_string(),
            "CompositeMonitor([x, SolutionLimit])"
        );
        assert_eq!(composite.iter().count(), 2);
    }

    #[test]
    #[should_panic]
    fn test_monitor_out_of_bounds_panics() {
        let composite = CompositeMonitor::new();
        let _ = composite.monitor(0);
    }
}
