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

//! # Routing Instance
//!
//! The data matrix the solver driver consumes: square travel-time and
//! distance matrices over the regular nodes, service times, time windows and
//! an optional list of rests appended after the matrix.
//!
//! Layout conventions:
//!
//! * Node `0` is the route start and node `matrix_size - 1` the route end.
//! * Rest `n` is node `matrix_size + n`. Rests have zero travel time and
//!   distance to and from every node; their duration is their service time.
//! * Matrices are stored flattened in row-major order.

use crate::{index::NodeIndex, window::NodeWindow};

/// Errors raised when an [`InstanceBuilder`] cannot produce a valid instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    #[error("an instance needs at least a start and an end node, got {0} node(s)")]
    TooFewNodes(usize),
    #[error("{matrix} matrix has {actual} entries, expected {expected}")]
    MatrixShape {
        matrix: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{matrix} matrix entry ({from}, {to}) is negative: {value}")]
    NegativeEntry {
        matrix: &'static str,
        from: usize,
        to: usize,
        value: i64,
    },
    #[error("service time of node {node} is negative: {value}")]
    NegativeServiceTime { node: usize, value: i64 },
}

/// A rest (break) appended after the regular nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rest {
    pub window: NodeWindow,
    pub duration: i64,
}

/// An immutable routing instance. Build one with [`InstanceBuilder`].
#[derive(Clone, PartialEq, Eq)]
pub struct Instance {
    matrix_size: usize,
    times: Vec<i64>,
    distances: Vec<i64>,
    service_times: Vec<i64>,
    windows: Vec<NodeWindow>,
    horizon: i64,
}

impl Instance {
    /// Total number of nodes, regular nodes and rests.
    #[inline]
    pub fn size(&self) -> usize {
        self.windows.len()
    }

    /// Number of regular nodes (start and end included).
    #[inline]
    pub fn matrix_size(&self) -> usize {
        self.matrix_size
    }

    /// Number of rests appended after the matrix.
    #[inline]
    pub fn num_rests(&self) -> usize {
        self.size() - self.matrix_size
    }

    #[inline]
    pub fn start(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    #[inline]
    pub fn end(&self) -> NodeIndex {
        NodeIndex::new(self.matrix_size - 1)
    }

    /// Upper bound on any cumulative time along the route.
    #[inline]
    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Returns `true` if `node` is a rest rather than a regular node.
    #[inline]
    pub fn is_rest(&self, node: NodeIndex) -> bool {
        node.get() >= self.matrix_size
    }

    /// Iterates the regular nodes strictly between start and end.
    pub fn visit_nodes(&self) -> impl Iterator<Item = NodeIndex> {
        (1..self.matrix_size - 1).map(NodeIndex::new)
    }

    /// Iterates the rest nodes.
    pub fn rest_nodes(&self) -> impl Iterator<Item = NodeIndex> {
        (self.matrix_size..self.size()).map(NodeIndex::new)
    }

    /// # Panics
    ///
    /// Panics if `node` is out of bounds.
    #[inline]
    pub fn window(&self, node: NodeIndex) -> NodeWindow {
        self.windows[node.get()]
    }

    #[inline]
    pub fn ready_time(&self, node: NodeIndex) -> i64 {
        self.window(node).ready()
    }

    #[inline]
    pub fn due_time(&self, node: NodeIndex) -> i64 {
        self.window(node).due()
    }

    #[inline]
    pub fn service_time(&self, node: NodeIndex) -> i64 {
        self.service_times[node.get()]
    }

    #[inline]
    fn matrix_offset(&self, from: NodeIndex, to: NodeIndex) -> Option<usize> {
        let (i, j) = (from.get(), to.get());
        (i < self.matrix_size && j < self.matrix_size).then_some(i * self.matrix_size + j)
    }

    /// Travel time between two nodes; zero whenever a rest is involved.
    #[inline]
    pub fn time(&self, from: NodeIndex, to: NodeIndex) -> i64 {
        self.matrix_offset(from, to)
            .map_or(0, |offset| self.times[offset])
    }

    /// Travel distance between two nodes; zero whenever a rest is involved.
    #[inline]
    pub fn distance(&self, from: NodeIndex, to: NodeIndex) -> i64 {
        self.matrix_offset(from, to)
            .map_or(0, |offset| self.distances[offset])
    }

    /// Travel time plus the service time spent at the origin.
    #[inline]
    pub fn time_plus_service_time(&self, from: NodeIndex, to: NodeIndex) -> i64 {
        self.time(from, to).saturating_add(self.service_time(from))
    }

    /// Squared travel time. Summing it along a route penalises long segments
    /// more than short ones.
    #[inline]
    pub fn time_order(&self, from: NodeIndex, to: NodeIndex) -> i64 {
        let t = self.time(from, to);
        t.saturating_mul(t)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("matrix_size", &self.matrix_size)
            .field("num_rests", &self.num_rests())
            .field("horizon", &self.horizon)
            .finish()
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Instance(nodes: {}, rests: {}, horizon: {})",
            self.matrix_size,
            self.num_rests(),
            self.horizon
        )
    }
}

/// Mutable builder for [`Instance`].
///
/// Everything starts permissive: zero travel times, zero service times,
/// unconstrained windows and no rests. The horizon is derived at `build`
/// unless set explicitly.
#[derive(Clone, Debug)]
pub struct InstanceBuilder {
    matrix_size: usize,
    times: Vec<i64>,
    distances: Vec<i64>,
    service_times: Vec<i64>,
    windows: Vec<NodeWindow>,
    rests: Vec<Rest>,
    horizon: Option<i64>,
}

impl InstanceBuilder {
    /// Creates a builder for `matrix_size` regular nodes.
    pub fn new(matrix_size: usize) -> Self {
        let cells = matrix_size * matrix_size;
        Self {
            matrix_size,
            times: vec![0; cells],
            distances: vec![0; cells],
            service_times: vec![0; matrix_size],
            windows: vec![NodeWindow::unconstrained(); matrix_size],
            rests: Vec::new(),
            horizon: None,
        }
    }

    #[inline]
    pub fn matrix_size(&self) -> usize {
        self.matrix_size
    }

    /// Replaces the whole travel-time matrix (row-major). Shape is checked at `build`.
    pub fn time_matrix(&mut self, times: Vec<i64>) -> &mut Self {
        self.times = times;
        self
    }

    /// Replaces the whole distance matrix (row-major). Shape is checked at `build`.
    pub fn distance_matrix(&mut self, distances: Vec<i64>) -> &mut Self {
        self.distances = distances;
        self
    }

    /// # Panics
    ///
    /// Panics if `from` or `to` is not a regular node.
    pub fn set_time(&mut self, from: usize, to: usize, time: i64) -> &mut Self {
        assert!(
            from < self.matrix_size && to < self.matrix_size,
            "called `InstanceBuilder::set_time` with ({}, {}) but the matrix size is {}",
            from,
            to,
            self.matrix_size
        );
        self.times[from * self.matrix_size + to] = time;
        self
    }

    /// # Panics
    ///
    /// Panics if `from` or `to` is not a regular node.
    pub fn set_distance(&mut self, from: usize, to: usize, distance: i64) -> &mut Self {
        assert!(
            from < self.matrix_size && to < self.matrix_size,
            "called `InstanceBuilder::set_distance` with ({}, {}) but the matrix size is {}",
            from,
            to,
            self.matrix_size
        );
        self.distances[from * self.matrix_size + to] = distance;
        self
    }

    /// # Panics
    ///
    /// Panics if `node` is not a regular node.
    pub fn set_window(&mut self, node: usize, window: NodeWindow) -> &mut Self {
        assert!(
            node < self.matrix_size,
            "called `InstanceBuilder::set_window` with node {} but the matrix size is {}",
            node,
            self.matrix_size
        );
        self.windows[node] = window;
        self
    }

    /// # Panics
    ///
    /// Panics if `node` is not a regular node.
    pub fn set_service_time(&mut self, node: usize, service_time: i64) -> &mut Self {
        assert!(
            node < self.matrix_size,
            "called `InstanceBuilder::set_service_time` with node {} but the matrix size is {}",
            node,
            self.matrix_size
        );
        self.service_times[node] = service_time;
        self
    }

    /// Appends a rest and returns the node index it will have.
    pub fn add_rest(&mut self, window: NodeWindow, duration: i64) -> NodeIndex {
        self.rests.push(Rest { window, duration });
        NodeIndex::new(self.matrix_size + self.rests.len() - 1)
    }

    pub fn with_horizon(&mut self, horizon: i64) -> &mut Self {
        self.horizon = Some(horizon);
        self
    }

    fn check_matrix(&self, matrix: &'static str, values: &[i64]) -> Result<(), InstanceError> {
        let expected = self.matrix_size * self.matrix_size;
        if values.len() != expected {
            return Err(InstanceError::MatrixShape {
                matrix,
                expected,
                actual: values.len(),
            });
        }
        match values.iter().position(|&v| v < 0) {
            Some(offset) => Err(InstanceError::NegativeEntry {
                matrix,
                from: offset / self.matrix_size,
                to: offset % self.matrix_size,
                value: values[offset],
            }),
            None => Ok(()),
        }
    }

    /// Sum of the largest outgoing leg of every node, plus the largest finite
    /// window bound. No feasible route can need more.
    fn derived_horizon(&self, service_times: &[i64], windows: &[NodeWindow]) -> i64 {
        let n = self.matrix_size;
        let travel: i64 = (0..n)
            .map(|i| self.times[i * n..(i + 1) * n].iter().copied().max().unwrap_or(0))
            .fold(0i64, |acc, t| acc.saturating_add(t));
        let service = service_times
            .iter()
            .fold(0i64, |acc, &s| acc.saturating_add(s));
        let latest_bound = windows
            .iter()
            .flat_map(|w| [w.ready_time(), w.deadline()])
            .flatten()
            .max()
            .unwrap_or(0);
        travel.saturating_add(service).saturating_add(latest_bound)
    }

    /// Validates the collected data and builds the instance.
    pub fn build(&self) -> Result<Instance, InstanceError> {
        if self.matrix_size < 2 {
            return Err(InstanceError::TooFewNodes(self.matrix_size));
        }
        self.check_matrix("time", &self.times)?;
        self.check_matrix("distance", &self.distances)?;

        let mut service_times = self.service_times.clone();
        let mut windows = self.windows.clone();
        for rest in &self.rests {
            service_times.push(rest.duration);
            windows.push(rest.window);
        }
        if let Some(node) = service_times.iter().position(|&s| s < 0) {
            return Err(InstanceError::NegativeServiceTime {
                node,
                value: service_times[node],
            });
        }

        let horizon = self
            .horizon
            .unwrap_or_else(|| self.derived_horizon(&service_times, &windows));

        Ok(Instance {
            matrix_size: self.matrix_size,
            times: self.times.clone(),
            distances: self.distances.clone(),
            service_times,
            windows,
            horizon,
        })
    }
}
