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

//! # Dimensions
//!
//! A dimension accumulates a quantity (time, distance, ...) along the route.
//! Every node carries a cumul value; moving from `i` to `j` gives
//!
//! ```text
//! cumul(j) = cumul(i) + transit(i, j) + slack(i)
//! ```
//!
//! with `0 <= slack(i) <= slack_max` and
//! `cumul_min(j) <= cumul(j) <= min(cumul_max(j), capacity)`.
//! A soft upper bound lets `cumul(j)` exceed a bound at a linear cost of
//! `(cumul(j) - bound) * coefficient`.
//!
//! [`Dimension::advance`] picks the earliest feasible cumul, which is also
//! the cheapest one since every cost term grows with the cumul.

use sojourn_model::index::NodeIndex;

/// Transit function of a dimension, evaluated on the arc `(from, to)`.
pub type TransitCallback = Box<dyn Fn(NodeIndex, NodeIndex) -> i64 + Send + Sync>;

/// A linear penalty applied once the cumul exceeds `bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftUpperBound {
    pub bound: i64,
    pub coefficient: i64,
}

impl SoftUpperBound {
    #[inline]
    pub fn new(bound: i64, coefficient: i64) -> Self {
        Self { bound, coefficient }
    }

    /// Cost of reaching `value`.
    #[inline]
    pub fn penalty(&self, value: i64) -> i64 {
        if value <= self.bound {
            return 0;
        }
        value
            .saturating_sub(self.bound)
            .saturating_mul(self.coefficient)
    }
}

pub struct Dimension {
    name: String,
    transit: TransitCallback,
    slack_max: i64,
    capacity: i64,
    fix_start_cumul_to_zero: bool,
    span_cost_coefficient: i64,
    cumul_min: Vec<i64>,
    cumul_max: Vec<i64>,
    soft_upper_bounds: Vec<Option<SoftUpperBound>>,
}

impl std::fmt::Debug for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dimension")
            .field("name", &self.name)
            .field("slack_max", &self.slack_max)
            .field("capacity", &self.capacity)
            .field("fix_start_cumul_to_zero", &self.fix_start_cumul_to_zero)
            .field("span_cost_coefficient", &self.span_cost_coefficient)
            .finish()
    }
}

impl Dimension {
    pub fn new(
        name: impl Into<String>,
        transit: TransitCallback,
        slack_max: i64,
        capacity: i64,
        fix_start_cumul_to_zero: bool,
        num_nodes: usize,
    ) -> Self {
        Self {
            name: name.into(),
            transit,
            slack_max,
            capacity,
            fix_start_cumul_to_zero,
            span_cost_coefficient: 0,
            cumul_min: vec![0; num_nodes],
            cumul_max: vec![capacity; num_nodes],
            soft_upper_bounds: vec![None; num_nodes],
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn slack_max(&self) -> i64 {
        self.slack_max
    }

    #[inline]
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    #[inline]
    pub fn fix_start_cumul_to_zero(&self) -> bool {
        self.fix_start_cumul_to_zero
    }

    #[inline]
    pub fn span_cost_coefficient(&self) -> i64 {
        self.span_cost_coefficient
    }

    #[inline]
    pub fn set_span_cost_coefficient(&mut self, coefficient: i64) {
        self.span_cost_coefficient = coefficient;
    }

    #[inline]
    pub fn transit(&self, from: NodeIndex, to: NodeIndex) -> i64 {
        (self.transit)(from, to)
    }

    #[inline]
    pub fn cumul_min(&self, node: NodeIndex) -> i64 {
        self.cumul_min[node.get()]
    }

    #[inline]
    pub fn cumul_max(&self, node: NodeIndex) -> i64 {
        self.cumul_max[node.get()]
    }

    #[inline]
    pub fn soft_upper_bound(&self, node: NodeIndex) -> Option<SoftUpperBound> {
        self.soft_upper_bounds[node.get()]
    }

    #[inline]
    pub fn set_cumul_min(&mut self, node: NodeIndex, value: i64) {
        self.cumul_min[node.get()] = value;
    }

    #[inline]
    pub fn set_cumul_max(&mut self, node: NodeIndex, value: i64) {
        self.cumul_max[node.get()] = value;
    }

    #[inline]
    pub fn set_soft_upper_bound(&mut self, node: NodeIndex, bound: SoftUpperBound) {
        self.soft_upper_bounds[node.get()] = Some(bound);
    }

    /// Upper limit the cumul of `node` can actually take.
    #[inline]
    fn upper_limit(&self, node: NodeIndex) -> i64 {
        self.cumul_max(node).min(self.capacity)
    }

    #[inline]
    fn soft_penalty(&self, node: NodeIndex, value: i64) -> i64 {
        self.soft_upper_bound(node)
            .map_or(0, |bound| bound.penalty(value))
    }

    /// Cumul at the route start and its soft penalty, `None` if the start
    /// bounds are contradictory.
    pub fn start(&self, start: NodeIndex) -> Option<(i64, i64)> {
        let min = self.cumul_min(start);
        let value = if self.fix_start_cumul_to_zero { 0 } else { min };
        if value < min || value > self.upper_limit(start) {
            return None;
        }
        Some((value, self.soft_penalty(start, value)))
    }

    /// Earliest feasible cumul at `to` when leaving `from` at `cumul`, and
    /// the soft penalty it incurs. `None` if no slack value satisfies the
    /// bounds of `to`.
    pub fn advance(&self, from: NodeIndex, to: NodeIndex, cumul: i64) -> Option<(i64, i64)> {
        let arrival = cumul.saturating_add(self.transit(from, to));
        let value = arrival.max(self.cumul_min(to));
        if value - arrival > self.slack_max || value > self.upper_limit(to) {
            return None;
        }
        Some((value, self.soft_penalty(to, value)))
    }

    /// Span cost of a route that started at `start_cumul` and is now at `cumul`.
    #[inline]
    pub fn span_cost(&self, start_cumul: i64, cumul: i64) -> i64 {
        cumul
            .saturating_sub(start_cumul)
            .saturating_mul(self.span_cost_coefficient)
    }
}
