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

//! # Routing Engine Interface
//!
//! The seam between the constraint policy / driver and whatever actually
//! searches for routes. A model is built in two phases:
//!
//! 1. **Open**: dimensions, span costs, disjunctions and cumul bounds are
//!    registered. Every mutation fails with [`EngineError::ModelClosed`]
//!    afterwards.
//! 2. **Closed** (after [`RoutingEngine::close_model`]): the cost variable
//!    exists and monitors bound to it can be attached. Solving an open model
//!    closes it first.
//!
//! Nodes that belong to no disjunction must be visited. A disjunction lets
//! the route visit at most one of its nodes; visiting none costs its penalty.

use crate::{
    assignment::Assignment, dimension::TransitCallback, error::EngineError,
    params::SearchParameters,
};
use sojourn_model::index::NodeIndex;
use sojourn_search::{
    monitor::search_monitor::SearchMonitor, objective::ObjectiveVar, stats::SearchStatistics,
};

pub trait RoutingEngine {
    /// Registers a dimension under `name`.
    fn add_dimension(
        &mut self,
        transit: TransitCallback,
        slack_max: i64,
        capacity: i64,
        fix_start_cumul_to_zero: bool,
        name: &str,
    ) -> Result<(), EngineError>;

    /// Cost per unit of `end cumul - start cumul` of dimension `name`.
    fn set_span_cost_coefficient(&mut self, name: &str, coefficient: i64)
        -> Result<(), EngineError>;

    fn add_disjunction(&mut self, nodes: &[NodeIndex], penalty: i64) -> Result<(), EngineError>;

    fn set_cumul_min(&mut self, node: NodeIndex, name: &str, value: i64)
        -> Result<(), EngineError>;

    fn set_cumul_max(&mut self, node: NodeIndex, name: &str, value: i64)
        -> Result<(), EngineError>;

    fn set_cumul_soft_upper_bound(
        &mut self,
        node: NodeIndex,
        name: &str,
        bound: i64,
        coefficient: i64,
    ) -> Result<(), EngineError>;

    /// Attaches a monitor to every subsequent search.
    fn add_search_monitor(&mut self, monitor: Box<dyn SearchMonitor>);

    /// Freezes the model. Closing twice is a no-op.
    fn close_model(&mut self, parameters: &SearchParameters);

    /// The cost variable monitors sample; `None` until the model is closed.
    fn cost_var(&self) -> Option<ObjectiveVar>;

    /// Runs the search. Returns the best accepted solution, or `None` when
    /// none was found before the search ended.
    fn solve_with_parameters(&mut self, parameters: &SearchParameters) -> Option<Assignment>;

    /// Counters of the last search.
    fn statistics(&self) -> &SearchStatistics;
}
