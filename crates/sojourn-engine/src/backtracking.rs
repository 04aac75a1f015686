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

//! # Backtracking Engine
//!
//! A complete depth-first engine for single-route models. It enumerates
//! visiting orders from the route start, propagating every dimension along
//! the way, and reports each feasible route that reaches the route end to
//! the attached monitors.
//!
//! ## Search
//!
//! - A branch extends the route by one node, or closes it by moving to the
//!   route end. Nodes are tried in index order, closing last.
//! - Cumuls take the earliest feasible value (see
//!   [`crate::dimension::Dimension::advance`]).
//! - The partial cost is the span cost plus the soft penalties collected so
//!   far; a branch is cut once it reaches the best accepted cost.
//! - At the route end, unvisited mandatory nodes make the route infeasible;
//!   every disjunction without a visited node adds its penalty.
//!
//! ## Monitors
//!
//! Monitors are polled before every branch and after every solution. Each
//! branch leaving the route start runs on a forked monitor stack
//! (`clone_box` followed by `copy_from`), whose progress is committed back
//! to the engine's stack when the branch is done. A time limit from the
//! [`SearchParameters`] is enforced globally, outside the forks.

use crate::{
    assignment::Assignment,
    dimension::{Dimension, SoftUpperBound, TransitCallback},
    engine::RoutingEngine,
    error::EngineError,
    params::SearchParameters,
};
use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;
use sojourn_model::index::NodeIndex;
use sojourn_search::{
    monitor::{
        composite::CompositeMonitor,
        search_monitor::{SearchCommand, SearchMonitor},
        time_limit::TimeLimit,
    },
    objective::ObjectiveVar,
    stats::SearchStatistics,
};
use std::time::Instant;

/// The static part of the model, read-only during a search.
#[derive(Debug)]
struct RouteModel {
    num_nodes: usize,
    start: NodeIndex,
    end: NodeIndex,
    dimensions: Vec<Dimension>,
    dimension_index: FxHashMap<String, usize>,
    /// Penalty of each disjunction, paid when none of its nodes is visited.
    disjunction_penalties: Vec<i64>,
    node_disjunction: Vec<Option<usize>>,
}

impl RouteModel {
    #[inline]
    fn check_node(&self, node: NodeIndex) -> Result<(), EngineError> {
        if node.get() < self.num_nodes {
            Ok(())
        } else {
            Err(EngineError::NodeOutOfBounds {
                node,
                num_nodes: self.num_nodes,
            })
        }
    }

    #[inline]
    fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimension_index
            .get(name)
            .map(|&index| &self.dimensions[index])
    }

    #[inline]
    fn dimension_mut(&mut self, name: &str) -> Result<&mut Dimension, EngineError> {
        match self.dimension_index.get(name) {
            Some(&index) => Ok(&mut self.dimensions[index]),
            None => Err(EngineError::UnknownDimension(name.to_string())),
        }
    }

    #[inline]
    fn is_mandatory(&self, node: usize) -> bool {
        node != self.start.get() && node != self.end.get() && self.node_disjunction[node].is_none()
    }

    /// Cumuls at the route start and their soft penalty.
    fn start_state(&self) -> Option<(Vec<i64>, i64)> {
        let mut cumuls = Vec::with_capacity(self.dimensions.len());
        let mut penalty = 0i64;
        for dimension in &self.dimensions {
            let (value, soft) = dimension.start(self.start)?;
            cumuls.push(value);
            penalty = penalty.saturating_add(soft);
        }
        Some((cumuls, penalty))
    }

    /// Cumuls after moving `from -> to` and the soft penalty collected at `to`.
    fn advance(&self, from: NodeIndex, to: NodeIndex, cumuls: &[i64]) -> Option<(Vec<i64>, i64)> {
        let mut next = Vec::with_capacity(cumuls.len());
        let mut penalty = 0i64;
        for (dimension, &cumul) in self.dimensions.iter().zip(cumuls) {
            let (value, soft) = dimension.advance(from, to, cumul)?;
            next.push(value);
            penalty = penalty.saturating_add(soft);
        }
        Some((next, penalty))
    }

    fn span_cost(&self, start_cumuls: &[i64], cumuls: &[i64]) -> i64 {
        self.dimensions
            .iter()
            .zip(start_cumuls.iter().zip(cumuls))
            .fold(0i64, |acc, (dimension, (&start, &cumul))| {
                acc.saturating_add(dimension.span_cost(start, cumul))
            })
    }
}

/// Raised through the recursion once a monitor asks to stop.
struct Terminated(String);

type Flow = Result<(), Terminated>;

struct SearchSession<'a> {
    model: &'a RouteModel,
    cost_var: ObjectiveVar,
    stats: &'a mut SearchStatistics,
    time_limit: Option<TimeLimit>,
    visited: FixedBitSet,
    used_disjunctions: FixedBitSet,
    route: Vec<NodeIndex>,
    best_cost: i64,
    best: Option<Assignment>,
}

impl<'a> SearchSession<'a> {
    fn new(
        model: &'a RouteModel,
        cost_var: ObjectiveVar,
        stats: &'a mut SearchStatistics,
        time_limit: Option<TimeLimit>,
    ) -> Self {
        Self {
            model,
            cost_var,
            stats,
            time_limit,
            visited: FixedBitSet::with_capacity(model.num_nodes),
            used_disjunctions: FixedBitSet::with_capacity(model.disjunction_penalties.len()),
            route: Vec::with_capacity(model.num_nodes),
            best_cost: i64::MAX,
            best: None,
        }
    }

    fn run(mut self, monitors: &mut CompositeMonitor) -> Option<Assignment> {
        let start_time = Instant::now();
        monitors.init();
        if let Some(limit) = self.time_limit.as_mut() {
            limit.init();
        }

        match self.explore_root(monitors) {
            Ok(()) => tracing::debug!("search space exhausted"),
            Err(Terminated(reason)) => tracing::debug!(%reason, "search terminated"),
        }

        self.stats.set_duration(start_time.elapsed());
        monitors.on_exit_search();
        tracing::debug!(
            solutions = self.stats.solutions_found,
            branches = self.stats.branches,
            prunings = self.stats.prunings,
            "search finished"
        );
        self.best
    }

    fn poll(&mut self, monitor: &mut dyn SearchMonitor) -> Flow {
        if let Some(limit) = self.time_limit.as_mut() {
            if let SearchCommand::Terminate(reason) = limit.check() {
                return Err(Terminated(reason));
            }
        }
        match monitor.check() {
            SearchCommand::Continue => Ok(()),
            SearchCommand::Terminate(reason) => Err(Terminated(reason)),
        }
    }

    fn enter(&mut self, node: NodeIndex) {
        self.visited.insert(node.get());
        if let Some(disjunction) = self.model.node_disjunction[node.get()] {
            self.used_disjunctions.insert(disjunction);
        }
        self.route.push(node);
    }

    fn leave(&mut self, node: NodeIndex) {
        self.visited.set(node.get(), false);
        if let Some(disjunction) = self.model.node_disjunction[node.get()] {
            self.used_disjunctions.set(disjunction, false);
        }
        self.route.pop();
    }

    /// Nodes the route can move to next, closing the route last.
    fn candidates(&self) -> Vec<NodeIndex> {
        let model = self.model;
        let mut next: Vec<NodeIndex> = (0..model.num_nodes)
            .filter(|&node| node != model.start.get() && node != model.end.get())
            .filter(|&node| !self.visited.contains(node))
            .filter(|&node| {
                model.node_disjunction[node]
                    .map_or(true, |disjunction| !self.used_disjunctions.contains(disjunction))
            })
            .map(NodeIndex::new)
            .collect();
        next.push(model.end);
        next
    }

    fn explore_root(&mut self, monitors: &mut CompositeMonitor) -> Flow {
        let start = self.model.start;
        let Some((start_cumuls, start_penalty)) = self.model.start_state() else {
            self.stats.on_prune();
            return Ok(());
        };

        self.enter(start);
        let mut flow = Ok(());
        for next in self.candidates() {
            let mut fork = monitors.clone_box();
            fork.copy_from(&*monitors);
            flow = self.branch(
                fork.as_mut(),
                start,
                next,
                &start_cumuls,
                &start_cumuls,
                start_penalty,
            );
            monitors.copy_from(fork.as_ref());
            if flow.is_err() {
                break;
            }
        }
        self.leave(start);
        flow
    }

    fn branch(
        &mut self,
        monitor: &mut dyn SearchMonitor,
        from: NodeIndex,
        to: NodeIndex,
        cumuls: &[i64],
        start_cumuls: &[i64],
        soft_cost: i64,
    ) -> Flow {
        self.poll(monitor)?;
        self.stats.on_branch();

        let Some((next_cumuls, penalty)) = self.model.advance(from, to, cumuls) else {
            self.stats.on_prune();
            return Ok(());
        };
        let soft_cost = soft_cost.saturating_add(penalty);
        let partial = self
            .model
            .span_cost(start_cumuls, &next_cumuls)
            .saturating_add(soft_cost);
        if partial >= self.best_cost {
            self.stats.on_prune();
            return Ok(());
        }

        if to == self.model.end {
            return self.complete(monitor, partial);
        }

        self.enter(to);
        let mut flow = Ok(());
        for next in self.candidates() {
            flow = self.branch(monitor, to, next, &next_cumuls, start_cumuls, soft_cost);
            if flow.is_err() {
                break;
            }
        }
        self.leave(to);
        flow
    }

    /// The route has reached its end: validate, price and report it.
    fn complete(&mut self, monitor: &mut dyn SearchMonitor, partial: i64) -> Flow {
        let missing_mandatory = (0..self.model.num_nodes)
            .any(|node| self.model.is_mandatory(node) && !self.visited.contains(node));
        if missing_mandatory {
            self.stats.on_prune();
            return Ok(());
        }

        let skipped = self
            .model
            .disjunction_penalties
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.used_disjunctions.contains(*index))
            .fold(0i64, |acc, (_, &penalty)| acc.saturating_add(penalty));
        let cost = partial.saturating_add(skipped);

        self.stats.on_solution();
        self.cost_var.set(cost);
        let accepted = monitor.on_solution_found();
        if accepted && cost < self.best_cost {
            let mut route = self.route.clone();
            route.push(self.model.end);
            self.best_cost = cost;
            self.best = Some(Assignment::new(cost, route));
        }

        self.poll(monitor)
    }
}

/// Exhaustive depth-first [`RoutingEngine`] for one route from `start` to
/// `end`.
#[derive(Debug)]
pub struct BacktrackingEngine {
    model: RouteModel,
    monitors: CompositeMonitor,
    cost_var: Option<ObjectiveVar>,
    closed: bool,
    stats: SearchStatistics,
}

impl BacktrackingEngine {
    /// Creates an empty model over `num_nodes` nodes.
    ///
    /// # Panics
    ///
    /// Panics if `start` or `end` is out of bounds, or if they are equal.
    pub fn new(num_nodes: usize, start: NodeIndex, end: NodeIndex) -> Self {
        assert!(
            start.get() < num_nodes && end.get() < num_nodes,
            "called `BacktrackingEngine::new` with route ends out of bounds: the len is {} but the ends are {} and {}",
            num_nodes,
            start,
            end
        );
        assert_ne!(start, end, "the route start and end must be distinct nodes");

        Self {
            model: RouteModel {
                num_nodes,
                start,
                end,
                dimensions: Vec::new(),
                dimension_index: FxHashMap::default(),
                disjunction_penalties: Vec::new(),
                node_disjunction: vec![None; num_nodes],
            },
            monitors: CompositeMonitor::new(),
            cost_var: None,
            closed: false,
            stats: SearchStatistics::new(),
        }
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.model.num_nodes
    }

    #[inline]
    pub fn start(&self) -> NodeIndex {
        self.model.start
    }

    #[inline]
    pub fn end(&self) -> NodeIndex {
        self.model.end
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.model.dimension(name)
    }

    #[inline]
    pub fn num_disjunctions(&self) -> usize {
        self.model.disjunction_penalties.len()
    }

    /// Penalty of the disjunction `node` belongs to, if any.
    #[inline]
    pub fn disjunction_penalty(&self, node: NodeIndex) -> Option<i64> {
        self.model
            .node_disjunction
            .get(node.get())
            .copied()
            .flatten()
            .map(|index| self.model.disjunction_penalties[index])
    }

    /// The monitors attached so far.
    #[inline]
    pub fn monitors(&self) -> &CompositeMonitor {
        &self.monitors
    }

    #[inline]
    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed {
            Err(EngineError::ModelClosed)
        } else {
            Ok(())
        }
    }

    fn cumul_dimension_mut(
        &mut self,
        node: NodeIndex,
        name: &str,
    ) -> Result<&mut Dimension, EngineError> {
        self.ensure_open()?;
        self.model.check_node(node)?;
        self.model.dimension_mut(name)
    }
}

impl RoutingEngine for BacktrackingEngine {
    fn add_dimension(
        &mut self,
        transit: TransitCallback,
        slack_max: i64,
        capacity: i64,
        fix_start_cumul_to_zero: bool,
        name: &str,
    ) -> Result<(), EngineError> {
        self.ensure_open()?;
        if self.model.dimension_index.contains_key(name) {
            return Err(EngineError::DuplicateDimension(name.to_string()));
        }

        let index = self.model.dimensions.len();
        self.model.dimensions.push(Dimension::new(
            name,
            transit,
            slack_max,
            capacity,
            fix_start_cumul_to_zero,
            self.model.num_nodes,
        ));
        self.model.dimension_index.insert(name.to_string(), index);
        Ok(())
    }

    fn set_span_cost_coefficient(
        &mut self,
        name: &str,
        coefficient: i64,
    ) -> Result<(), EngineError> {
        self.ensure_open()?;
        self.model
            .dimension_mut(name)?
            .set_span_cost_coefficient(coefficient);
        Ok(())
    }

    fn add_disjunction(&mut self, nodes: &[NodeIndex], penalty: i64) -> Result<(), EngineError> {
        self.ensure_open()?;
        for &node in nodes {
            self.model.check_node(node)?;
            if self.model.node_disjunction[node.get()].is_some() {
                return Err(EngineError::DuplicateDisjunction(node));
            }
        }

        let index = self.model.disjunction_penalties.len();
        for &node in nodes {
            self.model.node_disjunction[node.get()] = Some(index);
        }
        self.model.disjunction_penalties.push(penalty);
        Ok(())
    }

    fn set_cumul_min(
        &mut self,
        node: NodeIndex,
        name: &str,
        value: i64,
    ) -> Result<(), EngineError> {
        self.cumul_dimension_mut(node, name)?
            .set_cumul_min(node, value);
        Ok(())
    }

    fn set_cumul_max(
        &mut self,
        node: NodeIndex,
        name: &str,
        value: i64,
    ) -> Result<(), EngineError> {
        self.cumul_dimension_mut(node, name)?
            .set_cumul_max(node, value);
        Ok(())
    }

    fn set_cumul_soft_upper_bound(
        &mut self,
        node: NodeIndex,
        name: &str,
        bound: i64,
        coefficient: i64,
    ) -> Result<(), EngineError> {
        self.cumul_dimension_mut(node, name)?
            .set_soft_upper_bound(node, SoftUpperBound::new(bound, coefficient));
        Ok(())
    }

    fn add_search_monitor(&mut self, monitor: Box<dyn SearchMonitor>) {
        tracing::debug!(monitor = %monitor.debug_string(), "search monitor attached");
        self.monitors.add_monitor_boxed(monitor);
    }

    fn close_model(&mut self, parameters: &SearchParameters) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.cost_var = Some(ObjectiveVar::new());
        tracing::debug!(
            nodes = self.model.num_nodes,
            dimensions = self.model.dimensions.len(),
            disjunctions = self.model.disjunction_penalties.len(),
            %parameters,
            "model closed"
        );
    }

    fn cost_var(&self) -> Option<ObjectiveVar> {
        self.cost_var.clone()
    }

    fn solve_with_parameters(&mut self, parameters: &SearchParameters) -> Option<Assignment> {
        self.close_model(parameters);
        let cost_var = self.cost_var.get_or_insert_with(ObjectiveVar::new).clone();
        self.stats = SearchStatistics::new();

        let session = SearchSession::new(
            &self.model,
            cost_var,
            &mut self.stats,
            parameters.time_limit().map(TimeLimit::new),
        );
        session.run(&mut self.monitors)
    }

    fn statistics(&self) -> &SearchStatistics {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sojourn_search::monitor::solution_limit::SolutionLimit;
    use std::time::Duration;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    /// Four nodes, route 0 -> ... -> 3. Going "forward" one step costs 1,
    /// anything else costs 5.
    fn transit() -> TransitCallback {
        Box::new(|from: NodeIndex, to: NodeIndex| {
            let (i, j) = (from.get(), to.get());
            if i == j {
                0
            } else if j == i + 1 {
                1
            } else {
                5
            }
        })
    }

    fn engine_with_time() -> BacktrackingEngine {
        let mut engine = BacktrackingEngine::new(4, n(0), n(3));
        engine
            .add_dimension(transit(), 100, 100, true, "time")
            .unwrap();
        engine.set_span_cost_coefficient("time", 1).unwrap();
        engine
    }

    #[test]
    fn test_cost_var_only_after_close() {
        let mut engine = engine_with_time();
        assert!(engine.cost_var().is_none());
        engine.close_model(&SearchParameters::new());
        assert!(engine.is_closed());
        let first = engine.cost_var().unwrap();
        engine.close_model(&SearchParameters::new());
        assert!(first.same_source(&engine.cost_var().unwrap()));
    }

    #[test]
    fn test_closed_model_rejects_mutations() {
        let mut engine = engine_with_time();
        engine.close_model(&SearchParameters::new());
        assert_eq!(
            engine.add_dimension(transit(), 0, 10, true, "other"),
            Err(EngineError::ModelClosed)
        );
        assert_eq!(
            engine.add_disjunction(&[n(1)], 0),
            Err(EngineError::ModelClosed)
        );
        assert_eq!(
            engine.set_cumul_min(n(1), "time", 3),
            Err(EngineError::ModelClosed)
        );
        // Monitors may still be attached.
        engine.add_search_monitor(Box::new(SolutionLimit::new(1)));
        assert_eq!(engine.monitors().len(), 1);
    }

    #[test]
    fn test_model_errors() {
        let mut engine = engine_with_time();
        assert_eq!(
            engine.add_dimension(transit(), 0, 10, true, "time"),
            Err(EngineError::DuplicateDimension("time".to_string()))
        );
        assert_eq!(
            engine.set_span_cost_coefficient("order", 1),
            Err(EngineError::UnknownDimension("order".to_string()))
        );
        assert_eq!(
            engine.set_cumul_max(n(7), "time", 3),
            Err(EngineError::NodeOutOfBounds {
                node: n(7),
                num_nodes: 4
            })
        );
        engine.add_disjunction(&[n(1)], 10).unwrap();
        assert_eq!(
            engine.add_disjunction(&[n(2), n(1)], 10),
            Err(EngineError::DuplicateDisjunction(n(1)))
        );
        assert_eq!(engine.num_disjunctions(), 1);
        assert_eq!(engine.disjunction_penalty(n(1)), Some(10));
        assert_eq!(engine.disjunction_penalty(n(2)), None);
    }

    #[test]
    fn test_bound_cuts_routes_before_they_are_reported() {
        let mut engine = engine_with_time();
        let assignment = engine
            .solve_with_parameters(&SearchParameters::new())
            .unwrap();
        assert_eq!(assignment.route(), &[n(0), n(1), n(2), n(3)]);
        assert_eq!(assignment.objective_value(), 3);
        // 0 -> 1 -> 3, 0 -> 2 and 0 -> 3 all reach cost 3 before their leaf.
        assert_eq!(engine.statistics().solutions_found, 1);
        assert_eq!(engine.statistics().prunings, 3);
    }

    #[test]
    #[should_panic]
    fn test_new_rejects_equal_ends() {
        let _ = BacktrackingEngine::new(3, n(1), n(1));
    }

    #[test]
    fn test_finds_cheapest_route_through_mandatory_nodes() {
        let mut engine = engine_with_time();
        let best = engine
            .solve_with_parameters(&SearchParameters::new())
            .unwrap();
        assert_eq!(best.route(), &[n(0), n(1), n(2), n(3)]);
        assert_eq!(best.objective_value(), 3);
        assert!(engine.statistics().solutions_found >= 1);
    }

    #[test]
    fn test_disjunctions_trade_penalty_against_cost() {
        let mut engine = engine_with_time();
        // Visiting node 2 costs at least 1 extra; skipping it costs 100.
        engine.add_disjunction(&[n(2)], 100).unwrap();
        // Node 1 can only be visited at time 0, which is impossible.
        engine.add_disjunction(&[n(1)], 0).unwrap();
        engine.set_cumul_min(n(1), "time", 0).unwrap();
        engine.set_cumul_max(n(1), "time", 0).unwrap();

        let best = engine
            .solve_with_parameters(&SearchParameters::new())
            .unwrap();
        // 0 -> 2 costs 5, 2 -> 3 costs 1.
        assert_eq!(best.route(), &[n(0), n(2), n(3)]);
        assert_eq!(best.objective_value(), 6);
        assert!(!best.is_visited(n(1)));
    }

    #[test]
    fn test_soft_upper_bound_adds_cost() {
        let mut engine = engine_with_time();
        engine.set_cumul_min(n(2), "time", 10).unwrap();
        engine
            .set_cumul_soft_upper_bound(n(3), "time", 8, 2)
            .unwrap();
        let best = engine
            .solve_with_parameters(&SearchParameters::new())
            .unwrap();
        // Wait at node 2 until 10, reach 3 at 11: span 11 + (11 - 8) * 2.
        assert_eq!(best.route(), &[n(0), n(1), n(2), n(3)]);
        assert_eq!(best.objective_value(), 17);
    }

    #[test]
    fn test_infeasible_model_has_no_solution() {
        let mut engine = engine_with_time();
        // Node 1 is mandatory but can never be reached in time.
        engine.set_cumul_max(n(1), "time", 0).unwrap();
        assert!(engine
            .solve_with_parameters(&SearchParameters::new())
            .is_none());
        assert_eq!(engine.statistics().solutions_found, 0);
        assert!(engine.statistics().prunings > 0);
    }

    #[test]
    fn test_solution_limit_stops_after_first_solution() {
        let mut engine = engine_with_time();
        engine.close_model(&SearchParameters::new());
        engine.add_search_monitor(Box::new(SolutionLimit::new(1)));
        let first = engine.solve_with_parameters(&SearchParameters::new());
        assert!(first.is_some());
        assert_eq!(engine.statistics().solutions_found, 1);
    }

    #[test]
    fn test_monitor_progress_is_committed_across_root_branches() {
        // Forward steps are expensive here, so the first route found
        // (0 1 2 3) is beaten later by 0 2 1 3 on another root branch.
        let mut engine = BacktrackingEngine::new(4, n(0), n(3));
        let backward: TransitCallback = Box::new(|from: NodeIndex, to: NodeIndex| {
            let (i, j) = (from.get(), to.get());
            if i == j {
                0
            } else if j == i + 1 {
                5
            } else {
                1
            }
        });
        engine.add_dimension(backward, 100, 100, true, "time").unwrap();
        engine.set_span_cost_coefficient("time", 1).unwrap();
        engine.add_search_monitor(Box::new(SolutionLimit::new(u64::MAX)));
        let best = engine
            .solve_with_parameters(&SearchParameters::new())
            .unwrap();
        assert_eq!(best.route(), &[n(0), n(2), n(1), n(3)]);
        assert_eq!(best.objective_value(), 3);

        let limit = engine
            .monitors()
            .monitor(0)
            .as_any()
            .downcast_ref::<SolutionLimit>()
            .unwrap();
        assert!(engine.statistics().solutions_found > 1);
        assert_eq!(limit.solutions_found(), engine.statistics().solutions_found);
    }

    #[test]
    fn test_zero_time_limit_stops_immediately() {
        let mut engine = engine_with_time();
        let parameters = SearchParameters::new().with_time_limit(Duration::ZERO);
        assert!(engine.solve_with_parameters(&parameters).is_none());
        assert_eq!(engine.statistics().branches, 0);
    }

    #[test]
    fn test_cost_var_holds_last_reported_objective() {
        let mut engine = engine_with_time();
        engine.close_model(&SearchParameters::new());
        let cost = engine.cost_var().unwrap();
        engine.add_search_monitor(Box::new(SolutionLimit::new(1)));
        let best = engine
            .solve_with_parameters(&SearchParameters::new())
            .unwrap();
        assert_eq!(cost.value(), best.objective_value());
    }
}
