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

//! # Solve Orchestration
//!
//! [`SolverDriver`] turns an [`Instance`] into a routing model, attaches the
//! search monitors, runs the engine and rescales the result.
//!
//! ## Model
//!
//! - `"time"`: transit `time + service(from)`, slack and capacity `horizon`,
//!   span cost [`TIME_SPAN_COST_COEFFICIENT`].
//! - `"distance"`: transit `distance`, no slack, unbounded.
//! - `"order"` (only with `nearby`): transit `time^2`, slack and capacity
//!   `horizon`, span cost [`ORDER_SPAN_COST_COEFFICIENT`].
//! - Windows of every regular node between start and end, and of every
//!   rest, go through [`ModelBuilder`].
//!
//! ## Monitors
//!
//! A [`ProgressLogger`] is always attached. Routes with more than three
//! nodes get a [`NoImprovementLimit`] when a positive no-improvement limit
//! is configured; smaller ones stop at their first solution.
//!
//! ## Usage
//!
//! ```rust
//! use sojourn_engine::backtracking::BacktrackingEngine;
//! use sojourn_model::{instance::InstanceBuilder, window::NodeWindow};
//! use sojourn_solver::{config::SolverConfigBuilder, driver::SolverDriver};
//!
//! let mut builder = InstanceBuilder::new(3);
//! builder.time_matrix(vec![0, 10, 20, 10, 0, 10, 20, 10, 0]);
//! builder.set_window(1, NodeWindow::new(5, 0));
//! let instance = builder.build().unwrap();
//!
//! let config = SolverConfigBuilder::new().with_no_improvement_limit(10).build();
//! let driver = SolverDriver::new(config);
//! let mut engine = BacktrackingEngine::new(instance.size(), instance.start(), instance.end());
//! let solution = driver.solve(&instance, &mut engine).unwrap();
//! assert_eq!(solution.route().len(), 3);
//! ```

use crate::{
    config::{ConfigError, SolverConfig},
    model_builder::{ModelBuilder, NodeKind, TIME_DIMENSION},
};
use sojourn_engine::{engine::RoutingEngine, error::EngineError, params::SearchParameters};
use sojourn_model::{index::NodeIndex, instance::Instance};
use sojourn_search::{
    error::MonitorError,
    monitor::{
        no_improvement::NoImprovementLimit, progress::ProgressLogger,
        search_monitor::SearchMonitor, solution_limit::SolutionLimit,
    },
    objective::{ObjectiveTracker, ObjectiveVar},
};
use std::sync::Arc;

/// Engine costs are reported divided by this factor.
pub const COST_SCALE: i64 = 500;

pub const TIME_SPAN_COST_COEFFICIENT: i64 = 5;

pub const ORDER_SPAN_COST_COEFFICIENT: i64 = 1;

pub const DISTANCE_DIMENSION: &str = "distance";

pub const ORDER_DIMENSION: &str = "order";

/// Routes up to this many nodes stop at their first solution.
pub const SMALL_ROUTE_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Monitor(#[from] MonitorError),
    #[error("no solution found")]
    NoSolution,
}

/// The route found by a solve, with its cost back in instance units.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSolution {
    cost: f64,
    objective_value: i64,
    route: Vec<NodeIndex>,
}

impl RouteSolution {
    #[inline]
    pub fn new(objective_value: i64, route: Vec<NodeIndex>) -> Self {
        Self {
            cost: objective_value as f64 / COST_SCALE as f64,
            objective_value,
            route,
        }
    }

    /// Objective divided by [`COST_SCALE`].
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Raw engine objective.
    #[inline]
    pub fn objective_value(&self) -> i64 {
        self.objective_value
    }

    /// Visiting order, route start and end included.
    #[inline]
    pub fn route(&self) -> &[NodeIndex] {
        &self.route
    }
}

impl std::fmt::Display for RouteSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let route = self
            .route
            .iter()
            .map(|n| n.get().to_string())
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "RouteSolution(cost: {:.3}, route: {})", self.cost, route)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverDriver {
    config: SolverConfig,
}

impl SolverDriver {
    #[inline]
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Parameters handed to the engine. A zero time limit means no limit.
    #[inline]
    pub fn search_parameters(&self) -> SearchParameters {
        match self.config.time_limit().filter(|limit| !limit.is_zero()) {
            Some(limit) => SearchParameters::new().with_time_limit(limit),
            None => SearchParameters::new(),
        }
    }

    /// Registers the dimensions and the per-node window constraints.
    pub fn build_model<E>(&self, instance: &Instance, engine: &mut E) -> Result<(), EngineError>
    where
        E: RoutingEngine + ?Sized,
    {
        tracing::debug!(%instance, nearby = self.config.nearby(), "building routing model");

        let data = Arc::new(instance.clone());
        let horizon = instance.horizon();

        let time = Arc::clone(&data);
        engine.add_dimension(
            Box::new(move |from: NodeIndex, to: NodeIndex| {
                time.time_plus_service_time(from, to)
            }),
            horizon,
            horizon,
            true,
            TIME_DIMENSION,
        )?;
        let distance = Arc::clone(&data);
        engine.add_dimension(
            Box::new(move |from: NodeIndex, to: NodeIndex| distance.distance(from, to)),
            0,
            i64::MAX,
            true,
            DISTANCE_DIMENSION,
        )?;
        if self.config.nearby() {
            let order = Arc::clone(&data);
            engine.add_dimension(
                Box::new(move |from: NodeIndex, to: NodeIndex| {
                    order.time_order(from, to)
                }),
                horizon,
                horizon,
                true,
                ORDER_DIMENSION,
            )?;
            engine.set_span_cost_coefficient(ORDER_DIMENSION, ORDER_SPAN_COST_COEFFICIENT)?;
        }
        engine.set_span_cost_coefficient(TIME_DIMENSION, TIME_SPAN_COST_COEFFICIENT)?;

        let policy = ModelBuilder::new(&self.config);
        for node in instance.visit_nodes() {
            policy.apply(engine, node, NodeKind::Regular, instance.window(node))?;
        }
        for node in instance.rest_nodes() {
            policy.apply(engine, node, NodeKind::Rest, instance.window(node))?;
        }
        Ok(())
    }

    /// The monitors a solve of `instance` attaches, bound to `objective`.
    pub fn build_monitors(
        &self,
        instance: &Instance,
        objective: Option<ObjectiveVar>,
    ) -> Result<Vec<Box<dyn SearchMonitor>>, MonitorError> {
        let tracker = ObjectiveTracker::new(objective)?;
        let sense = self.config.sense();

        let mut monitors: Vec<Box<dyn SearchMonitor>> = Vec::with_capacity(2);
        monitors.push(Box::new(
            ProgressLogger::new(tracker.clone(), sense).with_cost_scale(COST_SCALE),
        ));

        if instance.size() > SMALL_ROUTE_SIZE {
            if let Some(tolerance) = self.config.no_improvement_limit().filter(|&l| l > 0) {
                monitors.push(Box::new(NoImprovementLimit::new(
                    tracker,
                    tolerance,
                    self.config.improvement_timeout(),
                    sense,
                )));
            }
        } else {
            monitors.push(Box::new(SolutionLimit::new(1)));
        }

        Ok(monitors)
    }

    /// Builds the model on `engine`, runs the search and returns the best route.
    pub fn solve<E>(&self, instance: &Instance, engine: &mut E) -> Result<RouteSolution, SolveError>
    where
        E: RoutingEngine + ?Sized,
    {
        self.config.validate()?;
        self.build_model(instance, engine)?;

        let parameters = self.search_parameters();
        engine.close_model(&parameters);
        for monitor in self.build_monitors(instance, engine.cost_var())? {
            engine.add_search_monitor(monitor);
        }

        match engine.solve_with_parameters(&parameters) {
            Some(assignment) => {
                let solution =
                    RouteSolution::new(assignment.objective_value(), assignment.into_route());
                tracing::info!(
                    cost = solution.cost(),
                    stops = solution.route().len(),
                    "route found"
                );
                Ok(solution)
            }
            None => {
                tracing::warn!(%instance, "no solution found");
                Err(SolveError::NoSolution)
            }
        }
    }
}
