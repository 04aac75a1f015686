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

//! # Time-Window Constraint Policy
//!
//! Decides, per node, how its raw ready/due timestamps turn into engine
//! constraints on the `"time"` dimension:
//!
//! | node    | ready | due                 | shape                                   |
//! |---------|-------|---------------------|-----------------------------------------|
//! | regular | `<=0` | `<=0`               | `FreeSkip`: skippable for free, cumul pinned to `[0, 0]` |
//! | any     | `>0`  |                     | `Mandatory`, cumul `>= ready`           |
//! | any     |       | `0 < due < NO_DEADLINE` | `Mandatory`, soft deadline at `due` |
//! | rest    | any   | any                 | always `Mandatory`                      |
//!
//! Mandatory nodes sit in a singleton disjunction with [`MANDATORY_PENALTY`],
//! so the engine may still drop one when the windows leave no other choice,
//! at a cost that dwarfs any real route cost. The deadline slope is the
//! configured `soft_upper_bound`, or [`HARD_DEADLINE_COEFFICIENT`] when that
//! is not positive.

use crate::config::SolverConfig;
use sojourn_engine::{engine::RoutingEngine, error::EngineError};
use sojourn_model::{index::NodeIndex, window::NodeWindow};

/// Skip penalty of a mandatory node (2^56).
pub const MANDATORY_PENALTY: i64 = 1 << 56;

/// Deadline slope used when the configured one is not positive.
pub const HARD_DEADLINE_COEFFICIENT: i64 = 10_000_000;

/// Name of the dimension every window applies to.
pub const TIME_DIMENSION: &str = "time";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Regular,
    Rest,
}

/// A linearly penalised deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoftDeadline {
    pub bound: i64,
    pub coefficient: i64,
}

/// Constraints derived for one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintShape {
    /// May be skipped at no cost.
    FreeSkip,
    /// Must be visited, optionally no earlier than `min_time` and at a cost
    /// past `soft_deadline`.
    Mandatory {
        min_time: Option<i64>,
        soft_deadline: Option<SoftDeadline>,
    },
}

impl ConstraintShape {
    /// Penalty paid when the node is not visited.
    #[inline]
    pub fn skip_penalty(&self) -> i64 {
        match self {
            ConstraintShape::FreeSkip => 0,
            ConstraintShape::Mandatory { .. } => MANDATORY_PENALTY,
        }
    }

    #[inline]
    pub fn is_mandatory(&self) -> bool {
        matches!(self, ConstraintShape::Mandatory { .. })
    }
}

impl std::fmt::Display for ConstraintShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintShape::FreeSkip => write!(f, "FreeSkip"),
            ConstraintShape::Mandatory {
                min_time,
                soft_deadline,
            } => {
                write!(f, "Mandatory(")?;
                match min_time {
                    Some(min) => write!(f, "min: {}", min)?,
                    None => write!(f, "min: -")?,
                }
                match soft_deadline {
                    Some(deadline) => write!(
                        f,
                        ", deadline: {} x{})",
                        deadline.bound, deadline.coefficient
                    ),
                    None => write!(f, ", deadline: -)"),
                }
            }
        }
    }
}

/// Applies the time-window policy to an engine, one node at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelBuilder {
    deadline_coefficient: i64,
}

impl ModelBuilder {
    #[inline]
    pub fn new(config: &SolverConfig) -> Self {
        let deadline_coefficient = if config.soft_upper_bound() > 0 {
            config.soft_upper_bound()
        } else {
            HARD_DEADLINE_COEFFICIENT
        };
        Self {
            deadline_coefficient,
        }
    }

    /// Slope applied to every soft deadline.
    #[inline]
    pub fn deadline_coefficient(&self) -> i64 {
        self.deadline_coefficient
    }

    /// Derives the constraint shape of a node.
    pub fn shape(&self, window: NodeWindow, kind: NodeKind) -> ConstraintShape {
        if kind == NodeKind::Regular && window.is_unconstrained() {
            return ConstraintShape::FreeSkip;
        }

        ConstraintShape::Mandatory {
            min_time: window.ready_time(),
            soft_deadline: window.deadline().map(|bound| SoftDeadline {
                bound,
                coefficient: self.deadline_coefficient,
            }),
        }
    }

    /// Registers the constraints of `node` with `engine` and returns the
    /// shape that was applied.
    pub fn apply<E>(
        &self,
        engine: &mut E,
        node: NodeIndex,
        kind: NodeKind,
        window: NodeWindow,
    ) -> Result<ConstraintShape, EngineError>
    where
        E: RoutingEngine + ?Sized,
    {
        let shape = self.shape(window, kind);
        match shape {
            ConstraintShape::FreeSkip => {
                engine.add_disjunction(&[node], 0)?;
                engine.set_cumul_min(node, TIME_DIMENSION, 0)?;
                engine.set_cumul_max(node, TIME_DIMENSION, 0)?;
            }
            ConstraintShape::Mandatory {
                min_time,
                soft_deadline,
            } => {
                if let Some(min_time) = min_time {
                    engine.set_cumul_min(node, TIME_DIMENSION, min_time)?;
                }
                if let Some(deadline) = soft_deadline {
                    engine.set_cumul_soft_upper_bound(
                        node,
                        TIME_DIMENSION,
                        deadline.bound,
                        deadline.coefficient,
                    )?;
                }
                engine.add_disjunction(&[node], MANDATORY_PENALTY)?;
            }
        }

        tracing::debug!(%node, %window, %shape, "node constrained");
        Ok(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfigBuilder;
    use proptest::prelude::*;
    use sojourn_engine::{
        assignment::Assignment, backtracking::BacktrackingEngine, dimension::TransitCallback,
        params::SearchParameters,
    };
    use sojourn_model::window::NO_DEADLINE;
    use sojourn_search::{
        monitor::search_monitor::SearchMonitor, objective::ObjectiveVar, stats::SearchStatistics,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Disjunction(Vec<NodeIndex>, i64),
        CumulMin(NodeIndex, String, i64),
        CumulMax(NodeIndex, String, i64),
        SoftUpperBound(NodeIndex, String, i64, i64),
    }

    /// Records the constraint calls it receives.
    #[derive(Default)]
    struct RecordingEngine {
        calls: Vec<Call>,
        stats: SearchStatistics,
    }

    impl RoutingEngine for RecordingEngine {
        fn add_dimension(
            &mut self,
            _transit: TransitCallback,
            _slack_max: i64,
            _capacity: i64,
            _fix_start_cumul_to_zero: bool,
            _name: &str,
        ) -> Result<(), EngineError> {
            Ok(())
        }

        fn set_span_cost_coefficient(
            &mut self,
            _name: &str,
            _coefficient: i64,
        ) -> Result<(), EngineError> {
            Ok(())
        }

        fn add_disjunction(
            &mut self,
            nodes: &[NodeIndex],
            penalty: i64,
        ) -> Result<(), EngineError> {
            self.calls.push(Call::Disjunction(nodes.to_vec(), penalty));
            Ok(())
        }

        fn set_cumul_min(
            &mut self,
            node: NodeIndex,
            name: &str,
            value: i64,
        ) -> Result<(), EngineError> {
            self.calls.push(Call::CumulMin(node, name.to_string(), value));
            Ok(())
        }

        fn set_cumul_max(
            &mut self,
            node: NodeIndex,
            name: &str,
            value: i64,
        ) -> Result<(), EngineError> {
            self.calls.push(Call::CumulMax(node, name.to_string(), value));
            Ok(())
        }

        fn set_cumul_soft_upper_bound(
            &mut self,
            node: NodeIndex,
            name: &str,
            bound: i64,
            coefficient: i64,
        ) -> Result<(), EngineError> {
            self.calls
                .push(Call::SoftUpperBound(node, name.to_string(), bound, coefficient));
            Ok(())
        }

        fn add_search_monitor(&mut self, _monitor: Box<dyn SearchMonitor>) {}

        fn close_model(&mut self, _parameters: &SearchParameters) {}

        fn cost_var(&self) -> Option<ObjectiveVar> {
            None
        }

        fn solve_with_parameters(&mut self, _parameters: &SearchParameters) -> Option<Assignment> {
            None
        }

        fn statistics(&self) -> &SearchStatistics {
            &self.stats
        }
    }

    fn builder(soft_upper_bound: i64) -> ModelBuilder {
        ModelBuilder::new(
            &SolverConfigBuilder::new()
                .with_soft_upper_bound(soft_upper_bound)
                .build(),
        )
    }

    fn record(
        builder: &ModelBuilder,
        kind: NodeKind,
        ready: i64,
        due: i64,
    ) -> (ConstraintShape, Vec<Call>) {
        let mut engine = RecordingEngine::default();
        let shape = builder
            .apply(&mut engine, NodeIndex::new(4), kind, NodeWindow::new(ready, due))
            .unwrap();
        (shape, engine.calls)
    }

    fn time() -> String {
        TIME_DIMENSION.to_string()
    }

    #[test]
    fn test_unconstrained_regular_node_is_free_to_skip() {
        let (shape, calls) = record(&builder(3), NodeKind::Regular, 0, 0);
        let node = NodeIndex::new(4);
        assert_eq!(shape, ConstraintShape::FreeSkip);
        assert_eq!(shape.skip_penalty(), 0);
        assert_eq!(
            calls,
            vec![
                Call::Disjunction(vec![node], 0),
                Call::CumulMin(node, time(), 0),
                Call::CumulMax(node, time(), 0),
            ]
        );
    }

    #[test]
    fn test_negative_bounds_count_as_unspecified() {
        let (shape, _) = record(&builder(3), NodeKind::Regular, -5, -1);
        assert_eq!(shape, ConstraintShape::FreeSkip);
    }

    #[test]
    fn test_ready_time_only() {
        let (shape, calls) = record(&builder(3), NodeKind::Regular, 100, 0);
        let node = NodeIndex::new(4);
        assert_eq!(
            shape,
            ConstraintShape::Mandatory {
                min_time: Some(100),
                soft_deadline: None
            }
        );
        assert_eq!(
            calls,
            vec![
                Call::CumulMin(node, time(), 100),
                Call::Disjunction(vec![node], MANDATORY_PENALTY),
            ]
        );
    }

    #[test]
    fn test_due_time_only_uses_configured_slope() {
        let (shape, calls) = record(&builder(3), NodeKind::Regular, 0, 500);
        let node = NodeIndex::new(4);
        assert_eq!(
            shape,
            ConstraintShape::Mandatory {
                min_time: None,
                soft_deadline: Some(SoftDeadline {
                    bound: 500,
                    coefficient: 3
                })
            }
        );
        assert_eq!(
            calls,
            vec![
                Call::SoftUpperBound(node, time(), 500, 3),
                Call::Disjunction(vec![node], MANDATORY_PENALTY),
            ]
        );
    }

    #[test]
    fn test_no_deadline_sentinel_is_mandatory_without_bound() {
        let (shape, calls) = record(&builder(3), NodeKind::Regular, 0, NO_DEADLINE);
        assert_eq!(
            shape,
            ConstraintShape::Mandatory {
                min_time: None,
                soft_deadline: None
            }
        );
        assert_eq!(
            calls,
            vec![Call::Disjunction(vec![NodeIndex::new(4)], MANDATORY_PENALTY)]
        );
    }

    #[test]
    fn test_non_positive_slope_falls_back_to_hard_coefficient() {
        for slope in [0, -2] {
            let b = builder(slope);
            assert_eq!(b.deadline_coefficient(), HARD_DEADLINE_COEFFICIENT);
            let (_, calls) = record(&b, NodeKind::Regular, 10, 20);
            assert!(calls.contains(&Call::SoftUpperBound(
                NodeIndex::new(4),
                time(),
                20,
                HARD_DEADLINE_COEFFICIENT
            )));
        }
    }

    #[test]
    fn test_full_window() {
        let (shape, calls) = record(&builder(7), NodeKind::Regular, 30, 90);
        let node = NodeIndex::new(4);
        assert_eq!(
            shape.to_string(),
            "Mandatory(min: 30, deadline: 90 x7)"
        );
        assert_eq!(
            calls,
            vec![
                Call::CumulMin(node, time(), 30),
                Call::SoftUpperBound(node, time(), 90, 7),
                Call::Disjunction(vec![node], MANDATORY_PENALTY),
            ]
        );
    }

    #[test]
    fn test_rest_nodes_are_always_mandatory() {
        let (shape, calls) = record(&builder(3), NodeKind::Rest, 0, 0);
        assert_eq!(
            shape,
            ConstraintShape::Mandatory {
                min_time: None,
                soft_deadline: None
            }
        );
        assert_eq!(
            calls,
            vec![Call::Disjunction(vec![NodeIndex::new(4)], MANDATORY_PENALTY)]
        );
    }

    #[test]
    fn test_apply_surfaces_engine_errors() {
        // No "time" dimension registered.
        let mut engine = BacktrackingEngine::new(3, NodeIndex::new(0), NodeIndex::new(2));
        let err = builder(3)
            .apply(
                &mut engine,
                NodeIndex::new(1),
                NodeKind::Regular,
                NodeWindow::new(5, 0),
            )
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownDimension("time".to_string()));
    }

    #[test]
    fn test_display_free_skip() {
        assert_eq!(ConstraintShape::FreeSkip.to_string(), "FreeSkip");
        assert_eq!(
            ConstraintShape::Mandatory {
                min_time: None,
                soft_deadline: None
            }
            .to_string(),
            "Mandatory(min: -, deadline: -)"
        );
    }

    proptest! {
        #[test]
        fn prop_shape_follows_window_sentinels(
            ready in -10i64..1_000,
            due in prop_oneof![-10i64..1_000, Just(NO_DEADLINE), Just(i64::MAX)],
            slope in -3i64..10,
            rest in any::<bool>(),
        ) {
            let b = builder(slope);
            let kind = if rest { NodeKind::Rest } else { NodeKind::Regular };
            let shape = b.shape(NodeWindow::new(ready, due), kind);

            if !rest && ready <= 0 && due <= 0 {
                prop_assert_eq!(shape, ConstraintShape::FreeSkip);
            } else {
                let expected_min = (ready > 0).then_some(ready);
                let expected_deadline = (due > 0 && due < NO_DEADLINE).then_some(SoftDeadline {
                    bound: due,
                    coefficient: if slope > 0 { slope } else { HARD_DEADLINE_COEFFICIENT },
                });
                prop_assert_eq!(
                    shape,
                    ConstraintShape::Mandatory {
                        min_time: expected_min,
                        soft_deadline: expected_deadline,
                    }
                );
                prop_assert_eq!(shape.skip_penalty(), MANDATORY_PENALTY);
            }
        }
    }
}
