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

//! # Solver Configuration
//!
//! Everything the driver and the constraint policy read, collected in one
//! explicit value built with [`SolverConfigBuilder`].
//!
//! ```rust
//! use sojourn_solver::config::SolverConfigBuilder;
//! use std::time::Duration;
//!
//! let config = SolverConfigBuilder::new()
//!     .with_time_limit(Duration::from_secs(10))
//!     .with_no_improvement_limit(100)
//!     .build();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.soft_upper_bound(), 3);
//! ```

use sojourn_search::objective::ObjectiveSense;
use std::time::Duration;

/// Errors raised by [`SolverConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Neither a time limit nor a no-improvement limit is set, so nothing
    /// would ever stop the search.
    #[error("no stop condition: set a time limit or a no-improvement limit")]
    NoStopCondition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    time_limit: Option<Duration>,
    no_improvement_limit: Option<u64>,
    improvement_timeout: Duration,
    soft_upper_bound: i64,
    nearby: bool,
    sense: ObjectiveSense,
}

impl SolverConfig {
    pub const DEFAULT_IMPROVEMENT_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_SOFT_UPPER_BOUND: i64 = 3;

    /// Global wall-clock budget of the search.
    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Number of consecutive non-improving solutions tolerated.
    #[inline]
    pub fn no_improvement_limit(&self) -> Option<u64> {
        self.no_improvement_limit
    }

    /// Wall-clock time tolerated since the last improvement.
    #[inline]
    pub fn improvement_timeout(&self) -> Duration {
        self.improvement_timeout
    }

    /// Slope of the soft deadline penalty; `<= 0` selects the near-hard slope.
    #[inline]
    pub fn soft_upper_bound(&self) -> i64 {
        self.soft_upper_bound
    }

    /// Whether the route should prefer short segments.
    #[inline]
    pub fn nearby(&self) -> bool {
        self.nearby
    }

    #[inline]
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Checks that the search has at least one stop condition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_time_limit = self.time_limit.is_some_and(|limit| !limit.is_zero());
        let has_improvement_limit = self.no_improvement_limit.is_some_and(|limit| limit > 0);
        if has_time_limit || has_improvement_limit {
            Ok(())
        } else {
            Err(ConfigError::NoStopCondition)
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfigBuilder::new().build()
    }
}

impl std::fmt::Display for SolverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let time_limit = match self.time_limit {
            Some(limit) => format!("{:.3}s", limit.as_secs_f64()),
            None => "none".to_string(),
        };
        let no_improvement_limit = match self.no_improvement_limit {
            Some(limit) => limit.to_string(),
            None => "none".to_string(),
        };
        write!(
            f,
            "SolverConfig(time_limit: {}, no_improvement_limit: {}, improvement_timeout: {:.3}s, soft_upper_bound: {}, nearby: {}, sense: {})",
            time_limit,
            no_improvement_limit,
            self.improvement_timeout.as_secs_f64(),
            self.soft_upper_bound,
            self.nearby,
            self.sense
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfigBuilder {
    time_limit: Option<Duration>,
    no_improvement_limit: Option<u64>,
    improvement_timeout: Duration,
    soft_upper_bound: i64,
    nearby: bool,
    sense: ObjectiveSense,
}

impl Default for SolverConfigBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SolverConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            time_limit: None,
            no_improvement_limit: None,
            improvement_timeout: SolverConfig::DEFAULT_IMPROVEMENT_TIMEOUT,
            soft_upper_bound: SolverConfig::DEFAULT_SOFT_UPPER_BOUND,
            nearby: false,
            sense: ObjectiveSense::Minimize,
        }
    }

    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_no_improvement_limit(mut self, limit: u64) -> Self {
        self.no_improvement_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_improvement_timeout(mut self, timeout: Duration) -> Self {
        self.improvement_timeout = timeout;
        self
    }

    #[inline]
    pub fn with_soft_upper_bound(mut self, coefficient: i64) -> Self {
        self.soft_upper_bound = coefficient;
        self
    }

    #[inline]
    pub fn with_nearby(mut self, nearby: bool) -> Self {
        self.nearby = nearby;
        self
    }

    #[inline]
    pub fn with_sense(mut self, sense: ObjectiveSense) -> Self {
        self.sense = sense;
        self
    }

    #[inline]
    pub fn build(self) -> SolverConfig {
        SolverConfig {
            time_limit: self.time_limit,
            no_improvement_limit: self.no_improvement_limit,
            improvement_timeout: self.improvement_timeout,
            soft_upper_bound: self.soft_upper_bound,
            nearby: self.nearby,
            sense: self.sense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit(), None);
        assert_eq!(config.no_improvement_limit(), None);
        assert_eq!(config.improvement_timeout(), Duration::from_secs(1));
        assert_eq!(config.soft_upper_bound(), 3);
        assert!(!config.nearby());
        assert_eq!(config.sense(), ObjectiveSense::Minimize);
    }

    #[test]
    fn test_builder_sets_every_field() {
        let config = SolverConfigBuilder::new()
            .with_time_limit(Duration::from_millis(250))
            .with_no_improvement_limit(40)
            .with_improvement_timeout(Duration::from_secs(2))
            .with_soft_upper_bound(0)
            .with_nearby(true)
            .with_sense(ObjectiveSense::Maximize)
            .build();
        assert_eq!(config.time_limit(), Some(Duration::from_millis(250)));
        assert_eq!(config.no_improvement_limit(), Some(40));
        assert_eq!(config.improvement_timeout(), Duration::from_secs(2));
        assert_eq!(config.soft_upper_bound(), 0);
        assert!(config.nearby());
        assert_eq!(config.sense(), ObjectiveSense::Maximize);
    }

    #[test]
    fn test_validate_requires_stop_condition() {
        assert_eq!(
            SolverConfig::default().validate(),
            Err(ConfigError::NoStopCondition)
        );
        assert_eq!(
            SolverConfigBuilder::new()
                .with_time_limit(Duration::ZERO)
                .with_no_improvement_limit(0)
                .build()
                .validate(),
            Err(ConfigError::NoStopCondition)
        );
        assert!(SolverConfigBuilder::new()
            .with_time_limit(Duration::from_secs(1))
            .build()
            .validate()
            .is_ok());
        assert!(SolverConfigBuilder::new()
            .with_no_improvement_limit(1)
            .build()
            .validate()
            .is_ok());
    }

    #[test]
    fn test_display() {
        let config = SolverConfigBuilder::new()
            .with_no_improvement_limit(5)
            .build();
        assert_eq!(
            config.to_string(),
            "SolverConfig(time_limit: none, no_improvement_limit: 5, improvement_timeout: 1.000s, soft_upper_bound: 3, nearby: false, sense: minimize)"
        );
    }
}
