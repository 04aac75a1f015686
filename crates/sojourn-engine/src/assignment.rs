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

use sojourn_model::index::NodeIndex;

/// A solution returned by an engine: the visiting order from route start to
/// route end (both included) and its objective value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    objective_value: i64,
    route: Vec<NodeIndex>,
}

impl Assignment {
    #[inline]
    pub fn new(objective_value: i64, route: Vec<NodeIndex>) -> Self {
        Self {
            objective_value,
            route,
        }
    }

    #[inline]
    pub fn objective_value(&self) -> i64 {
        self.objective_value
    }

    #[inline]
    pub fn route(&self) -> &[NodeIndex] {
        &self.route
    }

    /// Returns `true` if `node` is visited by the route.
    #[inline]
    pub fn is_visited(&self, node: NodeIndex) -> bool {
        self.route.contains(&node)
    }

    #[inline]
    pub fn into_route(self) -> Vec<NodeIndex> {
        self.route
    }
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let route = self
            .route
            .iter()
            .map(|n| n.get().to_string())
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "Assignment(objective: {}, route: [{}])", self.objective_value, route)
    }
}
