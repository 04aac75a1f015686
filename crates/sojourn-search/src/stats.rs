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

/// Counters collected by an engine during one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Number of feasible solutions reported to the monitors.
    pub solutions_found: u64,
    /// Number of branches explored.
    pub branches: u64,
    /// Number of branches cut by bound or feasibility.
    pub prunings: u64,
    /// Total duration of the search.
    pub duration: std::time::Duration,
}

impl SearchStatistics {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn on_solution(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub fn on_branch(&mut self) {
        self.branches = self.branches.saturating_add(1);
    }

    #[inline]
    pub fn on_prune(&mut self) {
        self.prunings = self.prunings.saturating_add(1);
    }

    #[inline]
    pub fn set_duration(&mut self, duration: std::time::Duration) {
        self.duration = duration;
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Search Statistics:")?;
        writeln!(f, "  Solutions Found: {}", self.solutions_found)?;
        writeln!(f, "  Branches: {}", self.branches)?;
        writeln!(f, "  Prunings: {}", self.prunings)?;
        writeln!(
            f,
            "  Search Duration (secs): {:.3}",
            self.duration.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::SearchStatistics;
    use std::time::Duration;

    #[test]
    fn test_counters_accumulate() {
        let mut stats = SearchStatistics::new();
        stats.on_solution();
        stats.on_branch();
        stats.on_branch();
        stats.on_prune();
        stats.set_duration(Duration::from_millis(20));

        assert_eq!(stats.solutions_found, 1);
        assert_eq!(stats.branches, 2);
        assert_eq!(stats.prunings, 1);
        assert_eq!(stats.duration, Duration::from_millis(20));
    }

    #[test]
    fn test_display_formats_all_fields() {
        let stats = SearchStatistics {
            solutions_found: 2,
            branches: 40,
            prunings: 7,
            duration: Duration::from_millis(1234),
        };

        let rendered = format!("{}", stats);

        assert!(rendered.contains("Search Statistics:"), "missing header");
        assert!(rendered.contains("Solutions Found: 2"));
        assert!(rendered.contains("Branches: 40"));
        assert!(rendered.contains("Prunings: 7"));
        assert!(
            rendered.contains("Search Duration (secs): 1.234"),
            "duration not formatted to 3 decimals"
        );
    }

    #[test]
    fn test_display_handles_zero_values() {
        let rendered = format!("{}", SearchStatistics::default());
        assert!(rendered.contains("Solutions Found: 0"));
        assert!(rendered.contains("Search Duration (secs): 0.000"));
    }
}
