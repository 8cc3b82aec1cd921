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

// ========================= config.rs =========================

use std::path::{Path, PathBuf};

/// Parameters of the gravity accessibility objective.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveConfig {
    /// How many of the lowest population metrics the objective sums.
    pub lowest_metrics: usize,
    /// Distance falloff exponent (applied as a negative power).
    pub gravity_exponent: f64,
    /// Scaling multiplier applied to each population metric.
    pub multiplier: f64,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self {
            lowest_metrics: 1,
            gravity_exponent: 1.0,
            multiplier: 1.0,
        }
    }
}

/// Parameters of the user-cost constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCostConfig {
    /// User cost of the baseline solution.
    pub initial_user_cost: f64,
    /// Allowed relative increase over the baseline. Negative disables
    /// the constraint check entirely.
    pub percent_increase: f64,
    /// Weight of in-vehicle riding time.
    pub riding_weight: f64,
    /// Weight of walking time.
    pub walking_weight: f64,
    /// Weight of waiting time.
    pub waiting_weight: f64,
}

impl Default for UserCostConfig {
    fn default() -> Self {
        Self {
            initial_user_cost: 0.0,
            percent_increase: -1.0,
            riding_weight: 1.0,
            walking_weight: 1.0,
            waiting_weight: 1.0,
        }
    }
}

/// Parameters of the Frank-Wolfe assignment model.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentConfig {
    /// Error-bound cutoff.
    pub error_tolerance: f64,
    /// Maximum elementwise flow change cutoff.
    pub flow_tolerance: f64,
    /// Waiting time change cutoff.
    pub waiting_tolerance: f64,
    /// Iteration cutoff.
    pub max_iterations: u32,
    /// Alpha parameter of the conical congestion function.
    pub conical_alpha: f64,
    /// Beta parameter of the conical congestion function.
    pub conical_beta: f64,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            error_tolerance: 1e-4,
            flow_tolerance: 1e-3,
            waiting_tolerance: 1e-3,
            max_iterations: 100,
            conical_alpha: 4.0,
            conical_beta: 1.0 + 3.0 / 8.0,
        }
    }
}

/// Parameters of the tabu-search / simulated-annealing driver.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Continue from the saved memory and solution logs instead of
    /// starting fresh.
    pub resume: bool,
    /// Outer iteration budget.
    pub max_iterations: u32,
    /// Initial simulated annealing temperature.
    pub initial_temperature: f64,
    /// Multiplicative cooling factor, in (0, 1).
    pub cooling_factor: f64,
    /// Capacity of the attractive-solution pool.
    pub attractive_max: usize,
    /// ADD moves collected in the first neighborhood pass.
    pub add_first: usize,
    /// ADD moves kept after the second (constraint) pass.
    pub add_second: usize,
    /// DROP moves collected in the first neighborhood pass.
    pub drop_first: usize,
    /// DROP moves kept after the second (constraint) pass.
    pub drop_second: usize,
    /// SWAP combinations kept.
    pub swap_max: usize,
    /// Initial tabu tenure.
    pub tenure_initial: f64,
    /// Multiplicative tenure growth factor, greater than 1.
    pub tenure_factor: f64,
    /// Inner non-improvement cutoff (triggers a pool jump).
    pub nonimp_inner_max: u32,
    /// Outer non-improvement cutoff (triggers a tenure reset).
    pub nonimp_outer_max: u32,
    /// Fleet increment applied by a single ADD or DROP.
    pub step: u32,
    /// Run the exhaustive local search after the budget is spent.
    pub exhaustive: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            resume: false,
            max_iterations: 1000,
            initial_temperature: 1.0,
            cooling_factor: 0.995,
            attractive_max: 10,
            add_first: 20,
            add_second: 5,
            drop_first: 20,
            drop_second: 5,
            swap_max: 10,
            tenure_initial: 5.0,
            tenure_factor: 1.5,
            nonimp_inner_max: 10,
            nonimp_outer_max: 20,
            step: 1,
            exhaustive: false,
        }
    }
}

/// File layout of a problem instance: tab-separated inputs under
/// `<base>/data/`, logs and results under `<base>/log/`.
#[derive(Debug, Clone)]
pub struct DataLayout {
    base: PathBuf,
}

impl DataLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        DataLayout { base: base.into() }
    }

    #[inline]
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn data(&self, name: &str) -> PathBuf {
        self.base.join("data").join(name)
    }

    fn log(&self, name: &str) -> PathBuf {
        self.base.join("log").join(name)
    }

    /// Creates the log directory if it does not exist yet.
    pub fn ensure_log_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.base.join("log"))
    }

    // Inputs.

    pub fn node_data(&self) -> PathBuf {
        self.data("node_data.txt")
    }

    pub fn arc_data(&self) -> PathBuf {
        self.data("arc_data.txt")
    }

    pub fn od_data(&self) -> PathBuf {
        self.data("od_data.txt")
    }

    pub fn transit_data(&self) -> PathBuf {
        self.data("transit_data.txt")
    }

    pub fn vehicle_data(&self) -> PathBuf {
        self.data("vehicle_data.txt")
    }

    pub fn problem_data(&self) -> PathBuf {
        self.data("problem_data.txt")
    }

    pub fn objective_data(&self) -> PathBuf {
        self.data("objective_data.txt")
    }

    pub fn user_cost_data(&self) -> PathBuf {
        self.data("user_cost_data.txt")
    }

    pub fn assignment_data(&self) -> PathBuf {
        self.data("assignment_data.txt")
    }

    pub fn search_parameters(&self) -> PathBuf {
        self.data("search_parameters.txt")
    }

    pub fn initial_flows(&self) -> PathBuf {
        self.data("initial_flows.txt")
    }

    pub fn initial_solution_log(&self) -> PathBuf {
        self.data("initial_solution_log.txt")
    }

    // Outputs.

    pub fn solution_log(&self) -> PathBuf {
        self.log("solution.txt")
    }

    pub fn memory_log(&self) -> PathBuf {
        self.log("memory.txt")
    }

    pub fn event_log(&self) -> PathBuf {
        self.log("event.txt")
    }

    pub fn objective_log(&self) -> PathBuf {
        self.log("objective.txt")
    }

    pub fn final_solution(&self) -> PathBuf {
        self.log("final.txt")
    }

    pub fn metrics(&self) -> PathBuf {
        self.log("metrics.txt")
    }

    pub fn report(&self) -> PathBuf {
        self.log("report.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_splits_inputs_and_logs() {
        let layout = DataLayout::new("/tmp/instance");
        assert!(layout.node_data().ends_with("data/node_data.txt"));
        assert!(layout.search_parameters().ends_with("data/search_parameters.txt"));
        assert!(layout.memory_log().ends_with("log/memory.txt"));
        assert!(layout.report().ends_with("log/report.json"));
    }

    #[test]
    fn defaults_are_sane() {
        let search = SearchConfig::default();
        assert!(search.cooling_factor > 0.0 && search.cooling_factor < 1.0);
        assert!(search.tenure_factor > 1.0);
        let assignment = AssignmentConfig::default();
        assert!(assignment.error_tolerance > 0.0);
    }
}
