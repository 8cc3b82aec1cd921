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

use crate::{
    assignment::{FlowPattern, NonlinearAssignment},
    log::Feasibility,
};
use headway_model::{AssignmentConfig, Network, Solution, UserCostConfig};

/// The three user-cost components, in the order of the memo columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserCostComponents {
    pub riding: f64,
    pub walking: f64,
    pub waiting: f64,
}

impl UserCostComponents {
    pub const ZERO: UserCostComponents = UserCostComponents {
        riding: 0.0,
        walking: 0.0,
        waiting: 0.0,
    };

    /// Weighted total user cost.
    pub fn total(&self, config: &UserCostConfig) -> f64 {
        config.riding_weight * self.riding
            + config.walking_weight * self.walking
            + config.waiting_weight * self.waiting
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.riding, self.walking, self.waiting]
    }
}

/// The user-cost feasibility test.
///
/// Each evaluation runs the nonlinear assignment warm-started from the
/// flow pattern of the previous evaluation, prices the riding, walking,
/// and waiting components, and compares the weighted total against the
/// allowed increase over the baseline user cost.
pub struct UserCostConstraint<'a> {
    net: &'a Network,
    config: UserCostConfig,
    assignment: NonlinearAssignment<'a>,
    last: FlowPattern,
}

impl<'a> UserCostConstraint<'a> {
    /// Builds the constraint evaluator, optionally warm-started from a
    /// loaded flow vector.
    pub fn new(
        net: &'a Network,
        config: UserCostConfig,
        assignment_config: AssignmentConfig,
        initial_flows: Option<Vec<f64>>,
    ) -> Self {
        UserCostConstraint {
            net,
            config,
            assignment: NonlinearAssignment::new(net, assignment_config),
            last: FlowPattern::from_initial(net.arcs().len(), initial_flows),
        }
    }

    #[inline]
    pub fn config(&self) -> &UserCostConfig {
        &self.config
    }

    /// The flow pattern of the most recent evaluation.
    #[inline]
    pub fn last_flows(&self) -> &FlowPattern {
        &self.last
    }

    /// Evaluates the constraint for a solution.
    ///
    /// A negative percent-increase tolerance disables the whole
    /// assignment run and reports `Unknown`.
    pub fn evaluate(&mut self, solution: &Solution) -> (Feasibility, UserCostComponents) {
        if self.config.percent_increase < 0.0 {
            return (Feasibility::Unknown, UserCostComponents::ZERO);
        }

        let outcome = self.assignment.solve(solution, &self.last);
        self.last = outcome.pattern;

        let components = self.components();
        let total = components.total(&self.config);
        let bound = (1.0 + self.config.percent_increase) * self.config.initial_user_cost;
        let feasibility = if total <= bound {
            Feasibility::Feasible
        } else {
            Feasibility::Infeasible
        };
        (feasibility, components)
    }

    /// Prices the current flow pattern into its cost components.
    fn components(&self) -> UserCostComponents {
        let riding = self
            .net
            .line_arcs()
            .iter()
            .map(|&a| self.last.flows[a.value()] * self.net.arc(a).cost().value())
            .sum();
        let walking = self
            .net
            .walking_arcs()
            .iter()
            .map(|&a| self.last.flows[a.value()] * self.net.arc(a).cost().value())
            .sum();
        UserCostComponents {
            riding,
            walking,
            waiting: self.last.waiting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headway_core::Minutes;
    use headway_model::{ArcKind, NetworkBuilder, NodeKind};

    fn line_network(demand: f64) -> Network {
        let mut b = NetworkBuilder::new(Minutes::new(1440.0));
        let vt = b.add_vehicle_type(10, 40.0);
        let line = b.add_line(vt, 0, 5, Minutes::new(60.0), 1.0);
        let a = b.add_node(NodeKind::Stop, 0.0);
        let t = b.add_node(NodeKind::Stop, 0.0);
        let p = b.add_node(NodeKind::Boarding, 0.0);
        let q = b.add_node(NodeKind::Boarding, 0.0);
        b.add_arc(ArcKind::Boarding, Some(line), a, p, Minutes::ZERO);
        b.add_arc(ArcKind::Line, Some(line), p, q, Minutes::new(10.0));
        b.add_arc(ArcKind::Alighting, Some(line), q, t, Minutes::ZERO);
        b.set_demand(a, t, demand);
        b.build().unwrap()
    }

    fn assignment_config() -> AssignmentConfig {
        AssignmentConfig {
            error_tolerance: 1e-6,
            flow_tolerance: 1e-9,
            waiting_tolerance: 1e-9,
            max_iterations: 50,
            conical_alpha: 4.0,
            conical_beta: 1.375,
        }
    }

    #[test]
    fn components_price_riding_and_waiting() {
        let net = line_network(100.0);
        let config = UserCostConfig {
            initial_user_cost: 1e9,
            percent_increase: 0.1,
            riding_weight: 1.0,
            walking_weight: 1.0,
            waiting_weight: 1.0,
        };
        let mut constraint = UserCostConstraint::new(&net, config, assignment_config(), None);

        let (feasibility, components) = constraint.evaluate(&Solution::new(vec![1]));
        assert_eq!(feasibility, Feasibility::Feasible);
        // 100 riders on a 10-minute line arc.
        assert!((components.riding - 1000.0).abs() < 1e-3);
        assert!((components.waiting - 6000.0).abs() < 1e-3);
        assert_eq!(components.walking, 0.0);
    }

    #[test]
    fn tight_budget_is_infeasible() {
        let net = line_network(100.0);
        let config = UserCostConfig {
            initial_user_cost: 100.0,
            percent_increase: 0.0,
            riding_weight: 1.0,
            walking_weight: 1.0,
            waiting_weight: 1.0,
        };
        let mut constraint = UserCostConstraint::new(&net, config, assignment_config(), None);
        let (feasibility, _) = constraint.evaluate(&Solution::new(vec![1]));
        assert_eq!(feasibility, Feasibility::Infeasible);
    }

    #[test]
    fn negative_tolerance_disables_the_check() {
        let net = line_network(100.0);
        let config = UserCostConfig {
            initial_user_cost: 0.0,
            percent_increase: -1.0,
            riding_weight: 1.0,
            walking_weight: 1.0,
            waiting_weight: 1.0,
        };
        let mut constraint = UserCostConstraint::new(&net, config, assignment_config(), None);
        let (feasibility, components) = constraint.evaluate(&Solution::new(vec![1]));
        assert_eq!(feasibility, Feasibility::Unknown);
        assert_eq!(components, UserCostComponents::ZERO);
        // The assignment never ran.
        assert!(constraint.last_flows().flows.iter().all(|&f| f == 0.0));
    }

    #[test]
    fn successive_evaluations_warm_start() {
        let net = line_network(100.0);
        let config = UserCostConfig {
            initial_user_cost: 1e9,
            percent_increase: 0.1,
            riding_weight: 1.0,
            walking_weight: 0.0,
            waiting_weight: 0.0,
        };
        let mut constraint = UserCostConstraint::new(&net, config, assignment_config(), None);
        constraint.evaluate(&Solution::new(vec![1]));
        let first = constraint.last_flows().clone();
        let (feasibility, _) = constraint.evaluate(&Solution::new(vec![2]));
        assert_eq!(feasibility, Feasibility::Feasible);
        // The warm start was consumed and replaced.
        assert_ne!(constraint.last_flows().waiting, 0.0);
        assert!(first.waiting >= constraint.last_flows().waiting);
    }
}
