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

use super::{ConstantAssignment, FlowPattern};
use headway_model::{AssignmentConfig, Network, Solution};
use tracing::debug;

/// Result of a Frank-Wolfe run: the averaged flow pattern plus the
/// statistics the caller may want to inspect.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    pub pattern: FlowPattern,
    pub iterations: u32,
    pub error_bound: f64,
}

/// The nonlinear-cost assignment model.
///
/// Solves a user equilibrium with a conical congestion penalty by
/// successive linearization: each Frank-Wolfe iteration prices the arcs
/// at the current flow, solves the constant-cost model against those
/// prices, and averages the result in with weight 1/k.
pub struct NonlinearAssignment<'a> {
    net: &'a Network,
    config: AssignmentConfig,
    submodel: ConstantAssignment<'a>,
}

impl<'a> NonlinearAssignment<'a> {
    pub fn new(net: &'a Network, config: AssignmentConfig) -> Self {
        NonlinearAssignment {
            net,
            config,
            submodel: ConstantAssignment::new(net),
        }
    }

    #[inline]
    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    /// Evaluates the model for a fleet vector, warm-started from a
    /// previous flow pattern.
    pub fn solve(&self, solution: &Solution, warm_start: &FlowPattern) -> AssignmentOutcome {
        let arc_count = self.net.arcs().len();

        // Only line arcs are capacitated; capacity follows the fleet.
        let mut capacities = vec![f64::INFINITY; arc_count];
        for &arc in self.net.line_arcs() {
            let line = self
                .net
                .arc(arc)
                .line()
                .expect("line arc carries a line");
            capacities[arc.value()] = self.net.line(line).capacity(solution.fleet(line));
        }

        let mut arc_costs = vec![0.0; arc_count];
        self.update_costs(&mut arc_costs, &warm_start.flows, &capacities);
        let mut current = self.submodel.solve(solution, &arc_costs);

        let mut iteration = 0u32;
        let mut error = f64::INFINITY;
        let mut flow_change = f64::INFINITY;
        let mut wait_change = f64::INFINITY;

        while iteration < self.config.max_iterations
            && error > self.config.error_tolerance
            && (flow_change > self.config.flow_tolerance
                || wait_change > self.config.waiting_tolerance)
        {
            iteration += 1;

            self.update_costs(&mut arc_costs, &current.flows, &capacities);
            let next = self.submodel.solve(solution, &arc_costs);

            error = self.error_bound(&capacities, &current, &next);

            let lambda = 1.0 - 1.0 / f64::from(iteration);
            (flow_change, wait_change) = average_update(lambda, &mut current, &next);

            debug!(iteration, error, flow_change, wait_change, "frank-wolfe step");
        }

        AssignmentOutcome {
            pattern: current,
            iterations: iteration,
            error_bound: error,
        }
    }

    /// Conical congestion cost of one arc at the given flow.
    fn arc_cost(&self, arc: usize, flow: f64, capacity: f64) -> f64 {
        if capacity == 0.0 {
            return f64::INFINITY;
        }
        let base = self.net.arcs()[arc].cost().value();
        if capacity.is_infinite() || flow == 0.0 {
            return base;
        }
        let alpha = self.config.conical_alpha;
        let beta = self.config.conical_beta;
        let ratio = 1.0 - flow / capacity;
        base * (2.0 + ((alpha * ratio).powi(2) + beta.powi(2)).sqrt() - alpha * ratio - beta)
    }

    fn update_costs(&self, arc_costs: &mut [f64], flows: &[f64], capacities: &[f64]) {
        for &arc in self.net.core_arcs() {
            let i = arc.value();
            arc_costs[i] = self.arc_cost(i, flows[i], capacities[i]);
        }
    }

    /// Linearized-objective error bound between consecutive solutions.
    fn error_bound(&self, capacities: &[f64], current: &FlowPattern, next: &FlowPattern) -> f64 {
        let mut total = current.waiting - next.waiting;
        for &arc in self.net.core_arcs() {
            let i = arc.value();
            total +=
                self.arc_cost(i, current.flows[i], capacities[i]) * (current.flows[i] - next.flows[i]);
        }
        total.abs()
    }
}

/// Convex-combination update of `current` toward `next`; returns the
/// maximum elementwise flow change and the waiting time change.
fn average_update(lambda: f64, current: &mut FlowPattern, next: &FlowPattern) -> (f64, f64) {
    let updated_wait = lambda * current.waiting + (1.0 - lambda) * next.waiting;
    let wait_change = (current.waiting - updated_wait).abs();
    current.waiting = updated_wait;

    let mut flow_change = 0.0f64;
    for (flow, &target) in current.flows.iter_mut().zip(&next.flows) {
        let updated = lambda * *flow + (1.0 - lambda) * target;
        flow_change = flow_change.max((*flow - updated).abs());
        *flow = updated;
    }
    (flow_change, wait_change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use headway_core::Minutes;
    use headway_model::{ArcKind, NetworkBuilder, NodeKind};

    /// Two parallel congestible lines between the same stops.
    fn parallel_lines_network(demand: f64) -> Network {
        let mut b = NetworkBuilder::new(Minutes::new(1.0));
        let vt = b.add_vehicle_type(10, 30.0);
        let l1 = b.add_line(vt, 0, 5, Minutes::new(30.0), 1.0);
        let l2 = b.add_line(vt, 0, 5, Minutes::new(60.0), 1.0);
        let a = b.add_node(NodeKind::Stop, 0.0);
        let t = b.add_node(NodeKind::Stop, 0.0);
        let p1 = b.add_node(NodeKind::Boarding, 0.0);
        let p2 = b.add_node(NodeKind::Boarding, 0.0);
        let q1 = b.add_node(NodeKind::Boarding, 0.0);
        let q2 = b.add_node(NodeKind::Boarding, 0.0);
        b.add_arc(ArcKind::Boarding, Some(l1), a, p1, Minutes::ZERO);
        b.add_arc(ArcKind::Line, Some(l1), p1, q1, Minutes::new(10.0));
        b.add_arc(ArcKind::Alighting, Some(l1), q1, t, Minutes::ZERO);
        b.add_arc(ArcKind::Boarding, Some(l2), a, p2, Minutes::ZERO);
        b.add_arc(ArcKind::Line, Some(l2), p2, q2, Minutes::new(12.0));
        b.add_arc(ArcKind::Alighting, Some(l2), q2, t, Minutes::ZERO);
        b.set_demand(a, t, demand);
        b.build().unwrap()
    }

    fn config() -> AssignmentConfig {
        AssignmentConfig {
            error_tolerance: 1e-4,
            flow_tolerance: 1e-6,
            waiting_tolerance: 1e-6,
            max_iterations: 100,
            conical_alpha: 0.15,
            conical_beta: 4.0,
        }
    }

    #[test]
    fn uncongested_instance_converges_immediately() {
        let net = parallel_lines_network(1.0);
        let model = NonlinearAssignment::new(&net, config());
        let outcome = model.solve(
            &Solution::new(vec![1, 1]),
            &FlowPattern::zeros(net.arcs().len()),
        );

        // Demand far below capacity: the linearization is exact after
        // the seed solve, so the bound collapses on the first pass.
        assert!(outcome.error_bound <= 1e-4);
        assert!(outcome.iterations <= 100);
    }

    #[test]
    fn error_bound_shrinks_from_zero_start() {
        let net = parallel_lines_network(50.0);
        let model = NonlinearAssignment::new(&net, config());
        let outcome = model.solve(
            &Solution::new(vec![2, 1]),
            &FlowPattern::zeros(net.arcs().len()),
        );

        assert!(outcome.iterations <= 100);
        assert!(outcome.error_bound.is_finite());
        // Flows stay nonnegative through the averaging updates.
        assert!(outcome.pattern.flows.iter().all(|&f| f >= 0.0));
    }

    #[test]
    fn zero_capacity_prices_to_infinity() {
        let net = parallel_lines_network(1.0);
        let model = NonlinearAssignment::new(&net, config());
        assert!(model.arc_cost(1, 1.0, 0.0).is_infinite());
    }

    #[test]
    fn congestion_raises_cost_above_base() {
        let net = parallel_lines_network(1.0);
        let model = NonlinearAssignment::new(&net, config());
        // Arc 1 is the first line arc with base cost 10.
        let free = model.arc_cost(1, 0.0, 100.0);
        let congested = model.arc_cost(1, 100.0, 100.0);
        assert_eq!(free, 10.0);
        assert!(congested > free);
    }

    #[test]
    fn averaging_reports_elementwise_change() {
        let mut current = FlowPattern {
            flows: vec![0.0, 4.0],
            waiting: 10.0,
        };
        let next = FlowPattern {
            flows: vec![2.0, 4.0],
            waiting: 6.0,
        };
        let (flow_change, wait_change) = average_update(0.5, &mut current, &next);
        assert!((flow_change - 1.0).abs() < 1e-12);
        assert!((wait_change - 2.0).abs() < 1e-12);
        assert_eq!(current.flows, vec![1.0, 4.0]);
        assert_eq!(current.waiting, 8.0);
    }
}
