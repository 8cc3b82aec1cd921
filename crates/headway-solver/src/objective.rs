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

//! The gravity accessibility objective.
//!
//! For each population center we run a single-source Dijkstra over the
//! core-plus-access subgraph (line-bearing arcs priced at base cost
//! plus headway), then combine the distance matrix into the two-step
//! gravity metrics. The search minimizes the negated sum of the lowest
//! few population metrics, which raises the worst-served centers first.

use crate::key::CostKey;
use headway_core::NodeId;
use headway_model::{Network, ObjectiveConfig, Solution};
use rayon::prelude::*;
use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashSet},
    io,
    io::Write as _,
    path::Path,
};

pub struct GravityObjective<'a> {
    net: &'a Network,
    config: ObjectiveConfig,
}

impl<'a> GravityObjective<'a> {
    pub fn new(net: &'a Network, config: ObjectiveConfig) -> Self {
        GravityObjective { net, config }
    }

    #[inline]
    pub fn config(&self) -> &ObjectiveConfig {
        &self.config
    }

    /// The search objective: the negated sum of the lowest population
    /// metrics (the search minimizes, the metric is maximized).
    pub fn evaluate(&self, solution: &Solution) -> f64 {
        let mut metrics = self.all_metrics(solution);
        metrics.sort_by(f64::total_cmp);
        let take = self.config.lowest_metrics.min(metrics.len());
        -metrics[..take].iter().sum::<f64>()
    }

    /// Gravity metrics for every population center, in population-list
    /// order.
    pub fn all_metrics(&self, solution: &Solution) -> Vec<f64> {
        let costs = self.arc_costs(solution);

        // One Dijkstra row per population source, computed in parallel;
        // rows are disjoint so no synchronization is needed.
        let distance: Vec<Vec<f64>> = self
            .net
            .population_nodes()
            .par_iter()
            .map(|&source| self.distances_to_facilities(source, &costs))
            .collect();

        let beta = self.config.gravity_exponent;
        let facility_count = self.net.facility_nodes().len();

        // Facility metrics: how much population each facility serves.
        let facility_metric: Vec<f64> = (0..facility_count)
            .map(|j| {
                self.net
                    .population_nodes()
                    .iter()
                    .enumerate()
                    .map(|(i, &p)| self.net.node(p).value() * distance[i][j].powf(-beta))
                    .sum()
            })
            .collect();

        // Population metrics: facility weight shared by the population
        // competing for it. A facility no population reaches divides
        // zero by zero; the term propagates infinity, which sorts above
        // every finite metric and never enters the lowest-metric sum.
        self.net
            .population_nodes()
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let sum: f64 = self
                    .net
                    .facility_nodes()
                    .iter()
                    .enumerate()
                    .map(|(j, &f)| {
                        if facility_metric[j] > 0.0 {
                            self.net.node(f).value() * distance[i][j].powf(-beta)
                                / facility_metric[j]
                        } else {
                            f64::INFINITY
                        }
                    })
                    .sum();
                self.config.multiplier * sum
            })
            .collect()
    }

    /// Writes the per-population-center metric table for a solution.
    pub fn save_metrics(&self, solution: &Solution, path: &Path) -> io::Result<()> {
        let metrics = self.all_metrics(solution);
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "Population_Center\tGravity_Metric")?;
        for (i, metric) in metrics.iter().enumerate() {
            writeln!(file, "{}\t{:.15}", i + 1, metric)?;
        }
        Ok(())
    }

    /// Arc costs for the accessibility paths: base travel time plus the
    /// line's headway on every core arc tied to a line.
    fn arc_costs(&self, solution: &Solution) -> Vec<f64> {
        let headways: Vec<f64> = self
            .net
            .lines()
            .iter()
            .enumerate()
            .map(|(i, line)| line.headway(solution.fleets()[i]).value())
            .collect();

        let mut costs: Vec<f64> = self.net.arcs().iter().map(|a| a.cost().value()).collect();
        for &arc in self.net.core_arcs() {
            if let Some(line) = self.net.arc(arc).line() {
                costs[arc.value()] += headways[line.value()];
            }
        }
        costs
    }

    /// Single-source Dijkstra over core and access arcs, stopping once
    /// every facility is settled. Unreached facilities stay infinite.
    fn distances_to_facilities(&self, source: NodeId, costs: &[f64]) -> Vec<f64> {
        let net = self.net;
        let mut dist = vec![f64::INFINITY; net.nodes().len()];
        dist[source.value()] = 0.0;

        let mut remaining: HashSet<usize> =
            net.facility_nodes().iter().map(|f| f.value()).collect();

        let mut queue: BinaryHeap<Reverse<(CostKey, usize)>> = BinaryHeap::new();
        queue.push(Reverse((CostKey(0.0), source.value())));

        while !remaining.is_empty() {
            let Some(Reverse((CostKey(d), node))) = queue.pop() else {
                break;
            };
            // Lazy deletion: skip entries superseded by a shorter path.
            if dist[node] < d {
                continue;
            }
            remaining.remove(&node);

            let out = net.nodes()[node]
                .core_out()
                .iter()
                .chain(net.nodes()[node].access_out());
            for &arc in out {
                let head = net.arc(arc).head().value();
                let next = dist[node] + costs[arc.value()];
                if next < dist[head] {
                    dist[head] = next;
                    queue.push(Reverse((CostKey(next), head)));
                }
            }
        }

        net.facility_nodes()
            .iter()
            .map(|f| dist[f.value()])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headway_core::Minutes;
    use headway_model::{ArcKind, NetworkBuilder, NodeKind};

    /// Two population centers and two facilities joined by access arcs
    /// with the distances of the worked gravity example.
    fn gravity_network() -> Network {
        let mut b = NetworkBuilder::new(Minutes::new(1440.0));
        let p0 = b.add_node(NodeKind::Population, 100.0);
        let p1 = b.add_node(NodeKind::Population, 100.0);
        let fa = b.add_node(NodeKind::Facility, 1.0);
        let fb = b.add_node(NodeKind::Facility, 1.0);
        b.add_arc(ArcKind::Access, None, p0, fa, Minutes::new(1.0));
        b.add_arc(ArcKind::Access, None, p0, fb, Minutes::new(2.0));
        b.add_arc(ArcKind::Access, None, p1, fa, Minutes::new(2.0));
        b.add_arc(ArcKind::Access, None, p1, fb, Minutes::new(1.0));
        b.build().unwrap()
    }

    #[test]
    fn gravity_example_with_unit_exponent() {
        let net = gravity_network();
        let objective = GravityObjective::new(
            &net,
            ObjectiveConfig {
                lowest_metrics: 2,
                gravity_exponent: 1.0,
                multiplier: 1.0,
            },
        );
        let solution = Solution::new(vec![]);

        let metrics = objective.all_metrics(&solution);
        // V_A = 100*1 + 100*0.5 = 150 = V_B;
        // A_0 = (1*1)/150 + (1*0.5)/150 = 0.01 = A_1.
        assert!((metrics[0] - 0.01).abs() < 1e-12);
        assert!((metrics[1] - 0.01).abs() < 1e-12);
        assert!((objective.evaluate(&solution) + 0.02).abs() < 1e-12);
    }

    #[test]
    fn multiplier_scales_metrics() {
        let net = gravity_network();
        let objective = GravityObjective::new(
            &net,
            ObjectiveConfig {
                lowest_metrics: 1,
                gravity_exponent: 1.0,
                multiplier: 10.0,
            },
        );
        let metrics = objective.all_metrics(&Solution::new(vec![]));
        assert!((metrics[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn headway_prices_line_arcs_into_distances() {
        // pop -> stop -> (board, ride, alight) -> stop -> facility.
        let mut b = NetworkBuilder::new(Minutes::new(1440.0));
        let vt = b.add_vehicle_type(10, 40.0);
        let line = b.add_line(vt, 0, 5, Minutes::new(60.0), 1.0);
        let pop = b.add_node(NodeKind::Population, 50.0);
        let s = b.add_node(NodeKind::Stop, 0.0);
        let p = b.add_node(NodeKind::Boarding, 0.0);
        let q = b.add_node(NodeKind::Boarding, 0.0);
        let t = b.add_node(NodeKind::Stop, 0.0);
        let fac = b.add_node(NodeKind::Facility, 1.0);
        b.add_arc(ArcKind::Access, None, pop, s, Minutes::new(3.0));
        b.add_arc(ArcKind::Boarding, Some(line), s, p, Minutes::ZERO);
        b.add_arc(ArcKind::Line, Some(line), p, q, Minutes::new(10.0));
        b.add_arc(ArcKind::Alighting, Some(line), q, t, Minutes::ZERO);
        b.add_arc(ArcKind::Access, None, t, fac, Minutes::new(2.0));
        let net = b.build().unwrap();

        let objective = GravityObjective::new(
            &net,
            ObjectiveConfig {
                lowest_metrics: 1,
                gravity_exponent: 1.0,
                multiplier: 1.0,
            },
        );

        // Fleet 1: headway 60 on each of the three line-owned arcs.
        let d1 = objective.distances_to_facilities(pop, &objective.arc_costs(&Solution::new(vec![1])));
        // 3 + (0+60) + (10+60) + (0+60) + 2, up to the epsilon nudges.
        assert!((d1[0] - 195.0).abs() < 1e-6);

        // No fleet: the line is unreachable, so is the facility.
        let d0 = objective.distances_to_facilities(pop, &objective.arc_costs(&Solution::new(vec![0])));
        assert!(d0[0].is_infinite());

        // An unreached facility propagates an infinite metric: an
        // admissible but useless candidate value.
        let metrics = objective.all_metrics(&Solution::new(vec![0]));
        assert!(metrics[0].is_infinite());
        assert!(metrics[0] > 0.0);
    }

    #[test]
    fn distances_satisfy_the_triangle_inequality() {
        let net = gravity_network();
        let objective = GravityObjective::new(&net, ObjectiveConfig::default());
        let costs = objective.arc_costs(&Solution::new(vec![]));
        let d = objective.distances_to_facilities(net.population_nodes()[0], &costs);
        // Direct distances are already shortest paths here.
        assert!((d[0] - 1.0).abs() < 1e-12);
        assert!((d[1] - 2.0).abs() < 1e-12);
    }
}
