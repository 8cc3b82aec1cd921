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

use super::FlowPattern;
use crate::key::CostKey;
use headway_model::{Network, Solution};
use headway_core::{ArcId, LineId};
use rayon::prelude::*;
use std::{cmp::Reverse, collections::BinaryHeap, collections::HashSet};

/// The constant-cost common-lines assignment model.
///
/// The problem decomposes by destination: for each stop we solve a
/// single-destination linear program with a Dijkstra-like label-setting
/// pass followed by a reverse loading pass. The per-destination runs
/// read only the immutable network and their own locals, so they fan
/// out in parallel; each returns its nonzero flow increments and its
/// waiting time, which are merged serially per rayon task.
pub struct ConstantAssignment<'a> {
    net: &'a Network,
}

/// Output of one single-destination run.
struct DestinationFlows {
    increments: Vec<(ArcId, f64)>,
    waiting: f64,
}

impl<'a> ConstantAssignment<'a> {
    pub fn new(net: &'a Network) -> Self {
        ConstantAssignment { net }
    }

    /// Evaluates the model for a fleet vector and an arc cost vector.
    ///
    /// Boarding arcs carry their line's frequency; every other core arc
    /// is deterministic (infinite frequency). Lines with no vehicles
    /// produce zero-frequency boarding arcs which are simply skipped,
    /// so an unreachable destination yields a partial assignment rather
    /// than an error.
    pub fn solve(&self, solution: &Solution, arc_costs: &[f64]) -> FlowPattern {
        let arc_count = self.net.arcs().len();

        let mut freq = vec![f64::INFINITY; arc_count];
        for (i, line) in self.net.lines().iter().enumerate() {
            let line_freq = line.frequency(solution.fleet(LineId::new(i))).value();
            for &arc in line.boarding() {
                freq[arc.value()] = line_freq;
            }
        }

        let stop_count = self.net.stop_nodes().len();
        (0..stop_count)
            .into_par_iter()
            .map(|dest| self.flows_to_destination(dest, &freq, arc_costs))
            .fold(
                || FlowPattern::zeros(arc_count),
                |mut acc, dest| {
                    for (arc, flow) in dest.increments {
                        acc.flows[arc.value()] += flow;
                    }
                    acc.waiting += dest.waiting;
                    acc
                },
            )
            .reduce(
                || FlowPattern::zeros(arc_count),
                |mut left, right| {
                    for (a, b) in left.flows.iter_mut().zip(&right.flows) {
                        *a += b;
                    }
                    left.waiting += right.waiting;
                    left
                },
            )
    }

    /// Solves the single-destination problem for the stop at position
    /// `dest` in the stop list.
    fn flows_to_destination(
        &self,
        dest: usize,
        freq: &[f64],
        arc_costs: &[f64],
    ) -> DestinationFlows {
        let net = self.net;
        let dest_node = net.stop_nodes()[dest];
        let node_count = net.nodes().len();

        // Tentative expected travel time from each node to the
        // destination, and the cumulative frequency of the attractive
        // arcs leaving each node.
        let mut label = vec![f64::INFINITY; node_count];
        label[dest_node.value()] = 0.0;
        let mut node_freq = vec![0.0; node_count];

        let mut volume = vec![0.0; node_count];
        for (pos, &stop) in net.stop_nodes().iter().enumerate() {
            volume[stop.value()] = net.node(dest_node).incoming_demand()[pos];
        }
        let mut node_wait: Vec<f64> = vec![0.0; node_count];

        let mut unprocessed = vec![false; net.arcs().len()];
        for &arc in net.core_arcs() {
            unprocessed[arc.value()] = true;
        }

        // Min-queue of cost-plus-head-label values. Stale entries are
        // tolerated: every pop is checked against the unprocessed set.
        let mut queue: BinaryHeap<Reverse<(CostKey, usize)>> = BinaryHeap::new();
        for &arc in net.node(dest_node).core_in() {
            queue.push(Reverse((CostKey(arc_costs[arc.value()]), arc.value())));
        }
        let mut attractive: HashSet<usize> = HashSet::new();

        while let Some(Reverse((CostKey(chosen_label), arc_idx))) = queue.pop() {
            if !unprocessed[arc_idx] {
                continue;
            }
            unprocessed[arc_idx] = false;

            // Boarding arcs on lines with no vehicles never run.
            if freq[arc_idx] == 0.0 {
                continue;
            }

            let tail = self.net.arcs()[arc_idx].tail().value();
            if label[tail] < chosen_label {
                continue;
            }

            if freq[arc_idx].is_finite() {
                // Finite-frequency (boarding) arc: merge into the
                // frequency-weighted label of the tail.
                if label[tail].is_finite() {
                    label[tail] = (node_freq[tail] * label[tail]
                        + freq[arc_idx] * chosen_label)
                        / (node_freq[tail] + freq[arc_idx]);
                } else {
                    label[tail] = 1.0 / freq[arc_idx] + chosen_label;
                }
                node_freq[tail] += freq[arc_idx];
            } else {
                // Deterministic arc dominates: it displaces every other
                // attractive arc leaving the tail.
                label[tail] = chosen_label;
                node_freq[tail] = f64::INFINITY;
                for &out in net.nodes()[tail].core_out() {
                    attractive.remove(&out.value());
                }
            }
            attractive.insert(arc_idx);

            // The tail label changed: requeue its incoming arcs.
            for &inc in net.nodes()[tail].core_in() {
                let updated = arc_costs[inc.value()] + label[tail];
                queue.push(Reverse((CostKey(updated), inc.value())));
            }
        }

        // Loading pass: process attractive arcs in descending order of
        // cost-plus-head-label.
        let mut load_queue: BinaryHeap<(CostKey, usize)> = attractive
            .iter()
            .map(|&a| {
                let arc = &net.arcs()[a];
                (CostKey(label[arc.head().value()] + arc_costs[a]), a)
            })
            .collect();

        let mut increments = Vec::new();
        while let Some((_, arc_idx)) = load_queue.pop() {
            let arc = &net.arcs()[arc_idx];
            let tail = arc.tail().value();
            let head = arc.head().value();

            let added = if freq[arc_idx].is_finite() {
                let share = (freq[arc_idx] / node_freq[tail]) * volume[tail];
                node_wait[tail] = node_wait[tail].max(share / freq[arc_idx]);
                share
            } else {
                volume[tail]
            };

            if added > 0.0 {
                volume[head] += added;
                increments.push((ArcId::new(arc_idx), added));
            }
        }

        DestinationFlows {
            increments,
            waiting: node_wait.iter().sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headway_core::Minutes;
    use headway_model::{ArcKind, NetworkBuilder, NodeKind};

    /// One line between two stops in both directions, demand A -> B.
    fn single_line_network() -> (Network, ArcId) {
        let mut b = NetworkBuilder::new(Minutes::new(1440.0));
        let vt = b.add_vehicle_type(10, 40.0);
        let line = b.add_line(vt, 0, 5, Minutes::new(60.0), 1.0);
        let a = b.add_node(NodeKind::Stop, 0.0);
        let s_b = b.add_node(NodeKind::Stop, 0.0);
        let p_a = b.add_node(NodeKind::Boarding, 0.0);
        let p_b = b.add_node(NodeKind::Boarding, 0.0);

        b.add_arc(ArcKind::Boarding, Some(line), a, p_a, Minutes::ZERO);
        let ride = b.add_arc(ArcKind::Line, Some(line), p_a, p_b, Minutes::new(10.0));
        b.add_arc(ArcKind::Alighting, Some(line), p_b, s_b, Minutes::ZERO);
        b.add_arc(ArcKind::Boarding, Some(line), s_b, p_b, Minutes::ZERO);
        b.add_arc(ArcKind::Line, Some(line), p_b, p_a, Minutes::new(10.0));
        b.add_arc(ArcKind::Alighting, Some(line), p_a, a, Minutes::ZERO);
        b.set_demand(a, s_b, 100.0);
        (b.build().unwrap(), ride)
    }

    fn base_costs(net: &Network) -> Vec<f64> {
        net.arcs().iter().map(|a| a.cost().value()).collect()
    }

    #[test]
    fn single_line_carries_all_demand() {
        let (net, ride) = single_line_network();
        let assignment = ConstantAssignment::new(&net);
        let pattern = assignment.solve(&Solution::new(vec![1]), &base_costs(&net));

        // All 100 riders board the single line; expected waiting is
        // volume over frequency: 100 / (1/60) = 6000.
        assert!((pattern.flows[ride.value()] - 100.0).abs() < 1e-9);
        assert!((pattern.waiting - 6000.0).abs() < 1e-6);
    }

    #[test]
    fn no_vehicles_means_no_flow() {
        let (net, _) = single_line_network();
        let assignment = ConstantAssignment::new(&net);
        let pattern = assignment.solve(&Solution::new(vec![0]), &base_costs(&net));

        assert!(pattern.flows.iter().all(|&f| f == 0.0));
        assert_eq!(pattern.waiting, 0.0);
    }

    #[test]
    fn flows_are_nonnegative_and_cover_demand() {
        let (net, _) = single_line_network();
        let assignment = ConstantAssignment::new(&net);
        let pattern = assignment.solve(&Solution::new(vec![2]), &base_costs(&net));

        assert!(pattern.flows.iter().all(|&f| f >= 0.0));
        let core_total: f64 = net
            .core_arcs()
            .iter()
            .map(|&a| pattern.flows[a.value()])
            .sum();
        // Demand of 100 traverses boarding, line, and alighting arcs.
        assert!(core_total >= 100.0);
    }

    /// Two parallel lines with circuits 30 and 60 share a boarding stop;
    /// with one vehicle each the combined frequency is 1/20 and volume
    /// splits 2:1 between them.
    #[test]
    fn common_lines_split_follows_frequency() {
        let mut b = NetworkBuilder::new(Minutes::new(1440.0));
        let vt = b.add_vehicle_type(10, 40.0);
        let fast = b.add_line(vt, 0, 5, Minutes::new(30.0), 1.0);
        let slow = b.add_line(vt, 0, 5, Minutes::new(60.0), 1.0);
        let a = b.add_node(NodeKind::Stop, 0.0);
        let t = b.add_node(NodeKind::Stop, 0.0);
        let p1 = b.add_node(NodeKind::Boarding, 0.0);
        let p2 = b.add_node(NodeKind::Boarding, 0.0);
        let q1 = b.add_node(NodeKind::Boarding, 0.0);
        let q2 = b.add_node(NodeKind::Boarding, 0.0);

        let board_fast = b.add_arc(ArcKind::Boarding, Some(fast), a, p1, Minutes::ZERO);
        let ride_fast = b.add_arc(ArcKind::Line, Some(fast), p1, q1, Minutes::new(10.0));
        b.add_arc(ArcKind::Alighting, Some(fast), q1, t, Minutes::ZERO);
        let board_slow = b.add_arc(ArcKind::Boarding, Some(slow), a, p2, Minutes::ZERO);
        let ride_slow = b.add_arc(ArcKind::Line, Some(slow), p2, q2, Minutes::new(10.0));
        b.add_arc(ArcKind::Alighting, Some(slow), q2, t, Minutes::ZERO);
        b.set_demand(a, t, 60.0);
        let net = b.build().unwrap();

        let assignment = ConstantAssignment::new(&net);
        let pattern = assignment.solve(&Solution::new(vec![1, 1]), &base_costs(&net));

        assert!((pattern.flows[ride_fast.value()] - 40.0).abs() < 1e-6);
        assert!((pattern.flows[ride_slow.value()] - 20.0).abs() < 1e-6);
        assert!((pattern.flows[board_fast.value()] - 40.0).abs() < 1e-6);
        assert!((pattern.flows[board_slow.value()] - 20.0).abs() < 1e-6);
        // Expected waiting per rider at the shared stop is 20 minutes:
        // max over lines of share / frequency = 40 / (1/30) = 1200.
        assert!((pattern.waiting - 1200.0).abs() < 1e-6);
    }

    #[test]
    fn labels_respect_attractive_arc_optimality() {
        // With one vehicle the expected time from the origin is the
        // waiting 1/phi = 60 plus riding 10 (plus the tie-break nudges).
        let (net, _) = single_line_network();
        let costs = base_costs(&net);
        let assignment = ConstantAssignment::new(&net);
        let dest = net.stop_position(net.stop_nodes()[1]).unwrap();

        let flows = assignment.flows_to_destination(dest, &full_freq(&net, 1), &costs);
        // The run produced flow on exactly the three forward arcs.
        assert_eq!(flows.increments.len(), 3);
    }

    fn full_freq(net: &Network, fleet: u32) -> Vec<f64> {
        let mut freq = vec![f64::INFINITY; net.arcs().len()];
        for line in net.lines() {
            for &arc in line.boarding() {
                freq[arc.value()] = line.frequency(fleet).value();
            }
        }
        freq
    }
}
