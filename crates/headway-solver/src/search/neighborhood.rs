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

//! The two-pass neighborhood search.
//!
//! Pass one samples lines in random order and filters ADD and DROP
//! moves cheaply: bounds, memo lookups, objective-only evaluations, and
//! the tabu test with its aspiration override. Pass two drains the
//! bounded candidate heaps in ascending objective and keeps only moves
//! the constraint evaluator accepts. Surviving ADDs and DROPs are then
//! combined into same-vehicle-type SWAPs, and the best two of the whole
//! pool become the iteration's neighbors.

use super::SearchDriver;
use crate::log::Feasibility;
use headway_core::LineId;
use headway_model::Solution;
use rand::seq::SliceRandom;
use std::{cmp::Ordering, cmp::Reverse, collections::BinaryHeap};

/// A neighborhood move: raise one line's fleet by the step, lower
/// another's, or both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move {
    pub add: Option<LineId>,
    pub drop: Option<LineId>,
}

impl Move {
    /// A pure fleet increase on one line.
    pub fn add(line: LineId) -> Self {
        Move {
            add: Some(line),
            drop: None,
        }
    }

    /// A pure fleet decrease on one line.
    pub fn drop(line: LineId) -> Self {
        Move {
            add: None,
            drop: Some(line),
        }
    }

    /// A simultaneous increase and decrease on two lines.
    pub fn swap(add: LineId, drop: LineId) -> Self {
        Move {
            add: Some(add),
            drop: Some(drop),
        }
    }
}

/// One scored neighborhood candidate.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub objective: f64,
    pub mv: Move,
    pub solution: Solution,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.objective.to_bits() == other.objective.to_bits() && self.mv == other.mv
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.objective
            .total_cmp(&other.objective)
            .then_with(|| self.mv.cmp(&other.mv))
    }
}

/// Sizes of the intermediate candidate sets, for the event log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NeighborhoodStats {
    pub add_first: usize,
    pub drop_first: usize,
    pub add_second: usize,
    pub drop_second: usize,
    pub swaps: usize,
}

/// The best and second-best neighbors of the current solution.
pub(crate) struct NeighborhoodOutcome {
    pub best: (Move, f64),
    pub second: Option<(Move, f64)>,
    pub stats: NeighborhoodStats,
}

/// Candidates surviving both passes, still split by move kind.
struct SurvivorPass {
    adds: Vec<Candidate>,
    drops: Vec<Candidate>,
    tabu_rejections: bool,
    stats: NeighborhoodStats,
}

impl<'a> SearchDriver<'a> {
    /// Finds the best and second-best neighboring moves, or `None` when
    /// the neighborhood is empty even with the tabu memory cleared.
    pub(crate) fn neighborhood_search(&mut self) -> Option<NeighborhoodOutcome> {
        loop {
            let pass = self.collect_survivors();
            let total = pass.adds.len() + pass.drops.len();

            if total >= 2 {
                return Some(self.swap_and_merge(pass));
            }
            if pass.tabu_rejections {
                // Unexplored candidates are hiding behind tabu moves:
                // clear the tenures and sample again.
                self.memory.add_tenure.fill(0.0);
                self.memory.drop_tenure.fill(0.0);
                continue;
            }
            if total == 1 {
                // Exactly one way out: take it and never come back.
                self.solutions.ban(&self.memory.current);
                let lone = pass
                    .adds
                    .into_iter()
                    .chain(pass.drops)
                    .next()
                    .expect("one survivor");
                return Some(NeighborhoodOutcome {
                    best: (lone.mv, lone.objective),
                    second: None,
                    stats: pass.stats,
                });
            }
            return None;
        }
    }

    /// Runs both filtering passes once.
    fn collect_survivors(&mut self) -> SurvivorPass {
        let add_limit = self.config.add_first;
        let drop_limit = self.config.drop_first;

        let mut order: Vec<usize> = (0..self.net.lines().len()).collect();
        order.shuffle(&mut self.rng);

        let mut add_heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
        let mut drop_heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
        let mut tabu_rejections = false;

        for &i in &order {
            if add_heap.len() >= add_limit && drop_heap.len() >= drop_limit {
                break;
            }
            let line = LineId::new(i);
            if add_heap.len() < add_limit
                && let Some(candidate) =
                    self.first_pass_candidate(Move::add(line), &mut tabu_rejections)
            {
                add_heap.push(Reverse(candidate));
            }
            if drop_heap.len() < drop_limit
                && let Some(candidate) =
                    self.first_pass_candidate(Move::drop(line), &mut tabu_rejections)
            {
                drop_heap.push(Reverse(candidate));
            }
        }

        let mut stats = NeighborhoodStats {
            add_first: add_heap.len(),
            drop_first: drop_heap.len(),
            ..NeighborhoodStats::default()
        };

        let adds = self.constraint_filter(add_heap, self.config.add_second);
        let drops = self.constraint_filter(drop_heap, self.config.drop_second);
        stats.add_second = adds.len();
        stats.drop_second = drops.len();

        SurvivorPass {
            adds,
            drops,
            tabu_rejections,
            stats,
        }
    }

    /// Cheap first-pass filter for one move: bounds, memo, objective,
    /// and the tabu test with aspiration.
    pub(crate) fn first_pass_candidate(
        &mut self,
        mv: Move,
        tabu_rejections: &mut bool,
    ) -> Option<Candidate> {
        if !self.move_in_bounds(&mv) {
            return None;
        }
        let solution = self.apply_move(&mv);
        let (feasibility, objective) = self.lookup_or_objective(&solution);
        if feasibility == Feasibility::Banned {
            return None;
        }

        let tabu = match mv {
            Move {
                add: Some(line),
                drop: None,
            } => self.memory.add_tenure[line.value()] > 0.0,
            Move {
                add: None,
                drop: Some(line),
            } => self.memory.drop_tenure[line.value()] > 0.0,
            _ => false,
        };
        // Aspiration: a tabu move may pass anyway if it would set a new
        // best.
        if tabu && objective >= self.memory.obj_best {
            *tabu_rejections = true;
            return None;
        }

        Some(Candidate {
            objective,
            mv,
            solution,
        })
    }

    /// Expensive second pass: drain a candidate heap in ascending
    /// objective and keep moves the constraint accepts.
    fn constraint_filter(
        &mut self,
        mut heap: BinaryHeap<Reverse<Candidate>>,
        keep: usize,
    ) -> Vec<Candidate> {
        let mut survivors = Vec::new();
        while survivors.len() < keep {
            let Some(Reverse(candidate)) = heap.pop() else {
                break;
            };
            match self.ensure_feasibility(&candidate.solution) {
                Feasibility::Infeasible | Feasibility::Banned => {}
                _ => survivors.push(candidate),
            }
        }
        survivors
    }

    /// Combines survivors into SWAPs and merges everything into the
    /// final ranking.
    fn swap_and_merge(&mut self, pass: SurvivorPass) -> NeighborhoodOutcome {
        let mut stats = pass.stats;
        let mut swaps: Vec<Candidate> = Vec::new();

        // Triangular sweep: the best ADDs meet the best DROPs first.
        'outer: for (position, add) in pass.adds.iter().enumerate() {
            for drop in pass.drops.iter().take(position + 1) {
                if swaps.len() >= self.config.swap_max {
                    break 'outer;
                }
                let (Some(add_line), Some(drop_line)) = (add.mv.add, drop.mv.drop) else {
                    continue;
                };
                if add_line == drop_line {
                    continue;
                }
                if self.net.line(add_line).vehicle_type()
                    != self.net.line(drop_line).vehicle_type()
                {
                    continue;
                }
                let mv = Move::swap(add_line, drop_line);
                if !self.move_in_bounds(&mv) {
                    continue;
                }
                let solution = self.apply_move(&mv);
                let (feasibility, objective) = self.lookup_or_objective(&solution);
                if feasibility == Feasibility::Banned {
                    continue;
                }
                match self.ensure_feasibility(&solution) {
                    Feasibility::Infeasible | Feasibility::Banned => {}
                    _ => swaps.push(Candidate {
                        objective,
                        mv,
                        solution,
                    }),
                }
            }
        }
        stats.swaps = swaps.len();

        let mut merged: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
        for candidate in pass.adds.into_iter().chain(pass.drops).chain(swaps) {
            merged.push(Reverse(candidate));
        }
        let best = merged.pop().expect("at least two candidates").0;
        let second = merged.pop().map(|Reverse(c)| (c.mv, c.objective));

        NeighborhoodOutcome {
            best: (best.mv, best.objective),
            second,
            stats,
        }
    }
}
