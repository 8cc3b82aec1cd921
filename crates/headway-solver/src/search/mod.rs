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

//! The tabu-search / simulated-annealing driver.
//!
//! The driver is single-threaded and owns all mutable search state;
//! parallelism lives inside the two evaluators it calls. One iteration
//! runs the two-pass neighborhood search, applies the acceptance rule
//! (greedy on improvement, annealing on worsening), updates the tabu
//! and annealing state, persists everything, and polls the halt flag.

mod neighborhood;

pub use neighborhood::Move;

use crate::{
    constraint::UserCostConstraint,
    log::{EventLog, Feasibility, IterationEvent, IterationOutcome, SearchMemory, SolutionLog},
    objective::GravityObjective,
};
use headway_core::LineId;
use headway_model::{DataLayout, Network, SearchConfig, Solution};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};
use tracing::{info, warn};

/// Seed base mixed with the starting iteration so resumed runs draw a
/// fresh stream while staying reproducible.
const RNG_SEED_BASE: u64 = 0x00C0_FFEE_D00D;

/// How a search run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// The iteration budget was spent.
    Finished,
    /// The halt flag was raised and the state persisted.
    Halted,
    /// The neighborhood emptied out with no attractive solution left to
    /// escape to.
    DeadEnd,
}

/// The best solution found and how the run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub best: Solution,
    pub objective: f64,
    pub iterations: u32,
}

/// Per-iteration evaluation tallies for the event log.
#[derive(Debug, Clone, Copy, Default)]
struct EvalTally {
    objective_lookups: u32,
    constraint_lookups: u32,
    objective_evaluations: u32,
    constraint_evaluations: u32,
}

pub struct SearchDriver<'a> {
    net: &'a Network,
    config: SearchConfig,
    objective: GravityObjective<'a>,
    constraint: UserCostConstraint<'a>,
    memory: SearchMemory,
    solutions: SolutionLog,
    events: EventLog,
    layout: DataLayout,
    rng: ChaCha8Rng,
    halt: Arc<AtomicBool>,
    vehicle_totals: Vec<u32>,
    tally: EvalTally,
}

impl<'a> SearchDriver<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        net: &'a Network,
        config: SearchConfig,
        objective: GravityObjective<'a>,
        constraint: UserCostConstraint<'a>,
        memory: SearchMemory,
        solutions: SolutionLog,
        events: EventLog,
        layout: DataLayout,
        halt: Arc<AtomicBool>,
    ) -> Self {
        let vehicle_totals = memory.current.vehicle_totals(net);
        let rng = ChaCha8Rng::seed_from_u64(RNG_SEED_BASE ^ u64::from(memory.iteration));
        SearchDriver {
            net,
            config,
            objective,
            constraint,
            memory,
            solutions,
            events,
            layout,
            rng,
            halt,
            vehicle_totals,
            tally: EvalTally::default(),
        }
    }

    #[inline]
    pub fn memory(&self) -> &SearchMemory {
        &self.memory
    }

    #[inline]
    pub fn solutions(&self) -> &SolutionLog {
        &self.solutions
    }

    /// Runs the search until the budget is spent, the halt flag is
    /// raised, or the neighborhood dead-ends.
    pub fn solve(&mut self) -> SearchOutcome {
        info!(
            iteration = self.memory.iteration,
            budget = self.config.max_iterations,
            objective = self.memory.obj_current,
            "search started"
        );

        while self.memory.iteration < self.config.max_iterations {
            let started = Instant::now();
            self.memory.iteration += 1;
            self.tally = EvalTally::default();

            let Some(nbhd) = self.neighborhood_search() else {
                // Nothing to move to: exclude this solution for good
                // and escape through the pool if it has anything left.
                self.solutions.ban(&self.memory.current);
                if !self.pop_attractive(true) {
                    warn!(
                        iteration = self.memory.iteration,
                        "neighborhood empty and attractive pool exhausted"
                    );
                    self.persist();
                    return self.outcome(SearchStatus::DeadEnd);
                }
                self.decay_and_cool();
                self.persist();
                if self.halt_requested() {
                    return self.outcome(SearchStatus::Halted);
                }
                continue;
            };

            let (best_move, best_objective) = nbhd.best;
            let best_solution = self.apply_move(&best_move);
            let delta = best_objective - self.memory.obj_current;

            let outcome;
            let mut sa_probability = 1.0;
            let mut new_best = false;

            if delta < 0.0 {
                // Improvement: adopt greedily, restart the tabu clock,
                // and forbid the reverse move for the current tenure.
                self.adopt(&best_move, best_solution, best_objective);
                self.memory.tenure = self.config.tenure_initial;
                self.memory.nonimp_inner = 0;
                self.memory.nonimp_outer = 0;
                self.mark_reverse_tabu(&best_move);
                if best_objective < self.memory.obj_best {
                    self.memory.best = self.memory.current.clone();
                    self.memory.obj_best = best_objective;
                    new_best = true;
                }
                outcome = IterationOutcome::Improvement;
            } else {
                self.memory.nonimp_inner += 1;
                self.memory.nonimp_outer += 1;
                sa_probability = (-delta / self.memory.temperature).exp();
                if self.rng.random::<f64>() < sa_probability {
                    // Annealing pass: adopt the worsening move, lengthen
                    // the tabu memory, and keep the runner-up around.
                    self.memory.nonimp_inner = 0;
                    self.memory.tenure *= self.config.tenure_factor;
                    if let Some((second_move, second_objective)) = nbhd.second {
                        let second_solution = self.apply_move(&second_move);
                        self.memory.attractive.push((second_solution, second_objective));
                    }
                    self.adopt(&best_move, best_solution, best_objective);
                    outcome = IterationOutcome::AnnealAccept;
                } else {
                    self.memory.attractive.push((best_solution, best_objective));
                    outcome = IterationOutcome::AnnealReject;
                }
            }

            // Pool and counter upkeep.
            if self.memory.attractive.len() > self.config.attractive_max {
                let idx = self.rng.random_range(0..self.memory.attractive.len());
                self.memory.attractive.swap_remove(idx);
            }
            let mut jumped = false;
            if self.memory.nonimp_inner > self.config.nonimp_inner_max {
                self.memory.nonimp_inner = 0;
                self.memory.nonimp_outer += 1;
                self.memory.tenure *= self.config.tenure_factor;
                jumped = self.pop_attractive(true);
            }
            if self.memory.nonimp_outer > self.config.nonimp_outer_max {
                self.memory.tenure = self.config.tenure_initial;
                self.memory.nonimp_outer = 0;
            }
            self.decay_and_cool();

            let event = IterationEvent {
                iteration: self.memory.iteration,
                outcome,
                add_line: best_move.add,
                drop_line: best_move.drop,
                obj_current: self.memory.obj_current,
                obj_best: self.memory.obj_best,
                new_best,
                sa_probability,
                jumped,
                nonimp_inner: self.memory.nonimp_inner,
                nonimp_outer: self.memory.nonimp_outer,
                tenure: self.memory.tenure,
                temperature: self.memory.temperature,
                objective_lookups: self.tally.objective_lookups,
                constraint_lookups: self.tally.constraint_lookups,
                objective_evaluations: self.tally.objective_evaluations,
                constraint_evaluations: self.tally.constraint_evaluations,
                add_first: nbhd.stats.add_first,
                drop_first: nbhd.stats.drop_first,
                add_second: nbhd.stats.add_second,
                drop_second: nbhd.stats.drop_second,
                swaps: nbhd.stats.swaps,
                elapsed_seconds: started.elapsed().as_secs_f64(),
            };
            if let Err(e) = self.events.log_iteration(&event) {
                warn!(error = %e, "failed to write event log");
            }
            self.persist();

            if self.halt_requested() {
                return self.outcome(SearchStatus::Halted);
            }
        }

        if self.config.exhaustive {
            self.exhaustive_search();
            self.persist();
        }
        self.outcome(SearchStatus::Finished)
    }

    /// Greedy post-pass: from the best known solution, repeatedly take
    /// the strictly best feasible ADD or DROP until none improves.
    fn exhaustive_search(&mut self) {
        info!(objective = self.memory.obj_best, "exhaustive local search started");
        self.memory.current = self.memory.best.clone();
        self.memory.obj_current = self.memory.obj_best;
        self.vehicle_totals = self.memory.current.vehicle_totals(self.net);

        loop {
            if self.halt.load(Ordering::Relaxed) {
                break;
            }
            let mut best: Option<(Move, f64)> = None;
            for i in 0..self.net.lines().len() {
                let line = LineId::new(i);
                for mv in [Move::add(line), Move::drop(line)] {
                    if !self.move_in_bounds(&mv) {
                        continue;
                    }
                    let solution = self.apply_move(&mv);
                    let (known, objective) = self.lookup_or_objective(&solution);
                    if known == Feasibility::Banned {
                        continue;
                    }
                    if matches!(
                        self.ensure_feasibility(&solution),
                        Feasibility::Infeasible | Feasibility::Banned
                    ) {
                        continue;
                    }
                    if best.as_ref().is_none_or(|&(_, o)| objective < o) {
                        best = Some((mv, objective));
                    }
                }
            }
            match best {
                Some((mv, objective)) if objective < self.memory.obj_current => {
                    let solution = self.apply_move(&mv);
                    self.adopt(&mv, solution, objective);
                    if objective < self.memory.obj_best {
                        self.memory.best = self.memory.current.clone();
                        self.memory.obj_best = objective;
                    }
                }
                _ => break,
            }
        }
        info!(objective = self.memory.obj_best, "exhaustive local search finished");
    }

    /// Bounds test for a move against the current solution: line fleet
    /// bounds plus the vehicle-type ceiling. A same-type swap leaves
    /// the type total unchanged.
    fn move_in_bounds(&self, mv: &Move) -> bool {
        let step = self.config.step;
        if let Some(add) = mv.add {
            let line = self.net.line(add);
            if self.memory.current.fleet(add) + step > line.max_fleet() {
                return false;
            }
            let same_type_drop = mv
                .drop
                .is_some_and(|d| self.net.line(d).vehicle_type() == line.vehicle_type());
            if !same_type_drop {
                let t = line.vehicle_type().value();
                if self.vehicle_totals[t] + step > self.net.vehicle_types()[t].max_fleet() {
                    return false;
                }
            }
        }
        if let Some(drop) = mv.drop {
            let line = self.net.line(drop);
            let fleet = self.memory.current.fleet(drop);
            if fleet < step || fleet - step < line.min_fleet() {
                return false;
            }
        }
        true
    }

    /// The solution produced by applying a move to the current one.
    fn apply_move(&self, mv: &Move) -> Solution {
        let step = self.config.step;
        let mut solution = self.memory.current.clone();
        if let Some(add) = mv.add {
            solution.set_fleet(add, solution.fleet(add) + step);
        }
        if let Some(drop) = mv.drop {
            solution.set_fleet(drop, solution.fleet(drop) - step);
        }
        solution
    }

    /// Makes a move the current solution and keeps the type totals in
    /// step with it.
    fn adopt(&mut self, mv: &Move, solution: Solution, objective: f64) {
        let step = self.config.step;
        if let Some(add) = mv.add {
            self.vehicle_totals[self.net.line(add).vehicle_type().value()] += step;
        }
        if let Some(drop) = mv.drop {
            self.vehicle_totals[self.net.line(drop).vehicle_type().value()] -= step;
        }
        self.memory.current = solution;
        self.memory.obj_current = objective;
    }

    /// Forbids undoing a just-taken move for the current tenure.
    fn mark_reverse_tabu(&mut self, mv: &Move) {
        if let Some(add) = mv.add {
            self.memory.drop_tenure[add.value()] = self.memory.tenure;
        }
        if let Some(drop) = mv.drop {
            self.memory.add_tenure[drop.value()] = self.memory.tenure;
        }
    }

    /// Removes a uniformly random attractive solution; with `replace`
    /// the search jumps to it. Returns whether the pool had anything.
    fn pop_attractive(&mut self, replace: bool) -> bool {
        if self.memory.attractive.is_empty() {
            return false;
        }
        let idx = self.rng.random_range(0..self.memory.attractive.len());
        let (solution, objective) = self.memory.attractive.swap_remove(idx);
        if replace {
            self.memory.current = solution;
            self.memory.obj_current = objective;
            self.vehicle_totals = self.memory.current.vehicle_totals(self.net);
        }
        true
    }

    /// Memoized objective: looks the solution up, otherwise evaluates
    /// and stores a partial record.
    fn lookup_or_objective(&mut self, solution: &Solution) -> (Feasibility, f64) {
        if let Some((feasibility, objective)) = self.solutions.get_quick(solution) {
            self.tally.objective_lookups += 1;
            (feasibility, objective)
        } else {
            let started = Instant::now();
            let objective = self.objective.evaluate(solution);
            self.tally.objective_evaluations += 1;
            self.solutions
                .put_partial(solution, objective, started.elapsed().as_secs_f64());
            (Feasibility::Unknown, objective)
        }
    }

    /// Memoized constraint: returns the recorded feasibility, running
    /// the constraint evaluator and patching the memo when it is still
    /// unknown.
    fn ensure_feasibility(&mut self, solution: &Solution) -> Feasibility {
        match self.solutions.get(solution).map(|r| r.feasibility) {
            Some(feasibility)
                if feasibility != Feasibility::Unknown =>
            {
                self.tally.constraint_lookups += 1;
                feasibility
            }
            known => {
                if known.is_none() {
                    // Should have been created by the objective pass;
                    // create the partial row so the patch lands.
                    let _ = self.lookup_or_objective(solution);
                }
                let started = Instant::now();
                let (feasibility, components) = self.constraint.evaluate(solution);
                self.tally.constraint_evaluations += 1;
                self.solutions.patch_feasibility(
                    solution,
                    feasibility,
                    components.as_array(),
                    started.elapsed().as_secs_f64(),
                );
                feasibility
            }
        }
    }

    fn decay_and_cool(&mut self) {
        for tenure in self
            .memory
            .add_tenure
            .iter_mut()
            .chain(self.memory.drop_tenure.iter_mut())
        {
            *tenure = (*tenure - 1.0).max(0.0);
        }
        self.memory.temperature *= self.config.cooling_factor;
    }

    fn persist(&self) {
        if let Err(e) = self.memory.save(&self.layout.memory_log()) {
            warn!(error = %e, "failed to write memory log");
        }
        if let Err(e) = self.memory.write_best(&self.layout.final_solution()) {
            warn!(error = %e, "failed to write final solution");
        }
        if let Err(e) = self.solutions.save(&self.layout.solution_log()) {
            warn!(error = %e, "failed to write solution log");
        }
    }

    fn halt_requested(&self) -> bool {
        if self.halt.load(Ordering::Relaxed) {
            info!(iteration = self.memory.iteration, "halt requested, state persisted");
            let _ = self.events.log_halt(self.memory.iteration);
            return true;
        }
        false
    }

    fn outcome(&self, status: SearchStatus) -> SearchOutcome {
        SearchOutcome {
            status,
            best: self.memory.best.clone(),
            objective: self.memory.obj_best,
            iterations: self.memory.iteration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headway_core::Minutes;
    use headway_model::{
        ArcKind, AssignmentConfig, NetworkBuilder, NodeKind, ObjectiveConfig, UserCostConfig,
    };
    use static_assertions::assert_impl_all;

    assert_impl_all!(Move: Send, Sync, Copy);
    assert_impl_all!(SearchOutcome: Send, Sync);

    /// Two lines from one origin toward a facility; serving either line
    /// improves accessibility, the shorter circuit more so.
    fn accessibility_network() -> Network {
        let mut b = NetworkBuilder::new(Minutes::new(1440.0));
        let vt = b.add_vehicle_type(8, 40.0);
        let fast = b.add_line(vt, 0, 4, Minutes::new(30.0), 1.0);
        let slow = b.add_line(vt, 0, 4, Minutes::new(60.0), 1.0);
        let pop = b.add_node(NodeKind::Population, 100.0);
        let s = b.add_node(NodeKind::Stop, 0.0);
        let t = b.add_node(NodeKind::Stop, 0.0);
        let fac = b.add_node(NodeKind::Facility, 1.0);
        let p1 = b.add_node(NodeKind::Boarding, 0.0);
        let q1 = b.add_node(NodeKind::Boarding, 0.0);
        let p2 = b.add_node(NodeKind::Boarding, 0.0);
        let q2 = b.add_node(NodeKind::Boarding, 0.0);

        b.add_arc(ArcKind::Access, None, pop, s, Minutes::new(3.0));
        b.add_arc(ArcKind::Boarding, Some(fast), s, p1, Minutes::ZERO);
        b.add_arc(ArcKind::Line, Some(fast), p1, q1, Minutes::new(10.0));
        b.add_arc(ArcKind::Alighting, Some(fast), q1, t, Minutes::ZERO);
        b.add_arc(ArcKind::Boarding, Some(slow), s, p2, Minutes::ZERO);
        b.add_arc(ArcKind::Line, Some(slow), p2, q2, Minutes::new(12.0));
        b.add_arc(ArcKind::Alighting, Some(slow), q2, t, Minutes::ZERO);
        b.add_arc(ArcKind::Access, None, t, fac, Minutes::new(2.0));
        b.set_demand(s, t, 50.0);
        b.build().unwrap()
    }

    fn test_layout(name: &str) -> DataLayout {
        let base = std::env::temp_dir().join(format!("headway-search-{}", name));
        let layout = DataLayout::new(&base);
        layout.ensure_log_dir().unwrap();
        layout
    }

    fn driver<'a>(
        net: &'a Network,
        config: SearchConfig,
        layout: DataLayout,
        initial: (Solution, f64),
    ) -> SearchDriver<'a> {
        let objective = GravityObjective::new(
            net,
            ObjectiveConfig {
                lowest_metrics: 1,
                gravity_exponent: 1.0,
                multiplier: 1.0,
            },
        );
        // Constraint disabled: candidates stay admissible as Unknown.
        let constraint = UserCostConstraint::new(
            net,
            UserCostConfig::default(),
            AssignmentConfig::default(),
            None,
        );
        let memory = SearchMemory::fresh(&config, initial.clone());
        let mut solutions = SolutionLog::new();
        solutions.put_partial(&initial.0, initial.1, 0.0);
        let events = EventLog::create(
            layout.event_log(),
            layout.objective_log(),
            false,
            initial.1,
        )
        .unwrap();
        SearchDriver::new(
            net,
            config,
            objective,
            constraint,
            memory,
            solutions,
            events,
            layout,
            Arc::new(AtomicBool::new(false)),
        )
    }

    fn quick_config(iterations: u32) -> SearchConfig {
        SearchConfig {
            max_iterations: iterations,
            attractive_max: 4,
            add_first: 4,
            add_second: 2,
            drop_first: 4,
            drop_second: 2,
            swap_max: 2,
            tenure_initial: 3.0,
            tenure_factor: 1.5,
            nonimp_inner_max: 3,
            nonimp_outer_max: 6,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn first_iteration_improves_from_no_service() {
        let net = accessibility_network();
        let layout = test_layout("improve");
        let initial = Solution::new(vec![0, 0]);
        let mut driver = driver(&net, quick_config(1), layout, (initial, 0.0));

        let outcome = driver.solve();
        // Serving anything beats no service at all.
        assert!(outcome.objective < 0.0);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.status, SearchStatus::Finished);
        // The reverse of the taken ADD is tabu, minus one decay step.
        let tenures = &driver.memory().drop_tenure;
        assert!(tenures.iter().any(|&t| (t - 2.0).abs() < 1e-12));
    }

    #[test]
    fn temperature_strictly_decreases() {
        let net = accessibility_network();
        let layout = test_layout("cooling");
        let mut driver = driver(
            &net,
            quick_config(5),
            layout,
            (Solution::new(vec![0, 0]), 0.0),
        );
        let t0 = driver.memory().temperature;
        driver.solve();
        let expected = t0 * driver.config.cooling_factor.powi(5);
        assert!(driver.memory().temperature < t0);
        assert!((driver.memory().temperature - expected).abs() < 1e-12);
    }

    #[test]
    fn best_never_regresses() {
        let net = accessibility_network();
        let layout = test_layout("monotone");
        let mut driver = driver(
            &net,
            quick_config(8),
            layout,
            (Solution::new(vec![1, 1]), -0.1),
        );
        let outcome = driver.solve();
        assert!(outcome.objective <= -0.1);
        assert!(driver.memory().obj_best <= driver.memory().obj_current);
    }

    #[test]
    fn halt_flag_stops_after_one_iteration() {
        let net = accessibility_network();
        let layout = test_layout("halt");
        let halt = Arc::new(AtomicBool::new(true));
        let objective = GravityObjective::new(
            &net,
            ObjectiveConfig {
                lowest_metrics: 1,
                gravity_exponent: 1.0,
                multiplier: 1.0,
            },
        );
        let constraint = UserCostConstraint::new(
            &net,
            UserCostConfig::default(),
            AssignmentConfig::default(),
            None,
        );
        let config = quick_config(50);
        let initial = (Solution::new(vec![0, 0]), 0.0);
        let memory = SearchMemory::fresh(&config, initial.clone());
        let mut solutions = SolutionLog::new();
        solutions.put_partial(&initial.0, initial.1, 0.0);
        let events =
            EventLog::create(layout.event_log(), layout.objective_log(), false, 0.0).unwrap();
        let mut driver = SearchDriver::new(
            &net,
            config,
            objective,
            constraint,
            memory,
            solutions,
            events,
            layout,
            halt,
        );

        let outcome = driver.solve();
        assert_eq!(outcome.status, SearchStatus::Halted);
        assert_eq!(outcome.iterations, 1);
    }

    #[test]
    fn exhaustive_pass_reaches_a_local_optimum() {
        let net = accessibility_network();
        let layout = test_layout("exhaustive");
        let config = SearchConfig {
            max_iterations: 0,
            exhaustive: true,
            ..quick_config(0)
        };
        let mut driver = driver(&net, config, layout, (Solution::new(vec![0, 0]), 0.0));
        let outcome = driver.solve();

        // The greedy finish walks ADDs until no single move improves.
        assert!(outcome.objective < 0.0);
        let best = &outcome.best;
        let again = driver.objective.evaluate(best);
        assert!((again - outcome.objective).abs() < 1e-9);
    }

    #[test]
    fn banned_solutions_are_never_proposed() {
        let net = accessibility_network();
        let layout = test_layout("banned");
        let mut driver = driver(
            &net,
            quick_config(3),
            layout,
            (Solution::new(vec![0, 0]), 0.0),
        );
        // Ban every single-vehicle neighbor of the start.
        driver.solutions.ban(&Solution::new(vec![1, 0]));
        driver.solutions.ban(&Solution::new(vec![0, 1]));
        driver.solve();
        // Neither banned vector ever became current or best.
        assert_ne!(driver.memory().best, Solution::new(vec![1, 0]));
        assert_ne!(driver.memory().best, Solution::new(vec![0, 1]));
    }

    #[test]
    fn tabu_move_passes_on_aspiration_only() {
        let net = accessibility_network();
        let layout = test_layout("aspiration");
        let mut driver = driver(
            &net,
            quick_config(1),
            layout,
            (Solution::new(vec![0, 0]), 10.0),
        );
        driver.memory.obj_best = 7.0;
        driver.memory.add_tenure[0] = 3.0;

        // A memoized neighbor beating the best passes despite the tabu.
        driver.solutions.put_partial(&Solution::new(vec![1, 0]), 6.0, 0.0);
        let mut rejections = false;
        let candidate =
            driver.first_pass_candidate(Move::add(LineId::new(0)), &mut rejections);
        assert!(candidate.is_some());
        assert_eq!(candidate.unwrap().objective, 6.0);
        assert!(!rejections);

        // The same tabu move without the new best is rejected.
        driver.solutions.put_partial(&Solution::new(vec![1, 0]), 8.0, 0.0);
        let candidate =
            driver.first_pass_candidate(Move::add(LineId::new(0)), &mut rejections);
        assert!(candidate.is_none());
        assert!(rejections);
    }

    #[test]
    fn memo_accumulates_visited_solutions() {
        let net = accessibility_network();
        let layout = test_layout("memo");
        let mut driver = driver(
            &net,
            quick_config(4),
            layout,
            (Solution::new(vec![0, 0]), 0.0),
        );
        driver.solve();
        assert!(driver.solutions().len() > 1);
    }
}
