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

//! Command-line driver: loads a problem instance, runs the TS/SA
//! search until the budget is spent or the user interrupts it, and
//! maps failures to the documented exit codes.

use headway_model::{DataLayout, InputError, input};
use headway_solver::{
    EventLog, GravityObjective, SearchDriver, SearchMemory, SearchOutcome, SearchStatus,
    SolutionLog, UserCostConstraint,
};
use serde::Serialize;
use std::{
    env, process,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const EXIT_HALTED: i32 = 1;
const EXIT_MISSING_INPUT: i32 = 2;
const EXIT_MALFORMED_INPUT: i32 = 3;

#[derive(Debug, Clone, Serialize)]
struct RunReport {
    instance: String,
    resumed: bool,
    status: String,
    iterations: u32,
    initial_objective: f64,
    best_objective: f64,
    best_solution: Vec<u32>,
    memoized_solutions: usize,
    elapsed_ms: u128,
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn main() {
    enable_tracing();

    let base = env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let layout = DataLayout::new(&base);

    match run(&layout) {
        Ok(outcome) => {
            info!(
                objective = outcome.objective,
                solution = %outcome.best,
                iterations = outcome.iterations,
                "search done"
            );
            if outcome.status == SearchStatus::Halted {
                process::exit(EXIT_HALTED);
            }
        }
        Err(err) => {
            error!(error = %err, "startup failed");
            let code = match err {
                InputError::Missing { .. } => EXIT_MISSING_INPUT,
                InputError::Malformed { .. } => EXIT_MALFORMED_INPUT,
            };
            process::exit(code);
        }
    }
}

fn run(layout: &DataLayout) -> Result<SearchOutcome, InputError> {
    layout
        .ensure_log_dir()
        .map_err(|e| InputError::missing(layout.base().join("log"), e))?;

    let net = input::load_network(layout)?;
    let objective_config = input::load_objective_config(layout)?;
    let user_cost_config = input::load_user_cost_config(layout)?;
    let assignment_config = input::load_assignment_config(layout)?;
    let search_config = input::load_search_config(layout)?;
    let initial_flows = input::load_initial_flows(layout, net.arcs().len())?;

    // A resumed run picks its state back up from the logs it wrote; a
    // fresh run seeds everything from the initial solution log.
    let (solutions, memory) = if search_config.resume {
        info!("continuing search from saved logs");
        (
            SolutionLog::load(&layout.solution_log())?,
            SearchMemory::load(&layout.memory_log(), net.lines().len())?,
        )
    } else {
        info!("starting new search");
        let initial = input::load_initial_solution(&layout.initial_solution_log())?;
        if initial.0.len() != net.lines().len() {
            return Err(InputError::malformed(
                layout.initial_solution_log(),
                0,
                format!(
                    "initial solution has {} entries for {} lines",
                    initial.0.len(),
                    net.lines().len()
                ),
            ));
        }
        (
            SolutionLog::load(&layout.initial_solution_log())?,
            SearchMemory::fresh(&search_config, initial),
        )
    };
    let initial_objective = memory.obj_current;

    let events = EventLog::create(
        layout.event_log(),
        layout.objective_log(),
        search_config.resume,
        initial_objective,
    )
    .map_err(|e| InputError::missing(layout.event_log(), e))?;

    let halt = Arc::new(AtomicBool::new(false));
    {
        let halt = Arc::clone(&halt);
        if let Err(e) = ctrlc::set_handler(move || {
            eprintln!("stop requested, finishing the current iteration");
            halt.store(true, Ordering::Relaxed);
        }) {
            warn!(error = %e, "could not install the interrupt handler");
        }
    }

    let objective = GravityObjective::new(&net, objective_config.clone());
    let constraint =
        UserCostConstraint::new(&net, user_cost_config, assignment_config, initial_flows);

    let mut driver = SearchDriver::new(
        &net,
        search_config.clone(),
        objective,
        constraint,
        memory,
        solutions,
        events,
        layout.clone(),
        halt,
    );

    let started = Instant::now();
    let outcome = driver.solve();
    let elapsed = started.elapsed();

    // The metric table of the best solution, for downstream analysis.
    let metrics = GravityObjective::new(&net, objective_config);
    if let Err(e) = metrics.save_metrics(&outcome.best, &layout.metrics()) {
        warn!(error = %e, "failed to write the metric table");
    }

    let report = RunReport {
        instance: layout.base().display().to_string(),
        resumed: search_config.resume,
        status: format!("{:?}", outcome.status),
        iterations: outcome.iterations,
        initial_objective,
        best_objective: outcome.objective,
        best_solution: outcome.best.fleets().to_vec(),
        memoized_solutions: driver.solutions().len(),
        elapsed_ms: elapsed.as_millis(),
    };
    match std::fs::File::create(layout.report()) {
        Ok(file) => {
            if let Err(e) = serde_json::to_writer_pretty(file, &report) {
                warn!(error = %e, "failed to write the run report");
            }
        }
        Err(e) => warn!(error = %e, "failed to create the run report"),
    }

    Ok(outcome)
}
