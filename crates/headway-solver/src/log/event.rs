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

//! The per-iteration event trace and the objective trace.
//!
//! The event log gets one row per iteration summarizing what the driver
//! did: which case fired, which move was taken, the counters and the
//! evaluation tallies. The objective log is the compact companion with
//! just the current and best objective per iteration.

use headway_core::LineId;
use std::{
    fs::OpenOptions,
    io,
    io::Write as _,
    path::{Path, PathBuf},
};

/// What the acceptance step decided this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// The best neighbor improved on the current solution.
    Improvement,
    /// A worsening neighbor passed the annealing draw.
    AnnealAccept,
    /// The worsening neighbor was rejected.
    AnnealReject,
}

impl IterationOutcome {
    /// Stable case code written to the log.
    #[inline]
    pub fn code(self) -> u32 {
        match self {
            IterationOutcome::Improvement => 1,
            IterationOutcome::AnnealAccept => 2,
            IterationOutcome::AnnealReject => 3,
        }
    }
}

/// Everything one event-log row records.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationEvent {
    pub iteration: u32,
    pub outcome: IterationOutcome,
    pub add_line: Option<LineId>,
    pub drop_line: Option<LineId>,
    pub obj_current: f64,
    pub obj_best: f64,
    pub new_best: bool,
    pub sa_probability: f64,
    pub jumped: bool,
    pub nonimp_inner: u32,
    pub nonimp_outer: u32,
    pub tenure: f64,
    pub temperature: f64,
    pub objective_lookups: u32,
    pub constraint_lookups: u32,
    pub objective_evaluations: u32,
    pub constraint_evaluations: u32,
    pub add_first: usize,
    pub drop_first: usize,
    pub add_second: usize,
    pub drop_second: usize,
    pub swaps: usize,
    pub elapsed_seconds: f64,
}

const EVENT_HEADER: &str = "Iteration\tCase\tAdd\tDrop\tObj_Current\tObj_Best\tNew_Best\tSA_Prob\t\
Jump\tNonimp_In\tNonimp_Out\tTenure\tTemperature\tObj_Lookups\tCon_Lookups\tObj_Evals\tCon_Evals\t\
Add_First\tDrop_First\tAdd_Second\tDrop_Second\tSwaps\tTime";

/// Append-mode writer for the event and objective traces.
#[derive(Debug, Clone)]
pub struct EventLog {
    event_path: PathBuf,
    objective_path: PathBuf,
}

impl EventLog {
    /// Opens the traces. A new run truncates both files and seeds the
    /// objective trace with the initial objective as iteration zero; a
    /// resumed run appends a session separator instead.
    pub fn create(
        event_path: PathBuf,
        objective_path: PathBuf,
        resume: bool,
        initial_objective: f64,
    ) -> io::Result<Self> {
        if resume {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&event_path)?;
            writeln!(file, "# session resumed")?;
        } else {
            std::fs::write(&event_path, format!("{}\n", EVENT_HEADER))?;
            std::fs::write(
                &objective_path,
                format!(
                    "Iteration\tObj_Current\tObj_Best\n0\t{:.15}\t{:.15}\n",
                    initial_objective, initial_objective
                ),
            )?;
        }
        Ok(EventLog {
            event_path,
            objective_path,
        })
    }

    /// Appends one iteration row to both traces.
    pub fn log_iteration(&self, event: &IterationEvent) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.event_path)?;
        writeln!(
            file,
            "{}\t{}\t{}\t{}\t{:.15}\t{:.15}\t{}\t{:.6}\t{}\t{}\t{}\t{:.3}\t{:.9}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.3}",
            event.iteration,
            event.outcome.code(),
            line_code(event.add_line),
            line_code(event.drop_line),
            event.obj_current,
            event.obj_best,
            event.new_best as u8,
            event.sa_probability,
            event.jumped as u8,
            event.nonimp_inner,
            event.nonimp_outer,
            event.tenure,
            event.temperature,
            event.objective_lookups,
            event.constraint_lookups,
            event.objective_evaluations,
            event.constraint_evaluations,
            event.add_first,
            event.drop_first,
            event.add_second,
            event.drop_second,
            event.swaps,
            event.elapsed_seconds,
        )?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.objective_path)?;
        writeln!(
            file,
            "{}\t{:.15}\t{:.15}",
            event.iteration, event.obj_current, event.obj_best
        )
    }

    /// Appends the halt trailer row.
    pub fn log_halt(&self, iteration: u32) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.event_path)?;
        writeln!(file, "{}\thalt", iteration)
    }

    #[inline]
    pub fn event_path(&self) -> &Path {
        &self.event_path
    }

    #[inline]
    pub fn objective_path(&self) -> &Path {
        &self.objective_path
    }
}

fn line_code(line: Option<LineId>) -> i64 {
    line.map(|l| l.value() as i64).unwrap_or(-1)
}
