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

//! The TS/SA state snapshot.
//!
//! Written at every iteration boundary so a halted run can resume where
//! it stopped. The row layout is fixed:
//!
//! 1. comment line
//! 2. ADD tenures (tab separated)
//! 3. DROP tenures
//! 4. current solution vector
//! 5. best solution vector
//! 6..12. obj_current, obj_best, iteration, inner counter, outer
//!    counter, tenure, temperature (one scalar per row)
//! 13. attractive-pool objectives (possibly empty)
//! 14... one row per attractive-pool solution vector

use crate::log::write_atomic;
use headway_model::{InputError, SearchConfig, Solution};
use std::{
    fmt::Write as _,
    io,
    io::BufRead,
    path::Path,
};

/// The mutable state of the TS/SA search, persisted between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMemory {
    pub add_tenure: Vec<f64>,
    pub drop_tenure: Vec<f64>,
    pub current: Solution,
    pub best: Solution,
    pub obj_current: f64,
    pub obj_best: f64,
    pub iteration: u32,
    pub nonimp_inner: u32,
    pub nonimp_outer: u32,
    pub tenure: f64,
    pub temperature: f64,
    pub attractive: Vec<(Solution, f64)>,
}

impl SearchMemory {
    /// Fresh state for a new search: zero tenures and counters, the
    /// configured initial temperature and tenure, and the warm-start
    /// solution as both current and best.
    pub fn fresh(config: &SearchConfig, initial: (Solution, f64)) -> Self {
        let (solution, objective) = initial;
        let size = solution.len();
        SearchMemory {
            add_tenure: vec![0.0; size],
            drop_tenure: vec![0.0; size],
            current: solution.clone(),
            best: solution,
            obj_current: objective,
            obj_best: objective,
            iteration: 0,
            nonimp_inner: 0,
            nonimp_outer: 0,
            tenure: config.tenure_initial,
            temperature: config.initial_temperature,
            attractive: Vec::new(),
        }
    }

    /// Reads a snapshot written by [`SearchMemory::save`].
    pub fn load(path: &Path, size: usize) -> Result<Self, InputError> {
        let file = std::fs::File::open(path).map_err(|e| InputError::missing(path, e))?;
        let reader = io::BufReader::new(file);

        let mut rows: Vec<(usize, String)> = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| InputError::missing(path, e))?;
            if idx == 0 {
                continue;
            }
            rows.push((idx + 1, line.trim_end_matches(['\r', '\n']).to_string()));
        }
        // The attractive-objective row may legitimately be empty, so
        // only trailing blank rows beyond it are dropped.
        while rows.len() > 12 && rows.last().is_some_and(|(_, l)| l.trim().is_empty()) {
            rows.pop();
        }
        if rows.len() < 12 {
            return Err(InputError::malformed(
                path,
                rows.len() + 1,
                format!("memory log has {} rows, expected at least 12", rows.len()),
            ));
        }

        let float_list = |row: &(usize, String)| -> Result<Vec<f64>, InputError> {
            row.1
                .split('\t')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.parse::<f64>().map_err(|_| {
                        InputError::malformed(path, row.0, format!("bad number {:?}", s))
                    })
                })
                .collect()
        };
        let fleet_list = |row: &(usize, String)| -> Result<Solution, InputError> {
            let fleets = row
                .1
                .split('\t')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.parse::<u32>().map_err(|_| {
                        InputError::malformed(path, row.0, format!("bad fleet size {:?}", s))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if fleets.len() != size {
                return Err(InputError::malformed(
                    path,
                    row.0,
                    format!("expected {} fleet entries, found {}", size, fleets.len()),
                ));
            }
            Ok(Solution::new(fleets))
        };
        let scalar = |row: &(usize, String)| -> Result<f64, InputError> {
            row.1.trim().parse::<f64>().map_err(|_| {
                InputError::malformed(path, row.0, format!("bad number {:?}", row.1))
            })
        };

        let add_tenure = float_list(&rows[0])?;
        let drop_tenure = float_list(&rows[1])?;
        if add_tenure.len() != size || drop_tenure.len() != size {
            return Err(InputError::malformed(
                path,
                rows[0].0,
                "tenure vectors do not match the solution size",
            ));
        }
        let current = fleet_list(&rows[2])?;
        let best = fleet_list(&rows[3])?;
        let obj_current = scalar(&rows[4])?;
        let obj_best = scalar(&rows[5])?;
        let iteration = scalar(&rows[6])? as u32;
        let nonimp_inner = scalar(&rows[7])? as u32;
        let nonimp_outer = scalar(&rows[8])? as u32;
        let tenure = scalar(&rows[9])?;
        let temperature = scalar(&rows[10])?;

        let objectives = float_list(&rows[11])?;
        let vector_rows = &rows[12..];
        if vector_rows.len() != objectives.len() {
            return Err(InputError::malformed(
                path,
                rows[11].0,
                format!(
                    "{} attractive objectives but {} solution rows",
                    objectives.len(),
                    vector_rows.len()
                ),
            ));
        }
        let mut attractive = Vec::with_capacity(objectives.len());
        for (row, objective) in vector_rows.iter().zip(objectives) {
            attractive.push((fleet_list(row)?, objective));
        }

        Ok(SearchMemory {
            add_tenure,
            drop_tenure,
            current,
            best,
            obj_current,
            obj_best,
            iteration,
            nonimp_inner,
            nonimp_outer,
            tenure,
            temperature,
            attractive,
        })
    }

    /// Rewrites the snapshot file atomically.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = String::new();
        out.push_str(
            "[add_tenure], [drop_tenure], [sol_current], [sol_best], obj_current, obj_best, \
             iteration, nonimp_in, nonimp_out, tenure, temperature, [attractive_objectives], \
             [[attractive_solutions]]\n",
        );
        push_floats(&mut out, &self.add_tenure);
        push_floats(&mut out, &self.drop_tenure);
        push_fleets(&mut out, &self.current);
        push_fleets(&mut out, &self.best);
        let _ = writeln!(out, "{:.15}", self.obj_current);
        let _ = writeln!(out, "{:.15}", self.obj_best);
        let _ = writeln!(out, "{}", self.iteration);
        let _ = writeln!(out, "{}", self.nonimp_inner);
        let _ = writeln!(out, "{}", self.nonimp_outer);
        let _ = writeln!(out, "{:.15}", self.tenure);
        let _ = writeln!(out, "{:.15}", self.temperature);
        push_floats(&mut out, &self.attractive.iter().map(|(_, o)| *o).collect::<Vec<_>>());
        for (solution, _) in &self.attractive {
            push_fleets(&mut out, solution);
        }
        write_atomic(path, &out)
    }

    /// Writes the best known solution and its objective on their own.
    pub fn write_best(&self, path: &Path) -> io::Result<()> {
        let mut out = String::new();
        push_fleets(&mut out, &self.best);
        let _ = writeln!(out, "{:.15}", self.obj_best);
        write_atomic(path, &out)
    }
}

fn push_floats(out: &mut String, values: &[f64]) {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push('\t');
        }
        let _ = write!(out, "{:.15}", v);
    }
    out.push('\n');
}

fn push_fleets(out: &mut String, solution: &Solution) {
    for (i, fleet) in solution.fleets().iter().enumerate() {
        if i > 0 {
            out.push('\t');
        }
        let _ = write!(out, "{}", fleet);
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SearchMemory {
        SearchMemory {
            add_tenure: vec![0.0, 3.0],
            drop_tenure: vec![1.0, 0.0],
            current: Solution::new(vec![2, 4]),
            best: Solution::new(vec![3, 3]),
            obj_current: -0.5,
            obj_best: -0.75,
            iteration: 17,
            nonimp_inner: 2,
            nonimp_outer: 5,
            tenure: 7.5,
            temperature: 0.25,
            attractive: vec![
                (Solution::new(vec![1, 5]), -0.25),
                (Solution::new(vec![2, 2]), -0.125),
            ],
        }
    }

    #[test]
    fn fresh_memory_starts_clean() {
        let config = SearchConfig {
            initial_temperature: 2.0,
            tenure_initial: 4.0,
            ..SearchConfig::default()
        };
        let memory = SearchMemory::fresh(&config, (Solution::new(vec![1, 2, 3]), -9.0));
        assert_eq!(memory.add_tenure, vec![0.0; 3]);
        assert_eq!(memory.current, memory.best);
        assert_eq!(memory.obj_current, -9.0);
        assert_eq!(memory.temperature, 2.0);
        assert_eq!(memory.tenure, 4.0);
        assert_eq!(memory.iteration, 0);
        assert!(memory.attractive.is_empty());
    }

    #[test]
    fn snapshot_round_trips() {
        let dir = std::env::temp_dir().join("headway-memlog-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("memory.txt");

        let memory = sample();
        memory.save(&path).unwrap();
        let loaded = SearchMemory::load(&path, 2).unwrap();
        assert_eq!(loaded, memory);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn empty_pool_round_trips() {
        let dir = std::env::temp_dir().join("headway-memlog-empty-pool");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("memory.txt");

        let mut memory = sample();
        memory.attractive.clear();
        memory.save(&path).unwrap();
        let loaded = SearchMemory::load(&path, 2).unwrap();
        assert!(loaded.attractive.is_empty());
        assert_eq!(loaded, memory);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn size_mismatch_is_malformed() {
        let dir = std::env::temp_dir().join("headway-memlog-mismatch");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("memory.txt");
        sample().save(&path).unwrap();
        assert!(SearchMemory::load(&path, 3).is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn best_file_holds_solution_and_objective() {
        let dir = std::env::temp_dir().join("headway-memlog-best");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("final.txt");
        sample().write_best(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("3\t3"));
        assert!(lines.next().unwrap().starts_with("-0.75"));
        std::fs::remove_file(&path).unwrap();
    }
}
