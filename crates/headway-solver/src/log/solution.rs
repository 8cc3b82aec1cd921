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

//! The persistent solution memo.
//!
//! Every solution the search touches gets a row keyed by its canonical
//! string. A row may be partial: the cheap first neighborhood pass
//! records only the objective, and the constraint side is patched in
//! later if the expensive pass reaches the candidate.

use crate::log::write_atomic;
use headway_model::{InputError, Solution};
use std::{
    collections::HashMap,
    fmt::Write as _,
    io,
    io::BufRead,
    path::Path,
};

/// Sentinel written into the numeric columns of a partial row.
const UNKNOWN_SENTINEL: f64 = -1.0;

/// Constraint-side status of a memoized solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feasibility {
    Feasible,
    Infeasible,
    /// Objective known, constraint never evaluated.
    Unknown,
    /// Permanently excluded from all future neighborhood searches.
    Banned,
}

impl Feasibility {
    /// Stable on-disk code.
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            Feasibility::Feasible => 1,
            Feasibility::Infeasible => 0,
            Feasibility::Unknown => -1,
            Feasibility::Banned => -2,
        }
    }

    /// Decodes an on-disk code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Feasibility::Feasible),
            0 => Some(Feasibility::Infeasible),
            -1 => Some(Feasibility::Unknown),
            -2 => Some(Feasibility::Banned),
            _ => None,
        }
    }
}

/// One memo row.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionRecord {
    pub feasibility: Feasibility,
    /// Riding, walking, and waiting user-cost components.
    pub user_cost: [f64; 3],
    pub constraint_time: f64,
    pub objective: f64,
    pub objective_time: f64,
}

/// The string-keyed solution memo.
#[derive(Debug, Clone, Default)]
pub struct SolutionLog {
    entries: HashMap<String, SolutionRecord>,
}

impl SolutionLog {
    pub fn new() -> Self {
        SolutionLog::default()
    }

    /// Loads a memo file. An empty file yields an empty memo; a missing
    /// file is an error.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let file = std::fs::File::open(path).map_err(|e| InputError::missing(path, e))?;
        let reader = io::BufReader::new(file);
        let mut entries = HashMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| InputError::missing(path, e))?;
            if idx == 0 {
                continue;
            }
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.trim().is_empty() {
                continue;
            }
            let row = idx + 1;
            let fields: Vec<&str> = trimmed.split('\t').collect();
            if fields.len() < 8 {
                return Err(InputError::malformed(
                    path,
                    row,
                    format!("expected 8 columns, found {}", fields.len()),
                ));
            }
            let feas_code = fields[1].parse::<i32>().map_err(|_| {
                InputError::malformed(path, row, format!("bad feasibility code {:?}", fields[1]))
            })?;
            let feasibility = Feasibility::from_code(feas_code).ok_or_else(|| {
                InputError::malformed(path, row, format!("unknown feasibility code {}", feas_code))
            })?;
            let number = |i: usize| -> Result<f64, InputError> {
                fields[i].parse::<f64>().map_err(|_| {
                    InputError::malformed(path, row, format!("bad number {:?}", fields[i]))
                })
            };
            entries.insert(
                fields[0].to_string(),
                SolutionRecord {
                    feasibility,
                    user_cost: [number(2)?, number(3)?, number(4)?],
                    constraint_time: number(5)?,
                    objective: number(6)?,
                    objective_time: number(7)?,
                },
            );
        }
        Ok(SolutionLog { entries })
    }

    /// Rewrites the memo file atomically.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = String::with_capacity(64 * (self.entries.len() + 1));
        out.push_str(
            "Solution\tFeasible\tUC_Riding\tUC_Walking\tUC_Waiting\tCon_Time\tObjective\tObj_Time\n",
        );
        for (key, rec) in &self.entries {
            let _ = writeln!(
                out,
                "{}\t{}\t{:.15}\t{:.15}\t{:.15}\t{:.15}\t{:.15}\t{:.15}",
                key,
                rec.feasibility.code(),
                rec.user_cost[0],
                rec.user_cost[1],
                rec.user_cost[2],
                rec.constraint_time,
                rec.objective,
                rec.objective_time,
            );
        }
        write_atomic(path, &out)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn exists(&self, solution: &Solution) -> bool {
        self.entries.contains_key(&solution.key())
    }

    /// Full record, if present.
    pub fn get(&self, solution: &Solution) -> Option<&SolutionRecord> {
        self.entries.get(&solution.key())
    }

    /// Feasibility and objective only.
    pub fn get_quick(&self, solution: &Solution) -> Option<(Feasibility, f64)> {
        self.entries
            .get(&solution.key())
            .map(|rec| (rec.feasibility, rec.objective))
    }

    /// Creates or overwrites a full record.
    pub fn put_full(&mut self, solution: &Solution, record: SolutionRecord) {
        self.entries.insert(solution.key(), record);
    }

    /// Creates a record with only the objective side filled in.
    pub fn put_partial(&mut self, solution: &Solution, objective: f64, objective_time: f64) {
        self.entries.insert(
            solution.key(),
            SolutionRecord {
                feasibility: Feasibility::Unknown,
                user_cost: [UNKNOWN_SENTINEL; 3],
                constraint_time: UNKNOWN_SENTINEL,
                objective,
                objective_time,
            },
        );
    }

    /// Fills the constraint side of an existing record.
    pub fn patch_feasibility(
        &mut self,
        solution: &Solution,
        feasibility: Feasibility,
        user_cost: [f64; 3],
        constraint_time: f64,
    ) {
        if let Some(rec) = self.entries.get_mut(&solution.key()) {
            rec.feasibility = feasibility;
            rec.user_cost = user_cost;
            rec.constraint_time = constraint_time;
        }
    }

    /// Permanently excludes a solution from future searches.
    pub fn ban(&mut self, solution: &Solution) {
        self.entries
            .entry(solution.key())
            .or_insert(SolutionRecord {
                feasibility: Feasibility::Banned,
                user_cost: [UNKNOWN_SENTINEL; 3],
                constraint_time: UNKNOWN_SENTINEL,
                objective: UNKNOWN_SENTINEL,
                objective_time: UNKNOWN_SENTINEL,
            })
            .feasibility = Feasibility::Banned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sol(fleets: &[u32]) -> Solution {
        Solution::new(fleets.to_vec())
    }

    #[test]
    fn partial_then_patch_builds_a_full_record() {
        let mut log = SolutionLog::new();
        let s = sol(&[2, 1]);

        log.put_partial(&s, 5.0, 0.1);
        assert!(log.exists(&s));
        assert_eq!(log.get_quick(&s), Some((Feasibility::Unknown, 5.0)));

        log.patch_feasibility(&s, Feasibility::Feasible, [1.0, 2.0, 3.0], 0.2);
        let rec = log.get(&s).unwrap();
        assert_eq!(rec.feasibility, Feasibility::Feasible);
        assert_eq!(rec.user_cost, [1.0, 2.0, 3.0]);
        assert_eq!(rec.constraint_time, 0.2);
        assert_eq!(rec.objective, 5.0);
        assert_eq!(rec.objective_time, 0.1);
    }

    #[test]
    fn put_full_overwrites() {
        let mut log = SolutionLog::new();
        let s = sol(&[3]);
        log.put_partial(&s, 1.0, 0.0);
        let record = SolutionRecord {
            feasibility: Feasibility::Infeasible,
            user_cost: [9.0, 8.0, 7.0],
            constraint_time: 0.5,
            objective: 2.0,
            objective_time: 0.4,
        };
        log.put_full(&s, record.clone());
        assert_eq!(log.get(&s), Some(&record));
    }

    #[test]
    fn ban_survives_and_creates_missing_rows() {
        let mut log = SolutionLog::new();
        let known = sol(&[1, 1]);
        let unknown = sol(&[0, 0]);

        log.put_partial(&known, 4.0, 0.1);
        log.ban(&known);
        assert_eq!(log.get(&known).unwrap().feasibility, Feasibility::Banned);
        // The objective recorded earlier is preserved.
        assert_eq!(log.get(&known).unwrap().objective, 4.0);

        log.ban(&unknown);
        assert_eq!(log.get(&unknown).unwrap().feasibility, Feasibility::Banned);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = std::env::temp_dir().join("headway-sollog-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("solution.txt");

        let mut log = SolutionLog::new();
        log.put_partial(&sol(&[1, 2]), -0.25, 0.125);
        log.put_full(
            &sol(&[0, 4]),
            SolutionRecord {
                feasibility: Feasibility::Feasible,
                user_cost: [10.0, 20.0, 30.0],
                constraint_time: 1.5,
                objective: -1.0,
                objective_time: 0.75,
            },
        );
        log.ban(&sol(&[9, 9]));
        log.save(&path).unwrap();

        let loaded = SolutionLog::load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(
            loaded.get_quick(&sol(&[1, 2])),
            Some((Feasibility::Unknown, -0.25))
        );
        assert_eq!(
            loaded.get(&sol(&[0, 4])).unwrap().user_cost,
            [10.0, 20.0, 30.0]
        );
        assert_eq!(
            loaded.get(&sol(&[9, 9])).unwrap().feasibility,
            Feasibility::Banned
        );

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn empty_file_loads_as_empty_memo() {
        let dir = std::env::temp_dir().join("headway-sollog-empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("solution.txt");
        std::fs::write(&path, "").unwrap();
        let loaded = SolutionLog::load(&path).unwrap();
        assert!(loaded.is_empty());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("headway-sollog-missing/never_written.txt");
        assert!(SolutionLog::load(&path).is_err());
    }
}
