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

//! Tab-separated input readers.
//!
//! Every file starts with a header row that is skipped; blank trailing
//! lines are tolerated. The parsers work on any [`BufRead`] so tests
//! can feed string buffers; the public loaders open the files named by
//! a [`DataLayout`] and attach paths to their errors.

use crate::{
    config::{AssignmentConfig, DataLayout, ObjectiveConfig, SearchConfig, UserCostConfig},
    err::InputError,
    network::{ArcKind, Network, NetworkBuilder, NodeKind},
    sol::Solution,
};
use headway_core::{LineId, Minutes, NodeId, VehicleTypeId};
use std::{
    fs::File,
    io::{BufRead, BufReader, ErrorKind},
    path::Path,
};
use tracing::info;

fn open(path: &Path) -> Result<BufReader<File>, InputError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| InputError::missing(path, e))
}

/// Reads all data rows of a file: header skipped, fields split on tabs,
/// blank lines ignored. Rows come back with their 1-based line number.
fn data_rows<R: BufRead>(reader: R, path: &Path) -> Result<Vec<(usize, Vec<String>)>, InputError> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| InputError::missing(path, e))?;
        if idx == 0 {
            continue;
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            continue;
        }
        rows.push((
            idx + 1,
            trimmed.split('\t').map(|s| s.trim().to_string()).collect(),
        ));
    }
    Ok(rows)
}

fn field<'a>(
    fields: &'a [String],
    idx: usize,
    path: &Path,
    line: usize,
) -> Result<&'a str, InputError> {
    fields.get(idx).map(String::as_str).ok_or_else(|| {
        InputError::malformed(
            path,
            line,
            format!("expected at least {} fields, found {}", idx + 1, fields.len()),
        )
    })
}

fn parse_f64(s: &str, path: &Path, line: usize, what: &str) -> Result<f64, InputError> {
    s.parse::<f64>()
        .map_err(|_| InputError::malformed(path, line, format!("{} is not a number: {:?}", what, s)))
}

fn parse_int(s: &str, path: &Path, line: usize, what: &str) -> Result<i64, InputError> {
    s.parse::<i64>()
        .map_err(|_| InputError::malformed(path, line, format!("{} is not an integer: {:?}", what, s)))
}

fn parse_index(s: &str, path: &Path, line: usize, what: &str) -> Result<usize, InputError> {
    let v = parse_int(s, path, line, what)?;
    usize::try_from(v)
        .map_err(|_| InputError::malformed(path, line, format!("{} is negative: {}", what, v)))
}

/// Reads a label/value file into its value column.
fn label_values<R: BufRead>(
    reader: R,
    path: &Path,
    expected: usize,
) -> Result<Vec<(usize, String)>, InputError> {
    let rows = data_rows(reader, path)?;
    if rows.len() < expected {
        return Err(InputError::malformed(
            path,
            rows.last().map(|(l, _)| *l).unwrap_or(1),
            format!("expected {} parameter rows, found {}", expected, rows.len()),
        ));
    }
    let mut values = Vec::with_capacity(rows.len());
    for (line, fields) in rows {
        let value = field(&fields, 1, path, line)?.to_string();
        values.push((line, value));
    }
    Ok(values)
}

fn parse_horizon<R: BufRead>(reader: R, path: &Path) -> Result<Minutes, InputError> {
    let rows = data_rows(reader, path)?;
    let (line, fields) = rows
        .last()
        .ok_or_else(|| InputError::malformed(path, 1, "problem file has no data row"))?;
    let horizon = parse_f64(field(fields, 1, path, *line)?, path, *line, "horizon")?;
    Ok(Minutes::new(horizon))
}

fn parse_nodes<R: BufRead>(
    reader: R,
    path: &Path,
    builder: &mut NetworkBuilder,
) -> Result<usize, InputError> {
    let mut count = 0;
    for (line, fields) in data_rows(reader, path)? {
        let id = parse_index(field(&fields, 0, path, line)?, path, line, "node id")?;
        if id != count {
            return Err(InputError::malformed(
                path,
                line,
                format!("node id {} does not match its position {}", id, count),
            ));
        }
        let kind = match parse_int(field(&fields, 2, path, line)?, path, line, "node type")? {
            0 => NodeKind::Stop,
            1 => NodeKind::Boarding,
            2 => NodeKind::Population,
            3 => NodeKind::Facility,
            other => {
                return Err(InputError::malformed(
                    path,
                    line,
                    format!("unknown node type {}", other),
                ));
            }
        };
        let value = parse_f64(field(&fields, 4, path, line)?, path, line, "node value")?;
        builder.add_node(kind, value);
        count += 1;
    }
    Ok(count)
}

fn parse_vehicles<R: BufRead>(
    reader: R,
    path: &Path,
    builder: &mut NetworkBuilder,
) -> Result<usize, InputError> {
    let mut count = 0;
    for (line, fields) in data_rows(reader, path)? {
        let id = parse_index(field(&fields, 0, path, line)?, path, line, "vehicle type")?;
        if id != count {
            return Err(InputError::malformed(
                path,
                line,
                format!("vehicle type {} does not match its position {}", id, count),
            ));
        }
        let max_fleet = parse_index(field(&fields, 2, path, line)?, path, line, "fleet bound")?;
        let seating = parse_f64(field(&fields, 3, path, line)?, path, line, "seating")?;
        builder.add_vehicle_type(max_fleet as u32, seating);
        count += 1;
    }
    Ok(count)
}

fn parse_lines<R: BufRead>(
    reader: R,
    path: &Path,
    builder: &mut NetworkBuilder,
) -> Result<usize, InputError> {
    let mut count = 0;
    for (line, fields) in data_rows(reader, path)? {
        let id = parse_index(field(&fields, 0, path, line)?, path, line, "line id")?;
        if id != count {
            return Err(InputError::malformed(
                path,
                line,
                format!("line id {} does not match its position {}", id, count),
            ));
        }
        let vehicle_type =
            parse_index(field(&fields, 2, path, line)?, path, line, "vehicle type")?;
        let circuit = parse_f64(field(&fields, 4, path, line)?, path, line, "circuit time")?;
        let day_fraction = parse_f64(field(&fields, 5, path, line)?, path, line, "scaling")?;
        let min_fleet = parse_index(field(&fields, 6, path, line)?, path, line, "fleet lower bound")?;
        let max_fleet = parse_index(field(&fields, 7, path, line)?, path, line, "fleet upper bound")?;
        builder.add_line(
            VehicleTypeId::new(vehicle_type),
            min_fleet as u32,
            max_fleet as u32,
            Minutes::new(circuit),
            day_fraction,
        );
        count += 1;
    }
    Ok(count)
}

fn parse_arcs<R: BufRead>(
    reader: R,
    path: &Path,
    builder: &mut NetworkBuilder,
) -> Result<usize, InputError> {
    let mut count = 0;
    for (line, fields) in data_rows(reader, path)? {
        let id = parse_index(field(&fields, 0, path, line)?, path, line, "arc id")?;
        if id != count {
            return Err(InputError::malformed(
                path,
                line,
                format!("arc id {} does not match its position {}", id, count),
            ));
        }
        let kind = match parse_int(field(&fields, 1, path, line)?, path, line, "arc type")? {
            0 => ArcKind::Line,
            1 => ArcKind::Boarding,
            2 => ArcKind::Alighting,
            3 => ArcKind::Walking,
            4 => ArcKind::Access,
            other => {
                return Err(InputError::malformed(
                    path,
                    line,
                    format!("unknown arc type {}", other),
                ));
            }
        };
        let line_ref = parse_int(field(&fields, 2, path, line)?, path, line, "arc line")?;
        let tail = parse_index(field(&fields, 3, path, line)?, path, line, "tail node")?;
        let head = parse_index(field(&fields, 4, path, line)?, path, line, "head node")?;
        let cost = parse_f64(field(&fields, 5, path, line)?, path, line, "travel time")?;
        let line_id = if line_ref < 0 {
            None
        } else {
            Some(LineId::new(line_ref as usize))
        };
        builder.add_arc(
            kind,
            line_id,
            NodeId::new(tail),
            NodeId::new(head),
            Minutes::new(cost),
        );
        count += 1;
    }
    Ok(count)
}

fn parse_demand<R: BufRead>(
    reader: R,
    path: &Path,
    builder: &mut NetworkBuilder,
) -> Result<usize, InputError> {
    let mut count = 0;
    for (line, fields) in data_rows(reader, path)? {
        let origin = parse_index(field(&fields, 1, path, line)?, path, line, "origin node")?;
        let destination =
            parse_index(field(&fields, 2, path, line)?, path, line, "destination node")?;
        let volume = parse_f64(field(&fields, 3, path, line)?, path, line, "volume")?;
        builder.set_demand(NodeId::new(origin), NodeId::new(destination), volume);
        count += 1;
    }
    Ok(count)
}

/// Reads all network input files and assembles the immutable network.
pub fn load_network(layout: &DataLayout) -> Result<Network, InputError> {
    let horizon = parse_horizon(open(&layout.problem_data())?, &layout.problem_data())?;
    let mut builder = NetworkBuilder::new(horizon);

    let nodes = parse_nodes(open(&layout.node_data())?, &layout.node_data(), &mut builder)?;
    let vehicles = parse_vehicles(
        open(&layout.vehicle_data())?,
        &layout.vehicle_data(),
        &mut builder,
    )?;
    let lines = parse_lines(
        open(&layout.transit_data())?,
        &layout.transit_data(),
        &mut builder,
    )?;
    let arcs = parse_arcs(open(&layout.arc_data())?, &layout.arc_data(), &mut builder)?;
    let od_pairs = parse_demand(open(&layout.od_data())?, &layout.od_data(), &mut builder)?;

    info!(
        nodes,
        arcs, lines, vehicles, od_pairs, "network data read"
    );

    builder
        .build()
        .map_err(|e| InputError::malformed(layout.arc_data(), 0, e.to_string()))
}

/// Reads the objective parameter file.
pub fn load_objective_config(layout: &DataLayout) -> Result<ObjectiveConfig, InputError> {
    let path = layout.objective_data();
    let values = label_values(open(&path)?, &path, 3)?;
    let (l0, v0) = &values[0];
    let (l1, v1) = &values[1];
    let (l2, v2) = &values[2];
    Ok(ObjectiveConfig {
        lowest_metrics: parse_index(v0, &path, *l0, "lowest metric count")?,
        gravity_exponent: parse_f64(v1, &path, *l1, "gravity exponent")?,
        multiplier: parse_f64(v2, &path, *l2, "multiplier")?,
    })
}

/// Reads the user-cost parameter file.
pub fn load_user_cost_config(layout: &DataLayout) -> Result<UserCostConfig, InputError> {
    let path = layout.user_cost_data();
    let values = label_values(open(&path)?, &path, 5)?;
    let get = |i: usize, what: &str| -> Result<f64, InputError> {
        let (line, value) = &values[i];
        parse_f64(value, &path, *line, what)
    };
    Ok(UserCostConfig {
        initial_user_cost: get(0, "initial user cost")?,
        percent_increase: get(1, "percent increase")?,
        riding_weight: get(2, "riding weight")?,
        walking_weight: get(3, "walking weight")?,
        waiting_weight: get(4, "waiting weight")?,
    })
}

/// Reads the assignment model parameter file.
pub fn load_assignment_config(layout: &DataLayout) -> Result<AssignmentConfig, InputError> {
    let path = layout.assignment_data();
    let values = label_values(open(&path)?, &path, 6)?;
    let get = |i: usize, what: &str| -> Result<f64, InputError> {
        let (line, value) = &values[i];
        parse_f64(value, &path, *line, what)
    };
    let (line_iter, v_iter) = &values[3];
    Ok(AssignmentConfig {
        error_tolerance: get(0, "error tolerance")?,
        flow_tolerance: get(1, "flow tolerance")?,
        waiting_tolerance: get(2, "waiting tolerance")?,
        max_iterations: parse_index(v_iter, &path, *line_iter, "iteration cutoff")? as u32,
        conical_alpha: get(4, "conical alpha")?,
        conical_beta: get(5, "conical beta")?,
    })
}

/// Reads the search parameter file.
pub fn load_search_config(layout: &DataLayout) -> Result<SearchConfig, InputError> {
    let path = layout.search_parameters();
    let values = label_values(open(&path)?, &path, 16)?;
    let float = |i: usize, what: &str| -> Result<f64, InputError> {
        let (line, value) = &values[i];
        parse_f64(value, &path, *line, what)
    };
    let index = |i: usize, what: &str| -> Result<usize, InputError> {
        let (line, value) = &values[i];
        parse_index(value, &path, *line, what)
    };
    let flag = |i: usize, what: &str| -> Result<bool, InputError> {
        let (line, value) = &values[i];
        Ok(parse_int(value, &path, *line, what)? != 0)
    };
    Ok(SearchConfig {
        resume: flag(0, "continue flag")?,
        max_iterations: index(1, "iteration budget")? as u32,
        initial_temperature: float(2, "initial temperature")?,
        cooling_factor: float(3, "cooling factor")?,
        attractive_max: index(4, "attractive pool size")?,
        add_first: index(5, "first-pass ADD limit")?,
        add_second: index(6, "second-pass ADD limit")?,
        drop_first: index(7, "first-pass DROP limit")?,
        drop_second: index(8, "second-pass DROP limit")?,
        swap_max: index(9, "SWAP limit")?,
        tenure_initial: float(10, "initial tenure")?,
        tenure_factor: float(11, "tenure factor")?,
        nonimp_inner_max: index(12, "inner non-improvement cutoff")? as u32,
        nonimp_outer_max: index(13, "outer non-improvement cutoff")? as u32,
        step: index(14, "move step")? as u32,
        exhaustive: flag(15, "exhaustive flag")?,
    })
}

/// Reads the optional warm-start flow file. A missing file means the
/// zero flow vector; a present but unreadable row is still an error.
pub fn load_initial_flows(
    layout: &DataLayout,
    arc_count: usize,
) -> Result<Option<Vec<f64>>, InputError> {
    let path = layout.initial_flows();
    let reader = match File::open(&path) {
        Ok(file) => BufReader::new(file),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(InputError::missing(&path, e)),
    };
    let mut flows = vec![0.0; arc_count];
    for (line, fields) in data_rows(reader, &path)? {
        let arc = parse_index(field(&fields, 0, &path, line)?, &path, line, "arc id")?;
        let flow = parse_f64(field(&fields, 1, &path, line)?, &path, line, "flow")?;
        if arc >= arc_count {
            return Err(InputError::malformed(
                &path,
                line,
                format!("arc id {} exceeds arc count {}", arc, arc_count),
            ));
        }
        flows[arc] = flow;
    }
    Ok(Some(flows))
}

/// Reads the warm-start solution and its objective from the last row of
/// a solution log file.
pub fn load_initial_solution(path: &Path) -> Result<(Solution, f64), InputError> {
    let rows = data_rows(open(path)?, path)?;
    let (line, fields) = rows
        .last()
        .ok_or_else(|| InputError::malformed(path, 1, "initial solution log has no data row"))?;
    let key = field(fields, 0, path, *line)?;
    let solution = Solution::from_key(key)
        .map_err(|e| InputError::malformed(path, *line, e.to_string()))?;
    // Columns: solution, feasibility, three user cost components,
    // constraint time, objective, objective time.
    let objective = parse_f64(field(fields, 6, path, *line)?, path, *line, "objective")?;
    Ok((solution, objective))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn p() -> PathBuf {
        PathBuf::from("test_input.txt")
    }

    #[test]
    fn nodes_and_arcs_assemble_a_network() {
        let mut builder = NetworkBuilder::new(Minutes::new(1440.0));
        let nodes = "id\tname\ttype\tline\tvalue\n\
                     0\tA\t0\t-1\t0\n\
                     1\tB\t0\t-1\t0\n\
                     2\tbA\t1\t0\t0\n\
                     3\tbB\t1\t0\t0\n";
        parse_nodes(Cursor::new(nodes), &p(), &mut builder).unwrap();

        let vehicles = "type\tname\tub\tseating\tcost\n0\tbus\t10\t40\t100\n";
        parse_vehicles(Cursor::new(vehicles), &p(), &mut builder).unwrap();

        let transit =
            "id\tname\ttype\tfleet\tcircuit\tscaling\tlb\tub\tfare\tfrequency\tcapacity\n\
             0\tred\t0\t1\t60\t1.0\t0\t5\t0\t-1\t-1\n";
        parse_lines(Cursor::new(transit), &p(), &mut builder).unwrap();

        let arcs = "id\ttype\tline\ttail\thead\ttime\n\
                    0\t1\t0\t0\t2\t0\n\
                    1\t0\t0\t2\t3\t10\n\
                    2\t2\t0\t3\t1\t0\n";
        parse_arcs(Cursor::new(arcs), &p(), &mut builder).unwrap();

        let od = "id\torigin\tdestination\tvolume\n0\t0\t1\t100\n";
        parse_demand(Cursor::new(od), &p(), &mut builder).unwrap();

        let net = builder.build().unwrap();
        assert_eq!(net.nodes().len(), 4);
        assert_eq!(net.core_arcs().len(), 3);
        assert_eq!(net.stop_nodes().len(), 2);
        assert_eq!(net.node(NodeId::new(1)).incoming_demand(), &[100.0, 0.0]);
    }

    #[test]
    fn out_of_order_ids_are_malformed() {
        let mut builder = NetworkBuilder::new(Minutes::new(1440.0));
        let nodes = "id\tname\ttype\tline\tvalue\n5\tA\t0\t-1\t0\n";
        let err = parse_nodes(Cursor::new(nodes), &p(), &mut builder).unwrap_err();
        assert!(matches!(err, InputError::Malformed { .. }));
    }

    #[test]
    fn horizon_comes_from_the_last_row() {
        let text = "name\thorizon\nchicago\t1440\n";
        let horizon = parse_horizon(Cursor::new(text), &p()).unwrap();
        assert_eq!(horizon.value(), 1440.0);
    }

    #[test]
    fn short_rows_are_malformed() {
        let arcs = "id\ttype\tline\ttail\thead\ttime\n0\t1\t0\n";
        let mut builder = NetworkBuilder::new(Minutes::new(1440.0));
        let err = parse_arcs(Cursor::new(arcs), &p(), &mut builder).unwrap_err();
        let text = format!("{}", err);
        assert!(text.contains("expected at least"));
    }

    #[test]
    fn label_value_files_report_missing_rows() {
        let text = "label\tvalue\nlowest_metrics\t5\n";
        let err = label_values(Cursor::new(text), &p(), 3).unwrap_err();
        assert!(matches!(err, InputError::Malformed { .. }));
    }
}
