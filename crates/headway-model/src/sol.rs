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

use crate::network::Network;
use headway_core::LineId;
use std::fmt::Display;

/// Delimiter used by the canonical solution key.
pub const KEY_DELIMITER: char = '_';

/// A candidate fleet allocation: one vehicle count per line, ordered
/// like the network's line arena.
///
/// The canonical string form joins the counts with underscores
/// (`"3_5_0"`) and keys the persistent solution memo.
///
/// # Examples
///
/// ```
/// use headway_model::Solution;
///
/// let sol = Solution::new(vec![3, 5, 0]);
/// assert_eq!(sol.key(), "3_5_0");
/// assert_eq!(Solution::from_key("3_5_0").unwrap(), sol);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Solution {
    fleets: Vec<u32>,
}

/// Failure to decode a canonical solution key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionKeyError {
    key: String,
}

impl Display for SolutionKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid solution key {:?}", self.key)
    }
}

impl std::error::Error for SolutionKeyError {}

impl Solution {
    pub fn new(fleets: Vec<u32>) -> Self {
        Solution { fleets }
    }

    /// The all-zero allocation of a given length.
    pub fn zeros(len: usize) -> Self {
        Solution {
            fleets: vec![0; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fleets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fleets.is_empty()
    }

    #[inline]
    pub fn fleet(&self, line: LineId) -> u32 {
        self.fleets[line.value()]
    }

    #[inline]
    pub fn set_fleet(&mut self, line: LineId, fleet: u32) {
        self.fleets[line.value()] = fleet;
    }

    #[inline]
    pub fn fleets(&self) -> &[u32] {
        &self.fleets
    }

    /// Canonical decimal string with the underscore delimiter.
    pub fn key(&self) -> String {
        let mut out = String::new();
        for (i, fleet) in self.fleets.iter().enumerate() {
            if i > 0 {
                out.push(KEY_DELIMITER);
            }
            out.push_str(&fleet.to_string());
        }
        out
    }

    /// Decodes a canonical key back into a solution.
    pub fn from_key(key: &str) -> Result<Self, SolutionKeyError> {
        let mut fleets = Vec::new();
        for piece in key.split(KEY_DELIMITER) {
            let fleet = piece.parse::<u32>().map_err(|_| SolutionKeyError {
                key: key.to_string(),
            })?;
            fleets.push(fleet);
        }
        Ok(Solution { fleets })
    }

    /// Total vehicles in use per vehicle type.
    pub fn vehicle_totals(&self, net: &Network) -> Vec<u32> {
        let mut totals = vec![0u32; net.vehicle_types().len()];
        for (i, line) in net.lines().iter().enumerate() {
            totals[line.vehicle_type().value()] += self.fleets[i];
        }
        totals
    }

    /// Whether every line bound and vehicle-type ceiling is respected.
    pub fn within_bounds(&self, net: &Network) -> bool {
        if self.fleets.len() != net.lines().len() {
            return false;
        }
        for (i, line) in net.lines().iter().enumerate() {
            if self.fleets[i] < line.min_fleet() || self.fleets[i] > line.max_fleet() {
                return false;
            }
        }
        self.vehicle_totals(net)
            .iter()
            .zip(net.vehicle_types())
            .all(|(&used, vt)| used <= vt.max_fleet())
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{NetworkBuilder, NodeKind};
    use headway_core::Minutes;

    #[test]
    fn key_round_trips() {
        let sol = Solution::new(vec![10, 0, 7]);
        assert_eq!(sol.key(), "10_0_7");
        assert_eq!(Solution::from_key("10_0_7").unwrap(), sol);
    }

    #[test]
    fn single_line_key_has_no_delimiter() {
        assert_eq!(Solution::new(vec![4]).key(), "4");
        assert_eq!(Solution::from_key("4").unwrap(), Solution::new(vec![4]));
    }

    #[test]
    fn bad_keys_are_rejected() {
        assert!(Solution::from_key("3_x_1").is_err());
        assert!(Solution::from_key("").is_err());
        assert!(Solution::from_key("3__1").is_err());
    }

    #[test]
    fn bounds_cover_lines_and_vehicle_types() {
        let mut b = NetworkBuilder::new(Minutes::new(1440.0));
        let vt = b.add_vehicle_type(6, 40.0);
        b.add_line(vt, 1, 5, Minutes::new(60.0), 1.0);
        b.add_line(vt, 0, 5, Minutes::new(30.0), 1.0);
        b.add_node(NodeKind::Stop, 0.0);
        let net = b.build().unwrap();

        assert!(Solution::new(vec![2, 3]).within_bounds(&net));
        // below line minimum
        assert!(!Solution::new(vec![0, 3]).within_bounds(&net));
        // above line maximum
        assert!(!Solution::new(vec![6, 0]).within_bounds(&net));
        // type ceiling: 4 + 3 > 6
        assert!(!Solution::new(vec![4, 3]).within_bounds(&net));
        assert_eq!(Solution::new(vec![4, 2]).vehicle_totals(&net), vec![6]);
    }
}
