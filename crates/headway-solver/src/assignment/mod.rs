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

//! The Spiess-Florian transit assignment model.
//!
//! [`ConstantAssignment`] solves the constant-cost common-lines
//! problem; [`NonlinearAssignment`] wraps it in a Frank-Wolfe loop with
//! a conical congestion penalty.

mod constant;
mod nonlinear;

pub use constant::ConstantAssignment;
pub use nonlinear::{AssignmentOutcome, NonlinearAssignment};

/// A network-wide flow state: one flow value per arc (access arcs stay
/// zero) and the total expected waiting time.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPattern {
    pub flows: Vec<f64>,
    pub waiting: f64,
}

impl FlowPattern {
    /// The empty pattern for a network with `arc_count` arcs.
    pub fn zeros(arc_count: usize) -> Self {
        FlowPattern {
            flows: vec![0.0; arc_count],
            waiting: 0.0,
        }
    }

    /// Starts from a loaded warm-start flow vector, or zeros.
    pub fn from_initial(arc_count: usize, flows: Option<Vec<f64>>) -> Self {
        match flows {
            Some(flows) => {
                debug_assert_eq!(flows.len(), arc_count);
                FlowPattern { flows, waiting: 0.0 }
            }
            None => FlowPattern::zeros(arc_count),
        }
    }
}
