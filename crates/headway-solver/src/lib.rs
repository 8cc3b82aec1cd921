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

//! The algorithmic engine of the headway transit optimizer.
//!
//! Layered bottom-up: the constant-cost common-lines assignment
//! ([`assignment::ConstantAssignment`]) feeds the Frank-Wolfe model
//! ([`assignment::NonlinearAssignment`]), which feeds the user-cost
//! constraint ([`constraint::UserCostConstraint`]). The gravity
//! accessibility objective ([`objective::GravityObjective`]) is
//! independent of the assignment side. The tabu-search /
//! simulated-annealing driver ([`search::SearchDriver`]) orchestrates
//! both evaluators through the persistent solution memo
//! ([`log::SolutionLog`]).

pub mod assignment;
pub mod constraint;
pub mod log;
pub mod objective;
pub mod search;

mod key;

pub use assignment::{AssignmentOutcome, ConstantAssignment, FlowPattern, NonlinearAssignment};
pub use constraint::{UserCostComponents, UserCostConstraint};
pub use log::{EventLog, Feasibility, SearchMemory, SolutionLog, SolutionRecord};
pub use objective::GravityObjective;
pub use search::{Move, SearchDriver, SearchOutcome, SearchStatus};
