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

//! The immutable problem model of the headway transit optimizer.
//!
//! This crate owns everything the solver treats as read-only input: the
//! network arenas ([`network::Network`]), the candidate fleet vector
//! ([`sol::Solution`]), the parameter sets ([`config`]), and the
//! tab-separated input readers ([`input`]). The solver crate consumes
//! these types and never mutates them.

pub mod config;
pub mod err;
pub mod input;
pub mod network;
pub mod sol;

pub use config::{AssignmentConfig, DataLayout, ObjectiveConfig, SearchConfig, UserCostConfig};
pub use err::InputError;
pub use network::{Arc, ArcKind, Line, Network, NetworkBuilder, NetworkError, Node, NodeKind, VehicleType};
pub use sol::Solution;

pub mod prelude {
    //! Convenience re-exports for downstream crates.
    pub use crate::config::{
        AssignmentConfig, DataLayout, ObjectiveConfig, SearchConfig, UserCostConfig,
    };
    pub use crate::err::InputError;
    pub use crate::network::{
        Arc, ArcKind, Line, Network, NetworkBuilder, NetworkError, Node, NodeKind, VehicleType,
    };
    pub use crate::sol::Solution;
    pub use headway_core::{ArcId, Frequency, LineId, Minutes, NodeId, VehicleTypeId};
}
