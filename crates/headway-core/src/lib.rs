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

//! Shared primitives for the headway transit optimizer.
//!
//! This crate provides the identifier newtypes used to index the flat
//! network arenas (`NodeId`, `ArcId`, `LineId`, `VehicleTypeId`) and the
//! quantity newtypes the model hands to the solvers (`Minutes`,
//! `Frequency`). Infinite values are legitimate sentinels throughout the
//! optimizer ("no service", "unbounded capacity"), so the quantity types
//! are built on `f64` and expose the sentinel constants directly.

pub mod id;
pub mod time;

pub use id::{ArcId, LineId, NodeId, VehicleTypeId};
pub use time::{Frequency, Minutes};
