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

use std::fmt::Display;

/// Represents a unique identifier for a network node.
///
/// Node identifiers are dense: the id of a node equals its position in
/// the network's node arena, so an id doubles as an index.
///
/// # Examples
///
/// ```
/// use headway_core::NodeId;
///
/// let id = NodeId::new(42);
/// assert_eq!(id.value(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a new `NodeId` with the given index value.
    #[inline]
    pub const fn new(id: usize) -> Self {
        NodeId(id)
    }

    /// Returns the underlying index of the `NodeId`.
    #[inline]
    pub const fn value(&self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(id: usize) -> Self {
        NodeId(id)
    }
}

/// Represents a unique identifier for a network arc.
///
/// Like node identifiers, arc identifiers equal the arc's position in
/// the arc arena.
///
/// # Examples
///
/// ```
/// use headway_core::ArcId;
///
/// let id = ArcId::new(7);
/// assert_eq!(id.value(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArcId(usize);

impl ArcId {
    /// Creates a new `ArcId` with the given index value.
    #[inline]
    pub const fn new(id: usize) -> Self {
        ArcId(id)
    }

    /// Returns the underlying index of the `ArcId`.
    #[inline]
    pub const fn value(&self) -> usize {
        self.0
    }
}

impl Display for ArcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArcId({})", self.0)
    }
}

impl From<usize> for ArcId {
    #[inline]
    fn from(id: usize) -> Self {
        ArcId(id)
    }
}

/// Represents a unique identifier for a transit line.
///
/// Line identifiers index both the line arena and the solution vector:
/// entry `i` of a solution is the fleet assigned to `LineId::new(i)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(usize);

impl LineId {
    /// Creates a new `LineId` with the given index value.
    #[inline]
    pub const fn new(id: usize) -> Self {
        LineId(id)
    }

    /// Returns the underlying index of the `LineId`.
    #[inline]
    pub const fn value(&self) -> usize {
        self.0
    }
}

impl Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

impl From<usize> for LineId {
    #[inline]
    fn from(id: usize) -> Self {
        LineId(id)
    }
}

/// Represents a unique identifier for a vehicle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VehicleTypeId(usize);

impl VehicleTypeId {
    /// Creates a new `VehicleTypeId` with the given index value.
    #[inline]
    pub const fn new(id: usize) -> Self {
        VehicleTypeId(id)
    }

    /// Returns the underlying index of the `VehicleTypeId`.
    #[inline]
    pub const fn value(&self) -> usize {
        self.0
    }
}

impl Display for VehicleTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VehicleTypeId({})", self.0)
    }
}

impl From<usize> for VehicleTypeId {
    #[inline]
    fn from(id: usize) -> Self {
        VehicleTypeId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_their_index() {
        assert_eq!(NodeId::new(3).value(), 3);
        assert_eq!(ArcId::from(9).value(), 9);
        assert_eq!(LineId::new(0).value(), 0);
        assert_eq!(VehicleTypeId::new(1).value(), 1);
    }

    #[test]
    fn ids_order_by_index() {
        assert!(NodeId::new(1) < NodeId::new(2));
        assert!(ArcId::new(5) > ArcId::new(4));
    }

    #[test]
    fn ids_display_their_kind() {
        assert_eq!(format!("{}", LineId::new(12)), "LineId(12)");
        assert_eq!(format!("{}", NodeId::new(0)), "NodeId(0)");
    }
}
