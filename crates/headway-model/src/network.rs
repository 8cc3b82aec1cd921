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

//! The immutable network representation of the public transit system.
//!
//! Nodes, arcs, lines, and vehicle types live in flat arenas indexed by
//! their id newtypes; every cross-reference is an id, never a pointer.
//! Most objects are partitioned into a *core* set used by the
//! assignment model (stop/boarding nodes, line/boarding/alighting/
//! walking arcs) and an *access* set that only the accessibility
//! objective needs (population/facility nodes and their walking arcs).
//!
//! A [`Network`] is built once through a [`NetworkBuilder`] — by the
//! input readers or directly by tests — and never mutated afterwards.

use headway_core::{ArcId, Frequency, LineId, Minutes, NodeId, VehicleTypeId};
use std::fmt::Display;

/// Small cost nudge added to boarding and alighting arcs so that
/// zero-cost ties break deterministically in the label-setting passes.
pub const COST_EPSILON: f64 = 1e-8;

/// The role a node plays in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A physical stop where passengers originate and terminate.
    Stop,
    /// A per-line boarding platform attached to a stop.
    Boarding,
    /// A population center, used only by the accessibility objective.
    Population,
    /// A service facility, used only by the accessibility objective.
    Facility,
}

impl NodeKind {
    /// Whether the node belongs to the core (assignment) subgraph.
    #[inline]
    pub fn is_core(self) -> bool {
        matches!(self, NodeKind::Stop | NodeKind::Boarding)
    }
}

/// The role an arc plays in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcKind {
    /// In-vehicle travel along a line segment.
    Line,
    /// Boarding a line at a stop; the only finite-frequency arcs.
    Boarding,
    /// Alighting from a line back to a stop.
    Alighting,
    /// Walking between stops inside the core network.
    Walking,
    /// Walking between the access nodes and the core network.
    Access,
}

impl ArcKind {
    /// Whether the arc belongs to the core (assignment) subgraph.
    #[inline]
    pub fn is_core(self) -> bool {
        !matches!(self, ArcKind::Access)
    }
}

/// A network node.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    value: f64,
    core_out: Vec<ArcId>,
    core_in: Vec<ArcId>,
    access_out: Vec<ArcId>,
    incoming_demand: Vec<f64>,
}

impl Node {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The node's scalar weight: population count for population
    /// centers, quality weight for facilities, unused otherwise.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Outgoing core arcs.
    #[inline]
    pub fn core_out(&self) -> &[ArcId] {
        &self.core_out
    }

    /// Incoming core arcs.
    #[inline]
    pub fn core_in(&self) -> &[ArcId] {
        &self.core_in
    }

    /// Outgoing access arcs.
    #[inline]
    pub fn access_out(&self) -> &[ArcId] {
        &self.access_out
    }

    /// Travel demand into this stop, indexed by origin stop position.
    /// Empty for non-stop nodes.
    #[inline]
    pub fn incoming_demand(&self) -> &[f64] {
        &self.incoming_demand
    }
}

/// A network arc.
#[derive(Debug, Clone)]
pub struct Arc {
    id: ArcId,
    kind: ArcKind,
    line: Option<LineId>,
    tail: NodeId,
    head: NodeId,
    cost: Minutes,
}

impl Arc {
    #[inline]
    pub fn id(&self) -> ArcId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ArcKind {
        self.kind
    }

    /// The line this arc belongs to, if any.
    #[inline]
    pub fn line(&self) -> Option<LineId> {
        self.line
    }

    #[inline]
    pub fn tail(&self) -> NodeId {
        self.tail
    }

    #[inline]
    pub fn head(&self) -> NodeId {
        self.head
    }

    /// Constant travel time, in minutes.
    #[inline]
    pub fn cost(&self) -> Minutes {
        self.cost
    }
}

/// A transit line.
///
/// Fleet sizes are never stored on the line itself; the derived
/// quantities take the candidate fleet as an argument because the
/// neighborhood search evaluates many fleets against the same line.
#[derive(Debug, Clone)]
pub struct Line {
    vehicle_type: VehicleTypeId,
    min_fleet: u32,
    max_fleet: u32,
    circuit: Minutes,
    seating: f64,
    day_fraction: f64,
    day_horizon: Minutes,
    boarding: Vec<ArcId>,
    in_vehicle: Vec<ArcId>,
}

impl Line {
    #[inline]
    pub fn vehicle_type(&self) -> VehicleTypeId {
        self.vehicle_type
    }

    #[inline]
    pub fn min_fleet(&self) -> u32 {
        self.min_fleet
    }

    #[inline]
    pub fn max_fleet(&self) -> u32 {
        self.max_fleet
    }

    /// Time for one vehicle to complete a full circuit.
    #[inline]
    pub fn circuit(&self) -> Minutes {
        self.circuit
    }

    /// Seating capacity of each vehicle serving this line.
    #[inline]
    pub fn seating(&self) -> f64 {
        self.seating
    }

    /// Fraction of the day during which the line operates.
    #[inline]
    pub fn day_fraction(&self) -> f64 {
        self.day_fraction
    }

    /// Daily time horizon in minutes.
    #[inline]
    pub fn day_horizon(&self) -> Minutes {
        self.day_horizon
    }

    /// Boarding arcs attached to this line.
    #[inline]
    pub fn boarding(&self) -> &[ArcId] {
        &self.boarding
    }

    /// In-vehicle line arcs of this line.
    #[inline]
    pub fn in_vehicle(&self) -> &[ArcId] {
        &self.in_vehicle
    }

    /// Service frequency for a given fleet size.
    #[inline]
    pub fn frequency(&self, fleet: u32) -> Frequency {
        Frequency::new(fleet as f64 / self.circuit.value())
    }

    /// Expected headway for a given fleet size; infinite with no fleet.
    #[inline]
    pub fn headway(&self, fleet: u32) -> Minutes {
        if fleet > 0 {
            self.circuit / fleet as f64
        } else {
            Minutes::INFINITY
        }
    }

    /// Daily passenger capacity for a given fleet size.
    #[inline]
    pub fn capacity(&self, fleet: u32) -> f64 {
        self.frequency(fleet).value() * self.day_fraction * self.day_horizon.value() * self.seating
    }
}

/// A vehicle type shared by one or more lines.
#[derive(Debug, Clone, Copy)]
pub struct VehicleType {
    max_fleet: u32,
    seating: f64,
}

impl VehicleType {
    #[inline]
    pub fn new(max_fleet: u32, seating: f64) -> Self {
        VehicleType { max_fleet, seating }
    }

    /// Ceiling on the total fleet across all lines of this type.
    #[inline]
    pub fn max_fleet(&self) -> u32 {
        self.max_fleet
    }

    /// Seating capacity of a single vehicle.
    #[inline]
    pub fn seating(&self) -> f64 {
        self.seating
    }
}

/// The read-only network: arenas plus the partitioned index lists the
/// evaluators iterate over.
#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    arcs: Vec<Arc>,
    lines: Vec<Line>,
    vehicle_types: Vec<VehicleType>,
    stop_nodes: Vec<NodeId>,
    boarding_nodes: Vec<NodeId>,
    population_nodes: Vec<NodeId>,
    facility_nodes: Vec<NodeId>,
    core_arcs: Vec<ArcId>,
    line_arcs: Vec<ArcId>,
    walking_arcs: Vec<ArcId>,
    access_arcs: Vec<ArcId>,
    stop_position: Vec<Option<usize>>,
}

impl Network {
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.value()]
    }

    #[inline]
    pub fn arc(&self, id: ArcId) -> &Arc {
        &self.arcs[id.value()]
    }

    #[inline]
    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.value()]
    }

    #[inline]
    pub fn vehicle_type(&self, id: VehicleTypeId) -> &VehicleType {
        &self.vehicle_types[id.value()]
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    #[inline]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[inline]
    pub fn vehicle_types(&self) -> &[VehicleType] {
        &self.vehicle_types
    }

    #[inline]
    pub fn stop_nodes(&self) -> &[NodeId] {
        &self.stop_nodes
    }

    #[inline]
    pub fn boarding_nodes(&self) -> &[NodeId] {
        &self.boarding_nodes
    }

    #[inline]
    pub fn population_nodes(&self) -> &[NodeId] {
        &self.population_nodes
    }

    #[inline]
    pub fn facility_nodes(&self) -> &[NodeId] {
        &self.facility_nodes
    }

    #[inline]
    pub fn core_arcs(&self) -> &[ArcId] {
        &self.core_arcs
    }

    #[inline]
    pub fn line_arcs(&self) -> &[ArcId] {
        &self.line_arcs
    }

    #[inline]
    pub fn walking_arcs(&self) -> &[ArcId] {
        &self.walking_arcs
    }

    #[inline]
    pub fn access_arcs(&self) -> &[ArcId] {
        &self.access_arcs
    }

    /// Position of a node in the stop list, if it is a stop.
    #[inline]
    pub fn stop_position(&self, id: NodeId) -> Option<usize> {
        self.stop_position[id.value()]
    }
}

/// Validation failure while assembling a [`Network`].
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    UnknownNode { arc: ArcId, node: usize },
    UnknownLine { arc: ArcId, line: usize },
    UnknownVehicleType { line: LineId, vehicle_type: usize },
    MissingLine { arc: ArcId, kind: ArcKind },
    NegativeCost { arc: ArcId, cost: f64 },
    DemandEndpointNotStop { node: NodeId },
    NegativeDemand { origin: NodeId, destination: NodeId, volume: f64 },
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::UnknownNode { arc, node } => {
                write!(f, "arc {} references unknown node {}", arc, node)
            }
            NetworkError::UnknownLine { arc, line } => {
                write!(f, "arc {} references unknown line {}", arc, line)
            }
            NetworkError::UnknownVehicleType { line, vehicle_type } => {
                write!(f, "line {} references unknown vehicle type {}", line, vehicle_type)
            }
            NetworkError::MissingLine { arc, kind } => {
                write!(f, "{:?} arc {} carries no line", kind, arc)
            }
            NetworkError::NegativeCost { arc, cost } => {
                write!(f, "arc {} has negative cost {}", arc, cost)
            }
            NetworkError::DemandEndpointNotStop { node } => {
                write!(f, "demand endpoint {} is not a stop node", node)
            }
            NetworkError::NegativeDemand {
                origin,
                destination,
                volume,
            } => {
                write!(
                    f,
                    "demand {} -> {} has negative volume {}",
                    origin, destination, volume
                )
            }
        }
    }
}

impl std::error::Error for NetworkError {}

struct ArcSpec {
    kind: ArcKind,
    line: Option<usize>,
    tail: usize,
    head: usize,
    cost: f64,
}

struct LineSpec {
    vehicle_type: usize,
    min_fleet: u32,
    max_fleet: u32,
    circuit: Minutes,
    day_fraction: f64,
}

/// Assembles and validates a [`Network`].
pub struct NetworkBuilder {
    horizon: Minutes,
    nodes: Vec<(NodeKind, f64)>,
    arcs: Vec<ArcSpec>,
    lines: Vec<LineSpec>,
    vehicle_types: Vec<VehicleType>,
    demand: Vec<(usize, usize, f64)>,
}

impl NetworkBuilder {
    /// Starts a builder for a network with the given daily horizon.
    pub fn new(horizon: Minutes) -> Self {
        NetworkBuilder {
            horizon,
            nodes: Vec::new(),
            arcs: Vec::new(),
            lines: Vec::new(),
            vehicle_types: Vec::new(),
            demand: Vec::new(),
        }
    }

    pub fn add_vehicle_type(&mut self, max_fleet: u32, seating: f64) -> VehicleTypeId {
        let id = VehicleTypeId::new(self.vehicle_types.len());
        self.vehicle_types.push(VehicleType::new(max_fleet, seating));
        id
    }

    /// Adds a line. Seating is copied from the vehicle type at build
    /// time; the day horizon is the builder's.
    pub fn add_line(
        &mut self,
        vehicle_type: VehicleTypeId,
        min_fleet: u32,
        max_fleet: u32,
        circuit: Minutes,
        day_fraction: f64,
    ) -> LineId {
        let id = LineId::new(self.lines.len());
        self.lines.push(LineSpec {
            vehicle_type: vehicle_type.value(),
            min_fleet,
            max_fleet,
            circuit,
            day_fraction,
        });
        id
    }

    pub fn add_node(&mut self, kind: NodeKind, value: f64) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push((kind, value));
        id
    }

    /// Adds an arc. Boarding and alighting arcs receive the
    /// [`COST_EPSILON`] nudge during `build`.
    pub fn add_arc(
        &mut self,
        kind: ArcKind,
        line: Option<LineId>,
        tail: NodeId,
        head: NodeId,
        cost: Minutes,
    ) -> ArcId {
        let id = ArcId::new(self.arcs.len());
        self.arcs.push(ArcSpec {
            kind,
            line: line.map(|l| l.value()),
            tail: tail.value(),
            head: head.value(),
            cost: cost.value(),
        });
        id
    }

    /// Records travel demand from one stop to another.
    pub fn set_demand(&mut self, origin: NodeId, destination: NodeId, volume: f64) {
        self.demand.push((origin.value(), destination.value(), volume));
    }

    /// Validates the staged objects and wires the index lists.
    pub fn build(self) -> Result<Network, NetworkError> {
        let mut nodes: Vec<Node> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &(kind, value))| Node {
                id: NodeId::new(i),
                kind,
                value,
                core_out: Vec::new(),
                core_in: Vec::new(),
                access_out: Vec::new(),
                incoming_demand: Vec::new(),
            })
            .collect();

        let mut lines: Vec<Line> = Vec::with_capacity(self.lines.len());
        for (i, spec) in self.lines.iter().enumerate() {
            let vt = self
                .vehicle_types
                .get(spec.vehicle_type)
                .ok_or(NetworkError::UnknownVehicleType {
                    line: LineId::new(i),
                    vehicle_type: spec.vehicle_type,
                })?;
            lines.push(Line {
                vehicle_type: VehicleTypeId::new(spec.vehicle_type),
                min_fleet: spec.min_fleet,
                max_fleet: spec.max_fleet,
                circuit: spec.circuit,
                seating: vt.seating(),
                day_fraction: spec.day_fraction,
                day_horizon: self.horizon,
                boarding: Vec::new(),
                in_vehicle: Vec::new(),
            });
        }

        let mut arcs: Vec<Arc> = Vec::with_capacity(self.arcs.len());
        let mut core_arcs = Vec::new();
        let mut line_arcs = Vec::new();
        let mut walking_arcs = Vec::new();
        let mut access_arcs = Vec::new();

        for (i, spec) in self.arcs.iter().enumerate() {
            let id = ArcId::new(i);
            if spec.tail >= nodes.len() {
                return Err(NetworkError::UnknownNode { arc: id, node: spec.tail });
            }
            if spec.head >= nodes.len() {
                return Err(NetworkError::UnknownNode { arc: id, node: spec.head });
            }
            if spec.cost < 0.0 {
                return Err(NetworkError::NegativeCost { arc: id, cost: spec.cost });
            }
            let line = match spec.line {
                Some(l) if l >= lines.len() => {
                    return Err(NetworkError::UnknownLine { arc: id, line: l });
                }
                other => other.map(LineId::new),
            };
            if line.is_none() && matches!(spec.kind, ArcKind::Line | ArcKind::Boarding) {
                return Err(NetworkError::MissingLine { arc: id, kind: spec.kind });
            }

            let mut cost = spec.cost;
            if matches!(spec.kind, ArcKind::Boarding | ArcKind::Alighting) {
                cost += COST_EPSILON;
            }

            arcs.push(Arc {
                id,
                kind: spec.kind,
                line,
                tail: NodeId::new(spec.tail),
                head: NodeId::new(spec.head),
                cost: Minutes::new(cost),
            });

            match spec.kind {
                ArcKind::Access => {
                    access_arcs.push(id);
                    nodes[spec.tail].access_out.push(id);
                }
                kind => {
                    core_arcs.push(id);
                    nodes[spec.tail].core_out.push(id);
                    nodes[spec.head].core_in.push(id);
                    match kind {
                        ArcKind::Line => {
                            line_arcs.push(id);
                            let line = line.expect("validated above");
                            lines[line.value()].in_vehicle.push(id);
                        }
                        ArcKind::Boarding => {
                            let line = line.expect("validated above");
                            lines[line.value()].boarding.push(id);
                        }
                        ArcKind::Walking => walking_arcs.push(id),
                        _ => {}
                    }
                }
            }
        }

        let mut stop_nodes = Vec::new();
        let mut boarding_nodes = Vec::new();
        let mut population_nodes = Vec::new();
        let mut facility_nodes = Vec::new();
        let mut stop_position = vec![None; nodes.len()];
        for node in &nodes {
            match node.kind {
                NodeKind::Stop => {
                    stop_position[node.id.value()] = Some(stop_nodes.len());
                    stop_nodes.push(node.id);
                }
                NodeKind::Boarding => boarding_nodes.push(node.id),
                NodeKind::Population => population_nodes.push(node.id),
                NodeKind::Facility => facility_nodes.push(node.id),
            }
        }

        for id in &stop_nodes {
            nodes[id.value()].incoming_demand = vec![0.0; stop_nodes.len()];
        }
        for &(origin, destination, volume) in &self.demand {
            if volume < 0.0 {
                return Err(NetworkError::NegativeDemand {
                    origin: NodeId::new(origin),
                    destination: NodeId::new(destination),
                    volume,
                });
            }
            let origin_pos = stop_position
                .get(origin)
                .copied()
                .flatten()
                .ok_or(NetworkError::DemandEndpointNotStop {
                    node: NodeId::new(origin),
                })?;
            if stop_position.get(destination).copied().flatten().is_none() {
                return Err(NetworkError::DemandEndpointNotStop {
                    node: NodeId::new(destination),
                });
            }
            nodes[destination].incoming_demand[origin_pos] = volume;
        }

        Ok(Network {
            nodes,
            arcs,
            lines,
            vehicle_types: self.vehicle_types,
            stop_nodes,
            boarding_nodes,
            population_nodes,
            facility_nodes,
            core_arcs,
            line_arcs,
            walking_arcs,
            access_arcs,
            stop_position,
        })
    }
}
