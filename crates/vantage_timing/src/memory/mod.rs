//! An in-memory design implementing both collaborator traits.
//!
//! [`MemoryDesign`] holds a flat netlist, per-pin timing snapshots and a list
//! of precomputed paths. It performs no delay calculation: path search only
//! filters and ranks the stored paths. It backs the tests and lets the query
//! layer run against designs exported as JSON ([`DesignSnapshot`]).

mod builder;
mod search;
mod snapshot;

pub use builder::DesignBuilder;
pub use snapshot::{
    CaptureSpec, DesignSnapshot, InstancePinSpec, InstanceSpec, NetSpec, PathSpec, PinDirection,
    PinTimingSpec, PortSpec, SnapshotError, StageSpec,
};

use crate::database::DesignDatabase;
use crate::engine::{
    ArcDirection, CapturePath, PathSearch, PathStage, PathSummary, PinTiming, TimingEngine,
};
use std::collections::HashMap;
use vantage_common::{
    AnalysisPoint, Arena, BTermId, CornerId, DbPin, ITermId, Ident, InstanceId, Interner, NetId,
    PathHandle, PinId, Rect,
};

#[derive(Debug)]
pub(crate) struct InstanceData {
    pub(crate) name: Ident,
    pub(crate) master: Ident,
    pub(crate) sequential: bool,
    pub(crate) pins: Vec<PinId>,
    /// Explicit `(input, output)` arcs; derived from directions when empty.
    pub(crate) arcs: Vec<(PinId, PinId)>,
}

#[derive(Debug)]
pub(crate) struct PinData {
    /// Master pin name, or port name for a block terminal.
    pub(crate) name: Ident,
    pub(crate) instance: Option<InstanceId>,
    pub(crate) db: DbPin,
    pub(crate) direction: PinDirection,
    pub(crate) clock: bool,
    pub(crate) net: Option<NetId>,
    pub(crate) shapes: Vec<Rect>,
}

impl PinData {
    fn drives(&self) -> bool {
        match (self.instance.is_some(), self.direction) {
            (_, PinDirection::Inout) => true,
            (true, dir) => dir == PinDirection::Output,
            (false, dir) => dir == PinDirection::Input,
        }
    }

    fn receives(&self) -> bool {
        match (self.instance.is_some(), self.direction) {
            (_, PinDirection::Inout) => true,
            (true, dir) => dir == PinDirection::Input,
            (false, dir) => dir == PinDirection::Output,
        }
    }
}

#[derive(Debug)]
pub(crate) struct NetData {
    pub(crate) name: Ident,
    pub(crate) pins: Vec<PinId>,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredPath {
    pub(crate) point: AnalysisPoint,
    pub(crate) summary: PathSummary,
    pub(crate) stages: Vec<PathStage>,
    pub(crate) capture: Option<CapturePath>,
    /// Capture clock paths are reachable only through their launch path.
    pub(crate) searchable: bool,
}

/// A design held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDesign {
    pub(crate) names: Interner,
    pub(crate) corners: Arena<CornerId, Ident>,
    pub(crate) instances: Arena<InstanceId, InstanceData>,
    pub(crate) pins: Arena<PinId, PinData>,
    pub(crate) iterms: Arena<ITermId, PinId>,
    pub(crate) bterms: Arena<BTermId, PinId>,
    pub(crate) nets: Arena<NetId, NetData>,
    pub(crate) timing: HashMap<(PinId, AnalysisPoint), PinTiming>,
    pub(crate) paths: Arena<PathHandle, StoredPath>,
    pub(crate) pin_lookup: HashMap<String, PinId>,
    pub(crate) instance_lookup: HashMap<String, InstanceId>,
}

impl MemoryDesign {
    /// Loads a design from its JSON snapshot.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: DesignSnapshot = serde_json::from_str(text)?;
        Self::from_snapshot(&snapshot)
    }

    /// Builds a design from a parsed snapshot.
    pub fn from_snapshot(snapshot: &DesignSnapshot) -> Result<Self, SnapshotError> {
        DesignBuilder::from_snapshot(snapshot)
    }

    /// Resolves a pin by full name (`inst/pin`, or the port name).
    pub fn find_pin(&self, name: &str) -> Option<PinId> {
        self.pin_lookup.get(name).copied()
    }

    /// Resolves an instance by name.
    pub fn find_instance(&self, name: &str) -> Option<InstanceId> {
        self.instance_lookup.get(name).copied()
    }

    /// Full name of a pin.
    pub fn pin_full_name(&self, pin: PinId) -> Option<String> {
        let data = self.pins.try_get(pin)?;
        let pin_name = self.names.resolve(data.name);
        Some(match data.instance {
            Some(inst) => {
                let inst_name = self.names.resolve(self.instances.get(inst).name);
                format!("{inst_name}/{pin_name}")
            }
            None => pin_name.to_string(),
        })
    }

    /// Number of timing pins.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Number of stored paths, capture paths included.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    fn pin(&self, pin: PinId) -> Option<&PinData> {
        self.pins.try_get(pin)
    }

    fn db_to_sta(&self, pin: DbPin) -> Option<PinId> {
        match pin {
            DbPin::ITerm(id) => self.iterms.try_get(id).copied(),
            DbPin::BTerm(id) => self.bterms.try_get(id).copied(),
        }
    }

    fn db_data(&self, pin: DbPin) -> Option<&PinData> {
        self.db_to_sta(pin).and_then(|id| self.pin(id))
    }

    fn net_pins_where(&self, net: NetId, pred: impl Fn(&PinData) -> bool) -> Vec<PinId> {
        self.nets.try_get(net).map_or_else(Vec::new, |data| {
            data.pins
                .iter()
                .copied()
                .filter(|p| self.pin(*p).is_some_and(&pred))
                .collect()
        })
    }
}

impl TimingEngine for MemoryDesign {
    fn default_corner(&self) -> Option<CornerId> {
        self.corners.iter().next().map(|(id, _)| id)
    }

    fn find_corner(&self, name: &str) -> Option<CornerId> {
        let ident = self.names.get(name)?;
        self.corners
            .iter()
            .find(|(_, corner)| **corner == ident)
            .map(|(id, _)| id)
    }

    fn corner_name(&self, corner: CornerId) -> Option<String> {
        self.corners
            .try_get(corner)
            .map(|ident| self.names.resolve(*ident).to_string())
    }

    fn find_paths(&self, search: &PathSearch) -> Vec<PathHandle> {
        search::find_paths(self, search)
    }

    fn path_summary(&self, path: PathHandle) -> Option<PathSummary> {
        self.paths.try_get(path).map(|p| p.summary.clone())
    }

    fn path_stages(&self, path: PathHandle) -> Option<Vec<PathStage>> {
        self.paths.try_get(path).map(|p| p.stages.clone())
    }

    fn capture_path(&self, path: PathHandle) -> Option<CapturePath> {
        self.paths.try_get(path).and_then(|p| p.capture)
    }

    fn pin_timing(&self, pin: PinId, point: AnalysisPoint) -> Option<PinTiming> {
        self.timing.get(&(pin, point)).copied()
    }

    fn contains_pin(&self, pin: PinId) -> bool {
        self.pins.contains(pin)
    }

    fn pin_net(&self, pin: PinId) -> Option<NetId> {
        self.pin(pin).and_then(|p| p.net)
    }

    fn net_drivers(&self, net: NetId) -> Vec<PinId> {
        self.net_pins_where(net, PinData::drives)
    }

    fn net_loads(&self, net: NetId) -> Vec<PinId> {
        self.net_pins_where(net, PinData::receives)
    }

    fn pin_instance(&self, pin: PinId) -> Option<InstanceId> {
        self.pin(pin).and_then(|p| p.instance)
    }

    fn is_load_pin(&self, pin: PinId) -> bool {
        self.pin(pin).is_some_and(|p| !p.drives())
    }

    fn is_clock_pin(&self, pin: PinId) -> bool {
        self.pin(pin).is_some_and(|p| p.clock)
    }

    fn instance_arcs(&self, pin: PinId, direction: ArcDirection) -> Vec<PinId> {
        let Some(data) = self.pin(pin) else {
            return Vec::new();
        };
        let Some(inst) = data.instance.and_then(|i| self.instances.try_get(i)) else {
            return Vec::new();
        };

        if !inst.arcs.is_empty() {
            return inst
                .arcs
                .iter()
                .filter_map(|(from, to)| match direction {
                    ArcDirection::Forward if *from == pin => Some(*to),
                    ArcDirection::Backward if *to == pin => Some(*from),
                    _ => None,
                })
                .collect();
        }

        let others = inst.pins.iter().copied().filter(|p| *p != pin);
        match direction {
            ArcDirection::Forward => {
                if !data.receives() || (inst.sequential && !data.clock) {
                    return Vec::new();
                }
                others
                    .filter(|p| self.pin(*p).is_some_and(PinData::drives))
                    .collect()
            }
            ArcDirection::Backward => {
                if !data.drives() {
                    return Vec::new();
                }
                others
                    .filter(|p| {
                        self.pin(*p)
                            .is_some_and(|q| q.receives() && (!inst.sequential || q.clock))
                    })
                    .collect()
            }
        }
    }
}

impl DesignDatabase for MemoryDesign {
    fn db_pin(&self, pin: PinId) -> Option<DbPin> {
        self.pin(pin).map(|p| p.db)
    }

    fn sta_pin(&self, pin: DbPin) -> Option<PinId> {
        self.db_to_sta(pin)
    }

    fn pin_name(&self, pin: DbPin) -> Option<String> {
        self.db_data(pin)
            .map(|p| self.names.resolve(p.name).to_string())
    }

    fn pin_shapes(&self, pin: DbPin) -> Vec<Rect> {
        self.db_data(pin).map_or_else(Vec::new, |p| p.shapes.clone())
    }

    fn pin_instance(&self, pin: DbPin) -> Option<InstanceId> {
        self.db_data(pin).and_then(|p| p.instance)
    }

    fn pin_net(&self, pin: DbPin) -> Option<NetId> {
        self.db_data(pin).and_then(|p| p.net)
    }

    fn instance_name(&self, inst: InstanceId) -> Option<String> {
        self.instances
            .try_get(inst)
            .map(|i| self.names.resolve(i.name).to_string())
    }

    fn instance_master(&self, inst: InstanceId) -> Option<String> {
        self.instances
            .try_get(inst)
            .map(|i| self.names.resolve(i.master).to_string())
    }

    fn net_name(&self, net: NetId) -> Option<String> {
        self.nets
            .try_get(net)
            .map(|n| self.names.resolve(n.name).to_string())
    }
}
