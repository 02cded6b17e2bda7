//! The timing engine boundary.
//!
//! [`TimingEngine`] is everything this crate consumes from the collaborator
//! that performs delay calculation and arrival/required propagation: ranked
//! path search, per-stage path walks, per-pin timing snapshots, and netlist
//! connectivity. Path handles are opaque and only valid for the engine that
//! issued them.

use crate::database::DesignDatabase;
use std::collections::BTreeSet;
use vantage_common::{AnalysisPoint, CornerId, InstanceId, NetId, PathHandle, PinId};

/// An OR-set of acceptable pins for one hop of a path search.
pub type PinSet = BTreeSet<PinId>;

/// A bounded critical-path search request.
///
/// An empty `from` or `to` set leaves that end unconstrained. Each entry in
/// `thrus` must be matched by some stage of the path, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSearch {
    /// Acceptable start points.
    pub from: PinSet,
    /// Through-groups applied in order.
    pub thrus: Vec<PinSet>,
    /// Acceptable end points.
    pub to: PinSet,
    /// Corner and analysis direction.
    pub point: AnalysisPoint,
    /// Upper bound on the number of returned handles.
    pub max_paths: usize,
    /// Whether paths without a timing check qualify.
    pub unconstrained: bool,
}

/// Path-level scalars reported by the engine for one path handle.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSummary {
    /// Clock launching the path, if any.
    pub start_clock: Option<String>,
    /// Clock capturing the path, if any.
    pub end_clock: Option<String>,
    /// Required minus arrival; `f64::INFINITY` for unconstrained paths.
    pub slack: f64,
    /// Data arrival time at the end point.
    pub arrival: f64,
    /// Required time at the end point.
    pub required: f64,
    /// Total delay from start point to end point.
    pub path_delay: f64,
}

/// One stage of a path walk, source to sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStage {
    /// Pin visited at this stage.
    pub pin: PinId,
    /// The stage belongs to the clock network.
    pub is_clock: bool,
    /// The transition at this stage is rising.
    pub is_rising: bool,
    /// The pin is a load of its net at this stage.
    pub is_sink: bool,
    /// Arrival time at this stage.
    pub arrival: f64,
    /// Incremental delay of this stage.
    pub delay: f64,
    /// Transition time at this stage.
    pub slew: f64,
    /// Capacitive load seen at this stage.
    pub load: f64,
}

/// The capture clock path competing with a launch path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapturePath {
    /// Handle of the capture clock path.
    pub path: PathHandle,
    /// Shift that moves capture arrivals into the launch path's time frame.
    pub offset: f64,
}

/// Instantaneous timing snapshot of one pin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinTiming {
    /// Worst arrival time at the pin.
    pub arrival: f64,
    /// Transition time of the worst arrival.
    pub slew: f64,
    /// Capacitive load on the pin's net.
    pub load: f64,
    /// The worst arrival is a rising transition.
    pub is_rising: bool,
    /// Worst slack through the pin, if the pin is constrained.
    pub slack: Option<f64>,
}

/// Direction of a cell arc lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcDirection {
    /// From an input pin to the outputs it drives.
    Forward,
    /// From an output pin to the inputs driving it.
    Backward,
}

/// Operations consumed from the collaborator timing engine.
pub trait TimingEngine {
    /// Returns the corner used when none is configured.
    fn default_corner(&self) -> Option<CornerId>;

    /// Resolves a corner by name.
    fn find_corner(&self, name: &str) -> Option<CornerId>;

    /// Returns the name of a corner.
    fn corner_name(&self, corner: CornerId) -> Option<String>;

    /// Runs a bounded path search and returns handles ranked most critical first.
    fn find_paths(&self, search: &PathSearch) -> Vec<PathHandle>;

    /// Returns path-level scalars, or `None` for an unknown handle.
    fn path_summary(&self, path: PathHandle) -> Option<PathSummary>;

    /// Walks a path source to sink, or returns `None` for an unknown handle.
    fn path_stages(&self, path: PathHandle) -> Option<Vec<PathStage>>;

    /// Returns the capture clock path of a launch path, if it has one.
    fn capture_path(&self, path: PathHandle) -> Option<CapturePath>;

    /// Returns the pin's timing values, or `None` when nothing is computable.
    fn pin_timing(&self, pin: PinId, point: AnalysisPoint) -> Option<PinTiming>;

    /// Returns `true` if the engine knows this pin.
    fn contains_pin(&self, pin: PinId) -> bool;

    /// Returns the net attached to a pin; `None` for a floating pin.
    fn pin_net(&self, pin: PinId) -> Option<NetId>;

    /// Returns the pins driving a net.
    fn net_drivers(&self, net: NetId) -> Vec<PinId>;

    /// Returns the pins loading a net.
    fn net_loads(&self, net: NetId) -> Vec<PinId>;

    /// Returns the instance owning a pin; `None` for block terminals.
    fn pin_instance(&self, pin: PinId) -> Option<InstanceId>;

    /// Returns `true` if the pin is a load (sink) of its net.
    fn is_load_pin(&self, pin: PinId) -> bool;

    /// Returns `true` if the pin is part of the clock network.
    fn is_clock_pin(&self, pin: PinId) -> bool;

    /// Returns the pins on the same instance reachable through a cell arc.
    fn instance_arcs(&self, pin: PinId, direction: ArcDirection) -> Vec<PinId>;
}

/// The pair of collaborators a query runs against.
#[derive(Clone, Copy)]
pub struct EngineContext<'a> {
    /// The timing engine.
    pub engine: &'a dyn TimingEngine,
    /// The design database.
    pub db: &'a dyn DesignDatabase,
}

impl<'a> EngineContext<'a> {
    /// Bundles an engine and a database.
    pub fn new(engine: &'a dyn TimingEngine, db: &'a dyn DesignDatabase) -> Self {
        Self { engine, db }
    }

    /// Number of loads on the net a pin drives; 0 for floating pins.
    pub fn fanout_of(&self, pin: PinId) -> usize {
        self.engine
            .pin_net(pin)
            .map_or(0, |net| {
                self.engine
                    .net_loads(net)
                    .into_iter()
                    .filter(|load| *load != pin)
                    .count()
            })
    }
}

impl std::fmt::Debug for EngineContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext").finish_non_exhaustive()
    }
}
