//! Serialized form of an in-memory design.
//!
//! Pins are referenced by full name: `inst/pin` for an instance terminal,
//! the bare port name for a block terminal.

use serde::{Deserialize, Serialize};
use vantage_common::{MinMax, Rect};

/// Signal direction of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// Receives a signal.
    Input,
    /// Drives a signal.
    Output,
    /// Both drives and receives.
    Inout,
}

/// A whole design: netlist, per-pin timing, and precomputed paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSnapshot {
    /// Corner names; the first is the default corner.
    pub corners: Vec<String>,
    /// Cell instances.
    pub instances: Vec<InstanceSpec>,
    /// Block terminals.
    pub ports: Vec<PortSpec>,
    /// Nets connecting pins by full name.
    pub nets: Vec<NetSpec>,
    /// Per-pin timing values.
    pub timing: Vec<PinTimingSpec>,
    /// Precomputed timing paths.
    pub paths: Vec<PathSpec>,
}

/// A cell instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Instance name.
    pub name: String,
    /// Library cell name.
    pub master: String,
    /// Only clock pins have arcs to the outputs of a sequential cell.
    #[serde(default)]
    pub sequential: bool,
    /// Instance terminals.
    #[serde(default)]
    pub pins: Vec<InstancePinSpec>,
    /// Explicit `(input, output)` arcs by master pin name. When empty, arcs
    /// are derived from pin directions.
    #[serde(default)]
    pub arcs: Vec<(String, String)>,
}

/// One terminal of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstancePinSpec {
    /// Master pin name.
    pub name: String,
    /// Signal direction.
    pub direction: PinDirection,
    /// The pin is on the clock network.
    #[serde(default)]
    pub clock: bool,
    /// Layout shapes.
    #[serde(default)]
    pub shapes: Vec<Rect>,
}

/// A block terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    /// Port name.
    pub name: String,
    /// Direction as seen from inside the block.
    pub direction: PinDirection,
    /// The port is on the clock network.
    #[serde(default)]
    pub clock: bool,
    /// Layout shapes.
    #[serde(default)]
    pub shapes: Vec<Rect>,
}

/// A net and the pins it connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetSpec {
    /// Net name.
    pub name: String,
    /// Full names of the connected pins.
    pub pins: Vec<String>,
}

/// Timing values of one pin at one analysis point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinTimingSpec {
    /// Full pin name.
    pub pin: String,
    /// Corner name.
    pub corner: String,
    /// Analysis direction.
    #[serde(default)]
    pub min_max: MinMax,
    /// Worst arrival.
    pub arrival: f64,
    /// Transition time.
    #[serde(default)]
    pub slew: f64,
    /// Capacitive load.
    #[serde(default)]
    pub load: f64,
    /// The worst arrival is rising.
    #[serde(default)]
    pub rising: bool,
    /// Worst slack; absent for unconstrained pins.
    #[serde(default)]
    pub slack: Option<f64>,
}

/// A precomputed path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    /// Corner name.
    pub corner: String,
    /// Analysis direction.
    #[serde(default)]
    pub min_max: MinMax,
    /// Launching clock.
    #[serde(default)]
    pub start_clock: Option<String>,
    /// Capturing clock.
    #[serde(default)]
    pub end_clock: Option<String>,
    /// Slack; absent for an unconstrained path.
    #[serde(default)]
    pub slack: Option<f64>,
    /// Data arrival at the end point.
    #[serde(default)]
    pub arrival: f64,
    /// Required time at the end point.
    #[serde(default)]
    pub required: f64,
    /// Start to end delay; the last stage arrival minus the first when absent.
    #[serde(default)]
    pub path_delay: Option<f64>,
    /// Stages, source to sink.
    pub stages: Vec<StageSpec>,
    /// Competing capture clock path.
    #[serde(default)]
    pub capture: Option<CaptureSpec>,
}

/// One stage of a precomputed path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Full pin name.
    pub pin: String,
    /// The stage is on the clock network; taken from the pin when absent.
    #[serde(default)]
    pub clock: Option<bool>,
    /// Rising transition.
    #[serde(default)]
    pub rising: bool,
    /// Arrival time.
    pub arrival: f64,
    /// Incremental delay.
    #[serde(default)]
    pub delay: f64,
    /// Transition time.
    #[serde(default)]
    pub slew: f64,
    /// Capacitive load.
    #[serde(default)]
    pub load: f64,
}

/// The capture side of a precomputed path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSpec {
    /// Shift into the launch path's time frame.
    #[serde(default)]
    pub offset: f64,
    /// Capture clock stages, source to sink.
    pub stages: Vec<StageSpec>,
}

/// Errors raised while loading a [`DesignSnapshot`].
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The JSON text is malformed.
    #[error("invalid design snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// A pin name does not resolve.
    #[error("unknown pin '{0}'")]
    UnknownPin(String),

    /// A corner name does not resolve.
    #[error("unknown corner '{0}'")]
    UnknownCorner(String),

    /// Two objects of the same kind share a name.
    #[error("duplicate name '{0}'")]
    DuplicateName(String),
}
