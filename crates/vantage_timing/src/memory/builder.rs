//! Programmatic construction of a [`MemoryDesign`].

use super::snapshot::{DesignSnapshot, PathSpec, PinDirection, SnapshotError, StageSpec};
use super::{InstanceData, MemoryDesign, NetData, PinData, StoredPath};
use crate::engine::{CapturePath, PathStage, PathSummary, PinTiming};
use std::collections::HashSet;
use vantage_common::{AnalysisPoint, CornerId, DbPin, InstanceId, NetId, PathHandle, PinId, Rect};

/// Builds a [`MemoryDesign`] one object at a time.
///
/// IDs handed out by the builder are valid in the built design.
#[derive(Debug, Default)]
pub struct DesignBuilder {
    design: MemoryDesign,
}

impl DesignBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a corner, or returns the existing one of that name. The first
    /// corner is the default.
    pub fn corner(&mut self, name: &str) -> CornerId {
        let ident = self.design.names.get_or_intern(name);
        if let Some((id, _)) = self.design.corners.iter().find(|(_, c)| **c == ident) {
            return id;
        }
        self.design.corners.alloc(ident)
    }

    /// Adds a combinational cell instance.
    pub fn instance(&mut self, name: &str, master: &str) -> InstanceId {
        let data = InstanceData {
            name: self.design.names.get_or_intern(name),
            master: self.design.names.get_or_intern(master),
            sequential: false,
            pins: Vec::new(),
            arcs: Vec::new(),
        };
        let id = self.design.instances.alloc(data);
        self.design.instance_lookup.insert(name.to_string(), id);
        id
    }

    /// Marks an instance as sequential: only its clock pins reach its outputs.
    pub fn sequential(&mut self, inst: InstanceId) {
        self.design.instances[inst].sequential = true;
    }

    /// Adds a terminal to an instance.
    pub fn pin(&mut self, inst: InstanceId, name: &str, direction: PinDirection) -> PinId {
        let id = self.design.pins.next_id();
        let iterm = self.design.iterms.alloc(id);
        let inst_name = self.design.names.resolve(self.design.instances[inst].name);
        let full_name = format!("{inst_name}/{name}");
        self.add_pin(name, Some(inst), DbPin::ITerm(iterm), direction, full_name);
        self.design.instances[inst].pins.push(id);
        id
    }

    /// Adds a clock input terminal to an instance.
    pub fn clock_pin(&mut self, inst: InstanceId, name: &str) -> PinId {
        let id = self.pin(inst, name, PinDirection::Input);
        self.mark_clock(id);
        id
    }

    /// Adds a block terminal.
    pub fn port(&mut self, name: &str, direction: PinDirection) -> PinId {
        let id = self.design.pins.next_id();
        let bterm = self.design.bterms.alloc(id);
        self.add_pin(name, None, DbPin::BTerm(bterm), direction, name.to_string());
        id
    }

    fn add_pin(
        &mut self,
        name: &str,
        instance: Option<InstanceId>,
        db: DbPin,
        direction: PinDirection,
        full_name: String,
    ) {
        let data = PinData {
            name: self.design.names.get_or_intern(name),
            instance,
            db,
            direction,
            clock: false,
            net: None,
            shapes: Vec::new(),
        };
        let id = self.design.pins.alloc(data);
        self.design.pin_lookup.insert(full_name, id);
    }

    /// Puts a pin on the clock network.
    pub fn mark_clock(&mut self, pin: PinId) {
        self.design.pins[pin].clock = true;
    }

    /// Adds a layout shape to a pin.
    pub fn shape(&mut self, pin: PinId, rect: Rect) {
        self.design.pins[pin].shapes.push(rect);
    }

    /// Adds an explicit cell arc. Once an instance has one explicit arc, its
    /// arcs are no longer derived from pin directions.
    pub fn arc(&mut self, from: PinId, to: PinId) {
        if let Some(inst) = self.design.pins[from].instance {
            self.design.instances[inst].arcs.push((from, to));
        }
    }

    /// Connects pins with a net. A pin already on another net moves to this one.
    ///
    /// A pin listed more than once is connected once.
    pub fn net(&mut self, name: &str, pins: &[PinId]) -> NetId {
        let id = self.design.nets.next_id();
        let mut members = Vec::with_capacity(pins.len());
        for pin in pins {
            if members.contains(pin) {
                continue;
            }
            if let Some(old) = self.design.pins[*pin].net.replace(id) {
                self.design.nets[old].pins.retain(|p| p != pin);
            }
            members.push(*pin);
        }
        self.design.nets.alloc(NetData {
            name: self.design.names.get_or_intern(name),
            pins: members,
        })
    }

    /// Sets the timing snapshot of a pin at one analysis point.
    pub fn pin_timing(&mut self, pin: PinId, point: AnalysisPoint, timing: PinTiming) {
        self.design.timing.insert((pin, point), timing);
    }

    /// A rising stage on `pin` with role flags taken from the netlist.
    pub fn stage(&self, pin: PinId, arrival: f64, delay: f64) -> PathStage {
        let data = &self.design.pins[pin];
        PathStage {
            pin,
            is_clock: data.clock,
            is_rising: true,
            is_sink: !data.drives(),
            arrival,
            delay,
            slew: 0.0,
            load: 0.0,
        }
    }

    /// Stores a searchable launch path.
    pub fn path(
        &mut self,
        point: AnalysisPoint,
        summary: PathSummary,
        stages: Vec<PathStage>,
    ) -> PathHandle {
        self.design.paths.alloc(StoredPath {
            point,
            summary,
            stages,
            capture: None,
            searchable: true,
        })
    }

    /// Stores the capture clock path of `launch`.
    pub fn capture(
        &mut self,
        launch: PathHandle,
        offset: f64,
        stages: Vec<PathStage>,
    ) -> PathHandle {
        let base = &self.design.paths[launch];
        let stored = StoredPath {
            point: base.point,
            summary: PathSummary {
                start_clock: base.summary.end_clock.clone(),
                end_clock: base.summary.end_clock.clone(),
                slack: f64::INFINITY,
                arrival: stages.last().map_or(0.0, |s| s.arrival),
                required: 0.0,
                path_delay: stage_span(&stages),
            },
            stages,
            capture: None,
            searchable: false,
        };
        let id = self.design.paths.alloc(stored);
        self.design.paths[launch].capture = Some(CapturePath { path: id, offset });
        id
    }

    /// Finishes the design.
    pub fn build(self) -> MemoryDesign {
        self.design
    }

    pub(crate) fn from_snapshot(snapshot: &DesignSnapshot) -> Result<MemoryDesign, SnapshotError> {
        let mut b = Self::new();
        for corner in &snapshot.corners {
            b.corner(corner);
        }
        for port in &snapshot.ports {
            if b.design.pin_lookup.contains_key(&port.name) {
                return Err(SnapshotError::DuplicateName(port.name.clone()));
            }
            let id = b.port(&port.name, port.direction);
            b.apply_pin_attrs(id, port.clock, &port.shapes);
        }
        for spec in &snapshot.instances {
            if b.design.instance_lookup.contains_key(&spec.name) {
                return Err(SnapshotError::DuplicateName(spec.name.clone()));
            }
            let inst = b.instance(&spec.name, &spec.master);
            if spec.sequential {
                b.sequential(inst);
            }
            for pin in &spec.pins {
                let full = format!("{}/{}", spec.name, pin.name);
                if b.design.pin_lookup.contains_key(&full) {
                    return Err(SnapshotError::DuplicateName(full));
                }
                let id = b.pin(inst, &pin.name, pin.direction);
                b.apply_pin_attrs(id, pin.clock, &pin.shapes);
            }
            for (from, to) in &spec.arcs {
                let from = b.lookup(&format!("{}/{from}", spec.name))?;
                let to = b.lookup(&format!("{}/{to}", spec.name))?;
                b.arc(from, to);
            }
        }
        let mut net_names = HashSet::with_capacity(snapshot.nets.len());
        for net in &snapshot.nets {
            if !net_names.insert(net.name.as_str()) {
                return Err(SnapshotError::DuplicateName(net.name.clone()));
            }
            let mut pins = Vec::with_capacity(net.pins.len());
            for name in &net.pins {
                let pin = b.lookup(name)?;
                if pins.contains(&pin) {
                    return Err(SnapshotError::DuplicateName(name.clone()));
                }
                pins.push(pin);
            }
            b.net(&net.name, &pins);
        }
        for spec in &snapshot.timing {
            let pin = b.lookup(&spec.pin)?;
            let point = AnalysisPoint::new(b.lookup_corner(&spec.corner)?, spec.min_max);
            b.pin_timing(
                pin,
                point,
                PinTiming {
                    arrival: spec.arrival,
                    slew: spec.slew,
                    load: spec.load,
                    is_rising: spec.rising,
                    slack: spec.slack,
                },
            );
        }
        for spec in &snapshot.paths {
            b.add_path_spec(spec)?;
        }
        Ok(b.build())
    }

    fn apply_pin_attrs(&mut self, pin: PinId, clock: bool, shapes: &[Rect]) {
        if clock {
            self.mark_clock(pin);
        }
        for rect in shapes {
            self.shape(pin, *rect);
        }
    }

    fn add_path_spec(&mut self, spec: &PathSpec) -> Result<(), SnapshotError> {
        let point = AnalysisPoint::new(self.lookup_corner(&spec.corner)?, spec.min_max);
        let stages = self.stages_from_specs(&spec.stages)?;
        let summary = PathSummary {
            start_clock: spec.start_clock.clone(),
            end_clock: spec.end_clock.clone(),
            slack: spec.slack.unwrap_or(f64::INFINITY),
            arrival: spec.arrival,
            required: spec.required,
            path_delay: spec.path_delay.unwrap_or_else(|| stage_span(&stages)),
        };
        let launch = self.path(point, summary, stages);
        if let Some(capture) = &spec.capture {
            let stages = self.stages_from_specs(&capture.stages)?;
            self.capture(launch, capture.offset, stages);
        }
        Ok(())
    }

    fn stages_from_specs(&self, specs: &[StageSpec]) -> Result<Vec<PathStage>, SnapshotError> {
        specs
            .iter()
            .map(|spec| {
                let pin = self.lookup(&spec.pin)?;
                let mut stage = self.stage(pin, spec.arrival, spec.delay);
                if let Some(clock) = spec.clock {
                    stage.is_clock = clock;
                }
                stage.is_rising = spec.rising;
                stage.slew = spec.slew;
                stage.load = spec.load;
                Ok(stage)
            })
            .collect()
    }

    fn lookup(&self, name: &str) -> Result<PinId, SnapshotError> {
        self.design
            .find_pin(name)
            .ok_or_else(|| SnapshotError::UnknownPin(name.to_string()))
    }

    fn lookup_corner(&self, name: &str) -> Result<CornerId, SnapshotError> {
        crate::engine::TimingEngine::find_corner(&self.design, name)
            .ok_or_else(|| SnapshotError::UnknownCorner(name.to_string()))
    }
}

fn stage_span(stages: &[PathStage]) -> f64 {
    match (stages.first(), stages.last()) {
        (Some(first), Some(last)) => last.arrival - first.arrival,
        _ => 0.0,
    }
}
