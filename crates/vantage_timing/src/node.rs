//! Pin-level timing events.
//!
//! A [`PathNode`] is one pin visited along a timing path or collected into a
//! cone. Nodes live in a [`NodeArena`] owned by their `PathRecord` or cone
//! map; cross-links between nodes (`paired_nodes`, `instance_node`) are
//! [`NodeId`]s into that same arena, never owning references.

use crate::engine::EngineContext;
use crate::database::DesignDatabase;
use crate::error::{QueryError, QueryResult};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::ops::Index;
use vantage_common::{AnalysisPoint, Arena, DbPin, InstanceId, NodeId, PinId, Rect};

/// Role and polarity flags fixed when a node is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NodeFlags {
    /// The node is on the clock network.
    pub is_clock: bool,
    /// The transition at the node is rising.
    pub is_rising: bool,
    /// The pin is a load (sink) of its net; otherwise it is a source.
    pub is_sink: bool,
}

/// Timing quantities of a node, in engine units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NodeValues {
    /// Arrival time.
    pub arrival: f64,
    /// Incremental delay.
    pub delay: f64,
    /// Transition time.
    pub slew: f64,
    /// Capacitive load.
    pub load: f64,
}

/// One pin visited along a timing path or cone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathNode {
    pin: DbPin,
    sta_pin: PinId,
    is_clock: bool,
    is_rising: bool,
    is_sink: bool,
    has_values: bool,
    arrival: f64,
    delay: f64,
    slew: f64,
    load: f64,
    path_slack: f64,
    fanout: usize,
    paired_nodes: BTreeSet<NodeId>,
    instance_node: Option<NodeId>,
}

impl PathNode {
    /// Creates a topological placeholder without timing values.
    pub fn placeholder(pin: DbPin, sta_pin: PinId, flags: NodeFlags) -> Self {
        Self {
            pin,
            sta_pin,
            is_clock: flags.is_clock,
            is_rising: flags.is_rising,
            is_sink: flags.is_sink,
            has_values: false,
            arrival: 0.0,
            delay: 0.0,
            slew: 0.0,
            load: 0.0,
            path_slack: 0.0,
            fanout: 0,
            paired_nodes: BTreeSet::new(),
            instance_node: None,
        }
    }

    /// Creates a node carrying a timing snapshot.
    pub fn with_values(
        pin: DbPin,
        sta_pin: PinId,
        flags: NodeFlags,
        values: NodeValues,
        fanout: usize,
    ) -> Self {
        Self {
            has_values: true,
            arrival: values.arrival,
            delay: values.delay,
            slew: values.slew,
            load: values.load,
            fanout,
            ..Self::placeholder(pin, sta_pin, flags)
        }
    }

    /// Builds a standalone node from one pin's current timing snapshot.
    ///
    /// Role flags come from the pin's place in its net and instance: a load
    /// of its net is a sink, a pin on the clock network is a clock node.
    /// When the engine has no value for the pin the node is a placeholder.
    pub fn from_pin(ctx: EngineContext<'_>, pin: PinId, point: AnalysisPoint) -> QueryResult<Self> {
        if !ctx.engine.contains_pin(pin) {
            return Err(QueryError::UnknownPin(pin));
        }
        let db_pin = ctx.db.db_pin(pin).ok_or(QueryError::UnmappedPin(pin))?;
        let is_sink = ctx.engine.is_load_pin(pin);
        let fanout = if is_sink { 0 } else { ctx.fanout_of(pin) };
        let mut flags = NodeFlags {
            is_clock: ctx.engine.is_clock_pin(pin),
            is_rising: false,
            is_sink,
        };

        let node = match ctx.engine.pin_timing(pin, point) {
            Some(timing) => {
                flags.is_rising = timing.is_rising;
                let values = NodeValues {
                    arrival: timing.arrival,
                    delay: 0.0,
                    slew: timing.slew,
                    load: timing.load,
                };
                let mut node = Self::with_values(db_pin, pin, flags, values, fanout);
                node.path_slack = timing.slack.unwrap_or(0.0);
                node
            }
            None => {
                let mut node = Self::placeholder(db_pin, pin, flags);
                node.fanout = fanout;
                node
            }
        };
        Ok(node)
    }

    /// Database identity of the pin.
    pub fn pin(&self) -> DbPin {
        self.pin
    }

    /// Timing-graph identity of the pin.
    pub fn sta_pin(&self) -> PinId {
        self.sta_pin
    }

    /// Returns `true` if the pin is an instance terminal.
    pub fn is_pin_iterm(&self) -> bool {
        self.pin.is_iterm()
    }

    /// Returns `true` if the pin is a block terminal.
    pub fn is_pin_bterm(&self) -> bool {
        self.pin.is_bterm()
    }

    /// Returns `true` if the node is on the clock network.
    pub fn is_clock(&self) -> bool {
        self.is_clock
    }

    /// Returns `true` for a rising transition.
    pub fn is_rising_edge(&self) -> bool {
        self.is_rising
    }

    /// Returns `true` if the pin is a load of its net.
    pub fn is_sink(&self) -> bool {
        self.is_sink
    }

    /// Returns `true` if the pin drives its net.
    pub fn is_source(&self) -> bool {
        !self.is_sink
    }

    /// Returns `true` if the timing quantities are populated.
    pub fn has_values(&self) -> bool {
        self.has_values
    }

    /// Timing quantities, or `None` for a placeholder node.
    pub fn values(&self) -> Option<NodeValues> {
        self.has_values.then_some(NodeValues {
            arrival: self.arrival,
            delay: self.delay,
            slew: self.slew,
            load: self.load,
        })
    }

    /// Raw arrival; meaningless when [`has_values`](Self::has_values) is false.
    pub fn arrival(&self) -> f64 {
        self.arrival
    }

    /// Raw delay; meaningless when [`has_values`](Self::has_values) is false.
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Raw slew; meaningless when [`has_values`](Self::has_values) is false.
    pub fn slew(&self) -> f64 {
        self.slew
    }

    /// Raw load; meaningless when [`has_values`](Self::has_values) is false.
    pub fn load(&self) -> f64 {
        self.load
    }

    /// Slack of the owning path (or of the pin, for cone nodes).
    pub fn path_slack(&self) -> f64 {
        self.path_slack
    }

    /// Overrides the displayed slack.
    pub fn set_path_slack(&mut self, slack: f64) {
        self.path_slack = slack;
    }

    /// Number of loads driven by this pin.
    pub fn fanout(&self) -> usize {
        self.fanout
    }

    /// Overrides the fanout count.
    pub fn set_fanout(&mut self, fanout: usize) {
        self.fanout = fanout;
    }

    /// Shifts the arrival by `offset`. Placeholders are left untouched.
    pub(crate) fn shift_arrival(&mut self, offset: f64) {
        if self.has_values {
            self.arrival += offset;
        }
    }

    /// IDs of nodes cross-linked with this one in the owning arena.
    pub fn paired_nodes(&self) -> &BTreeSet<NodeId> {
        &self.paired_nodes
    }

    /// Drops every cross-link from this node.
    pub fn clear_paired_nodes(&mut self) {
        self.paired_nodes.clear();
    }

    /// The counterpart node on the same instance, if linked.
    pub fn instance_node(&self) -> Option<NodeId> {
        self.instance_node
    }

    /// Copies timing values and role flags into `other`.
    ///
    /// Identity (`pin`, `sta_pin`) and cross-links stay as they are on `other`.
    pub fn copy_data(&self, other: &mut PathNode) {
        other.is_clock = self.is_clock;
        other.is_rising = self.is_rising;
        other.is_sink = self.is_sink;
        other.has_values = self.has_values;
        other.arrival = self.arrival;
        other.delay = self.delay;
        other.slew = self.slew;
        other.load = self.load;
        other.path_slack = self.path_slack;
        other.fanout = self.fanout;
    }

    /// Instance owning the pin, per the database.
    pub fn instance(&self, db: &dyn DesignDatabase) -> Option<InstanceId> {
        db.pin_instance(self.pin)
    }

    /// Returns `true` if the pin belongs to an instance.
    pub fn has_instance(&self, db: &dyn DesignDatabase) -> bool {
        self.instance(db).is_some()
    }

    /// Human-readable label: `inst/pin` for instance terminals, optionally
    /// followed by ` (MASTER)`, or the port name for block terminals.
    pub fn node_name(&self, db: &dyn DesignDatabase, include_master: bool) -> String {
        let pin_name = db.pin_name(self.pin).unwrap_or_default();
        let Some(inst) = self.instance(db) else {
            return pin_name;
        };
        let inst_name = db.instance_name(inst).unwrap_or_default();
        let mut name = format!("{inst_name}/{pin_name}");
        if include_master {
            if let Some(master) = db.instance_master(inst) {
                name.push_str(&format!(" ({master})"));
            }
        }
        name
    }

    /// Name of the attached net, or an empty string for a floating pin.
    pub fn net_name(&self, db: &dyn DesignDatabase) -> String {
        db.pin_net(self.pin)
            .and_then(|net| db.net_name(net))
            .unwrap_or_default()
    }

    /// Bounding box of all pin shapes.
    pub fn pin_bbox(&self, db: &dyn DesignDatabase) -> Option<Rect> {
        Rect::bounding(&db.pin_shapes(self.pin))
    }

    /// The largest-area pin shape.
    pub fn pin_largest_box(&self, db: &dyn DesignDatabase) -> Option<Rect> {
        db.pin_shapes(self.pin).into_iter().max_by_key(Rect::area)
    }
}

/// Owning storage for the nodes of one path record or cone map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeArena {
    nodes: Arena<NodeId, PathNode>,
}

impl NodeArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a node and returns its ID.
    pub fn alloc(&mut self, node: PathNode) -> NodeId {
        self.nodes.alloc(node)
    }

    /// Looks a node up; `None` if the ID does not belong to this arena.
    pub fn get(&self, id: NodeId) -> Option<&PathNode> {
        self.nodes.try_get(id)
    }

    /// Mutable lookup; `None` if the ID does not belong to this arena.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut PathNode> {
        if self.nodes.contains(id) {
            Some(self.nodes.get_mut(id))
        } else {
            None
        }
    }

    /// Number of nodes stored.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node is stored.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over `(NodeId, &PathNode)` in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &PathNode)> {
        self.nodes.iter()
    }

    /// Cross-links two nodes in both directions.
    ///
    /// Returns `false` and changes nothing when `a == b` or either ID is
    /// foreign to this arena.
    pub fn pair(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || !self.nodes.contains(a) || !self.nodes.contains(b) {
            return false;
        }
        self.nodes[a].paired_nodes.insert(b);
        self.nodes[b].paired_nodes.insert(a);
        true
    }

    /// Points `node` at its instance counterpart `target`.
    ///
    /// Returns `false` and changes nothing when `node == target` or either
    /// ID is foreign to this arena.
    pub fn set_instance_node(&mut self, node: NodeId, target: NodeId) -> bool {
        if node == target || !self.nodes.contains(node) || !self.nodes.contains(target) {
            return false;
        }
        self.nodes[node].instance_node = Some(target);
        true
    }

    /// Keeps only the nodes in `keep`, reallocated in that order, and returns
    /// their new IDs. Links to dropped nodes are removed.
    pub(crate) fn compact(&mut self, keep: &[NodeId]) -> Vec<NodeId> {
        let mut nodes = Arena::new();
        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(keep.len());
        let mut ids = Vec::with_capacity(keep.len());
        for old in keep {
            if let Some(node) = self.nodes.try_get(*old) {
                let new = nodes.alloc(node.clone());
                remap.insert(*old, new);
                ids.push(new);
            }
        }
        for id in &ids {
            let node: &mut PathNode = &mut nodes[*id];
            node.paired_nodes = node
                .paired_nodes
                .iter()
                .filter_map(|other| remap.get(other).copied())
                .collect();
            node.instance_node = node.instance_node.and_then(|other| remap.get(&other).copied());
        }
        self.nodes = nodes;
        ids
    }

    /// Resolves the paired nodes of `id`.
    pub fn paired(&self, id: NodeId) -> impl Iterator<Item = &PathNode> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|node| node.paired_nodes.iter())
            .filter_map(|other| self.get(*other))
    }

    /// Resolves the instance counterpart of `id`.
    pub fn instance_node(&self, id: NodeId) -> Option<&PathNode> {
        self.get(id)
            .and_then(|node| node.instance_node)
            .and_then(|other| self.get(other))
    }
}

impl Index<NodeId> for NodeArena {
    type Output = PathNode;

    fn index(&self, id: NodeId) -> &PathNode {
        &self.nodes[id]
    }
}
