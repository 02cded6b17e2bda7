//! Cone-of-influence traversal and annotation.
//!
//! A cone is the set of pins reachable from a seed pin, forward through
//! driver → load net edges (fanout) or backward through load → driver edges
//! (fanin), bucketed by depth.
//!
//! Depth conventions:
//! - the seed sits at depth 0 and is never re-entered;
//! - crossing a net adds one level, crossing an instance through a cell arc
//!   does not, so a buffer's input and output share a level;
//! - every pin is recorded once, at its shortest depth (0-1 breadth-first
//!   search with a best-depth map, so feedback loops terminate);
//! - with [`ConeDirection::Both`] the fanin side is stored at negative depths.
//!
//! A pin without a net yields an empty cone.

use crate::database::DesignDatabase;
use crate::engine::{ArcDirection, EngineContext, PinSet, TimingEngine};
use crate::error::{QueryError, QueryResult};
use crate::node::{NodeArena, PathNode};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::{debug, trace};
use vantage_common::{AnalysisPoint, NodeId, PinId};
use vantage_config::ConeDirection;

/// Pins of a cone keyed by depth from the seed.
pub type PinSetByDepth = BTreeMap<i32, PinSet>;

/// Timing-annotated nodes of a cone keyed by depth from the seed.
///
/// Owns its nodes. Within one map each node is paired with the nodes on the
/// other end of its net, and input and output nodes of the same instance
/// point at each other through `instance_node`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodesByDepth {
    nodes: NodeArena,
    levels: BTreeMap<i32, Vec<NodeId>>,
}

impl NodesByDepth {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node at `depth` and returns its ID.
    pub fn push(&mut self, depth: i32, node: PathNode) -> NodeId {
        let id = self.nodes.alloc(node);
        self.levels.entry(depth).or_default().push(id);
        id
    }

    /// Depth levels present in the map, ascending.
    pub fn depths(&self) -> impl Iterator<Item = i32> + '_ {
        self.levels.keys().copied()
    }

    /// Nodes at one depth, in insertion order.
    pub fn level(&self, depth: i32) -> impl Iterator<Item = &PathNode> + '_ {
        self.levels
            .get(&depth)
            .into_iter()
            .flatten()
            .map(move |id| &self.nodes[*id])
    }

    /// IDs of the nodes at one depth.
    pub fn level_ids(&self, depth: i32) -> &[NodeId] {
        self.levels.get(&depth).map(Vec::as_slice).unwrap_or_default()
    }

    /// All `(depth, node)` pairs, shallowest level first.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &PathNode)> + '_ {
        self.levels
            .iter()
            .flat_map(move |(depth, ids)| ids.iter().map(move |id| (*depth, &self.nodes[*id])))
    }

    /// The arena owning the nodes.
    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    /// Looks up a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&PathNode> {
        self.nodes.get(id)
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the map holds no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Computes cones over the engine's connectivity and annotates them.
///
/// Traversal only reads the engine. Annotation also needs the design
/// database and fails with [`QueryError::NoDatabase`] without one.
#[derive(Clone, Copy)]
pub struct ConeBuilder<'a> {
    engine: &'a dyn TimingEngine,
    db: Option<&'a dyn DesignDatabase>,
}

impl<'a> ConeBuilder<'a> {
    /// Creates a builder over the given collaborators.
    pub fn new(ctx: EngineContext<'a>) -> Self {
        Self {
            engine: ctx.engine,
            db: Some(ctx.db),
        }
    }

    /// Creates a builder that can traverse but not annotate.
    pub fn for_engine(engine: &'a dyn TimingEngine) -> Self {
        Self { engine, db: None }
    }

    /// Pins reachable backward from `pin`, by depth.
    pub fn fanin_cone(&self, pin: PinId) -> QueryResult<PinSetByDepth> {
        self.traverse(pin, false)
    }

    /// Pins reachable forward from `pin`, by depth.
    pub fn fanout_cone(&self, pin: PinId) -> QueryResult<PinSetByDepth> {
        self.traverse(pin, true)
    }

    /// Cone in the requested direction.
    ///
    /// For [`ConeDirection::Both`] a pin reachable both ways keeps the side
    /// with the smaller absolute depth; ties go to the fanout side.
    pub fn cone(&self, pin: PinId, direction: ConeDirection) -> QueryResult<PinSetByDepth> {
        match direction {
            ConeDirection::Fanin => self.fanin_cone(pin),
            ConeDirection::Fanout => self.fanout_cone(pin),
            ConeDirection::Both => {
                let fanin = self.fanin_cone(pin)?;
                let fanout = self.fanout_cone(pin)?;
                Ok(merge_cones(&fanin, &fanout))
            }
        }
    }

    /// Traverses from `pin`, stores the pin sets into `depth_map`, and
    /// returns the annotated nodes.
    pub fn build_cone_connectivity(
        &self,
        pin: PinId,
        direction: ConeDirection,
        point: AnalysisPoint,
        depth_map: &mut PinSetByDepth,
    ) -> QueryResult<NodesByDepth> {
        *depth_map = self.cone(pin, direction)?;
        let mut nodes = NodesByDepth::new();
        self.annotate_cone_timing(point, depth_map, &mut nodes)?;
        debug!(
            seed = pin.as_raw(),
            ?direction,
            levels = depth_map.len(),
            nodes = nodes.len(),
            "built cone"
        );
        Ok(nodes)
    }

    /// Appends one timing snapshot node per pin of `depth_map` to `nodes`,
    /// then links the new nodes by net and instance connectivity.
    ///
    /// Pins without a computable value still get a node, with
    /// `has_values() == false`.
    pub fn annotate_cone_timing(
        &self,
        point: AnalysisPoint,
        depth_map: &PinSetByDepth,
        nodes: &mut NodesByDepth,
    ) -> QueryResult<()> {
        let db = self.db.ok_or(QueryError::NoDatabase)?;
        let ctx = EngineContext::new(self.engine, db);
        let mut built = Vec::new();
        for (depth, pins) in depth_map {
            for pin in pins {
                built.push((*depth, *pin, PathNode::from_pin(ctx, *pin, point)?));
            }
        }

        let mut order = Vec::with_capacity(built.len());
        let mut by_pin: HashMap<PinId, NodeId> = HashMap::with_capacity(built.len());
        for (depth, pin, node) in built {
            let id = nodes.push(depth, node);
            order.push((pin, id));
            by_pin.insert(pin, id);
        }
        self.link_connectivity(&order, &by_pin, &mut nodes.nodes);
        trace!(levels = depth_map.len(), nodes = order.len(), "annotated cone");
        Ok(())
    }

    fn link_connectivity(
        &self,
        order: &[(PinId, NodeId)],
        by_pin: &HashMap<PinId, NodeId>,
        arena: &mut NodeArena,
    ) {
        let engine = self.engine;
        for (pin, id) in order {
            if engine.is_load_pin(*pin) {
                for output in engine.instance_arcs(*pin, ArcDirection::Forward) {
                    let Some(out_id) = by_pin.get(&output) else {
                        continue;
                    };
                    if arena.get(*id).is_some_and(|n| n.instance_node().is_none()) {
                        arena.set_instance_node(*id, *out_id);
                    }
                    if arena.get(*out_id).is_some_and(|n| n.instance_node().is_none()) {
                        arena.set_instance_node(*out_id, *id);
                    }
                }
                continue;
            }
            let Some(net) = engine.pin_net(*pin) else {
                continue;
            };
            for load in engine.net_loads(net) {
                if let Some(load_id) = by_pin.get(&load) {
                    arena.pair(*id, *load_id);
                }
            }
        }
    }

    fn traverse(&self, seed: PinId, forward: bool) -> QueryResult<PinSetByDepth> {
        let engine = self.engine;
        if !engine.contains_pin(seed) {
            return Err(QueryError::UnknownPin(seed));
        }
        if engine.pin_net(seed).is_none() {
            debug!(seed = seed.as_raw(), "floating pin, empty cone");
            return Ok(PinSetByDepth::new());
        }

        let arc_direction = if forward {
            ArcDirection::Forward
        } else {
            ArcDirection::Backward
        };
        let mut best: HashMap<PinId, i32> = HashMap::new();
        let mut queue: VecDeque<(PinId, i32)> = VecDeque::new();
        best.insert(seed, 0);
        queue.push_back((seed, 0));

        while let Some((pin, depth)) = queue.pop_front() {
            if best.get(&pin).is_some_and(|d| *d < depth) {
                continue;
            }
            for next in engine.instance_arcs(pin, arc_direction) {
                if relax(&mut best, next, depth) {
                    queue.push_front((next, depth));
                }
            }
            for next in self.net_neighbors(pin, forward) {
                if relax(&mut best, next, depth + 1) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        let mut map = PinSetByDepth::new();
        for (pin, depth) in best {
            map.entry(depth).or_default().insert(pin);
        }
        trace!(
            seed = seed.as_raw(),
            forward,
            levels = map.len(),
            "cone traversal finished"
        );
        Ok(map)
    }

    /// Pins one net hop away: the loads a driver drives, or the drivers of a load.
    fn net_neighbors(&self, pin: PinId, forward: bool) -> Vec<PinId> {
        let engine = self.engine;
        let Some(net) = engine.pin_net(pin) else {
            return Vec::new();
        };
        let (ours, theirs) = if forward {
            (engine.net_drivers(net), engine.net_loads(net))
        } else {
            (engine.net_loads(net), engine.net_drivers(net))
        };
        if !ours.contains(&pin) {
            return Vec::new();
        }
        theirs.into_iter().filter(|p| *p != pin).collect()
    }
}

impl std::fmt::Debug for ConeBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConeBuilder")
            .field("has_database", &self.db.is_some())
            .finish_non_exhaustive()
    }
}

fn relax(best: &mut HashMap<PinId, i32>, pin: PinId, depth: i32) -> bool {
    match best.get(&pin) {
        Some(known) if *known <= depth => false,
        _ => {
            best.insert(pin, depth);
            true
        }
    }
}

fn merge_cones(fanin: &PinSetByDepth, fanout: &PinSetByDepth) -> PinSetByDepth {
    let mut depth_of: HashMap<PinId, i32> = HashMap::new();
    for (depth, pins) in fanout {
        for pin in pins {
            depth_of.insert(*pin, *depth);
        }
    }
    for (depth, pins) in fanin {
        for pin in pins {
            let keep_fanout = depth_of.get(pin).is_some_and(|d| *d <= *depth);
            if !keep_fanout {
                depth_of.insert(*pin, -*depth);
            }
        }
    }
    let mut map = PinSetByDepth::new();
    for (pin, depth) in depth_of {
        map.entry(depth).or_default().insert(pin);
    }
    map
}
