//! Timing path records.
//!
//! A [`PathRecord`] holds the launch path (`path_nodes`) and the competing
//! capture clock path (`capture_nodes`) of one engine path, plus path-level
//! scalars. Both sequences share one [`NodeArena`], so a launch node and a
//! capture node on the same clock-tree pin can be cross-linked.

use crate::database::DesignDatabase;
use crate::engine::{EngineContext, PathStage, PathSummary};
use crate::error::{QueryError, QueryResult};
use crate::node::{NodeArena, NodeFlags, NodeValues, PathNode};
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;
use vantage_common::{AnalysisPoint, DbPin, NodeId, PathHandle, PinId};

/// One timing path: launch nodes, capture nodes and path-level scalars.
#[derive(Debug, Clone, Serialize)]
pub struct PathRecord {
    nodes: NodeArena,
    path_nodes: Vec<NodeId>,
    capture_nodes: Vec<NodeId>,
    start_clock: Option<String>,
    end_clock: Option<String>,
    slack: f64,
    path_delay: f64,
    arrival_time: f64,
    required_time: f64,
    clk_path_end_index: i32,
    clk_capture_end_index: i32,
}

impl Default for PathRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl PathRecord {
    /// Creates an empty record. Both clock-end indices start at `-1`.
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            path_nodes: Vec::new(),
            capture_nodes: Vec::new(),
            start_clock: None,
            end_clock: None,
            slack: 0.0,
            path_delay: 0.0,
            arrival_time: 0.0,
            required_time: 0.0,
            clk_path_end_index: -1,
            clk_capture_end_index: -1,
        }
    }

    /// Copies the engine's path-level scalars into the record.
    pub fn apply_summary(&mut self, summary: PathSummary) {
        self.start_clock = summary.start_clock;
        self.end_clock = summary.end_clock;
        self.slack = summary.slack;
        self.arrival_time = summary.arrival;
        self.required_time = summary.required;
        self.path_delay = summary.path_delay;
    }

    /// Clock launching the path, if any.
    pub fn start_clock(&self) -> Option<&str> {
        self.start_clock.as_deref()
    }

    /// Sets the launching clock.
    pub fn set_start_clock(&mut self, name: Option<String>) {
        self.start_clock = name;
    }

    /// Clock capturing the path, if any.
    pub fn end_clock(&self) -> Option<&str> {
        self.end_clock.as_deref()
    }

    /// Sets the capturing clock.
    pub fn set_end_clock(&mut self, name: Option<String>) {
        self.end_clock = name;
    }

    /// Required minus arrival; infinite for an unconstrained path.
    pub fn slack(&self) -> f64 {
        self.slack
    }

    /// Sets the path slack.
    pub fn set_slack(&mut self, slack: f64) {
        self.slack = slack;
    }

    /// Start to end delay.
    pub fn path_delay(&self) -> f64 {
        self.path_delay
    }

    /// Sets the start to end delay.
    pub fn set_path_delay(&mut self, delay: f64) {
        self.path_delay = delay;
    }

    /// Data arrival at the end point.
    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    /// Sets the data arrival.
    pub fn set_arrival_time(&mut self, arrival: f64) {
        self.arrival_time = arrival;
    }

    /// Required time at the end point.
    pub fn required_time(&self) -> f64 {
        self.required_time
    }

    /// Sets the required time.
    pub fn set_required_time(&mut self, required: f64) {
        self.required_time = required;
    }

    /// Position in `path_nodes` where the clock portion ends.
    pub fn clk_path_end_index(&self) -> i32 {
        self.clk_path_end_index
    }

    /// Position in `capture_nodes` where the clock portion ends.
    pub fn clk_capture_end_index(&self) -> i32 {
        self.clk_capture_end_index
    }

    /// Launch path nodes, source to sink.
    pub fn path_nodes(
        &self,
    ) -> impl DoubleEndedIterator<Item = &PathNode> + ExactSizeIterator + '_ {
        self.path_nodes.iter().map(move |id| &self.nodes[*id])
    }

    /// Capture clock path nodes, source to sink.
    pub fn capture_nodes(
        &self,
    ) -> impl DoubleEndedIterator<Item = &PathNode> + ExactSizeIterator + '_ {
        self.capture_nodes.iter().map(move |id| &self.nodes[*id])
    }

    /// Arena IDs of the launch path nodes.
    pub fn path_node_ids(&self) -> &[NodeId] {
        &self.path_nodes
    }

    /// Arena IDs of the capture path nodes.
    pub fn capture_node_ids(&self) -> &[NodeId] {
        &self.capture_nodes
    }

    /// The arena owning every node of this record.
    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    /// Looks up a node of this record by ID.
    pub fn node(&self, id: NodeId) -> Option<&PathNode> {
        self.nodes.get(id)
    }

    /// Walks `path` and replaces `path_nodes` with one node per stage.
    ///
    /// With `clock_expanded == false` every run of consecutive clock stages
    /// is reduced to its first and last stage. `capture_nodes` keeps its nodes;
    /// the previous launch nodes and their links are dropped.
    pub fn populate_path(
        &mut self,
        path: PathHandle,
        ctx: EngineContext<'_>,
        point: AnalysisPoint,
        clock_expanded: bool,
    ) -> QueryResult<()> {
        let fresh = self.populate_node_list(path, ctx, point, 0.0, clock_expanded)?;
        self.replace_side(fresh, true);
        Ok(())
    }

    /// Walks the capture clock path and replaces `capture_nodes`.
    ///
    /// `offset` is added to the arrival of every capture node, moving the
    /// capture clock into the launch path's time frame.
    pub fn populate_capture_path(
        &mut self,
        path: PathHandle,
        ctx: EngineContext<'_>,
        point: AnalysisPoint,
        offset: f64,
        clock_expanded: bool,
    ) -> QueryResult<()> {
        let fresh = self.populate_node_list(path, ctx, point, offset, clock_expanded)?;
        self.replace_side(fresh, false);
        Ok(())
    }

    fn populate_node_list(
        &mut self,
        path: PathHandle,
        ctx: EngineContext<'_>,
        point: AnalysisPoint,
        offset: f64,
        clock_expanded: bool,
    ) -> QueryResult<Vec<NodeId>> {
        let stages = ctx
            .engine
            .path_stages(path)
            .ok_or(QueryError::UnknownPath(path))?;
        trace!(
            path = path.as_raw(),
            corner = point.corner.as_raw(),
            min_max = ?point.min_max,
            stages = stages.len(),
            clock_expanded,
            "walking path"
        );
        let keep = stage_mask(&stages, clock_expanded);

        // Resolve every kept stage first so a bad pin leaves the record untouched.
        let mut resolved: Vec<(PathStage, DbPin)> = Vec::with_capacity(stages.len());
        for (stage, _) in stages.iter().zip(&keep).filter(|(_, keep)| **keep) {
            let db_pin = ctx
                .db
                .db_pin(stage.pin)
                .ok_or(QueryError::UnmappedPin(stage.pin))?;
            resolved.push((*stage, db_pin));
        }

        let mut ids = Vec::with_capacity(resolved.len());
        for (stage, db_pin) in resolved {
            let fanout = if stage.is_sink { 0 } else { ctx.fanout_of(stage.pin) };
            let mut node = PathNode::with_values(
                db_pin,
                stage.pin,
                NodeFlags {
                    is_clock: stage.is_clock,
                    is_rising: stage.is_rising,
                    is_sink: stage.is_sink,
                },
                NodeValues {
                    arrival: stage.arrival,
                    delay: stage.delay,
                    slew: stage.slew,
                    load: stage.load,
                },
                fanout,
            );
            node.shift_arrival(offset);
            ids.push(self.nodes.alloc(node));
        }

        self.link_instance_nodes(&ids, ctx.db);
        Ok(ids)
    }

    /// Installs `fresh` as the launch or capture sequence and drops the nodes
    /// it replaces from the arena.
    fn replace_side(&mut self, fresh: Vec<NodeId>, launch: bool) {
        let mut keep = if launch {
            self.capture_nodes.clone()
        } else {
            self.path_nodes.clone()
        };
        let split = keep.len();
        keep.extend(fresh);
        let mut kept = self.nodes.compact(&keep);
        let fresh = kept.split_off(split);
        if launch {
            self.capture_nodes = kept;
            self.path_nodes = fresh;
        } else {
            self.path_nodes = kept;
            self.capture_nodes = fresh;
        }
    }

    /// Links each input node with the output node that follows it on the same instance.
    fn link_instance_nodes(&mut self, ids: &[NodeId], db: &dyn DesignDatabase) {
        for pair in ids.windows(2) {
            let (input, output) = (pair[0], pair[1]);
            let (Some(a), Some(b)) = (self.nodes.get(input), self.nodes.get(output)) else {
                continue;
            };
            if !(a.is_sink() && b.is_source()) {
                continue;
            }
            let same_instance = match (a.instance(db), b.instance(db)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            };
            if same_instance {
                self.nodes.set_instance_node(input, output);
                self.nodes.set_instance_node(output, input);
            }
        }
    }

    /// Cross-links launch and capture nodes that sit on the same pin.
    ///
    /// These are the clock-tree pins shared by the launch and capture clocks.
    pub fn pair_common_nodes(&mut self) {
        let launch: HashMap<PinId, NodeId> = self
            .path_nodes
            .iter()
            .filter_map(|id| self.nodes.get(*id).map(|n| (n.sta_pin(), *id)))
            .collect();
        let pairs: Vec<(NodeId, NodeId)> = self
            .capture_nodes
            .iter()
            .filter_map(|id| {
                let pin = self.nodes.get(*id)?.sta_pin();
                launch.get(&pin).map(|launch_id| (*launch_id, *id))
            })
            .collect();
        for (a, b) in pairs {
            self.nodes.pair(a, b);
        }
    }

    /// Caches the clock-end index of both node sequences.
    pub fn compute_clk_end_index(&mut self) {
        self.clk_path_end_index = clock_end_index(self.path_nodes());
        self.clk_capture_end_index = clock_end_index(self.capture_nodes());
    }

    /// Pushes the record's slack into every launch node.
    pub fn set_slack_on_path_nodes(&mut self) {
        let slack = self.slack;
        for id in &self.path_nodes {
            if let Some(node) = self.nodes.get_mut(*id) {
                node.set_path_slack(slack);
            }
        }
    }

    /// Label of the first launch node: its instance name, or its pin name
    /// for a block terminal. Empty when the path has no nodes.
    pub fn start_stage_name(&self, db: &dyn DesignDatabase) -> String {
        self.path_nodes()
            .next()
            .map(|node| stage_name(node, db))
            .unwrap_or_default()
    }

    /// Label of the last launch node. Empty when the path has no nodes.
    pub fn end_stage_name(&self, db: &dyn DesignDatabase) -> String {
        self.path_nodes()
            .next_back()
            .map(|node| stage_name(node, db))
            .unwrap_or_default()
    }
}

fn stage_name(node: &PathNode, db: &dyn DesignDatabase) -> String {
    match node.instance(db).and_then(|inst| db.instance_name(inst)) {
        Some(name) => name,
        None => node.node_name(db, false),
    }
}

/// Index of the first non-clock node; the length if all nodes are clock
/// nodes; `-1` for an empty sequence.
pub fn clock_end_index<'a>(nodes: impl ExactSizeIterator<Item = &'a PathNode>) -> i32 {
    let len = nodes.len();
    if len == 0 {
        return -1;
    }
    let mut index = len;
    for (i, node) in nodes.enumerate() {
        if !node.is_clock() {
            index = i;
            break;
        }
    }
    index as i32
}

/// Which stages become nodes. Collapsed clock runs keep only their ends.
fn stage_mask(stages: &[PathStage], clock_expanded: bool) -> Vec<bool> {
    if clock_expanded {
        return vec![true; stages.len()];
    }
    stages
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            if !stage.is_clock {
                return true;
            }
            let prev_clock = i > 0 && stages[i - 1].is_clock;
            let next_clock = stages.get(i + 1).is_some_and(|s| s.is_clock);
            !(prev_clock && next_clock)
        })
        .collect()
}
