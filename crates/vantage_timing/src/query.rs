//! The query façade over a timing engine and a design database.
//!
//! [`PathQueryService`] owns the analysis settings and turns engine search
//! results into [`PathRecord`]s. Every query comes in two forms: one that
//! runs under the service's own [`AnalysisConfig`], and a `*_with` form that
//! takes an explicit configuration value for that call only.

use crate::cone::{ConeBuilder, NodesByDepth, PinSetByDepth};
use crate::database::DesignDatabase;
use crate::engine::{EngineContext, PathSearch, PinSet, TimingEngine};
use crate::error::{QueryError, QueryResult};
use crate::node::PathNode;
use crate::path::PathRecord;
use tracing::{debug, warn};
use vantage_common::{AnalysisPoint, MinMax, PathHandle, PinId};
use vantage_config::{AnalysisConfig, ConeConfig, ConeDirection, VantageConfig};

/// Path, pin and cone queries against a bound engine and database.
///
/// Collaborators are borrowed. A query fails with [`QueryError::NoEngine`]
/// or [`QueryError::NoDatabase`] while a collaborator it reads is unset; the
/// plain fanin and fanout cones read only the engine.
#[derive(Clone, Default)]
pub struct PathQueryService<'a> {
    engine: Option<&'a dyn TimingEngine>,
    database: Option<&'a dyn DesignDatabase>,
    analysis: AnalysisConfig,
    cone: ConeConfig,
}

impl std::fmt::Debug for PathQueryService<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathQueryService")
            .field("has_engine", &self.engine.is_some())
            .field("has_database", &self.database.is_some())
            .field("analysis", &self.analysis)
            .field("cone", &self.cone)
            .finish()
    }
}

impl<'a> PathQueryService<'a> {
    /// Creates a service with default settings and no collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service bound to an engine and a database.
    pub fn with_collaborators(
        engine: &'a dyn TimingEngine,
        database: &'a dyn DesignDatabase,
    ) -> Self {
        Self {
            engine: Some(engine),
            database: Some(database),
            ..Self::default()
        }
    }

    /// Replaces the analysis and cone settings with those of a loaded config.
    pub fn apply_config(&mut self, config: &VantageConfig) {
        self.analysis = config.analysis.clone();
        self.cone = config.cone.clone();
    }

    /// Binds or unbinds the timing engine.
    pub fn set_engine(&mut self, engine: Option<&'a dyn TimingEngine>) {
        self.engine = engine;
    }

    /// Binds or unbinds the design database.
    pub fn set_database(&mut self, database: Option<&'a dyn DesignDatabase>) {
        self.database = database;
    }

    /// The bound timing engine.
    pub fn engine(&self) -> Option<&'a dyn TimingEngine> {
        self.engine
    }

    /// The bound design database.
    pub fn database(&self) -> Option<&'a dyn DesignDatabase> {
        self.database
    }

    /// Both collaborators, or the error naming the missing one.
    pub fn context(&self) -> QueryResult<EngineContext<'a>> {
        let engine = self.engine.ok_or(QueryError::NoEngine)?;
        let db = self.database.ok_or(QueryError::NoDatabase)?;
        Ok(EngineContext::new(engine, db))
    }

    /// The service's analysis settings.
    pub fn analysis_config(&self) -> &AnalysisConfig {
        &self.analysis
    }

    /// Replaces the service's analysis settings.
    pub fn set_analysis_config(&mut self, config: AnalysisConfig) {
        self.analysis = config;
    }

    /// Name of the configured corner; `None` selects the engine default.
    pub fn corner(&self) -> Option<&str> {
        self.analysis.corner.as_deref()
    }

    /// Selects a corner by name, or the engine default with `None`.
    pub fn set_corner(&mut self, corner: Option<String>) {
        self.analysis.corner = corner;
    }

    /// Worst-case (`true`) or best-case analysis.
    pub fn use_max(&self) -> bool {
        self.analysis.use_max
    }

    /// Switches between worst-case and best-case analysis.
    pub fn set_use_max(&mut self, use_max: bool) {
        self.analysis.use_max = use_max;
    }

    /// Upper bound on paths per search.
    pub fn max_path_count(&self) -> usize {
        self.analysis.max_path_count
    }

    /// Sets the bound on paths per search.
    pub fn set_max_path_count(&mut self, count: usize) {
        self.analysis.max_path_count = count;
    }

    /// Whether unconstrained paths are reported.
    pub fn include_unconstrained_paths(&self) -> bool {
        self.analysis.include_unconstrained
    }

    /// Includes or excludes unconstrained paths.
    pub fn set_include_unconstrained_paths(&mut self, include: bool) {
        self.analysis.include_unconstrained = include;
    }

    /// Whether capture clock paths are populated.
    pub fn include_capture_paths(&self) -> bool {
        self.analysis.include_capture_paths
    }

    /// Includes or excludes capture clock paths.
    pub fn set_include_capture_paths(&mut self, include: bool) {
        self.analysis.include_capture_paths = include;
    }

    /// Whether clock-tree stages are kept individually.
    pub fn clock_expanded(&self) -> bool {
        self.analysis.clock_expanded
    }

    /// Switches clock expansion on or off.
    pub fn set_clock_expanded(&mut self, expanded: bool) {
        self.analysis.clock_expanded = expanded;
    }

    /// Direction used by [`build_cone_connectivity`](Self::build_cone_connectivity).
    pub fn cone_direction(&self) -> ConeDirection {
        self.cone.direction
    }

    /// Sets the cone direction.
    pub fn set_cone_direction(&mut self, direction: ConeDirection) {
        self.cone.direction = direction;
    }

    /// Resolves the corner and direction of the service's settings.
    pub fn analysis_point(&self) -> QueryResult<AnalysisPoint> {
        self.analysis_point_with(&self.analysis)
    }

    /// Resolves the corner and direction of `config`.
    pub fn analysis_point_with(&self, config: &AnalysisConfig) -> QueryResult<AnalysisPoint> {
        let engine = self.engine.ok_or(QueryError::NoEngine)?;
        let corner = match config.corner.as_deref() {
            Some(name) => engine.find_corner(name).ok_or_else(|| {
                warn!(corner = name, "configured corner not found");
                QueryError::UnknownCorner(name.to_string())
            })?,
            None => engine.default_corner().ok_or(QueryError::NoCorner)?,
        };
        Ok(AnalysisPoint::new(corner, MinMax::from_use_max(config.use_max)))
    }

    /// Paths constrained by start, through and end pin groups, most critical
    /// first. An empty `from` or `to` leaves that end open; `thrus` apply in
    /// order and each is an OR-set.
    pub fn get_timing_paths(
        &self,
        from: &PinSet,
        thrus: &[PinSet],
        to: &PinSet,
    ) -> QueryResult<Vec<PathRecord>> {
        self.get_timing_paths_with(&self.analysis, from, thrus, to)
    }

    /// [`get_timing_paths`](Self::get_timing_paths) under `config`.
    pub fn get_timing_paths_with(
        &self,
        config: &AnalysisConfig,
        from: &PinSet,
        thrus: &[PinSet],
        to: &PinSet,
    ) -> QueryResult<Vec<PathRecord>> {
        let ctx = self.context()?;
        let point = self.analysis_point_with(config)?;
        let all_pins = from.iter().chain(thrus.iter().flatten()).chain(to.iter());
        for pin in all_pins {
            if !ctx.engine.contains_pin(*pin) {
                return Err(QueryError::UnknownPin(*pin));
            }
        }
        if config.max_path_count == 0 || thrus.iter().any(PinSet::is_empty) {
            debug!("path query with nothing to search");
            return Ok(Vec::new());
        }

        let search = PathSearch {
            from: from.clone(),
            thrus: thrus.to_vec(),
            to: to.clone(),
            point,
            max_paths: config.max_path_count,
            unconstrained: config.include_unconstrained,
        };
        let handles = ctx.engine.find_paths(&search);
        let records = handles
            .into_iter()
            .take(config.max_path_count)
            .map(|handle| build_record(ctx, config, point, handle))
            .collect::<QueryResult<Vec<_>>>()?;
        debug!(
            from = from.len(),
            thrus = thrus.len(),
            to = to.len(),
            paths = records.len(),
            "timing path query"
        );
        Ok(records)
    }

    /// Paths through one pin, all other groups open.
    pub fn get_timing_paths_through(&self, pin: PinId) -> QueryResult<Vec<PathRecord>> {
        self.get_timing_paths_through_with(&self.analysis, pin)
    }

    /// [`get_timing_paths_through`](Self::get_timing_paths_through) under `config`.
    pub fn get_timing_paths_through_with(
        &self,
        config: &AnalysisConfig,
        pin: PinId,
    ) -> QueryResult<Vec<PathRecord>> {
        let thrus = [PinSet::from([pin])];
        self.get_timing_paths_with(config, &PinSet::new(), &thrus, &PinSet::new())
    }

    /// A standalone node holding one pin's current timing snapshot.
    pub fn get_timing_node(&self, pin: PinId) -> QueryResult<PathNode> {
        self.get_timing_node_with(&self.analysis, pin)
    }

    /// [`get_timing_node`](Self::get_timing_node) under `config`.
    pub fn get_timing_node_with(
        &self,
        config: &AnalysisConfig,
        pin: PinId,
    ) -> QueryResult<PathNode> {
        let ctx = self.context()?;
        let point = self.analysis_point_with(config)?;
        PathNode::from_pin(ctx, pin, point)
    }

    /// Pins in the fanin cone of `pin`, by depth. Needs only the engine.
    pub fn get_fanin_cone(&self, pin: PinId) -> QueryResult<PinSetByDepth> {
        self.traversal()?.fanin_cone(pin)
    }

    /// Pins in the fanout cone of `pin`, by depth. Needs only the engine.
    pub fn get_fanout_cone(&self, pin: PinId) -> QueryResult<PinSetByDepth> {
        self.traversal()?.fanout_cone(pin)
    }

    fn traversal(&self) -> QueryResult<ConeBuilder<'a>> {
        let engine = self.engine.ok_or(QueryError::NoEngine)?;
        Ok(ConeBuilder::for_engine(engine))
    }

    /// Traverses from `pin` in the configured cone direction, stores the pin
    /// sets into `depth_map` and returns the annotated nodes.
    pub fn build_cone_connectivity(
        &self,
        pin: PinId,
        depth_map: &mut PinSetByDepth,
    ) -> QueryResult<NodesByDepth> {
        self.build_cone_connectivity_with(&self.analysis, self.cone.direction, pin, depth_map)
    }

    /// [`build_cone_connectivity`](Self::build_cone_connectivity) under
    /// explicit settings.
    pub fn build_cone_connectivity_with(
        &self,
        config: &AnalysisConfig,
        direction: ConeDirection,
        pin: PinId,
        depth_map: &mut PinSetByDepth,
    ) -> QueryResult<NodesByDepth> {
        let ctx = self.context()?;
        let point = self.analysis_point_with(config)?;
        ConeBuilder::new(ctx).build_cone_connectivity(pin, direction, point, depth_map)
    }

    /// Appends annotated nodes for every pin of `depth_map` to `nodes`.
    pub fn annotate_cone_timing(
        &self,
        depth_map: &PinSetByDepth,
        nodes: &mut NodesByDepth,
    ) -> QueryResult<()> {
        let ctx = self.context()?;
        let point = self.analysis_point()?;
        ConeBuilder::new(ctx).annotate_cone_timing(point, depth_map, nodes)
    }
}

fn build_record(
    ctx: EngineContext<'_>,
    config: &AnalysisConfig,
    point: AnalysisPoint,
    handle: PathHandle,
) -> QueryResult<PathRecord> {
    let summary = ctx
        .engine
        .path_summary(handle)
        .ok_or(QueryError::UnknownPath(handle))?;
    let mut record = PathRecord::new();
    record.apply_summary(summary);
    record.populate_path(handle, ctx, point, config.clock_expanded)?;
    if config.include_capture_paths {
        if let Some(capture) = ctx.engine.capture_path(handle) {
            record.populate_capture_path(
                capture.path,
                ctx,
                point,
                capture.offset,
                config.clock_expanded,
            )?;
        }
    }
    record.pair_common_nodes();
    record.compute_clk_end_index();
    record.set_slack_on_path_nodes();
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PathStage, PathSummary, PinTiming};
    use crate::memory::{DesignBuilder, MemoryDesign, PinDirection};

    struct Fixture {
        design: MemoryDesign,
        clk: PinId,
        ff_ck: PinId,
        ff_q: PinId,
        u_a: PinId,
        u_z: PinId,
        out: PinId,
        input: PinId,
        capture_raw: Vec<f64>,
    }

    fn summary(start: Option<&str>, end: Option<&str>, slack: f64) -> PathSummary {
        PathSummary {
            start_clock: start.map(str::to_string),
            end_clock: end.map(str::to_string),
            slack,
            arrival: 0.9,
            required: 0.9 + slack,
            path_delay: 0.9,
        }
    }

    /// clk -> cb1 -> cb2 -> {ff/CK, ff2/CK}; ff/Q -> u/A; in -> u/B;
    /// u/Z -> ff2/D. Paths into ff2/D: from ff (-0.5), from in (0.2),
    /// and a min path from ff (0.05).
    fn fixture() -> Fixture {
        let mut b = DesignBuilder::new();
        let corner = b.corner("slow");
        let max = AnalysisPoint::new(corner, MinMax::Max);
        let min = AnalysisPoint::new(corner, MinMax::Min);

        let clk = b.port("clk", PinDirection::Input);
        b.mark_clock(clk);
        let input = b.port("in", PinDirection::Input);
        let out = b.port("out", PinDirection::Output);
        let cb1 = b.instance("cb1", "CLKBUF_X1");
        let cb1_a = b.pin(cb1, "A", PinDirection::Input);
        let cb1_z = b.pin(cb1, "Z", PinDirection::Output);
        let cb2 = b.instance("cb2", "CLKBUF_X1");
        let cb2_a = b.pin(cb2, "A", PinDirection::Input);
        let cb2_z = b.pin(cb2, "Z", PinDirection::Output);
        for pin in [cb1_a, cb1_z, cb2_a, cb2_z] {
            b.mark_clock(pin);
        }
        let ff = b.instance("ff", "DFF_X1");
        b.sequential(ff);
        let ff_ck = b.clock_pin(ff, "CK");
        let ff_q = b.pin(ff, "Q", PinDirection::Output);
        let ff2 = b.instance("ff2", "DFF_X1");
        b.sequential(ff2);
        let ff2_d = b.pin(ff2, "D", PinDirection::Input);
        let ff2_ck = b.clock_pin(ff2, "CK");
        let ff2_q = b.pin(ff2, "Q", PinDirection::Output);
        let u = b.instance("u", "AND2_X1");
        let u_a = b.pin(u, "A", PinDirection::Input);
        let u_b = b.pin(u, "B", PinDirection::Input);
        let u_z = b.pin(u, "Z", PinDirection::Output);

        b.net("clk", &[clk, cb1_a]);
        b.net("c1", &[cb1_z, cb2_a]);
        b.net("c2", &[cb2_z, ff_ck, ff2_ck]);
        b.net("q", &[ff_q, u_a]);
        b.net("in", &[input, u_b]);
        b.net("d", &[u_z, ff2_d]);
        b.net("out", &[ff2_q, out]);

        let clock_tree = |b: &DesignBuilder, leaf: PinId| -> Vec<PathStage> {
            vec![
                b.stage(clk, 0.0, 0.0),
                b.stage(cb1_a, 0.01, 0.01),
                b.stage(cb1_z, 0.06, 0.05),
                b.stage(cb2_a, 0.07, 0.01),
                b.stage(cb2_z, 0.12, 0.05),
                b.stage(leaf, 0.13, 0.01),
            ]
        };
        let mut launch = clock_tree(&b, ff_ck);
        launch.extend([
            b.stage(ff_q, 0.4, 0.27),
            b.stage(u_a, 0.41, 0.01),
            b.stage(u_z, 0.6, 0.19),
            b.stage(ff2_d, 0.62, 0.02),
        ]);
        let capture = clock_tree(&b, ff2_ck);
        let capture_raw = capture.iter().map(|s| s.arrival).collect();

        let reg = b.path(max, summary(Some("clk"), Some("clk"), -0.5), launch.clone());
        b.capture(reg, 1.0, capture);
        b.path(
            max,
            summary(None, Some("clk"), 0.2),
            vec![
                b.stage(input, 0.0, 0.0),
                b.stage(u_b, 0.02, 0.02),
                b.stage(u_z, 0.2, 0.18),
                b.stage(ff2_d, 0.22, 0.02),
            ],
        );
        b.path(min, summary(Some("clk"), Some("clk"), 0.05), launch);
        b.pin_timing(
            u_z,
            max,
            PinTiming {
                arrival: 0.6,
                slew: 0.04,
                load: 0.003,
                is_rising: false,
                slack: Some(-0.5),
            },
        );

        Fixture {
            design: b.build(),
            clk,
            ff_ck,
            ff_q,
            u_a,
            u_z,
            out,
            input,
            capture_raw,
        }
    }

    fn service(design: &MemoryDesign) -> PathQueryService<'_> {
        PathQueryService::with_collaborators(design, design)
    }

    fn sink(f: &Fixture) -> PinId {
        f.design.find_pin("ff2/D").unwrap()
    }

    #[test]
    fn missing_engine_is_reported() {
        let svc = PathQueryService::new();
        let none = PinSet::new();
        assert_eq!(svc.get_timing_paths(&none, &[], &none).unwrap_err(), QueryError::NoEngine);
        assert_eq!(svc.get_fanin_cone(PinId::from_raw(0)).unwrap_err(), QueryError::NoEngine);
        assert_eq!(svc.get_timing_node(PinId::from_raw(0)).unwrap_err(), QueryError::NoEngine);
    }

    #[test]
    fn missing_database_is_reported() {
        let f = fixture();
        let mut svc = PathQueryService::new();
        svc.set_engine(Some(&f.design));
        assert!(svc.engine().is_some());
        assert!(svc.database().is_none());
        let engine_only = svc.get_fanout_cone(f.clk).unwrap();
        assert!(!engine_only.is_empty());
        assert_eq!(svc.get_fanin_cone(f.clk).unwrap().len(), 1);
        let mut depth_map = PinSetByDepth::new();
        assert_eq!(
            svc.build_cone_connectivity(f.clk, &mut depth_map).unwrap_err(),
            QueryError::NoDatabase
        );
        assert_eq!(svc.get_timing_node(f.clk).unwrap_err(), QueryError::NoDatabase);
        svc.set_database(Some(&f.design));
        assert_eq!(svc.get_fanout_cone(f.clk).unwrap(), engine_only);
        assert!(svc.build_cone_connectivity(f.clk, &mut depth_map).is_ok());
    }

    #[test]
    fn worst_path_to_sink() {
        let f = fixture();
        let mut svc = service(&f.design);
        svc.set_max_path_count(1);
        let to = PinSet::from([sink(&f)]);
        let paths = svc.get_timing_paths(&PinSet::new(), &[], &to).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].slack(), -0.5);
        assert_eq!(paths[0].path_nodes().last().unwrap().sta_pin(), sink(&f));
    }

    #[test]
    fn open_search_is_ranked_and_bounded() {
        let f = fixture();
        let svc = service(&f.design);
        let none = PinSet::new();
        let paths = svc.get_timing_paths(&none, &[], &none).unwrap();
        let slacks: Vec<f64> = paths.iter().map(PathRecord::slack).collect();
        assert_eq!(slacks, vec![-0.5, 0.2]);
    }

    #[test]
    fn min_analysis_selects_min_paths() {
        let f = fixture();
        let svc = service(&f.design);
        let config = AnalysisConfig::default().with_use_max(false);
        let none = PinSet::new();
        let paths = svc.get_timing_paths_with(&config, &none, &[], &none).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].slack(), 0.05);
    }

    #[test]
    fn empty_through_group_gives_no_paths() {
        let f = fixture();
        let svc = service(&f.design);
        let none = PinSet::new();
        assert!(svc
            .get_timing_paths(&none, &[PinSet::new()], &none)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn zero_path_count_gives_no_paths() {
        let f = fixture();
        let svc = service(&f.design);
        let config = AnalysisConfig::default().with_max_path_count(0);
        let none = PinSet::new();
        assert!(svc.get_timing_paths_with(&config, &none, &[], &none).unwrap().is_empty());
    }

    #[test]
    fn unknown_pin_is_rejected() {
        let f = fixture();
        let svc = service(&f.design);
        let bad = PinId::from_raw(9999);
        let err = svc
            .get_timing_paths(&PinSet::new(), &[PinSet::from([bad])], &PinSet::new())
            .unwrap_err();
        assert_eq!(err, QueryError::UnknownPin(bad));
    }

    #[test]
    fn unknown_corner_is_rejected() {
        let f = fixture();
        let mut svc = service(&f.design);
        svc.set_corner(Some("ff_m40c".to_string()));
        assert_eq!(
            svc.get_timing_node(f.u_z).unwrap_err(),
            QueryError::UnknownCorner("ff_m40c".to_string())
        );
        svc.set_corner(Some("slow".to_string()));
        assert!(svc.get_timing_node(f.u_z).is_ok());
    }

    #[test]
    fn through_pin_filters_paths() {
        let f = fixture();
        let svc = service(&f.design);
        let paths = svc.get_timing_paths_through(f.u_a).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].start_clock(), Some("clk"));
        assert!(svc.get_timing_paths_through(f.out).unwrap().is_empty());
        assert_eq!(svc.get_timing_paths_through(f.input).unwrap()[0].slack(), 0.2);
    }

    #[test]
    fn clock_run_collapses_to_ends() {
        let f = fixture();
        let svc = service(&f.design);
        let to = PinSet::from([sink(&f)]);
        let record = &svc.get_timing_paths(&PinSet::new(), &[], &to).unwrap()[0];
        let pins: Vec<PinId> = record.path_nodes().map(PathNode::sta_pin).collect();
        assert_eq!(pins[0], f.clk);
        assert_eq!(pins[1], f.ff_ck);
        assert_eq!(pins[2], f.ff_q);
        assert_eq!(pins.len(), 6);
        assert_eq!(record.clk_path_end_index(), 2);
        assert_eq!(record.clk_capture_end_index(), -1);
        assert_eq!(record.capture_nodes().len(), 0);
    }

    #[test]
    fn clock_expanded_keeps_every_stage() {
        let f = fixture();
        let svc = service(&f.design);
        let config = AnalysisConfig::default().with_clock_expanded(true);
        let to = PinSet::from([sink(&f)]);
        let record = &svc.get_timing_paths_with(&config, &PinSet::new(), &[], &to).unwrap()[0];
        assert_eq!(record.path_nodes().len(), 10);
        assert_eq!(record.clk_path_end_index(), 6);
    }

    #[test]
    fn capture_path_is_shifted_and_paired() {
        let f = fixture();
        let svc = service(&f.design);
        let config = AnalysisConfig::default()
            .with_capture_paths(true)
            .with_clock_expanded(true);
        let to = PinSet::from([sink(&f)]);
        let record = &svc.get_timing_paths_with(&config, &PinSet::new(), &[], &to).unwrap()[0];

        let arrivals: Vec<f64> = record.capture_nodes().map(PathNode::arrival).collect();
        assert_eq!(arrivals.len(), f.capture_raw.len());
        for (shifted, raw) in arrivals.iter().zip(&f.capture_raw) {
            assert!((shifted - (raw + 1.0)).abs() < 1e-12);
        }
        assert_eq!(record.clk_capture_end_index(), 6);

        // Five clock-tree pins are shared, the register clock pins differ.
        let paired = record
            .path_nodes()
            .filter(|n| !n.paired_nodes().is_empty())
            .count();
        assert_eq!(paired, 5);
        let launch_ck = record.path_nodes().nth(5).unwrap();
        assert!(launch_ck.paired_nodes().is_empty());
    }

    #[test]
    fn slack_is_broadcast_to_launch_nodes() {
        let f = fixture();
        let svc = service(&f.design);
        let config = AnalysisConfig::default().with_capture_paths(true);
        let to = PinSet::from([sink(&f)]);
        let record = &svc.get_timing_paths_with(&config, &PinSet::new(), &[], &to).unwrap()[0];
        assert!(record.path_nodes().all(|n| n.path_slack() == -0.5));
        assert!(record.capture_nodes().all(|n| n.path_slack() == 0.0));
    }

    #[test]
    fn path_nodes_link_instances_and_fanout() {
        let f = fixture();
        let svc = service(&f.design);
        let to = PinSet::from([sink(&f)]);
        let record = &svc.get_timing_paths(&PinSet::new(), &[], &to).unwrap()[0];
        let ids = record.path_node_ids();
        // ff/Q, u/A, u/Z, ff2/D
        let u_a = ids[3];
        let u_z = ids[4];
        assert_eq!(record.node(u_a).unwrap().instance_node(), Some(u_z));
        assert_eq!(record.node(u_z).unwrap().instance_node(), Some(u_a));
        assert_eq!(record.node(u_z).unwrap().fanout(), 1);
        assert_eq!(record.node(ids[5]).unwrap().fanout(), 0);
        assert_eq!(record.end_stage_name(&f.design), "ff2");
        assert_eq!(record.start_stage_name(&f.design), "clk");
    }

    #[test]
    fn timing_node_reflects_pin_role() {
        let f = fixture();
        let svc = service(&f.design);
        let z = svc.get_timing_node(f.u_z).unwrap();
        assert!(z.is_source());
        assert!(z.has_values());
        assert_eq!(z.arrival(), 0.6);
        assert_eq!(z.fanout(), 1);
        assert_eq!(z.path_slack(), -0.5);
        let a = svc.get_timing_node(f.u_a).unwrap();
        assert!(a.is_sink());
        assert!(!a.has_values());
        let ck = svc.get_timing_node(f.ff_ck).unwrap();
        assert!(ck.is_clock());
    }

    #[test]
    fn cone_follows_configured_direction() {
        let f = fixture();
        let mut svc = service(&f.design);
        svc.set_cone_direction(ConeDirection::Fanout);
        let mut depth_map = PinSetByDepth::new();
        let nodes = svc.build_cone_connectivity(f.ff_q, &mut depth_map).unwrap();
        assert!(depth_map.keys().all(|d| *d >= 0));
        assert_eq!(depth_map[&1], PinSet::from([f.u_a, f.u_z]));
        assert_eq!(nodes.len(), depth_map.values().map(|s| s.len()).sum::<usize>());

        svc.set_cone_direction(ConeDirection::Both);
        let nodes = svc.build_cone_connectivity(f.ff_q, &mut depth_map).unwrap();
        assert!(depth_map.contains_key(&-1));
        assert!(depth_map[&0].contains(&f.ff_ck));
        assert_eq!(nodes.len(), depth_map.values().map(|s| s.len()).sum::<usize>());

        let mut extra = NodesByDepth::new();
        svc.annotate_cone_timing(&depth_map, &mut extra).unwrap();
        assert_eq!(extra.len(), nodes.len());
    }

    #[test]
    fn fanin_of_register_output_reaches_clock_source() {
        let f = fixture();
        let svc = service(&f.design);
        let cone = svc.get_fanin_cone(f.ff_q).unwrap();
        assert!(cone[&0].contains(&f.ff_ck));
        assert!(cone.values().any(|s| s.contains(&f.clk)));
        let fanout = svc.get_fanout_cone(f.ff_q).unwrap();
        assert!(fanout[&2].contains(&sink(&f)));
        assert!(!fanout.values().any(|s| s.contains(&f.out)));
    }

    #[test]
    fn apply_config_replaces_settings() {
        let mut svc = PathQueryService::new();
        let config = vantage_config::load_config_from_str(
            "[analysis]\nuse_max = false\nmax_path_count = 5\n[cone]\ndirection = \"fanin\"\n",
        )
        .unwrap();
        svc.apply_config(&config);
        assert!(!svc.use_max());
        assert_eq!(svc.max_path_count(), 5);
        assert_eq!(svc.cone_direction(), ConeDirection::Fanin);
        assert!(!svc.include_capture_paths());
    }
}
