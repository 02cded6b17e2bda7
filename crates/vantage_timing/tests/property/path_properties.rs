use proptest::prelude::*;
use vantage_common::{AnalysisPoint, DbPin, ITermId, MinMax, PinId};
use vantage_timing::memory::{DesignBuilder, MemoryDesign, PinDirection};
use vantage_timing::{
    clock_end_index, AnalysisConfig, NodeFlags, PathNode, PathQueryService, PathStage,
    PathSummary, PinSet,
};

/// `in -> u0 -> u1 -> ... -> out` with one stored path per slack value.
/// Every path also carries a capture path over the same stages, shifted by `offset`.
fn chain(depth: usize, slacks: &[f64], offset: f64) -> (MemoryDesign, Vec<PathStage>) {
    let mut b = DesignBuilder::new();
    let corner = b.corner("typ");
    let point = AnalysisPoint::new(corner, MinMax::Max);
    let input = b.port("in", PinDirection::Input);
    let out = b.port("out", PinDirection::Output);
    let mut driver = input;
    let mut stages = vec![b.stage(input, 0.0, 0.0)];
    let mut t = 0.0;
    for i in 0..depth {
        let inst = b.instance(&format!("u{i}"), "BUF_X1");
        let a = b.pin(inst, "A", PinDirection::Input);
        let z = b.pin(inst, "Z", PinDirection::Output);
        b.net(&format!("n{i}"), &[driver, a]);
        t += 0.01;
        stages.push(b.stage(a, t, 0.01));
        t += 0.1;
        stages.push(b.stage(z, t, 0.1));
        driver = z;
    }
    b.net("out", &[driver, out]);
    stages.push(b.stage(out, t + 0.01, 0.01));

    for slack in slacks {
        let summary = PathSummary {
            start_clock: None,
            end_clock: None,
            slack: *slack,
            arrival: t,
            required: t + slack,
            path_delay: t,
        };
        let launch = b.path(point, summary, stages.clone());
        b.capture(launch, offset, stages.clone());
    }
    (b.build(), stages)
}

fn placeholder(is_clock: bool, is_sink: bool) -> PathNode {
    PathNode::placeholder(
        DbPin::ITerm(ITermId::from_raw(0)),
        PinId::from_raw(0),
        NodeFlags {
            is_clock,
            is_rising: false,
            is_sink,
        },
    )
}

proptest! {
    #[test]
    fn sink_and_source_are_exclusive(is_clock in any::<bool>(), is_sink in any::<bool>()) {
        let node = placeholder(is_clock, is_sink);
        prop_assert_eq!(node.is_sink(), !node.is_source());
    }

    #[test]
    fn clock_end_index_is_bounded(flags in prop::collection::vec(any::<bool>(), 0..20)) {
        let nodes: Vec<PathNode> = flags.iter().map(|c| placeholder(*c, false)).collect();
        let index = clock_end_index(nodes.iter());
        prop_assert!(index >= -1 && index <= nodes.len() as i32);
        if nodes.is_empty() {
            prop_assert_eq!(index, -1);
        } else if flags.iter().all(|c| *c) {
            prop_assert_eq!(index, nodes.len() as i32);
        } else {
            let first_data = flags.iter().position(|c| !*c).unwrap();
            prop_assert_eq!(index, first_data as i32);
        }
    }

    #[test]
    fn open_search_is_bounded_and_ranked(
        slacks in prop::collection::vec(-2.0f64..2.0, 0..12),
        max in 1usize..8,
    ) {
        let (design, _) = chain(2, &slacks, 0.0);
        let mut svc = PathQueryService::with_collaborators(&design, &design);
        svc.set_max_path_count(max);
        let none = PinSet::new();
        let paths = svc.get_timing_paths(&none, &[], &none).unwrap();
        prop_assert_eq!(paths.len(), slacks.len().min(max));
        for pair in paths.windows(2) {
            prop_assert!(pair[0].slack() <= pair[1].slack());
        }
    }

    #[test]
    fn slack_broadcast_is_idempotent(slack in -2.0f64..2.0, depth in 0usize..5) {
        let (design, _) = chain(depth, &[slack], 0.0);
        let svc = PathQueryService::with_collaborators(&design, &design);
        let none = PinSet::new();
        let mut record = svc.get_timing_paths(&none, &[], &none).unwrap().remove(0);
        record.set_slack_on_path_nodes();
        let once: Vec<f64> = record.path_nodes().map(PathNode::path_slack).collect();
        record.set_slack_on_path_nodes();
        let twice: Vec<f64> = record.path_nodes().map(PathNode::path_slack).collect();
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.iter().all(|s| *s == record.slack()));
    }

    #[test]
    fn capture_arrival_is_shifted_by_offset(offset in -5.0f64..5.0, depth in 0usize..5) {
        let (design, stages) = chain(depth, &[0.1], offset);
        let svc = PathQueryService::with_collaborators(&design, &design);
        let config = AnalysisConfig::default().with_capture_paths(true);
        let none = PinSet::new();
        let record = svc.get_timing_paths_with(&config, &none, &[], &none).unwrap().remove(0);
        prop_assert_eq!(record.capture_nodes().len(), stages.len());
        for (node, stage) in record.capture_nodes().zip(&stages) {
            prop_assert!((node.arrival() - (stage.arrival + offset)).abs() < 1e-9);
        }
        for (node, stage) in record.path_nodes().zip(&stages) {
            prop_assert_eq!(node.arrival(), stage.arrival);
            prop_assert_eq!(node.is_sink(), !node.is_source());
        }
    }
}
