use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet, VecDeque};
use vantage_common::PinId;
use vantage_timing::memory::{DesignBuilder, MemoryDesign, PinDirection};
use vantage_timing::{ConeBuilder, ConeDirection, EngineContext, PinSetByDepth};

/// A ring of buffers: `drivers[j] = Some(i)` connects `u{i}/Z` to `u{j}/A`.
struct Buffers {
    design: MemoryDesign,
    inputs: Vec<PinId>,
    outputs: Vec<PinId>,
}

fn buffers(drivers: &[Option<usize>]) -> Buffers {
    let mut b = DesignBuilder::new();
    b.corner("typ");
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for i in 0..drivers.len() {
        let inst = b.instance(&format!("u{i}"), "BUF_X1");
        inputs.push(b.pin(inst, "A", PinDirection::Input));
        outputs.push(b.pin(inst, "Z", PinDirection::Output));
    }
    for (i, z) in outputs.iter().enumerate() {
        let mut pins = vec![*z];
        pins.extend(
            drivers
                .iter()
                .enumerate()
                .filter(|(_, d)| **d == Some(i))
                .map(|(j, _)| inputs[j]),
        );
        b.net(&format!("n{i}"), &pins);
    }
    Buffers {
        design: b.build(),
        inputs,
        outputs,
    }
}

/// Shortest fanout depths from `u{seed}/Z`, computed on the instance graph.
fn reference_fanout(drivers: &[Option<usize>], seed: usize, b: &Buffers) -> BTreeMap<PinId, i32> {
    let n = drivers.len();
    let mut dist: Vec<Option<i32>> = vec![None; n];
    let mut input_dist: Vec<Option<i32>> = vec![None; n];
    dist[seed] = Some(0);
    let mut queue = VecDeque::from([seed]);
    while let Some(i) = queue.pop_front() {
        let d = dist[i].unwrap_or_default();
        for j in (0..n).filter(|j| drivers[*j] == Some(i)) {
            if input_dist[j].is_none() {
                input_dist[j] = Some(d + 1);
            }
            if dist[j].is_none() {
                dist[j] = Some(d + 1);
                queue.push_back(j);
            }
        }
    }
    let mut depths = BTreeMap::new();
    for i in 0..n {
        if let Some(d) = dist[i] {
            depths.insert(b.outputs[i], d);
        }
        if let Some(d) = input_dist[i] {
            depths.insert(b.inputs[i], d);
        }
    }
    depths
}

fn flatten(map: &PinSetByDepth) -> Vec<(PinId, i32)> {
    map.iter()
        .flat_map(|(depth, pins)| pins.iter().map(move |p| (*p, *depth)))
        .collect()
}

fn netlist() -> impl Strategy<Value = (Vec<Option<usize>>, usize)> {
    (1usize..10).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::option::of(0..n), n),
            0..n,
        )
    })
}

proptest! {
    #[test]
    fn fanout_depth_is_shortest_net_distance((drivers, seed) in netlist()) {
        let bufs = buffers(&drivers);
        let builder = ConeBuilder::new(EngineContext::new(&bufs.design, &bufs.design));
        let cone = builder.fanout_cone(bufs.outputs[seed]).unwrap();
        let actual: BTreeMap<PinId, i32> = flatten(&cone).into_iter().collect();
        prop_assert_eq!(actual, reference_fanout(&drivers, seed, &bufs));
    }

    #[test]
    fn every_pin_has_one_depth((drivers, seed) in netlist()) {
        let bufs = buffers(&drivers);
        let builder = ConeBuilder::new(EngineContext::new(&bufs.design, &bufs.design));
        for pin in [bufs.outputs[seed], bufs.inputs[seed]] {
            for direction in [ConeDirection::Fanin, ConeDirection::Fanout, ConeDirection::Both] {
                let cone = builder.cone(pin, direction).unwrap();
                let entries = flatten(&cone);
                let unique: HashSet<PinId> = entries.iter().map(|(p, _)| *p).collect();
                prop_assert_eq!(unique.len(), entries.len());
                if !entries.is_empty() {
                    prop_assert!(cone[&0].contains(&pin));
                }
            }
        }
    }

    #[test]
    fn fanin_and_fanout_stay_on_their_side((drivers, seed) in netlist()) {
        let bufs = buffers(&drivers);
        let builder = ConeBuilder::new(EngineContext::new(&bufs.design, &bufs.design));
        let seed_pin = bufs.outputs[seed];
        let fanin = builder.fanin_cone(seed_pin).unwrap();
        let fanout = builder.fanout_cone(seed_pin).unwrap();
        prop_assert!(fanin.keys().all(|d| *d >= 0));
        prop_assert!(fanout.keys().all(|d| *d >= 0));

        let both = builder.cone(seed_pin, ConeDirection::Both).unwrap();
        for (pin, depth) in flatten(&both) {
            let in_fanout = fanout.get(&depth).is_some_and(|s| s.contains(&pin));
            let in_fanin = fanin.get(&-depth).is_some_and(|s| s.contains(&pin));
            prop_assert!(in_fanout || in_fanin);
        }
    }
}
