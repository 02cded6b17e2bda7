//! Ranked search over stored paths.

use super::{MemoryDesign, StoredPath};
use crate::engine::{PathSearch, PinSet};
use tracing::trace;
use vantage_common::{PathHandle, PinId};

/// Returns the stored paths matching `search`, worst slack first, at most
/// `search.max_paths` of them.
pub(crate) fn find_paths(design: &MemoryDesign, search: &PathSearch) -> Vec<PathHandle> {
    let mut matches: Vec<(PathHandle, f64)> = design
        .paths
        .iter()
        .filter(|(_, path)| matches_search(path, search))
        .map(|(id, path)| (id, path.summary.slack))
        .collect();
    matches.sort_by(|a, b| a.1.total_cmp(&b.1));
    matches.truncate(search.max_paths);
    trace!(
        stored = design.paths.len(),
        matched = matches.len(),
        "path search"
    );
    matches.into_iter().map(|(id, _)| id).collect()
}

fn matches_search(path: &StoredPath, search: &PathSearch) -> bool {
    if !path.searchable || path.point != search.point || path.stages.is_empty() {
        return false;
    }
    if path.summary.slack.is_infinite() && !search.unconstrained {
        return false;
    }

    let start = start_index(path);
    if !accepts(&search.from, path.stages[start].pin) {
        return false;
    }
    let end = path.stages.len() - 1;
    if !accepts(&search.to, path.stages[end].pin) {
        return false;
    }

    let mut cursor = 0;
    for group in &search.thrus {
        match path.stages[cursor..]
            .iter()
            .position(|stage| group.contains(&stage.pin))
        {
            Some(offset) => cursor += offset + 1,
            None => return false,
        }
    }
    true
}

/// Index of the path's start point: the last stage of a leading clock run,
/// or the first stage when the path does not start on a clock.
fn start_index(path: &StoredPath) -> usize {
    path.stages
        .iter()
        .take_while(|stage| stage.is_clock)
        .count()
        .saturating_sub(1)
}

fn accepts(group: &PinSet, pin: PinId) -> bool {
    group.is_empty() || group.contains(&pin)
}
