//! Analysis direction and analysis point.

use crate::ids::CornerId;
use serde::{Deserialize, Serialize};

/// Direction of timing analysis.
///
/// `Max` selects worst-case (setup) values, `Min` best-case (hold) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinMax {
    /// Best-case (hold) analysis.
    Min,
    /// Worst-case (setup) analysis.
    #[default]
    Max,
}

impl MinMax {
    /// Maps a `use_max` flag to an analysis direction.
    pub fn from_use_max(use_max: bool) -> Self {
        if use_max {
            MinMax::Max
        } else {
            MinMax::Min
        }
    }

    /// Returns `true` for [`MinMax::Max`].
    pub fn is_max(self) -> bool {
        self == MinMax::Max
    }
}

/// A corner paired with an analysis direction.
///
/// Every per-pin and per-path value handed out by the timing engine is
/// relative to one analysis point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisPoint {
    /// The corner whose delay models apply.
    pub corner: CornerId,
    /// Worst-case or best-case direction.
    pub min_max: MinMax,
}

impl AnalysisPoint {
    /// Creates a new analysis point.
    pub fn new(corner: CornerId, min_max: MinMax) -> Self {
        Self { corner, min_max }
    }
}
