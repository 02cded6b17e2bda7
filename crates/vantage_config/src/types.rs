//! Configuration types deserialized from `vantage.toml`.

use serde::{Deserialize, Serialize};

/// Default bound on the number of paths a single search returns.
pub const DEFAULT_MAX_PATH_COUNT: usize = 10;

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "vantage=info";

/// The top-level configuration parsed from `vantage.toml`.
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VantageConfig {
    /// Settings applied to every path and pin query.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Settings for cone-of-influence queries.
    #[serde(default)]
    pub cone: ConeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analysis settings for path search and per-pin timing lookups.
///
/// An `AnalysisConfig` is a plain value: queries take a snapshot of it, so a
/// change made between two queries never affects one already running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the active corner. `None` selects the engine's default corner.
    pub corner: Option<String>,
    /// Worst-case (`true`) or best-case (`false`) analysis.
    pub use_max: bool,
    /// Upper bound on the number of paths returned by one search.
    pub max_path_count: usize,
    /// Whether paths without a timing check are reported.
    pub include_unconstrained: bool,
    /// Whether the capture clock path is populated for each path.
    pub include_capture_paths: bool,
    /// Whether every clock-tree stage becomes its own path node.
    pub clock_expanded: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            corner: None,
            use_max: true,
            max_path_count: DEFAULT_MAX_PATH_COUNT,
            include_unconstrained: false,
            include_capture_paths: false,
            clock_expanded: false,
        }
    }
}

impl AnalysisConfig {
    /// Returns a copy with the given corner selected.
    pub fn with_corner(mut self, corner: impl Into<String>) -> Self {
        self.corner = Some(corner.into());
        self
    }

    /// Returns a copy with the given analysis direction.
    pub fn with_use_max(mut self, use_max: bool) -> Self {
        self.use_max = use_max;
        self
    }

    /// Returns a copy with the given path count bound.
    pub fn with_max_path_count(mut self, count: usize) -> Self {
        self.max_path_count = count;
        self
    }

    /// Returns a copy with unconstrained paths included or excluded.
    pub fn with_unconstrained(mut self, include: bool) -> Self {
        self.include_unconstrained = include;
        self
    }

    /// Returns a copy with capture paths included or excluded.
    pub fn with_capture_paths(mut self, include: bool) -> Self {
        self.include_capture_paths = include;
        self
    }

    /// Returns a copy with clock expansion switched on or off.
    pub fn with_clock_expanded(mut self, expanded: bool) -> Self {
        self.clock_expanded = expanded;
        self
    }
}

/// Which way a cone-of-influence traversal walks from its seed pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConeDirection {
    /// Backward, from loads toward drivers.
    Fanin,
    /// Forward, from drivers toward loads.
    Fanout,
    /// Both cones around the seed; fanin levels are stored at negative depths.
    #[default]
    Both,
}

/// Cone query settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConeConfig {
    /// Direction used by `build_cone_connectivity`.
    pub direction: ConeDirection,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `VANTAGE_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
