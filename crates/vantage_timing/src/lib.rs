//! Timing path extraction and fanin/fanout cones for the Vantage timing explorer.
//!
//! This crate sits between a static timing engine and a design database and
//! turns their native objects into plain, self-contained records:
//!
//! - [`PathNode`]: one pin of a path or cone with its timing snapshot.
//! - [`PathRecord`]: a launch path, its capture clock path and path scalars.
//! - [`ConeBuilder`]: depth-bucketed fanin/fanout traversal and annotation.
//! - [`PathQueryService`]: the query façade owning the analysis settings.
//!
//! Collaborators are consumed through the [`TimingEngine`] and
//! [`DesignDatabase`] traits. [`memory::MemoryDesign`] implements both over a
//! design held in memory.

#![warn(missing_docs)]

pub mod cone;
pub mod database;
pub mod engine;
pub mod error;
pub mod memory;
pub mod node;
pub mod path;
pub mod query;

pub use cone::{ConeBuilder, NodesByDepth, PinSetByDepth};
pub use database::DesignDatabase;
pub use engine::{
    ArcDirection, CapturePath, EngineContext, PathSearch, PathStage, PathSummary, PinSet,
    PinTiming, TimingEngine,
};
pub use error::{QueryError, QueryResult};
pub use node::{NodeArena, NodeFlags, NodeValues, PathNode};
pub use path::{clock_end_index, PathRecord};
pub use query::PathQueryService;
pub use vantage_config::{AnalysisConfig, ConeDirection};
