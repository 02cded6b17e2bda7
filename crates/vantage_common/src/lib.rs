//! Shared foundational types used across the Vantage timing explorer.
//!
//! This crate provides opaque IDs for pins, nets, instances, corners and
//! path handles, a dense ID-indexed arena, interned names, layout rectangles,
//! and the min/max analysis point used by every timing query.

#![warn(missing_docs)]

pub mod analysis;
pub mod arena;
pub mod geometry;
pub mod ident;
pub mod ids;

pub use analysis::{AnalysisPoint, MinMax};
pub use arena::{Arena, ArenaId};
pub use geometry::Rect;
pub use ident::{Ident, Interner};
pub use ids::{BTermId, CornerId, DbPin, ITermId, InstanceId, NetId, NodeId, PathHandle, PinId};
