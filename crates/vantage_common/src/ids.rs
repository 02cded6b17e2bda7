//! Opaque ID newtypes for design, timing and path entities.
//!
//! Every ID is a thin `u32` wrapper that is `Copy`, `Hash`, `Ord`, and
//! `Serialize`/`Deserialize`. The timing engine and the physical database use
//! independent identities for the same logical pin: [`PinId`] is the timing
//! graph view, [`DbPin`] the database view. Converting between them always
//! goes through a collaborator lookup.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Timing-graph identity of a pin.
    PinId
);

define_id!(
    /// Database identity of an instance terminal.
    ITermId
);

define_id!(
    /// Database identity of a block boundary terminal (top-level port).
    BTermId
);

define_id!(
    /// Opaque, copyable ID for a cell instance.
    InstanceId
);

define_id!(
    /// Opaque, copyable ID for a net.
    NetId
);

define_id!(
    /// Opaque, copyable ID for an analysis corner.
    CornerId
);

define_id!(
    /// Opaque handle to a path returned by the timing engine's path search.
    PathHandle
);

define_id!(
    /// Arena-relative index of a path node inside the container that owns it.
    ///
    /// A `NodeId` is only meaningful for the `PathRecord` or cone map that
    /// produced it.
    NodeId
);

/// Database identity of a pin: either an instance terminal or a block terminal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum DbPin {
    /// A terminal on a cell instance.
    ITerm(ITermId),
    /// A terminal on the block boundary.
    BTerm(BTermId),
}

impl DbPin {
    /// Returns `true` for instance terminals.
    pub fn is_iterm(self) -> bool {
        matches!(self, DbPin::ITerm(_))
    }

    /// Returns `true` for block terminals.
    pub fn is_bterm(self) -> bool {
        matches!(self, DbPin::BTerm(_))
    }

    /// Returns the instance terminal ID, if this is one.
    pub fn as_iterm(self) -> Option<ITermId> {
        match self {
            DbPin::ITerm(id) => Some(id),
            DbPin::BTerm(_) => None,
        }
    }

    /// Returns the block terminal ID, if this is one.
    pub fn as_bterm(self) -> Option<BTermId> {
        match self {
            DbPin::BTerm(id) => Some(id),
            DbPin::ITerm(_) => None,
        }
    }
}
