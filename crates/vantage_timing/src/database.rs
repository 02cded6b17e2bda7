//! The design database boundary.
//!
//! The database owns pin identity as seen by layout: instance and block
//! terminals, their shapes, and the names used to label them. Its pin
//! identity ([`DbPin`]) is independent of the timing engine's ([`PinId`]);
//! [`DesignDatabase::db_pin`] and [`DesignDatabase::sta_pin`] convert between
//! the two.

use vantage_common::{DbPin, InstanceId, NetId, PinId, Rect};

/// Operations consumed from the collaborator design database.
pub trait DesignDatabase {
    /// Maps a timing pin to its database terminal.
    fn db_pin(&self, pin: PinId) -> Option<DbPin>;

    /// Maps a database terminal to its timing pin.
    fn sta_pin(&self, pin: DbPin) -> Option<PinId>;

    /// Terminal name: the master pin name for an instance terminal, the port
    /// name for a block terminal.
    fn pin_name(&self, pin: DbPin) -> Option<String>;

    /// Layout shapes of a terminal.
    fn pin_shapes(&self, pin: DbPin) -> Vec<Rect>;

    /// Instance owning the terminal; `None` for block terminals.
    fn pin_instance(&self, pin: DbPin) -> Option<InstanceId>;

    /// Net attached to the terminal.
    fn pin_net(&self, pin: DbPin) -> Option<NetId>;

    /// Name of an instance.
    fn instance_name(&self, inst: InstanceId) -> Option<String>;

    /// Master (library cell) name of an instance.
    fn instance_master(&self, inst: InstanceId) -> Option<String>;

    /// Name of a net.
    fn net_name(&self, net: NetId) -> Option<String>;
}
