//! Player-facing collaborator contract. Identity, position, messaging, and
//! the opaque "debit N units of item R" capability the economy runs on.

use contracts::{IslandKey, Location};

use crate::geometry::WorldGeometry;

pub trait PlayerActor {
    fn name(&self) -> &str;

    fn location(&self) -> Location;

    /// Geometry of the world the actor currently stands in, or `None` when
    /// that world has no island geometry.
    fn geometry(&self) -> Option<&dyn WorldGeometry>;

    /// Atomically takes `amount` of `item` from the actor. Returns `false`
    /// (and takes nothing) when the actor cannot afford it.
    fn debit(&self, item: &str, amount: i64) -> bool;

    /// Delivers a message by catalog key with positional arguments.
    fn notify(&self, message_key: &str, args: &[&str]);

    fn warp_to(&self, island: &IslandKey);
}
