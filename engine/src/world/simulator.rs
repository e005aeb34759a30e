use std::{io, path::Path};

use worldsync_shared::{EntityId, PropertyKind, StepNum};

use super::World;

/// A property whose value changed during an advance, to be propagated to
/// every connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyChange {
    pub entity: EntityId,
    pub kind: PropertyKind,
}

/// The external simulation collaborator. The step coordinator drives it once
/// per tick, between the input and emit phases, and marks whatever it
/// reports changed as dirty on every connection.
pub trait Simulator {
    /// Advances the simulation by one step, mutating entity properties in
    /// the world, and reports which properties changed.
    fn advance(&mut self, world: &mut World, step: StepNum) -> Vec<PropertyChange>;

    /// Persists the world to a file (the `Save` command).
    fn save_to_file(&mut self, world: &World, path: &Path) -> io::Result<()>;
}
