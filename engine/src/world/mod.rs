//! The replicated simulation state: occupancy matrix, background image, and
//! the entity tree. The physical simulation that moves entities around is an
//! external collaborator (see [`Simulator`]); this model only holds what the
//! sync engine replicates.

mod background;
mod entity;
mod matrix;
mod simulator;

pub use background::Background;
pub use entity::Entity;
pub use matrix::Matrix;
pub use simulator::{PropertyChange, Simulator};

use thiserror::Error;

use worldsync_shared::{EntityId, EntityKind, PropertyKind};

/// Errors raised by world mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// A property payload exceeds its kind's maximum serialized length.
    #[error("property {kind:?} payload of {len} bytes exceeds its {max} byte maximum")]
    PropertyTooLong {
        kind: PropertyKind,
        len: usize,
        max: usize,
    },

    /// A background pixel buffer does not match its declared dimensions.
    #[error("background pixel buffer of {len} bytes does not match {width}x{height}")]
    BackgroundSizeMismatch { len: usize, width: u32, height: u32 },

    /// `spawn` named a parent that is not in the entity table.
    #[error("parent entity {parent} does not exist (world has {count} entities)")]
    NoSuchParent { parent: EntityId, count: usize },
}

/// One simulation instance's world. Entities live in a flat arena addressed
/// by stable integer ids; ids are assigned ascending and never reused within
/// a session, so the arena index *is* the id. Entities go away only with the
/// whole world.
pub struct World {
    matrix: Matrix,
    background: Option<Background>,
    entities: Vec<Entity>,
    enabled: bool,
}

impl World {
    pub fn new(matrix: Matrix) -> Self {
        Self {
            matrix,
            background: None,
            entities: Vec::new(),
            enabled: true,
        }
    }

    /// The entity factory: creates an entity of `kind` under `parent` (or as
    /// a root) and returns its stable id.
    pub fn spawn(
        &mut self,
        kind: EntityKind,
        parent: Option<EntityId>,
    ) -> Result<EntityId, WorldError> {
        if let Some(parent) = parent {
            if parent as usize >= self.entities.len() {
                return Err(WorldError::NoSuchParent {
                    parent,
                    count: self.entities.len(),
                });
            }
        }
        let id = self.entities.len() as EntityId;
        self.entities.push(Entity::new(kind, parent));
        Ok(id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id as usize)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id as usize)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities in ascending id order, the order every serialization pass
    /// uses.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(id, entity)| (id as EntityId, entity))
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn set_matrix(&mut self, matrix: Matrix) {
        self.matrix = matrix;
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn set_background(&mut self, background: Option<Background>) {
        self.background = background;
    }

    /// Global enable flag, toggled by the `Pause` command.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn toggle_enabled(&mut self) {
        self.enabled = !self.enabled;
    }
}
