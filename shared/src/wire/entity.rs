use crate::{constants::ENTITY_RECORD_LEN, types::EntityId};

use super::error::WireError;

/// Fixed registry of entity kinds. The type tag travels in entity records
/// and keys the factory when a replica reconstructs the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// The root fixture holding the environment bitmap.
    Ground,
    Obstacle,
    Robot,
    RangeSensor,
    Beacon,
}

impl EntityKind {
    pub const COUNT: usize = 5;

    pub fn to_wire(self) -> u32 {
        match self {
            EntityKind::Ground => 0,
            EntityKind::Obstacle => 1,
            EntityKind::Robot => 2,
            EntityKind::RangeSensor => 3,
            EntityKind::Beacon => 4,
        }
    }
}

impl TryFrom<u32> for EntityKind {
    type Error = WireError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EntityKind::Ground),
            1 => Ok(EntityKind::Obstacle),
            2 => Ok(EntityKind::Robot),
            3 => Ok(EntityKind::RangeSensor),
            4 => Ok(EntityKind::Beacon),
            value => Err(WireError::UnknownEntityKind {
                value,
                max: (Self::COUNT - 1) as u32,
            }),
        }
    }
}

/// One entity in a snapshot's entity batch. `parent` is the parent's index
/// in the same batch, or `NO_PARENT` for root entities. Producers emit
/// entities in ascending id order, so a parent index always refers to an
/// already-reconstructed entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityRecord {
    pub id: EntityId,
    pub parent: i32,
    pub kind: EntityKind,
}

impl EntityRecord {
    pub const NO_PARENT: i32 = -1;

    pub fn new(id: EntityId, parent: i32, kind: EntityKind) -> Self {
        Self { id, parent, kind }
    }

    pub fn encode(&self) -> [u8; ENTITY_RECORD_LEN] {
        let mut bytes = [0; ENTITY_RECORD_LEN];
        bytes[0..4].copy_from_slice(&self.id.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.parent.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.kind.to_wire().to_le_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8; ENTITY_RECORD_LEN]) -> Result<Self, WireError> {
        let id = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let parent = i32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let raw_kind = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        Ok(Self {
            id,
            parent,
            kind: EntityKind::try_from(raw_kind)?,
        })
    }
}
