use worldsync_shared::{EntityId, EntityKind, PropertyKind};

use super::WorldError;

/// One node of the entity tree. The parent is a weak back-reference by id:
/// lookup only, an entity does not own its parent.
pub struct Entity {
    kind: EntityKind,
    parent: Option<EntityId>,
    /// Current serialized value per property kind, indexed by
    /// `PropertyKind::index()`. Empty until first set.
    properties: Vec<Vec<u8>>,
}

impl Entity {
    pub(crate) fn new(kind: EntityKind, parent: Option<EntityId>) -> Self {
        Self {
            kind,
            parent,
            properties: vec![Vec::new(); PropertyKind::COUNT],
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Current serialized value of `kind`; empty if never set.
    pub fn property(&self, kind: PropertyKind) -> &[u8] {
        &self.properties[kind.index()]
    }

    /// Applies a serialized value. The payload must fit the kind's maximum
    /// serialized length; values arriving from peers have already passed the
    /// wire cap, this enforces the tighter per-kind limit.
    pub fn set_property(&mut self, kind: PropertyKind, bytes: &[u8]) -> Result<(), WorldError> {
        if bytes.len() > kind.max_len() {
            return Err(WorldError::PropertyTooLong {
                kind,
                len: bytes.len(),
                max: kind.max_len(),
            });
        }
        let slot = &mut self.properties[kind.index()];
        slot.clear();
        slot.extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_start_empty() {
        let entity = Entity::new(EntityKind::Robot, None);
        for kind in PropertyKind::ALL {
            assert!(entity.property(kind).is_empty());
        }
    }

    #[test]
    fn set_property_replaces_the_value() {
        let mut entity = Entity::new(EntityKind::Robot, None);
        entity.set_property(PropertyKind::Color, &[1, 2, 3, 4]).unwrap();
        assert_eq!(entity.property(PropertyKind::Color), &[1, 2, 3, 4]);
        entity.set_property(PropertyKind::Color, &[9]).unwrap();
        assert_eq!(entity.property(PropertyKind::Color), &[9]);
    }

    #[test]
    fn set_property_enforces_the_kind_limit() {
        let mut entity = Entity::new(EntityKind::Robot, None);
        let oversized = vec![0; PropertyKind::Color.max_len() + 1];
        assert_eq!(
            entity.set_property(PropertyKind::Color, &oversized),
            Err(WorldError::PropertyTooLong {
                kind: PropertyKind::Color,
                len: oversized.len(),
                max: PropertyKind::Color.max_len(),
            })
        );
    }
}
