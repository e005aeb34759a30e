use crate::{
    constants::{MAX_PROPERTY_DATA_LEN, PROPERTY_HEADER_LEN},
    types::EntityId,
};

use super::error::WireError;

/// A named, opaquely-typed piece of per-entity state. The engine never
/// interprets property payloads; it only knows each kind's maximum
/// serialized length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
    Pose,
    Velocity,
    Size,
    Color,
    Shape,
    Label,
}

impl PropertyKind {
    pub const COUNT: usize = 6;

    /// All kinds in ascending wire order. Emission iterates this to get the
    /// deterministic property-ascending order within an entity.
    pub const ALL: [PropertyKind; Self::COUNT] = [
        PropertyKind::Pose,
        PropertyKind::Velocity,
        PropertyKind::Size,
        PropertyKind::Color,
        PropertyKind::Shape,
        PropertyKind::Label,
    ];

    pub fn to_wire(self) -> u32 {
        match self {
            PropertyKind::Pose => 0,
            PropertyKind::Velocity => 1,
            PropertyKind::Size => 2,
            PropertyKind::Color => 3,
            PropertyKind::Shape => 4,
            PropertyKind::Label => 5,
        }
    }

    pub fn index(self) -> usize {
        self.to_wire() as usize
    }

    /// Maximum serialized length of a value of this kind.
    pub fn max_len(self) -> usize {
        match self {
            PropertyKind::Pose => 24,
            PropertyKind::Velocity => 24,
            PropertyKind::Size => 16,
            PropertyKind::Color => 4,
            PropertyKind::Shape => 4,
            PropertyKind::Label => 64,
        }
    }
}

impl TryFrom<u32> for PropertyKind {
    type Error = WireError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PropertyKind::Pose),
            1 => Ok(PropertyKind::Velocity),
            2 => Ok(PropertyKind::Size),
            3 => Ok(PropertyKind::Color),
            4 => Ok(PropertyKind::Shape),
            5 => Ok(PropertyKind::Label),
            value => Err(WireError::UnknownPropertyKind {
                value,
                max: (Self::COUNT - 1) as u32,
            }),
        }
    }
}

/// Header of one property record on the wire; `len` payload bytes follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyHeader {
    pub entity_id: EntityId,
    pub kind: PropertyKind,
    pub len: u32,
}

impl PropertyHeader {
    pub fn new(entity_id: EntityId, kind: PropertyKind, len: u32) -> Self {
        Self { entity_id, kind, len }
    }

    pub fn encode(&self) -> [u8; PROPERTY_HEADER_LEN] {
        let mut bytes = [0; PROPERTY_HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.entity_id.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.kind.to_wire().to_le_bytes());
        bytes[8..12].copy_from_slice(&self.len.to_le_bytes());
        bytes
    }

    /// Decodes and validates a property header read from a peer. The length
    /// must be in `[1, MAX_PROPERTY_DATA_LEN)`: a zero-length record carries
    /// nothing and an oversized one would let a peer demand an unbounded
    /// read, so both are protocol violations.
    pub fn decode(bytes: &[u8; PROPERTY_HEADER_LEN]) -> Result<Self, WireError> {
        let entity_id = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let raw_kind = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let len = u32::from_le_bytes(bytes[8..12].try_into().unwrap());

        let kind = PropertyKind::try_from(raw_kind)?;
        if len == 0 || len as usize >= MAX_PROPERTY_DATA_LEN {
            return Err(WireError::PropertyLengthOutOfRange {
                len,
                max: MAX_PROPERTY_DATA_LEN as u32,
            });
        }

        Ok(Self { entity_id, kind, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_header_round_trip() {
        let header = PropertyHeader::new(3, PropertyKind::Velocity, 24);
        let decoded = PropertyHeader::decode(&header.encode()).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn zero_length_is_a_violation() {
        let bytes = PropertyHeader::new(0, PropertyKind::Pose, 0).encode();
        assert_eq!(
            PropertyHeader::decode(&bytes),
            Err(WireError::PropertyLengthOutOfRange {
                len: 0,
                max: MAX_PROPERTY_DATA_LEN as u32,
            })
        );
    }

    #[test]
    fn oversized_length_is_a_violation() {
        let bytes = PropertyHeader::new(0, PropertyKind::Pose, MAX_PROPERTY_DATA_LEN as u32).encode();
        assert!(PropertyHeader::decode(&bytes).is_err());
    }

    #[test]
    fn unknown_kind_is_a_violation() {
        let mut bytes = PropertyHeader::new(1, PropertyKind::Pose, 8).encode();
        bytes[4..8].copy_from_slice(&77u32.to_le_bytes());
        assert_eq!(
            PropertyHeader::decode(&bytes),
            Err(WireError::UnknownPropertyKind { value: 77, max: 5 })
        );
    }

    #[test]
    fn wire_order_matches_declaration_order() {
        for (i, kind) in PropertyKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
