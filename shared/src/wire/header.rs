use crate::constants::HEADER_LEN;

use super::error::WireError;

/// Tag identifying what follows a framing header on the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MsgType {
    /// Control opcode in the header's data word; no body.
    Command,
    /// `data` property records follow, each a property header plus payload.
    PropertyPackets,
    /// `data` entity records follow.
    EntityPackets,
    /// A matrix body follows.
    MatrixPacket,
    /// A background body plus pixel blob follows.
    BackgroundPacket,
    /// Terminal marker of a snapshot download; no body.
    DownloadComplete,
    /// Step acknowledgment; the data word is the peer's step number.
    Continue,
}

impl MsgType {
    pub fn to_wire(self) -> u32 {
        match self {
            MsgType::Command => 0,
            MsgType::PropertyPackets => 1,
            MsgType::EntityPackets => 2,
            MsgType::MatrixPacket => 3,
            MsgType::BackgroundPacket => 4,
            MsgType::DownloadComplete => 5,
            MsgType::Continue => 6,
        }
    }
}

impl TryFrom<u32> for MsgType {
    type Error = WireError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MsgType::Command),
            1 => Ok(MsgType::PropertyPackets),
            2 => Ok(MsgType::EntityPackets),
            3 => Ok(MsgType::MatrixPacket),
            4 => Ok(MsgType::BackgroundPacket),
            5 => Ok(MsgType::DownloadComplete),
            6 => Ok(MsgType::Continue),
            value => Err(WireError::UnknownMessageType { value }),
        }
    }
}

/// The atomic framing unit: a message-type tag plus one auxiliary data word.
/// The meaning of `data` depends on the type: a record count, a step number,
/// a command opcode, or unused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub msg_type: MsgType,
    pub data: u32,
}

impl Header {
    pub fn new(msg_type: MsgType, data: u32) -> Self {
        Self { msg_type, data }
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.msg_type.to_wire().to_le_bytes());
        bytes[4..8].copy_from_slice(&self.data.to_le_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8; HEADER_LEN]) -> Result<Self, WireError> {
        let raw_type = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let data = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        Ok(Self {
            msg_type: MsgType::try_from(raw_type)?,
            data,
        })
    }
}
