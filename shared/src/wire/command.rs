use super::error::WireError;

/// Control opcodes carried in the data word of a `Command` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Toggle the global simulation enable flag.
    Pause,
    /// Mark the sending connection eligible for delta property writes.
    Subscribe,
    /// Request a full world snapshot.
    Download,
    /// Ask the server to persist the world to file.
    Save,
}

impl Opcode {
    pub fn to_wire(self) -> u32 {
        match self {
            Opcode::Pause => 0,
            Opcode::Subscribe => 1,
            Opcode::Download => 2,
            Opcode::Save => 3,
        }
    }
}

impl TryFrom<u32> for Opcode {
    type Error = WireError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Opcode::Pause),
            1 => Ok(Opcode::Subscribe),
            2 => Ok(Opcode::Download),
            3 => Ok(Opcode::Save),
            value => Err(WireError::UnknownOpcode { value }),
        }
    }
}
