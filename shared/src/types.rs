/// Simulation step counter. Advanced locally when no synchronous peers are
/// present, otherwise adopted from peer-reported `Continue` markers.
pub type StepNum = u32;

/// Stable identifier of an entity: its position in the world's flat entity
/// table. Never reused within a session.
pub type EntityId = u32;

/// Which end of a pose connection this engine instance is.
///
/// The server is step-authoritative and serves snapshot downloads; the client
/// bootstraps its replica with a download and acknowledges steps with
/// `Continue` markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Server,
    Client,
}

impl Role {
    pub fn invert(self) -> Self {
        match self {
            Role::Server => Role::Client,
            Role::Client => Role::Server,
        }
    }
}
