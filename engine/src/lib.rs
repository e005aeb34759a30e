//! # Worldsync Engine
//! Keeps a server's authoritative simulation world and one or more remote
//! replicas synchronized over byte-stream connections, once per simulation
//! step: connection multiplexing, per-entity per-connection dirty-bit
//! property propagation, full-state snapshot transfer for new subscribers,
//! and step-lockstep coordination.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod command;
mod config;
mod connection;
mod coordinator;
mod error;
mod snapshot;
mod sync;
mod timer;
mod transport;
mod world;

pub use config::{EngineConfig, Pacing};
pub use connection::{
    poller::{poll_connections, PollReport, PollTimeout, Readiness},
    Connection, ConnectionRegistry, DirtyMask, DirtyMatrix, PeerRole,
};
pub use coordinator::StepCoordinator;
pub use error::{ConnectionError, FatalError};
pub use snapshot::{read_background, read_entities, read_matrix, write_snapshot};
pub use sync::{read_properties, write_dirty};
pub use timer::StepTimer;
pub use transport::{connect, Listener};
pub use world::{
    Background, Entity, Matrix, PropertyChange, Simulator, World, WorldError,
};

pub use worldsync_shared::{
    EntityId, EntityKind, Header, MsgType, Opcode, PropertyKind, Role, StepNum,
};
