//! # Worldsync Shared
//! Wire protocol and packet framing shared between the server and client
//! roles of the worldsync engine.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod constants;
mod framer;
mod types;
mod wire;

pub use constants::{
    BACKGROUND_INFO_LEN, DEFAULT_PORT, ENTITY_RECORD_LEN, HEADER_LEN, MATRIX_INFO_LEN,
    MAX_BACKGROUND_PIXELS, MAX_PROPERTY_DATA_LEN, PROPERTY_HEADER_LEN,
};
pub use framer::{read_header, read_packet, write_header, write_packet, FrameError, RecvError};
pub use types::{EntityId, Role, StepNum};
pub use wire::{
    BackgroundInfo, EntityKind, EntityRecord, Header, MatrixInfo, MsgType, Opcode,
    PropertyHeader, PropertyKind, WireError,
};
