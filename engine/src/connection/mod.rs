//! Peer connection bookkeeping: the per-connection dirty matrix, the
//! connection itself, the registry that owns all of them, and the readiness
//! poller that multiplexes their sockets.

mod connection;
mod dirty;
pub(crate) mod poller;
mod registry;

pub use connection::{Connection, PeerRole};
pub use dirty::{DirtyMask, DirtyMatrix};
pub use registry::ConnectionRegistry;
