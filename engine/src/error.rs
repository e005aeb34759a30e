use std::io;

use thiserror::Error;

use worldsync_shared::{EntityId, FrameError, RecvError, WireError};

use crate::world::WorldError;

/// Faults scoped to a single peer connection. Observing one of these
/// destroys the owning connection and nothing else; every other peer's
/// in-flight state is untouched.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The stream failed at the framing level.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Bytes from the peer failed a wire-format check.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// End-of-stream before a full message arrived. `received == 0` means
    /// the peer closed cleanly between messages.
    #[error("peer closed after {received}/{expected} bytes")]
    Closed { received: usize, expected: usize },

    /// A property record addressed an entity this world does not know.
    #[error("unknown entity id {id} (world has {count} entities)")]
    UnknownEntity { id: EntityId, count: usize },

    /// Applying a peer-supplied value to the world failed.
    #[error(transparent)]
    World(#[from] WorldError),

    /// The poller flagged this descriptor as hung up or invalid.
    #[error("poll reported an error condition on the descriptor (revents {revents:#x})")]
    Descriptor { revents: i16 },
}

impl From<RecvError> for ConnectionError {
    fn from(error: RecvError) -> Self {
        match error {
            RecvError::Frame(e) => ConnectionError::Frame(e),
            RecvError::Wire(e) => ConnectionError::Wire(e),
            RecvError::Closed { received, expected } => {
                ConnectionError::Closed { received, expected }
            }
        }
    }
}

/// Faults fatal to the whole engine. Raised only when the runtime can no
/// longer reason about connection state at all; the expected response is a
/// diagnostic and a nonzero exit.
#[derive(Debug, Error)]
pub enum FatalError {
    /// The readiness-poll primitive itself failed for a reason other than
    /// benign interruption.
    #[error("connection multiplexing failed: {source}")]
    Poll {
        #[source]
        source: io::Error,
    },
}
