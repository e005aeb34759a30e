use std::net::TcpStream;
use std::os::unix::io::{AsRawFd, RawFd};

use worldsync_shared::{read_header, read_packet, write_header, write_packet, Header, MsgType};

use crate::error::ConnectionError;

use super::dirty::DirtyMatrix;

/// How a peer participates in step coordination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerRole {
    /// Step acknowledgment from this peer gates simulation advancement.
    Sync,
    /// Observer; never gates the step.
    Async,
}

/// One peer socket, owned exclusively by the [`ConnectionRegistry`]. Carries
/// the peer's coordination role, its delta subscription state, and its own
/// dirty matrix, so destroying the connection drops all of its sync state
/// with it.
///
/// [`ConnectionRegistry`]: super::ConnectionRegistry
pub struct Connection {
    stream: TcpStream,
    role: PeerRole,
    subscribed: bool,
    dirty: DirtyMatrix,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            role: PeerRole::Async,
            subscribed: false,
            dirty: DirtyMatrix::new(),
        }
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    pub(crate) fn set_role(&mut self, role: PeerRole) {
        self.role = role;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn set_subscribed(&mut self, subscribed: bool) {
        self.subscribed = subscribed;
    }

    pub fn dirty(&self) -> &DirtyMatrix {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyMatrix {
        &mut self.dirty
    }

    pub(crate) fn raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }

    // Framed I/O with fault mapping. A short read anywhere inside a message
    // means the peer is gone or the stream desynchronized; either way the
    // connection is unusable, so it surfaces as a ConnectionError.

    pub fn read_header(&mut self) -> Result<Header, ConnectionError> {
        Ok(read_header(&mut self.stream)?)
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ConnectionError> {
        let received = read_packet(&mut self.stream, buf)?;
        if received < buf.len() {
            return Err(ConnectionError::Closed {
                received,
                expected: buf.len(),
            });
        }
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, ConnectionError> {
        Ok(write_packet(&mut self.stream, bytes)?)
    }

    pub fn write_header(&mut self, msg_type: MsgType, data: u32) -> Result<(), ConnectionError> {
        write_header(&mut self.stream, msg_type, data)?;
        Ok(())
    }
}
