//! Packet framing over a byte stream. The wire has no inherent message
//! boundary beyond pre-declared sizes, so every read and write here loops
//! until the full packet has been transferred or the stream fails.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::{
    constants::HEADER_LEN,
    wire::{Header, MsgType, WireError},
};

/// Unrecoverable framing-level stream faults. Transient conditions
/// (interrupted or would-block writes) are retried internally and never
/// surface here.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The stream reported an error that is not a retryable condition.
    #[error("stream error after {transferred}/{expected} bytes: {source}")]
    Io {
        transferred: usize,
        expected: usize,
        #[source]
        source: io::Error,
    },

    /// A read was interrupted before the full packet arrived. Distinct from
    /// end-of-stream: the peer may still be alive, but the packet boundary
    /// is lost and the connection cannot be trusted further.
    #[error("read interrupted after {transferred}/{expected} bytes")]
    Interrupted { transferred: usize, expected: usize },

    /// The stream accepted zero bytes mid-write.
    #[error("write stalled after {transferred}/{expected} bytes")]
    WriteStalled { transferred: usize, expected: usize },
}

/// Faults while receiving a framed message: the stream failed, the peer
/// closed before the message was complete, or the bytes failed a wire-format
/// check.
#[derive(Debug, Error)]
pub enum RecvError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Wire(#[from] WireError),

    /// End-of-stream before the full message arrived. `received == 0` means
    /// the peer closed cleanly between messages.
    #[error("peer closed after {received}/{expected} bytes")]
    Closed { received: usize, expected: usize },
}

/// Writes all of `bytes` to the stream, retrying interrupted and would-block
/// results. Returns the byte count written (always `bytes.len()` on success).
pub fn write_packet<W: Write>(stream: &mut W, bytes: &[u8]) -> Result<usize, FrameError> {
    let mut written = 0;
    while written < bytes.len() {
        match stream.write(&bytes[written..]) {
            Ok(0) => {
                return Err(FrameError::WriteStalled {
                    transferred: written,
                    expected: bytes.len(),
                })
            }
            Ok(n) => written += n,
            Err(e)
                if e.kind() == io::ErrorKind::Interrupted
                    || e.kind() == io::ErrorKind::WouldBlock =>
            {
                continue
            }
            Err(source) => {
                return Err(FrameError::Io {
                    transferred: written,
                    expected: bytes.len(),
                    source,
                })
            }
        }
    }
    Ok(written)
}

/// Reads until `buf` is full or the stream ends. Returns the byte count
/// read; fewer than `buf.len()` means end-of-stream and the caller must
/// treat the connection as closed. An interrupted read is an error distinct
/// from end-of-stream.
pub fn read_packet<R: Read>(stream: &mut R, buf: &mut [u8]) -> Result<usize, FrameError> {
    let mut received = 0;
    while received < buf.len() {
        match stream.read(&mut buf[received..]) {
            Ok(0) => break,
            Ok(n) => received += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                return Err(FrameError::Interrupted {
                    transferred: received,
                    expected: buf.len(),
                })
            }
            Err(source) => {
                return Err(FrameError::Io {
                    transferred: received,
                    expected: buf.len(),
                    source,
                })
            }
        }
    }
    Ok(received)
}

/// Frames and writes one header.
pub fn write_header<W: Write>(
    stream: &mut W,
    msg_type: MsgType,
    data: u32,
) -> Result<usize, FrameError> {
    write_packet(stream, &Header::new(msg_type, data).encode())
}

/// Reads and decodes one header.
pub fn read_header<R: Read>(stream: &mut R) -> Result<Header, RecvError> {
    let mut bytes = [0; HEADER_LEN];
    let received = read_packet(stream, &mut bytes)?;
    if received < HEADER_LEN {
        return Err(RecvError::Closed {
            received,
            expected: HEADER_LEN,
        });
    }
    Ok(Header::decode(&bytes)?)
}
