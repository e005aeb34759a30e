//! TCP transport setup: the server's listening socket and the client's
//! connect path. Everything past establishment speaks the framed protocol
//! over blocking streams.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use log::info;

use crate::connection::ConnectionRegistry;

/// Listening socket accepting pose connections. Accepting is nonblocking:
/// the coordinator drains pending connections once per tick, before
/// polling.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    pub fn bind(port: u16) -> io::Result<Self> {
        let inner = TcpListener::bind(("0.0.0.0", port))?;
        inner.set_nonblocking(true)?;
        info!("listening for pose connections on {}", inner.local_addr()?);
        Ok(Self { inner })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Accepts every pending connection into the registry. Returns how many
    /// were accepted; zero when nothing was pending.
    pub fn accept_into(&self, registry: &mut ConnectionRegistry) -> io::Result<usize> {
        let mut accepted = 0;
        loop {
            match self.inner.accept() {
                Ok((stream, addr)) => {
                    // the stream inherits the listener's nonblocking flag on
                    // some platforms; connection reads must block
                    stream.set_nonblocking(false)?;
                    stream.set_nodelay(true)?;
                    info!("accepted pose connection from {addr}");
                    registry.add(stream);
                    accepted += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(accepted)
    }
}

/// Client-side: connects to a server's pose port.
pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<TcpStream> {
    let stream = TcpStream::connect(addr)?;
    stream.set_nodelay(true)?;
    info!("connected to pose server at {}", stream.peer_addr()?);
    Ok(stream)
}
