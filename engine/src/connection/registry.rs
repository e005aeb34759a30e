use std::net::TcpStream;

use log::{info, warn};

use worldsync_shared::{EntityId, PropertyKind};

use super::connection::{Connection, PeerRole};

/// Owns the set of active peer connections. The backing sequence has no
/// gaps: destroying connection `i` shifts every connection after it one
/// place left, preserving relative order. Indices are therefore stable only
/// between mutations.
pub struct ConnectionRegistry {
    connections: Vec<Connection>,
    sync_count: usize,
    require_sync: bool,
    awaiting_sync_peers: bool,
}

impl ConnectionRegistry {
    pub fn new(require_sync: bool) -> Self {
        Self {
            connections: Vec::new(),
            sync_count: 0,
            require_sync,
            awaiting_sync_peers: require_sync,
        }
    }

    /// Registers a new peer: role `Async`, not subscribed. Returns its
    /// current index.
    pub fn add(&mut self, stream: TcpStream) -> usize {
        self.connections.push(Connection::new(stream));
        let index = self.connections.len() - 1;
        info!("registered connection {index}");
        index
    }

    /// Closes and removes the connection at `index`, compacting the backing
    /// sequence. If this was the last synchronous peer while lockstep is
    /// mandatory, the simulation is flagged paused-awaiting-peers rather
    /// than left free-running.
    pub fn destroy(&mut self, index: usize) {
        if index >= self.connections.len() {
            warn!("destroy of unknown connection {index} ignored");
            return;
        }
        // dropping the connection closes the socket
        let connection = self.connections.remove(index);
        if connection.role() == PeerRole::Sync {
            self.sync_count -= 1;
            if self.sync_count == 0 && self.require_sync {
                warn!("lost the last synchronous peer; pausing until one returns");
                self.awaiting_sync_peers = true;
            }
        }
        info!(
            "closed connection {index}; {} remaining",
            self.connections.len()
        );
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Connection> {
        self.connections.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Connection> {
        self.connections.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Connection> {
        self.connections.iter_mut()
    }

    /// Number of synchronous peers whose acknowledgment gates the step.
    pub fn sync_count(&self) -> usize {
        self.sync_count
    }

    /// Changes a connection's coordination role, keeping the sync-peer count
    /// in step. Gaining a synchronous peer lifts the awaiting-peers pause.
    pub fn set_role(&mut self, index: usize, role: PeerRole) {
        let Some(connection) = self.connections.get_mut(index) else {
            warn!("set_role on unknown connection {index} ignored");
            return;
        };
        let previous = connection.role();
        if previous == role {
            return;
        }
        connection.set_role(role);
        match role {
            PeerRole::Sync => {
                self.sync_count += 1;
                self.awaiting_sync_peers = false;
            }
            PeerRole::Async => self.sync_count -= 1,
        }
    }

    /// True while lockstep is mandatory and no synchronous peer is
    /// connected; the coordinator skips `Advance` in that state.
    pub fn awaiting_sync_peers(&self) -> bool {
        self.awaiting_sync_peers
    }

    /// Marks a property dirty on every connection, after a local (physics)
    /// mutation.
    pub fn mark_dirty_all(&mut self, entity: EntityId, kind: PropertyKind) {
        for connection in &mut self.connections {
            connection.dirty_mut().mark(entity, kind);
        }
    }

    /// Marks a property dirty on every connection except `source`: a change
    /// ingested from a peer propagates to the others but never echoes back.
    pub fn mark_dirty_except(&mut self, source: usize, entity: EntityId, kind: PropertyKind) {
        for (index, connection) in self.connections.iter_mut().enumerate() {
            if index != source {
                connection.dirty_mut().mark(entity, kind);
            }
        }
    }

    pub(crate) fn raw_fds(&self) -> Vec<std::os::unix::io::RawFd> {
        self.connections.iter().map(|c| c.raw_fd()).collect()
    }
}
