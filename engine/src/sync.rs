//! Per-step property synchronization: ingesting property records from peers
//! and emitting each connection's dirty properties.

use log::{debug, trace};

use worldsync_shared::{
    MsgType, PropertyHeader, PropertyKind, MAX_PROPERTY_DATA_LEN, PROPERTY_HEADER_LEN,
};

use crate::{
    connection::{Connection, ConnectionRegistry},
    error::ConnectionError,
    world::World,
};

/// Reads `count` property records from connection `source` and applies them
/// to the world. Every applied property is marked dirty on every *other*
/// connection, so a change ingested from one peer propagates onward without
/// echoing back to its sender.
///
/// Any validation failure (unknown property kind, payload length outside
/// `[1, MAX_PROPERTY_DATA_LEN)`, unknown entity id, payload over the kind's
/// limit) is a connection fault; the caller destroys `source`.
pub fn read_properties(
    registry: &mut ConnectionRegistry,
    source: usize,
    world: &mut World,
    count: u32,
) -> Result<(), ConnectionError> {
    let mut buffer = [0; MAX_PROPERTY_DATA_LEN];
    let mut applied = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let Some(connection) = registry.get_mut(source) else {
            return Ok(());
        };

        let mut header_bytes = [0; PROPERTY_HEADER_LEN];
        connection.read_exact(&mut header_bytes)?;
        let header = PropertyHeader::decode(&header_bytes)?;

        let payload = &mut buffer[..header.len as usize];
        connection.read_exact(payload)?;

        let entity_count = world.entity_count();
        let entity = world
            .entity_mut(header.entity_id)
            .ok_or(ConnectionError::UnknownEntity {
                id: header.entity_id,
                count: entity_count,
            })?;
        entity.set_property(header.kind, payload)?;
        trace!(
            "applied property {:?} of entity {} ({} bytes) from connection {source}",
            header.kind,
            header.entity_id,
            header.len
        );
        applied.push((header.entity_id, header.kind));
    }

    for (entity, kind) in applied {
        registry.mark_dirty_except(source, entity, kind);
    }
    Ok(())
}

/// Emits one subscribed connection's dirty properties: announces the record
/// count, then streams each record in (entity-ascending, property-ascending)
/// order, clearing each dirty bit immediately after its bytes are written.
///
/// A dirty property whose current serialized value is empty is skipped with
/// a debug log, there being nothing to send, and its bit is cleared like the
/// others. The announced count includes only records actually streamed, so
/// the receiver's framing never runs ahead of the bytes.
///
/// Returns the number of records sent. Unsubscribed connections send
/// nothing.
pub fn write_dirty(world: &World, connection: &mut Connection) -> Result<usize, ConnectionError> {
    if !connection.is_subscribed() {
        return Ok(0);
    }

    let send_count = count_sendable(world, connection);
    if send_count > 0 {
        connection.write_header(MsgType::PropertyPackets, send_count as u32)?;
    }

    for (id, entity) in world.entities() {
        for kind in PropertyKind::ALL {
            if !connection.dirty().is_dirty(id, kind) {
                continue;
            }
            let value = entity.property(kind);
            if value.is_empty() {
                debug!("skipping empty dirty property {kind:?} of entity {id}");
                connection.dirty_mut().clear(id, kind);
                continue;
            }
            let header = PropertyHeader::new(id, kind, value.len() as u32);
            connection.write_bytes(&header.encode())?;
            connection.write_bytes(value)?;
            // clean only now that the bytes are confirmed written; it won't
            // be re-sent until marked dirty again
            connection.dirty_mut().clear(id, kind);
        }
    }

    Ok(send_count)
}

/// Dirty (entity, property) pairs that will actually be streamed: pairs
/// whose current value is non-empty.
fn count_sendable(world: &World, connection: &Connection) -> usize {
    let mut count = 0;
    for (id, entity) in world.entities() {
        for kind in PropertyKind::ALL {
            if connection.dirty().is_dirty(id, kind) && !entity.property(kind).is_empty() {
                count += 1;
            }
        }
    }
    count
}
