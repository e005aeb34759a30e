//! Full-state snapshot transfer: everything a fresh replica needs to
//! reconstruct the world from nothing, in a strict order. Matrix
//! dimensions, then background image, then entity tree, then the terminal
//! marker.

use log::{debug, info, warn};

use worldsync_shared::{
    BackgroundInfo, EntityId, EntityRecord, MatrixInfo, MsgType, BACKGROUND_INFO_LEN,
    ENTITY_RECORD_LEN, MATRIX_INFO_LEN,
};

use crate::{
    connection::Connection,
    error::ConnectionError,
    world::{Background, Matrix, World},
};

/// Serializes the entire world to `connection` in download order:
/// matrix → background → entities → `DownloadComplete`.
pub fn write_snapshot(world: &World, connection: &mut Connection) -> Result<(), ConnectionError> {
    write_matrix(world, connection)?;
    write_background(world, connection)?;
    write_entities(world, connection)?;
    connection.write_header(MsgType::DownloadComplete, 0)?;
    info!("snapshot download complete ({} entities)", world.entity_count());
    Ok(())
}

fn write_matrix(world: &World, connection: &mut Connection) -> Result<(), ConnectionError> {
    connection.write_header(MsgType::MatrixPacket, 0)?;
    let info = MatrixInfo::new(world.matrix().width(), world.matrix().height());
    connection.write_bytes(&info.encode())?;
    Ok(())
}

/// A world with no background sends a zero-dimension announcement with an
/// empty blob; the receiver reconstructs "no background" from it.
fn write_background(world: &World, connection: &mut Connection) -> Result<(), ConnectionError> {
    connection.write_header(MsgType::BackgroundPacket, 0)?;
    match world.background() {
        Some(background) => {
            let info =
                BackgroundInfo::new(background.width(), background.height(), background.scale());
            connection.write_bytes(&info.encode())?;
            connection.write_bytes(background.pixels())?;
        }
        None => {
            connection.write_bytes(&BackgroundInfo::new(0, 0, 0.0).encode())?;
        }
    }
    Ok(())
}

fn write_entities(world: &World, connection: &mut Connection) -> Result<(), ConnectionError> {
    let count = world.entity_count();
    connection.write_header(MsgType::EntityPackets, count as u32)?;

    for (id, entity) in world.entities() {
        let parent = match entity.parent() {
            None => EntityRecord::NO_PARENT,
            Some(parent) => {
                if parent as usize >= count {
                    warn!("parent index {parent} of entity {id} is out of range");
                }
                parent as i32
            }
        };
        let record = EntityRecord::new(id, parent, entity.kind());
        debug!("downloading entity {id}:{parent}:{:?}", entity.kind());
        connection.write_bytes(&record.encode())?;
    }
    Ok(())
}

/// Consumes a matrix body, replacing the world's occupancy matrix.
pub fn read_matrix(world: &mut World, connection: &mut Connection) -> Result<(), ConnectionError> {
    let mut bytes = [0; MATRIX_INFO_LEN];
    connection.read_exact(&mut bytes)?;
    let info = MatrixInfo::decode(&bytes);
    debug!("matrix {}x{}", info.size_x, info.size_y);
    world.set_matrix(Matrix::new(info.size_x, info.size_y));
    Ok(())
}

/// Consumes a background body and pixel blob, replacing the world's
/// background. A zero-dimension announcement clears it.
pub fn read_background(
    world: &mut World,
    connection: &mut Connection,
) -> Result<(), ConnectionError> {
    let mut bytes = [0; BACKGROUND_INFO_LEN];
    connection.read_exact(&mut bytes)?;
    let info = BackgroundInfo::decode(&bytes)?;

    if info.pixel_count() == 0 {
        debug!("empty background announcement; clearing");
        world.set_background(None);
        return Ok(());
    }

    let mut pixels = vec![0; info.pixel_count() as usize];
    connection.read_exact(&mut pixels)?;
    debug!(
        "background {}x{} at scale {} ({} pixels)",
        info.size_x,
        info.size_y,
        info.scale,
        pixels.len()
    );
    world.set_background(Some(Background::new(
        info.size_x,
        info.size_y,
        info.scale,
        pixels,
    )?));
    Ok(())
}

/// Consumes `count` entity records, reconstructing the tree top-down via the
/// entity factory. Producers emit entities in ascending id order, so a valid
/// parent index always refers to an already-created entity.
///
/// A parent index outside the already-reconstructed range is a degraded
/// case, not a fault: the entity is created unparented and a warning names
/// the record.
pub fn read_entities(
    world: &mut World,
    connection: &mut Connection,
    count: u32,
) -> Result<(), ConnectionError> {
    for _ in 0..count {
        let mut bytes = [0; ENTITY_RECORD_LEN];
        connection.read_exact(&mut bytes)?;
        let record = EntityRecord::decode(&bytes)?;

        let parent = if record.parent == EntityRecord::NO_PARENT {
            None
        } else if record.parent < 0 || record.parent as usize >= world.entity_count() {
            warn!(
                "parent index {} of entity {} is out of range; creating unparented",
                record.parent, record.id
            );
            None
        } else {
            Some(record.parent as EntityId)
        };

        let id = world.spawn(record.kind, parent)?;
        if id != record.id {
            warn!("entity arrived as id {} but was assigned {id}", record.id);
        }
        debug!("created entity {id}:{:?}:{:?}", parent, record.kind);
    }
    Ok(())
}
