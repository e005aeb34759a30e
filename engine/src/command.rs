//! Decoding and dispatch of control opcodes arriving interleaved with data
//! packets.

use std::path::Path;

use log::{debug, info, warn};

use worldsync_shared::Opcode;

use crate::{
    connection::ConnectionRegistry,
    error::ConnectionError,
    snapshot::write_snapshot,
    world::{Simulator, World},
};

/// Handles one command from connection `index`. Unknown opcodes are logged
/// and ignored, never fatal; a failed snapshot write is a fault on the
/// requesting connection.
pub(crate) fn dispatch<S: Simulator>(
    raw_opcode: u32,
    index: usize,
    registry: &mut ConnectionRegistry,
    world: &mut World,
    simulator: &mut S,
    save_path: &Path,
) -> Result<(), ConnectionError> {
    let opcode = match Opcode::try_from(raw_opcode) {
        Ok(opcode) => opcode,
        Err(error) => {
            warn!("ignoring command on connection {index}: {error}");
            return Ok(());
        }
    };

    match opcode {
        Opcode::Pause => {
            world.toggle_enabled();
            info!(
                "simulation {} by connection {index}",
                if world.is_enabled() { "resumed" } else { "paused" }
            );
        }
        Opcode::Subscribe => {
            debug!("connection {index} subscribed to property deltas");
            if let Some(connection) = registry.get_mut(index) {
                connection.set_subscribed(true);
            }
        }
        Opcode::Download => {
            info!("connection {index} requested a world download");
            if let Some(connection) = registry.get_mut(index) {
                write_snapshot(world, connection)?;
            }
        }
        Opcode::Save => {
            info!("connection {index} requested a world save");
            if let Err(error) = simulator.save_to_file(world, save_path) {
                warn!("failed to save world to {}: {error}", save_path.display());
            }
        }
    }
    Ok(())
}
