//! The step coordinator drives the read/advance/write cycle each tick:
//! ingest everything peers sent, advance the external simulation, emit dirty
//! state. In lockstep mode the input phase blocks until every synchronous
//! peer has acknowledged the current step with a `Continue` marker.

use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use log::{debug, info, warn};

use worldsync_shared::{MsgType, Opcode, Role, StepNum};

use crate::{
    command,
    config::{EngineConfig, Pacing},
    connection::{
        poller::{poll_connections, PollTimeout},
        ConnectionRegistry,
    },
    error::{ConnectionError, FatalError},
    snapshot, sync,
    timer::StepTimer,
    transport::Listener,
    world::{Simulator, World},
};

/// What one serviced message means for the input phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputEvent {
    None,
    /// A `Continue` marker: one peer acknowledged the current step.
    Ack,
    /// The terminal marker of a snapshot download.
    DownloadComplete,
}

/// One synchronization engine instance, server or client role. Owns the
/// connection registry and the step clock; the world and the simulation are
/// passed in per tick, never held.
pub struct StepCoordinator {
    role: Role,
    config: EngineConfig,
    registry: ConnectionRegistry,
    listener: Option<Listener>,
    timer: StepTimer,
    step_num: StepNum,
    downloading: bool,
}

impl StepCoordinator {
    pub fn new(role: Role, config: EngineConfig) -> Self {
        let step = match config.pacing {
            Pacing::RealTime(step) => step,
            Pacing::Fastest => std::time::Duration::ZERO,
        };
        Self {
            role,
            registry: ConnectionRegistry::new(config.require_sync_peer),
            listener: None,
            timer: StepTimer::new(step),
            step_num: 0,
            downloading: false,
            config,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn step_num(&self) -> StepNum {
        self.step_num
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ConnectionRegistry {
        &mut self.registry
    }

    /// Registers a freshly connected stream. Returns its current index.
    pub fn add_connection(&mut self, stream: TcpStream) -> usize {
        self.registry.add(stream)
    }

    /// Attaches a listening socket; pending connections are accepted at the
    /// start of every tick.
    pub fn attach_listener(&mut self, listener: Listener) {
        self.listener = Some(listener);
    }

    /// One full simulation tick: `AwaitInput → Advance → Emit`.
    pub fn tick<S: Simulator>(
        &mut self,
        world: &mut World,
        simulator: &mut S,
    ) -> Result<(), FatalError> {
        self.timer.arm();
        if let Some(listener) = &self.listener {
            if let Err(error) = listener.accept_into(&mut self.registry) {
                warn!("accept failed: {error}");
            }
        }
        self.await_input(world, simulator)?;
        self.advance(world, simulator);
        self.emit(world);
        Ok(())
    }

    /// Runs ticks until `cancel` is raised. The flag is checked once per
    /// tick boundary, so cancellation takes effect between steps, never in
    /// the middle of one.
    pub fn run<S: Simulator>(
        &mut self,
        world: &mut World,
        simulator: &mut S,
        cancel: &AtomicBool,
    ) -> Result<(), FatalError> {
        while !cancel.load(Ordering::Relaxed) {
            self.tick(world, simulator)?;
        }
        info!("cancellation observed; leaving the step loop");
        Ok(())
    }

    /// Client-role bootstrap on connection `index`: request a full download,
    /// consume the snapshot sequence until the terminal marker, then
    /// subscribe to deltas.
    pub fn bootstrap<S: Simulator>(
        &mut self,
        world: &mut World,
        simulator: &mut S,
        index: usize,
    ) -> Result<(), ConnectionError> {
        {
            let Some(connection) = self.registry.get_mut(index) else {
                return Ok(());
            };
            connection.write_header(MsgType::Command, Opcode::Download.to_wire())?;
        }
        self.downloading = true;
        while self.downloading {
            if self.service_connection(index, world, simulator)? == InputEvent::DownloadComplete {
                self.downloading = false;
            }
        }
        let Some(connection) = self.registry.get_mut(index) else {
            return Ok(());
        };
        connection.write_header(MsgType::Command, Opcode::Subscribe.to_wire())?;
        info!("replica bootstrapped: {} entities", world.entity_count());
        Ok(())
    }

    /// The input phase. Ends when the lockstep termination condition holds:
    /// with no synchronous peers, on step-timer expiry (real-time) or after
    /// a single poll pass (fastest); with synchronous peers, once their
    /// `Continue` count is reached AND the timer has fired (real-time) or
    /// immediately on reaching the count (fastest). A completed snapshot
    /// download also ends the phase.
    fn await_input<S: Simulator>(
        &mut self,
        world: &mut World,
        simulator: &mut S,
    ) -> Result<(), FatalError> {
        // nobody to talk to: idle until the step deadline
        if self.registry.is_empty() && !self.timer.expired() {
            thread::sleep(self.config.idle_wait);
        }

        // nothing reports step numbers, so the clock is ours to advance
        if self.registry.sync_count() == 0 {
            self.step_num = self.step_num.wrapping_add(1);
        }

        let mut acks = 0;
        loop {
            if self.registry.is_empty() {
                return Ok(());
            }

            let awaiting_acks = acks < self.registry.sync_count();
            let report = poll_connections(&self.registry, self.poll_timeout(awaiting_acks))?;

            // destroys compact the registry, so indices reported by the
            // poll shift left past each removal
            let mut removed: Vec<usize> = Vec::new();
            for event in &report.events {
                let shift = removed.iter().filter(|&&r| r < event.index).count();
                let index = event.index - shift;

                if event.fault {
                    let fault = ConnectionError::Descriptor {
                        revents: event.revents,
                    };
                    warn!("connection {index} fault: {fault}");
                    self.registry.destroy(index);
                    removed.push(event.index);
                    continue;
                }

                match self.service_connection(index, world, simulator) {
                    Ok(InputEvent::None) => {}
                    Ok(InputEvent::Ack) => acks += 1,
                    Ok(InputEvent::DownloadComplete) => {
                        self.downloading = false;
                        return Ok(());
                    }
                    Err(fault) => {
                        warn!("connection {index} fault: {fault}");
                        self.registry.destroy(index);
                        removed.push(event.index);
                    }
                }
            }

            let required = self.registry.sync_count();
            match self.config.pacing {
                Pacing::RealTime(_) => {
                    if acks >= required && self.timer.expired() {
                        return Ok(());
                    }
                }
                Pacing::Fastest => {
                    if acks >= required {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Reads and handles one framed message from connection `index`.
    fn service_connection<S: Simulator>(
        &mut self,
        index: usize,
        world: &mut World,
        simulator: &mut S,
    ) -> Result<InputEvent, ConnectionError> {
        let header = {
            let Some(connection) = self.registry.get_mut(index) else {
                return Ok(InputEvent::None);
            };
            connection.read_header()?
        };

        match header.msg_type {
            MsgType::PropertyPackets => {
                debug!("incoming properties ({}) on connection {index}", header.data);
                sync::read_properties(&mut self.registry, index, world, header.data)?;
                Ok(InputEvent::None)
            }
            MsgType::Command => {
                command::dispatch(
                    header.data,
                    index,
                    &mut self.registry,
                    world,
                    simulator,
                    &self.config.save_path,
                )?;
                Ok(InputEvent::None)
            }
            MsgType::EntityPackets => {
                debug!("incoming entities ({}) on connection {index}", header.data);
                let Some(connection) = self.registry.get_mut(index) else {
                    return Ok(InputEvent::None);
                };
                snapshot::read_entities(world, connection, header.data)?;
                Ok(InputEvent::None)
            }
            MsgType::MatrixPacket => {
                debug!("incoming matrix on connection {index}");
                let Some(connection) = self.registry.get_mut(index) else {
                    return Ok(InputEvent::None);
                };
                snapshot::read_matrix(world, connection)?;
                Ok(InputEvent::None)
            }
            MsgType::BackgroundPacket => {
                debug!("incoming background on connection {index}");
                let Some(connection) = self.registry.get_mut(index) else {
                    return Ok(InputEvent::None);
                };
                snapshot::read_background(world, connection)?;
                Ok(InputEvent::None)
            }
            MsgType::DownloadComplete => {
                debug!("download complete on connection {index}");
                Ok(InputEvent::DownloadComplete)
            }
            MsgType::Continue => {
                // adopt the peer-reported step
                self.step_num = header.data;
                Ok(InputEvent::Ack)
            }
        }
    }

    /// Advances the external simulation and marks its reported changes
    /// dirty on every connection. Skipped while paused or awaiting a
    /// mandatory synchronous peer.
    fn advance<S: Simulator>(&mut self, world: &mut World, simulator: &mut S) {
        if !world.is_enabled() || self.registry.awaiting_sync_peers() {
            return;
        }
        for change in simulator.advance(world, self.step_num) {
            self.registry.mark_dirty_all(change.entity, change.kind);
        }
    }

    /// Emits dirty properties to every subscribed connection; a client-role
    /// engine then acknowledges the step it just emitted. A fault destroys
    /// the offending connection only.
    fn emit(&mut self, world: &World) {
        let role = self.role;
        let step = self.step_num;

        let mut index = 0;
        while index < self.registry.len() {
            let result = match self.registry.get_mut(index) {
                Some(connection) => sync::write_dirty(world, connection).and_then(|_| {
                    if role == Role::Client {
                        connection.write_header(MsgType::Continue, step)?;
                    }
                    Ok(())
                }),
                None => Ok(()),
            };
            match result {
                Ok(()) => index += 1,
                Err(fault) => {
                    warn!("connection {index} fault during emit: {fault}");
                    self.registry.destroy(index);
                    // the next connection shifted into this slot
                }
            }
        }
    }

    /// Poll timeout policy: fastest mode never waits; real-time mode waits
    /// out the remainder of the step. Once the deadline has passed, the poll
    /// blocks without bound only while acknowledgments are still
    /// outstanding, since the peers are then the only thing left to wait
    /// for. Otherwise an expired timer polls immediately, draining whatever
    /// is pending before the phase ends.
    fn poll_timeout(&self, awaiting_acks: bool) -> PollTimeout {
        match self.config.pacing {
            Pacing::Fastest => PollTimeout::Immediate,
            Pacing::RealTime(_) => {
                if !self.timer.expired() {
                    PollTimeout::Bounded(self.timer.remaining())
                } else if awaiting_acks {
                    PollTimeout::Infinite
                } else {
                    PollTimeout::Immediate
                }
            }
        }
    }
}
