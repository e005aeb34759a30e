use std::{path::PathBuf, time::Duration};

use worldsync_shared::DEFAULT_PORT;

/// Pacing of the step loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pacing {
    /// Match each simulation step to this much wall-clock time. The input
    /// phase of a tick waits out the remainder of the step.
    RealTime(Duration),
    /// Run steps as fast as possible; the input phase never waits on the
    /// clock, only on lockstep acknowledgments.
    Fastest,
}

/// Contains Config properties which will be used by the synchronization
/// engine.
#[derive(Clone)]
pub struct EngineConfig {
    /// Step pacing: fixed wall-clock step, or fastest possible.
    pub pacing: Pacing,
    /// When true the simulation may only advance while at least one
    /// synchronous peer is connected; losing the last one pauses the
    /// simulation instead of letting it free-run.
    pub require_sync_peer: bool,
    /// How long to sleep per idle wait while no connections exist.
    pub idle_wait: Duration,
    /// TCP port used by `Listener::bind` and `connect` defaults.
    pub port: u16,
    /// Where the `Save` command persists the world to.
    pub save_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacing: Pacing::RealTime(Duration::from_millis(100)),
            require_sync_peer: false,
            idle_wait: Duration::from_millis(100),
            port: DEFAULT_PORT,
            save_path: PathBuf::from("world.save"),
        }
    }
}
