//! Lockstep termination: a tick's input phase is gated by synchronous
//! peers' `Continue` acknowledgments, by the step timer, or both, depending
//! on pacing mode.

use std::io;
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use worldsync_engine::{
    EngineConfig, Matrix, MsgType, Pacing, PeerRole, PropertyChange, Role, Simulator,
    StepCoordinator, StepNum, World,
};
use worldsync_shared::write_header;

struct NullSimulator;

impl Simulator for NullSimulator {
    fn advance(&mut self, _world: &mut World, _step: StepNum) -> Vec<PropertyChange> {
        Vec::new()
    }

    fn save_to_file(&mut self, _world: &World, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

fn pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let near = TcpStream::connect(addr).unwrap();
    let (far, _) = listener.accept().unwrap();
    (near, far)
}

fn coordinator(pacing: Pacing) -> StepCoordinator {
    StepCoordinator::new(
        Role::Server,
        EngineConfig {
            pacing,
            ..EngineConfig::default()
        },
    )
}

#[test]
fn input_phase_waits_for_every_sync_peer() {
    let (mut peer_a, far_a) = pair();
    let (mut peer_b, far_b) = pair();

    let mut coordinator = coordinator(Pacing::Fastest);
    let a = coordinator.add_connection(far_a);
    let b = coordinator.add_connection(far_b);
    coordinator.registry_mut().set_role(a, PeerRole::Sync);
    coordinator.registry_mut().set_role(b, PeerRole::Sync);

    // first ack immediately, second only after a visible delay
    write_header(&mut peer_a, MsgType::Continue, 7).unwrap();
    let late = thread::spawn(move || {
        thread::sleep(Duration::from_millis(80));
        write_header(&mut peer_b, MsgType::Continue, 7).unwrap();
        peer_b
    });
    thread::sleep(Duration::from_millis(20));

    let mut world = World::new(Matrix::new(1, 1));
    let started = Instant::now();
    coordinator.tick(&mut world, &mut NullSimulator).unwrap();

    // the tick could not have ended before the late acknowledgment
    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(coordinator.step_num(), 7);
    assert_eq!(coordinator.registry().len(), 2);

    let _peer_b = late.join().unwrap();
}

#[test]
fn async_peer_does_not_gate_the_step() {
    let (_peer, far) = pair();

    let mut coordinator = coordinator(Pacing::RealTime(Duration::from_millis(40)));
    coordinator.add_connection(far);
    // default role is Async: the silent peer must not stall the tick

    let mut world = World::new(Matrix::new(1, 1));
    let started = Instant::now();
    coordinator.tick(&mut world, &mut NullSimulator).unwrap();

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(40), "ended before the timer");
    assert!(elapsed < Duration::from_secs(5), "stalled on the async peer");
    // with no sync peers the step advances locally
    assert_eq!(coordinator.step_num(), 1);
}

#[test]
fn fastest_mode_without_sync_peers_is_a_single_pass() {
    let (_peer, far) = pair();

    let mut coordinator = coordinator(Pacing::Fastest);
    coordinator.add_connection(far);

    let mut world = World::new(Matrix::new(1, 1));
    let started = Instant::now();
    for _ in 0..3 {
        coordinator.tick(&mut world, &mut NullSimulator).unwrap();
    }
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(coordinator.step_num(), 3);
}

#[test]
fn continue_marker_adopts_the_reported_step() {
    let (mut peer, far) = pair();

    let mut coordinator = coordinator(Pacing::Fastest);
    let index = coordinator.add_connection(far);
    coordinator.registry_mut().set_role(index, PeerRole::Sync);

    write_header(&mut peer, MsgType::Continue, 42).unwrap();
    thread::sleep(Duration::from_millis(20));

    let mut world = World::new(Matrix::new(1, 1));
    coordinator.tick(&mut world, &mut NullSimulator).unwrap();
    assert_eq!(coordinator.step_num(), 42);
}

#[test]
fn losing_the_last_sync_peer_pauses_a_lockstep_engine() {
    let (peer, far) = pair();

    let mut coordinator = StepCoordinator::new(
        Role::Server,
        EngineConfig {
            pacing: Pacing::Fastest,
            require_sync_peer: true,
            ..EngineConfig::default()
        },
    );
    let index = coordinator.add_connection(far);
    coordinator.registry_mut().set_role(index, PeerRole::Sync);
    assert!(!coordinator.registry().awaiting_sync_peers());

    // peer hangs up; the next tick observes the close and pauses
    drop(peer);
    thread::sleep(Duration::from_millis(20));

    let mut world = World::new(Matrix::new(1, 1));
    coordinator.tick(&mut world, &mut NullSimulator).unwrap();

    assert_eq!(coordinator.registry().len(), 0);
    assert!(coordinator.registry().awaiting_sync_peers());
}
