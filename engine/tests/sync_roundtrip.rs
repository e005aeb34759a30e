//! Loopback tests of the property sync engine: byte-identical round trips,
//! dirty-bit clearing, deterministic emission order, and fault isolation.

use std::io;
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::thread;
use std::time::Duration;

use worldsync_engine::{
    read_properties, write_dirty, Connection, ConnectionRegistry, EngineConfig, EntityKind,
    Matrix, MsgType, Pacing, PropertyChange, PropertyKind, Role, Simulator, StepCoordinator,
    StepNum, World,
};
use worldsync_shared::{read_header, read_packet, write_packet, Header, PropertyHeader};

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

fn test_world() -> World {
    let mut world = World::new(Matrix::new(64, 64));
    let ground = world.spawn(EntityKind::Ground, None).unwrap();
    let robot = world.spawn(EntityKind::Robot, Some(ground)).unwrap();
    let sensor = world.spawn(EntityKind::RangeSensor, Some(robot)).unwrap();
    let beacon = world.spawn(EntityKind::Beacon, None).unwrap();
    assert_eq!((ground, robot, sensor, beacon), (0, 1, 2, 3));
    world
}

/// Reads one announced property batch off the raw peer stream.
fn read_batch(stream: &mut TcpStream) -> Vec<(u32, PropertyKind, Vec<u8>)> {
    let header = read_header(stream).unwrap();
    assert_eq!(header.msg_type, MsgType::PropertyPackets);

    let mut records = Vec::new();
    for _ in 0..header.data {
        let mut header_bytes = [0; 12];
        assert_eq!(read_packet(stream, &mut header_bytes).unwrap(), 12);
        let prop = PropertyHeader::decode(&header_bytes).unwrap();
        let mut payload = vec![0; prop.len as usize];
        assert_eq!(read_packet(stream, &mut payload).unwrap(), payload.len());
        records.push((prop.entity_id, prop.kind, payload));
    }
    records
}

#[test]
fn round_trip_reproduces_payload_and_addressing() {
    let (near, far) = pair();

    let mut world = test_world();
    world
        .entity_mut(1)
        .unwrap()
        .set_property(PropertyKind::Pose, &[1, 2, 3, 4, 5, 6, 7, 8])
        .unwrap();
    world
        .entity_mut(2)
        .unwrap()
        .set_property(PropertyKind::Color, &[0xAA, 0xBB, 0xCC, 0xDD])
        .unwrap();

    let mut sender = Connection::new(near);
    sender.set_subscribed(true);
    sender.dirty_mut().mark(1, PropertyKind::Pose);
    sender.dirty_mut().mark(2, PropertyKind::Color);

    assert_eq!(write_dirty(&world, &mut sender).unwrap(), 2);

    // receiving side: same entity skeleton, no values yet
    let mut replica = test_world();
    let mut registry = ConnectionRegistry::new(false);
    registry.add(far);

    let header = registry.get_mut(0).unwrap().read_header().unwrap();
    assert_eq!(header.msg_type, MsgType::PropertyPackets);
    assert_eq!(header.data, 2);
    read_properties(&mut registry, 0, &mut replica, header.data).unwrap();

    assert_eq!(
        replica.entity(1).unwrap().property(PropertyKind::Pose),
        &[1, 2, 3, 4, 5, 6, 7, 8]
    );
    assert_eq!(
        replica.entity(2).unwrap().property(PropertyKind::Color),
        &[0xAA, 0xBB, 0xCC, 0xDD]
    );
}

#[test]
fn dirty_bits_clear_after_a_successful_pass() {
    let (near, _far) = pair();

    let mut world = test_world();
    world
        .entity_mut(0)
        .unwrap()
        .set_property(PropertyKind::Size, &[9; 16])
        .unwrap();

    let mut sender = Connection::new(near);
    sender.set_subscribed(true);
    sender.dirty_mut().mark(0, PropertyKind::Size);
    // an empty-value dirty pair is skipped but still cleared
    sender.dirty_mut().mark(3, PropertyKind::Label);

    assert_eq!(write_dirty(&world, &mut sender).unwrap(), 1);
    assert!(sender.dirty().is_clear());

    // nothing left: a second pass announces nothing
    assert_eq!(write_dirty(&world, &mut sender).unwrap(), 0);
}

#[test]
fn unsubscribed_connections_send_nothing() {
    let (near, _far) = pair();

    let mut world = test_world();
    world
        .entity_mut(0)
        .unwrap()
        .set_property(PropertyKind::Pose, &[1; 8])
        .unwrap();

    let mut sender = Connection::new(near);
    sender.dirty_mut().mark(0, PropertyKind::Pose);

    assert_eq!(write_dirty(&world, &mut sender).unwrap(), 0);
    // the bit survives until the connection actually subscribes
    assert!(sender.dirty().is_dirty(0, PropertyKind::Pose));
}

#[test]
fn emission_order_is_entity_then_property_ascending() {
    let (near, mut far) = pair();

    let mut world = test_world();
    for id in [1, 2, 3] {
        world
            .entity_mut(id)
            .unwrap()
            .set_property(PropertyKind::Pose, &[id as u8; 8])
            .unwrap();
        world
            .entity_mut(id)
            .unwrap()
            .set_property(PropertyKind::Velocity, &[id as u8; 8])
            .unwrap();
    }

    let mut sender = Connection::new(near);
    sender.set_subscribed(true);

    // first call: dirty set {(e1, Pose), (e3, Velocity)} marked out of order
    sender.dirty_mut().mark(3, PropertyKind::Velocity);
    sender.dirty_mut().mark(1, PropertyKind::Pose);
    write_dirty(&world, &mut sender).unwrap();

    // second call: {(e2, Pose)}
    sender.dirty_mut().mark(2, PropertyKind::Pose);
    write_dirty(&world, &mut sender).unwrap();

    let first = read_batch(&mut far);
    assert_eq!(
        first.iter().map(|(e, k, _)| (*e, *k)).collect::<Vec<_>>(),
        vec![(1, PropertyKind::Pose), (3, PropertyKind::Velocity)]
    );

    let second = read_batch(&mut far);
    assert_eq!(
        second.iter().map(|(e, k, _)| (*e, *k)).collect::<Vec<_>>(),
        vec![(2, PropertyKind::Pose)]
    );
}

#[test]
fn zero_length_property_header_destroys_only_the_offender() {
    let (attacker, attacker_far) = pair();
    let (bystander, _bystander_far) = pair();

    let mut world = test_world();
    world
        .entity_mut(0)
        .unwrap()
        .set_property(PropertyKind::Pose, &[5; 8])
        .unwrap();

    let mut coordinator = StepCoordinator::new(
        Role::Server,
        EngineConfig {
            pacing: Pacing::Fastest,
            ..EngineConfig::default()
        },
    );
    coordinator.add_connection(attacker_far);
    coordinator.add_connection(bystander);
    coordinator
        .registry_mut()
        .get_mut(1)
        .unwrap()
        .dirty_mut()
        .mark(0, PropertyKind::Pose);

    // a property record declaring length 0 is a protocol violation
    let mut attacker = attacker;
    write_packet(
        &mut attacker,
        &Header::new(MsgType::PropertyPackets, 1).encode(),
    )
    .unwrap();
    let mut bad_record = [0u8; 12];
    bad_record[0..4].copy_from_slice(&0u32.to_le_bytes());
    bad_record[4..8].copy_from_slice(&PropertyKind::Pose.to_wire().to_le_bytes());
    bad_record[8..12].copy_from_slice(&0u32.to_le_bytes());
    write_packet(&mut attacker, &bad_record).unwrap();
    thread::sleep(Duration::from_millis(30));

    coordinator.tick(&mut world, &mut NullSimulator).unwrap();

    // only the offender is gone; the bystander and its dirty state survive
    assert_eq!(coordinator.registry().len(), 1);
    assert!(coordinator
        .registry()
        .get(0)
        .unwrap()
        .dirty()
        .is_dirty(0, PropertyKind::Pose));
}
