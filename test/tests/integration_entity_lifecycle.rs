//! Spawn/destroy flow over the loopback: fanout to ready observers,
//! cascade teardown order on the wire, and late-joiner catch-up.

use entsync_client::{Client, ClientConfig, NullBehavior as ClientNull};
use entsync_server::{NullBehavior as ServerNull, Server, ServerConfig};
use entsync_shared::{DestroyEntity, MsgType, Quat, Serde, Vec3};
use entsync_test::helpers::{HubHandle, LoopbackClient, LoopbackServer};

fn ready_pair() -> (Server<LoopbackServer>, Client<LoopbackClient>, HubHandle) {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    let mut client = Client::new(ClientConfig::default(), hub.connect_client());
    server.register_template("crate", || Box::new(ServerNull));
    client.register_template("crate", || Box::new(ClientNull));

    client.tick(0.0);
    server.tick(0.0);
    client.tick(0.0);
    client.request_ready();
    server.tick(0.0);
    (server, client, hub)
}

#[test]
fn spawned_entities_reach_the_ready_observer() {
    let (mut server, mut client, _hub) = ready_pair();

    let a = server
        .spawn_entity("crate", None, Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY)
        .unwrap();
    let b = server
        .spawn_entity("crate", None, Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    client.tick(0.0);

    assert_eq!((a, b), (0, 1));
    assert_eq!(client.registry().len(), 2);
    let mirrored = client.registry().get_by_net_id(a).unwrap();
    assert_eq!(mirrored.position(), Vec3::new(1.0, 0.0, 0.0));
    assert!(!mirrored.has_authority());
}

#[test]
fn cascade_destroy_emits_children_first() {
    let (mut server, mut client, hub) = ready_pair();

    let parent = server
        .spawn_entity("crate", None, Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    let child = server
        .spawn_entity("crate", None, Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    let grandchild = server
        .spawn_entity("crate", None, Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    server.set_parent(child, parent).unwrap();
    server.set_parent(grandchild, child).unwrap();
    hub.clear_server_sent();

    server.destroy_entity(parent).unwrap();

    let destroyed: Vec<u32> = hub
        .server_sent()
        .iter()
        .filter(|(_, msg_type, _)| *msg_type == MsgType::DestroyEntity)
        .map(|(_, _, payload)| DestroyEntity::from_bytes(payload).unwrap().id)
        .collect();
    assert_eq!(destroyed, vec![grandchild, child, parent]);

    client.tick(0.0);
    assert!(client.registry().is_empty());
}

#[test]
fn destroy_all_resets_the_id_allocator() {
    let (mut server, mut client, _hub) = ready_pair();

    server
        .spawn_entity("crate", None, Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    server
        .spawn_entity("crate", None, Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    server.destroy_all_entities();
    client.tick(0.0);
    assert!(client.registry().is_empty());

    let id = server
        .spawn_entity("crate", None, Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    assert_eq!(id, 0);
}

#[test]
fn late_joiner_catches_up_on_request() {
    let (mut server, _client, hub) = ready_pair();
    let id = server
        .spawn_entity("crate", None, Vec3::new(0.0, 5.0, 0.0), Quat::IDENTITY)
        .unwrap();

    // Second client connects after the spawn
    let transport = hub.connect_client();
    let late_conn = transport.connection_id();
    let mut late_client = Client::new(ClientConfig::default(), transport);
    late_client.register_template("crate", || Box::new(ClientNull));
    late_client.tick(0.0);
    server.tick(0.0);
    late_client.tick(0.0);
    late_client.request_ready();
    server.tick(0.0);

    // Readiness alone replays nothing
    late_client.tick(0.0);
    assert!(late_client.registry().is_empty());

    server.send_entity_to_connection(id, late_conn).unwrap();
    late_client.tick(0.0);
    let mirrored = late_client.registry().get_by_net_id(id).unwrap();
    assert_eq!(mirrored.position(), Vec3::new(0.0, 5.0, 0.0));
}

#[test]
fn duplicate_spawn_id_keeps_the_first_entity() {
    let (mut server, mut client, _hub) = ready_pair();
    let id = server
        .spawn_entity("crate", None, Vec3::new(7.0, 0.0, 0.0), Quat::IDENTITY)
        .unwrap();
    client.tick(0.0);

    // A duplicate arriving over the wire must not displace the mirror
    let conn = 0;
    server.send_entity_to_connection(id, conn).unwrap();
    client.tick(0.0);

    assert_eq!(client.registry().len(), 1);
    let mirrored = client.registry().get_by_net_id(id).unwrap();
    assert_eq!(mirrored.position(), Vec3::new(7.0, 0.0, 0.0));
}
