//! Pose replication end to end: snapshot buffering on the observer
//! and the render-delay interpolation pass.

use entsync_client::{Client, ClientConfig, NullBehavior as ClientNull};
use entsync_server::{NullBehavior as ServerNull, Server, ServerConfig};
use entsync_shared::{Quat, Vec3};
use entsync_test::helpers::{HubHandle, LoopbackClient, LoopbackServer};

fn ready_pair() -> (Server<LoopbackServer>, Client<LoopbackClient>, HubHandle) {
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

/// Spawns a pose-replicated entity and returns its id.
fn spawn_tracked(server: &mut Server<LoopbackServer>) -> u32 {
    let id = server
        .spawn_entity("crate", None, Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    server
        .get_entity_mut(id)
        .unwrap()
        .networked_position_and_rotation = true;
    id
}

#[test]
fn pose_snapshots_accumulate_on_the_observer() {
    let (mut server, mut client, hub) = ready_pair();
    let id = spawn_tracked(&mut server);
    client.tick(0.0);

    for step in 0..3 {
        hub.set_time(step * 30);
        server.tick(0.050);
    }
    client.tick(0.0);

    let mirrored = client.registry().get_by_net_id(id).unwrap();
    assert_eq!(mirrored.snapshots().len(), 3);
}

#[test]
fn snapshot_history_is_bounded() {
    let (mut server, mut client, hub) = ready_pair();
    let id = spawn_tracked(&mut server);
    client.tick(0.0);

    for step in 0..25 {
        hub.set_time(step * 30);
        server.tick(0.050);
        client.tick(0.0);
    }

    let mirrored = client.registry().get_by_net_id(id).unwrap();
    assert_eq!(mirrored.snapshots().len(), 20);
    // The newest sample survived the evictions
    assert_eq!(mirrored.snapshots().newest().unwrap().timestamp, 24 * 30);
}

#[test]
fn frame_renders_between_bracketing_snapshots() {
    let (mut server, mut client, hub) = ready_pair();
    let id = spawn_tracked(&mut server);
    client.tick(0.0);

    // Three samples: x = 0 at t10, x = 2 at t30, x = 4 at t50
    for (time, x) in [(10, 0.0), (30, 2.0), (50, 4.0)] {
        hub.set_time(time);
        server
            .set_position(id, Vec3::new(x, 0.0, 0.0))
            .unwrap();
        server.tick(0.050);
    }
    hub.set_time(60);
    client.tick(0.0);

    // render_delay = 10 * 0.002 = 0.020 s: sample ages are 0.010,
    // 0.030 and 0.050, so the render point sits halfway between the
    // two newest samples
    client.frame(0.002);
    let mirrored = client.registry().get_by_net_id(id).unwrap();
    assert!((mirrored.position().x - 3.0).abs() < 1e-4);
}

#[test]
fn frame_lands_exactly_on_a_snapshot_at_the_boundary() {
    let (mut server, mut client, hub) = ready_pair();
    let id = spawn_tracked(&mut server);
    client.tick(0.0);

    for (time, x) in [(10, 0.0), (30, 2.0), (50, 4.0)] {
        hub.set_time(time);
        server
            .set_position(id, Vec3::new(x, 0.0, 0.0))
            .unwrap();
        server.tick(0.050);
    }
    hub.set_time(60);
    client.tick(0.0);

    // render_delay = 10 * 0.003 = 0.030 s, the exact age of the
    // middle sample
    client.frame(0.003);
    let mirrored = client.registry().get_by_net_id(id).unwrap();
    assert!((mirrored.position().x - 2.0).abs() < 1e-4);
}

#[test]
fn stale_stream_eases_toward_the_newest_snapshot() {
    let (mut server, mut client, hub) = ready_pair();
    let id = spawn_tracked(&mut server);
    client.tick(0.0);

    hub.set_time(10);
    server.set_position(id, Vec3::new(10.0, 0.0, 0.0)).unwrap();
    server.tick(0.050);

    // A direct position set arrives after the last snapshot, so the
    // rendered pose and the newest snapshot disagree
    server.set_position(id, Vec3::ZERO).unwrap();
    client.tick(0.0);
    assert_eq!(
        client.registry().get_by_net_id(id).unwrap().position().x,
        0.0
    );

    // Long silence: the only snapshot is now 0.500 s old, so the pose
    // eases toward it with the render delay as the blend factor
    hub.set_time(510);
    client.frame(0.002);
    let mirrored = client.registry().get_by_net_id(id).unwrap();
    assert!((mirrored.position().x - 0.2).abs() < 1e-4);
}
