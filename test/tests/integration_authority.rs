//! The ownership model: the authority bit on spawn fanout, upstream
//! User Messages from the owner, and silent rejection of writes from
//! everyone else.

use entsync_client::{Client, ClientConfig, NullBehavior as ClientNull};
use entsync_server::{NullBehavior as ServerNull, Server, ServerConfig};
use entsync_shared::{Quat, Vec3};
use entsync_test::helpers::{HubHandle, LoopbackClient, LoopbackServer};

fn ready_client(
    hub: &HubHandle,
    server: &mut Server<LoopbackServer>,
) -> (Client<LoopbackClient>, u32) {
    let transport = hub.connect_client();
    let conn = transport.connection_id();
    let mut client = Client::new(ClientConfig::default(), transport);
    client.register_template("crate", || Box::new(ClientNull));
    client.tick(0.0);
    server.tick(0.0);
    client.tick(0.0);
    client.request_ready();
    server.tick(0.0);
    (client, conn)
}

#[test]
fn only_the_owner_sees_the_authority_bit() {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    server.register_template("crate", || Box::new(ServerNull));
    let (mut owner, owner_conn) = ready_client(&hub, &mut server);
    let (mut other, _other_conn) = ready_client(&hub, &mut server);

    let id = server
        .spawn_entity("crate", Some(owner_conn), Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    owner.tick(0.0);
    other.tick(0.0);

    assert!(owner.registry().get_by_net_id(id).unwrap().has_authority());
    assert!(!other.registry().get_by_net_id(id).unwrap().has_authority());
    assert_eq!(server.get_entity(id).unwrap().authority(), Some(owner_conn));
}

#[test]
fn owner_user_messages_reach_the_server() {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    server.register_template("crate", || Box::new(ServerNull));
    let (mut owner, owner_conn) = ready_client(&hub, &mut server);

    let id = server
        .spawn_entity("crate", Some(owner_conn), Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    owner.tick(0.0);

    owner.set_user_message(id, "input", &7u32).unwrap();
    owner.tick(0.050);
    server.tick(0.0);

    assert_eq!(
        server.get_entity(id).unwrap().get_user_message::<u32>("input"),
        Some(7)
    );
}

#[test]
fn non_owner_user_messages_are_silently_dropped() {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    server.register_template("crate", || Box::new(ServerNull));
    let (mut owner, owner_conn) = ready_client(&hub, &mut server);
    let (mut other, _other_conn) = ready_client(&hub, &mut server);

    let id = server
        .spawn_entity("crate", Some(owner_conn), Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    owner.tick(0.0);
    other.tick(0.0);

    owner.set_user_message(id, "input", &42u32).unwrap();
    owner.tick(0.050);
    server.tick(0.0);
    assert_eq!(
        server.get_entity(id).unwrap().get_user_message::<u32>("input"),
        Some(42)
    );

    // The impostor's write goes through the wire but changes nothing
    other.set_user_message(id, "input", &7u32).unwrap();
    other.tick(0.050);
    server.tick(0.0);
    assert_eq!(
        server.get_entity(id).unwrap().get_user_message::<u32>("input"),
        Some(42)
    );
}

#[test]
fn owned_entities_survive_their_owner_disconnecting() {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    server.register_template("crate", || Box::new(ServerNull));
    let (mut owner, owner_conn) = ready_client(&hub, &mut server);

    let id = server
        .spawn_entity("crate", Some(owner_conn), Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    owner.tick(0.0);

    server.kick(owner_conn);
    server.tick(0.0);

    assert!(server.connection(owner_conn).is_none());
    assert_eq!(server.get_entity(id).unwrap().authority(), Some(owner_conn));
}
