//! Authentication and readiness flow: the module chain fold on both
//! ends, rejection, and server-side readiness gating.

use std::cell::RefCell;
use std::rc::Rc;

use entsync_client::{Client, ClientConfig, Module as ClientModule, NullBehavior as ClientNull};
use entsync_server::{Module as ServerModule, NullBehavior as ServerNull, Server, ServerConfig};
use entsync_shared::{HandshakeRequest, HandshakeResponse, Quat, Vec3};
use entsync_test::helpers::HubHandle;

struct Credentials {
    token: &'static str,
}

impl ClientModule for Credentials {
    fn on_send_handshake(&mut self, mut previous: HandshakeRequest) -> HandshakeRequest {
        previous.id_token = self.token.to_string();
        previous.secret = b"hunter2".to_vec();
        previous
    }
}

struct TokenIssuer;

impl ServerModule for TokenIssuer {
    fn on_respond_handshake(
        &mut self,
        mut previous: HandshakeResponse,
        id_token: &str,
        secret: &[u8],
    ) -> HandshakeResponse {
        if secret == b"hunter2" {
            previous.authentication_token = format!("session-{id_token}");
        } else {
            previous.allowed = false;
            previous.error = "bad secret".to_string();
        }
        previous
    }
}

struct Rejector;

impl ServerModule for Rejector {
    fn on_respond_handshake(
        &mut self,
        mut previous: HandshakeResponse,
        _id_token: &str,
        _secret: &[u8],
    ) -> HandshakeResponse {
        previous.allowed = false;
        previous.error = "server is closed".to_string();
        previous
    }
}

#[test]
fn accepted_handshake_authenticates_both_ends() {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    server.use_module(Box::new(TokenIssuer));

    let transport = hub.connect_client();
    let conn = transport.connection_id();
    let mut client = Client::new(ClientConfig::default(), transport);
    client.use_module(Box::new(Credentials { token: "player-17" }));

    client.tick(0.0);
    server.tick(0.0);
    client.tick(0.0);

    assert!(client.is_authenticated());
    assert_eq!(client.authentication_token(), "session-player-17");
    let connection = server.connection(conn).unwrap();
    assert!(connection.authenticated);
    assert_eq!(connection.id_token, "player-17");
    assert!(!connection.is_ready());
}

#[test]
fn rejected_handshake_disconnects_the_client() {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    server.use_module(Box::new(Rejector));

    let transport = hub.connect_client();
    let conn = transport.connection_id();
    let mut client = Client::new(ClientConfig::default(), transport);
    client.use_module(Box::new(Credentials { token: "player-17" }));

    let error = Rc::new(RefCell::new(String::new()));
    {
        let error = Rc::clone(&error);
        client
            .events_mut()
            .subscribe("OnClientAuthenticationError", move |args| {
                *error.borrow_mut() = args.get_var::<String>("error").unwrap_or_default();
            });
    }

    client.tick(0.0);
    server.tick(0.0);
    client.tick(0.0);
    server.tick(0.0);

    assert!(!client.is_authenticated());
    assert_eq!(*error.borrow(), "server is closed");
    assert!(!hub.is_connected(conn));
    assert!(server.connection(conn).is_none());
}

#[test]
fn empty_module_chain_allows_by_default() {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    let mut client = Client::new(ClientConfig::default(), hub.connect_client());

    client.tick(0.0);
    server.tick(0.0);
    client.tick(0.0);

    assert!(client.is_authenticated());
}

#[test]
fn readiness_is_gated_by_the_server() {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    server.register_template("crate", || Box::new(ServerNull));

    let transport = hub.connect_client();
    let conn = transport.connection_id();
    let mut client = Client::new(ClientConfig::default(), transport);
    client.register_template("crate", || Box::new(ClientNull));

    client.tick(0.0);
    server.tick(0.0);
    client.tick(0.0);

    // Server forbids readiness before the client asks
    server.set_local_readiness(conn, false);
    client.request_ready();
    server.tick(0.0);
    assert!(!server.connection(conn).unwrap().is_ready());

    // A gated observer receives no entity traffic
    server
        .spawn_entity("crate", None, Vec3::ZERO, Quat::IDENTITY)
        .unwrap();
    client.tick(0.0);
    assert!(client.registry().is_empty());

    // Permission restored; the client asks again
    server.set_local_readiness(conn, true);
    client.set_not_ready();
    server.tick(0.0);
    client.request_ready();
    server.tick(0.0);
    assert!(server.connection(conn).unwrap().is_ready());
}

#[test]
fn ready_before_authentication_is_ignored() {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    let transport = hub.connect_client();
    let conn = transport.connection_id();
    let mut client = Client::new(ClientConfig::default(), transport);

    // The client has not even processed its Connected event yet
    client.request_ready();
    server.tick(0.0);

    assert!(!client.is_ready());
    assert!(server.connection(conn).is_none() || !server.connection(conn).unwrap().is_ready());
}
