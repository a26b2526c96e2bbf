//! Cross-network event invocation: only network-subscribed handlers
//! fire for remote invocations, and the server stamps the invoking
//! connection.

use std::cell::RefCell;
use std::rc::Rc;

use entsync_client::{Client, ClientConfig};
use entsync_server::{Server, ServerConfig};
use entsync_shared::EventArguments;
use entsync_test::helpers::{HubHandle, LoopbackClient, LoopbackServer};

fn ready_pair() -> (Server<LoopbackServer>, Client<LoopbackClient>, u32) {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());
    let transport = hub.connect_client();
    let conn = transport.connection_id();
    let mut client = Client::new(ClientConfig::default(), transport);

    client.tick(0.0);
    server.tick(0.0);
    client.tick(0.0);
    client.request_ready();
    server.tick(0.0);
    (server, client, conn)
}

#[test]
fn client_invocation_reaches_network_handlers_with_the_connection() {
    let (mut server, mut client, conn) = ready_pair();

    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = Rc::clone(&seen);
        server
            .events_mut()
            .subscribe_network("OnChatMessage", move |args| {
                seen.borrow_mut().push((
                    args.get_var::<String>("text"),
                    args.get_var::<u32>("connection"),
                ));
            });
    }

    let mut args = EventArguments::new();
    args.set_var("text", &"hello".to_string());
    client.invoke_event("OnChatMessage", &args, true);
    server.tick(0.0);

    assert_eq!(
        *seen.borrow(),
        vec![(Some("hello".to_string()), Some(conn))]
    );
}

#[test]
fn local_only_handlers_ignore_remote_invocations() {
    let (mut server, mut client, _conn) = ready_pair();

    let hits = Rc::new(RefCell::new(0));
    {
        let hits = Rc::clone(&hits);
        server
            .events_mut()
            .subscribe("OnChatMessage", move |_| *hits.borrow_mut() += 1);
    }

    client.invoke_event("OnChatMessage", &EventArguments::new(), true);
    server.tick(0.0);
    assert_eq!(*hits.borrow(), 0);

    // A local publish still reaches it
    server.invoke_event("OnChatMessage", &EventArguments::new(), false);
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn server_broadcast_reaches_ready_clients() {
    let (mut server, mut client, _conn) = ready_pair();

    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = Rc::clone(&seen);
        client
            .events_mut()
            .subscribe_network("OnMapChange", move |args| {
                seen.borrow_mut().push(args.get_var::<String>("map"));
            });
    }

    let mut args = EventArguments::new();
    args.set_var("map", &"dunes".to_string());
    server.invoke_event("OnMapChange", &args, true);
    client.tick(0.0);

    assert_eq!(*seen.borrow(), vec![Some("dunes".to_string())]);
}

#[test]
fn targeted_invocation_reaches_only_that_connection() {
    let hub = HubHandle::new();
    let mut server = Server::new(ServerConfig::default(), hub.server_transport());

    let transport_a = hub.connect_client();
    let conn_a = transport_a.connection_id();
    let mut client_a = Client::new(ClientConfig::default(), transport_a);
    let transport_b = hub.connect_client();
    let mut client_b = Client::new(ClientConfig::default(), transport_b);

    for client in [&mut client_a, &mut client_b] {
        client.tick(0.0);
    }
    server.tick(0.0);
    for client in [&mut client_a, &mut client_b] {
        client.tick(0.0);
        client.request_ready();
    }
    server.tick(0.0);

    let hits_a = Rc::new(RefCell::new(0));
    let hits_b = Rc::new(RefCell::new(0));
    {
        let hits_a = Rc::clone(&hits_a);
        client_a
            .events_mut()
            .subscribe_network("OnWhisper", move |_| *hits_a.borrow_mut() += 1);
        let hits_b = Rc::clone(&hits_b);
        client_b
            .events_mut()
            .subscribe_network("OnWhisper", move |_| *hits_b.borrow_mut() += 1);
    }

    server.invoke_event_on(conn_a, "OnWhisper", &EventArguments::new());
    client_a.tick(0.0);
    client_b.tick(0.0);

    assert_eq!(*hits_a.borrow(), 1);
    assert_eq!(*hits_b.borrow(), 0);
}
