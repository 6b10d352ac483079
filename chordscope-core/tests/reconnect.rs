//! Reconnect behavior of the connection worker against a local engine that
//! drops the first connection.

use std::thread;
use std::time::Duration;

use chordscope_core::{
    ClientCommand, ConnectionEvent, ConnectionHandle, ConnectionState, ReconnectPolicy, SoloMode,
};
use websocket::OwnedMessage;
use websocket::sync::Server;

const WAIT: Duration = Duration::from_secs(5);
const HEARTBEAT: &[u8] = b"heartbeat";

/// What the engine saw: the first connection's pong and the first text
/// frame on the second connection.
struct EngineLog {
    pong: Vec<u8>,
    first_command: String,
}

fn first_text(client: &mut websocket::sync::Client<std::net::TcpStream>) -> String {
    loop {
        match client.recv_message().unwrap() {
            OwnedMessage::Text(text) => return text,
            OwnedMessage::Ping(payload) => {
                client.send_message(&OwnedMessage::Pong(payload)).unwrap();
            }
            _ => {}
        }
    }
}

#[test]
fn reconnects_after_a_drop_and_discards_offline_commands() {
    let mut server = Server::bind("127.0.0.1:0").unwrap();
    let port = server.local_addr().unwrap().port();

    let engine = thread::spawn(move || {
        // First connection: ping, wait for the pong, then hang up.
        let mut client = server
            .accept()
            .ok()
            .expect("first upgrade")
            .accept()
            .ok()
            .expect("first handshake");
        client
            .send_message(&OwnedMessage::Ping(HEARTBEAT.to_vec()))
            .unwrap();
        let pong = loop {
            if let OwnedMessage::Pong(payload) = client.recv_message().unwrap() {
                break payload;
            }
        };
        let _ = client.send_message(&OwnedMessage::Close(None));
        drop(client);

        // Second connection: report the first command that arrives.
        let mut client = server
            .accept()
            .ok()
            .expect("second upgrade")
            .accept()
            .ok()
            .expect("second handshake");
        let first_command = first_text(&mut client);
        let _ = client.send_message(&OwnedMessage::Close(None));
        EngineLog {
            pong,
            first_command,
        }
    });

    let policy = ReconnectPolicy {
        enabled: true,
        initial_delay_ms: 200,
        max_delay_ms: 200,
        max_attempts: Some(3),
    };
    let handle = ConnectionHandle::spawn(&format!("ws://127.0.0.1:{port}"), policy).unwrap();

    let mut states = Vec::new();
    let mut opened = 0;
    while opened < 2 {
        let event = handle.events().recv_timeout(WAIT).expect("connection event");
        let ConnectionEvent::State(state) = event else {
            continue;
        };
        states.push(state);
        match state {
            ConnectionState::Open => opened += 1,
            // Queued while offline; must never reach the second connection.
            ConnectionState::Disconnected => handle
                .send(&ClientCommand::SoloMode(SoloMode::Transpose))
                .unwrap(),
            ConnectionState::Closed => panic!("worker gave up: {:?}", states),
            ConnectionState::Connecting => {}
        }
    }
    handle
        .send(&ClientCommand::SoloMode(SoloMode::Nearest))
        .unwrap();

    let log = engine.join().unwrap();
    assert_eq!(
        states,
        vec![
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Open,
        ]
    );
    assert_eq!(log.pong, HEARTBEAT);
    assert_eq!(log.first_command, r#"{"SoloMode":"Nearest"}"#);
    handle.shutdown();
}
