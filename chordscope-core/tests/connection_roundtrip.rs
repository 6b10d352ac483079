//! End-to-end test against a local websocket server standing in for the
//! analysis engine.

use std::thread;
use std::time::{Duration, Instant};

use chordscope_core::{
    ConnectionEvent, ConnectionHandle, ConnectionState, ReconnectPolicy, Session, SoloMode,
};
use websocket::OwnedMessage;
use websocket::sync::Server;

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn frames_flow_in_and_commands_flow_out() {
    let mut server = Server::bind("127.0.0.1:0").unwrap();
    let port = server.local_addr().unwrap().port();

    let engine = thread::spawn(move || {
        let upgrade = server.accept().ok().expect("websocket upgrade");
        let mut client = upgrade.accept().ok().expect("websocket handshake");
        client
            .send_message(&OwnedMessage::Text(
                r#"{"MidiEvent":{"note":60,"mapped_note":64,"on":true}}"#.to_string(),
            ))
            .unwrap();
        client
            .send_message(&OwnedMessage::Text("not json".to_string()))
            .unwrap();
        client
            .send_message(&OwnedMessage::Text(r#""Beat""#.to_string()))
            .unwrap();

        // Wait for the client's solo-mode command, answering pings on the way.
        loop {
            match client.recv_message().unwrap() {
                OwnedMessage::Text(text) => {
                    let _ = client.send_message(&OwnedMessage::Close(None));
                    return text;
                }
                OwnedMessage::Ping(payload) => {
                    client.send_message(&OwnedMessage::Pong(payload)).unwrap();
                }
                _ => {}
            }
        }
    });

    let handle =
        ConnectionHandle::spawn(&format!("ws://127.0.0.1:{port}"), ReconnectPolicy::disabled())
            .unwrap();
    let mut session = Session::default();
    let mut frames = 0;
    let mut rejected = 0;
    let mut sent = false;

    loop {
        let event = handle.events().recv_timeout(WAIT).expect("connection event");
        match event {
            ConnectionEvent::State(state) => {
                session.connection_changed(state);
                if state.is_terminal() {
                    break;
                }
            }
            ConnectionEvent::Frame(text, received_at) => {
                frames += 1;
                assert!(received_at <= Instant::now());
                if session.handle_frame(&text, received_at).is_err() {
                    rejected += 1;
                }
                if frames == 3 && !sent {
                    let command = session.request_solo_mode(SoloMode::Nearest);
                    handle.send(&command).unwrap();
                    sent = true;
                }
            }
        }
    }

    let received = engine.join().unwrap();
    assert_eq!(received, r#"{"SoloMode":"Nearest"}"#);
    assert_eq!(frames, 3);
    assert_eq!(rejected, 1);
    assert_eq!(session.state().solo_mode(), SoloMode::Nearest);
    assert_eq!(session.connection(), ConnectionState::Closed);
    // Held notes are released once the link is gone.
    assert!(session.state().active_notes().is_empty());
    handle.shutdown();
}

#[test]
fn frames_keep_their_arrival_spacing_when_drained_together() {
    let mut server = Server::bind("127.0.0.1:0").unwrap();
    let port = server.local_addr().unwrap().port();
    let gap = Duration::from_millis(40);

    let engine = thread::spawn(move || {
        let upgrade = server.accept().ok().expect("websocket upgrade");
        let mut client = upgrade.accept().ok().expect("websocket handshake");
        for root in ["G", "C"] {
            let frame = format!(
                r#"{{"chord":{{"root":"{root}","flavor":"Major"}},"chord_inferences":[]}}"#
            );
            client.send_message(&OwnedMessage::Text(frame)).unwrap();
            thread::sleep(gap);
        }
        let _ = client.send_message(&OwnedMessage::Close(None));
    });

    let handle =
        ConnectionHandle::spawn(&format!("ws://127.0.0.1:{port}"), ReconnectPolicy::disabled())
            .unwrap();

    // Let both frames queue up, then apply them in one batch like a redraw tick.
    let mut events = Vec::new();
    loop {
        let event = handle.events().recv_timeout(WAIT).expect("connection event");
        let done = matches!(event, ConnectionEvent::State(ConnectionState::Closed));
        events.push(event);
        if done {
            break;
        }
    }
    engine.join().unwrap();

    let mut session = Session::default();
    for event in events {
        if let ConnectionEvent::Frame(text, received_at) = event {
            session.handle_frame(&text, received_at).unwrap();
        }
    }

    let entries = session.timeline().entries();
    assert_eq!(entries.len(), 2);
    let spacing = entries[1].observed_at - entries[0].observed_at;
    assert!(spacing >= gap / 2, "entries only {:?} apart", spacing);
    handle.shutdown();
}

#[test]
fn dropping_the_handle_closes_the_link() {
    let mut server = Server::bind("127.0.0.1:0").unwrap();
    let port = server.local_addr().unwrap().port();

    let engine = thread::spawn(move || {
        let upgrade = server.accept().ok().expect("websocket upgrade");
        let mut client = upgrade.accept().ok().expect("websocket handshake");
        // Returns once the client closes or the socket goes away.
        loop {
            match client.recv_message() {
                Ok(OwnedMessage::Close(_)) | Err(_) => return,
                Ok(_) => {}
            }
        }
    });

    let handle =
        ConnectionHandle::spawn(&format!("ws://127.0.0.1:{port}"), ReconnectPolicy::default())
            .unwrap();
    loop {
        let event = handle.events().recv_timeout(WAIT).expect("connection event");
        if event == ConnectionEvent::State(ConnectionState::Open) {
            break;
        }
    }
    drop(handle);
    engine.join().unwrap();
}
