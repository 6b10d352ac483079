//! # Connection Module
//!
//! Owns the websocket link to the analysis engine on a dedicated worker
//! thread and hands inbound frames to whoever drains the event channel.
//!
//! ## Architecture
//! - **Worker thread**: connects, pumps outbound commands, reconnects with backoff
//! - **Reader thread**: one per open connection, forwards text frames verbatim
//! - **Communication**: crossbeam channels for events, commands and shutdown
//!
//! ## Lifecycle
//! `Disconnected → Connecting → Open`, back to `Disconnected` when the link
//! drops, and finally `Closed` once the worker gives up or is shut down.

use std::net::TcpStream;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, select};
use websocket::sync::{Client, Writer};
use websocket::{ClientBuilder, OwnedMessage};

use crate::command::ClientCommand;
use crate::config::ReconnectPolicy;
use crate::error::ConnectionError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
    /// Terminal: the worker will not connect again.
    Closed,
}

impl ConnectionState {
    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }

    pub fn is_terminal(self) -> bool {
        self == ConnectionState::Closed
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Open => "Connected",
            ConnectionState::Closed => "Connection lost",
        }
    }
}

/// What the worker reports back to the owner of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    State(ConnectionState),
    /// A text frame and the moment the reader received it.
    Frame(String, Instant),
}

/// Handle to the connection worker thread.
#[derive(Debug)]
pub struct ConnectionHandle {
    events_rx: Receiver<ConnectionEvent>,
    outbound_tx: Sender<OwnedMessage>,
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ConnectionHandle {
    /// Starts the worker thread.
    ///
    /// # Arguments
    /// * `endpoint` - Websocket URL of the engine (e.g., "ws://127.0.0.1:1234")
    /// * `policy` - Reconnect behavior once a connection drops or fails
    ///
    /// # Returns
    /// * `Ok(handle)` - The worker is running and will report its states
    /// * `Err(ConnectionError::InvalidEndpoint)` - The URL cannot be parsed
    pub fn spawn(endpoint: &str, policy: ReconnectPolicy) -> Result<Self, ConnectionError> {
        ClientBuilder::new(endpoint).map_err(|e| ConnectionError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let (outbound_tx, outbound_rx) = crossbeam_channel::unbounded();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);

        let worker = Worker {
            endpoint: endpoint.to_string(),
            policy,
            events_tx,
            outbound_rx,
            shutdown_rx,
        };
        let thread_handle = thread::spawn(move || worker.run());

        Ok(Self {
            events_rx,
            outbound_tx,
            shutdown_tx,
            thread_handle: Some(thread_handle),
        })
    }

    /// Queues a command for the engine. Fire-and-forget: nothing waits for an
    /// answer, and commands queued while offline are discarded on reconnect.
    pub fn send(&self, command: &ClientCommand) -> Result<(), ConnectionError> {
        let frame = command.to_frame()?;
        log::debug!("queueing command {}", frame);
        self.outbound_tx
            .send(OwnedMessage::Text(frame))
            .map_err(|_| ConnectionError::WorkerStopped)
    }

    /// Events received so far, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = ConnectionEvent> + '_ {
        self.events_rx.try_iter()
    }

    /// The raw event channel, for callers that want to block on it.
    pub fn events(&self) -> &Receiver<ConnectionEvent> {
        &self.events_rx
    }

    /// Stops the worker and waits for it to finish.
    pub fn shutdown(mut self) {
        let _ = self.shutdown_tx.try_send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("connection worker panicked");
            }
        }
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        // Signal only; the worker exits on its own once the link is torn down.
        let _ = self.shutdown_tx.try_send(());
    }
}

enum SessionEnd {
    Lost,
    Shutdown,
}

struct Worker {
    endpoint: String,
    policy: ReconnectPolicy,
    events_tx: Sender<ConnectionEvent>,
    outbound_rx: Receiver<OwnedMessage>,
    shutdown_rx: Receiver<()>,
}

impl Worker {
    fn run(self) {
        let mut attempt = 0;
        loop {
            self.report(ConnectionState::Connecting);
            match connect(&self.endpoint) {
                Ok(client) => {
                    attempt = 0;
                    log::info!("connected to {}", self.endpoint);
                    self.discard_stale_commands();
                    self.report(ConnectionState::Open);
                    if let SessionEnd::Shutdown = self.pump(client) {
                        break;
                    }
                    log::warn!("connection to {} lost", self.endpoint);
                }
                Err(e) => log::warn!("{}", e),
            }
            self.report(ConnectionState::Disconnected);

            let Some(delay) = self.policy.delay_for(attempt) else {
                log::info!("giving up on {}", self.endpoint);
                break;
            };
            attempt += 1;
            log::info!("reconnecting in {} ms (attempt {})", delay.as_millis(), attempt);
            match self.shutdown_rx.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.report(ConnectionState::Closed);
        log::info!("connection worker finished");
    }

    fn report(&self, state: ConnectionState) {
        let _ = self.events_tx.send(ConnectionEvent::State(state));
    }

    /// Drops commands queued while offline. Runs before `Open` is reported,
    /// so anything sent after that is delivered.
    fn discard_stale_commands(&self) {
        let stale = self.outbound_rx.try_iter().count();
        if stale > 0 {
            log::debug!("discarded {} commands queued while offline", stale);
        }
    }

    /// Runs one open connection until it drops or shutdown is requested.
    fn pump(&self, client: Client<TcpStream>) -> SessionEnd {
        let (mut reader, mut writer) = match client.split() {
            Ok(halves) => halves,
            Err(e) => {
                log::warn!("failed to split websocket stream: {}", e);
                return SessionEnd::Lost;
            }
        };

        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
        let events_tx = self.events_tx.clone();
        let (pong_tx, pong_rx) = crossbeam_channel::unbounded::<OwnedMessage>();
        let reader_thread = thread::spawn(move || {
            loop {
                match reader.recv_message() {
                    Ok(OwnedMessage::Text(text)) => {
                        let frame = ConnectionEvent::Frame(text, Instant::now());
                        if events_tx.send(frame).is_err() {
                            break;
                        }
                    }
                    Ok(OwnedMessage::Binary(bytes)) => {
                        log::warn!("dropping {}-byte binary frame", bytes.len());
                    }
                    Ok(OwnedMessage::Ping(payload)) => {
                        let _ = pong_tx.send(OwnedMessage::Pong(payload));
                    }
                    Ok(OwnedMessage::Pong(_)) => {}
                    Ok(OwnedMessage::Close(_)) => {
                        log::info!("engine closed the connection");
                        break;
                    }
                    Err(e) => {
                        log::warn!("websocket read failed: {}", e);
                        break;
                    }
                }
            }
            let _ = done_tx.send(());
        });

        let end = loop {
            let step = select! {
                recv(self.outbound_rx) -> message => match message {
                    Ok(message) => send_or_lose(&mut writer, &message),
                    // Every handle is gone.
                    Err(_) => Some(SessionEnd::Shutdown),
                },
                recv(pong_rx) -> pong => match pong {
                    Ok(pong) => send_or_lose(&mut writer, &pong),
                    Err(_) => Some(SessionEnd::Lost),
                },
                recv(done_rx) -> _ => Some(SessionEnd::Lost),
                recv(self.shutdown_rx) -> _ => {
                    let _ = writer.send_message(&OwnedMessage::Close(None));
                    Some(SessionEnd::Shutdown)
                },
            };
            if let Some(end) = step {
                break end;
            }
        };

        // Unblocks the reader if it is still waiting on the socket.
        if let Err(e) = writer.shutdown_all() {
            log::debug!("socket shutdown: {}", e);
        }
        if reader_thread.join().is_err() {
            log::error!("websocket reader panicked");
        }
        end
    }
}

fn send_or_lose(writer: &mut Writer<TcpStream>, message: &OwnedMessage) -> Option<SessionEnd> {
    match writer.send_message(message) {
        Ok(()) => None,
        Err(e) => {
            log::warn!("websocket write failed: {}", e);
            Some(SessionEnd::Lost)
        }
    }
}

fn connect(endpoint: &str) -> Result<Client<TcpStream>, ConnectionError> {
    let mut builder = ClientBuilder::new(endpoint).map_err(|e| ConnectionError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    builder
        .connect_insecure()
        .map_err(|e| ConnectionError::Connect {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Duration;

    #[test]
    fn state_helpers() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(ConnectionState::Closed.is_terminal());
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn rejects_unparseable_endpoint() {
        let result = ConnectionHandle::spawn("not a url", ReconnectPolicy::disabled());
        assert!(matches!(result, Err(ConnectionError::InvalidEndpoint { .. })));
    }

    #[test]
    fn refused_connection_without_reconnect_is_terminal() {
        // Grab a free port and release it so nothing is listening there.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let handle =
            ConnectionHandle::spawn(&format!("ws://127.0.0.1:{port}"), ReconnectPolicy::disabled())
                .unwrap();

        let mut states = Vec::new();
        while let Ok(event) = handle.events().recv_timeout(Duration::from_secs(5)) {
            if let ConnectionEvent::State(state) = event {
                states.push(state);
                if state.is_terminal() {
                    break;
                }
            }
        }
        assert_eq!(
            states,
            vec![
                ConnectionState::Connecting,
                ConnectionState::Disconnected,
                ConnectionState::Closed
            ]
        );
        handle.shutdown();
    }
}
