//! # Session Module
//!
//! Owns the live state and the chord timeline for one client and is the only
//! place either is mutated. Each inbound frame is decoded, applied and then
//! observed by the timeline before the next frame is handled.

use std::time::Instant;

use crate::command::{ClientCommand, SoloMode};
use crate::config::ClientConfig;
use crate::connection::ConnectionState;
use crate::error::DecodeError;
use crate::protocol::{self, ServerEvent};
use crate::state::LiveState;
use crate::timeline::Timeline;

#[derive(Debug, Clone)]
pub struct Session {
    state: LiveState,
    timeline: Timeline,
    connection: ConnectionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Session {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            state: LiveState::new(config.beat_pulse(), config.inference_window),
            timeline: Timeline::new(),
            connection: ConnectionState::Disconnected,
        }
    }

    /// Decodes and applies one inbound text frame.
    ///
    /// A frame that fails to decode is returned as an error and leaves the
    /// session untouched.
    pub fn handle_frame(&mut self, frame: &str, now: Instant) -> Result<(), DecodeError> {
        let event = protocol::decode(frame)?;
        log::debug!("applying {} event", event.kind());
        self.apply(event, now);
        Ok(())
    }

    /// Applies a decoded event and records any chord change on the timeline.
    pub fn apply(&mut self, event: ServerEvent, now: Instant) {
        self.state.apply(event, now);
        if self.timeline.observe(self.state.current_chord(), now) {
            log::debug!("chord changed to {}", self.state.current_chord());
        }
    }

    /// Tracks the transport lifecycle. Leaving `Open` releases held notes.
    pub fn connection_changed(&mut self, connection: ConnectionState) {
        if self.connection.is_open() && !connection.is_open() {
            log::info!("connection lost; releasing held notes");
            self.state.release_all_notes();
        }
        self.connection = connection;
    }

    /// Records the user's solo-mode choice immediately and returns the
    /// command to send. The engine's acknowledgment, if any, arrives later
    /// as an ordinary event.
    pub fn request_solo_mode(&mut self, mode: SoloMode) -> ClientCommand {
        self.state.select_solo_mode(mode);
        ClientCommand::SoloMode(mode)
    }

    /// Prunes fired beat deadlines.
    pub fn expire(&mut self, now: Instant) {
        self.state.expire(now);
    }

    pub fn state(&self) -> &LiveState {
        &self.state
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn bad_frames_leave_state_untouched() {
        let mut session = Session::default();
        let now = Instant::now();
        session
            .handle_frame(r#"{"note":40,"mapped_note":41,"on":true}"#, now)
            .unwrap();
        let before = session.timeline().len();

        assert!(session.handle_frame("not json", now).is_err());
        assert!(session.handle_frame(r#"{"Volume":3}"#, now).is_err());
        assert_eq!(session.state().active_notes(), &[40]);
        assert_eq!(session.timeline().len(), before);
    }

    #[test]
    fn solo_mode_request_is_optimistic() {
        let mut session = Session::default();
        let command = session.request_solo_mode(SoloMode::Transpose);
        assert_eq!(command, ClientCommand::SoloMode(SoloMode::Transpose));
        assert_eq!(session.state().solo_mode(), SoloMode::Transpose);
    }

    #[test]
    fn losing_the_connection_releases_notes() {
        let mut session = Session::default();
        let now = Instant::now();
        session.connection_changed(ConnectionState::Connecting);
        session.connection_changed(ConnectionState::Open);
        session
            .handle_frame(r#"{"MidiEvent":{"note":50,"mapped_note":52,"on":true}}"#, now)
            .unwrap();
        session.connection_changed(ConnectionState::Disconnected);
        assert!(session.state().active_notes().is_empty());
        assert_eq!(session.connection(), ConnectionState::Disconnected);
    }

    #[test]
    fn expire_prunes_beats() {
        let mut session = Session::default();
        let now = Instant::now();
        session.handle_frame(r#""Beat""#, now).unwrap();
        assert!(session.state().beat_pulse(now));
        session.expire(now + Duration::from_millis(150));
        assert!(!session.state().beat_pulse(now + Duration::from_millis(150)));
    }
}
