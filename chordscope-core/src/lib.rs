// chordscope-core/src/lib.rs

//! The core logic for the chordscope client.
//! This crate is responsible for decoding the analysis engine's stream,
//! reducing it into live state, consolidating the chord timeline and
//! encoding commands back to the engine. It is completely headless
//! and contains no GUI code.

pub mod command;
pub mod config;
pub mod connection;
pub mod display;
pub mod error;
pub mod protocol;
pub mod session;
pub mod state;
pub mod theory;
pub mod timeline;

pub use command::{ClientCommand, SoloMode, encode_solo_mode};
pub use config::{ClientConfig, ReconnectPolicy};
pub use connection::{ConnectionEvent, ConnectionHandle, ConnectionState};
pub use error::{ConnectionError, DecodeError};
pub use protocol::{ChordInference, ServerEvent, decode};
pub use session::Session;
pub use state::LiveState;
pub use theory::{Chord, Flavor, Note, Scale, chord_to_string, note_to_string};
pub use timeline::{Timeline, TimelineEntry};
