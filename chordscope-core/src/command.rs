//! Outbound commands sent back to the analysis engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the engine remaps played notes onto the detected harmony.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoloMode {
    /// Snap to the nearest note of the current chord.
    #[default]
    Chord,
    /// Snap to the nearest note of the current scale.
    Nearest,
    /// Transpose the keyboard onto the current scale.
    Transpose,
}

impl SoloMode {
    pub const ALL: [SoloMode; 3] = [SoloMode::Chord, SoloMode::Nearest, SoloMode::Transpose];
}

impl fmt::Display for SoloMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SoloMode::Chord => "Chord",
            SoloMode::Nearest => "Nearest",
            SoloMode::Transpose => "Transpose",
        };
        f.write_str(label)
    }
}

/// Every message the client can send. Serialized externally tagged, so
/// `SoloMode(Nearest)` goes out as `{"SoloMode":"Nearest"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClientCommand {
    SoloMode(SoloMode),
}

impl ClientCommand {
    /// Encodes the command as a JSON text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Encodes a solo-mode selection as a text frame.
pub fn encode_solo_mode(mode: SoloMode) -> Result<String, serde_json::Error> {
    ClientCommand::SoloMode(mode).to_frame()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solo_mode_frames_are_externally_tagged() {
        assert_eq!(encode_solo_mode(SoloMode::Chord).unwrap(), r#"{"SoloMode":"Chord"}"#);
        assert_eq!(
            encode_solo_mode(SoloMode::Nearest).unwrap(),
            r#"{"SoloMode":"Nearest"}"#
        );
        assert_eq!(
            encode_solo_mode(SoloMode::Transpose).unwrap(),
            r#"{"SoloMode":"Transpose"}"#
        );
    }
}
