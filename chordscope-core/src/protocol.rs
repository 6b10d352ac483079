//! # Stream Decoder Module
//!
//! Turns inbound text frames from the analysis engine into typed events.
//!
//! The engine has shipped several payload shapes over time. Newer builds tag
//! each frame with the event name (serde's externally tagged layout, e.g.
//! `{"MidiEvent": {...}}` or the bare string `"Beat"`); older builds send a
//! structural snapshot with no tag at all. Each known shape has its own
//! decode function and anything else falls through to a [`DecodeError`].
//!
//! Decoding is a pure, synchronous transform. It never touches state.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::command::SoloMode;
use crate::error::DecodeError;
use crate::theory::{Chord, Note, Scale};

/// Number of weights carried by every chord inference: one per pitch class
/// plus a trailing no-chord weight.
pub const WEIGHT_COUNT: usize = 13;

/// One ranked candidate from the engine at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordInference {
    pub weights: Vec<f32>,
    pub chord: Chord,
}

/// The engine's current best estimate. Replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceUpdate {
    #[serde(default)]
    pub scale: Option<Scale>,
    pub chord: Chord,
    #[serde(default)]
    pub chord_inferences: Vec<ChordInference>,
}

/// A key press or release on the player's keyboard, with the note the engine
/// remapped it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiUpdate {
    pub note: i32,
    pub mapped_note: i32,
    pub on: bool,
}

/// Constant-Q magnitudes per pitch class and octave.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullQ {
    pub x: Vec<Note>,
    pub y: Vec<Vec<f32>>,
}

/// Constant-Q magnitudes folded into one value per pitch class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketedQ {
    pub x: Vec<Note>,
    pub y: Vec<f32>,
}

/// The observation window the engine decoded its chord path from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observations {
    pub x: Vec<Note>,
    pub y: Vec<Vec<f32>>,
    pub chords: Vec<Chord>,
}

/// Full spectrum snapshot sent by engine builds without discrete note events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub full_q: FullQ,
    pub bucketed_q: BucketedQ,
    pub chord: Chord,
    #[serde(default)]
    pub fft: Vec<f32>,
    #[serde(default)]
    pub beat: bool,
    #[serde(default)]
    pub observations: Observations,
}

/// Every event the engine can send.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Inference(InferenceUpdate),
    Beat,
    Midi(MidiUpdate),
    Snapshot(Box<Snapshot>),
    /// The engine acknowledged (or changed) the solo mode.
    SoloMode(SoloMode),
}

impl ServerEvent {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Inference(_) => "InferenceEvent",
            ServerEvent::Beat => "Beat",
            ServerEvent::Midi(_) => "MidiEvent",
            ServerEvent::Snapshot(_) => "Snapshot",
            ServerEvent::SoloMode(_) => "SoloMode",
        }
    }
}

/// Decodes one inbound text frame into exactly one event.
///
/// # Arguments
/// * `frame` - The raw JSON text of a single transport message
///
/// # Returns
/// * `Ok(event)` - The typed event
/// * `Err(DecodeError)` - The frame matches no known shape; the caller drops it
pub fn decode(frame: &str) -> Result<ServerEvent, DecodeError> {
    let value: Value = serde_json::from_str(frame)?;
    match value {
        Value::String(tag) => decode_unit_tag(&tag),
        Value::Object(map) => decode_object(map),
        other => Err(DecodeError::UnrecognizedShape(describe(&other).to_string())),
    }
}

fn decode_unit_tag(tag: &str) -> Result<ServerEvent, DecodeError> {
    match tag {
        "Beat" => Ok(ServerEvent::Beat),
        _ => Err(DecodeError::UnknownTag(tag.to_string())),
    }
}

fn decode_object(mut map: Map<String, Value>) -> Result<ServerEvent, DecodeError> {
    // A single key that starts with an uppercase letter is an event tag.
    if map.len() == 1 {
        if let Some(tag) = map.keys().next().filter(|k| is_tag(k)).cloned() {
            let payload = map.remove(&tag).unwrap_or(Value::Null);
            return decode_tagged(&tag, payload);
        }
    }

    if map.contains_key("full_q") {
        decode_snapshot(Value::Object(map))
    } else if map.contains_key("chord_inferences") {
        decode_inference(Value::Object(map))
    } else if map.contains_key("note") && map.contains_key("on") {
        decode_midi(Value::Object(map))
    } else {
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        Err(DecodeError::UnrecognizedShape(format!(
            "object with keys [{}]",
            keys.join(", ")
        )))
    }
}

fn decode_tagged(tag: &str, payload: Value) -> Result<ServerEvent, DecodeError> {
    match tag {
        "Beat" => Ok(ServerEvent::Beat),
        "InferenceEvent" => decode_inference(payload),
        "MidiEvent" => decode_midi(payload),
        "SoloMode" => payload_as::<SoloMode>("SoloMode", payload).map(ServerEvent::SoloMode),
        _ => Err(DecodeError::UnknownTag(tag.to_string())),
    }
}

fn decode_inference(payload: Value) -> Result<ServerEvent, DecodeError> {
    let update: InferenceUpdate = payload_as("InferenceEvent", payload)?;
    if let Some(bad) = update
        .chord_inferences
        .iter()
        .find(|inference| inference.weights.len() != WEIGHT_COUNT)
    {
        return Err(DecodeError::WeightCount(bad.weights.len()));
    }
    Ok(ServerEvent::Inference(update))
}

fn decode_midi(payload: Value) -> Result<ServerEvent, DecodeError> {
    payload_as("MidiEvent", payload).map(ServerEvent::Midi)
}

fn decode_snapshot(payload: Value) -> Result<ServerEvent, DecodeError> {
    payload_as::<Snapshot>("Snapshot", payload).map(|s| ServerEvent::Snapshot(Box::new(s)))
}

fn payload_as<T: DeserializeOwned>(tag: &'static str, payload: Value) -> Result<T, DecodeError> {
    serde_json::from_value(payload).map_err(|source| DecodeError::Payload { tag, source })
}

fn is_tag(key: &str) -> bool {
    key.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::{Flavor, Letter, Mode};
    use serde_json::json;

    fn weights() -> Vec<f32> {
        vec![0.0; WEIGHT_COUNT]
    }

    #[test]
    fn decodes_bare_and_object_beats() {
        assert_eq!(decode(r#""Beat""#).unwrap(), ServerEvent::Beat);
        assert_eq!(decode(r#"{"Beat":null}"#).unwrap(), ServerEvent::Beat);
    }

    #[test]
    fn decodes_tagged_inference() {
        let frame = json!({
            "InferenceEvent": {
                "scale": {"root": {"letter": "G"}, "mode": "Major"},
                "chord": {"root": {"letter": "E"}, "flavor": "Minor"},
                "chord_inferences": [
                    {"weights": weights(), "chord": {"root": {"letter": "C"}, "flavor": "Major"}}
                ]
            }
        })
        .to_string();

        let ServerEvent::Inference(update) = decode(&frame).unwrap() else {
            panic!("expected an inference event");
        };
        assert_eq!(update.chord, Chord::new(Note::natural(Letter::E), Flavor::Minor));
        assert_eq!(update.scale.map(|s| s.mode), Some(Mode::Major));
        assert_eq!(update.chord_inferences.len(), 1);
    }

    #[test]
    fn decodes_untagged_inference_without_scale() {
        let frame = json!({
            "chord": {"root": {"letter": "A", "accidental": "Flat"}, "flavor": "Major"},
            "chord_inferences": []
        })
        .to_string();
        let ServerEvent::Inference(update) = decode(&frame).unwrap() else {
            panic!("expected an inference event");
        };
        assert_eq!(update.scale, None);
        assert_eq!(update.chord.to_string(), "Ab");
    }

    #[test]
    fn rejects_short_weight_vectors() {
        let frame = json!({
            "InferenceEvent": {
                "chord": {"root": "C", "flavor": "Major"},
                "chord_inferences": [{"weights": [1.0, 2.0], "chord": {"root": "C", "flavor": "Major"}}]
            }
        })
        .to_string();
        assert!(matches!(decode(&frame), Err(DecodeError::WeightCount(2))));
    }

    #[test]
    fn decodes_midi_in_both_shapes() {
        let expected = ServerEvent::Midi(MidiUpdate {
            note: 60,
            mapped_note: 64,
            on: true,
        });
        assert_eq!(
            decode(r#"{"MidiEvent":{"note":60,"mapped_note":64,"on":true}}"#).unwrap(),
            expected
        );
        assert_eq!(
            decode(r#"{"note":60,"mapped_note":64,"on":true}"#).unwrap(),
            expected
        );
    }

    #[test]
    fn decodes_solo_mode_acknowledgment() {
        assert_eq!(
            decode(r#"{"SoloMode":"Transpose"}"#).unwrap(),
            ServerEvent::SoloMode(SoloMode::Transpose)
        );
        assert!(matches!(
            decode(r#"{"SoloMode":"Loud"}"#),
            Err(DecodeError::Payload { tag: "SoloMode", .. })
        ));
    }

    #[test]
    fn decodes_legacy_snapshot_without_optional_fields() {
        let frame = json!({
            "full_q": {"x": ["C", "C#"], "y": [[0.1, 0.2], [0.3, 0.4]]},
            "bucketed_q": {"x": ["C", "C#"], "y": [0.15, 0.35]},
            "chord": {"note": "C#", "flavor": "Minor"}
        })
        .to_string();
        let ServerEvent::Snapshot(snapshot) = decode(&frame).unwrap() else {
            panic!("expected a snapshot");
        };
        assert!(!snapshot.beat);
        assert!(snapshot.fft.is_empty());
        assert_eq!(snapshot.chord.to_string(), "C#m");
        assert_eq!(snapshot.bucketed_q.x[1], Note::sharp(Letter::C));
    }

    #[test]
    fn reports_unknown_and_unrecognized_frames() {
        assert!(matches!(decode("{oops"), Err(DecodeError::Json(_))));
        assert!(matches!(decode(r#""Tempo""#), Err(DecodeError::UnknownTag(_))));
        assert!(matches!(
            decode(r#"{"Tempo": 120}"#),
            Err(DecodeError::UnknownTag(_))
        ));
        assert!(matches!(
            decode(r#"{"volume": 3}"#),
            Err(DecodeError::UnrecognizedShape(_))
        ));
        assert!(matches!(decode("42"), Err(DecodeError::UnrecognizedShape(_))));
        assert!(matches!(
            decode(r#"{"MidiEvent":{"note":"sixty"}}"#),
            Err(DecodeError::Payload { tag: "MidiEvent", .. })
        ));
    }
}
