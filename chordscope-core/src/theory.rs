//! # Music Theory Module
//!
//! Canonical value types for notes, chords and scales as the analysis engine
//! reports them, together with their display forms.
//!
//! ## Features
//! - Letter + optional accidental note representation
//! - Major/minor chords and scales
//! - Canonical string rendering (`"C#"`, `"Bb"`, `"C#m"`)
//! - A fixed 12-position pitch-class ordering for weight displays
//! - Tolerant deserialization: notes arrive either as objects or as strings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pitch-class labels in display order. Weight position `j` of a chord
/// inference always maps to `PITCH_CLASSES[j]`.
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Returns the pitch-class label for a weight position, if it has one.
///
/// Chord inferences carry 13 weights; the last one has no pitch class.
pub fn pitch_class_label(position: usize) -> Option<&'static str> {
    PITCH_CLASSES.get(position).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Semitone offset of the natural letter above C.
    pub fn semitone(self) -> u8 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Letter::C => "C",
            Letter::D => "D",
            Letter::E => "E",
            Letter::F => "F",
            Letter::G => "G",
            Letter::A => "A",
            Letter::B => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    Sharp,
    Flat,
    Natural,
}

/// A note name without octave.
///
/// An explicit `Natural` accidental is the same note as no accidental at all,
/// so equality and hashing go through [`Note::marker`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "NoteRepr")]
pub struct Note {
    pub letter: Letter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accidental: Option<Accidental>,
}

impl Note {
    pub const fn natural(letter: Letter) -> Self {
        Self {
            letter,
            accidental: None,
        }
    }

    pub const fn sharp(letter: Letter) -> Self {
        Self {
            letter,
            accidental: Some(Accidental::Sharp),
        }
    }

    pub const fn flat(letter: Letter) -> Self {
        Self {
            letter,
            accidental: Some(Accidental::Flat),
        }
    }

    /// The accidental marker appended to the letter: `"#"`, `"b"` or nothing.
    pub fn marker(&self) -> &'static str {
        match self.accidental {
            Some(Accidental::Sharp) => "#",
            Some(Accidental::Flat) => "b",
            Some(Accidental::Natural) | None => "",
        }
    }

    /// Pitch class in `0..12` with C = 0.
    pub fn pitch_class(&self) -> usize {
        let base = self.letter.semitone() as usize;
        match self.accidental {
            Some(Accidental::Sharp) => (base + 1) % 12,
            Some(Accidental::Flat) => (base + 11) % 12,
            Some(Accidental::Natural) | None => base,
        }
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.letter == other.letter && self.marker() == other.marker()
    }
}

impl Eq for Note {}

impl std::hash::Hash for Note {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.letter.hash(state);
        self.marker().hash(state);
    }
}

impl Default for Note {
    fn default() -> Self {
        Note::natural(Letter::C)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter.as_str(), self.marker())
    }
}

/// Error returned when a note spelling cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid note spelling `{0}`")]
pub struct ParseNoteError(pub String);

impl FromStr for Note {
    type Err = ParseNoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = match chars.next() {
            Some('C') => Letter::C,
            Some('D') => Letter::D,
            Some('E') => Letter::E,
            Some('F') => Letter::F,
            Some('G') => Letter::G,
            Some('A') => Letter::A,
            Some('B') => Letter::B,
            _ => return Err(ParseNoteError(s.to_string())),
        };
        let accidental = match chars.as_str() {
            "" => None,
            "#" => Some(Accidental::Sharp),
            "b" => Some(Accidental::Flat),
            _ => return Err(ParseNoteError(s.to_string())),
        };
        Ok(Note { letter, accidental })
    }
}

/// The two shapes a note takes on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum NoteRepr {
    Spelled(String),
    Parts {
        letter: Letter,
        #[serde(default)]
        accidental: Option<Accidental>,
    },
}

impl TryFrom<NoteRepr> for Note {
    type Error = ParseNoteError;

    fn try_from(repr: NoteRepr) -> Result<Self, Self::Error> {
        match repr {
            NoteRepr::Spelled(spelling) => spelling.parse(),
            NoteRepr::Parts { letter, accidental } => Ok(Note { letter, accidental }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flavor {
    #[default]
    Major,
    Minor,
}

/// A triad as reported by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    // Earlier payloads name the root `note`.
    #[serde(alias = "note")]
    pub root: Note,
    pub flavor: Flavor,
}

impl Chord {
    pub const fn new(root: Note, flavor: Flavor) -> Self {
        Self { root, flavor }
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.flavor {
            Flavor::Major => write!(f, "{}", self.root),
            Flavor::Minor => write!(f, "{}m", self.root),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scale {
    pub root: Note,
    pub mode: Mode,
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{} major", self.root),
            Mode::Minor => write!(f, "{} minor", self.root),
        }
    }
}

/// Renders a note in its canonical form.
pub fn note_to_string(note: &Note) -> String {
    note.to_string()
}

/// Renders a chord: the root note, followed by `"m"` for minor chords.
pub fn chord_to_string(chord: &Chord) -> String {
    chord.to_string()
}
