//! # Live State Module
//!
//! The reducer that folds decoded engine events into the client's view of the
//! world: the current chord and scale, the latest inferences, the notes being
//! held, the beat pulse and the solo mode.
//!
//! ## Rules
//! - Events are applied one at a time, in arrival order.
//! - Inference and snapshot events replace their fields wholesale (last write wins).
//! - A note-off removes every occurrence of the note, however often it was pressed.
//! - Each beat arms its own clear deadline; deadlines are never cancelled.
//!
//! Time is passed in by the caller so the reducer stays deterministic.

use std::time::{Duration, Instant};

use crate::command::SoloMode;
use crate::protocol::{ChordInference, InferenceUpdate, MidiUpdate, ServerEvent, Snapshot};
use crate::theory::{Chord, Scale};

/// How long a beat keeps the pulse lit.
pub const DEFAULT_BEAT_PULSE: Duration = Duration::from_millis(100);
/// How many inferences the presentation window shows.
pub const DEFAULT_INFERENCE_WINDOW: usize = 10;

/// Independent one-shot clear timers for the beat indicator.
///
/// The pulse is lit while at least one deadline lies in the future, so rapid
/// beats keep it on continuously and it goes dark once the last one fires.
#[derive(Debug, Clone, Default)]
pub struct BeatPulse {
    deadlines: Vec<Instant>,
}

impl BeatPulse {
    /// Arms a new clear deadline `duration` after `now`, dropping any that
    /// have already fired.
    pub fn arm(&mut self, now: Instant, duration: Duration) {
        self.expire(now);
        self.deadlines.push(now + duration);
    }

    /// Whether the pulse is lit at `now`. Pure read.
    pub fn is_on(&self, now: Instant) -> bool {
        self.deadlines.iter().any(|deadline| *deadline > now)
    }

    /// Drops deadlines that have fired by `now`.
    pub fn expire(&mut self, now: Instant) {
        self.deadlines.retain(|deadline| *deadline > now);
    }

    pub fn pending(&self) -> usize {
        self.deadlines.len()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

/// The single live view of the engine's output for one connection.
#[derive(Debug, Clone)]
pub struct LiveState {
    current_chord: Chord,
    current_scale: Scale,
    chord_inferences: Vec<ChordInference>,
    active_notes: Vec<i32>,
    mapped_notes: Vec<i32>,
    beat: BeatPulse,
    solo_mode: SoloMode,
    spectrum: Option<Snapshot>,
    beat_pulse_duration: Duration,
    inference_window: usize,
}

impl Default for LiveState {
    fn default() -> Self {
        Self::new(DEFAULT_BEAT_PULSE, DEFAULT_INFERENCE_WINDOW)
    }
}

impl LiveState {
    pub fn new(beat_pulse_duration: Duration, inference_window: usize) -> Self {
        Self {
            current_chord: Chord::default(),
            current_scale: Scale::default(),
            chord_inferences: Vec::new(),
            active_notes: Vec::new(),
            mapped_notes: Vec::new(),
            beat: BeatPulse::default(),
            solo_mode: SoloMode::default(),
            spectrum: None,
            beat_pulse_duration,
            inference_window,
        }
    }

    /// Applies one decoded event.
    ///
    /// # Arguments
    /// * `event` - The decoded event, in arrival order
    /// * `now` - Arrival time, used to arm beat deadlines
    pub fn apply(&mut self, event: ServerEvent, now: Instant) {
        match event {
            ServerEvent::Inference(update) => self.apply_inference(update),
            ServerEvent::Beat => self.beat.arm(now, self.beat_pulse_duration),
            ServerEvent::Midi(midi) => self.apply_midi(midi),
            ServerEvent::Snapshot(snapshot) => self.apply_snapshot(*snapshot, now),
            ServerEvent::SoloMode(mode) => self.solo_mode = mode,
        }
    }

    fn apply_inference(&mut self, update: InferenceUpdate) {
        self.current_chord = update.chord;
        if let Some(scale) = update.scale {
            self.current_scale = scale;
        }
        self.chord_inferences = update.chord_inferences;
    }

    fn apply_midi(&mut self, midi: MidiUpdate) {
        if midi.on {
            self.active_notes.push(midi.note);
            self.mapped_notes.push(midi.mapped_note);
        } else {
            self.active_notes.retain(|n| *n != midi.note);
            self.mapped_notes.retain(|n| *n != midi.mapped_note);
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot, now: Instant) {
        self.current_chord = snapshot.chord;
        if snapshot.beat {
            self.beat.arm(now, self.beat_pulse_duration);
        }
        self.spectrum = Some(snapshot);
    }

    /// Records a solo-mode choice before the engine confirms it.
    pub fn select_solo_mode(&mut self, mode: SoloMode) {
        self.solo_mode = mode;
    }

    /// Releases every held note. Used when the connection drops, since the
    /// matching note-offs can no longer arrive.
    pub fn release_all_notes(&mut self) {
        self.active_notes.clear();
        self.mapped_notes.clear();
        self.beat.clear();
    }

    /// Prunes beat deadlines that have fired.
    pub fn expire(&mut self, now: Instant) {
        self.beat.expire(now);
    }

    pub fn current_chord(&self) -> Chord {
        self.current_chord
    }

    pub fn current_scale(&self) -> Scale {
        self.current_scale
    }

    /// The full inference list from the last inference event, as received.
    pub fn chord_inferences(&self) -> &[ChordInference] {
        &self.chord_inferences
    }

    /// The presentation window: the most recent inferences, newest first.
    pub fn recent_inferences(&self) -> impl Iterator<Item = &ChordInference> {
        self.chord_inferences.iter().rev().take(self.inference_window)
    }

    pub fn active_notes(&self) -> &[i32] {
        &self.active_notes
    }

    pub fn mapped_notes(&self) -> &[i32] {
        &self.mapped_notes
    }

    pub fn beat_pulse(&self, now: Instant) -> bool {
        self.beat.is_on(now)
    }

    pub fn solo_mode(&self) -> SoloMode {
        self.solo_mode
    }

    /// The last spectrum snapshot, if the engine sends them.
    pub fn spectrum(&self) -> Option<&Snapshot> {
        self.spectrum.as_ref()
    }
}
