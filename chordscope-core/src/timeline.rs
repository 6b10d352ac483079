//! # Timeline Module
//!
//! A deduplicated, time-stamped record of chord changes for the scrolling
//! chord display.
//!
//! The timeline only grows. It is never rewritten to reflect elapsed time;
//! viewers derive each entry's position from its age on every redraw.

use std::time::{Duration, Instant};

use crate::theory::Chord;

/// Smallest step used to keep entry timestamps strictly increasing when two
/// chord changes are observed at the same instant.
const MIN_STEP: Duration = Duration::from_micros(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry {
    pub chord: Chord,
    pub observed_at: Instant,
}

impl TimelineEntry {
    /// Time elapsed since the chord was observed, saturating at zero.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.observed_at)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes the current chord after a state transition.
    ///
    /// Appends an entry only when the chord differs from the last entry's.
    ///
    /// # Returns
    /// * `true` if an entry was appended
    pub fn observe(&mut self, chord: Chord, now: Instant) -> bool {
        let observed_at = match self.entries.last() {
            Some(last) if last.chord == chord => return false,
            Some(last) if now <= last.observed_at => last.observed_at + MIN_STEP,
            _ => now,
        };
        self.entries.push(TimelineEntry { chord, observed_at });
        true
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that are still on screen, paired with their distance in pixels
    /// from the right edge of a display `width` pixels wide.
    ///
    /// # Arguments
    /// * `now` - The redraw time
    /// * `width` - Display width in pixels
    /// * `px_per_ms` - Scroll speed
    pub fn visible(
        &self,
        now: Instant,
        width: f32,
        px_per_ms: f32,
    ) -> impl Iterator<Item = (&TimelineEntry, f32)> {
        self.entries
            .iter()
            .map(move |entry| (entry, crate::display::timeline_offset(entry.age(now), px_per_ms)))
            .filter(move |(_, offset)| *offset <= width)
    }
}
