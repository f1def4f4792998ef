//! Pitch resolution: host pitch word → per-partial phase increments.

use serde::{Deserialize, Serialize};

use super::drawbars::{DRAWBAR_SEMITONES, PARTIAL_COUNT};

/// Highest note index covered by the frequency table.
pub const NOTE_TABLE_LAST: i32 = 151;

const NOTE_TABLE_SIZE: usize = NOTE_TABLE_LAST as usize + 1;

/// Fine value that lands exactly on the next note.
const FINE_STEPS: f32 = 255.0;

/// Frequency ceiling at 48 kHz; scaled with the sample rate.
const NOTE_MAX_HZ_48K: f32 = 23679.9;

/// A block-constant pitch: note number plus a fine offset in 1/255 steps
/// toward the next semitone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pitch {
    pub note: u8,
    pub fine: u8,
}

impl Pitch {
    pub fn new(note: u8, fine: u8) -> Self {
        Pitch { note, fine }
    }

    /// Decode the host's packed pitch word (note in the high byte).
    pub fn from_raw(raw: u16) -> Self {
        Pitch {
            note: (raw >> 8) as u8,
            fine: (raw & 0x00FF) as u8,
        }
    }

    pub fn to_raw(self) -> u16 {
        ((self.note as u16) << 8) | self.fine as u16
    }
}

/// Equal-tempered note → Hz lookup table.
#[derive(Debug, Clone)]
pub struct NoteTable {
    hz: [f32; NOTE_TABLE_SIZE],
}

impl NoteTable {
    /// Build the table with A4 (note 69) at `tuning_pitch` Hz.
    pub fn new(tuning_pitch: f32) -> Self {
        let mut hz = [0.0; NOTE_TABLE_SIZE];
        for (note, slot) in hz.iter_mut().enumerate() {
            *slot = tuning_pitch * 2.0_f32.powf((note as f32 - 69.0) / 12.0);
        }
        NoteTable { hz }
    }

    /// Frequency of `note`, clamped into the table range.
    #[inline]
    pub fn note_hz(&self, note: i32) -> f32 {
        self.hz[note.clamp(0, NOTE_TABLE_LAST) as usize]
    }
}

impl Default for NoteTable {
    fn default() -> Self {
        NoteTable::new(440.0)
    }
}

/// Resolves a pitch into one normalized angular frequency (cycles per
/// sample) for each drawbar partial.
#[derive(Debug, Clone)]
pub struct PitchResolver {
    table: NoteTable,
    sample_rate: f32,
    max_hz: f32,
}

impl PitchResolver {
    pub fn new(sample_rate: f32, tuning_pitch: f32) -> Self {
        PitchResolver {
            table: NoteTable::new(tuning_pitch),
            sample_rate,
            max_hz: NOTE_MAX_HZ_48K * sample_rate / 48000.0,
        }
    }

    /// Phase increment for `note` raised by `fine / 255` of a semitone.
    ///
    /// The fine offset interpolates linearly in Hz between `note` and
    /// `note + 1`.
    #[inline]
    pub fn angular_frequency(&self, note: i32, fine: u8) -> f32 {
        let f0 = self.table.note_hz(note);
        let f1 = self.table.note_hz(note + 1);
        let hz = f0 + (f1 - f0) * (fine as f32 / FINE_STEPS);
        hz.min(self.max_hz) / self.sample_rate
    }

    /// Fill `w` with every partial's increment. Called once per block.
    pub fn resolve(&self, pitch: Pitch, w: &mut [f32; PARTIAL_COUNT]) {
        let base = pitch.note as i32;
        for (slot, &offset) in w.iter_mut().zip(DRAWBAR_SEMITONES.iter()) {
            *slot = self.angular_frequency(base + offset as i32, pitch.fine);
        }
    }
}
