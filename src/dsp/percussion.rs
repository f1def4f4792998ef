//! Percussion: a one-shot linear decay added to a single partial at note-on.

use serde::{Deserialize, Serialize};

/// Soft trigger level.
pub const PERC_LEVEL_SOFT: f32 = 0.1;
/// Normal trigger level.
pub const PERC_LEVEL_NORMAL: f32 = 0.3;
/// Per-sample decay with the slow flag set.
pub const PERC_DECAY_SLOW: f32 = 0.00001;
/// Per-sample decay with the slow flag clear.
pub const PERC_DECAY_FAST: f32 = 0.0001;

/// Partial voiced when the third-harmonic flag is set (2 2/3').
pub const PERC_PARTIAL_THIRD: usize = 4;
/// Partial voiced otherwise (2').
pub const PERC_PARTIAL_FOURTH: usize = 5;

// Bit layout of the decoded mode value (raw host value minus one).
const BIT_SOFT: i32 = 0x01;
const BIT_THIRD: i32 = 0x02;
const BIT_SLOW: i32 = 0x04;

/// Decoded percussion switch settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercussionMode {
    pub enabled: bool,
    pub soft: bool,
    pub third_harmonic: bool,
    pub slow: bool,
}

impl PercussionMode {
    pub const OFF: PercussionMode = PercussionMode {
        enabled: false,
        soft: false,
        third_harmonic: false,
        slow: false,
    };

    /// Decode the host value: 0 is off, otherwise `raw - 1` carries the
    /// soft / third-harmonic / slow bits.
    pub fn from_raw(raw: u16) -> Self {
        let bits = raw as i32 - 1;
        if bits < 0 {
            return PercussionMode::OFF;
        }
        PercussionMode {
            enabled: true,
            soft: bits & BIT_SOFT != 0,
            third_harmonic: bits & BIT_THIRD != 0,
            slow: bits & BIT_SLOW != 0,
        }
    }

    pub fn to_raw(self) -> u16 {
        if !self.enabled {
            return 0;
        }
        let mut bits = 0;
        if self.soft {
            bits |= BIT_SOFT;
        }
        if self.third_harmonic {
            bits |= BIT_THIRD;
        }
        if self.slow {
            bits |= BIT_SLOW;
        }
        (bits + 1) as u16
    }

    /// Partial carrying the transient, if percussion is on.
    #[inline]
    pub fn partial(self) -> Option<usize> {
        if !self.enabled {
            None
        } else if self.third_harmonic {
            Some(PERC_PARTIAL_THIRD)
        } else {
            Some(PERC_PARTIAL_FOURTH)
        }
    }

    pub fn level(self) -> f32 {
        if self.soft { PERC_LEVEL_SOFT } else { PERC_LEVEL_NORMAL }
    }

    pub fn decay_rate(self) -> f32 {
        if self.slow { PERC_DECAY_SLOW } else { PERC_DECAY_FAST }
    }
}

/// Percussion envelope state.
///
/// Amplitude is `start - rate * elapsed` and is exactly zero from the
/// step `start / rate` onward.
#[derive(Debug, Clone, Default)]
pub struct Percussion {
    mode: PercussionMode,
    amp: f32,
    start: f32,
    elapsed: u32,
    end: u32,
}

impl Percussion {
    pub fn new(mode: PercussionMode) -> Self {
        Percussion {
            mode,
            amp: 0.0,
            start: 0.0,
            elapsed: 0,
            end: 0,
        }
    }

    pub fn mode(&self) -> PercussionMode {
        self.mode
    }

    /// Change switches. A running decay keeps its current amplitude.
    pub fn set_mode(&mut self, mode: PercussionMode) {
        self.mode = mode;
        self.restart_from(self.amp);
    }

    fn restart_from(&mut self, amp: f32) {
        self.amp = amp;
        self.start = amp;
        self.elapsed = 0;
        self.end = (amp / self.mode.decay_rate()).round() as u32;
    }

    #[inline]
    pub fn partial(&self) -> Option<usize> {
        self.mode.partial()
    }

    /// Current transient amplitude.
    pub fn amplitude(&self) -> f32 {
        self.amp
    }

    /// Restart from the trigger level; a retrigger mid-decay re-attacks.
    pub fn trigger(&mut self) {
        if self.mode.enabled {
            self.restart_from(self.mode.level());
        }
    }

    /// Contribution for one sample of the percussion partial's sine `s`,
    /// then one step of decay.
    #[inline]
    pub fn tick(&mut self, s: f32) -> f32 {
        let out = self.amp * s;
        if self.amp > 0.0 {
            self.elapsed += 1;
            self.amp = if self.elapsed >= self.end {
                0.0
            } else {
                (self.start - self.mode.decay_rate() * self.elapsed as f32).max(0.0)
            };
        }
        out
    }

    /// Silence the transient and adopt `mode`.
    pub fn reset(&mut self, mode: PercussionMode) {
        self.mode = mode;
        self.restart_from(0.0);
    }
}
