//! Drawbar amplitude registers.
//!
//! Two editable banks (A and B) are crossfaded into the working bank that
//! the partial bank reads. Edits land in whichever bank the mix slider is
//! closer to.

use serde::{Deserialize, Serialize};

/// Number of drawbar partials.
pub const PARTIAL_COUNT: usize = 9;

/// Drawbar index that addresses the A/B mix slider instead of a partial.
pub const MIX_SLOT: usize = PARTIAL_COUNT;

/// Ceiling for a single partial; nine partials at full level stay
/// below clipping.
pub const AMP_MAX: f32 = 0.2;

pub const AMP_0: f32 = 0.0;

/// Semitone offset of each partial from the played note.
pub const DRAWBAR_SEMITONES: [i8; PARTIAL_COUNT] = [-12, 7, 0, 12, 19, 24, 28, 31, 36];

/// Amplitude register selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Register {
    A,
    B,
    Working,
}

impl Register {
    /// Bank that receives edits at the given mix position.
    #[inline]
    pub fn edit_target(mix: f32) -> Register {
        if mix < 0.5 { Register::A } else { Register::B }
    }
}

/// A/B/Working amplitude banks plus the mix coefficient.
#[derive(Debug, Clone)]
pub struct Drawbars {
    a: [f32; PARTIAL_COUNT],
    b: [f32; PARTIAL_COUNT],
    working: [f32; PARTIAL_COUNT],
    mix: f32,
    amp_sum: f32,
}

impl Default for Drawbars {
    fn default() -> Self {
        Drawbars::new(DEFAULT_REGISTER_A, DEFAULT_REGISTER_B, 0.0)
    }
}

/// Factory bank A: 16', 5 1/3' and 8' fully out.
pub const DEFAULT_REGISTER_A: [f32; PARTIAL_COUNT] = [
    AMP_MAX, AMP_MAX, AMP_MAX, AMP_0, AMP_0, AMP_0, AMP_0, AMP_0, AMP_0,
];

/// Factory bank B: every drawbar fully out.
pub const DEFAULT_REGISTER_B: [f32; PARTIAL_COUNT] = [AMP_MAX; PARTIAL_COUNT];

impl Drawbars {
    /// Create from absolute amplitudes (already scaled to `AMP_MAX`).
    pub fn new(a: [f32; PARTIAL_COUNT], b: [f32; PARTIAL_COUNT], mix: f32) -> Self {
        let mut bars = Drawbars {
            a,
            b,
            working: [AMP_0; PARTIAL_COUNT],
            mix,
            amp_sum: 0.0,
        };
        bars.recompute();
        bars
    }

    /// Apply an edit from the shared amplitude control.
    ///
    /// `index < PARTIAL_COUNT` writes `value * AMP_MAX` into the bank the
    /// mix currently favours; `index == MIX_SLOT` moves the mix itself.
    /// Other indices only trigger the recompute.
    pub fn set_amplitude(&mut self, index: usize, value: f32) {
        if index < PARTIAL_COUNT {
            let amp = value * AMP_MAX;
            match Register::edit_target(self.mix) {
                Register::A => self.a[index] = amp,
                _ => self.b[index] = amp,
            }
        } else if index == MIX_SLOT {
            self.mix = value;
        }
        self.recompute();
    }

    /// Rebuild the working bank and its sum from A, B and the mix.
    fn recompute(&mut self) {
        let mix = self.mix;
        let mut sum = 0.0;
        for i in 0..PARTIAL_COUNT {
            self.working[i] = (1.0 - mix) * self.a[i] + mix * self.b[i];
            sum += self.working[i];
        }
        self.amp_sum = sum;
    }

    #[inline]
    pub fn working(&self) -> &[f32; PARTIAL_COUNT] {
        &self.working
    }

    pub fn register(&self, reg: Register) -> &[f32; PARTIAL_COUNT] {
        match reg {
            Register::A => &self.a,
            Register::B => &self.b,
            Register::Working => &self.working,
        }
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }

    /// Sum of the working amplitudes.
    pub fn amp_sum(&self) -> f32 {
        self.amp_sum
    }
}
