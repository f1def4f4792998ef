//! Partial bank: nine free-running sine phase accumulators.

use std::f32::consts::TAU;

use super::drawbars::PARTIAL_COUNT;
use super::percussion::Percussion;

/// Sine of a normalized phase in [0, 1).
#[inline]
pub fn sine(phase: f32) -> f32 {
    (TAU * phase).sin()
}

/// Phase accumulators for every drawbar partial.
///
/// All partials advance every sample, silent or not, so raising a drawbar
/// later never restarts its phase.
#[derive(Debug, Clone)]
pub struct PartialBank {
    phase: [f32; PARTIAL_COUNT],
    w: [f32; PARTIAL_COUNT],
}

impl Default for PartialBank {
    fn default() -> Self {
        PartialBank::new()
    }
}

impl PartialBank {
    pub fn new() -> Self {
        PartialBank {
            phase: [0.0; PARTIAL_COUNT],
            w: [0.0; PARTIAL_COUNT],
        }
    }

    /// Phase increments, rewritten by the pitch resolver each block.
    #[inline]
    pub fn increments_mut(&mut self) -> &mut [f32; PARTIAL_COUNT] {
        &mut self.w
    }

    pub fn phases(&self) -> &[f32; PARTIAL_COUNT] {
        &self.phase
    }

    /// Sum every partial at its working amplitude, add the percussion
    /// transient on its partial, then advance all phases.
    #[inline]
    pub fn next_sample(&mut self, amps: &[f32; PARTIAL_COUNT], perc: &mut Percussion) -> f32 {
        let perc_partial = perc.partial();
        let mut sig = 0.0;
        for i in 0..PARTIAL_COUNT {
            let s = sine(self.phase[i]);
            sig += amps[i] * s;

            if perc_partial == Some(i) {
                sig += perc.tick(s);
            }

            let p = self.phase[i] + self.w[i];
            self.phase[i] = p - p.floor();
        }
        sig
    }

    /// Zero every phase. Only used on (re)initialization.
    pub fn reset(&mut self) {
        self.phase = [0.0; PARTIAL_COUNT];
    }
}
