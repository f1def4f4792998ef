//! Output stage — sums partials and noise, saturates, converts to Q31.

use serde::{Deserialize, Serialize};

/// Soft-clip curve applied to the summed signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaturationCurve {
    /// Linear up to 2/3, quadratic knee, flat at ±1 from 4/3.
    #[default]
    Schetzen,
    Tanh,
}

impl SaturationCurve {
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            SaturationCurve::Schetzen => saturate(x),
            SaturationCurve::Tanh => soft_clip(x),
        }
    }
}

/// Schetzen-style soft clipper with unity small-signal gain.
#[inline]
pub fn saturate(x: f32) -> f32 {
    let a = x.abs();
    let y = if a <= 2.0 / 3.0 {
        a
    } else if a < 4.0 / 3.0 {
        let k = 2.0 - 1.5 * a;
        (3.0 - k * k) / 3.0
    } else {
        1.0
    };
    y.copysign(x)
}

/// Soft clipper using tanh.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Float in [-1, 1] to Q31 fixed point, saturating.
#[inline]
pub fn f32_to_q31(x: f32) -> i32 {
    (x.clamp(-1.0, 1.0) as f64 * i32::MAX as f64) as i32
}

/// Final mixing stage for one voice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mixer {
    pub curve: SaturationCurve,
}

impl Mixer {
    pub fn new(curve: SaturationCurve) -> Self {
        Mixer { curve }
    }

    /// Add the held noise to the partial sum and saturate.
    #[inline]
    pub fn output(&self, partials: f32, noise: f32) -> f32 {
        self.curve.apply(partials + noise)
    }
}
