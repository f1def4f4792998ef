//! Host parameter decoding.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Raw host parameter slots.
pub const PARAM_ID1: u16 = 0;
pub const PARAM_ID2: u16 = 1;
pub const PARAM_ID3: u16 = 2;
pub const PARAM_ID4: u16 = 3;
pub const PARAM_ID5: u16 = 4;
pub const PARAM_ID6: u16 = 5;
pub const PARAM_SHAPE: u16 = 6;
pub const PARAM_SHIFT_SHAPE: u16 = 7;

/// Full scale of the 10-bit shape knobs.
const KNOB_MAX: f32 = 1023.0;

/// A decoded parameter change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Parameter {
    /// Which drawbar the shape knob edits; 9 is the A/B mix slider.
    DrawbarSelect(u16),
    /// Raw percussion mode (0 off, else bits of `value - 1`).
    Percussion(u16),
    /// Leakage amount, 0..=100.
    Dirt(u16),
    /// Shape knob, normalized to [0, 1].
    Shape(f32),
    /// Shift-shape knob; accepted but unused.
    ShiftShape(f32),
    /// A declared slot with no function.
    Spare(u16),
}

impl Parameter {
    /// Decode a host `(id, value)` pair.
    pub fn from_raw(id: u16, value: u16) -> Result<Parameter> {
        let param = match id {
            PARAM_ID1 => Parameter::DrawbarSelect(value),
            PARAM_ID2 => Parameter::Percussion(value),
            PARAM_ID3 => Parameter::Dirt(value),
            PARAM_ID4 | PARAM_ID5 | PARAM_ID6 => Parameter::Spare(id),
            PARAM_SHAPE => Parameter::Shape(knob_to_f32(value)),
            PARAM_SHIFT_SHAPE => Parameter::ShiftShape(knob_to_f32(value)),
            _ => return Err(Error::UnknownParameter(id)),
        };
        Ok(param)
    }
}

/// 10-bit knob value to [0, 1].
#[inline]
pub fn knob_to_f32(value: u16) -> f32 {
    (value.min(KNOB_MAX as u16) as f32) / KNOB_MAX
}
