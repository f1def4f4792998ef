//! Voice configuration.
//!
//! Mirrors what a host would send on load: initial drawbar banks, switch
//! positions and the engine sample rate. Deserialized from camelCase JSON;
//! every field is optional.

use serde::{Deserialize, Serialize};

use crate::dsp::drawbars::{MIX_SLOT, PARTIAL_COUNT};
use crate::dsp::mixer::SaturationCurve;
use crate::error::{Error, Result};

/// Highest accepted raw percussion mode (all three bits set).
const PERCUSSION_RAW_MAX: u16 = 8;
const DIRT_RAW_MAX: u16 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VoiceConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f32,
    /// Frequency of A4 in Hz.
    pub tuning_pitch: f32,
    /// Bank A drawbar positions, normalized [0, 1].
    pub register_a: [f32; PARTIAL_COUNT],
    /// Bank B drawbar positions, normalized [0, 1].
    pub register_b: [f32; PARTIAL_COUNT],
    /// A/B mix [0, 1].
    pub mix: f32,
    /// Leakage noise, 0..=100.
    pub dirt: u16,
    /// Raw percussion mode, 0 (off) ..= 8.
    pub percussion: u16,
    /// Drawbar addressed by shape edits; `MIX_SLOT` is the mix slider.
    pub drawbar_select: u16,
    pub saturation: SaturationCurve,
    pub noise_seed: u32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        VoiceConfig {
            sample_rate: 48000.0,
            tuning_pitch: 440.0,
            register_a: [1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            register_b: [1.0; PARTIAL_COUNT],
            mix: 0.0,
            dirt: 0,
            percussion: 0,
            drawbar_select: MIX_SLOT as u16,
            saturation: SaturationCurve::default(),
            noise_seed: 12345,
        }
    }
}

impl VoiceConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<VoiceConfig> {
        let config: VoiceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(Error::Config(format!(
                "sampleRate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !(self.tuning_pitch.is_finite() && self.tuning_pitch > 0.0) {
            return Err(Error::Config(format!(
                "tuningPitch must be positive, got {}",
                self.tuning_pitch
            )));
        }
        for (name, bank) in [("registerA", &self.register_a), ("registerB", &self.register_b)] {
            if let Some((i, v)) = bank.iter().enumerate().find(|(_, v)| !unit_range(**v)) {
                return Err(Error::Config(format!("{name}[{i}] must be in [0, 1], got {v}")));
            }
        }
        if !unit_range(self.mix) {
            return Err(Error::Config(format!("mix must be in [0, 1], got {}", self.mix)));
        }
        if self.dirt > DIRT_RAW_MAX {
            return Err(Error::Config(format!("dirt must be <= {DIRT_RAW_MAX}, got {}", self.dirt)));
        }
        if self.percussion > PERCUSSION_RAW_MAX {
            return Err(Error::Config(format!(
                "percussion must be <= {PERCUSSION_RAW_MAX}, got {}",
                self.percussion
            )));
        }
        if self.drawbar_select as usize > MIX_SLOT {
            return Err(Error::Config(format!(
                "drawbarSelect must be <= {MIX_SLOT}, got {}",
                self.drawbar_select
            )));
        }
        Ok(())
    }
}

fn unit_range(v: f32) -> bool {
    (0.0..=1.0).contains(&v)
}
