//! Voice — the complete drawbar organ generator for one instance.
//!
//! Owns every piece of mutable state. The host calls `process_block` once
//! per audio block and the other entry points between blocks; `&mut self`
//! on all of them keeps those calls from overlapping.

use serde::Serialize;

use crate::config::VoiceConfig;
use crate::error::Result;
use crate::params::Parameter;

use super::drawbars::{AMP_MAX, Drawbars, PARTIAL_COUNT, Register};
use super::mixer::{Mixer, f32_to_q31};
use super::noise::NoiseStage;
use super::partials::PartialBank;
use super::percussion::{Percussion, PercussionMode};
use super::pitch::{Pitch, PitchResolver};

/// Serializable view of the voice's control state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSnapshot {
    pub register_a: [f32; PARTIAL_COUNT],
    pub register_b: [f32; PARTIAL_COUNT],
    pub working: [f32; PARTIAL_COUNT],
    pub mix: f32,
    pub amp_sum: f32,
    pub drawbar_select: u16,
    pub percussion: PercussionMode,
    pub percussion_amp: f32,
    pub dirt: f32,
    pub noise_level: f32,
}

#[derive(Debug, Clone)]
pub struct Voice {
    config: VoiceConfig,
    resolver: PitchResolver,
    partials: PartialBank,
    drawbars: Drawbars,
    percussion: Percussion,
    noise: NoiseStage,
    mixer: Mixer,
    drawbar_select: u16,
}

impl Default for Voice {
    fn default() -> Self {
        Voice::build(VoiceConfig::default())
    }
}

impl Voice {
    /// Validate `config` and build a voice from it.
    pub fn new(config: VoiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Voice::build(config))
    }

    fn build(config: VoiceConfig) -> Self {
        let resolver = PitchResolver::new(config.sample_rate, config.tuning_pitch);
        let mut voice = Voice {
            resolver,
            partials: PartialBank::new(),
            drawbars: drawbars_from(&config),
            percussion: Percussion::new(PercussionMode::from_raw(config.percussion)),
            noise: NoiseStage::new(config.noise_seed),
            mixer: Mixer::new(config.saturation),
            drawbar_select: config.drawbar_select,
            config,
        };
        voice.noise.set_dirt(voice.config.dirt);
        voice.noise.refresh(voice.drawbars.amp_sum());
        log::debug!(
            "voice created: {} Hz, amp sum {:.3}",
            voice.config.sample_rate,
            voice.drawbars.amp_sum()
        );
        voice
    }

    /// Host initialization handshake. Resets every field in place back to
    /// the configuration the voice was built with.
    pub fn init(&mut self, platform: u32, api: u32) {
        log::debug!("voice init: platform {platform:#x}, api {api:#x}");
        self.drawbars = drawbars_from(&self.config);
        self.partials.reset();
        self.percussion.reset(PercussionMode::from_raw(self.config.percussion));
        self.noise.reset(self.config.noise_seed);
        self.noise.set_dirt(self.config.dirt);
        self.noise.refresh(self.drawbars.amp_sum());
        self.drawbar_select = self.config.drawbar_select;
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// Arm the percussion transient. Phases and drawbars are untouched.
    pub fn note_on(&mut self, _pitch: Pitch) {
        self.percussion.trigger();
    }

    /// No release stage; percussion decays on its own.
    pub fn note_off(&mut self, _pitch: Pitch) {}

    /// Apply a parameter change between blocks.
    pub fn set_parameter(&mut self, param: Parameter) {
        log::debug!("set_parameter {param:?}");
        match param {
            Parameter::DrawbarSelect(index) => {
                self.drawbar_select = index;
            }
            Parameter::Percussion(raw) => {
                self.percussion.set_mode(PercussionMode::from_raw(raw));
            }
            Parameter::Dirt(raw) => {
                self.noise.set_dirt(raw);
            }
            Parameter::Shape(value) => {
                self.drawbars.set_amplitude(self.drawbar_select as usize, value);
                self.noise.invalidate();
            }
            Parameter::ShiftShape(_) | Parameter::Spare(_) => {}
        }
        self.noise.refresh(self.drawbars.amp_sum());
    }

    /// Render one block of Q31 samples at a block-constant pitch.
    pub fn process_block(&mut self, pitch: Pitch, out: &mut [i32]) {
        self.resolver.resolve(pitch, self.partials.increments_mut());
        for y in out.iter_mut() {
            *y = f32_to_q31(self.next_sample());
        }
    }

    /// Render one block of float samples in [-1, 1].
    pub fn process_block_f32(&mut self, pitch: Pitch, out: &mut [f32]) {
        self.resolver.resolve(pitch, self.partials.increments_mut());
        for y in out.iter_mut() {
            *y = self.next_sample();
        }
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let sig = self
            .partials
            .next_sample(self.drawbars.working(), &mut self.percussion);
        let noise = self.noise.next();
        self.mixer.output(sig, noise)
    }

    pub fn drawbars(&self) -> &Drawbars {
        &self.drawbars
    }

    pub fn partials(&self) -> &PartialBank {
        &self.partials
    }

    pub fn percussion(&self) -> &Percussion {
        &self.percussion
    }

    pub fn noise(&self) -> &NoiseStage {
        &self.noise
    }

    pub fn drawbar_select(&self) -> u16 {
        self.drawbar_select
    }

    pub fn snapshot(&self) -> VoiceSnapshot {
        VoiceSnapshot {
            register_a: *self.drawbars.register(Register::A),
            register_b: *self.drawbars.register(Register::B),
            working: *self.drawbars.working(),
            mix: self.drawbars.mix(),
            amp_sum: self.drawbars.amp_sum(),
            drawbar_select: self.drawbar_select,
            percussion: self.percussion.mode(),
            percussion_amp: self.percussion.amplitude(),
            dirt: self.noise.dirt(),
            noise_level: self.noise.level(),
        }
    }
}

/// Scale the configured normalized banks into absolute amplitudes.
fn drawbars_from(config: &VoiceConfig) -> Drawbars {
    Drawbars::new(
        config.register_a.map(|v| v * AMP_MAX),
        config.register_b.map(|v| v * AMP_MAX),
        config.mix,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::drawbars::MIX_SLOT;
    use crate::dsp::percussion::{PERC_DECAY_FAST, PERC_LEVEL_NORMAL, PERC_PARTIAL_FOURTH};
    use crate::error::Error;
    use approx::assert_abs_diff_eq;

    fn select(voice: &mut Voice, index: usize, value: f32) {
        voice.set_parameter(Parameter::DrawbarSelect(index as u16));
        voice.set_parameter(Parameter::Shape(value));
    }

    fn run(voice: &mut Voice, frames: usize) {
        let mut out = [0.0f32; 50];
        for _ in 0..frames / out.len() {
            voice.process_block_f32(Pitch::new(60, 0), &mut out);
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = VoiceConfig {
            sample_rate: 0.0,
            ..VoiceConfig::default()
        };
        let err = Voice::new(config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn default_config_builds() {
        let v = Voice::new(VoiceConfig::default()).unwrap();
        assert_eq!(v.snapshot(), Voice::default().snapshot());
    }

    #[test]
    fn voice_produces_sound() {
        let mut v = Voice::default();
        let mut out = [0.0f32; 256];
        v.process_block_f32(Pitch::new(60, 0), &mut out);
        assert!(out.iter().any(|s| s.abs() > 0.001), "Voice should produce output");
    }

    #[test]
    fn voice_output_range() {
        let mut config = VoiceConfig::default();
        config.mix = 1.0;
        config.dirt = 100;
        config.percussion = 1;
        let mut v = Voice::new(config).unwrap();
        v.note_on(Pitch::new(48, 0));
        let mut out = [0.0f32; 64];
        for _ in 0..500 {
            v.process_block_f32(Pitch::new(48, 0), &mut out);
            for &s in &out {
                assert!(s.abs() <= 1.0, "Output escaped [-1, 1]: {s}");
            }
        }
    }

    #[test]
    fn q31_matches_float_path() {
        let mut a = Voice::default();
        let mut b = Voice::default();
        let mut fl = [0.0f32; 128];
        let mut q = [0i32; 128];
        a.process_block_f32(Pitch::new(64, 10), &mut fl);
        b.process_block(Pitch::new(64, 10), &mut q);
        for (f, q) in fl.iter().zip(q.iter()) {
            assert_eq!(f32_to_q31(*f), *q);
        }
    }

    #[test]
    fn phase_continuous_across_blocks() {
        let mut whole = Voice::default();
        let mut split = Voice::default();
        let pitch = Pitch::new(57, 0);

        let mut one = [0.0f32; 96];
        whole.process_block_f32(pitch, &mut one);

        let mut first = [0.0f32; 32];
        let mut rest = [0.0f32; 64];
        split.process_block_f32(pitch, &mut first);
        split.process_block_f32(pitch, &mut rest);

        assert_eq!(&one[..32], &first[..]);
        assert_eq!(&one[32..], &rest[..]);
    }

    #[test]
    fn shape_edits_follow_drawbar_select() {
        let mut v = Voice::default();
        select(&mut v, 7, 0.5);
        assert_eq!(v.drawbars().register(Register::A)[7], 0.5 * AMP_MAX);

        select(&mut v, MIX_SLOT, 0.75);
        assert_eq!(v.drawbars().mix(), 0.75);

        select(&mut v, 7, 0.25);
        assert_eq!(v.drawbars().register(Register::B)[7], 0.25 * AMP_MAX);
        assert_eq!(v.drawbars().register(Register::A)[7], 0.5 * AMP_MAX);
    }

    #[test]
    fn amplitude_edit_refreshes_noise_level() {
        let mut v = Voice::default();
        v.set_parameter(Parameter::Dirt(100));
        assert_abs_diff_eq!(v.noise().level(), v.drawbars().amp_sum() * 0.01, epsilon = 1e-7);

        select(&mut v, 8, 1.0);
        assert_abs_diff_eq!(v.noise().level(), v.drawbars().amp_sum() * 0.01, epsilon = 1e-7);
    }

    #[test]
    fn note_on_arms_percussion_only() {
        let mut config = VoiceConfig::default();
        config.percussion = 1;
        let mut v = Voice::new(config).unwrap();
        let before = *v.drawbars().working();
        v.note_on(Pitch::new(60, 0));
        assert_eq!(v.percussion().amplitude(), PERC_LEVEL_NORMAL);
        assert_eq!(v.percussion().partial(), Some(PERC_PARTIAL_FOURTH));
        assert_eq!(v.drawbars().working(), &before);
        assert!(v.partials().phases().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn note_off_changes_nothing() {
        let mut config = VoiceConfig::default();
        config.percussion = 1;
        let mut v = Voice::new(config).unwrap();
        v.note_on(Pitch::new(60, 0));
        let before = v.snapshot();
        v.note_off(Pitch::new(60, 0));
        assert_eq!(v.snapshot(), before);
    }

    #[test]
    fn percussion_mode_parameter() {
        let mut v = Voice::default();
        v.set_parameter(Parameter::Percussion(4));
        assert_eq!(v.percussion().partial(), Some(4));
        v.set_parameter(Parameter::Percussion(0));
        assert_eq!(v.percussion().partial(), None);
    }

    #[test]
    fn percussion_freezes_while_disabled() {
        let mut config = VoiceConfig::default();
        config.percussion = 1;
        let mut v = Voice::new(config).unwrap();
        v.note_on(Pitch::new(60, 0));
        run(&mut v, 1000);
        let held = v.percussion().amplitude();
        assert_abs_diff_eq!(held, 0.2, epsilon = 1e-5);

        v.set_parameter(Parameter::Percussion(0));
        run(&mut v, 500);
        assert_eq!(v.percussion().amplitude(), held);

        v.set_parameter(Parameter::Percussion(1));
        assert_eq!(v.percussion().amplitude(), held);
        run(&mut v, 1000);
        assert_abs_diff_eq!(
            v.percussion().amplitude(),
            held - 1000.0 * PERC_DECAY_FAST,
            epsilon = 1e-5
        );
    }

    #[test]
    fn ignored_parameters() {
        let mut v = Voice::default();
        let before = v.snapshot();
        v.set_parameter(Parameter::ShiftShape(0.3));
        v.set_parameter(Parameter::Spare(4));
        assert_eq!(v.snapshot(), before);
    }

    #[test]
    fn init_resets_in_place() {
        let mut v = Voice::default();
        select(&mut v, 5, 1.0);
        v.set_parameter(Parameter::Dirt(70));
        let mut out = [0.0f32; 64];
        v.process_block_f32(Pitch::new(60, 0), &mut out);

        v.init(0, 0x0101);
        let fresh = Voice::default();
        assert_eq!(v.snapshot(), fresh.snapshot());
        assert!(v.partials().phases().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn init_replays_the_same_output() {
        let config = VoiceConfig {
            dirt: 60,
            percussion: 2,
            ..VoiceConfig::default()
        };
        let mut v = Voice::new(config).unwrap();
        let mut first = [0.0f32; 256];
        v.note_on(Pitch::new(55, 0));
        v.process_block_f32(Pitch::new(55, 0), &mut first);

        v.init(0, 0);
        let mut again = [0.0f32; 256];
        v.note_on(Pitch::new(55, 0));
        v.process_block_f32(Pitch::new(55, 0), &mut again);
        assert_eq!(first, again);
    }

    #[test]
    fn voice_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Voice>();
    }

    #[test]
    fn snapshot_serializes() {
        let v = Voice::default();
        let json = serde_json::to_value(v.snapshot()).unwrap();
        assert_eq!(json["drawbarSelect"], 9);
        assert_eq!(json["percussion"]["enabled"], false);
        assert!(json["registerA"].is_array());
    }
}
