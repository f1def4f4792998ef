pub mod config;
pub mod dsp;
pub mod error;
pub mod params;

pub use config::VoiceConfig;
pub use dsp::pitch::Pitch;
pub use dsp::voice::{Voice, VoiceSnapshot};
pub use error::{Error, Result};
pub use params::Parameter;

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the tonewheel-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

fn js_err(e: Error) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

/// Parse a JSON config; an empty string means defaults.
fn parse_config(config_json: &str) -> Result<VoiceConfig> {
    if config_json.trim().is_empty() {
        Ok(VoiceConfig::default())
    } else {
        VoiceConfig::from_json(config_json)
    }
}

/// WASM-exposed organ voice for AudioWorklet playback.
#[wasm_bindgen]
pub struct WasmVoice {
    inner: Voice,
}

#[wasm_bindgen]
impl WasmVoice {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> std::result::Result<WasmVoice, JsValue> {
        let config = parse_config(config_json).map_err(js_err)?;
        let inner = Voice::new(config).map_err(js_err)?;
        Ok(WasmVoice { inner })
    }

    pub fn note_on(&mut self, pitch: u16) {
        self.inner.note_on(Pitch::from_raw(pitch));
    }

    pub fn note_off(&mut self, pitch: u16) {
        self.inner.note_off(Pitch::from_raw(pitch));
    }

    /// Apply a raw host `(id, value)` parameter change.
    pub fn set_parameter(&mut self, id: u16, value: u16) -> std::result::Result<(), JsValue> {
        let param = Parameter::from_raw(id, value).map_err(|e| {
            log::warn!("ignoring parameter: {e}");
            js_err(e)
        })?;
        self.inner.set_parameter(param);
        Ok(())
    }

    /// Fill `out` with the next block at the packed pitch word.
    pub fn process(&mut self, pitch: u16, out: &mut [f32]) {
        self.inner.process_block_f32(Pitch::from_raw(pitch), out);
    }

    pub fn snapshot(&self) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.snapshot())
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }
}

/// WASM-exposed: render one held note to mono f32 samples.
#[wasm_bindgen]
pub fn render_note_samples(
    config_json: &str,
    pitch: u16,
    frames: usize,
) -> std::result::Result<Vec<f32>, JsValue> {
    let config = parse_config(config_json).map_err(js_err)?;
    dsp::renderer::render_note(
        &config,
        Pitch::from_raw(pitch),
        frames,
        dsp::renderer::DEFAULT_BLOCK_SIZE,
    )
    .map_err(js_err)
}

/// WASM-exposed: render one held note to a WAV byte array.
#[wasm_bindgen]
pub fn render_note_wav_bytes(
    config_json: &str,
    pitch: u16,
    frames: usize,
) -> std::result::Result<Vec<u8>, JsValue> {
    let config = parse_config(config_json).map_err(js_err)?;
    dsp::renderer::render_note_wav(
        &config,
        Pitch::from_raw(pitch),
        frames,
        dsp::renderer::DEFAULT_BLOCK_SIZE,
    )
    .map_err(js_err)
}
