//! Offline renderer — drives a voice block by block into a buffer or WAV.

use crate::config::VoiceConfig;
use crate::error::{Error, Result};

use super::pitch::Pitch;
use super::voice::Voice;

/// Default host block length.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Render `frames` mono samples of one held note.
pub fn render_note(
    config: &VoiceConfig,
    pitch: Pitch,
    frames: usize,
    block_size: usize,
) -> Result<Vec<f32>> {
    if block_size == 0 {
        return Err(Error::Config("block size must be non-zero".into()));
    }
    let mut voice = Voice::new(config.clone())?;
    log::info!(
        "rendering note {} (+{}/255) for {frames} frames in blocks of {block_size}",
        pitch.note,
        pitch.fine
    );
    voice.note_on(pitch);

    let mut output = vec![0.0f32; frames];
    for block in output.chunks_mut(block_size) {
        voice.process_block_f32(pitch, block);
    }
    Ok(output)
}

/// Render one held note to a 16-bit mono PCM WAV file as bytes.
pub fn render_note_wav(
    config: &VoiceConfig,
    pitch: Pitch,
    frames: usize,
    block_size: usize,
) -> Result<Vec<u8>> {
    let samples = render_note(config, pitch, frames, block_size)?;
    Ok(encode_wav_mono16(&samples, config.sample_rate.round() as u32))
}

/// Float sample in [-1, 1] to signed 16-bit PCM.
#[inline]
fn to_pcm16(s: f32) -> i16 {
    (s * i16::MAX as f32).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Encode mono float samples as a 16-bit PCM WAV byte buffer.
fn encode_wav_mono16(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    const HEADER_LEN: usize = 44;
    const BYTES_PER_SAMPLE: u16 = 2;

    let data_len = (samples.len() * BYTES_PER_SAMPLE as usize) as u32;
    let mut buf = Vec::with_capacity(HEADER_LEN + data_len as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(HEADER_LEN as u32 - 8 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&1u16.to_le_bytes()); // mono
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * BYTES_PER_SAMPLE as u32).to_le_bytes());
    buf.extend_from_slice(&BYTES_PER_SAMPLE.to_le_bytes());
    buf.extend_from_slice(&(BYTES_PER_SAMPLE * 8).to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    for &s in samples {
        buf.extend_from_slice(&to_pcm16(s).to_le_bytes());
    }
    buf
}
