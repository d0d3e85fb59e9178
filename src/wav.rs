//! Minimal WAV container for raw PCM from the speech endpoint.
//!
//! Gemini returns headerless 16-bit little-endian mono samples. Wrapping
//! them in a fixed 44-byte RIFF header is enough for any player to decode.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const DEFAULT_SAMPLE_RATE: u32 = 24000;
pub const WAV_HEADER_LEN: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;

/// Wrap `pcm` (s16le mono) in a WAV header. The payload is copied verbatim;
/// odd lengths are not rejected.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    wav.extend_from_slice(&wav_header(pcm.len(), sample_rate));
    wav.extend_from_slice(pcm);
    wav
}

/// RIFF sizes are 32-bit: payloads past 4 GiB saturate the size fields at
/// `u32::MAX` instead of wrapping.
fn wav_header(data_len: usize, sample_rate: u32) -> [u8; WAV_HEADER_LEN] {
    let data_len = u32::try_from(data_len).unwrap_or(u32::MAX);
    let riff_len = data_len.saturating_add(36);
    let byte_rate = sample_rate.saturating_mul(u32::from(BLOCK_ALIGN));

    let mut header = [0u8; WAV_HEADER_LEN];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&riff_len.to_le_bytes());
    header[8..16].copy_from_slice(b"WAVEfmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // integer PCM
    header[22..24].copy_from_slice(&CHANNELS.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&BLOCK_ALIGN.to_le_bytes());
    header[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_len.to_le_bytes());
    header
}

/// [`pcm_to_wav`] at the speech endpoint's native 24 kHz.
pub fn pcm_to_wav_default(pcm: &[u8]) -> Vec<u8> {
    pcm_to_wav(pcm, DEFAULT_SAMPLE_RATE)
}

/// Render a WAV buffer as a `data:` URL playable by a browser `<audio>`.
pub fn wav_data_url(wav: &[u8]) -> String {
    format!("data:audio/wav;base64,{}", STANDARD.encode(wav))
}
