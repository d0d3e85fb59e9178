//! The read-aloud pipeline: trim → summarize (optional) → synthesize → WAV.

use std::time::Instant;

use tracing::{info, warn};

use crate::config::SpeechSettings;
use crate::error::{ReaderError, Result};
use crate::gemini::GeminiClient;
use crate::text_source::trim_input;
use crate::wav::pcm_to_wav;

/// Text that was spoken and its encoded audio.
#[derive(Debug, Clone)]
pub struct Speech {
    pub text: String,
    pub summarized: bool,
    pub sample_rate: u32,
    pub wav: Vec<u8>,
}

/// Turn `raw_text` into playable WAV audio.
///
/// Errors from either remote call are returned as-is; nothing is encoded
/// unless the speech endpoint returned audio.
pub async fn prepare_speech(
    client: &GeminiClient,
    settings: &SpeechSettings,
    raw_text: &str,
    summarize: bool,
) -> Result<Speech> {
    let t_total = Instant::now();

    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        return Err(ReaderError::EmptyText);
    }
    let input = trim_input(trimmed, settings.max_input_chars);
    if input.len() < trimmed.len() {
        info!(
            "Input truncated to {} of {} chars",
            settings.max_input_chars,
            trimmed.chars().count()
        );
    }

    let (text, summary_ms) = if summarize {
        let t_sum = Instant::now();
        let summary = client
            .summarize(input, &settings.text_model, &settings.api_key)
            .await?;
        if summary.is_empty() {
            warn!("Summary is empty; speaking it anyway");
        }
        (summary, t_sum.elapsed().as_secs_f64() * 1000.0)
    } else {
        (input.to_string(), 0.0)
    };

    let t_tts = Instant::now();
    let audio = client
        .synthesize_audio(&text, &settings.tts_model, &settings.voice, &settings.api_key)
        .await?;
    let tts_ms = t_tts.elapsed().as_secs_f64() * 1000.0;

    let sample_rate = audio.sample_rate().unwrap_or(settings.sample_rate);
    let wav = pcm_to_wav(&audio.pcm, sample_rate);

    let total_ms = t_total.elapsed().as_secs_f64() * 1000.0;
    info!(
        "Speech ready: summary={summary_ms:.0}ms tts={tts_ms:.0}ms total={total_ms:.0}ms ({} bytes @ {sample_rate}Hz)",
        wav.len()
    );

    Ok(Speech {
        text,
        summarized: summarize,
        sample_rate,
        wav,
    })
}
