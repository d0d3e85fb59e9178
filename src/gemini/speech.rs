//! Gemini speech synthesis.
//!
//! The endpoint answers with base64 raw PCM (s16le, mono) whose rate is
//! carried in the inline data MIME type, e.g. `audio/L16;codec=pcm;rate=24000`.

use std::time::Instant;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use tracing::{debug, info};

use super::GeminiClient;
use crate::error::{ReaderError, Result};

/// Decoded speech payload.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub pcm: Vec<u8>,
    pub mime_type: Option<String>,
}

impl SpeechAudio {
    /// Sample rate advertised by the MIME type, if any.
    pub fn sample_rate(&self) -> Option<u32> {
        self.mime_type.as_deref().and_then(rate_from_mime)
    }
}

/// Parse the `rate=` parameter from an `audio/L16` style MIME type.
pub fn rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("rate"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .filter(|rate| *rate > 0)
}

pub(crate) fn speech_request(text: &str, voice: &str) -> serde_json::Value {
    json!({
        "contents": [{"parts": [{"text": text}]}],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {"prebuiltVoiceConfig": {"voiceName": voice}}
            }
        }
    })
}

impl GeminiClient {
    /// Synthesize `text` and return the raw PCM bytes.
    pub async fn synthesize(
        &self,
        text: &str,
        model: &str,
        voice: &str,
        api_key: &str,
    ) -> Result<Vec<u8>> {
        Ok(self.synthesize_audio(text, model, voice, api_key).await?.pcm)
    }

    /// Synthesize `text`, keeping the MIME type alongside the PCM.
    pub async fn synthesize_audio(
        &self,
        text: &str,
        model: &str,
        voice: &str,
        api_key: &str,
    ) -> Result<SpeechAudio> {
        let t_start = Instant::now();
        let resp = self
            .generate_content(model, api_key, &speech_request(text, voice))
            .await?;

        let inline = resp.first_inline_data().ok_or(ReaderError::NoAudioReturned)?;
        let encoded = inline
            .data
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or(ReaderError::NoAudioReturned)?;
        let pcm = STANDARD.decode(encoded)?;

        let gen_ms = t_start.elapsed().as_secs_f64() * 1000.0;
        debug!("Speech MIME type: {:?}", inline.mime_type);
        info!(
            "Synthesized {} chars → {} PCM bytes with voice {voice} ({gen_ms:.0}ms)",
            text.chars().count(),
            pcm.len()
        );

        Ok(SpeechAudio {
            pcm,
            mime_type: inline.mime_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_asks_for_audio_with_voice() {
        let body = speech_request("Hello there", "Puck");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hello there");
        assert_eq!(body["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Puck"
        );
    }

    #[test]
    fn parses_rate_from_mime() {
        assert_eq!(rate_from_mime("audio/L16;codec=pcm;rate=24000"), Some(24000));
        assert_eq!(rate_from_mime("audio/L16; rate=16000; codec=pcm"), Some(16000));
        assert_eq!(rate_from_mime("audio/L16;codec=pcm"), None);
        assert_eq!(rate_from_mime("audio/L16;rate=0"), None);
        assert_eq!(rate_from_mime("audio/L16;rate=fast"), None);
    }

    #[test]
    fn speech_audio_rate_uses_mime() {
        let audio = SpeechAudio {
            pcm: vec![],
            mime_type: Some("audio/L16;codec=pcm;rate=22050".into()),
        };
        assert_eq!(audio.sample_rate(), Some(22050));
        let bare = SpeechAudio { pcm: vec![], mime_type: None };
        assert_eq!(bare.sample_rate(), None);
    }
}
