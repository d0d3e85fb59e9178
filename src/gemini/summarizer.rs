//! Gemini text summarization.
//!
//! Condenses text in its own language before it is spoken.

use std::time::Instant;

use serde_json::json;
use tracing::{info, warn};

use super::GeminiClient;
use crate::error::{ReaderError, Result};

const SUMMARIZE_PROMPT: &str = "Summarise in SAME language (≤80 words):\n\n{text}";

const MAX_OUTPUT_TOKENS: u32 = 80;

pub(crate) fn summary_request(text: &str) -> serde_json::Value {
    json!({
        "contents": [{"parts": [{"text": SUMMARIZE_PROMPT.replace("{text}", text)}]}],
        "generationConfig": {"maxOutputTokens": MAX_OUTPUT_TOKENS}
    })
}

impl GeminiClient {
    /// Summarize `text` with `model`.
    ///
    /// A response with no candidates is an error. A candidate without text
    /// yields an empty summary.
    pub async fn summarize(&self, text: &str, model: &str, api_key: &str) -> Result<String> {
        let t_start = Instant::now();
        let resp = self
            .generate_content(model, api_key, &summary_request(text))
            .await?;
        let latency_ms = t_start.elapsed().as_secs_f64() * 1000.0;

        if !resp.has_candidates() {
            return Err(ReaderError::RemoteApi("response contained no candidates".into()));
        }

        let summary = resp.first_text().unwrap_or("").trim().to_string();
        if summary.is_empty() {
            warn!("Gemini summary response had no text ({latency_ms:.0}ms)");
        } else {
            info!(
                "Summarized {} chars → {} chars ({latency_ms:.0}ms)",
                text.chars().count(),
                summary.chars().count()
            );
        }
        Ok(summary)
    }
}
