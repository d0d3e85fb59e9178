//! Gemini REST client: summarization, speech synthesis and model listing.
//!
//! Components:
//! - `summarizer`: short same-language summaries via `generateContent`
//! - `speech`: audio-only `generateContent` with a prebuilt voice
//! - `models`: model listing, classification and voice discovery
//! - `cache`: one-day model list cache

pub mod cache;
pub mod models;
pub mod speech;
pub mod summarizer;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::GeminiConfig;
use crate::error::{ReaderError, Result};

/// Thin wrapper over a shared reqwest client pointed at a Gemini API base.
///
/// Holds no credentials; the API key travels with each call in the
/// `x-goog-api-key` header, never in the URL.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_base: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        Self::with_base(&config.api_base, timeout)
    }

    pub fn with_base(api_base: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// POST a `generateContent` request for `model`.
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<GenerateContentResponse> {
        let model = model.trim_start_matches("models/");
        let url = format!("{}/models/{model}:generateContent", self.api_base);
        debug!("POST {url}");

        let resp = with_key(self.client.post(&url), api_key)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!("generateContent [{model}] -> {status} ({} bytes)", text.len());
        decode_body(status, &text)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, api_key: &str) -> Result<T> {
        let url = format!("{}/{path}", self.api_base);
        debug!("GET {url}");

        let resp = with_key(self.client.get(&url), api_key).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        decode_body(status, &text)
    }
}

pub const API_KEY_HEADER: &str = "x-goog-api-key";

fn with_key(request: RequestBuilder, api_key: &str) -> RequestBuilder {
    request.header(API_KEY_HEADER, api_key)
}

/// Decode a Gemini JSON body, turning an `error` member or a failed status
/// into [`ReaderError::RemoteApi`].
pub(crate) fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) if status.is_success() => {
            return Err(ReaderError::RemoteApi(format!("invalid JSON response: {e}")));
        }
        Err(_) => {
            let snippet: String = body.chars().take(200).collect();
            return Err(ReaderError::RemoteApi(format!("HTTP {status}: {snippet}")));
        }
    };

    if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
        return Err(ReaderError::RemoteApi(api_error_message(err)));
    }
    if !status.is_success() {
        return Err(ReaderError::RemoteApi(format!("HTTP {status}")));
    }

    serde_json::from_value(value)
        .map_err(|e| ReaderError::RemoteApi(format!("unexpected response shape: {e}")))
}

fn api_error_message(err: &Value) -> String {
    err.get("message")
        .and_then(Value::as_str)
        .or_else(|| err.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

// --- generateContent response ---

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: Option<String>,
    pub data: Option<String>,
}

impl GenerateContentResponse {
    pub(crate) fn has_candidates(&self) -> bool {
        self.candidates.as_ref().is_some_and(|c| !c.is_empty())
    }

    fn first_part(&self) -> Option<&Part> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .first()
    }

    /// `candidates[0].content.parts[0].text`
    pub(crate) fn first_text(&self) -> Option<&str> {
        self.first_part()?.text.as_deref()
    }

    /// `candidates[0].content.parts[0].inlineData`
    pub(crate) fn first_inline_data(&self) -> Option<&InlineData> {
        self.first_part()?.inline_data.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_member_becomes_remote_api_error() {
        let body = json!({"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}});
        let err = decode_body::<GenerateContentResponse>(StatusCode::BAD_REQUEST, &body.to_string())
            .unwrap_err();
        match err {
            ReaderError::RemoteApi(msg) => assert_eq!(msg, "API key not valid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_member_wins_even_with_ok_status() {
        let body = json!({"error": "quota exceeded"});
        let err = decode_body::<GenerateContentResponse>(StatusCode::OK, &body.to_string())
            .unwrap_err();
        assert!(matches!(err, ReaderError::RemoteApi(msg) if msg == "quota exceeded"));
    }

    #[test]
    fn non_json_failure_reports_status() {
        let err = decode_body::<GenerateContentResponse>(StatusCode::BAD_GATEWAY, "<html>oops</html>")
            .unwrap_err();
        assert!(matches!(err, ReaderError::RemoteApi(msg) if msg.starts_with("HTTP 502")));
    }

    #[test]
    fn extracts_first_text_and_inline_data() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [{
                    "text": "hello",
                    "inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAA="}
                }]}
            }]
        });
        let resp: GenerateContentResponse =
            decode_body(StatusCode::OK, &body.to_string()).unwrap();
        assert!(resp.has_candidates());
        assert_eq!(resp.first_text(), Some("hello"));
        let inline = resp.first_inline_data().unwrap();
        assert_eq!(inline.data.as_deref(), Some("AAA="));
        assert_eq!(inline.mime_type.as_deref(), Some("audio/L16;codec=pcm;rate=24000"));
    }

    #[test]
    fn empty_object_has_no_candidates() {
        let resp: GenerateContentResponse = decode_body(StatusCode::OK, "{}").unwrap();
        assert!(!resp.has_candidates());
        assert!(resp.first_text().is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = GeminiClient::with_base("http://localhost:1234/v1beta/", None).unwrap();
        assert_eq!(client.api_base(), "http://localhost:1234/v1beta");
    }
}
