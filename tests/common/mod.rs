//! A local stand-in for the Gemini REST API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use gemini_reader::config::SpeechSettings;
use gemini_reader::gemini::GeminiClient;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub model: Option<String>,
    pub key: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn is_speech(&self) -> bool {
        self.body["generationConfig"]["responseModalities"].is_array()
    }

    pub fn prompt(&self) -> &str {
        self.body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct MockGemini {
    pub summary: (StatusCode, Value),
    pub speech: (StatusCode, Value),
    pub models: (StatusCode, Value),
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl Default for MockGemini {
    fn default() -> Self {
        Self {
            summary: (StatusCode::OK, text_response("A short summary.")),
            speech: (
                StatusCode::OK,
                audio_response(&[0x01, 0x02, 0x03, 0x04], "audio/L16;codec=pcm;rate=24000"),
            ),
            models: (
                StatusCode::OK,
                json!({"models": [
                    {"name": "models/gemini-2.5-flash-lite", "supportedGenerationMethods": ["generateContent"]},
                    {"name": "models/gemini-2.5-flash-preview-tts", "supportedGenerationMethods": ["generateContent"]}
                ]}),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockGemini {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Start serving on an ephemeral port; returns the API base URL.
    pub async fn start(&self) -> String {
        let app = Router::new()
            .route("/v1beta/models", get(list_models))
            .route("/v1beta/models/{action}", post(generate_content))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1beta")
    }
}

fn request_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn list_models(
    State(mock): State<MockGemini>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    mock.requests.lock().unwrap().push(RecordedRequest {
        method: "GET",
        model: None,
        key: request_key(&headers),
        query,
        body: Value::Null,
    });
    (mock.models.0, Json(mock.models.1.clone()))
}

async fn generate_content(
    State(mock): State<MockGemini>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let request = RecordedRequest {
        method: "POST",
        model: Some(action.trim_end_matches(":generateContent").to_string()),
        key: request_key(&headers),
        query,
        body,
    };
    let (status, response) = if request.is_speech() {
        mock.speech.clone()
    } else {
        mock.summary.clone()
    };
    mock.requests.lock().unwrap().push(request);
    (status, Json(response))
}

pub fn text_response(text: &str) -> Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]})
}

pub fn audio_response(pcm: &[u8], mime: &str) -> Value {
    json!({"candidates": [{"content": {"parts": [{
        "inlineData": {"mimeType": mime, "data": STANDARD.encode(pcm)}
    }]}}]})
}

pub fn error_response(code: u16, message: &str) -> Value {
    json!({"error": {"code": code, "message": message, "status": "INVALID_ARGUMENT"}})
}

pub fn settings() -> SpeechSettings {
    SpeechSettings {
        api_key: "test-key".into(),
        text_model: "gemini-2.5-flash-lite".into(),
        tts_model: "gemini-2.5-flash-preview-tts".into(),
        voice: "Kore".into(),
        sample_rate: 24000,
        max_input_chars: 4000,
    }
}

pub fn client(api_base: &str) -> GeminiClient {
    GeminiClient::with_base(api_base, None).unwrap()
}
