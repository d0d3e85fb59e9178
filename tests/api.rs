mod common;

use std::sync::Arc;

use serde_json::{json, Value};

use common::{client, settings, MockGemini};
use gemini_reader::api::{serve, ApiState};

async fn start_api(gemini_base: &str) -> String {
    let state = ApiState {
        client: Arc::new(client(gemini_base)),
        settings: Arc::new(settings()),
        player: None,
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve(listener, state).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn status_reports_settings() {
    let mock = MockGemini::default();
    let api = start_api(&mock.start().await).await;

    let status: Value = reqwest::get(format!("{api}/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["voice"], "Kore");
    assert_eq!(status["tts_model"], "gemini-2.5-flash-preview-tts");
    assert_eq!(status["playing"], false);
    assert_eq!(status["playback_available"], false);
}

#[tokio::test]
async fn synthesize_returns_wav_data_url() {
    let mock = MockGemini::default();
    let api = start_api(&mock.start().await).await;

    let resp: Value = reqwest::Client::new()
        .post(format!("{api}/synthesize"))
        .json(&json!({"text": "Hello from the page", "summarize": true}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["status"], "ok");
    assert_eq!(resp["text"], "A short summary.");
    assert!(resp["audio"]
        .as_str()
        .unwrap()
        .starts_with("data:audio/wav;base64,UklGR"));
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn synthesize_reports_missing_audio() {
    let mock = MockGemini {
        speech: (axum::http::StatusCode::OK, common::text_response("nope")),
        ..Default::default()
    };
    let api = start_api(&mock.start().await).await;

    let resp: Value = reqwest::Client::new()
        .post(format!("{api}/synthesize"))
        .json(&json!({"text": "Hello"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["status"], "error");
    assert_eq!(resp["error"], "No audio returned");
}

#[tokio::test]
async fn speak_rejects_empty_text_and_missing_player() {
    let mock = MockGemini::default();
    let api = start_api(&mock.start().await).await;
    let http = reqwest::Client::new();

    let empty: Value = http
        .post(format!("{api}/speak"))
        .json(&json!({"text": "   "}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(empty["error"], "empty text");

    let no_player: Value = http
        .post(format!("{api}/speak"))
        .json(&json!({"text": "Hello"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(no_player["error"], "playback unavailable");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn cancel_without_player_is_harmless() {
    let mock = MockGemini::default();
    let api = start_api(&mock.start().await).await;

    let resp: Value = reqwest::Client::new()
        .post(format!("{api}/cancel"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["status"], "cancelled");
}
