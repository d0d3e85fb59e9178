//! Local HTTP API for pushing text to be read aloud.
//!
//! Lets a browser userscript or any other process trigger the same flow as
//! the CLI. Binds to 127.0.0.1 only.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::SpeechSettings;
use crate::gemini::GeminiClient;
use crate::player::Player;
use crate::reader::prepare_speech;
use crate::wav::wav_data_url;

#[derive(Clone)]
pub struct ApiState {
    pub client: Arc<GeminiClient>,
    pub settings: Arc<SpeechSettings>,
    /// `None` when playback is disabled or no output device is available.
    pub player: Option<Arc<Player>>,
}

// --- Request/Response types ---

#[derive(Deserialize)]
struct SpeakRequest {
    text: String,
    #[serde(default)]
    summarize: bool,
}

#[derive(Serialize)]
struct StatusResponse {
    playing: bool,
    playback_available: bool,
    voice: String,
    text_model: String,
    tts_model: String,
}

#[derive(Serialize)]
struct SimpleResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SimpleResponse {
    fn ok(status: &str) -> Self {
        Self {
            status: status.into(),
            text: None,
            audio: None,
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            text: None,
            audio: None,
            error: Some(message.into()),
        }
    }
}

/// Build the axum router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(handle_status))
        .route("/speak", post(handle_speak))
        .route("/synthesize", post(handle_synthesize))
        .route("/cancel", post(handle_cancel))
        .with_state(state)
}

/// Serve the API on an already bound listener until the process exits.
pub async fn serve(listener: TcpListener, state: ApiState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Speak API listening on {addr}");
    }
    axum::serve(listener, router(state)).await
}

// --- Handlers ---

async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        playing: state.player.as_ref().is_some_and(|p| p.is_playing()),
        playback_available: state.player.is_some(),
        voice: state.settings.voice.clone(),
        text_model: state.settings.text_model.clone(),
        tts_model: state.settings.tts_model.clone(),
    })
}

async fn handle_speak(
    State(state): State<ApiState>,
    Json(req): Json<SpeakRequest>,
) -> Json<SimpleResponse> {
    if req.text.trim().is_empty() {
        return Json(SimpleResponse::err("empty text"));
    }
    let Some(player) = state.player.clone() else {
        return Json(SimpleResponse::err("playback unavailable"));
    };

    let preview: String = req.text.chars().take(80).collect();
    info!(
        "HTTP /speak: \"{}{}\" ({} chars, summarize={})",
        preview.replace('\n', " "),
        if req.text.chars().count() > 80 { "..." } else { "" },
        req.text.chars().count(),
        req.summarize,
    );

    // Fire-and-forget: the caller only learns that the request was accepted
    tokio::spawn(async move {
        match prepare_speech(&state.client, &state.settings, &req.text, req.summarize).await {
            Ok(speech) => {
                if let Err(e) = player.play_wav(speech.wav).await {
                    warn!("Playback failed: {e}");
                }
            }
            Err(e) => warn!("Speak request failed: {e}"),
        }
    });

    Json(SimpleResponse::ok("speaking"))
}

async fn handle_synthesize(
    State(state): State<ApiState>,
    Json(req): Json<SpeakRequest>,
) -> Json<SimpleResponse> {
    match prepare_speech(&state.client, &state.settings, &req.text, req.summarize).await {
        Ok(speech) => Json(SimpleResponse {
            text: Some(speech.text),
            audio: Some(wav_data_url(&speech.wav)),
            ..SimpleResponse::ok("ok")
        }),
        Err(e) => {
            warn!("Synthesize request failed: {e}");
            Json(SimpleResponse::err(e.to_string()))
        }
    }
}

async fn handle_cancel(State(state): State<ApiState>) -> Json<SimpleResponse> {
    if let Some(player) = &state.player {
        player.cancel();
    }
    Json(SimpleResponse::ok("cancelled"))
}
