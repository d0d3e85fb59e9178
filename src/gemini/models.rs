//! Model listing and classification.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::GeminiClient;
use crate::error::{ReaderError, Result};

/// Prebuilt voices offered when the API does not advertise any.
pub const FALLBACK_VOICES: [&str; 12] = [
    "Kore", "Puck", "Wren", "Orion", "Eden", "Nova", "Rhea", "Atlas", "Breeze", "River", "Sage",
    "Indigo",
];

const GENERATE_CONTENT: &str = "generateContent";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_capabilities: Option<Capabilities>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    #[serde(default)]
    pub tts_voices: Vec<VoiceInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    pub voice_name: String,
}

impl ModelInfo {
    /// Short id, e.g. `gemini-2.5-flash` for `models/gemini-2.5-flash`.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or_else(|| self.id())
    }

    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_CONTENT)
    }

    pub fn is_tts(&self) -> bool {
        self.id().contains("tts")
    }
}

#[derive(Debug, Deserialize)]
struct ModelList {
    models: Option<Vec<ModelInfo>>,
}

/// Models usable for summarization.
pub fn text_models(models: &[ModelInfo]) -> Vec<&ModelInfo> {
    models
        .iter()
        .filter(|m| m.supports_generate_content() && !m.is_tts())
        .collect()
}

/// Models usable for speech synthesis.
pub fn tts_models(models: &[ModelInfo]) -> Vec<&ModelInfo> {
    models
        .iter()
        .filter(|m| m.supports_generate_content() && m.is_tts())
        .collect()
}

/// Voices advertised across all models in first-seen order, or
/// [`FALLBACK_VOICES`] when none are.
pub fn voices(models: &[ModelInfo]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for voice in models
        .iter()
        .filter_map(|m| m.supported_capabilities.as_ref())
        .flat_map(|c| c.tts_voices.iter())
    {
        if !names.contains(&voice.voice_name) {
            names.push(voice.voice_name.clone());
        }
    }

    if names.is_empty() {
        names = FALLBACK_VOICES.iter().map(|v| v.to_string()).collect();
    }
    names
}

impl GeminiClient {
    /// Fetch the models visible to `api_key`.
    pub async fn list_models(&self, api_key: &str) -> Result<Vec<ModelInfo>> {
        let list: ModelList = self.get_json("models", api_key).await?;
        let models = list
            .models
            .ok_or_else(|| ReaderError::RemoteApi("No models found".into()))?;
        info!("Fetched {} Gemini models", models.len());
        Ok(models)
    }
}
