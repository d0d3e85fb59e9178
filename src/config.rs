//! Configuration management for gemini-reader-rs.
//!
//! Loads config from YAML files in standard locations. Every section has
//! defaults, so an empty or missing file is valid.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ReaderError, Result};
use crate::wav::DEFAULT_SAMPLE_RATE;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub text_model: String,
    pub tts_model: String,
    pub voice: String,
    pub sample_rate: u32,
    pub max_input_chars: usize,
    /// Request timeout in seconds. 0 disables it.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".into(),
            text_model: "gemini-2.5-flash-lite".into(),
            tts_model: "gemini-2.5-flash-preview-tts".into(),
            voice: "Kore".into(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_input_chars: 4000,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub enabled: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8768 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Model list cache file. Empty means ~/.cache/gemini-reader/models.json.
    pub path: String,
}

impl CacheConfig {
    pub fn resolved_path(&self) -> PathBuf {
        if !self.path.is_empty() {
            return PathBuf::from(&self.path);
        }
        dirs::cache_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gemini-reader")
            .join("models.json")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub playback: PlaybackConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
}

/// Per-call settings handed to the Gemini clients instead of ambient state.
#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub api_key: String,
    pub text_model: String,
    pub tts_model: String,
    pub voice: String,
    pub sample_rate: u32,
    pub max_input_chars: usize,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/gemini-reader/config.yaml
    /// 3. /etc/gemini-reader/config.yaml
    ///
    /// `GEMINI_API_KEY` overrides `gemini.api_key` when set.
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = Self::load_file(path);
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.gemini.api_key = key.trim().to_string();
            }
        }
        config
    }

    fn load_file(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/gemini-reader/config.yaml")),
                Some(PathBuf::from("/etc/gemini-reader/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match serde_yml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    /// Snapshot the values a speak request needs. Fails without an API key.
    pub fn speech_settings(&self) -> Result<SpeechSettings> {
        let api_key = self.gemini.api_key.trim();
        if api_key.is_empty() {
            return Err(ReaderError::MissingApiKey);
        }
        Ok(SpeechSettings {
            api_key: api_key.to_string(),
            text_model: self.gemini.text_model.clone(),
            tts_model: self.gemini.tts_model.clone(),
            voice: self.gemini.voice.clone(),
            sample_rate: self.gemini.sample_rate,
            max_input_chars: self.gemini.max_input_chars,
        })
    }
}
