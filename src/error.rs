use thiserror::Error;

/// Errors surfaced by the reader pipeline and its collaborators.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// The Gemini endpoint answered with an explicit error.
    #[error("Gemini API error: {0}")]
    RemoteApi(String),

    #[error("No audio returned")]
    NoAudioReturned,

    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("Failed to decode audio payload: {0}")]
    AudioDecode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Model cache error: {0}")]
    Cache(String),

    #[error("No Gemini API key configured (set gemini.api_key or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("No text found")]
    EmptyText,
}

// The request URL is dropped so nothing derived from it reaches logs or API responses
impl From<reqwest::Error> for ReaderError {
    fn from(err: reqwest::Error) -> Self {
        ReaderError::Http(err.without_url())
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;
