//! gemini-reader-rs: read text aloud with Gemini summarization and TTS.

pub mod api;
pub mod config;
pub mod error;
pub mod gemini;
pub mod player;
pub mod reader;
pub mod text_source;
pub mod wav;

pub use error::{ReaderError, Result};
