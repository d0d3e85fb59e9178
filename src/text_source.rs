//! Text acquisition: the desktop selection or a whole page of text.
//!
//! On Linux the primary selection (highlighted text) is read first, then the
//! regular clipboard. Pages come from a file or stdin.

use std::path::PathBuf;

use arboard::Clipboard;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::{ReaderError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Stdin,
    File(PathBuf),
}

impl PageSource {
    /// `None` or `-` mean stdin.
    pub fn from_arg(arg: Option<PathBuf>) -> Self {
        match arg {
            Some(path) if path.as_os_str() != "-" => Self::File(path),
            _ => Self::Stdin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMode {
    Selection,
    Page(PageSource),
}

impl TextMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Page(_) => "page",
        }
    }
}

/// Acquire text for `mode`, trimmed. Empty when nothing is available.
pub async fn acquire_text(mode: &TextMode) -> Result<String> {
    let raw = match mode {
        TextMode::Selection => {
            tokio::task::spawn_blocking(read_selection)
                .await
                .map_err(|e| ReaderError::Clipboard(format!("selection task failed: {e}")))??
        }
        TextMode::Page(PageSource::File(path)) => tokio::fs::read_to_string(path).await?,
        TextMode::Page(PageSource::Stdin) => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let text = raw.trim().to_string();
    debug!("Acquired {} chars from {}", text.chars().count(), mode.name());
    Ok(text)
}

fn read_selection() -> Result<String> {
    let mut clipboard =
        Clipboard::new().map_err(|e| ReaderError::Clipboard(format!("Failed to open clipboard: {e}")))?;

    #[cfg(target_os = "linux")]
    {
        use arboard::{GetExtLinux, LinuxClipboardKind};
        match clipboard.get().clipboard(LinuxClipboardKind::Primary).text() {
            Ok(text) if !text.trim().is_empty() => return Ok(text),
            Ok(_) => debug!("Primary selection empty, trying clipboard"),
            Err(e) => debug!("Primary selection unavailable ({e}), trying clipboard"),
        }
    }

    match clipboard.get_text() {
        Ok(text) => Ok(text),
        Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
        Err(e) => Err(ReaderError::Clipboard(format!("Failed to read clipboard: {e}"))),
    }
}

/// Keep at most `max_chars` characters of `text`.
pub fn trim_input(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
