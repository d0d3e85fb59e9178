//! WAV playback through rodio with cancellation.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::error::{ReaderError, Result};

pub struct Player {
    // In rodio 0.21, OutputStream is the handle; dropping it stops output
    output_stream: OutputStream,
    play_lock: AsyncMutex<()>,
    control: PlaybackControl,
}

impl Player {
    /// Open the default output device.
    pub fn open() -> Result<Self> {
        let output_stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| ReaderError::Playback(format!("Failed to open audio output: {e}")))?;
        Ok(Self {
            output_stream,
            play_lock: AsyncMutex::new(()),
            control: PlaybackControl::new(),
        })
    }

    pub fn is_playing(&self) -> bool {
        self.control.is_playing()
    }

    /// Play a WAV buffer to the end. Returns true if cancelled.
    ///
    /// Overlapping calls queue behind the one currently playing.
    pub async fn play_wav(&self, wav: Vec<u8>) -> Result<bool> {
        let _guard = self.play_lock.lock().await;
        // From here on a cancel() belongs to this clip, even while it decodes
        self.control.begin();

        let source = Decoder::new(Cursor::new(wav))
            .map_err(|e| ReaderError::Playback(format!("Failed to decode WAV: {e}")))?;
        let sink = Sink::connect_new(self.output_stream.mixer());
        sink.append(source);

        self.control.wait(sink).await
    }

    /// Stop the active playback immediately.
    pub fn cancel(&self) {
        self.control.cancel();
    }
}

/// Cancel flag and active sink shared between `play_wav` and `cancel`.
struct PlaybackControl {
    cancel_flag: Arc<AtomicBool>,
    playing: Arc<AtomicBool>,
    active_sink: Arc<Mutex<Option<Sink>>>,
}

impl PlaybackControl {
    fn new() -> Self {
        Self {
            cancel_flag: Arc::new(AtomicBool::new(false)),
            playing: Arc::new(AtomicBool::new(false)),
            active_sink: Arc::new(Mutex::new(None)),
        }
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    /// Forget any cancel aimed at an earlier clip.
    fn begin(&self) {
        self.cancel_flag.store(false, Ordering::Relaxed);
    }

    /// Track `sink` as the active one and block until it drains or is cancelled.
    async fn wait(&self, sink: Sink) -> Result<bool> {
        self.playing.store(true, Ordering::Relaxed);
        if let Ok(mut guard) = self.active_sink.lock() {
            *guard = Some(sink);
        }

        let t_play = Instant::now();
        let cancel_flag = self.cancel_flag.clone();
        let active_sink = self.active_sink.clone();

        let was_cancelled = tokio::task::spawn_blocking(move || loop {
            // cancel() may already have taken the sink, so check the flag first
            if cancel_flag.load(Ordering::Relaxed) {
                if let Ok(mut guard) = active_sink.lock() {
                    if let Some(sink) = guard.take() {
                        sink.stop();
                    }
                }
                return true;
            }

            let is_empty = match active_sink.lock() {
                Ok(guard) => guard.as_ref().map_or(true, Sink::empty),
                Err(_) => true,
            };
            if is_empty {
                return false;
            }

            std::thread::sleep(Duration::from_millis(50));
        })
        .await
        .map_err(|e| ReaderError::Playback(format!("Playback task failed: {e}")))?;

        if let Ok(mut guard) = self.active_sink.lock() {
            *guard = None;
        }
        self.playing.store(false, Ordering::Relaxed);

        debug!("Playback finished in {:.0}ms", t_play.elapsed().as_secs_f64() * 1000.0);
        if was_cancelled {
            info!("Playback cancelled");
        }
        Ok(was_cancelled)
    }

    fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
        match self.active_sink.lock() {
            Ok(mut guard) => {
                if let Some(sink) = guard.take() {
                    sink.stop();
                }
            }
            Err(e) => warn!("Playback state poisoned: {e}"),
        }
        self.playing.store(false, Ordering::Relaxed);
    }
}
