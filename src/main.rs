//! gemini-reader: read the selection or a page aloud via Gemini.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gemini_reader::config::{Config, SpeechSettings};
use gemini_reader::gemini::cache::ModelCache;
use gemini_reader::gemini::{models, GeminiClient};
use gemini_reader::player::Player;
use gemini_reader::text_source::{acquire_text, PageSource, TextMode};
use gemini_reader::{api, reader, ReaderError};

#[derive(Parser, Debug)]
#[command(name = "gemini-reader", about = "Read text aloud with Gemini TTS")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the current selection (primary selection, then clipboard)
    Selection(SpeakArgs),
    /// Read a whole page of text from FILE, or stdin when omitted or "-"
    Page {
        file: Option<PathBuf>,
        #[command(flatten)]
        speak: SpeakArgs,
    },
    /// Read the given text
    Say {
        text: String,
        #[command(flatten)]
        speak: SpeakArgs,
    },
    /// List text models, TTS models and voices (cached for one day)
    Models {
        /// Ignore and replace the cached list
        #[arg(long)]
        refresh: bool,
    },
    /// Run the local speak API
    Serve {
        /// Port to bind on 127.0.0.1 (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(ClapArgs, Debug)]
struct SpeakArgs {
    /// Summarize before speaking
    #[arg(short, long)]
    summarize: bool,

    /// Voice preset (e.g. Kore, Puck)
    #[arg(long)]
    voice: Option<String>,

    /// Model used for summaries
    #[arg(long)]
    text_model: Option<String>,

    /// Model used for speech
    #[arg(long)]
    tts_model: Option<String>,

    /// Also write the WAV to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not play the audio
    #[arg(long)]
    no_play: bool,
}

impl SpeakArgs {
    fn apply(&self, settings: &mut SpeechSettings) {
        if let Some(voice) = &self.voice {
            settings.voice = voice.clone();
        }
        if let Some(model) = &self.text_model {
            settings.text_model = model.clone();
        }
        if let Some(model) = &self.tts_model {
            settings.tts_model = model.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug,hyper=info,reqwest=info")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(args.config.as_deref());
    let client = GeminiClient::new(&config.gemini)?;

    match args.command {
        Command::Selection(speak) => read_aloud(&config, &client, TextMode::Selection, speak).await?,
        Command::Page { file, speak } => {
            let mode = TextMode::Page(PageSource::from_arg(file));
            read_aloud(&config, &client, mode, speak).await?
        }
        Command::Say { text, speak } => speak_text(&config, &client, &text, speak).await?,
        Command::Models { refresh } => list_models(&config, &client, refresh).await?,
        Command::Serve { port } => serve(&config, client, port).await?,
    }

    Ok(())
}

async fn read_aloud(
    config: &Config,
    client: &GeminiClient,
    mode: TextMode,
    speak: SpeakArgs,
) -> Result<(), ReaderError> {
    let text = acquire_text(&mode).await?;
    if text.is_empty() {
        warn!("No text found for {}", mode.name());
        return Err(ReaderError::EmptyText);
    }
    speak_text(config, client, &text, speak).await
}

async fn speak_text(
    config: &Config,
    client: &GeminiClient,
    text: &str,
    speak: SpeakArgs,
) -> Result<(), ReaderError> {
    let mut settings = config.speech_settings()?;
    speak.apply(&mut settings);

    let speech = reader::prepare_speech(client, &settings, text, speak.summarize).await?;
    println!("{}", speech.text);

    if let Some(path) = &speak.output {
        tokio::fs::write(path, &speech.wav).await?;
        info!("Wrote {}", path.display());
    }

    if config.playback.enabled && !speak.no_play {
        let player = Player::open()?;
        player.play_wav(speech.wav).await?;
    }
    Ok(())
}

async fn list_models(config: &Config, client: &GeminiClient, refresh: bool) -> Result<(), ReaderError> {
    let settings = config.speech_settings()?;
    let cache = ModelCache::new(config.cache.resolved_path());
    let all = client.cached_models(&cache, &settings.api_key, refresh).await?;

    let marker = |id: &str, selected: &str| if id == selected { "*" } else { " " };

    println!("Text models:");
    for m in models::text_models(&all) {
        println!(" {} {:<40} {}", marker(m.id(), &settings.text_model), m.id(), m.label());
    }
    println!("\nTTS models:");
    for m in models::tts_models(&all) {
        println!(" {} {:<40} {}", marker(m.id(), &settings.tts_model), m.id(), m.label());
    }
    println!("\nVoices:");
    for voice in models::voices(&all) {
        println!(" {} {voice}", marker(&voice, &settings.voice));
    }
    Ok(())
}

async fn serve(config: &Config, client: GeminiClient, port: Option<u16>) -> Result<(), ReaderError> {
    let settings = config.speech_settings()?;

    let player = if config.playback.enabled {
        match Player::open() {
            Ok(p) => Some(Arc::new(p)),
            Err(e) => {
                warn!("{e}; /speak disabled, /synthesize still available");
                None
            }
        }
    } else {
        None
    };

    let state = api::ApiState {
        client: Arc::new(client),
        settings: Arc::new(settings),
        player,
    };

    let addr = format!("127.0.0.1:{}", port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Serving with voice {} (tts: {}, text: {})",
        state.settings.voice, state.settings.tts_model, state.settings.text_model
    );
    api::serve(listener, state).await?;
    Ok(())
}
