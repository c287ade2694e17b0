//! speech-synth: synthesize text to a WAV file.

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use speech_synth::audio::inspect_wav;
use speech_synth::config::Config;
use speech_synth::legacy::LegacyRequester;
use speech_synth::provider::OutputFormat;
use speech_synth::service::SpeechService;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "speech-synth", about = "Text-to-speech via Azure Speech")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Speaker name, looked up in the `voices` table
    #[arg(short, long, default_value = "Yunxi")]
    speaker: String,

    /// Text to speak (read from stdin when omitted)
    #[arg(short, long)]
    text: Option<String>,

    /// Where to write the audio
    #[arg(short, long, default_value = "output.wav")]
    output: PathBuf,

    /// Anchor type passed to the legacy endpoint
    #[arg(long, default_value = "default")]
    anchor_type: String,

    /// Use only the legacy HTTP endpoint
    #[arg(long, conflicts_with = "fallback")]
    legacy: bool,

    /// Try the legacy endpoint if Azure synthesis produces nothing
    #[arg(long)]
    fallback: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Keep HTTP client internals quiet unless asked
    let filter = if args.verbose {
        EnvFilter::new("debug,reqwest=info,hyper_util=info")
    } else {
        EnvFilter::new("info,reqwest=warn,hyper_util=warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(args.config.as_deref());

    let text = match args.text {
        Some(text) => text,
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };
    let text = text.trim();
    if text.is_empty() {
        return Err("no text to synthesize".into());
    }

    let audio = if args.legacy {
        LegacyRequester::from_config(config.legacy.clone()).request(text, &args.anchor_type)
    } else {
        if !config.azure.is_configured() {
            warn!("Azure key/region not configured; synthesis will likely fail");
        }
        let service = SpeechService::from_config(&config);
        match service.generate_audio(text, &args.speaker) {
            Some(audio) => Some(audio),
            None if args.fallback && config.legacy.is_configured() => {
                info!("Falling back to legacy TTS endpoint");
                LegacyRequester::from_config(config.legacy.clone())
                    .request(text, &args.anchor_type)
            }
            None => None,
        }
    };

    let Some(audio) = audio else {
        return Err("speech synthesis produced no audio".into());
    };

    std::fs::write(&args.output, &audio)?;

    match inspect_wav(&audio) {
        Ok(summary) => {
            info!(
                "Wrote {} ({:.1}s, {} Hz, {}-bit, {} ch)",
                args.output.display(),
                summary.duration_secs(),
                summary.sample_rate,
                summary.bits_per_sample,
                summary.channels
            );
            if !summary.matches_output_format(OutputFormat::Riff48Khz16BitMonoPcm) {
                warn!("Audio is not {}", OutputFormat::Riff48Khz16BitMonoPcm);
            }
        }
        Err(e) => warn!(
            "Wrote {} ({} bytes, not a readable WAV: {e})",
            args.output.display(),
            audio.len()
        ),
    }

    Ok(())
}
