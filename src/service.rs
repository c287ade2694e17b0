//! Speech service: text + speaker in, audio bytes (or nothing) out.

use tracing::{info, warn};

use crate::config::Config;
use crate::provider::{AzureSpeechSynthesizer, SpeechProvider};
use crate::ssml::{build_ssml, SynthesisRequest, VoiceTable};
use crate::synthesis::SynthesisClient;

pub struct SpeechService<P> {
    voices: VoiceTable,
    prosody_rate: Option<String>,
    temperature: f64,
    client: SynthesisClient<P>,
}

impl SpeechService<AzureSpeechSynthesizer> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, AzureSpeechSynthesizer::new(&config.azure))
    }
}

impl<P: SpeechProvider> SpeechService<P> {
    pub fn new(config: &Config, provider: P) -> Self {
        Self {
            voices: VoiceTable::new(config.voices.clone()),
            prosody_rate: config.prosody_rate.clone(),
            temperature: config.voice_temperature,
            client: SynthesisClient::new(provider),
        }
    }

    /// Synthesize `text` in the voice configured for `speaker_name`.
    /// Returns `None` if synthesis fails for any reason; the failure is logged.
    pub fn generate_audio(&self, text: &str, speaker_name: &str) -> Option<Vec<u8>> {
        let request = SynthesisRequest::new(text, speaker_name)
            .with_prosody_rate(self.prosody_rate.clone())
            .with_temperature(self.temperature);
        let ssml = build_ssml(&request, &self.voices);

        match self.client.synthesize(&ssml) {
            Ok(audio) => {
                info!("Generated {} bytes of audio for speaker {speaker_name}", audio.len());
                Some(audio)
            }
            Err(e) => {
                warn!("Error generating audio with Azure: {e}");
                None
            }
        }
    }
}
