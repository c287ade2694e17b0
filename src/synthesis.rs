//! Synthesis client: runs SSML through a provider and classifies the outcome.

use thiserror::Error;
use tracing::info;

use crate::provider::{CancellationReason, SpeechProvider, SynthesisResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("Error details: {}", .details.as_deref().unwrap_or("None"))]
    Canceled {
        reason: CancellationReason,
        details: Option<String>,
    },
    #[error("Unknown exit reason: {0}")]
    Unknown(String),
}

pub struct SynthesisClient<P> {
    provider: P,
}

impl<P> SynthesisClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: SpeechProvider> SynthesisClient<P> {
    /// Convert SSML to audio bytes in the provider's output format.
    pub fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, SynthesisError> {
        info!("Initializing text-to-speech conversion");
        info!(
            "Configuring speech synthesis format: {}",
            self.provider.output_format()
        );
        info!("Creating speech synthesizer");
        info!("Starting SSML synthesis");

        match self.provider.speak_ssml(ssml) {
            SynthesisResult::Completed(audio) => {
                info!(
                    "Speech synthesis completed successfully. Generated {} bytes of audio data",
                    audio.len()
                );
                Ok(audio)
            }
            SynthesisResult::Canceled(cancellation) => {
                match cancellation.error_code.as_deref() {
                    Some(code) => info!(
                        "Speech synthesis canceled: {} (code {code})",
                        cancellation.reason
                    ),
                    None => info!("Speech synthesis canceled: {}", cancellation.reason),
                }

                if cancellation.reason == CancellationReason::Error {
                    if let Some(details) = cancellation.error_details.as_deref() {
                        if !details.is_empty() {
                            info!("Error details: {details}");
                        }
                    }
                }

                Err(SynthesisError::Canceled {
                    reason: cancellation.reason,
                    details: cancellation.error_details,
                })
            }
            SynthesisResult::Unknown(reason) => {
                info!("Speech synthesis failed with unknown reason: {reason}");
                Err(SynthesisError::Unknown(reason))
            }
        }
    }
}
