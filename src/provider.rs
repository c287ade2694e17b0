//! Speech provider capability and the Azure Speech REST implementation.
//!
//! A provider takes SSML and reports a terminal [`SynthesisResult`]. It never
//! returns an error directly; transport problems surface as a canceled
//! result, the way the Azure SDK reports them.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::AzureConfig;

/// Audio formats the provider can produce. Synthesis always uses
/// [`OutputFormat::Riff48Khz16BitMonoPcm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Riff48Khz16BitMonoPcm,
}

impl OutputFormat {
    /// Value for the `X-Microsoft-OutputFormat` header.
    pub fn header_value(self) -> &'static str {
        match self {
            Self::Riff48Khz16BitMonoPcm => "riff-48khz-16bit-mono-pcm",
        }
    }

    pub fn sample_rate(self) -> u32 {
        match self {
            Self::Riff48Khz16BitMonoPcm => 48_000,
        }
    }

    pub fn bits_per_sample(self) -> u16 {
        match self {
            Self::Riff48Khz16BitMonoPcm => 16,
        }
    }

    pub fn channels(self) -> u16 {
        match self {
            Self::Riff48Khz16BitMonoPcm => 1,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Riff48Khz16BitMonoPcm => f.write_str("RIFF 48KHz 16-bit mono PCM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    Error,
    EndOfStream,
    CancelledByUser,
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "Error",
            Self::EndOfStream => "EndOfStream",
            Self::CancelledByUser => "CancelledByUser",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationDetails {
    pub reason: CancellationReason,
    pub error_code: Option<String>,
    pub error_details: Option<String>,
}

impl CancellationDetails {
    pub fn error(error_code: Option<String>, error_details: impl Into<String>) -> Self {
        Self {
            reason: CancellationReason::Error,
            error_code,
            error_details: Some(error_details.into()),
        }
    }
}

/// Terminal outcome of one synthesis attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisResult {
    Completed(Vec<u8>),
    Canceled(CancellationDetails),
    /// Reason the provider reported that we do not recognize, kept raw.
    Unknown(String),
}

/// Anything that can turn SSML into audio.
pub trait SpeechProvider: Send + Sync {
    /// Format the provider was configured with.
    fn output_format(&self) -> OutputFormat;

    /// Synthesize SSML, blocking until the provider reaches a terminal result.
    fn speak_ssml(&self, ssml: &str) -> SynthesisResult;
}

/// Azure Speech text-to-speech over the REST API, audio kept in memory.
pub struct AzureSpeechSynthesizer {
    endpoint: String,
    key: String,
    format: OutputFormat,
    client: Client,
}

impl AzureSpeechSynthesizer {
    const USER_AGENT: &'static str = concat!("speech-synth-rs/", env!("CARGO_PKG_VERSION"));

    pub fn new(config: &AzureConfig) -> Self {
        let endpoint = config.endpoint_url();
        debug!("Azure speech endpoint: {endpoint}");
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            endpoint,
            key: config.key.clone(),
            format: OutputFormat::Riff48Khz16BitMonoPcm,
            client,
        }
    }
}

impl SpeechProvider for AzureSpeechSynthesizer {
    fn output_format(&self) -> OutputFormat {
        self.format
    }

    fn speak_ssml(&self, ssml: &str) -> SynthesisResult {
        debug!("POST {} ({} bytes of SSML)", self.endpoint, ssml.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", self.format.header_value())
            .header("User-Agent", Self::USER_AGENT)
            .body(ssml.to_string())
            .send();

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                let code = if e.is_timeout() {
                    "ServiceTimeout"
                } else if e.is_connect() {
                    "ConnectionFailure"
                } else {
                    "RuntimeError"
                };
                return SynthesisResult::Canceled(CancellationDetails::error(
                    Some(code.into()),
                    e.to_string(),
                ));
            }
        };

        let status = response.status();
        match response.bytes() {
            Ok(body) => interpret_response(status, &body),
            Err(e) => SynthesisResult::Canceled(CancellationDetails::error(
                Some(status.as_u16().to_string()),
                format!("Failed to read audio stream: {e}"),
            )),
        }
    }
}

/// Map an HTTP response from the synthesis endpoint to a terminal result.
pub fn interpret_response(status: StatusCode, body: &[u8]) -> SynthesisResult {
    if status.is_success() {
        return SynthesisResult::Completed(body.to_vec());
    }

    if status.is_client_error() || status.is_server_error() {
        let text = String::from_utf8_lossy(body).trim().to_string();
        let details = if text.is_empty() {
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string()
        } else {
            text
        };
        return SynthesisResult::Canceled(CancellationDetails::error(
            Some(status.as_u16().to_string()),
            details,
        ));
    }

    SynthesisResult::Unknown(status.as_u16().to_string())
}
