//! Configuration management for speech-synth-rs.
//!
//! Loads config from YAML files in standard locations. Every section has
//! defaults so a partial (or missing) file still yields a usable config.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub key: String,
    pub region: String,
    /// Overrides the region-derived REST endpoint.
    pub endpoint: Option<String>,
}

impl AzureConfig {
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!(
                "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
                self.region
            ),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.key.is_empty() && (!self.region.is_empty() || self.endpoint.is_some())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// URL template; `{text}` and `{anchor_type}` are replaced with
    /// percent-encoded values.
    pub url: String,
    pub headers: HashMap<String, String>,
}

impl LegacyConfig {
    pub fn tts_url(&self, text: &str, anchor_type: &str) -> String {
        self.url
            .replace("{text}", &urlencoding::encode(text))
            .replace("{anchor_type}", &urlencoding::encode(anchor_type))
    }

    pub fn tts_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        headers.sort();
        headers
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub azure: AzureConfig,
    /// Speaker name → Azure voice id.
    pub voices: HashMap<String, String>,
    pub prosody_rate: Option<String>,
    pub voice_temperature: f64,
    pub legacy: LegacyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            azure: AzureConfig::default(),
            voices: HashMap::new(),
            prosody_rate: None,
            voice_temperature: 1.0,
            legacy: LegacyConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yml::Error,
    },
}

impl Config {
    /// Candidate config files, in lookup order.
    fn search_paths() -> Vec<PathBuf> {
        [
            std::env::current_dir().ok().map(|d| d.join("config.yaml")),
            dirs::home_dir().map(|h| h.join(".config/speech-synth/config.yaml")),
            Some(PathBuf::from("/etc/speech-synth/config.yaml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or the first existing file from the search paths
    /// (./config.yaml, ~/.config/speech-synth/config.yaml,
    /// /etc/speech-synth/config.yaml). Any failure falls back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::search_paths().into_iter().find(|p| p.exists()),
        };

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match Self::from_file(&config_path) {
            Ok(config) => {
                info!("Loaded config from {}", config_path.display());
                config
            }
            Err(e) => {
                warn!("{e}, using defaults");
                Self::default()
            }
        }
    }
}
