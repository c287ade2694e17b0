//! speech-synth: text-to-speech through Azure Speech SSML synthesis, with a
//! legacy HTTP endpoint as an independent fallback.
//!
//! Components:
//! - `ssml`: XML escaping and SSML document construction
//! - `provider`: provider capability + Azure Speech REST synthesizer
//! - `synthesis`: runs SSML through a provider and classifies the result
//! - `service`: text + speaker → audio bytes or `None`
//! - `legacy`: retrying GET against the legacy TTS endpoint
//! - `audio`: WAV header inspection
//! - `config`: YAML configuration

pub mod audio;
pub mod config;
pub mod legacy;
pub mod provider;
pub mod service;
pub mod ssml;
pub mod synthesis;
