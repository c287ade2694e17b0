//! RIFF/WAV header inspection for synthesized audio.
//!
//! Only the header is read; samples are never decoded.

use std::io::Cursor;

use hound::WavReader;

use crate::provider::OutputFormat;

#[derive(Debug, Clone, PartialEq)]
pub struct WavSummary {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Length in samples per channel.
    pub frames: u32,
}

impl WavSummary {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        f64::from(self.frames) / f64::from(self.sample_rate)
    }

    pub fn matches_output_format(&self, format: OutputFormat) -> bool {
        self.channels == format.channels()
            && self.sample_rate == format.sample_rate()
            && self.bits_per_sample == format.bits_per_sample()
    }
}

pub fn inspect_wav(bytes: &[u8]) -> Result<WavSummary, hound::Error> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    Ok(WavSummary {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        frames: reader.duration(),
    })
}
