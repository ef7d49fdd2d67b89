//! Core types shared by the decode, extraction and dataset stages

use std::time::Duration;

use serde::Serialize;

/// Decoded mono waveform (f32 samples in [-1.0, 1.0])
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 22050)
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback length; zero when the sample rate is unknown.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Sample encoding of a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmFormat {
    /// Signed integer samples of the given width (8, 16, 24 or 32 bits)
    Int(u16),
    /// 32-bit IEEE float samples
    Float,
}

impl Default for PcmFormat {
    fn default() -> Self {
        PcmFormat::Int(16)
    }
}

/// Result of decoding a container file
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Downmixed audio at the file's native sample rate
    pub clip: AudioClip,
    /// Channel count of the source stream before downmixing
    pub source_channels: u16,
    /// Sample width of the source; 16-bit for compressed formats
    pub source_format: PcmFormat,
}

#[cfg(test)]
mod tests {
    use super::AudioClip;

    #[test]
    fn duration_follows_sample_rate() {
        let clip = AudioClip::new(vec![0.0; 22_050], 22_050);
        assert_eq!(clip.duration().as_secs_f64(), 1.0);
        assert_eq!(clip.len(), 22_050);
    }

    #[test]
    fn zero_rate_has_no_duration() {
        let clip = AudioClip::new(vec![0.0; 10], 0);
        assert!(clip.duration().is_zero());
    }
}
