use image::RgbImage;

use super::color_for_value;
use crate::error::{ExtractionError, PlotError};
use crate::features::{amplitude_to_db, spectrum};
use crate::types::AudioClip;

const TOP_DB: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyScale {
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrogramOptions {
    pub n_fft: usize,
    pub hop_length: usize,
    pub scale: FrequencyScale,
    pub width: u32,
    pub height: u32,
}

impl Default for SpectrogramOptions {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 1024,
            scale: FrequencyScale::Linear,
            width: 640,
            height: 256,
        }
    }
}

/// Spectrogram in decibels relative to its peak, mapped to `[0, 1]` (`[frame][bin]`).
pub fn db_spectrogram(
    clip: &AudioClip,
    options: &SpectrogramOptions,
) -> Result<Vec<Vec<f64>>, ExtractionError> {
    let spectra = spectrum::compute_spectrograms(&clip.samples, options.n_fft, options.hop_length)?;
    let db = amplitude_to_db(&spectra.magnitude, TOP_DB);
    Ok(db
        .into_iter()
        .map(|frame| frame.into_iter().map(|v| (v + TOP_DB) / TOP_DB).collect())
        .collect())
}

/// Render a heatmap with time on x and frequency rising along y.
pub fn spectrogram_image(
    clip: &AudioClip,
    options: &SpectrogramOptions,
) -> Result<RgbImage, PlotError> {
    if clip.is_empty() {
        return Err(PlotError::Empty("clip has no samples".into()));
    }
    let values = db_spectrogram(clip, options)?;
    let frames = values.len();
    let bins = values.first().map_or(0, Vec::len);
    if frames == 0 || bins < 2 {
        return Err(PlotError::Empty("spectrogram has no bins".into()));
    }

    let (width, height) = (options.width.max(1), options.height.max(1));
    let mut image = RgbImage::new(width, height);
    for y in 0..height {
        // row 0 is the top of the image, i.e. the highest frequency
        let fraction = 1.0 - (y as f64 + 0.5) / height as f64;
        let bin = frequency_bin(fraction, bins, options.scale);
        for x in 0..width {
            let frame = ((x as f64 / width as f64) * frames as f64) as usize;
            let value = values[frame.min(frames - 1)][bin];
            image.put_pixel(x, y, color_for_value(value as f32));
        }
    }
    Ok(image)
}

/// Map a vertical position in `[0, 1]` to a bin index.
fn frequency_bin(fraction: f64, bins: usize, scale: FrequencyScale) -> usize {
    let top = (bins - 1) as f64;
    let bin = match scale {
        FrequencyScale::Linear => fraction * top,
        // bin 0 (DC) has no place on a log axis; start from bin 1
        FrequencyScale::Log => top.powf(fraction),
    };
    (bin.round() as usize).min(bins - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, sample_rate: u32, seconds: f32) -> AudioClip {
        let n = (sample_rate as f32 * seconds) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect();
        AudioClip::new(samples, sample_rate)
    }

    #[test]
    fn db_values_are_unit_range() {
        let values = db_spectrogram(&tone(440.0, 22_050, 0.5), &SpectrogramOptions::default())
            .unwrap();
        assert!(!values.is_empty());
        assert!(values
            .iter()
            .flatten()
            .all(|v| (0.0..=1.0 + 1e-9).contains(v)));
    }

    #[test]
    fn image_has_requested_size() {
        let options = SpectrogramOptions {
            width: 64,
            height: 32,
            scale: FrequencyScale::Log,
            ..SpectrogramOptions::default()
        };
        let image = spectrogram_image(&tone(440.0, 22_050, 0.5), &options).unwrap();
        assert_eq!(image.dimensions(), (64, 32));
    }

    #[test]
    fn log_axis_spans_all_bins() {
        assert_eq!(frequency_bin(0.0, 1025, FrequencyScale::Log), 1);
        assert_eq!(frequency_bin(1.0, 1025, FrequencyScale::Log), 1024);
        assert_eq!(frequency_bin(0.5, 1025, FrequencyScale::Linear), 512);
    }

    #[test]
    fn oversized_hop_is_an_error() {
        let options = SpectrogramOptions {
            hop_length: 5000,
            ..SpectrogramOptions::default()
        };
        assert!(matches!(
            db_spectrogram(&tone(440.0, 22_050, 1.0), &options),
            Err(ExtractionError::InvalidParameter(_))
        ));
    }

    #[test]
    fn empty_clip_cannot_be_drawn() {
        let clip = AudioClip::new(Vec::new(), 22_050);
        assert!(matches!(
            spectrogram_image(&clip, &SpectrogramOptions::default()),
            Err(PlotError::Empty(_))
        ));
    }
}
