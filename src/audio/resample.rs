use rubato::{FftFixedIn, Resampler};

use crate::error::AudioError;
use crate::types::AudioClip;

const CHUNK: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// How a clip is brought to a new sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resampling {
    /// FFT resampler with an anti-aliasing low-pass; used for analysis.
    #[default]
    BandLimited,
    /// Straight-line interpolation; cheap, aliases when downsampling.
    Linear,
}

fn check_rates(source_rate: u32, target_rate: u32) -> Result<(), AudioError> {
    if source_rate == 0 || target_rate == 0 {
        return Err(AudioError::Resample(format!(
            "sample rates must be positive (got {source_rate} -> {target_rate})"
        )));
    }
    Ok(())
}

fn output_len(input_len: usize, source_rate: u32, target_rate: u32) -> usize {
    ((input_len as f64) * target_rate as f64 / source_rate as f64)
        .ceil()
        .max(1.0) as usize
}

/// Linearly resample `samples` from `source_rate` to `target_rate`.
pub fn linear_resample(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, AudioError> {
    check_rates(source_rate, target_rate)?;
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let step = source_rate as f64 / target_rate as f64;
    let last_index = samples.len() - 1;
    let output = (0..output_len(samples.len(), source_rate, target_rate))
        .map(|i| {
            let position = i as f64 * step;
            let left = (position.floor() as usize).min(last_index);
            let right = (left + 1).min(last_index);
            let t = (position - left as f64) as f32;
            samples[left] * (1.0 - t) + samples[right] * t
        })
        .collect();
    Ok(output)
}

/// Band-limited resampling through rubato's FFT resampler.
///
/// The resampler's output delay is removed and the result trimmed to
/// `ceil(len * target / source)` samples, so it lines up with the input.
pub fn bandlimited_resample(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, AudioError> {
    check_rates(source_rate, target_rate)?;
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK,
        SUB_CHUNKS,
        1,
    )
    .map_err(|err| AudioError::Resample(err.to_string()))?;
    let delay = resampler.output_delay();
    let expected = output_len(samples.len(), source_rate, target_rate);

    let mut output = Vec::with_capacity(expected + delay + CHUNK);
    let mut block = vec![0.0_f32; CHUNK];
    let mut position = 0;
    // zero blocks past the end flush the filter tail
    while output.len() < expected + delay {
        block.fill(0.0);
        if position < samples.len() {
            let end = (position + CHUNK).min(samples.len());
            block[..end - position].copy_from_slice(&samples[position..end]);
            position = end;
        }
        let frames = resampler
            .process(&[&block], None)
            .map_err(|err| AudioError::Resample(err.to_string()))?;
        output.extend_from_slice(&frames[0]);
    }

    output.drain(..delay);
    output.truncate(expected);
    Ok(output)
}

/// Return a copy of `clip` at `target_rate`.
pub fn resample_clip(
    clip: &AudioClip,
    target_rate: u32,
    method: Resampling,
) -> Result<AudioClip, AudioError> {
    let samples = match method {
        Resampling::BandLimited => {
            bandlimited_resample(&clip.samples, clip.sample_rate, target_rate)?
        }
        Resampling::Linear => linear_resample(&clip.samples, clip.sample_rate, target_rate)?,
    };
    Ok(AudioClip::new(samples, target_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    /// RMS away from the edges, where filter transients live.
    fn inner_rms(samples: &[f32]) -> f32 {
        let inner = &samples[samples.len() / 4..3 * samples.len() / 4];
        (inner.iter().map(|s| s * s).sum::<f32>() / inner.len() as f32).sqrt()
    }

    #[test]
    fn constant_signal_survives_downsampling() {
        let input = vec![0.5; 480];
        let resampled = linear_resample(&input, 48_000, 22_050).unwrap();
        let expected_len = (480.0_f64 * 22_050.0 / 48_000.0).ceil() as usize;
        assert_eq!(resampled.len(), expected_len);
        assert!(resampled.iter().all(|&sample| (sample - 0.5).abs() < 1e-6));
    }

    #[test]
    fn same_rate_is_identity() {
        let clip = AudioClip::new(vec![0.1, 0.2, 0.3], 22_050);
        assert_eq!(
            resample_clip(&clip, 22_050, Resampling::BandLimited).unwrap(),
            clip
        );
    }

    #[test]
    fn rejects_zero_rate() {
        assert!(linear_resample(&[0.0; 4], 0, 22_050).is_err());
        assert!(bandlimited_resample(&[0.0; 4], 48_000, 0).is_err());
    }

    #[test]
    fn passband_tone_keeps_length_and_level() {
        let input = sine(440.0, 48_000, 48_000);
        let output = bandlimited_resample(&input, 48_000, 22_050).unwrap();
        assert_eq!(output.len(), 22_050);
        let rms = inner_rms(&output);
        assert!((rms - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.02, "rms {rms}");
    }

    #[test]
    fn tone_above_new_nyquist_is_filtered() {
        // 15 kHz cannot exist at 22.05 kHz; linear interpolation folds it to 7.05 kHz
        let input = sine(15_000.0, 48_000, 48_000);
        let filtered = bandlimited_resample(&input, 48_000, 22_050).unwrap();
        let aliased = linear_resample(&input, 48_000, 22_050).unwrap();
        assert!(inner_rms(&filtered) < 0.05, "rms {}", inner_rms(&filtered));
        assert!(inner_rms(&aliased) > 0.2);
    }

    #[test]
    fn upsampling_is_supported() {
        let input = sine(300.0, 16_000, 16_000);
        let output = bandlimited_resample(&input, 16_000, 22_050).unwrap();
        assert_eq!(output.len(), 22_050);
        assert!((inner_rms(&output) - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.02);
    }
}
