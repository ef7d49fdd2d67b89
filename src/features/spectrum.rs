use aus::analysis;
use aus::analysis::mel::MelFilterbank;
use aus::spectrum;
use aus::WindowType;
use ndarray::Array2;

use crate::config::FeatureConfig;
use crate::error::ExtractionError;

/// Frame-major STFT outputs (`[frame][bin]`).
pub(crate) struct Spectrograms {
    pub magnitude: Vec<Vec<f64>>,
    pub power: Vec<Vec<f64>>,
}

impl Spectrograms {
    pub fn frame_count(&self) -> usize {
        self.magnitude.len()
    }
}

/// Hann-windowed STFT of `samples` with centered framing.
///
/// Frame `t` is centered on sample `t * hop_length`, with `n_fft / 2` zeros of
/// padding before the signal. The buffer is cut so every frame is a full
/// window, giving exactly `1 + len / hop_length` frames.
pub(crate) fn compute_spectrograms(
    samples: &[f32],
    n_fft: usize,
    hop_length: usize,
) -> Result<Spectrograms, ExtractionError> {
    if samples.is_empty() {
        return Err(ExtractionError::EmptyAudio);
    }
    if n_fft < 2 || hop_length == 0 || hop_length > n_fft {
        return Err(ExtractionError::InvalidParameter(format!(
            "hop length {hop_length} must be between 1 and n_fft {n_fft}"
        )));
    }
    let pad = n_fft / 2;
    let framed_len = (samples.len() / hop_length) * hop_length + n_fft;
    let mut padded = vec![0.0_f64; framed_len];
    for (dst, &src) in padded[pad..].iter_mut().zip(samples) {
        *dst = src as f64;
    }

    let stft = spectrum::rstft(&padded, n_fft, hop_length, WindowType::Hanning);
    let (magnitude, _) = spectrum::complex_to_polar_rstft(&stft);
    if magnitude.is_empty() {
        return Err(ExtractionError::Shape(format!(
            "STFT of {} samples produced no frames",
            samples.len()
        )));
    }
    let power = analysis::make_power_spectrogram(&magnitude);

    Ok(Spectrograms { magnitude, power })
}

/// Power mel spectrogram, frame-major.
pub(crate) fn mel_spectrogram(spectra: &Spectrograms, config: &FeatureConfig) -> Vec<Vec<f64>> {
    let freqs = spectrum::rfftfreq(config.n_fft, config.sample_rate);
    let filterbank = MelFilterbank::new(
        config.mel_fmin,
        config.fmax(),
        config.n_mels,
        &freqs,
        true,
    );
    analysis::mel::make_mel_spectrogram(&spectra.power, &filterbank)
}

/// MFCCs of a power mel spectrogram; silent bands are floored before the log.
pub(crate) fn mfcc(mel: &[Vec<f64>], n_mfcc: usize) -> Vec<Vec<f64>> {
    const AMIN: f64 = 1e-10;
    let floored: Vec<Vec<f64>> = mel
        .iter()
        .map(|frame| frame.iter().map(|&v| v.max(AMIN)).collect())
        .collect();
    analysis::mel::mfcc_spectrogram(&floored, n_mfcc, None)
}

/// Convert `[frame][coefficient]` rows into a `coefficients x frames` matrix.
pub(crate) fn coefficient_matrix(frames: &[Vec<f64>]) -> Result<Array2<f32>, ExtractionError> {
    let Some(first) = frames.first() else {
        return Ok(Array2::zeros((0, 0)));
    };
    let coefficients = first.len();
    if let Some(bad) = frames.iter().position(|frame| frame.len() != coefficients) {
        return Err(ExtractionError::Shape(format!(
            "frame {} has {} coefficients, expected {}",
            bad,
            frames[bad].len(),
            coefficients
        )));
    }
    Ok(Array2::from_shape_fn(
        (coefficients, frames.len()),
        |(row, col)| frames[col][row] as f32,
    ))
}

/// Center frequency in Hz of every STFT bin.
pub(crate) fn bin_frequencies(n_fft: usize, sample_rate: u32) -> Vec<f64> {
    (0..=n_fft / 2)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect()
}

/// Magnitude to decibels relative to the loudest bin, floored at `-top_db`.
pub fn amplitude_to_db(magnitude: &[Vec<f64>], top_db: f64) -> Vec<Vec<f64>> {
    const AMIN: f64 = 1e-5;
    let reference = magnitude
        .iter()
        .flatten()
        .copied()
        .fold(AMIN, f64::max);
    let ref_db = 20.0 * reference.log10();
    magnitude
        .iter()
        .map(|frame| {
            frame
                .iter()
                .map(|&m| (20.0 * m.max(AMIN).log10() - ref_db).max(-top_db))
                .collect()
        })
        .collect()
}
