//! Spectral descriptors of a clip: MFCC, chroma and mel spectrogram.
//!
//! Two representations are produced from one analysis pass:
//! a flattened vector of per-coefficient time averages, and fixed-width
//! matrices padded to `FeatureConfig::target_frames` and standardized per row.

mod chroma;
pub mod matrix;
pub(crate) mod spectrum;

use std::borrow::Cow;

use ndarray::{concatenate, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::resample::{self, Resampling};
use crate::config::FeatureConfig;
use crate::error::ExtractionError;
use crate::types::AudioClip;

pub use spectrum::amplitude_to_db;

pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Which descriptors to compute. Output order is always MFCC, chroma, mel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSelection {
    pub mfcc: bool,
    pub chroma: bool,
    pub mel: bool,
}

impl FeatureSelection {
    pub const ALL: Self = Self {
        mfcc: true,
        chroma: true,
        mel: true,
    };
    pub const NONE: Self = Self {
        mfcc: false,
        chroma: false,
        mel: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.mfcc || self.chroma || self.mel)
    }

    /// Length of the flattened vector for this selection.
    pub fn flat_len(&self, config: &FeatureConfig) -> usize {
        let mut len = 0;
        if self.mfcc {
            len += config.n_mfcc;
        }
        if self.chroma {
            len += config.n_chroma;
        }
        if self.mel {
            len += config.n_mels;
        }
        len
    }
}

impl Default for FeatureSelection {
    fn default() -> Self {
        Self::ALL
    }
}

/// Raw `coefficients x frames` matrices of one clip, before padding or scaling.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub frame_count: usize,
    pub mfcc: Option<Array2<f32>>,
    pub chroma: Option<Array2<f32>>,
    pub mel: Option<Array2<f32>>,
}

impl FeatureSet {
    fn selected(&self) -> impl Iterator<Item = &Array2<f32>> {
        [&self.mfcc, &self.chroma, &self.mel]
            .into_iter()
            .filter_map(Option::as_ref)
    }

    /// Flattened representation: per-coefficient mean over time, concatenated.
    pub fn flatten(&self) -> Vec<f32> {
        self.selected()
            .flat_map(|m| matrix::frame_means(m).to_vec())
            .collect()
    }

    /// Fixed-shape representation: pad to `target_frames`, standardize rows, stack.
    pub fn to_matrices(&self, target_frames: usize) -> Result<FeatureMatrices> {
        let prepare = |m: &Option<Array2<f32>>| {
            m.as_ref()
                .map(|m| matrix::standardize_rows(&matrix::pad_frames(m.clone(), target_frames)))
        };
        let mfcc = prepare(&self.mfcc);
        let chroma = prepare(&self.chroma);
        let mel = prepare(&self.mel);

        let views: Vec<ArrayView2<f32>> = [&mfcc, &chroma, &mel]
            .into_iter()
            .filter_map(|m| m.as_ref().map(|m| m.view()))
            .collect();
        if views.is_empty() {
            return Err(ExtractionError::EmptySelection);
        }
        let combined = concatenate(Axis(0), &views)?;

        Ok(FeatureMatrices {
            mfcc,
            chroma,
            mel,
            combined,
        })
    }
}

/// Padded and standardized matrices, individually and stacked along the coefficient axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrices {
    pub mfcc: Option<Array2<f32>>,
    pub chroma: Option<Array2<f32>>,
    pub mel: Option<Array2<f32>>,
    pub combined: Array2<f32>,
}

/// Computes descriptors with a fixed analysis configuration.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    chroma_filters: Array2<f64>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        let config = FeatureConfig::default();
        let chroma_filters =
            chroma::chroma_filterbank(config.n_fft, config.sample_rate, config.n_chroma);
        Self {
            config,
            chroma_filters,
        }
    }
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Result<Self> {
        config.validate()?;
        let chroma_filters =
            chroma::chroma_filterbank(config.n_fft, config.sample_rate, config.n_chroma);
        Ok(Self {
            config,
            chroma_filters,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Run the STFT once and derive every selected descriptor from it.
    pub fn analyze(&self, clip: &AudioClip, selection: FeatureSelection) -> Result<FeatureSet> {
        let clip = self.prepare(clip)?;
        let spectra =
            spectrum::compute_spectrograms(&clip.samples, self.config.n_fft, self.config.hop_length)?;
        let frame_count = spectra.frame_count();

        let mel_frames = (selection.mel || selection.mfcc)
            .then(|| spectrum::mel_spectrogram(&spectra, &self.config));

        let mfcc = match (&mel_frames, selection.mfcc) {
            (Some(mel), true) => Some(spectrum::coefficient_matrix(&spectrum::mfcc(
                mel,
                self.config.n_mfcc,
            ))?),
            _ => None,
        };
        let chroma = selection
            .chroma
            .then(|| chroma::chromagram(&spectra.magnitude, &self.chroma_filters));
        let mel = match (&mel_frames, selection.mel) {
            (Some(mel), true) => Some(spectrum::coefficient_matrix(mel)?),
            _ => None,
        };

        debug!(
            frames = frame_count,
            mfcc = selection.mfcc,
            chroma = selection.chroma,
            mel = selection.mel,
            "analyzed clip"
        );

        Ok(FeatureSet {
            frame_count,
            mfcc,
            chroma,
            mel,
        })
    }

    /// Flattened vector of length `selection.flat_len(config)`.
    pub fn extract_flat(&self, clip: &AudioClip, selection: FeatureSelection) -> Result<Vec<f32>> {
        if selection.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.analyze(clip, selection)?.flatten())
    }

    /// Padded, standardized matrices with at least `target_frames` frames.
    pub fn extract_matrix(
        &self,
        clip: &AudioClip,
        selection: FeatureSelection,
    ) -> Result<FeatureMatrices> {
        if selection.is_empty() {
            return Err(ExtractionError::EmptySelection);
        }
        self.analyze(clip, selection)?
            .to_matrices(self.config.target_frames)
    }

    /// Validate the clip and bring it to the analysis sample rate.
    fn prepare<'a>(&self, clip: &'a AudioClip) -> Result<Cow<'a, AudioClip>> {
        if clip.is_empty() {
            return Err(ExtractionError::EmptyAudio);
        }
        if clip.sample_rate == 0 {
            return Err(ExtractionError::ZeroSampleRate);
        }
        if let Some(index) = clip.samples.iter().position(|s| !s.is_finite()) {
            return Err(ExtractionError::NonFiniteSample(index));
        }
        if clip.sample_rate == self.config.sample_rate {
            return Ok(Cow::Borrowed(clip));
        }
        resample::resample_clip(clip, self.config.sample_rate, Resampling::BandLimited)
            .map(Cow::Owned)
            .map_err(|err| ExtractionError::InvalidParameter(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn set(frames: usize) -> FeatureSet {
        FeatureSet {
            frame_count: frames,
            mfcc: Some(Array2::from_shape_fn((3, frames), |(r, c)| (r + c) as f32)),
            chroma: None,
            mel: Some(Array2::from_shape_fn((2, frames), |(r, c)| (r * c) as f32)),
        }
    }

    #[test]
    fn flat_len_counts_enabled_types() {
        let config = FeatureConfig::default();
        assert_eq!(FeatureSelection::ALL.flat_len(&config), 180);
        assert_eq!(FeatureSelection::NONE.flat_len(&config), 0);
        let chroma_only = FeatureSelection {
            mfcc: false,
            chroma: true,
            mel: false,
        };
        assert_eq!(chroma_only.flat_len(&config), 12);
    }

    #[test]
    fn flatten_keeps_type_order() {
        let features = FeatureSet {
            frame_count: 2,
            mfcc: Some(array![[1.0, 3.0]]),
            chroma: Some(array![[0.0, 1.0]]),
            mel: Some(array![[4.0, 4.0]]),
        };
        assert_eq!(features.flatten(), vec![2.0, 0.5, 4.0]);
    }

    #[test]
    fn matrices_stack_selected_rows() {
        let matrices = set(10).to_matrices(275).unwrap();
        assert_eq!(matrices.combined.dim(), (5, 275));
        assert!(matrices.chroma.is_none());
        assert_eq!(matrices.mfcc.as_ref().unwrap().dim(), (3, 275));
    }

    #[test]
    fn empty_set_has_no_matrix() {
        let features = FeatureSet {
            frame_count: 0,
            mfcc: None,
            chroma: None,
            mel: None,
        };
        assert_eq!(
            features.to_matrices(275).unwrap_err(),
            ExtractionError::EmptySelection
        );
    }

    #[test]
    fn rejects_bad_clips() {
        let extractor = FeatureExtractor::default();
        let empty = AudioClip::new(Vec::new(), 22_050);
        assert_eq!(
            extractor.analyze(&empty, FeatureSelection::ALL).unwrap_err(),
            ExtractionError::EmptyAudio
        );
        let nan = AudioClip::new(vec![0.0, f32::NAN], 22_050);
        assert_eq!(
            extractor.analyze(&nan, FeatureSelection::ALL).unwrap_err(),
            ExtractionError::NonFiniteSample(1)
        );
        let no_rate = AudioClip::new(vec![0.0; 10], 0);
        assert_eq!(
            extractor.analyze(&no_rate, FeatureSelection::ALL).unwrap_err(),
            ExtractionError::ZeroSampleRate
        );
    }
}
