use std::path::{Path, PathBuf};

use anyhow::{anyhow, ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

pub const DEFAULT_SAMPLES_DIR: &str = "data/samples";
pub const DEFAULT_RAW_DIR: &str = "data/Audio_Speech_Actors_01-24";

/// Where recordings are read from and written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepConfig {
    /// Normalized mono recordings consumed by feature extraction
    pub samples_dir: PathBuf,
    /// Raw recordings tree consumed by the batch normalizer
    pub raw_dir: PathBuf,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            samples_dir: PathBuf::from(DEFAULT_SAMPLES_DIR),
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
        }
    }
}

impl PrepConfig {
    pub fn from_overrides(samples_dir: Option<PathBuf>, raw_dir: Option<PathBuf>) -> Self {
        let defaults = Self::default();
        Self {
            samples_dir: samples_dir.unwrap_or(defaults.samples_dir),
            raw_dir: raw_dir.unwrap_or(defaults.raw_dir),
        }
    }

    /// Resolve the samples directory, which must already exist.
    pub fn existing_samples_dir(&self) -> Result<PathBuf> {
        canonicalize_dir(&self.samples_dir)
    }

    /// Resolve the raw recordings directory, which must already exist.
    pub fn existing_raw_dir(&self) -> Result<PathBuf> {
        canonicalize_dir(&self.raw_dir)
    }
}

fn canonicalize_dir(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve directory at {:?}", path))?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(anyhow!("path {:?} is not a directory", canonical))
    }
}

/// Spectral analysis parameters shared by every extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Clips are resampled to this rate before analysis
    pub sample_rate: u32,
    pub n_fft: usize,
    pub hop_length: usize,
    pub n_mfcc: usize,
    pub n_chroma: usize,
    pub n_mels: usize,
    pub mel_fmin: f64,
    /// Upper mel edge; Nyquist when unset
    pub mel_fmax: Option<f64>,
    /// Frame count matrices are padded to
    pub target_frames: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
            n_fft: 2048,
            hop_length: 512,
            n_mfcc: 40,
            n_chroma: 12,
            n_mels: 128,
            mel_fmin: 0.0,
            mel_fmax: None,
            target_frames: 275,
        }
    }
}

impl FeatureConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read feature config {:?}", path))?;
        let config: Self = serde_json::from_str(&raw).context("Failed to parse feature config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ExtractionError> {
        let invalid = |msg: String| Err(ExtractionError::InvalidParameter(msg));
        if self.sample_rate == 0 {
            return invalid("sample_rate must be positive".into());
        }
        if self.n_fft < 2 {
            return invalid(format!("n_fft must be at least 2, got {}", self.n_fft));
        }
        if self.hop_length == 0 || self.hop_length > self.n_fft {
            return invalid(format!(
                "hop_length {} must be between 1 and n_fft {}",
                self.hop_length, self.n_fft
            ));
        }
        if self.n_mels == 0 || self.n_chroma == 0 || self.n_mfcc == 0 {
            return invalid("coefficient counts must be positive".into());
        }
        if self.n_mfcc > self.n_mels {
            return invalid(format!(
                "n_mfcc ({}) cannot exceed n_mels ({})",
                self.n_mfcc, self.n_mels
            ));
        }
        let fmax = self.fmax();
        if !(self.mel_fmin >= 0.0 && fmax > self.mel_fmin) {
            return invalid(format!(
                "mel range {}..{} Hz is empty",
                self.mel_fmin, fmax
            ));
        }
        Ok(())
    }

    pub fn fmax(&self) -> f64 {
        self.mel_fmax.unwrap_or(self.sample_rate as f64 / 2.0)
    }

    /// Number of STFT bins per frame.
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }
}

/// Split a comma separated CLI list, ignoring blanks.
pub fn parse_list<T>(raw: &str) -> Result<Vec<T>>
where
    T: std::str::FromStr<Err = String>,
{
    let items = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().map_err(|err| anyhow!(err)))
        .collect::<Result<Vec<T>>>()?;
    ensure!(!items.is_empty(), "list '{}' contains no entries", raw);
    Ok(items)
}
