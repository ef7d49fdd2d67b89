//! Error types for the `emoprep` crate.

use std::path::PathBuf;

use thiserror::Error;

/// A filename that does not follow the labeling convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    /// The file stem did not split into the seven dash-separated segments.
    #[error("expected 7 dash-separated segments in '{name}', found {found}")]
    SegmentCount {
        /// The offending file stem.
        name: String,
        /// Number of segments actually present.
        found: usize,
    },

    /// A segment value has no entry in its lookup table.
    #[error("unknown {field} code '{code}' in '{name}'")]
    UnknownCode {
        /// Which labeled field failed.
        field: &'static str,
        /// The raw segment value.
        code: String,
        /// The offending file stem.
        name: String,
    },

    /// A literal segment (modality, repetition, actor) was empty.
    #[error("empty {field} segment in '{name}'")]
    EmptySegment {
        field: &'static str,
        name: String,
    },

    /// The path has no UTF-8 file name.
    #[error("path has no readable file name: {0:?}")]
    InvalidName(PathBuf),
}

/// Failure to turn a clip into features.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    /// The clip contains no samples.
    #[error("audio clip is empty")]
    EmptyAudio,

    /// The clip contains NaN or infinite samples.
    #[error("audio clip contains a non-finite sample at index {0}")]
    NonFiniteSample(usize),

    /// The clip declares a zero sample rate.
    #[error("audio clip has a zero sample rate")]
    ZeroSampleRate,

    /// An analysis parameter is out of range.
    #[error("invalid analysis parameter: {0}")]
    InvalidParameter(String),

    /// Matrix mode was requested with no feature type enabled.
    #[error("no feature type selected")]
    EmptySelection,

    /// Array construction or concatenation failed.
    #[error("feature shape error: {0}")]
    Shape(String),
}

impl From<ndarray::ShapeError> for ExtractionError {
    fn from(error: ndarray::ShapeError) -> Self {
        Self::Shape(error.to_string())
    }
}

/// Failure while reading or writing audio containers.
#[derive(Debug, Error)]
pub enum AudioError {
    /// I/O error on the given path.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The container could not be probed or has no decodable track.
    #[error("unsupported audio in {path}: {reason}")]
    Unsupported { path: PathBuf, reason: String },

    /// The codec reported an error while decoding packets.
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: symphonia::core::errors::Error,
    },

    /// The WAV writer failed.
    #[error("failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        source: hound::Error,
    },

    /// Resampling parameters were rejected.
    #[error("cannot resample: {0}")]
    Resample(String),
}

impl AudioError {
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported<P: Into<PathBuf>>(path: P, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Fatal failure of the batch normalization pass.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The source tree does not exist or is not a directory.
    #[error("source directory not found: {0:?}")]
    MissingSource(PathBuf),

    /// Directory traversal or creation failed.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file could not be decoded or re-encoded.
    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Failure while rendering a plot.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Nothing to draw.
    #[error("nothing to plot: {0}")]
    Empty(String),

    /// Spectral analysis of the clip failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A tile did not fit the composed image.
    #[error("plot layout error: {0}")]
    Layout(String),

    /// Image encoding or file creation failed.
    #[error("failed to write image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Why a single recording was left out of a dataset.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
