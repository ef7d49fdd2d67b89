//! Data preparation for speech/song emotion classification: filename label
//! decoding, MFCC/chroma/mel feature extraction, dataset assembly, mono
//! normalization of raw recordings, and plotting helpers.

pub mod audio;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod labels;
pub mod normalize;
pub mod plots;
pub mod training;
pub mod types;

pub use dataset::{AssembleOptions, Dataset, DatasetAssembler, DatasetRow, TargetFilter};
pub use features::{FeatureExtractor, FeatureMatrices, FeatureSelection, FeatureSet};
pub use labels::{Emotion, FilenameLabels, Intensity, Statement, VocalChannel};
pub use types::AudioClip;
