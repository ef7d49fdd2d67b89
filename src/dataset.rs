//! Assembly of a labeled feature table from a directory of recordings.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audio::decoder;
use crate::audio::resample::Resampling;
use crate::error::{AudioError, RecordError};
use crate::features::{FeatureExtractor, FeatureSelection};
use crate::labels::{Emotion, FilenameLabels, VocalChannel};

/// Which recordings to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFilter {
    pub emotions: HashSet<Emotion>,
    pub actors: HashSet<String>,
    pub channels: HashSet<VocalChannel>,
}

impl TargetFilter {
    /// Keep the given emotions and actors, both vocal channels.
    pub fn new<E, A, S>(emotions: E, actors: A) -> Self
    where
        E: IntoIterator<Item = Emotion>,
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emotions: emotions.into_iter().collect(),
            actors: actors.into_iter().map(Into::into).collect(),
            channels: VocalChannel::ALL.into_iter().collect(),
        }
    }

    pub fn with_channels<C: IntoIterator<Item = VocalChannel>>(mut self, channels: C) -> Self {
        self.channels = channels.into_iter().collect();
        self
    }

    /// Channel, then emotion, then actor must all be targeted.
    pub fn accepts(&self, labels: &FilenameLabels) -> bool {
        self.channels.contains(&labels.channel)
            && self.emotions.contains(&labels.emotion)
            && self.actors.contains(&labels.actor)
    }
}

/// What each row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    pub selection: FeatureSelection,
    /// Per-coefficient mean vector
    pub flat: bool,
    /// Padded, standardized matrices
    pub matrix: bool,
    /// Retain the decoded waveform in each row
    pub keep_wave: bool,
    /// Process files on the rayon pool; row order is unchanged
    pub parallel: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            selection: FeatureSelection::ALL,
            flat: true,
            matrix: false,
            keep_wave: false,
            parallel: false,
        }
    }
}

impl AssembleOptions {
    /// Column names of rows built with these options.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<&str> = vec![
            "file_name",
            "modality",
            "channel",
            "emotion",
            "intensity",
            "statement",
            "repetition",
            "actor",
            "duration",
            "sample_rate",
        ];
        if self.flat {
            columns.push("flat_feature");
        }
        if self.matrix {
            let selection = self.selection;
            if selection.mfcc {
                columns.push("mfccs");
            }
            if selection.chroma {
                columns.push("chroma");
            }
            if selection.mel {
                columns.push("melspec");
            }
            columns.push("feature_array");
        }
        if self.keep_wave {
            columns.push("wave");
        }
        columns.into_iter().map(String::from).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetRow {
    /// File stem
    pub file_name: String,
    #[serde(flatten)]
    pub labels: FilenameLabels,
    /// Seconds
    pub duration: f64,
    pub sample_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat_feature: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfccs: Option<Array2<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chroma: Option<Array2<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melspec: Option<Array2<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_array: Option<Array2<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Write-once table of extracted recordings.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<DatasetRow>,
    /// Files that matched the naming pattern poorly or failed to decode/extract
    pub skipped: Vec<SkippedFile>,
}

impl Dataset {
    pub fn empty(options: &AssembleOptions) -> Self {
        Self {
            columns: options.columns(),
            rows: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose labels match the given emotions and channels, in table order.
    pub fn subset<'a>(
        &'a self,
        emotions: &'a [Emotion],
        channels: &'a [VocalChannel],
    ) -> impl Iterator<Item = &'a DatasetRow> + 'a {
        self.rows.iter().filter(move |row| {
            emotions.contains(&row.labels.emotion) && channels.contains(&row.labels.channel)
        })
    }

    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        let file = File::create(path)
            .with_context(|| format!("Failed to create dataset file {:?}", path))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write dataset to {:?}", path))?;
        Ok(())
    }
}

/// List `.wav` files directly inside `dir`, sorted by file name.
pub fn list_recordings(dir: &Path) -> Result<Vec<PathBuf>, AudioError> {
    let entries = std::fs::read_dir(dir).map_err(|err| AudioError::io(dir, err))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| AudioError::io(dir, err))?.path();
        if path.is_file() && is_wav(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub(crate) fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// Builds datasets with one extractor and one set of options.
#[derive(Debug, Clone, Default)]
pub struct DatasetAssembler {
    extractor: FeatureExtractor,
    options: AssembleOptions,
}

impl DatasetAssembler {
    pub fn new(extractor: FeatureExtractor, options: AssembleOptions) -> Self {
        Self { extractor, options }
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Decode, filter and extract every recording in `dir`.
    ///
    /// Only a missing or unreadable directory is an error; individual files that
    /// fail are listed in `Dataset::skipped`.
    pub fn assemble(&self, dir: &Path, filter: &TargetFilter) -> Result<Dataset, AudioError> {
        let files = list_recordings(dir)?;
        info!(dir = %dir.display(), files = files.len(), "assembling dataset");

        let outcomes: Vec<Option<Result<DatasetRow, SkippedFile>>> = if self.options.parallel {
            files
                .par_iter()
                .map(|path| self.visit(path, filter))
                .collect()
        } else {
            files.iter().map(|path| self.visit(path, filter)).collect()
        };

        let mut dataset = Dataset::empty(&self.options);
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                Ok(row) => dataset.rows.push(row),
                Err(skipped) => dataset.skipped.push(skipped),
            }
        }
        info!(
            rows = dataset.rows.len(),
            skipped = dataset.skipped.len(),
            "dataset assembled"
        );
        Ok(dataset)
    }

    /// `None` when the file is filtered out.
    fn visit(&self, path: &Path, filter: &TargetFilter) -> Option<Result<DatasetRow, SkippedFile>> {
        let labels = match FilenameLabels::from_path(path) {
            Ok(labels) => labels,
            Err(err) => return Some(Err(skip(path, err.into()))),
        };
        if !filter.accepts(&labels) {
            debug!(path = %path.display(), "filtered out");
            return None;
        }
        Some(self.build_row(path, labels).map_err(|err| skip(path, err)))
    }

    /// Decode and extract one recording; the waveform is dropped on return
    /// unless it is retained in the row.
    pub fn build_row(&self, path: &Path, labels: FilenameLabels) -> Result<DatasetRow, RecordError> {
        let clip = decoder::load_clip(
            path,
            self.extractor.config().sample_rate,
            Resampling::BandLimited,
        )?;
        let features = self.extractor.analyze(&clip, self.options.selection)?;

        let flat_feature = self.options.flat.then(|| features.flatten());
        let matrices = if self.options.matrix {
            Some(features.to_matrices(self.extractor.config().target_frames)?)
        } else {
            None
        };
        let file_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();

        let (mfccs, chroma, melspec, feature_array) = match matrices {
            Some(m) => (m.mfcc, m.chroma, m.mel, Some(m.combined)),
            None => (None, None, None, None),
        };

        Ok(DatasetRow {
            file_name,
            labels,
            duration: clip.duration().as_secs_f64(),
            sample_rate: clip.sample_rate,
            flat_feature,
            mfccs,
            chroma,
            melspec,
            feature_array,
            wave: self.options.keep_wave.then_some(clip.samples),
        })
    }
}

fn skip(path: &Path, err: RecordError) -> SkippedFile {
    warn!(path = %path.display(), error = %err, "skipping recording");
    SkippedFile {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(name: &str) -> FilenameLabels {
        FilenameLabels::parse(name).unwrap()
    }

    #[test]
    fn filter_requires_all_three_targets() {
        let filter = TargetFilter::new([Emotion::Happy], ["01"]);
        assert!(filter.accepts(&labels("03-01-03-01-01-01-01")));
        assert!(filter.accepts(&labels("03-02-03-01-01-01-01")));
        assert!(!filter.accepts(&labels("03-01-04-01-01-01-01")));
        assert!(!filter.accepts(&labels("03-01-03-01-01-01-02")));

        let speech_only = filter.with_channels([VocalChannel::Speech]);
        assert!(!speech_only.accepts(&labels("03-02-03-01-01-01-01")));
    }

    #[test]
    fn columns_follow_options() {
        let options = AssembleOptions {
            matrix: true,
            keep_wave: true,
            ..AssembleOptions::default()
        };
        let columns = options.columns();
        assert!(columns.contains(&"flat_feature".to_string()));
        assert!(columns.contains(&"feature_array".to_string()));
        assert_eq!(columns.last().map(String::as_str), Some("wave"));

        let flat_only = AssembleOptions::default().columns();
        assert!(!flat_only.contains(&"feature_array".to_string()));
        assert!(flat_only.contains(&"emotion".to_string()));
    }

    #[test]
    fn wav_extension_is_case_insensitive() {
        assert!(is_wav(Path::new("a/03-01-01-01-01-01-01.WAV")));
        assert!(!is_wav(Path::new("a/notes.txt")));
        assert!(!is_wav(Path::new("a/wav")));
    }
}
