//! One-shot conversion of a raw recordings tree into flat mono WAV samples.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::audio::{decoder, encoder};
use crate::dataset::is_wav;
use crate::error::NormalizeError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    /// Output files, in traversal order
    pub written: Vec<PathBuf>,
    /// How many inputs had more than one channel
    pub downmixed: usize,
}

/// Rewrite every WAV file under `source` as mono into `destination`, keeping
/// its file name and sample rate.
///
/// Every run reprocesses the whole tree and overwrites existing outputs.
/// The first failure aborts the run.
pub fn normalize_tree(source: &Path, destination: &Path) -> Result<NormalizeSummary, NormalizeError> {
    if !source.is_dir() {
        return Err(NormalizeError::MissingSource(source.to_path_buf()));
    }
    std::fs::create_dir_all(destination).map_err(|source| NormalizeError::Io {
        path: destination.to_path_buf(),
        source,
    })?;

    let mut summary = NormalizeSummary::default();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(source).to_path_buf();
            NormalizeError::Io {
                path,
                source: err.into(),
            }
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_wav(path) {
            continue;
        }
        let (output, channels) = normalize_file(path, destination)?;
        if channels > 1 {
            summary.downmixed += 1;
        }
        summary.written.push(output);
    }

    info!(
        source = %source.display(),
        destination = %destination.display(),
        files = summary.written.len(),
        downmixed = summary.downmixed,
        "normalized recordings"
    );
    Ok(summary)
}

/// Downmix one file into `destination`; returns the output path and source channel count.
pub fn normalize_file(path: &Path, destination: &Path) -> Result<(PathBuf, u16), NormalizeError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| NormalizeError::MissingSource(path.to_path_buf()))?;
    let output = destination.join(file_name);

    let decoded = decoder::decode_audio(path)?;
    encoder::encode_wav(&decoded.clip, &output, decoded.source_format)?;
    debug!(
        input = %path.display(),
        output = %output.display(),
        channels = decoded.source_channels,
        "wrote mono copy"
    );
    Ok((output, decoded.source_channels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_is_fatal() {
        let dest = tempfile::tempdir().unwrap();
        let err = normalize_tree(Path::new("/no/such/tree"), dest.path()).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingSource(_)));
    }

    #[test]
    fn undecodable_file_aborts_run() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("03-01-01-01-01-01-01.wav"), b"junk").unwrap();
        let err = normalize_tree(src.path(), dest.path()).unwrap_err();
        assert!(matches!(err, NormalizeError::Audio(_)));
    }
}
