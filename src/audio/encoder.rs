use std::path::Path;

use crate::error::AudioError;
use crate::types::{AudioClip, PcmFormat};

/// Write `clip` as a mono WAV file with the given sample encoding.
pub fn encode_wav<P: AsRef<Path>>(
    clip: &AudioClip,
    path: P,
    format: PcmFormat,
) -> Result<(), AudioError> {
    let path = path.as_ref();
    let encode_err = |source| AudioError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let (bits_per_sample, sample_format) = match format {
        PcmFormat::Int(bits @ (8 | 16 | 24 | 32)) => (bits, hound::SampleFormat::Int),
        PcmFormat::Int(bits) => {
            return Err(AudioError::unsupported(
                path,
                format!("cannot write {bits}-bit integer samples"),
            ))
        }
        PcmFormat::Float => (32, hound::SampleFormat::Float),
    };
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample,
        sample_format,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(encode_err)?;

    match sample_format {
        hound::SampleFormat::Float => {
            for &sample in &clip.samples {
                writer.write_sample(sample).map_err(encode_err)?;
            }
        }
        hound::SampleFormat::Int => {
            let full_scale = ((1_i64 << (bits_per_sample - 1)) - 1) as f64;
            for &sample in &clip.samples {
                let scaled = (sample.clamp(-1.0, 1.0) as f64 * full_scale).round() as i32;
                writer.write_sample(scaled).map_err(encode_err)?;
            }
        }
    }

    writer.finalize().map_err(encode_err)
}
