use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{
    CodecParameters, DecoderOptions, CODEC_TYPE_NULL, CODEC_TYPE_PCM_F32BE, CODEC_TYPE_PCM_F32LE,
    CODEC_TYPE_PCM_F64BE, CODEC_TYPE_PCM_F64LE,
};
use symphonia::core::conv::IntoSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::{Sample, SampleFormat};
use tracing::debug;

use crate::audio::resample::{self, Resampling};
use crate::error::AudioError;
use crate::types::{AudioClip, DecodedAudio, PcmFormat};

/// Decode an audio file to mono f32 at its native sample rate.
///
/// The file handle lives only for the duration of this call.
pub fn decode_audio<P: AsRef<Path>>(path: P) -> Result<DecodedAudio, AudioError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|err| AudioError::io(path, err))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probe_result = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| AudioError::unsupported(path, err.to_string()))?;
    let mut format = probe_result.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::unsupported(path, "no audio tracks found"))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::unsupported(path, "sample rate not specified"))?;
    let mut source_channels = track
        .codec_params
        .channels
        .map(|channels| channels.count() as u16);
    let source_format = pcm_format(&track.codec_params);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|err| AudioError::unsupported(path, err.to_string()))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(source) => {
                return Err(AudioError::Decode {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map_err(|source| AudioError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        if source_channels.is_none() {
            source_channels = Some(decoded.spec().channels.count() as u16);
        }
        samples.extend(downmix_buffer(&decoded));
    }

    debug!(
        path = %path.display(),
        samples = samples.len(),
        sample_rate,
        "decoded audio"
    );

    Ok(DecodedAudio {
        clip: AudioClip::new(samples, sample_rate),
        source_channels: source_channels.unwrap_or(1),
        source_format,
    })
}

fn pcm_format(params: &CodecParameters) -> PcmFormat {
    let float_codecs = [
        CODEC_TYPE_PCM_F32LE,
        CODEC_TYPE_PCM_F32BE,
        CODEC_TYPE_PCM_F64LE,
        CODEC_TYPE_PCM_F64BE,
    ];
    if float_codecs.contains(&params.codec)
        || matches!(
            params.sample_format,
            Some(SampleFormat::F32 | SampleFormat::F64)
        )
    {
        return PcmFormat::Float;
    }
    match params.bits_per_sample {
        Some(bits @ (8 | 16 | 24 | 32)) => PcmFormat::Int(bits as u16),
        _ => PcmFormat::default(),
    }
}

/// Decode a file and bring it to `target_rate` with the given resampler.
pub fn load_clip<P: AsRef<Path>>(
    path: P,
    target_rate: u32,
    method: Resampling,
) -> Result<AudioClip, AudioError> {
    let decoded = decode_audio(path)?;
    resample::resample_clip(&decoded.clip, target_rate, method)
}

fn downmix_buffer(buffer: &AudioBufferRef) -> Vec<f32> {
    match buffer {
        AudioBufferRef::U8(buf) => downmix(&**buf),
        AudioBufferRef::U16(buf) => downmix(&**buf),
        AudioBufferRef::U24(buf) => downmix(&**buf),
        AudioBufferRef::U32(buf) => downmix(&**buf),
        AudioBufferRef::S8(buf) => downmix(&**buf),
        AudioBufferRef::S16(buf) => downmix(&**buf),
        AudioBufferRef::S24(buf) => downmix(&**buf),
        AudioBufferRef::S32(buf) => downmix(&**buf),
        AudioBufferRef::F32(buf) => downmix(&**buf),
        AudioBufferRef::F64(buf) => downmix(&**buf),
    }
}

/// Average all channels into one, converting to f32 in [-1.0, 1.0].
fn downmix<S>(buf: &AudioBuffer<S>) -> Vec<f32>
where
    S: Sample + IntoSample<f32>,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    if channels == 1 {
        return buf.chan(0).iter().map(|&s| s.into_sample()).collect();
    }

    let scale = 1.0 / channels as f32;
    let mut mono = vec![0.0_f32; frames];
    for ch in 0..channels {
        for (acc, &s) in mono.iter_mut().zip(buf.chan(ch)) {
            let value: f32 = s.into_sample();
            *acc += value;
        }
    }
    mono.iter_mut().for_each(|v| *v *= scale);
    mono
}
