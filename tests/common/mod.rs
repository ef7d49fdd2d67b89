#![allow(dead_code)]

use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

pub const SAMPLE_RATE: u32 = 22_050;

/// Sum of two partials so every band carries some energy.
pub fn tone(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
    let n = (sample_rate as f32 * seconds) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.5 * (2.0 * PI * freq * t).sin() + 0.2 * (2.0 * PI * freq * 3.0 * t).sin()
        })
        .collect()
}

/// Write `samples` as 16-bit PCM, duplicating them into every channel.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) -> PathBuf {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("create wav");
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(value).expect("write sample");
        }
    }
    writer.finalize().expect("finalize wav");
    path.to_path_buf()
}

/// `03-<channel>-<emotion>-01-01-01-<actor>.wav` holding a short tone.
pub fn write_recording(dir: &Path, channel: &str, emotion: &str, actor: &str) -> PathBuf {
    let name = format!("03-{channel}-{emotion}-01-01-01-{actor}.wav");
    write_wav(&dir.join(name), &tone(220.0, SAMPLE_RATE, 0.5), SAMPLE_RATE, 1)
}
