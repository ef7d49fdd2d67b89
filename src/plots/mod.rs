//! PNG rendering of spectrograms, waveforms and training curves.

mod curves;
mod spectrogram;
mod waveform;

use std::path::Path;

use image::{GenericImage, Rgb, RgbImage};
use tracing::info;

use crate::dataset::Dataset;
use crate::error::PlotError;
use crate::labels::{Emotion, VocalChannel};
use crate::types::AudioClip;

pub use curves::{curves_image, Series};
pub use spectrogram::{db_spectrogram, spectrogram_image, FrequencyScale, SpectrogramOptions};
pub use waveform::waveform_image;

pub(crate) const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub(crate) const FRAME: Rgb<u8> = Rgb([90, 90, 90]);

const TILE_WIDTH: u32 = 320;
const TILE_HEIGHT: u32 = 120;
const TILE_GAP: u32 = 4;

/// What each tile of an emotion grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Waveform,
    LogSpectrogram,
}

pub fn render_spectrogram(
    clip: &AudioClip,
    options: &SpectrogramOptions,
    path: &Path,
) -> Result<(), PlotError> {
    save_png(&spectrogram_image(clip, options)?, path)
}

pub fn render_waveform(clip: &AudioClip, width: u32, height: u32, path: &Path) -> Result<(), PlotError> {
    save_png(&waveform_image(&clip.samples, width, height)?, path)
}

pub fn render_training_curves(series: &[Series], path: &Path) -> Result<(), PlotError> {
    save_png(&curves_image(series, 640, 360)?, path)
}

/// One column per emotion, one tile per matching row with a retained waveform.
pub fn render_emotion_grid(
    dataset: &Dataset,
    emotions: &[Emotion],
    channels: &[VocalChannel],
    kind: TileKind,
    path: &Path,
) -> Result<(), PlotError> {
    save_png(&emotion_grid_image(dataset, emotions, channels, kind)?, path)
}

pub fn emotion_grid_image(
    dataset: &Dataset,
    emotions: &[Emotion],
    channels: &[VocalChannel],
    kind: TileKind,
) -> Result<RgbImage, PlotError> {
    let columns: Vec<Vec<AudioClip>> = emotions
        .iter()
        .map(|emotion| {
            dataset
                .subset(std::slice::from_ref(emotion), channels)
                .filter_map(|row| {
                    row.wave
                        .as_ref()
                        .map(|wave| AudioClip::new(wave.clone(), row.sample_rate))
                })
                .collect()
        })
        .collect();
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    if rows == 0 {
        return Err(PlotError::Empty(
            "no rows with retained waveforms match the requested emotions".into(),
        ));
    }

    let width = columns.len() as u32 * (TILE_WIDTH + TILE_GAP);
    let height = rows as u32 * (TILE_HEIGHT + TILE_GAP);
    let mut grid = RgbImage::from_pixel(width, height, BACKGROUND);
    let options = SpectrogramOptions {
        scale: FrequencyScale::Log,
        width: TILE_WIDTH,
        height: TILE_HEIGHT,
        ..SpectrogramOptions::default()
    };
    for (col, clips) in columns.iter().enumerate() {
        for (row, clip) in clips.iter().enumerate() {
            let tile = match kind {
                TileKind::Waveform => waveform_image(&clip.samples, TILE_WIDTH, TILE_HEIGHT)?,
                TileKind::LogSpectrogram => spectrogram_image(clip, &options)?,
            };
            let x = col as u32 * (TILE_WIDTH + TILE_GAP);
            let y = row as u32 * (TILE_HEIGHT + TILE_GAP);
            grid.copy_from(&tile, x, y)
                .map_err(|err| PlotError::Layout(err.to_string()))?;
        }
    }
    Ok(grid)
}

fn save_png(image: &RgbImage, path: &Path) -> Result<(), PlotError> {
    image.save(path).map_err(|source| PlotError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), width = image.width(), height = image.height(), "wrote plot");
    Ok(())
}

/// Blue for quiet, red for loud; `value` is clamped to `[0, 1]`.
pub(crate) fn color_for_value(value: f32) -> Rgb<u8> {
    let clamped = value.clamp(0.0, 1.0);
    let hue = (1.0 - clamped) * 240.0;
    hsv_to_rgb(hue, 0.8, clamped.max(0.2))
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb<u8> {
    let chroma = value * saturation;
    let sector = (hue / 60.0).rem_euclid(6.0);
    let second = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let offset = value - chroma;
    let to_byte = |c: f32| ((c + offset) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb([to_byte(r), to_byte(g), to_byte(b)])
}

/// Bresenham line; points outside the image are dropped.
pub(crate) fn draw_line(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
            image.put_pixel(x as u32, y as u32, color);
        }
        if x == to.0 && y == to.1 {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += sx;
        }
        if doubled <= dx {
            err += dx;
            y += sy;
        }
    }
}
