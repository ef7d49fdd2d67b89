use image::{Rgb, RgbImage};

use super::{draw_line, BACKGROUND, FRAME};
use crate::error::PlotError;

const WAVE: Rgb<u8> = Rgb([70, 130, 220]);

/// Min/max envelope of `samples`, one vertical stroke per pixel column.
pub fn waveform_image(samples: &[f32], width: u32, height: u32) -> Result<RgbImage, PlotError> {
    if samples.len() < 2 {
        return Err(PlotError::Empty("waveform needs at least two samples".into()));
    }
    let (width, height) = (width.max(2), height.max(2));
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);

    let center = (height - 1) as f32 / 2.0;
    let to_y = |value: f32| (center - value.clamp(-1.0, 1.0) * center * 0.9).round() as i64;
    let per_column = samples.len() as f64 / width as f64;
    for x in 0..width {
        let start = (x as f64 * per_column) as usize;
        let end = (((x + 1) as f64 * per_column) as usize).clamp(start + 1, samples.len());
        let column = &samples[start.min(samples.len() - 1)..end];
        let (low, high) = column
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        draw_line(&mut image, (x as i64, to_y(high)), (x as i64, to_y(low)), WAVE);
    }

    let mid = center.round() as i64;
    draw_line(&mut image, (0, mid), (width as i64 - 1, mid), FRAME);
    Ok(image)
}
